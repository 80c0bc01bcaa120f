use mcml::{Coordinate, Direction, Error, ErrorKind, Flag, LineStream, Location, TagLine};
use tracing::trace;

use crate::command::{BlockType, CommandBlock};

/// Flags opened by `<impulse>`, `<chain>`, `<repeating>`, `<conditional>`
/// and `<auto>` tags. At most one trigger flag is open at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementFlags {
    trigger: Option<Flag>,
    conditional: bool,
    auto: bool,
}

impl PlacementFlags {
    pub fn open(&mut self, flag: Flag) -> Result<(), ErrorKind> {
        match (flag, self.trigger) {
            (Flag::Impulse | Flag::Chain | Flag::Repeating, Some(open)) if open == flag => {
                Err(ErrorKind::FlagAlreadyOpen(flag))
            }
            (Flag::Impulse | Flag::Chain | Flag::Repeating, Some(open)) => {
                Err(ErrorKind::ConflictingFlag {
                    open,
                    requested: flag,
                })
            }
            (Flag::Impulse | Flag::Chain | Flag::Repeating, None) => {
                self.trigger = Some(flag);
                Ok(())
            }
            (Flag::Conditional, _) => raise(&mut self.conditional, flag),
            (Flag::Auto, _) => raise(&mut self.auto, flag),
        }
    }

    pub fn close(&mut self, flag: Flag) -> Result<(), ErrorKind> {
        match flag {
            Flag::Impulse | Flag::Chain | Flag::Repeating => {
                if self.trigger != Some(flag) {
                    return Err(ErrorKind::FlagNotOpen(flag));
                }
                self.trigger = None;
                Ok(())
            }
            Flag::Conditional => lower(&mut self.conditional, flag),
            Flag::Auto => lower(&mut self.auto, flag),
        }
    }

    pub fn is_open(&self, flag: Flag) -> bool {
        match flag {
            Flag::Conditional => self.conditional,
            Flag::Auto => self.auto,
            trigger => self.trigger == Some(trigger),
        }
    }

    /// The first flag still open, in tag order.
    pub fn first_open(&self) -> Option<Flag> {
        self.trigger
            .or(self.conditional.then_some(Flag::Conditional))
            .or(self.auto.then_some(Flag::Auto))
    }

    /// The block type forced by an open trigger flag.
    pub fn block_type(&self) -> Option<BlockType> {
        self.trigger.map(|flag| match flag {
            Flag::Impulse => BlockType::Impulse,
            Flag::Repeating => BlockType::Repeating,
            _ => BlockType::Chain,
        })
    }

    pub fn conditional(&self) -> bool {
        self.conditional
    }

    pub fn auto(&self) -> bool {
        self.auto
    }
}

fn raise(slot: &mut bool, flag: Flag) -> Result<(), ErrorKind> {
    if *slot {
        return Err(ErrorKind::FlagAlreadyOpen(flag));
    }
    *slot = true;
    Ok(())
}

fn lower(slot: &mut bool, flag: Flag) -> Result<(), ErrorKind> {
    if !*slot {
        return Err(ErrorKind::FlagNotOpen(flag));
    }
    *slot = false;
    Ok(())
}

/// Walks block positions along one direction, starting at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub position: Coordinate,
    pub direction: Direction,
    started: bool,
}

impl Cursor {
    pub fn new(position: Coordinate, direction: Direction) -> Self {
        Cursor {
            position,
            direction,
            started: false,
        }
    }

    /// The position for the next block: the start on the first call, one
    /// step further on every later one. `None` once a step leaves the
    /// coordinate range; the cursor stays on the last valid position.
    pub fn next_position(&mut self) -> Option<Coordinate> {
        if self.started {
            self.position = self.position.checked_add(self.direction.step())?;
        }
        self.started = true;
        Some(self.position)
    }
}

/// Per-block state: the open flags and whether an unflagged line has
/// already been placed.
#[derive(Debug, Default)]
struct BlockState {
    flags: PlacementFlags,
    defaulted: bool,
}

impl BlockState {
    /// An explicit trigger flag wins. Otherwise the first unflagged line
    /// becomes the repeating head of a chain and every later one a chain
    /// block.
    fn classify(&mut self) -> BlockType {
        if let Some(block_type) = self.flags.block_type() {
            return block_type;
        }
        if self.defaulted {
            BlockType::Chain
        } else {
            self.defaulted = true;
            BlockType::Repeating
        }
    }

    fn apply_tag(&mut self, text: &str, location: Location) -> Result<(), Error> {
        let tag = TagLine::parse(text).map_err(|name| ErrorKind::InvalidTag(name).at(location.clone()))?;
        let result = match tag {
            TagLine::Open(name) => match Flag::from_tag(name) {
                Some(flag) => self.flags.open(flag),
                None => Err(ErrorKind::InvalidTag(name.to_string())),
            },
            TagLine::Close(name) => match Flag::from_tag(name) {
                Some(flag) => self.flags.close(flag),
                None => Err(ErrorKind::InvalidTag(format!("/{}", name))),
            },
        };
        result.map_err(|kind| kind.at(location))
    }
}

/// Turn the content lines of one block into command blocks, one cursor
/// position per placed block.
///
/// Flags are fresh for every call. Any flag left open when the lines run
/// out is an error reported at the block's closing tag.
pub fn place_commands(mut lines: LineStream, cursor: &mut Cursor) -> Result<Vec<CommandBlock>, Error> {
    let mut state = BlockState::default();
    let mut placed = Vec::new();

    while let Some(line) = lines.next_meaningful() {
        if line.text.starts_with('<') {
            state.apply_tag(&line.text, line.location())?;
            continue;
        }

        let block_type = state.classify();
        let conditional = state.flags.conditional();
        let data = cursor
            .direction
            .block_data(conditional)
            .ok_or_else(|| {
                ErrorKind::MissingOrientation {
                    direction: cursor.direction,
                    conditional,
                }
                .at(line.location())
            })?;

        let position = cursor
            .next_position()
            .ok_or_else(|| ErrorKind::CoordinateOverflow.at(line.location()))?;

        trace!(%position, ?block_type, command = %line.text, "placing block");
        placed.push(CommandBlock {
            position,
            block_type,
            data,
            conditional,
            auto: state.flags.auto(),
            source: line.location(),
            command: line.text,
        });
    }

    if let Some(flag) = state.flags.first_open() {
        return Err(ErrorKind::UnclosedFlag(flag).at(lines.eof().clone()));
    }

    Ok(placed)
}
