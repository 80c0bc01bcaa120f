use mcml::{
    Coordinate, Direction, Error, ErrorKind, Header, LineStream, TagName, extract_coordinate,
    isolate, read_relative, read_value,
};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::command::{Auxiliary, CommandBlock};
use crate::placement::{Cursor, place_commands};
use crate::registry::SectionRegistry;
use crate::substitute::Substitutor;

/// Everything one file produces, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    /// Header blocks, indexed by [`Header::index`].
    pub headers: [Vec<CommandBlock>; 5],
    /// Blocks of every section, in file order.
    pub commands: Vec<CommandBlock>,
    /// Wiring generated by reference substitution.
    pub extra: Vec<Auxiliary>,
    /// Registered sections with the anchors they were declared at.
    pub sections: Vec<(String, Coordinate)>,
}

impl CommandSet {
    pub fn header(&self, header: Header) -> &[CommandBlock] {
        &self.headers[header.index()]
    }

    /// The seven named command arrays, rendered, in delivery order:
    /// the five headers, then `commands`, then `extra`.
    pub fn arrays(&self) -> Vec<(&'static str, Vec<String>)> {
        let render = |blocks: &[CommandBlock]| -> Vec<String> {
            blocks.iter().map(ToString::to_string).collect()
        };
        let mut arrays: Vec<(&'static str, Vec<String>)> = Header::iter()
            .map(|header| (header.as_str(), render(self.header(header))))
            .collect();
        arrays.push(("commands", render(&self.commands)));
        arrays.push(("extra", self.extra.iter().map(ToString::to_string).collect()));
        arrays
    }

    pub fn len(&self) -> usize {
        self.headers.iter().map(Vec::len).sum::<usize>() + self.commands.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State that lives for the whole of one file.
#[derive(Debug)]
struct FileState {
    origin: Coordinate,
    direction: Direction,
    registry: SectionRegistry,
}

impl FileState {
    fn cursor_at(&self, position: Coordinate) -> Cursor {
        Cursor::new(position, self.direction)
    }
}

/// Interpret one source file.
///
/// Any error aborts this file only; the caller decides what to do with the
/// rest of the run (see [`Outcome`]).
pub fn interpret(source: &str, file_id: usize) -> Result<CommandSet, Error> {
    interpret_stream(LineStream::from_source(source)).map_err(|e| e.in_file(file_id))
}

fn interpret_stream(mut stream: LineStream) -> Result<CommandSet, Error> {
    debug!("isolating start tag");
    let mut start = isolate(&mut stream, TagName::Start)?.into_stream();
    let origin = extract_coordinate(&mut start)?;
    info!(%origin, "found starting coordinates");

    debug!("isolating direction tag");
    let line = read_value(&mut stream, TagName::Direction)?;
    let direction: Direction = line
        .text
        .parse()
        .map_err(|raw| ErrorKind::InvalidDirection(raw).at(line.location()))?;
    info!(%direction, "found block direction");

    let mut state = FileState {
        origin,
        direction,
        registry: SectionRegistry::new(),
    };
    let mut set = CommandSet::default();

    for header in Header::iter() {
        debug!(header = header.as_str(), "isolating header");
        let block = isolate(&mut stream, header.tag())?;
        let anchor = state
            .origin
            .checked_up(2 * header.index() as i32)
            .ok_or_else(|| ErrorKind::CoordinateOverflow.at(block.open.clone()))?;
        let mut cursor = state.cursor_at(anchor);
        set.headers[header.index()] = place_commands(block.into_stream(), &mut cursor)?;
        state.registry.register(header.as_str(), anchor);
    }

    debug!("isolating blocks tag");
    let mut blocks = isolate(&mut stream, TagName::Blocks)?.into_stream();
    let group_start = resolve_start(&mut blocks, state.origin)?;
    debug!(%group_start, "resolved block group start");

    let mut previous = group_start;
    loop {
        if blocks.at_end() {
            info!("no further block section, file interpreted");
            break;
        }
        debug!("isolating section");
        let mut section = match isolate(&mut blocks, TagName::Section) {
            Ok(block) => block.into_stream(),
            Err(e) if matches!(e.kind, ErrorKind::MissingTag { .. }) => {
                warn!(line = e.line(), "content after the last section ignored");
                break;
            }
            Err(e) => return Err(e),
        };
        let name = read_value(&mut section, TagName::Name)?;
        let anchor = resolve_start(&mut section, previous)?;
        previous = anchor;
        info!(section = %name.text, %anchor, "found section");

        let mut cursor = state.cursor_at(anchor);
        let placed = place_commands(section, &mut cursor)?;
        set.commands.extend(placed);
        state.registry.register(&name.text, anchor);
    }

    set.sections = state.registry.sections();

    info!("applying name bindings");
    let mut substitutor = Substitutor::new(&mut state.registry, state.direction);
    for array in set.headers.iter_mut().chain(std::iter::once(&mut set.commands)) {
        for block in array.iter_mut() {
            substitutor.apply(block)?;
        }
    }
    set.extra = substitutor.finish();

    Ok(set)
}

/// Read a `<start>` block holding `<relative>` and a coordinate. Relative
/// offsets are added to `base`; absolute ones are taken as-is.
fn resolve_start(stream: &mut LineStream, base: Coordinate) -> Result<Coordinate, Error> {
    debug!("isolating start tag");
    let block = isolate(stream, TagName::Start)?;
    let open = block.open.clone();
    let mut start = block.into_stream();
    let relative = read_relative(&mut start)?;
    let offset = extract_coordinate(&mut start)?;
    if !relative {
        return Ok(offset);
    }
    base.checked_add(offset)
        .ok_or_else(|| ErrorKind::CoordinateOverflow.at(open))
}

/// What a run should do after interpreting one file.
#[derive(Debug)]
pub enum Outcome {
    Interpreted(CommandSet),
    /// The file was aborted; continue with the next one.
    Skipped(Error),
    /// The run must stop.
    Halted(Error),
}

impl From<Result<CommandSet, Error>> for Outcome {
    fn from(result: Result<CommandSet, Error>) -> Self {
        match result {
            Ok(set) => Outcome::Interpreted(set),
            Err(e) if e.is_fatal() => Outcome::Halted(e),
            Err(e) => Outcome::Skipped(e),
        }
    }
}
