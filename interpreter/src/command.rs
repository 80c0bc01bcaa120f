use std::fmt;

use mcml::{Coordinate, Location};

/// How a command block is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Impulse,
    Chain,
    Repeating,
}

impl BlockType {
    /// Prefix of the block id, e.g. `chain_` in `chain_command_block`.
    pub fn prefix(self) -> &'static str {
        match self {
            BlockType::Impulse => "",
            BlockType::Chain => "chain_",
            BlockType::Repeating => "repeating_",
        }
    }
}

/// One placed command block.
///
/// `command` is the raw payload; quotes are escaped only when rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBlock {
    pub position: Coordinate,
    pub block_type: BlockType,
    pub data: u8,
    pub conditional: bool,
    pub auto: bool,
    pub command: String,
    /// The content line this block came from.
    pub source: Location,
}

impl fmt::Display for CommandBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/setblock {} {}command_block {} replace {{Command:\"{}\",auto:{}b}}",
            self.position,
            self.block_type.prefix(),
            self.data,
            self.command.replace('"', "\\\""),
            u8::from(self.auto),
        )
    }
}

/// Wiring emitted while resolving `$<name>` references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auxiliary {
    /// A solid block for a repeater to stand on.
    Support(Coordinate),
    Repeater { position: Coordinate, data: u8 },
}

impl fmt::Display for Auxiliary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auxiliary::Support(position) => write!(f, "/setblock {} stone 6", position),
            Auxiliary::Repeater { position, data } => {
                write!(f, "/setblock {} unpowered_repeater {}", position, data)
            }
        }
    }
}
