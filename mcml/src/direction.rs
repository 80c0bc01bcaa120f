use std::fmt;
use std::str::FromStr;

use crate::coord::Coordinate;

/// The signed axis blocks are laid out along.
///
/// Only the horizontal axes can be declared in a file. The vertical variants
/// exist because the orientation table covers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Direction {
    pub fn step(self) -> Coordinate {
        match self {
            Direction::PosX => Coordinate::new(1, 0, 0),
            Direction::NegX => Coordinate::new(-1, 0, 0),
            Direction::PosY => Coordinate::new(0, 1, 0),
            Direction::NegY => Coordinate::new(0, -1, 0),
            Direction::PosZ => Coordinate::new(0, 0, 1),
            Direction::NegZ => Coordinate::new(0, 0, -1),
        }
    }

    /// Data value of a command block facing this way.
    ///
    /// Conditional blocks add 8. The table this mirrors lists `+y`
    /// conditional twice, and the later entry (11) won, so there is no code
    /// for `+z` conditional at all.
    pub fn block_data(self, conditional: bool) -> Option<u8> {
        match (self, conditional) {
            (Direction::NegY, false) => Some(0),
            (Direction::PosY, false) => Some(1),
            (Direction::NegZ, false) => Some(2),
            (Direction::PosZ, false) => Some(3),
            (Direction::NegX, false) => Some(4),
            (Direction::PosX, false) => Some(5),
            (Direction::NegY, true) => Some(8),
            (Direction::PosY, true) => Some(11),
            (Direction::NegZ, true) => Some(10),
            (Direction::PosZ, true) => None,
            (Direction::NegX, true) => Some(12),
            (Direction::PosX, true) => Some(13),
        }
    }

    /// Data value of a repeater pointing this way. Repeaters only turn in
    /// the horizontal plane.
    pub fn repeater_data(self) -> Option<u8> {
        match self {
            Direction::NegZ => Some(0),
            Direction::PosX => Some(1),
            Direction::PosZ => Some(2),
            Direction::NegX => Some(3),
            Direction::PosY | Direction::NegY => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::PosX => "+x",
            Direction::NegX => "-x",
            Direction::PosY => "+y",
            Direction::NegY => "-y",
            Direction::PosZ => "+z",
            Direction::NegZ => "-z",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    /// Accepts `x`, `+x`, `-x`, `z`, `+z` and `-z`; bare axes are positive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "+x" => Ok(Direction::PosX),
            "-x" => Ok(Direction::NegX),
            "z" | "+z" => Ok(Direction::PosZ),
            "-z" => Ok(Direction::NegZ),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
