pub mod coord;
pub mod direction;
pub mod error;
pub mod reader;
pub mod source;
pub mod tag;

pub use coord::Coordinate;
pub use direction::Direction;
pub use error::{Category, Error, ErrorKind};
pub use reader::{Block, extract_coordinate, isolate, read_relative, read_value};
pub use source::{Line, LineStream, Location};
pub use tag::{Flag, Header, TagLine, TagName};
