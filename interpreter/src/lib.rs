pub mod command;
pub mod executor;
pub mod placement;
pub mod registry;
pub mod substitute;

pub use command::{Auxiliary, BlockType, CommandBlock};
pub use executor::{CommandSet, Outcome, interpret};
pub use mcml::{Category, Error, ErrorKind};
pub use registry::{Resolution, SectionRegistry};
