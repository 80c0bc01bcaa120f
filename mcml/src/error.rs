use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use thiserror::Error;

use crate::direction::Direction;
use crate::source::Location;
use crate::tag::{Flag, TagName};

/// How far an error reaches: every category except `Fatal` only aborts the
/// file it occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Structural,
    Semantic,
    Binding,
    Fatal,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Structural => "structural",
            Category::Semantic => "semantic",
            Category::Binding => "binding",
            Category::Fatal => "fatal",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("expected \"<{expected}>\" tag, found \"{found}\"")]
    MissingTag { expected: TagName, found: String },

    #[error("reached end of stream while looking for \"<{expected}>\"")]
    UnexpectedEnd { expected: TagName },

    #[error("expected closing tag for \"<{0}>\"")]
    UnterminatedTag(TagName),

    #[error("tag \"<{0}>\" is empty")]
    EmptyTag(TagName),

    #[error("invalid tag: \"{0}\"")]
    InvalidTag(String),

    #[error("invalid {axis} coordinate: {raw}")]
    InvalidCoordinate { axis: TagName, raw: String },

    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    #[error("invalid value for \"relative\" tag: {0}")]
    InvalidRelative(String),

    #[error("invalid placement of tag \"<{0}>\": already open")]
    FlagAlreadyOpen(Flag),

    #[error("invalid placement of tag \"<{requested}>\": \"<{open}>\" is still open")]
    ConflictingFlag { open: Flag, requested: Flag },

    #[error("closing tag before opening tag (\"{0}\")")]
    FlagNotOpen(Flag),

    #[error("tag \"<{0}>\" is never closed")]
    UnclosedFlag(Flag),

    #[error("missing \"<relative>\" tag")]
    MissingRelative,

    #[error("coordinate out of range")]
    CoordinateOverflow,

    #[error("unresolved name binding \"$<{0}>\"")]
    UnresolvedBinding(String),

    #[error("no {} orientation code for direction {direction}", orientation_kind(.conditional))]
    MissingOrientation {
        direction: Direction,
        conditional: bool,
    },

    #[error("no repeater orientation code for direction {0}")]
    MissingRepeaterOrientation(Direction),
}

fn orientation_kind(conditional: &bool) -> &'static str {
    if *conditional { "conditional" } else { "unconditional" }
}

impl ErrorKind {
    pub fn category(&self) -> Category {
        match self {
            ErrorKind::MissingTag { .. }
            | ErrorKind::UnexpectedEnd { .. }
            | ErrorKind::UnterminatedTag(_)
            | ErrorKind::EmptyTag(_)
            | ErrorKind::UnclosedFlag(_) => Category::Structural,
            ErrorKind::InvalidTag(_)
            | ErrorKind::InvalidCoordinate { .. }
            | ErrorKind::InvalidDirection(_)
            | ErrorKind::InvalidRelative(_)
            | ErrorKind::MissingRelative
            | ErrorKind::CoordinateOverflow
            | ErrorKind::FlagAlreadyOpen(_)
            | ErrorKind::ConflictingFlag { .. }
            | ErrorKind::FlagNotOpen(_) => Category::Semantic,
            ErrorKind::UnresolvedBinding(_) => Category::Binding,
            ErrorKind::MissingOrientation { .. } | ErrorKind::MissingRepeaterOrientation(_) => {
                Category::Fatal
            }
        }
    }

    pub fn at(self, location: Location) -> Error {
        Error {
            kind: self,
            location,
            file_id: 0,
            notes: Vec::new(),
        }
    }
}

/// An error tied to a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub location: Location,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl Error {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Fatal errors end the whole run instead of skipping the file.
    pub fn is_fatal(&self) -> bool {
        self.category() == Category::Fatal
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn span(&self) -> Range<usize> {
        self.location.span.clone()
    }

    pub fn in_file(mut self, file_id: usize) -> Self {
        self.file_id = file_id;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let severity = if self.is_fatal() {
            Severity::Bug
        } else {
            Severity::Error
        };
        Diagnostic::new(severity)
            .with_message(self.kind.to_string())
            .with_code(self.category().to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.location.line, self.kind)
    }
}

impl std::error::Error for Error {}
