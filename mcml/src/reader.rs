//! Isolating tags from a line stream.
//!
//! Every reader consumes from a shared [`LineStream`], so tags have to be
//! requested in the order they appear in the file.

use crate::coord::Coordinate;
use crate::error::{Error, ErrorKind};
use crate::source::{Line, LineStream, Location};
use crate::tag::TagName;

/// The lines enclosed by one tag.
///
/// For the single-line form `<name>value</name>` this holds one line with
/// the inline value, numbered like the opening line.
#[derive(Debug, Clone)]
pub struct Block {
    pub tag: TagName,
    pub open: Location,
    pub close: Location,
    pub lines: Vec<Line>,
}

impl Block {
    /// The first enclosed line, for tags that hold a single value.
    pub fn value(&self) -> Result<&Line, Error> {
        self.lines
            .first()
            .ok_or_else(|| ErrorKind::EmptyTag(self.tag).at(self.open.clone()))
    }

    pub fn into_stream(self) -> LineStream {
        LineStream::from_lines(self.lines, self.close)
    }
}

/// Isolate the next `<tag>` from `stream`.
///
/// Leading comments and blanks are skipped. The next meaningful line must
/// open `tag`; it is consumed either way. A nested `<tag>` of the same name
/// must be closed before the outer one.
pub fn isolate(stream: &mut LineStream, tag: TagName) -> Result<Block, Error> {
    let first = stream.next_meaningful().ok_or_else(|| {
        ErrorKind::UnexpectedEnd { expected: tag }.at(stream.eof().clone())
    })?;

    let open = tag.open();
    let close = tag.close();
    if !first.text.starts_with(&open) {
        return Err(ErrorKind::MissingTag {
            expected: tag,
            found: first.text.clone(),
        }
        .at(first.location()));
    }

    if first.text.contains(&close) {
        let value = first.text.replace(&open, "").replace(&close, "");
        return Ok(Block {
            tag,
            open: first.location(),
            close: first.location(),
            lines: vec![Line {
                number: first.number,
                span: first.span.clone(),
                text: value.trim().to_string(),
            }],
        });
    }

    let mut depth = 0usize;
    let mut lines = Vec::new();
    while let Some(line) = stream.next_line() {
        if line.text.starts_with(&close) {
            if depth == 0 {
                return Ok(Block {
                    tag,
                    open: first.location(),
                    close: line.location(),
                    lines,
                });
            }
            depth -= 1;
        } else if line.text.starts_with(&open) && !line.text.contains(&close) {
            depth += 1;
        }
        if line.is_meaningful() {
            lines.push(line);
        }
    }

    Err(ErrorKind::UnterminatedTag(tag)
        .at(first.location())
        .with_note(format!("stream ended at line {}", stream.eof().line)))
}

/// Isolate a tag and return its single value line.
pub fn read_value(stream: &mut LineStream, tag: TagName) -> Result<Line, Error> {
    let block = isolate(stream, tag)?;
    block.value().cloned()
}

/// Read the `<x>`, `<y>` and `<z>` children of an isolated block, in that
/// order. Stops at the first missing tag or non-integer value.
pub fn extract_coordinate(stream: &mut LineStream) -> Result<Coordinate, Error> {
    let mut axes = [0i32; 3];
    for (slot, axis) in axes.iter_mut().zip([TagName::X, TagName::Y, TagName::Z]) {
        let line = read_value(stream, axis)?;
        *slot = line.text.parse().map_err(|_| {
            ErrorKind::InvalidCoordinate {
                axis,
                raw: line.text.clone(),
            }
            .at(line.location())
        })?;
    }
    let [x, y, z] = axes;
    Ok(Coordinate::new(x, y, z))
}

/// Read a `<relative>` flag: an integer where zero means absolute.
/// `true` and `false` are accepted too. A missing flag is a bad value, not
/// a structural fault.
pub fn read_relative(stream: &mut LineStream) -> Result<bool, Error> {
    let line = read_value(stream, TagName::Relative).map_err(|e| match e.kind {
        ErrorKind::MissingTag { .. } | ErrorKind::UnexpectedEnd { .. } => Error {
            kind: ErrorKind::MissingRelative,
            ..e
        },
        _ => e,
    })?;
    match line.text.as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        raw => raw
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| ErrorKind::InvalidRelative(raw.to_string()).at(line.location())),
    }
}
