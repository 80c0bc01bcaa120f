//! Resolving `$<name>` references in placed commands.

use mcml::{Direction, Error, ErrorKind};
use tracing::debug;

use crate::command::{Auxiliary, CommandBlock};
use crate::registry::SectionRegistry;

/// A piece of command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    /// The identifier inside `$<...>`.
    Reference(&'a str),
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split `text` into literal runs and references, left to right.
///
/// A reference is `$<` followed by one or more word characters and `>`.
/// Anything else, including a malformed `$<`, stays literal.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut search = 0;

    while let Some(found) = text[search..].find("$<") {
        let ident_start = search + found + 2;
        let rest = &text[ident_start..];
        let ident_len = rest
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(rest.len());

        if ident_len > 0 && rest[ident_len..].starts_with('>') {
            let reference_start = ident_start - 2;
            if literal_start < reference_start {
                tokens.push(Token::Text(&text[literal_start..reference_start]));
            }
            tokens.push(Token::Reference(&rest[..ident_len]));
            search = ident_start + ident_len + 1;
            literal_start = search;
        } else {
            search = ident_start;
        }
    }

    if literal_start < text.len() {
        tokens.push(Token::Text(&text[literal_start..]));
    }
    tokens
}

/// Rewrites references into coordinates and collects the wiring they need.
///
/// Every resolution consumes the referenced section's anchor (see
/// [`SectionRegistry::consume`]), so the order commands are fed in matters.
pub struct Substitutor<'r> {
    registry: &'r mut SectionRegistry,
    direction: Direction,
    extra: Vec<Auxiliary>,
}

impl<'r> Substitutor<'r> {
    pub fn new(registry: &'r mut SectionRegistry, direction: Direction) -> Self {
        Substitutor {
            registry,
            direction,
            extra: Vec::new(),
        }
    }

    /// Substitute every reference in `text`. `Err` is the kind of the first
    /// failure; the caller attaches the location.
    pub fn substitute(&mut self, text: &str) -> Result<String, ErrorKind> {
        let mut out = String::with_capacity(text.len());
        for token in tokenize(text) {
            match token {
                Token::Text(literal) => out.push_str(literal),
                Token::Reference(name) => {
                    let repeater = self
                        .direction
                        .repeater_data()
                        .ok_or(ErrorKind::MissingRepeaterOrientation(self.direction))?;
                    let resolved = self.registry.consume(name, self.direction)?;
                    let support = resolved
                        .point
                        .checked_up(-1)
                        .ok_or(ErrorKind::CoordinateOverflow)?;
                    debug!(reference = name, point = %resolved.point, "resolved reference");

                    // The reference names the repeater position, not the
                    // walked anchor (DESIGN.md, decision 1).
                    out.push_str(&resolved.point.to_string());
                    self.extra.push(Auxiliary::Support(support));
                    self.extra.push(Auxiliary::Repeater {
                        position: resolved.point,
                        data: repeater,
                    });
                }
            }
        }
        Ok(out)
    }

    pub fn apply(&mut self, block: &mut CommandBlock) -> Result<(), Error> {
        block.command = self
            .substitute(&block.command)
            .map_err(|kind| kind.at(block.source.clone()))?;
        Ok(())
    }

    /// The wiring collected so far, in resolution order.
    pub fn finish(self) -> Vec<Auxiliary> {
        self.extra
    }
}
