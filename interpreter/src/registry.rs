use std::collections::HashMap;

use mcml::{Coordinate, Direction, ErrorKind};

/// Result of resolving one `$<name>` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The section's anchor after this reference moved it.
    pub anchor: Coordinate,
    /// Where the wiring for this reference goes: one step behind the anchor.
    pub point: Coordinate,
}

/// Named sections of one file and their anchors.
///
/// Anchors are fixed while the file is read. During substitution every
/// reference to a section walks its anchor two steps back along the file's
/// direction, so consecutive references wire up a corridor leading to it.
#[derive(Debug, Default, Clone)]
pub struct SectionRegistry {
    anchors: HashMap<String, Coordinate>,
    /// Names in registration order.
    order: Vec<String>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `anchor`. A later section of the same name replaces
    /// the earlier binding.
    pub fn register(&mut self, name: &str, anchor: Coordinate) {
        if self.anchors.insert(name.to_string(), anchor).is_none() {
            self.order.push(name.to_string());
        }
    }

    pub fn anchor(&self, name: &str) -> Option<Coordinate> {
        self.anchors.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.anchors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Current bindings in registration order.
    pub fn sections(&self) -> Vec<(String, Coordinate)> {
        self.order
            .iter()
            .filter_map(|name| Some((name.clone(), self.anchor(name)?)))
            .collect()
    }

    /// Move the anchor of `name` two steps against `direction` and return
    /// the new anchor together with the point one step further back.
    ///
    /// The anchor is left untouched when either step leaves the coordinate
    /// range.
    pub fn consume(&mut self, name: &str, direction: Direction) -> Result<Resolution, ErrorKind> {
        let anchor = self
            .anchors
            .get_mut(name)
            .ok_or_else(|| ErrorKind::UnresolvedBinding(name.to_string()))?;
        let step = direction.step();
        let moved = step
            .checked_scale(2)
            .and_then(|twice| anchor.checked_sub(twice))
            .ok_or(ErrorKind::CoordinateOverflow)?;
        let point = moved.checked_sub(step).ok_or(ErrorKind::CoordinateOverflow)?;
        *anchor = moved;
        Ok(Resolution {
            anchor: moved,
            point,
        })
    }
}
