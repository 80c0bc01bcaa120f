use std::fmt;

/// An integer block position. `Copy`, so every context owns its own value.
///
/// Arithmetic is checked: every operation returns `None` when an axis would
/// leave the `i32` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Coordinate { x, y, z }
    }

    fn zip_with(self, rhs: Coordinate, op: fn(i32, i32) -> Option<i32>) -> Option<Coordinate> {
        Some(Coordinate {
            x: op(self.x, rhs.x)?,
            y: op(self.y, rhs.y)?,
            z: op(self.z, rhs.z)?,
        })
    }

    pub fn checked_add(self, rhs: Coordinate) -> Option<Coordinate> {
        self.zip_with(rhs, i32::checked_add)
    }

    pub fn checked_sub(self, rhs: Coordinate) -> Option<Coordinate> {
        self.zip_with(rhs, i32::checked_sub)
    }

    pub fn checked_scale(self, factor: i32) -> Option<Coordinate> {
        self.zip_with(Coordinate::new(factor, factor, factor), i32::checked_mul)
    }

    /// The same position shifted vertically.
    pub fn checked_up(self, by: i32) -> Option<Coordinate> {
        Some(Coordinate {
            y: self.y.checked_add(by)?,
            ..self
        })
    }
}

impl From<(i32, i32, i32)> for Coordinate {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Coordinate::new(x, y, z)
    }
}

/// Formats as `x y z`, the form commands expect.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}
