//! Cell coordinates on the unbounded plane.

use crate::error::LifeError;

/// Neighbour offsets in the fixed enumeration order:
/// W, E, S, N, SW, NE, NW, SE (with `y` growing "north").
pub const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
];

/// A cell position. Ordered x-major, then y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    #[inline(always)]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Offset this coordinate, or `None` if either axis leaves the `i64` domain.
    #[inline(always)]
    pub fn checked_offset(self, dx: i64, dy: i64) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// The Moore neighbourhood in [`NEIGHBOUR_OFFSETS`] order.
    ///
    /// Fails if any neighbour is unrepresentable, which only happens for cells
    /// on the outermost row or column of the plane.
    pub fn neighbours(self) -> Result<[Coord; 8], LifeError> {
        let mut out = [self; 8];
        for (slot, &(dx, dy)) in out.iter_mut().zip(NEIGHBOUR_OFFSETS.iter()) {
            *slot = self.checked_offset(dx, dy).ok_or(LifeError::CoordinateOverflow {
                x: self.x,
                y: self.y,
            })?;
        }
        Ok(out)
    }
}

impl From<(i64, i64)> for Coord {
    #[inline(always)]
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for (i64, i64) {
    #[inline(always)]
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}
