//! Named seed patterns.
//!
//! Offsets are relative to the pattern's origin, with rows listed top to
//! bottom as `y` increases.

use crate::error::LifeError;
use crate::sparse::{Coord, LifeRule, SparseGrid};

pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i64, i64)],
}

pub const BLOCK: Pattern = Pattern {
    name: "block",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

pub const BEEHIVE: Pattern = Pattern {
    name: "beehive",
    cells: &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (2, 2)],
};

pub const BLINKER: Pattern = Pattern {
    name: "blinker",
    cells: &[(0, 0), (1, 0), (2, 0)],
};

pub const TOAD: Pattern = Pattern {
    name: "toad",
    cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
};

pub const BEACON: Pattern = Pattern {
    name: "beacon",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
};

pub const GLIDER: Pattern = Pattern {
    name: "glider",
    cells: &[(1, 0), (2, -1), (0, -2), (1, -2), (2, -2)],
};

pub const LWSS: Pattern = Pattern {
    name: "lwss",
    cells: &[
        (1, 0),
        (4, 0),
        (0, 1),
        (0, 2),
        (4, 2),
        (0, 3),
        (1, 3),
        (2, 3),
        (3, 3),
    ],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "r-pentomino",
    cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
};

pub const ACORN: Pattern = Pattern {
    name: "acorn",
    cells: &[(1, 0), (3, 1), (0, 2), (1, 2), (4, 2), (5, 2), (6, 2)],
};

pub const PATTERNS: &[Pattern] = &[
    BLOCK,
    BEEHIVE,
    BLINKER,
    TOAD,
    BEACON,
    GLIDER,
    LWSS,
    R_PENTOMINO,
    ACORN,
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Pattern {
    /// Look up a pattern ignoring case, dashes, underscores and spaces.
    pub fn by_name(name: &str) -> Option<&'static Pattern> {
        let wanted = normalize(name);
        PATTERNS.iter().find(|p| normalize(p.name) == wanted)
    }

    #[inline]
    pub fn population(&self) -> usize {
        self.cells.len()
    }

    /// Absolute cells with the pattern anchored at `origin`.
    ///
    /// Fails with [`LifeError::CoordinateOverflow`] (carrying `origin`) if any
    /// cell would land outside the `i64` plane.
    pub fn place(&self, origin: Coord) -> Result<Vec<Coord>, LifeError> {
        self.cells
            .iter()
            .map(|&(dx, dy)| {
                origin
                    .checked_offset(dx, dy)
                    .ok_or(LifeError::CoordinateOverflow {
                        x: origin.x,
                        y: origin.y,
                    })
            })
            .collect()
    }
}

impl SparseGrid {
    /// A grid holding only `pattern` at `origin`.
    pub fn from_pattern(
        rule: LifeRule,
        pattern: &Pattern,
        origin: Coord,
    ) -> Result<Self, LifeError> {
        Ok(Self::from_cells(rule, pattern.place(origin)?))
    }
}

#[cfg(test)]
mod tests {
    use super::{BLOCK, GLIDER, PATTERNS, Pattern, R_PENTOMINO};
    use crate::error::LifeError;
    use crate::sparse::{Coord, LifeRule, SparseGrid};

    #[test]
    fn lookup_is_forgiving() {
        assert_eq!(Pattern::by_name("R-Pentomino").unwrap().name, "r-pentomino");
        assert_eq!(Pattern::by_name("r_pentomino").unwrap().name, R_PENTOMINO.name);
        assert_eq!(Pattern::by_name("GLIDER").unwrap().name, GLIDER.name);
        assert!(Pattern::by_name("gosper gun").is_none());
    }

    #[test]
    fn names_are_unique_and_cells_distinct() {
        for (i, a) in PATTERNS.iter().enumerate() {
            for b in &PATTERNS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
            let grid =
                SparseGrid::from_pattern(LifeRule::conway(), a, Coord::new(0, 0)).unwrap();
            assert_eq!(grid.population(), a.population(), "{}", a.name);
        }
    }

    #[test]
    fn placement_translates() {
        let placed = GLIDER.place(Coord::new(10, 10)).unwrap();
        assert_eq!(placed.len(), GLIDER.population());
        assert_eq!(placed[0], Coord::new(11, 10));
        assert_eq!(placed[2], Coord::new(10, 8));
    }

    #[test]
    fn placement_past_the_plane_edge_is_an_error() {
        let origin = Coord::new(i64::MAX, 0);
        match GLIDER.place(origin) {
            Err(LifeError::CoordinateOverflow { x, y }) => assert_eq!((x, y), (i64::MAX, 0)),
            other => panic!("expected overflow, got {other:?}"),
        }
        assert!(SparseGrid::from_pattern(LifeRule::conway(), &GLIDER, origin).is_err());
        let low_edge = Coord::new(0, i64::MIN);
        assert!(SparseGrid::from_pattern(LifeRule::conway(), &BLOCK, low_edge).is_ok());
    }
}
