//! Two-level sparse storage for alive cells.
//!
//! Cells live in an x-keyed map of ordered y-sets. Only alive cells are
//! stored; a column whose set empties is dropped, so absence is the one and
//! only representation of "dead".

use std::collections::{BTreeMap, BTreeSet};

use super::coord::Coord;
use super::rule::LifeRule;
use super::step::{StepBackend, Stepper};
use crate::error::LifeError;

/// One generation of the automaton.
///
/// Stepping never mutates a grid; it produces an independently-owned
/// successor carrying the same [`LifeRule`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseGrid {
    cells: BTreeMap<i64, BTreeSet<i64>>,
    rule: LifeRule,
}

impl SparseGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(rule: LifeRule) -> Self {
        Self {
            cells: BTreeMap::new(),
            rule,
        }
    }

    /// Build a grid whose alive cells are exactly `cells`.
    pub fn from_cells<I>(rule: LifeRule, cells: I) -> Self
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut grid = Self::with_rule(rule);
        grid.extend(cells);
        grid
    }

    #[inline]
    pub fn rule(&self) -> LifeRule {
        self.rule
    }

    /// Reconfigure thresholds. Takes effect on the next step.
    #[inline]
    pub fn set_rule(&mut self, rule: LifeRule) {
        self.rule = rule;
    }

    pub fn set_cell(&mut self, pos: Coord, alive: bool) {
        if alive {
            self.cells.entry(pos.x).or_default().insert(pos.y);
        } else if let Some(column) = self.cells.get_mut(&pos.x) {
            column.remove(&pos.y);
            if column.is_empty() {
                self.cells.remove(&pos.x);
            }
        }
    }

    #[inline]
    pub fn get_cell(&self, pos: Coord) -> bool {
        self.cells
            .get(&pos.x)
            .is_some_and(|column| column.contains(&pos.y))
    }

    /// Flip a cell and return its new state.
    pub fn toggle_cell(&mut self, pos: Coord) -> bool {
        let alive = !self.get_cell(pos);
        self.set_cell(pos, alive);
        alive
    }

    /// The eight Moore neighbours of `pos` in the fixed enumeration order.
    #[inline]
    pub fn neighbour_positions(pos: Coord) -> Result<[Coord; 8], LifeError> {
        pos.neighbours()
    }

    /// Number of alive neighbours of `pos`, in `0..=8`.
    ///
    /// Positions beyond the `i64` plane cannot hold cells and count as dead.
    pub fn neighbours(&self, pos: Coord) -> u8 {
        let mut count = 0u8;
        // Neighbours in columns x-1, x, x+1: look each column up once.
        for dx in [-1i64, 0, 1] {
            let Some(x) = pos.x.checked_add(dx) else {
                continue;
            };
            let Some(column) = self.cells.get(&x) else {
                continue;
            };
            for dy in [-1i64, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some(y) = pos.y.checked_add(dy) {
                    count += column.contains(&y) as u8;
                }
            }
        }
        count
    }

    pub fn population(&self) -> usize {
        self.cells.values().map(BTreeSet::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `(min_x, min_y, max_x, max_y)` of the alive cells.
    pub fn bounds(&self) -> Option<(i64, i64, i64, i64)> {
        let (&min_x, _) = self.cells.first_key_value()?;
        let (&max_x, _) = self.cells.last_key_value()?;
        let mut min_y = i64::MAX;
        let mut max_y = i64::MIN;
        for column in self.cells.values() {
            if let (Some(&lo), Some(&hi)) = (column.first(), column.last()) {
                min_y = min_y.min(lo);
                max_y = max_y.max(hi);
            }
        }
        Some((min_x, min_y, max_x, max_y))
    }

    /// Alive cells, x ascending then y ascending.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .flat_map(|(&x, column)| column.iter().map(move |&y| Coord::new(x, y)))
    }

    pub fn for_each_live<F: FnMut(i64, i64)>(&self, mut f: F) {
        for (&x, column) in &self.cells {
            for &y in column {
                f(x, y);
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Advance one generation, picking serial or parallel evaluation by size.
    pub fn step_time(&self) -> Result<SparseGrid, LifeError> {
        Stepper::new().step(self)
    }

    /// Advance one generation with an explicit backend.
    pub fn step_time_with(&self, backend: StepBackend) -> Result<SparseGrid, LifeError> {
        Stepper::new().backend(backend).step(self)
    }

    pub(crate) fn columns(&self) -> &BTreeMap<i64, BTreeSet<i64>> {
        &self.cells
    }
}

impl Extend<Coord> for SparseGrid {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        for pos in iter {
            self.set_cell(pos, true);
        }
    }
}

impl FromIterator<Coord> for SparseGrid {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Self::from_cells(LifeRule::default(), iter)
    }
}

#[cfg(test)]
mod tests {
    use super::SparseGrid;
    use crate::sparse::coord::Coord;
    use crate::sparse::rule::LifeRule;

    fn c(x: i64, y: i64) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn set_get_and_clear_cells() {
        let mut grid = SparseGrid::new();
        assert!(!grid.get_cell(c(3, -2)));
        grid.set_cell(c(3, -2), true);
        grid.set_cell(c(3, -2), true);
        assert!(grid.get_cell(c(3, -2)));
        assert_eq!(grid.population(), 1);

        grid.set_cell(c(3, -2), false);
        grid.set_cell(c(3, -2), false);
        assert!(!grid.get_cell(c(3, -2)));
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn emptied_columns_are_pruned() {
        let mut grid = SparseGrid::new();
        grid.set_cell(c(7, 1), true);
        grid.set_cell(c(7, 2), true);
        grid.set_cell(c(7, 1), false);
        assert_eq!(grid.columns().len(), 1);
        grid.set_cell(c(7, 2), false);
        assert!(grid.columns().is_empty());
        assert!(grid.is_empty());
    }

    #[test]
    fn queries_do_not_insert_placeholders() {
        let mut grid = SparseGrid::new();
        grid.set_cell(c(0, 0), true);
        for x in -50..50 {
            assert!(!grid.get_cell(c(x, 99)));
            let _ = grid.neighbours(c(x, 99));
        }
        assert_eq!(grid.columns().len(), 1);
        assert_eq!(grid, SparseGrid::from_iter([c(0, 0)]));
    }

    #[test]
    fn clearing_an_untouched_cell_is_a_no_op() {
        let mut grid = SparseGrid::new();
        grid.set_cell(c(42, 42), false);
        assert!(grid.columns().is_empty());
    }

    #[test]
    fn clear_kills_every_cell_and_keeps_rule() {
        let mut grid = SparseGrid::with_rule(LifeRule::maze());
        for (x, y) in [(0, 0), (5, -3), (-7, 9)] {
            grid.set_cell(c(x, y), true);
        }
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.population(), 0);
        assert_eq!(grid.bounds(), None);
        assert!(!grid.get_cell(c(0, 0)));
        assert_eq!(grid.rule(), LifeRule::maze());
        assert_eq!(grid.step_time().unwrap(), grid);
    }

    #[test]
    fn toggle_flips_state() {
        let mut grid = SparseGrid::new();
        assert!(grid.toggle_cell(c(1, 1)));
        assert!(grid.get_cell(c(1, 1)));
        assert!(!grid.toggle_cell(c(1, 1)));
        assert!(grid.is_empty());
    }

    #[test]
    fn neighbour_count_matches_positions() {
        let mut grid = SparseGrid::new();
        for (x, y) in [(0, 0), (1, 0), (1, 1), (-1, -1), (3, 3), (0, 2)] {
            grid.set_cell(c(x, y), true);
        }
        for x in -3..=4 {
            for y in -3..=4 {
                let p = c(x, y);
                let expected = SparseGrid::neighbour_positions(p)
                    .unwrap()
                    .iter()
                    .filter(|&&n| grid.get_cell(n))
                    .count() as u8;
                assert_eq!(grid.neighbours(p), expected, "at {p:?}");
            }
        }
        assert_eq!(grid.neighbours(c(0, 1)), 4);
    }

    #[test]
    fn neighbours_at_domain_edge_do_not_overflow() {
        let mut grid = SparseGrid::new();
        grid.set_cell(c(i64::MAX, i64::MAX), true);
        grid.set_cell(c(i64::MAX - 1, i64::MAX), true);
        assert_eq!(grid.neighbours(c(i64::MAX, i64::MAX)), 1);
        assert_eq!(grid.neighbours(c(i64::MAX - 1, i64::MAX - 1)), 2);
    }

    #[test]
    fn iteration_is_ordered_and_bounds_cover_cells() {
        let grid = SparseGrid::from_iter([c(2, 5), c(-1, 3), c(2, -4), c(0, 0)]);
        let cells: Vec<Coord> = grid.iter().collect();
        assert_eq!(cells, vec![c(-1, 3), c(0, 0), c(2, -4), c(2, 5)]);
        assert_eq!(grid.bounds(), Some((-1, -4, 2, 5)));
        assert_eq!(SparseGrid::new().bounds(), None);

        let mut seen = Vec::new();
        grid.for_each_live(|x, y| seen.push(c(x, y)));
        assert_eq!(seen, cells);
    }

    #[test]
    fn rule_is_carried_and_reconfigurable() {
        let mut grid = SparseGrid::with_rule(LifeRule::maze());
        assert_eq!(grid.rule(), LifeRule::maze());
        grid.set_rule(LifeRule::conway());
        assert_eq!(grid.rule(), LifeRule::conway());
    }
}
