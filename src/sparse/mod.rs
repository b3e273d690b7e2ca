//! Sparse infinite-plane grid and its stepping backends.

mod coord;
mod coord_set;
mod grid;
mod rule;
mod step;

pub use coord::{Coord, NEIGHBOUR_OFFSETS};
pub use coord_set::CoordSet;
pub use grid::SparseGrid;
pub use rule::{LifeRule, RuleTable};
pub use step::{PARALLEL_STEP_MIN_POPULATION, StepBackend, Stepper};
