//! Sparse Game of Life engine on an unbounded plane, with range-based
//! birth/survival rules (B3/S23 by default).

pub mod error;
pub mod patterns;
pub mod simulation;
pub mod sparse;

pub use error::LifeError;
pub use patterns::Pattern;
pub use simulation::{Simulation, SimulationConfig};
pub use sparse::{Coord, LifeRule, SparseGrid, StepBackend, Stepper};
