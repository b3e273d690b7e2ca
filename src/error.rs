//! Error types for sparse-life.

use thiserror::Error;

/// Errors produced by grid stepping, rule parsing and session setup.
#[derive(Debug, Error)]
pub enum LifeError {
    /// A neighbourhood reached past the edge of the `i64` coordinate domain.
    #[error("coordinate overflow: neighbourhood of ({x}, {y}) leaves the i64 plane")]
    CoordinateOverflow { x: i64, y: i64 },

    /// Rule notation could not be parsed into survive/revive ranges.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// The session's compute pool could not be built.
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
