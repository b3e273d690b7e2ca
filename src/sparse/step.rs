//! Generation stepping for [`SparseGrid`].
//!
//! Every alive cell is checked for survival, and every dead neighbour of an
//! alive cell is checked for revival. A dead cell bordering several alive
//! cells is discovered several times; a [`CoordSet`] ensures it is evaluated
//! once. All counts read the previous generation only, so the update is
//! synchronous.
//!
//! The parallel backend splits the grid's columns into chunks on the current
//! rayon pool. Each worker dedups with its own set and the partial results are
//! merged into a set-backed grid, so a coordinate found by two workers is
//! still stored once.

use std::sync::OnceLock;

use rayon::prelude::*;

use super::coord::Coord;
use super::coord_set::CoordSet;
use super::grid::SparseGrid;
use super::rule::RuleTable;
use crate::error::LifeError;

/// Below this population, auto mode steps serially.
pub const PARALLEL_STEP_MIN_POPULATION: usize = 2_048;
const PARALLEL_CHUNKS_PER_WORKER: usize = 4;
const PARALLEL_CHUNK_MIN_COLUMNS: usize = 8;
const PARALLEL_CHUNK_MAX_COLUMNS: usize = 4_096;

static AUTO_PARALLEL: OnceLock<bool> = OnceLock::new();

/// How a generation is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepBackend {
    Serial,
    Parallel,
}

/// Interpret a `SPARSE_LIFE_PARALLEL` value. Only `0`/`false` disable auto
/// parallelism; unset or unrecognised values keep it on.
fn parse_parallel_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => false,
        _ => true,
    }
}

/// Reads `SPARSE_LIFE_PARALLEL` once.
fn auto_parallel_enabled() -> bool {
    *AUTO_PARALLEL.get_or_init(|| {
        parse_parallel_flag(std::env::var("SPARSE_LIFE_PARALLEL").ok().as_deref())
    })
}

#[inline]
fn parallel_chunk_columns(columns: usize, workers: usize) -> usize {
    let target_chunks = workers.max(1).saturating_mul(PARALLEL_CHUNKS_PER_WORKER);
    columns
        .div_ceil(target_chunks)
        .clamp(PARALLEL_CHUNK_MIN_COLUMNS, PARALLEL_CHUNK_MAX_COLUMNS)
}

/// Steps grids while reusing the candidate deduper between generations.
pub struct Stepper {
    backend: Option<StepBackend>,
    parallel_min_population: usize,
    visited: CoordSet,
}

impl Default for Stepper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stepper {
    pub fn new() -> Self {
        Self {
            backend: None,
            parallel_min_population: PARALLEL_STEP_MIN_POPULATION,
            visited: CoordSet::new(),
        }
    }

    /// Force a backend instead of choosing by population.
    pub fn backend(mut self, backend: StepBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn parallel_min_population(mut self, population: usize) -> Self {
        self.parallel_min_population = population;
        self
    }

    /// The backend that [`Stepper::step`] would use for `grid` on the current pool.
    pub fn resolve_backend(&self, grid: &SparseGrid) -> StepBackend {
        if let Some(backend) = self.backend {
            return backend;
        }
        if !auto_parallel_enabled()
            || rayon::current_num_threads() <= 1
            || grid.population() < self.parallel_min_population
        {
            StepBackend::Serial
        } else {
            StepBackend::Parallel
        }
    }

    /// Compute the next generation of `grid`. `grid` is left untouched.
    pub fn step(&mut self, grid: &SparseGrid) -> Result<SparseGrid, LifeError> {
        match self.resolve_backend(grid) {
            StepBackend::Serial => step_serial(grid, &mut self.visited),
            StepBackend::Parallel => step_parallel(grid),
        }
    }
}

/// Evaluate one alive cell: emit it if it survives, then emit each of its
/// dead neighbours that revives and has not been seen in `visited`.
#[inline]
fn evaluate_cell<F: FnMut(Coord)>(
    grid: &SparseGrid,
    table: &RuleTable,
    pos: Coord,
    visited: &mut CoordSet,
    mut emit: F,
) -> Result<(), LifeError> {
    let around = pos.neighbours()?;
    if table.survives(grid.neighbours(pos)) {
        emit(pos);
    }
    if !table.any_revival() {
        return Ok(());
    }
    for p in around {
        if grid.get_cell(p) || !visited.insert(p) {
            continue;
        }
        if table.revives(grid.neighbours(p)) {
            emit(p);
        }
    }
    Ok(())
}

fn step_serial(grid: &SparseGrid, visited: &mut CoordSet) -> Result<SparseGrid, LifeError> {
    let table = RuleTable::new(grid.rule());
    let mut next = SparseGrid::with_rule(grid.rule());

    visited.clear();
    visited.reserve_for(grid.population().saturating_mul(3));

    for pos in grid.iter() {
        evaluate_cell(grid, &table, pos, visited, |p| next.set_cell(p, true))?;
    }
    Ok(next)
}

fn step_parallel(grid: &SparseGrid) -> Result<SparseGrid, LifeError> {
    let table = RuleTable::new(grid.rule());
    let columns: Vec<(i64, usize)> = grid
        .columns()
        .iter()
        .map(|(&x, column)| (x, column.len()))
        .collect();
    let chunk = parallel_chunk_columns(columns.len(), rayon::current_num_threads());

    // Indexed collect keeps chunk order, so the reported error is the first in x order.
    let partials: Vec<Result<Vec<Coord>, LifeError>> = columns
        .par_chunks(chunk)
        .map(|chunk| -> Result<Vec<Coord>, LifeError> {
            let cells: usize = chunk.iter().map(|&(_, len)| len).sum();
            let mut visited = CoordSet::with_capacity(cells.saturating_mul(3));
            let mut out = Vec::with_capacity(cells);
            for &(x, _) in chunk {
                let Some(column) = grid.columns().get(&x) else {
                    continue;
                };
                for &y in column {
                    evaluate_cell(grid, &table, Coord::new(x, y), &mut visited, |p| {
                        out.push(p)
                    })?;
                }
            }
            Ok(out)
        })
        .collect();

    let mut next = SparseGrid::with_rule(grid.rule());
    for partial in partials {
        next.extend(partial?);
    }
    Ok(next)
}
