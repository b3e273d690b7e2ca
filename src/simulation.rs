//! Interactive session around a [`SparseGrid`].
//!
//! Holds the live generation, a compute pool for stepping, a fixed-rate tick
//! clock and the edit gesture state. Timed steps are suppressed while an edit
//! is in progress so the grid is never advanced mid-edit.

use std::sync::OnceLock;
use std::time::Duration;

use crate::error::LifeError;
use crate::sparse::{
    Coord, LifeRule, PARALLEL_STEP_MIN_POPULATION, SparseGrid, StepBackend, Stepper,
};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

static PHYSICAL_CORES: OnceLock<usize> = OnceLock::new();

#[inline]
fn physical_core_count() -> usize {
    *PHYSICAL_CORES.get_or_init(|| num_cpus::get_physical().max(1))
}

/// Configuration for a [`Simulation`].
///
/// `SimulationConfig::default()` gives auto-detected threads, automatic
/// backend selection and a one-second tick.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Threads in the stepping pool. `None` means one per physical core.
    pub thread_count: Option<usize>,
    /// Hard upper bound on threads regardless of auto-detection.
    pub max_threads: Option<usize>,
    /// Forced backend. `None` picks by population; set
    /// `SPARSE_LIFE_PARALLEL=0` to keep auto mode serial.
    pub backend: Option<StepBackend>,
    /// Population at which auto mode switches to the parallel backend.
    pub parallel_min_population: usize,
    /// Interval between timed steps in [`Simulation::advance`].
    pub tick_period: Duration,
    pub rule: LifeRule,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            thread_count: None,
            max_threads: None,
            backend: None,
            parallel_min_population: PARALLEL_STEP_MIN_POPULATION,
            tick_period: DEFAULT_TICK_PERIOD,
            rule: LifeRule::default(),
        }
    }
}

impl SimulationConfig {
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    pub fn max_threads(mut self, n: usize) -> Self {
        self.max_threads = Some(n.max(1));
        self
    }

    pub fn backend(mut self, backend: StepBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn parallel_min_population(mut self, population: usize) -> Self {
        self.parallel_min_population = population;
        self
    }

    pub fn tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn rule(mut self, rule: LifeRule) -> Self {
        self.rule = rule;
        self
    }
}

fn resolve_thread_count(config: &SimulationConfig) -> usize {
    let mut threads = config.thread_count.unwrap_or_else(physical_core_count);
    if let Some(cap) = config.max_threads {
        threads = threads.min(cap);
    }
    threads.max(1)
}

/// Fixed-rate step clock. Starts primed so the first tick fires.
#[derive(Clone, Copy, Debug)]
struct TickClock {
    period: Duration,
    accumulated: Duration,
}

impl TickClock {
    fn new(period: Duration) -> Self {
        Self {
            period,
            accumulated: period,
        }
    }

    /// At most one step per call; the remainder is dropped when it fires.
    fn tick(&mut self, elapsed: Duration, blocked: bool) -> bool {
        if !blocked && self.accumulated.saturating_add(elapsed) >= self.period {
            self.accumulated = Duration::ZERO;
            true
        } else {
            self.accumulated = self.accumulated.saturating_add(elapsed);
            false
        }
    }
}

pub struct Simulation {
    grid: SparseGrid,
    generation: u64,
    pool: rayon::ThreadPool,
    stepper: Stepper,
    clock: TickClock,
    editing: bool,
}

impl Simulation {
    pub fn new() -> Result<Self, LifeError> {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Result<Self, LifeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(resolve_thread_count(&config))
            .build()?;
        let mut stepper = Stepper::new().parallel_min_population(config.parallel_min_population);
        if let Some(backend) = config.backend {
            stepper = stepper.backend(backend);
        }

        Ok(Self {
            grid: SparseGrid::with_rule(config.rule),
            generation: 0,
            pool,
            stepper,
            clock: TickClock::new(config.tick_period),
            editing: false,
        })
    }

    #[inline]
    pub fn grid(&self) -> &SparseGrid {
        &self.grid
    }

    /// Replace the live grid (rule included) and restart the generation count.
    pub fn set_grid(&mut self, grid: SparseGrid) {
        self.grid = grid;
        self.generation = 0;
    }

    pub fn into_grid(self) -> SparseGrid {
        self.grid
    }

    #[inline]
    pub fn rule(&self) -> LifeRule {
        self.grid.rule()
    }

    pub fn set_rule(&mut self, rule: LifeRule) {
        self.grid.set_rule(rule);
    }

    pub fn set_cell(&mut self, pos: Coord, alive: bool) {
        self.grid.set_cell(pos, alive);
    }

    #[inline]
    pub fn get_cell(&self, pos: Coord) -> bool {
        self.grid.get_cell(pos)
    }

    pub fn toggle_cell(&mut self, pos: Coord) -> bool {
        self.grid.toggle_cell(pos)
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Start an edit gesture; timed steps pause until [`Simulation::end_edit`].
    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    pub fn end_edit(&mut self) {
        self.editing = false;
    }

    #[inline]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Advance one generation. On error the current grid is kept.
    pub fn step(&mut self) -> Result<(), LifeError> {
        let next = self.pool.install(|| self.stepper.step(&self.grid))?;
        self.grid = next;
        self.generation += 1;
        Ok(())
    }

    /// Advance `n` generations, stopping at the first error.
    pub fn step_n(&mut self, n: u64) -> Result<(), LifeError> {
        let Self {
            grid,
            generation,
            pool,
            stepper,
            ..
        } = self;
        pool.install(|| -> Result<(), LifeError> {
            for _ in 0..n {
                *grid = stepper.step(grid)?;
                *generation += 1;
            }
            Ok(())
        })
    }

    /// Feed wall-clock time to the tick clock; returns whether a step ran.
    pub fn advance(&mut self, elapsed: Duration) -> Result<bool, LifeError> {
        if !self.clock.tick(elapsed, self.editing) {
            return Ok(false);
        }
        self.step()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Simulation, SimulationConfig, TickClock, resolve_thread_count};
    use crate::sparse::{Coord, LifeRule, StepBackend};

    #[test]
    fn thread_count_respects_explicit_and_cap() {
        let cfg = SimulationConfig::default().thread_count(6).max_threads(4);
        assert_eq!(resolve_thread_count(&cfg), 4);
        let cfg = SimulationConfig::default().thread_count(0);
        assert_eq!(resolve_thread_count(&cfg), 1);
        assert!(resolve_thread_count(&SimulationConfig::default()) >= 1);
    }

    #[test]
    fn clock_starts_primed_and_fires_once_per_tick() {
        let mut clock = TickClock::new(Duration::from_millis(100));
        assert!(clock.tick(Duration::ZERO, false));
        assert!(!clock.tick(Duration::from_millis(60), false));
        assert!(clock.tick(Duration::from_millis(40), false));
        assert!(!clock.tick(Duration::from_millis(10), false));
        assert!(clock.tick(Duration::from_secs(10), false));
        assert!(!clock.tick(Duration::ZERO, false));
    }

    #[test]
    fn blocked_clock_accumulates_and_fires_after_release() {
        let mut clock = TickClock::new(Duration::from_millis(100));
        assert!(clock.tick(Duration::ZERO, false));
        assert!(!clock.tick(Duration::from_millis(150), true));
        assert!(!clock.tick(Duration::from_millis(150), true));
        assert!(clock.tick(Duration::ZERO, false));
    }

    #[test]
    fn step_counts_generations_and_keeps_rule() {
        let mut sim = Simulation::with_config(
            SimulationConfig::default()
                .thread_count(2)
                .rule(LifeRule::maze()),
        )
        .unwrap();
        assert_eq!(sim.thread_count(), 2);
        for (x, y) in [(0, 0), (1, 0), (2, 0)] {
            sim.set_cell(Coord::new(x, y), true);
        }
        sim.step().unwrap();
        sim.step_n(3).unwrap();
        assert_eq!(sim.generation(), 4);
        assert_eq!(sim.rule(), LifeRule::maze());
    }

    #[test]
    fn failed_step_keeps_grid_and_generation() {
        let mut sim =
            Simulation::with_config(SimulationConfig::default().backend(StepBackend::Serial))
                .unwrap();
        sim.set_cell(Coord::new(i64::MAX, 0), true);
        let before = sim.grid().clone();
        assert!(sim.step().is_err());
        assert!(sim.step_n(2).is_err());
        assert_eq!(sim.grid(), &before);
        assert_eq!(sim.generation(), 0);
    }
}
