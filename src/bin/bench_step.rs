//! Stepping throughput across board sizes for both backends.
//!
//! Use with `--release` for meaningful numbers.

#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use rand::RngCore;
use rand::SeedableRng;
use sparse_life::{Coord, Simulation, SimulationConfig, SparseGrid, StepBackend};
use std::time::Instant;

fn seed_board(size: i64, density: f64, seed: u64) -> SparseGrid {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let threshold = (u64::MAX as f64 * density) as u64;
    let mut grid = SparseGrid::new();
    for y in 0..size {
        for x in 0..size {
            if rng.next_u64() <= threshold {
                grid.set_cell(Coord::new(x, y), true);
            }
        }
    }
    grid
}

fn bench(grid: &SparseGrid, backend: StepBackend, iterations: u64) -> (f64, usize) {
    let mut sim = Simulation::with_config(SimulationConfig::default().backend(backend))
        .expect("failed to build stepping thread pool");
    sim.set_grid(grid.clone());

    let start = Instant::now();
    sim.step_n(iterations).expect("benchmark board stays inside the plane");
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;
    (total_ms, sim.population())
}

fn main() {
    let scales: &[(i64, u64)] = &[(64, 200), (128, 100), (256, 50), (512, 20), (1024, 5)];

    println!(
        "{:<10} {:>10} {:>8} {:>14} {:>14} {:>8}",
        "Grid", "Pop", "Iters", "Serial(ms)", "Parallel(ms)", "Match"
    );
    println!("{}", "-".repeat(70));

    for &(size, iters) in scales {
        let grid = seed_board(size, 0.35, 0x5EED_1234_ABCD_EF01);
        let (serial_ms, serial_pop) = bench(&grid, StepBackend::Serial, iters);
        let (parallel_ms, parallel_pop) = bench(&grid, StepBackend::Parallel, iters);
        println!(
            "{:<10} {:>10} {:>8} {:>14.1} {:>14.1} {:>8}",
            format!("{size}x{size}"),
            grid.population(),
            iters,
            serial_ms,
            parallel_ms,
            if serial_pop == parallel_pop { "yes" } else { "NO" }
        );
    }
}
