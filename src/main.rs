#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use rand::RngCore;
use rand::SeedableRng;
use sparse_life::{
    Coord, LifeRule, Pattern, Simulation, SimulationConfig, SparseGrid, StepBackend,
};
use std::time::{Duration, Instant};

const USAGE: &str = "usage: sparse-life [--rule B3/S23] [--pattern NAME | --size N --density D --seed S] \
[--steps N] [--check-interval N] [--threads N] [--serial]";

struct MainArgs {
    rule: LifeRule,
    pattern: Option<&'static Pattern>,
    size: i64,
    density: f64,
    seed: u64,
    steps: u64,
    check_interval: u64,
    threads: Option<usize>,
    serial_only: bool,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = MainArgs {
        rule: LifeRule::default(),
        pattern: None,
        size: 256,
        density: 0.35,
        seed: 0x5EED_1234_ABCD_EF01,
        steps: 200,
        check_interval: 50,
        threads: None,
        serial_only: false,
    };
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value\n{USAGE}"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rule" => {
                i += 1;
                parsed.rule = next_arg(i, "--rule")
                    .parse()
                    .unwrap_or_else(|e| panic!("--rule: {e}"));
            }
            "--pattern" => {
                i += 1;
                let name = next_arg(i, "--pattern");
                parsed.pattern = Some(
                    Pattern::by_name(name).unwrap_or_else(|| panic!("unknown pattern: {name}")),
                );
            }
            "--size" => {
                i += 1;
                parsed.size = next_arg(i, "--size")
                    .parse()
                    .expect("--size requires a positive integer");
            }
            "--density" => {
                i += 1;
                parsed.density = next_arg(i, "--density")
                    .parse()
                    .expect("--density requires a number in 0..=1");
            }
            "--seed" => {
                i += 1;
                parsed.seed = next_arg(i, "--seed")
                    .parse()
                    .expect("--seed requires an unsigned integer");
            }
            "--steps" => {
                i += 1;
                parsed.steps = next_arg(i, "--steps")
                    .parse()
                    .expect("--steps requires an unsigned integer");
            }
            "--check-interval" => {
                i += 1;
                parsed.check_interval = next_arg(i, "--check-interval")
                    .parse::<u64>()
                    .expect("--check-interval requires a positive integer")
                    .max(1);
            }
            "--threads" => {
                i += 1;
                let n: usize = next_arg(i, "--threads")
                    .parse()
                    .expect("--threads requires a positive integer");
                parsed.threads = Some(n);
            }
            "--serial" => {
                parsed.serial_only = true;
            }
            other => panic!("unknown argument: {other}\n{USAGE}"),
        }
        i += 1;
    }
    parsed
}

fn seed_grid(args: &MainArgs) -> SparseGrid {
    if let Some(pattern) = args.pattern {
        return SparseGrid::from_pattern(args.rule, pattern, Coord::new(0, 0))
            .unwrap_or_else(|e| panic!("--pattern {}: {e}", pattern.name));
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);
    let threshold = (u64::MAX as f64 * args.density.clamp(0.0, 1.0)) as u64;
    let half = args.size / 2;
    let mut grid = SparseGrid::with_rule(args.rule);
    for y in -half..half {
        for x in -half..half {
            if rng.next_u64() <= threshold {
                grid.set_cell(Coord::new(x, y), true);
            }
        }
    }
    grid
}

fn build_session(args: &MainArgs, backend: StepBackend, grid: SparseGrid) -> Simulation {
    let mut config = SimulationConfig::default().backend(backend).rule(args.rule);
    if let Some(n) = args.threads {
        config = config.thread_count(n);
    }
    let mut sim = Simulation::with_config(config).expect("failed to build stepping thread pool");
    sim.set_grid(grid);
    sim
}

fn timed_steps(sim: &mut Simulation, n: u64) -> Duration {
    let start = Instant::now();
    sim.step_n(n)
        .unwrap_or_else(|e| panic!("generation {}: {e}", sim.generation()));
    start.elapsed()
}

fn main() {
    let args = parse_args();
    let grid = seed_grid(&args);
    println!(
        "Rule {}, initial population {}, {} generations",
        args.rule,
        grid.population(),
        args.steps
    );

    let mut serial = build_session(&args, StepBackend::Serial, grid.clone());
    let mut parallel = (!args.serial_only).then(|| build_session(&args, StepBackend::Parallel, grid));

    let mut serial_total = Duration::ZERO;
    let mut parallel_total = Duration::ZERO;
    let mut done = 0u64;

    while done < args.steps {
        let chunk = args.check_interval.min(args.steps - done);
        done += chunk;

        let serial_phase = timed_steps(&mut serial, chunk);
        serial_total += serial_phase;
        let serial_ms = serial_phase.as_secs_f64() * 1000.0;

        match parallel.as_mut() {
            Some(parallel) => {
                let parallel_phase = timed_steps(parallel, chunk);
                parallel_total += parallel_phase;
                let parallel_ms = parallel_phase.as_secs_f64() * 1000.0;
                let status = if serial.grid() == parallel.grid() {
                    "MATCH"
                } else {
                    "MISMATCH"
                };
                println!(
                    "Generation {done}: serial pop = {}, parallel pop = {} [{status}]",
                    serial.population(),
                    parallel.population()
                );
                println!(
                    "  Serial: {serial_ms:.3} ms | Parallel ({} threads): {parallel_ms:.3} ms",
                    parallel.thread_count()
                );
            }
            None => {
                println!(
                    "Generation {done}: pop = {} ({serial_ms:.3} ms)",
                    serial.population()
                );
            }
        }
    }

    if let Some((min_x, min_y, max_x, max_y)) = serial.grid().bounds() {
        println!("Bounds: ({min_x}, {min_y}) .. ({max_x}, {max_y})");
    }

    let steps = args.steps.max(1) as f64;
    let serial_ms = serial_total.as_secs_f64() * 1000.0;
    println!("\n--- Summary ({} generations) ---", args.steps);
    println!("Serial:   {serial_ms:.3} ms total, {:.6} ms/gen", serial_ms / steps);
    if parallel.is_some() {
        let parallel_ms = parallel_total.as_secs_f64() * 1000.0;
        println!(
            "Parallel: {parallel_ms:.3} ms total, {:.6} ms/gen",
            parallel_ms / steps
        );
        println!("Speedup (serial / parallel): {:.2}x", serial_ms / parallel_ms.max(1e-9));
    }
}
