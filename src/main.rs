use clap::Parser as _;
use rand::SeedableRng;

mod cli;
mod cluster;
mod data;
mod engines;


/// Program entry point
fn main() {
    let cli::Args {
        engine,
        size,
        runs,
        threads,
        workers,
        local_threads,
        seed,
        output,
    } = cli::Args::parse();

    println!("Running measurements for the {engine} engine");
    match engine {
        cli::Engine::Sequential => println!("Runs: {runs}, Size: {size}"),
        cli::Engine::Parallel => println!("Runs: {runs}, Size: {size}, Threads: {threads}"),
        cli::Engine::Distributed => println!(
            "Runs: {runs}, Size: {size}, Workers: {workers}, Local threads: {local_threads}"
        ),
    }

    // Create rng
    let mut rng = match seed {
        Some(partial_seed) => rand::rngs::StdRng::seed_from_u64(partial_seed),
        None => {
            println!("No seed provided, generating one using system rng");
            rand::rngs::StdRng::from_os_rng()
        }
    };

    let (samples, stats) = match engine {
        cli::Engine::Sequential => {
            perform_experiment(runs, size, &mut rng, Violation::Report, |mut values| {
                engines::sequential::sort(&mut values);
                values
            })
        }
        cli::Engine::Parallel => match build_pool(threads) {
            Some(pool) => {
                perform_experiment(runs, size, &mut rng, Violation::Report, |mut values| {
                    engines::parallel::sort(&pool, &mut values);
                    values
                })
            }
            None => perform_experiment(runs, size, &mut rng, Violation::Report, |mut values| {
                engines::sequential::sort(&mut values);
                values
            }),
        },
        cli::Engine::Distributed => {
            let plan = cluster::PartitionPlan::balanced(size, workers);
            perform_experiment(runs, size, &mut rng, Violation::Abort, |values| {
                distributed_run(&plan, workers, local_threads, values)
            })
        }
    };

    println!("Stats: {stats:?}");
    println!("Time: {:.6}", stats.mean);

    if let Some(path) = output {
        write_samples(&path, &samples);
    }
}

/// How a detected ordering violation is handled
#[derive(Clone, Copy, PartialEq, Eq)]
enum Violation {
    /// Report on stderr and keep measuring
    Report,
    /// Report and exit, nothing may consume a broken distributed result
    Abort,
}

/// Perform a time sampling experiment on the given engine
///
/// - runs: The number of samples to measure, a warmup run is prepended and
///   discarded
/// - size: The size of the sequences to sort
/// - rng: The rng used for sampling the data
fn perform_experiment(
    runs: usize,
    size: usize,
    rng: &mut rand::rngs::StdRng,
    violation: Violation,
    mut sort_run: impl FnMut(Vec<i32>) -> Vec<i32>,
) -> (Vec<std::time::Duration>, rolling_stats::Stats<f64>) {
    let mut samples = Vec::with_capacity(runs);

    let mut stats: rolling_stats::Stats<f64> = rolling_stats::Stats::new();

    let bar = indicatif::ProgressBar::new(runs as u64);

    for run in 0..=runs {
        let values = data::uniform_values(size, rng);

        let now = std::time::Instant::now();
        let sorted = sort_run(std::hint::black_box(values));
        let elapsed = now.elapsed();

        if let Some(index) = first_order_violation(&sorted) {
            eprintln!(
                "Test FAILED: values[{index}] = {left} > values[{next}] = {right}",
                next = index + 1,
                left = sorted[index],
                right = sorted[index + 1],
            );
            if violation == Violation::Abort {
                std::process::exit(1);
            }
        }

        // Skip the first sample, it warms up caches and pools
        if run != 0 {
            samples.push(elapsed);
            stats.update(elapsed.as_secs_f64());

            bar.inc(1);
        }
    }

    (samples, stats)
}

/// Find the first index whose element exceeds its successor
fn first_order_violation(values: &[i32]) -> Option<usize> {
    values.windows(2).position(|pair| pair[0] > pair[1])
}

/// One distributed sort: spin up a process group, scatter, sort locally,
/// gather and fold at the coordinator
fn distributed_run(
    plan: &cluster::PartitionPlan,
    workers: usize,
    local_threads: usize,
    values: Vec<i32>,
) -> Vec<i32> {
    use cluster::Collective as _;

    let input = std::sync::Mutex::new(Some(values));

    let mut results = cluster::run_group(workers, |endpoint| {
        let input = (endpoint.rank() == cluster::COORDINATOR)
            .then(|| input.lock().unwrap().take())
            .flatten();

        match (local_threads > 1).then(|| build_pool(local_threads)).flatten() {
            Some(pool) => engines::distributed::sort(&endpoint, plan, input, |shard| {
                engines::parallel::sort(&pool, shard)
            }),
            None => engines::distributed::sort(&endpoint, plan, input, engines::sequential::sort),
        }
    });

    for (rank, result) in results.iter().enumerate() {
        if let Err(error) = result {
            eprintln!("Distributed sort failed at rank {rank}: {error}");
            std::process::exit(1);
        }
    }

    match results.swap_remove(cluster::COORDINATOR) {
        Ok(Some(sorted)) => sorted,
        _ => unreachable!("the coordinator either fails or produces the output"),
    }
}

/// Build a bounded worker pool, degrading to the sequential engine on
/// failure
fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(error) => {
            eprintln!(
                "Could not build a {threads} thread pool ({error}), \
                 falling back to the sequential engine"
            );
            None
        }
    }
}

/// Write one sample per line, in seconds
fn write_samples(path: &std::path::Path, samples: &[std::time::Duration]) {
    let lines: String = samples
        .iter()
        .map(|sample| format!("{}\n", sample.as_secs_f64()))
        .collect();

    if let Err(error) = std::fs::write(path, lines) {
        eprintln!("Could not write samples to {}: {error}", path.display());
    }
}
