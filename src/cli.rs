//! Command line input handling

/// Command line arguments
#[derive(clap::Parser)]
#[command(author, version, about)]
pub struct Args {
    /// The sorting engine to run
    #[arg()]
    pub engine: Engine,
    /// The number of elements to sort
    #[arg(short, long, default_value_t = 1_000_000)]
    pub size: usize,
    /// The number of runs to measure, an extra warmup run is discarded
    #[arg(short, long, default_value_t = 10)]
    pub runs: usize,
    /// Worker threads of the task parallel engine
    #[arg(short, long, default_value_t = 8)]
    pub threads: usize,
    /// Ranks in the distributed engine's process group
    #[arg(short, long, default_value_t = 4)]
    pub workers: usize,
    /// Threads each rank uses for its local sort
    #[arg(long, default_value_t = 1)]
    pub local_threads: usize,
    /// Seed for the rng
    #[arg(long)]
    pub seed: Option<u64>,
    /// The output file to write the samples to
    pub output: Option<std::path::PathBuf>,
}

/// The available sorting engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Engine {
    /// Top-down merge sort on the calling thread
    Sequential,
    /// Fork-join merge sort on a work stealing pool
    Parallel,
    /// Partitioned merge sort over message passing ranks
    Distributed,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(clap::ValueEnum::to_possible_value(self).unwrap().get_name())
    }
}
