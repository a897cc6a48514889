use crate::tools::{BoaAlgorithm, Mcrl2Equivalence};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "boa-bench")]
/// Benchmarks boa and mCRL2's ltsconvert and compares their results
pub struct BoaBenchArgs {
    /// The directory that holds the cached result sets.
    #[arg(long, global = true, default_value = "./cache")]
    pub cache_dir: PathBuf,
    /// The directory that receives the rendered reports.
    #[arg(long, global = true, default_value = "./results")]
    pub results_dir: PathBuf,
    /// Indicates what should be done.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Runs a tool on a benchmark set, unless its results are already cached.
    Run {
        /// Indicates which tool should be benchmarked.
        #[command(subcommand)]
        tool: ToolName,
    },
    /// Renders a comparison table from cached result sets.
    Report {
        /// Indicates which comparison should be rendered.
        #[command(subcommand)]
        report: ReportName,
    },
    /// Writes a cached result set as CSV.
    Export {
        /// The name of the benchmark set.
        #[arg(long)]
        set_name: String,
        /// The number of repetitions of the cached run.
        #[arg(long, default_value = "1")]
        repetitions: u32,
        /// The CSV file. Defaults to standard output.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Identifies a benchmark set in the cache.
#[derive(Args, Clone, Debug)]
pub struct SetArgs {
    /// The glob pattern that selects the input files.
    #[arg(long)]
    pub glob: String,
    /// The name under which the results are cached.
    #[arg(long)]
    pub set_name: String,
    /// How often each input file is measured.
    #[arg(long, default_value = "1")]
    pub repetitions: u32,
}

#[derive(Subcommand)]
pub enum ToolName {
    /// Runs boa (`<executable> <algorithm> <file>`).
    Boa {
        #[command(flatten)]
        set: SetArgs,
        /// The partition refinement algorithm.
        #[arg(long, value_enum, default_value = "nlogn")]
        algorithm: BoaAlgorithm,
        /// The boa executable.
        #[arg(long, default_value = "./target/release/boa")]
        executable: PathBuf,
        /// The wall-clock limit of a single run in seconds. Unlimited by default.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Runs ltsconvert (`<executable> --timings --equivalence=<equivalence> <file>`).
    Mcrl2 {
        #[command(flatten)]
        set: SetArgs,
        /// The equivalence to reduce modulo.
        #[arg(long, value_enum, default_value = "bisim")]
        equivalence: Mcrl2Equivalence,
        /// The ltsconvert executable.
        #[arg(long, default_value = "ltsconvert")]
        executable: PathBuf,
        /// The wall-clock limit of a single run in seconds.
        #[arg(long, default_value = "500")]
        timeout: u64,
    },
}

#[derive(Subcommand)]
pub enum ReportName {
    /// Compares boa with ltsconvert.
    Mcrl2 {
        /// The cached boa set.
        #[arg(long)]
        boa_set: String,
        /// The cached ltsconvert set.
        #[arg(long)]
        mcrl2_set: String,
        /// The number of repetitions of both cached runs.
        #[arg(long, default_value = "1")]
        repetitions: u32,
        /// Benchmarks on which ltsconvert takes less time (in seconds) are omitted.
        #[arg(long, default_value = "1.0")]
        noise_floor: f64,
        /// Also writes the table as a LaTeX `tabular`.
        #[arg(long)]
        latex: bool,
    },
    /// Compares two algorithms of the same tool, e.g. `boa-naive` and `boa-nlogn`.
    Algorithms {
        /// The cached set shown first.
        #[arg(long)]
        set_a: String,
        /// The cached set shown second.
        #[arg(long)]
        set_b: String,
        /// The number of repetitions of both cached runs.
        #[arg(long, default_value = "1")]
        repetitions: u32,
        /// Benchmarks on which the first set takes less time (in seconds) are omitted.
        #[arg(long)]
        noise_floor: Option<f64>,
        /// Also writes the table as a LaTeX `tabular`.
        #[arg(long)]
        latex: bool,
    },
}
