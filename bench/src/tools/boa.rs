use crate::extract::{MetricField, MetricSchema, OutputSource};
use crate::tools::BenchmarkTool;
use boa_bench_model::{BenchmarkTarget, Coercion};
use clap::ValueEnum;
use std::ffi::OsStr;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// The prefix of all boa metrics once results are tagged.
pub const BOA_TAG: &str = "boa";

/// The number of states of the input system.
pub const NUM_STATES: &str = "num_states";
/// The number of blocks of the computed partition, i.e., the size of the minimized system.
pub const NUM_PARTITIONS: &str = "num_partitions";

/// The partition refinement algorithm used by boa.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, ValueEnum)]
pub enum BoaAlgorithm {
    /// The naive refinement algorithm.
    Naive,
    /// The n log n refinement algorithm.
    Nlogn,
}

impl BoaAlgorithm {
    /// Returns the name that boa expects on its command line.
    pub fn as_str(self) -> &'static str {
        match self {
            BoaAlgorithm::Naive => "naive",
            BoaAlgorithm::Nlogn => "nlogn",
        }
    }
}

impl Display for BoaAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benchmarks the boa executable, invoked as `<executable> <algorithm> <file>`.
pub struct BoaTool {
    executable: PathBuf,
    algorithm: BoaAlgorithm,
    timeout: Option<Duration>,
    schema: MetricSchema,
}

impl BoaTool {
    /// Creates a new [BoaTool].
    pub fn try_new(
        executable: impl Into<PathBuf>,
        algorithm: BoaAlgorithm,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let schema = MetricSchema::profiler()?.with_fields([
            MetricField::new(
                NUM_STATES,
                OutputSource::Program,
                r"Number of states: ([0-9]+)",
                Coercion::Int,
            )?,
            MetricField::new(
                NUM_PARTITIONS,
                OutputSource::Program,
                r"Number of partitions: ([0-9]+)",
                Coercion::Int,
            )?,
        ]);
        Ok(Self {
            executable: executable.into(),
            algorithm,
            timeout,
            schema,
        })
    }
}

impl BenchmarkTool for BoaTool {
    fn tag(&self) -> &'static str {
        BOA_TAG
    }

    fn algorithm(&self) -> &str {
        self.algorithm.as_str()
    }

    fn program(&self) -> &OsStr {
        self.executable.as_os_str()
    }

    fn args(&self, target: &BenchmarkTarget) -> Vec<String> {
        vec![
            self.algorithm.to_string(),
            target.path().display().to_string(),
        ]
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn schema(&self) -> &MetricSchema {
        &self.schema
    }
}
