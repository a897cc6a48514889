use crate::extract::{MetricSchema, MEM_KB};
use crate::runner::{ProcessRunner, RunOutput};
use anyhow::Context;
use boa_bench_model::{BenchmarkTarget, MetricValue, RunResult};
use std::ffi::OsStr;
use std::time::Duration;
use tracing::warn;

mod boa;
mod mcrl2;

pub use boa::{BoaAlgorithm, BoaTool, BOA_TAG, NUM_PARTITIONS, NUM_STATES};
pub use mcrl2::{
    Mcrl2Equivalence, Mcrl2Tool, MCRL2_DEFAULT_TIMEOUT, MCRL2_TAG, SELF_REPORT,
};

/// The peak memory of a run in MB, derived from [MEM_KB].
pub const MEM_MB: &str = "mem_mb";
/// The size of the input file in MB.
pub const COMPRESSED_SIZE_MB: &str = "compressedsize_mb";
/// The benchmark family of the input file.
pub const CATEGORY: &str = "category";

/// An external executable that can be benchmarked.
///
/// A tool knows how to invoke itself on a [BenchmarkTarget] and which metrics its output
/// contains. The invocation itself is done by [run_tool].
pub trait BenchmarkTool {
    /// Returns the prefix used to tag the results of this tool.
    fn tag(&self) -> &'static str;

    /// Returns the algorithm identifier that is recorded with every result.
    fn algorithm(&self) -> &str;

    /// Returns the executable.
    fn program(&self) -> &OsStr;

    /// Returns the arguments for measuring `target`.
    fn args(&self, target: &BenchmarkTarget) -> Vec<String>;

    /// Returns the wall-clock limit of a single run.
    fn timeout(&self) -> Option<Duration>;

    /// Returns the metrics that are extracted from every completed run.
    fn schema(&self) -> &MetricSchema;
}

/// Runs `tool` once on `target` and records its metrics.
///
/// In addition to the metrics of the tool's schema, the result holds [MEM_MB],
/// [COMPRESSED_SIZE_MB], and [CATEGORY]. A run that exceeds the timeout yields a timed-out result
/// in which every numeric metric is missing.
pub async fn run_tool(
    runner: &ProcessRunner,
    tool: &dyn BenchmarkTool,
    target: &BenchmarkTarget,
) -> anyhow::Result<RunResult> {
    let file = target.path().display().to_string();
    let output = runner
        .run(tool.program(), &tool.args(target), tool.timeout())
        .await
        .with_context(|| format!("Cannot run {} on '{file}'", tool.tag()))?;

    let (stdout, profiler) = match output {
        RunOutput::Completed { stdout, profiler } => (stdout, profiler),
        RunOutput::TimedOut => {
            warn!(file = %file, algorithm = tool.algorithm(), "Run timed out");
            let names = tool
                .schema()
                .names()
                .chain([MEM_MB, COMPRESSED_SIZE_MB]);
            let mut result = RunResult::timed_out(file, tool.algorithm(), names);
            result.insert(CATEGORY, target.category());
            return Ok(result);
        }
    };

    let metrics = tool
        .schema()
        .extract(&stdout, &profiler)
        .with_context(|| format!("Unexpected output of {} on '{file}'", tool.tag()))?;

    let mut result = RunResult::new(file, tool.algorithm());
    result.extend(metrics);
    let mem_mb = result
        .get(MEM_KB)
        .and_then(MetricValue::as_f64)
        .map_or(MetricValue::Missing, |kb| MetricValue::Float(kb / 1024.0));
    result.insert(MEM_MB, mem_mb);
    result.insert(COMPRESSED_SIZE_MB, target.size_mb());
    result.insert(CATEGORY, target.category());
    Ok(result)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::extract::TIME_SEC;
    use crate::profiler::Profiler;
    use std::path::PathBuf;

    const FAKE_TIME: &str = "\"$@\"; status=$?; \
        echo 'User time (seconds): 0.25' >&2; \
        echo 'Maximum resident set size (kbytes): 2048' >&2; \
        exit $status";

    fn fake_runner() -> ProcessRunner {
        ProcessRunner::new(Profiler::with_args("sh", ["-c", FAKE_TIME, "fake-time"]))
    }

    /// Creates a shell script that prints the output of boa.
    fn fake_boa(dir: &assert_fs::TempDir, body: &str) -> anyhow::Result<PathBuf> {
        use assert_fs::prelude::*;
        use std::os::unix::fs::PermissionsExt;

        let script = dir.child("boa");
        script.write_str(&format!("#!/bin/sh\n{body}\n"))?;
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755))?;
        Ok(script.path().to_path_buf())
    }

    #[tokio::test]
    async fn completed_run_has_derived_metrics() -> anyhow::Result<()> {
        let dir = assert_fs::TempDir::new()?;
        let executable = fake_boa(
            &dir,
            "echo 'Number of states: 100, Number of partitions: 25'",
        )?;
        let tool = BoaTool::try_new(executable, BoaAlgorithm::Nlogn, None)?;
        let target = BenchmarkTarget::new("benchmarks/wlan/wlan0.boa", 2 * 1024 * 1024);

        let result = run_tool(&fake_runner(), &tool, &target).await?;

        assert!(!result.is_timed_out());
        assert_eq!(result.get(NUM_STATES), Some(&MetricValue::Int(100)));
        assert_eq!(result.get(NUM_PARTITIONS), Some(&MetricValue::Int(25)));
        assert_eq!(result.get(TIME_SEC), Some(&MetricValue::Float(0.25)));
        assert_eq!(result.get(MEM_MB), Some(&MetricValue::Float(2.0)));
        assert_eq!(result.get(COMPRESSED_SIZE_MB), Some(&MetricValue::Float(2.0)));
        assert_eq!(result.get(CATEGORY), Some(&MetricValue::from("wlan")));
        assert_eq!(result.get("algorithm"), Some(&MetricValue::from("nlogn")));
        Ok(())
    }

    #[tokio::test]
    async fn timeout_yields_missing_metrics() -> anyhow::Result<()> {
        let dir = assert_fs::TempDir::new()?;
        let executable = fake_boa(&dir, "sleep 5")?;
        let tool = BoaTool::try_new(
            executable,
            BoaAlgorithm::Naive,
            Some(Duration::from_millis(200)),
        )?;
        let target = BenchmarkTarget::new("benchmarks/fms/fms_n3.boa", 10);

        let result = run_tool(&fake_runner(), &tool, &target).await?;

        assert!(result.is_timed_out());
        assert_eq!(result.get(TIME_SEC), Some(&MetricValue::Missing));
        assert_eq!(result.get(NUM_STATES), Some(&MetricValue::Missing));
        assert_eq!(result.get(MEM_MB), Some(&MetricValue::Missing));
        assert_eq!(result.get(CATEGORY), Some(&MetricValue::from("fms")));
        assert!(result.metrics().values().all(|v| v.as_f64().is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn unexpected_output_is_fatal() -> anyhow::Result<()> {
        let dir = assert_fs::TempDir::new()?;
        let executable = fake_boa(&dir, "echo 'Number of states: 1'")?;
        let tool = BoaTool::try_new(executable, BoaAlgorithm::Nlogn, None)?;
        let target = BenchmarkTarget::new("a.boa", 10);

        let error = run_tool(&fake_runner(), &tool, &target)
            .await
            .unwrap_err();
        assert!(format!("{error:#}").contains(NUM_PARTITIONS), "{error:#}");
        Ok(())
    }
}
