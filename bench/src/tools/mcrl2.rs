use crate::extract::{MetricField, MetricSchema, OutputSource};
use crate::tools::BenchmarkTool;
use boa_bench_model::{BenchmarkTarget, Coercion};
use clap::ValueEnum;
use std::ffi::OsStr;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// The prefix of all ltsconvert metrics once results are tagged.
pub const MCRL2_TAG: &str = "mcrl";

/// The reduction time that ltsconvert reports itself with `--timings`.
pub const SELF_REPORT: &str = "selfreport";

/// Larger instances of the slower equivalences do not finish in a reasonable time.
pub const MCRL2_DEFAULT_TIMEOUT: Duration = Duration::from_secs(500);

/// The equivalence ltsconvert reduces modulo.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, ValueEnum)]
pub enum Mcrl2Equivalence {
    /// Strong bisimilarity (Jansen et al.).
    Bisim,
    /// Strong bisimilarity (Groote and Vaandrager).
    BisimGv,
    /// Strong bisimilarity (Groote, Jansen, Keiren, and Wijs).
    BisimGjkw,
    /// Strong bisimilarity via signature refinement.
    BisimSig,
}

impl Mcrl2Equivalence {
    /// Returns the name that ltsconvert expects for `--equivalence`.
    pub fn as_str(self) -> &'static str {
        match self {
            Mcrl2Equivalence::Bisim => "bisim",
            Mcrl2Equivalence::BisimGv => "bisim-gv",
            Mcrl2Equivalence::BisimGjkw => "bisim-gjkw",
            Mcrl2Equivalence::BisimSig => "bisim-sig",
        }
    }
}

impl Display for Mcrl2Equivalence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benchmarks mCRL2's `ltsconvert`, invoked as
/// `<executable> --timings --equivalence=<equivalence> <file>`.
pub struct Mcrl2Tool {
    executable: PathBuf,
    equivalence: Mcrl2Equivalence,
    timeout: Option<Duration>,
    schema: MetricSchema,
}

impl Mcrl2Tool {
    /// Creates a new [Mcrl2Tool].
    pub fn try_new(
        executable: impl Into<PathBuf>,
        equivalence: Mcrl2Equivalence,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        // The timings are written to stderr and therefore end up in the profiler output.
        let schema = MetricSchema::profiler()?.with_fields([MetricField::new(
            SELF_REPORT,
            OutputSource::Profiler,
            r"reduction: ([0-9]+\.[0-9]+)",
            Coercion::Float,
        )?]);
        Ok(Self {
            executable: executable.into(),
            equivalence,
            timeout,
            schema,
        })
    }
}

impl BenchmarkTool for Mcrl2Tool {
    fn tag(&self) -> &'static str {
        MCRL2_TAG
    }

    fn algorithm(&self) -> &str {
        self.equivalence.as_str()
    }

    fn program(&self) -> &OsStr {
        self.executable.as_os_str()
    }

    fn args(&self, target: &BenchmarkTarget) -> Vec<String> {
        vec![
            "--timings".to_owned(),
            format!("--equivalence={}", self.equivalence),
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

#[cfg(test)]
mod tests {
    use super::*;
    use boa_bench_model::MetricValue;

    #[test]
    fn invocation() -> anyhow::Result<()> {
        let tool = Mcrl2Tool::try_new(
            "ltsconvert",
            Mcrl2Equivalence::BisimGjkw,
            Some(MCRL2_DEFAULT_TIMEOUT),
        )?;
        let target = BenchmarkTarget::new("ltsbenchmarks/wta/a/test3.aut", 1);

        assert_eq!(
            tool.args(&target),
            [
                "--timings",
                "--equivalence=bisim-gjkw",
                "ltsbenchmarks/wta/a/test3.aut"
            ]
        );
        assert_eq!(tool.timeout(), Some(Duration::from_secs(500)));
        assert_eq!(tool.algorithm(), "bisim-gjkw");
        Ok(())
    }

    #[test]
    fn self_report_is_read_from_stderr() -> anyhow::Result<()> {
        let tool = Mcrl2Tool::try_new("ltsconvert", Mcrl2Equivalence::Bisim, None)?;
        let stderr = "\
timing:
  reduction: 12.875
User time (seconds): 3.20
Maximum resident set size (kbytes): 51200
";
        let values = tool.schema().extract("", stderr)?;
        assert_eq!(
            values.last(),
            Some(&(SELF_REPORT.to_owned(), MetricValue::Float(12.875)))
        );
        Ok(())
    }
}
