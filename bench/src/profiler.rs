use std::process::{Command, Stdio};
use tracing::{debug, info};

/// The GNU time binaries that are probed, in order.
pub const PROFILER_CANDIDATES: &[&str] = &["gtime", "/usr/bin/time"];

/// An error returned if no usable profiler exists on this machine.
#[derive(Debug, thiserror::Error)]
pub enum ProfilerError {
    /// None of the candidates could be executed successfully.
    #[error(
        "Either `gtime -v` or `/usr/bin/time -v` must work to determine memory usage (tried {candidates:?}).
On Linux you should already have /usr/bin/time (otherwise install the `time` package).
On macOS you can install gtime using `brew install gnu-time`.
Benchmarking likely does not work on Windows."
    )]
    NotFound {
        /// The candidates that were probed.
        candidates: Vec<String>,
    },
}

/// The external command that wraps every benchmarked process to measure its time and memory.
///
/// A [Profiler] is resolved once at start-up (see [Profiler::resolve]) and then passed to the
/// [ProcessRunner](crate::runner::ProcessRunner). It is never changed afterward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profiler {
    /// The profiler binary.
    program: String,
    /// The arguments passed to the profiler before the wrapped command.
    args: Vec<String>,
}

impl Profiler {
    /// Probes the [PROFILER_CANDIDATES] and adopts the first one that works.
    pub fn resolve() -> Result<Self, ProfilerError> {
        Self::resolve_from(PROFILER_CANDIDATES)
    }

    /// Probes the given GNU time `candidates` and adopts the first one that works.
    pub fn resolve_from(candidates: &[&str]) -> Result<Self, ProfilerError> {
        for candidate in candidates {
            let profiler = Self::gnu_time(*candidate);
            if profiler.probe() {
                info!(profiler = candidate, "Using profiler");
                return Ok(profiler);
            }
            debug!(profiler = candidate, "Profiler candidate does not work");
        }

        Err(ProfilerError::NotFound {
            candidates: candidates.iter().map(|c| (*c).to_owned()).collect(),
        })
    }

    /// Creates a GNU time profiler, invoked as `<program> -v <command> <args...>`.
    pub fn gnu_time(program: impl Into<String>) -> Self {
        Self::with_args(program, ["-v"])
    }

    /// Creates a profiler with custom leading arguments.
    pub fn with_args<Arg: Into<String>>(
        program: impl Into<String>,
        args: impl IntoIterator<Item = Arg>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the profiler binary.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Creates a [Command] for the profiler. The wrapped command must be appended by the caller.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    /// Checks whether the profiler can wrap a trivial command.
    fn probe(&self) -> bool {
        self.command()
            .args(["echo", "hi"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_candidates_yield_remediation() {
        let error = Profiler::resolve_from(&["/nonexistent/gtime", "/nonexistent/time"])
            .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("brew install gnu-time"), "{message}");
        assert!(message.contains("/nonexistent/time"), "{message}");
    }

    #[test]
    fn gnu_time_passes_verbose_flag() {
        let profiler = Profiler::gnu_time("/usr/bin/time");
        let command = profiler.command();
        let args = command.get_args().collect::<Vec<_>>();
        assert_eq!(args, ["-v"]);
        assert_eq!(profiler.program(), "/usr/bin/time");
    }
}
