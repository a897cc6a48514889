use crate::profiler::Profiler;
use std::ffi::OsStr;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// The outcome of a single profiled invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutput {
    /// The process exited successfully.
    Completed {
        /// The standard output of the benchmarked command.
        stdout: String,
        /// The standard error of the profiler, which includes the standard error of the command.
        profiler: String,
    },
    /// The process did not finish in time and was killed.
    TimedOut,
}

/// An error returned if a profiled invocation fails for a reason other than a timeout.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The process could not be started.
    #[error("Cannot spawn `{command}`")]
    Spawn {
        /// The command line.
        command: String,
        /// The cause.
        #[source]
        source: io::Error,
    },
    /// Waiting for the process or reading its output failed.
    #[error("Cannot collect the output of `{command}`")]
    Io {
        /// The command line.
        command: String,
        /// The cause.
        #[source]
        source: io::Error,
    },
    /// The process exited with a non-zero status.
    #[error("`{command}` exited with {status}. Standard error:\n{stderr}")]
    AbnormalExit {
        /// The command line.
        command: String,
        /// The exit status.
        status: ExitStatus,
        /// The captured standard error.
        stderr: String,
    },
}

/// Runs external commands under a [Profiler], one at a time.
///
/// If a timeout is given and exceeded, the child (and every process it started) is killed and
/// [RunOutput::TimedOut] is returned.
#[derive(Clone, Debug)]
pub struct ProcessRunner {
    profiler: Profiler,
}

impl ProcessRunner {
    /// Creates a new [ProcessRunner] with a resolved profiler.
    pub fn new(profiler: Profiler) -> Self {
        Self { profiler }
    }

    /// Returns the profiler used by this runner.
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// Runs `<profiler> <program> <args...>`.
    pub async fn run(
        &self,
        program: impl AsRef<OsStr>,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<RunOutput, RunError> {
        let program = program.as_ref();
        let command_line = format!(
            "{} {} {}",
            self.profiler.program(),
            program.to_string_lossy(),
            args.join(" ")
        );

        let mut command = self.profiler.command();
        command
            .arg(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut command = tokio::process::Command::from(command);
        command.kill_on_drop(true);

        debug!(command = %command_line, ?timeout, "Spawning process");
        let child = command.spawn().map_err(|source| RunError::Spawn {
            command: command_line.clone(),
            source,
        })?;
        let process_group = child.id();
        let io_error = |source| RunError::Io {
            command: command_line.clone(),
            source,
        };

        let output = match timeout {
            None => child.wait_with_output().await,
            Some(timeout) => {
                match tokio::time::timeout(timeout, child.wait_with_output()).await {
                    Ok(output) => output,
                    Err(_) => {
                        // Dropping the output future has already killed the profiler itself.
                        warn!(command = %command_line, ?timeout, "Process exceeded its timeout");
                        kill_process_group(process_group).map_err(io_error)?;
                        return Ok(RunOutput::TimedOut);
                    }
                }
            }
        }
        .map_err(io_error)?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(RunError::AbnormalExit {
                command: command_line,
                status: output.status,
                stderr,
            });
        }

        Ok(RunOutput::Completed {
            stdout,
            profiler: stderr,
        })
    }
}

/// Kills the process group created for the child, as the profiler forks the benchmarked command.
#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(process_group: Option<u32>) -> io::Result<()> {
    let Some(process_group) = process_group else {
        return Ok(());
    };
    let pgid = libc::pid_t::try_from(process_group).map_err(io::Error::other)?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    let result = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if result == 0 {
        return Ok(());
    }
    let error = io::Error::last_os_error();
    if error.raw_os_error() == Some(libc::ESRCH) {
        // Every process of the group has already exited.
        Ok(())
    } else {
        Err(error)
    }
}

#[cfg(not(unix))]
fn kill_process_group(_process_group: Option<u32>) -> io::Result<()> {
    Ok(())
}
