use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use bsweep_core::errors::{ErrorInfo, SweepError};
use bsweep_core::{SweepPoint, TrialOutput};
use tracing::{trace, warn};

use crate::config::{ArgumentFormat, InvocationConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs the measurement executable once for a sweep point.
///
/// Implementations block until the trial is complete. Tests substitute a stub
/// that returns canned output without spawning anything.
pub trait ProcessInvoker {
    /// Invokes `executable` with the point's arguments and captures stdout.
    fn invoke(&mut self, executable: &Path, point: &SweepPoint)
        -> Result<TrialOutput, SweepError>;
}

/// Renders the size argument.
pub fn format_size_argument(size: f64, format: ArgumentFormat) -> String {
    match format {
        ArgumentFormat::Truncate => format!("{:.0}", size.trunc()),
        ArgumentFormat::Decimal => format!("{size}"),
    }
}

/// Argument list for `point`: `[size, secondary?]`.
pub fn build_args(point: &SweepPoint, format: ArgumentFormat) -> Vec<String> {
    let mut args = vec![format_size_argument(point.size, format)];
    if let Some(secondary) = point.secondary {
        args.push(secondary.to_string());
    }
    args
}

/// [`ProcessInvoker`] that spawns real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemInvoker {
    argument_format: ArgumentFormat,
    timeout: Option<Duration>,
    env: BTreeMap<String, String>,
}

impl SystemInvoker {
    /// Builds an invoker from the config's invocation settings.
    pub fn new(config: &InvocationConfig) -> Self {
        Self {
            argument_format: config.argument_format,
            timeout: config.timeout(),
            env: config.env.clone(),
        }
    }
}

impl ProcessInvoker for SystemInvoker {
    fn invoke(
        &mut self,
        executable: &Path,
        point: &SweepPoint,
    ) -> Result<TrialOutput, SweepError> {
        let args = build_args(point, self.argument_format);
        let describe = |info: ErrorInfo| {
            info.with_context("executable", executable.display().to_string())
                .with_context("args", args.join(" "))
        };
        trace!(executable = %executable.display(), ?args, "launching trial");

        let child = Command::new(executable)
            .args(&args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| {
                SweepError::Launch(describe(
                    ErrorInfo::new("spawn", "failed to start measurement executable")
                        .with_hint(err.to_string()),
                ))
            })?;

        let wait_error = |err: io::Error| {
            SweepError::Launch(describe(
                ErrorInfo::new("wait", "failed to collect measurement executable")
                    .with_hint(err.to_string()),
            ))
        };
        let (status, stdout) = match self.timeout {
            None => {
                let output = child.wait_with_output().map_err(wait_error)?;
                (output.status, output.stdout)
            }
            Some(limit) => match wait_with_deadline(child, limit).map_err(wait_error)? {
                Some(finished) => finished,
                None => {
                    warn!(executable = %executable.display(), ?args, "trial timed out");
                    return Err(SweepError::Timeout(describe(
                        ErrorInfo::new("deadline", "measurement executable exceeded its timeout")
                            .with_context("timeout_secs", limit.as_secs_f64().to_string())
                            .with_hint("raise `invocation.timeout_secs` or shrink the sweep"),
                    )));
                }
            },
        };

        if !status.success() {
            let info = match status.code() {
                Some(code) => ErrorInfo::new("exit-status", "measurement executable failed")
                    .with_context("status", code.to_string()),
                None => ErrorInfo::new(
                    "exit-signal",
                    "measurement executable was terminated by a signal",
                ),
            };
            return Err(SweepError::Exit(describe(info)));
        }

        let text = String::from_utf8(stdout).map_err(|err| {
            SweepError::Format(describe(
                ErrorInfo::new("utf8", "measurement output is not valid UTF-8")
                    .with_hint(err.to_string()),
            ))
        })?;
        Ok(TrialOutput {
            point: *point,
            text,
        })
    }
}

/// Waits for `child` up to `limit`, draining stdout on a helper thread so a
/// chatty child cannot block on a full pipe. Returns `None` after killing a
/// child that overran its deadline.
fn wait_with_deadline(
    mut child: Child,
    limit: Duration,
) -> io::Result<Option<(ExitStatus, Vec<u8>)>> {
    let mut pipe = child.stdout.take();
    let reader = thread::spawn(move || -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(pipe) = pipe.as_mut() {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let deadline = Instant::now() + limit;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(err) => {
                reap(&mut child);
                return Err(err);
            }
        }
        if Instant::now() >= deadline {
            reap(&mut child);
            // Grandchildren can keep the pipe open, so the reader is detached.
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = reader
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "stdout reader panicked"))??;
    Ok(Some((status, stdout)))
}

/// Kills `child` and collects its exit status so no process is left behind.
fn reap(child: &mut Child) {
    // The child may exit between try_wait and kill.
    let _ = child.kill();
    if let Err(err) = child.wait() {
        warn!(pid = child.id(), %err, "failed to reap measurement executable");
    }
}
