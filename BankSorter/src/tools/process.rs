//! Blocking subprocess invocation with an optional time limit

use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// How often a running tool is polled when a time limit is set
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run `command` to completion, discarding stdout.
///
/// Stderr is captured for error reporting. With a `timeout`, the process is
/// killed once the limit passes and [`Error::ToolTimedOut`] is returned.
pub(crate) fn run_tool(
    tool: &'static str,
    mut command: Command,
    input: &Path,
    timeout: Option<Duration>,
) -> Result<()> {
    tracing::debug!("Running {}: {:?}", tool, command);

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::ToolSpawnFailed { tool, source })?;

    // Drain stderr on a separate thread so a chatty tool cannot block on a
    // full pipe while we wait on it.
    let stderr_reader = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut captured = String::new();
            let _ = stderr.read_to_string(&mut captured);
            captured
        })
    });

    let status = match timeout {
        None => child.wait()?,
        Some(limit) => match wait_with_deadline(&mut child, limit)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!("{} timed out on {}", tool, input.display());
                return Err(Error::ToolTimedOut {
                    tool,
                    input: input.to_path_buf(),
                    secs: limit.as_secs(),
                });
            }
        },
    };

    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    if status.success() {
        Ok(())
    } else {
        Err(Error::ToolFailed {
            tool,
            input: input.to_path_buf(),
            code: status.code(),
            stderr: stderr.trim().to_string(),
        })
    }
}

fn wait_with_deadline(
    child: &mut std::process::Child,
    limit: Duration,
) -> Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
