//! Bounded execution of the external profiler.
//!
//! Every invocation gets an explicit deadline. Output pipes are drained on
//! their own threads so a chatty child never blocks on a full pipe while we
//! wait for it; a child still running at the deadline, or when the run is
//! interrupted, is killed and the attempt counts as failed.

use crate::types::{CommandOutput, CommandSpec};
use log::debug;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to wait for buffered output once the child has exited or been killed.
/// A grandchild that inherited the pipes can keep them open past this point.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How a child we waited on came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitOutcome {
    Exited { success: bool },
    TimedOut,
    Interrupted,
    WaitFailed,
}

/// Run a command with a deadline, capturing stdout and stderr.
///
/// Raising `interrupted` kills the child at the next poll.
pub fn run_command(spec: &CommandSpec, timeout: Duration, interrupted: &AtomicBool) -> CommandOutput {
    debug!("Running `{}` (timeout {:?})", spec.display(), timeout);

    let start = Instant::now();

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            debug!("Failed to start {}: {}", spec.program, e);
            return CommandOutput::spawn_failure(format!("failed to run {}: {}", spec.program, e), start.elapsed());
        }
    };

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let outcome = wait_with_deadline(&mut child, start + timeout, interrupted);

    let stdout = stdout_reader.recv_timeout(DRAIN_GRACE).unwrap_or_default();
    let mut stderr = stderr_reader.recv_timeout(DRAIN_GRACE).unwrap_or_default();
    let duration = start.elapsed();

    let success = matches!(outcome, WaitOutcome::Exited { success: true });
    match outcome {
        WaitOutcome::TimedOut => {
            debug!("`{}` timed out after {:?}", spec.display(), duration);
            if stderr.trim().is_empty() {
                stderr = format!("timed out after {}s", timeout.as_secs());
            }
        }
        WaitOutcome::Interrupted => {
            debug!("`{}` killed on interrupt after {:?}", spec.display(), duration);
            stderr = "interrupted".to_string();
        }
        _ => debug!("`{}` exited (success={}) in {:?}", spec.display(), success, duration),
    }

    CommandOutput { success, stdout, stderr, duration, timed_out: outcome == WaitOutcome::TimedOut }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        let _ = tx.send(String::from_utf8_lossy(&bytes).into_owned());
    });
    rx
}

fn wait_with_deadline(child: &mut Child, deadline: Instant, interrupted: &AtomicBool) -> WaitOutcome {
    loop {
        let stop = match child.try_wait() {
            Ok(Some(status)) => return WaitOutcome::Exited { success: status.success() },
            Ok(None) if interrupted.load(Ordering::SeqCst) => WaitOutcome::Interrupted,
            Ok(None) if Instant::now() >= deadline => WaitOutcome::TimedOut,
            Ok(None) => {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            Err(e) => {
                debug!("Failed to wait for child: {}", e);
                WaitOutcome::WaitFailed
            }
        };
        let _ = child.kill();
        let _ = child.wait();
        return stop;
    }
}
