//! Subprocess backend for the verifier capability.
//!
//! Invokes `<program> <instruction> <circuit-dir>` with piped output and a
//! hard wall-clock deadline. The child is killed at the deadline, and also
//! killed if the invocation is dropped mid-flight (operator interrupt), so no
//! external process ever outlives its run.

use super::runner::{RunError, Verifier, VerifierReply, VerifierStatus};
use crate::catalog::Instruction;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub struct SubprocessVerifier {
    program: PathBuf,
    circuit_dir: PathBuf,
}

impl SubprocessVerifier {
    pub fn new(program: impl Into<PathBuf>, circuit_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            circuit_dir: circuit_dir.into(),
        }
    }
}

impl Verifier for SubprocessVerifier {
    fn invoke(
        &mut self,
        instruction: &Instruction,
        timeout: Duration,
    ) -> Result<VerifierReply, RunError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(instruction.as_str())
            .arg(&self.circuit_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let invocation_err = |source: std::io::Error| RunError::Invocation {
            instruction: instruction.clone(),
            source,
        };

        let child = cmd.spawn().map_err(invocation_err)?;
        let mut guard = ChildGuard(child);

        // Drain the pipes off-thread so a chatty verifier cannot fill the
        // pipe buffer and stall before we ever reach the deadline.
        let stdout = drain(guard.0.stdout.take());
        let stderr = drain(guard.0.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            match guard.0.try_wait().map_err(invocation_err)? {
                Some(status) => break Some(status),
                None if Instant::now() >= deadline => break None,
                None => std::thread::sleep(POLL_INTERVAL),
            }
        };

        let status = match status {
            Some(exit) => {
                // Signal deaths have no code; that is outside the contract.
                VerifierStatus::Exited(exit.code().unwrap_or(-1))
            }
            None => {
                tracing::warn!(%instruction, ?timeout, "verifier hit deadline, killing");
                guard.kill_and_reap();
                VerifierStatus::TimedOut
            }
        };

        let mut output = stdout.map(|h| h.join().unwrap_or_default()).unwrap_or_default();
        if let Some(h) = stderr {
            output.push_str(&h.join().unwrap_or_default());
        }

        Ok(VerifierReply { status, output })
    }
}

/// Kills the child on drop unless it already exited. This is what makes
/// whole-run cancellation propagate to an in-flight verifier.
struct ChildGuard(Child);

impl ChildGuard {
    fn kill_and_reap(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Ok(None) = self.0.try_wait() {
            self.kill_and_reap();
        }
    }
}

fn drain<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> Option<std::thread::JoinHandle<String>> {
    pipe.map(|mut r| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = r.read_to_string(&mut buf);
            buf
        })
    })
}
