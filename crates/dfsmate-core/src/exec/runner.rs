//! The command-execution seam.
//!
//! Tool handlers talk to a [`CommandRunner`]; the production implementation
//! (`dfsmate-infra`) runs `docker exec` into the namenode container with a
//! per-attempt timeout and retries. Tests swap in scripted runners.

use std::future::Future;
use std::time::Duration;

use dfsmate_types::error::ExecError;

/// Result of one finished command, regardless of exit status.
///
/// A non-zero exit is a normal domain outcome (the tool layer turns it into
/// a failure envelope); only spawn failures, timeouts, and retry exhaustion
/// surface as [`ExecError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Process exit code, `-1` when the platform reports none.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// The full argv that ran, for the audit trail.
    pub command: Vec<String>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes an argv and returns its captured output.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        argv: Vec<String>,
    ) -> impl Future<Output = Result<ExecOutput, ExecError>> + Send;
}

/// Exponential backoff before retry `attempt` (0-based): 500ms doubling.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(500u64.saturating_mul(1u64 << attempt.min(20)))
}
