//! [`DockerExecRunner`]: runs argvs via `docker exec` into the namenode
//! container, with a per-attempt timeout and retries.
//!
//! Only timeouts and spawn failures are retried; a non-zero exit code is a
//! domain outcome and comes back as a normal [`ExecOutput`].

use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use dfsmate_core::exec::{backoff_delay, CommandRunner, ExecOutput};
use dfsmate_types::error::ExecError;

pub struct DockerExecRunner {
    container: String,
    timeout: Duration,
    retries: u32,
}

impl DockerExecRunner {
    pub fn new(container: impl Into<String>, timeout_secs: u64, retries: u32) -> Self {
        Self {
            container: container.into(),
            timeout: Duration::from_secs(timeout_secs),
            retries,
        }
    }

    fn full_argv(&self, argv: &[String]) -> Vec<String> {
        let mut full = vec![
            "docker".to_string(),
            "exec".to_string(),
            self.container.clone(),
        ];
        full.extend_from_slice(argv);
        full
    }

    async fn attempt(&self, full: &[String]) -> Result<ExecOutput, ExecError> {
        let mut cmd = Command::new(&full[0]);
        cmd.args(&full[1..]).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return Err(ExecError::Spawn {
                    program: full[0].clone(),
                    message: err.to_string(),
                });
            }
            Err(_) => {
                return Err(ExecError::Timeout {
                    command: full.join(" "),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            command: full.to_vec(),
        })
    }

    async fn run_with_retries(&self, full: Vec<String>) -> Result<ExecOutput, ExecError> {
        let display_cmd = full.join(" ");
        let mut last_error: Option<ExecError> = None;

        for attempt in 0..=self.retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt - 1);
                warn!(
                    command = %display_cmd,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying command"
                );
                tokio::time::sleep(delay).await;
            }
            match self.attempt(&full).await {
                Ok(out) => {
                    debug!(command = %display_cmd, exit_code = out.exit_code, "command finished");
                    return Ok(out);
                }
                Err(err) => last_error = Some(err),
            }
        }

        let last = match last_error {
            Some(err) => err,
            None => ExecError::EmptyCommand,
        };
        // A single-attempt failure keeps its specific error.
        if self.retries == 0 {
            return Err(last);
        }
        Err(ExecError::Exhausted {
            command: display_cmd,
            attempts: self.retries + 1,
            last_error: last.to_string(),
        })
    }
}

impl CommandRunner for DockerExecRunner {
    async fn run(&self, argv: Vec<String>) -> Result<ExecOutput, ExecError> {
        if argv.is_empty() {
            return Err(ExecError::EmptyCommand);
        }
        self.run_with_retries(self.full_argv(&argv)).await
    }
}
