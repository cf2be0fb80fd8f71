//! Tool handlers for the HDFS administrative surface.
//!
//! [`Toolbox`] owns the command runner and audit sink and dispatches by tool
//! name. Every handler follows the same shape: gate, build argv, execute,
//! audit, envelope. Confirmation gates reject before anything executes, so
//! a rejected call leaves no audit record.

mod admin;
mod fs;
mod perms;
mod quota;
mod spec;

pub use spec::{tool_names, tool_specs};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use dfsmate_types::audit::AuditRecord;
use dfsmate_types::error::ExecError;
use dfsmate_types::tool::{risk_for, ToolOutcome};

use crate::audit::{self, AuditSink};
use crate::exec::{CommandRunner, ExecOutput};

/// The tool surface: a runner to execute commands, a sink to audit them,
/// and the confirmation policy.
pub struct Toolbox<R, S> {
    runner: R,
    sink: S,
    strict_confirm: bool,
}

impl<R: CommandRunner, S: AuditSink> Toolbox<R, S> {
    pub fn new(runner: R, sink: S, strict_confirm: bool) -> Self {
        Self {
            runner,
            sink,
            strict_confirm,
        }
    }

    pub fn strict_confirm(&self) -> bool {
        self.strict_confirm
    }

    /// Dispatch a tool call by name.
    ///
    /// Malformed arguments and unknown names come back as failure envelopes,
    /// never as errors; the caller (MCP server or agent loop) always has a
    /// serializable result to hand to the model.
    pub async fn dispatch(&self, name: &str, args: Value) -> ToolOutcome {
        debug!(tool = name, "dispatching tool call");
        match name {
            "list" => run(args, |req| self.list(req)).await,
            "stat" => run(args, |req| self.stat(req)).await,
            "mkdir" => run(args, |req| self.mkdir(req)).await,
            "put" => run(args, |req| self.put(req)).await,
            "get" => run(args, |req| self.get(req)).await,
            "chmod" => run(args, |req| self.chmod(req)).await,
            "chown" => run(args, |req| self.chown(req)).await,
            "getquota" => run(args, |req| self.getquota(req)).await,
            "setquota" => run(args, |req| self.setquota(req)).await,
            "snapshot_create" => run(args, |req| self.snapshot_create(req)).await,
            "snapshot_delete" => run(args, |req| self.snapshot_delete(req)).await,
            "snapshot_rename" => run(args, |req| self.snapshot_rename(req)).await,
            "snapshot_allow" => run(args, |req| self.snapshot_allow(req)).await,
            "snapshot_disallow" => run(args, |req| self.snapshot_disallow(req)).await,
            "balancer_trigger" => run(args, |req| self.balancer_trigger(req)).await,
            other => ToolOutcome::failure(format!("unknown tool: '{other}'")),
        }
    }

    /// Start an audit record for a tool invocation.
    fn audit_start(&self, tool: &str, args: &impl serde::Serialize) -> AuditRecord {
        let args = serde_json::to_value(args).unwrap_or(Value::Null);
        AuditRecord::new(audit::now_ts(), tool, risk_for(tool), args)
    }

    /// Execute `argv`, fill the exec fields of `record`, and flush it.
    ///
    /// Returns the output for exit-code inspection, or the failure envelope
    /// when the exec boundary itself failed (spawn error, timeout, retries
    /// exhausted). Either way the record is written.
    async fn execute_audited(
        &self,
        record: &mut AuditRecord,
        argv: Vec<String>,
    ) -> Result<ExecOutput, ToolOutcome> {
        record.command = argv.clone();
        match self.runner.run(argv).await {
            Ok(out) => {
                // The runner reports the full argv it actually ran (docker
                // exec wrapper included); prefer that in the audit trail.
                if !out.command.is_empty() {
                    record.command = out.command.clone();
                }
                record.ok = out.success();
                record.exit_code = out.exit_code;
                record.stdout = audit::trim_tail(&out.stdout);
                record.stderr = audit::trim_tail(&out.stderr);
                Ok(out)
            }
            Err(err) => {
                record.ok = false;
                record.exit_code = -1;
                record.stderr = audit::trim_tail(&err.to_string());
                self.flush_audit(record).await;
                Err(ToolOutcome::failure(err.to_string()))
            }
        }
    }

    /// Write the record; an audit I/O failure is logged, not propagated,
    /// so a full disk does not take the read-only tools down with it.
    async fn flush_audit(&self, record: &AuditRecord) {
        if let Err(err) = self.sink.record(record).await {
            warn!(tool = %record.tool, error = %err, "failed to write audit record");
        }
    }

    /// Best-effort command execution for permission snapshots; any failure
    /// degrades to `None`.
    async fn snapshot_output(&self, argv: Result<Vec<String>, ExecError>) -> Option<String> {
        let argv = argv.ok()?;
        match self.runner.run(argv).await {
            Ok(out) if out.success() => Some(out.stdout),
            _ => None,
        }
    }
}

/// Deserialize the raw arguments and run the handler, or produce a failure
/// envelope describing what was malformed.
async fn run<T, F, Fut>(args: Value, handler: F) -> ToolOutcome
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Fut,
    Fut: std::future::Future<Output = ToolOutcome>,
{
    match serde_json::from_value::<T>(args) {
        Ok(req) => handler(req).await,
        Err(err) => ToolOutcome::failure(format!("invalid arguments: {err}")),
    }
}

/// Failure message for a finished command: trimmed stderr, or the fallback
/// when the command said nothing.
fn exec_failure(out: &ExecOutput, fallback: &str) -> String {
    let stderr = out.stderr.trim();
    if stderr.is_empty() {
        fallback.to_string()
    } else {
        audit::trim_tail(stderr)
    }
}

/// Gate rejection envelope for a risky tool called without confirm=true.
fn needs_confirm(tool: &str) -> ToolOutcome {
    ToolOutcome::failure_with_hint(
        format!("'{tool}' requires explicit confirmation"),
        "retry with confirm=true",
    )
}
