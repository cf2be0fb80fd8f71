//! Permission tools: chmod, chown.
//!
//! Both capture a best-effort permission snapshot of the exact path before
//! and after the change, and audit the computed diff alongside the command.

use serde_json::json;

use dfsmate_types::audit::PermSnapshot;
use dfsmate_types::tool::{ChmodRequest, ChownRequest, ToolOutcome};

use crate::audit::{perm_diff, AuditSink};
use crate::exec::{command, CommandRunner};
use crate::parse;

use super::{exec_failure, needs_confirm, Toolbox};

impl<R: CommandRunner, S: AuditSink> Toolbox<R, S> {
    /// `chmod`: change permissions, always confirm-gated.
    pub(super) async fn chmod(&self, req: ChmodRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("chmod");
        }
        let args: Vec<&str> = if req.recursive {
            vec!["-R", &req.mode, &req.path]
        } else {
            vec![&req.mode, &req.path]
        };
        let argv = match command::dfs("chmod", &args) {
            Ok(argv) => argv,
            Err(err) => return ToolOutcome::failure(err.to_string()),
        };

        let mut record = self.audit_start("chmod", &req);
        let before = self.perm_snapshot(&req.path).await;

        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };

        let after = self.perm_snapshot(&req.path).await;
        let diff = match (&before, &after) {
            (Some(b), Some(a)) => Some(perm_diff(b, a)),
            _ => None,
        };
        record.before = before;
        record.after = after;
        record.diff = diff.clone();
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -chmod failed"));
        }
        ToolOutcome::success(json!({
            "path": req.path,
            "mode": req.mode,
            "recursive": req.recursive,
            "diff": diff,
        }))
    }

    /// `chown`: change owner (and optionally group), always confirm-gated.
    pub(super) async fn chown(&self, req: ChownRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("chown");
        }
        let spec = match &req.group {
            Some(group) => format!("{}:{group}", req.owner),
            None => req.owner.clone(),
        };
        let args: Vec<&str> = if req.recursive {
            vec!["-R", &spec, &req.path]
        } else {
            vec![&spec, &req.path]
        };
        let argv = match command::dfs("chown", &args) {
            Ok(argv) => argv,
            Err(err) => return ToolOutcome::failure(err.to_string()),
        };

        let mut record = self.audit_start("chown", &req);
        let before = self.perm_snapshot(&req.path).await;

        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };

        let after = self.perm_snapshot(&req.path).await;
        let diff = match (&before, &after) {
            (Some(b), Some(a)) => Some(perm_diff(b, a)),
            _ => None,
        };
        record.before = before;
        record.after = after;
        record.diff = diff.clone();
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -chown failed"));
        }
        ToolOutcome::success(json!({
            "path": req.path,
            "owner": req.owner,
            "group": req.group,
            "recursive": req.recursive,
            "diff": diff,
        }))
    }

    /// Capture perm/owner/group/type of the exact path, best effort.
    async fn perm_snapshot(&self, path: &str) -> Option<PermSnapshot> {
        let stdout = self
            .snapshot_output(command::dfs("stat", &[command::PERM_STAT_FORMAT, path]))
            .await?;
        parse::parse_perm_snapshot(path, &stdout)
    }
}
