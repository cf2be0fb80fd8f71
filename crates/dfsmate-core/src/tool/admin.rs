//! Snapshot and balancer tools. All of these mutate cluster state and are
//! always confirm-gated.

use serde_json::json;

use dfsmate_types::tool::{
    BalancerRequest, SnapshotCreateRequest, SnapshotDeleteRequest, SnapshotPolicyRequest,
    SnapshotRenameRequest, ToolOutcome,
};

use crate::audit::{self, AuditSink};
use crate::exec::{command, CommandRunner};

use super::{exec_failure, needs_confirm, Toolbox};

impl<R: CommandRunner, S: AuditSink> Toolbox<R, S> {
    /// `snapshot_create`: snapshot a snapshottable directory.
    pub(super) async fn snapshot_create(&self, req: SnapshotCreateRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("snapshot_create");
        }
        let argv = command::create_snapshot(&req.path, req.name.as_deref());

        let mut record = self.audit_start("snapshot_create", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure_with_hint(
                exec_failure(&out, "hdfs dfs -createSnapshot failed"),
                "the directory may not be snapshottable; enable it with snapshot_allow \
                 (hdfs dfsadmin -allowSnapshot)",
            );
        }
        ToolOutcome::success(json!({
            "path": req.path,
            "name": req.name,
            "output": out.stdout.trim(),
        }))
    }

    /// `snapshot_delete`: delete a named snapshot.
    pub(super) async fn snapshot_delete(&self, req: SnapshotDeleteRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("snapshot_delete");
        }
        let argv = command::delete_snapshot(&req.path, &req.name);

        let mut record = self.audit_start("snapshot_delete", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -deleteSnapshot failed"));
        }
        ToolOutcome::success(json!({ "path": req.path, "name": req.name, "deleted": true }))
    }

    /// `snapshot_rename`: rename a snapshot in place.
    pub(super) async fn snapshot_rename(&self, req: SnapshotRenameRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("snapshot_rename");
        }
        let argv = command::rename_snapshot(&req.path, &req.old_name, &req.new_name);

        let mut record = self.audit_start("snapshot_rename", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -renameSnapshot failed"));
        }
        ToolOutcome::success(json!({
            "path": req.path,
            "old_name": req.old_name,
            "new_name": req.new_name,
        }))
    }

    /// `snapshot_allow`: mark a directory snapshottable.
    pub(super) async fn snapshot_allow(&self, req: SnapshotPolicyRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("snapshot_allow");
        }
        self.snapshot_policy("snapshot_allow", command::allow_snapshot(&req.path), req)
            .await
    }

    /// `snapshot_disallow`: forbid snapshots on a directory.
    pub(super) async fn snapshot_disallow(&self, req: SnapshotPolicyRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("snapshot_disallow");
        }
        self.snapshot_policy("snapshot_disallow", command::disallow_snapshot(&req.path), req)
            .await
    }

    async fn snapshot_policy(
        &self,
        tool: &str,
        argv: Vec<String>,
        req: SnapshotPolicyRequest,
    ) -> ToolOutcome {
        let mut record = self.audit_start(tool, &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfsadmin snapshot policy change failed"));
        }
        ToolOutcome::success(json!({ "path": req.path, "output": out.stdout.trim() }))
    }

    /// `balancer_trigger`: run the HDFS balancer once.
    pub(super) async fn balancer_trigger(&self, req: BalancerRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("balancer_trigger");
        }
        let argv = command::balancer();

        let mut record = self.audit_start("balancer_trigger", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure_with_hint(
                exec_failure(&out, "hdfs balancer failed"),
                "balancing is a no-op on a single-datanode cluster",
            );
        }
        ToolOutcome::success(json!({ "output": audit::trim_tail(out.stdout.trim()) }))
    }
}
