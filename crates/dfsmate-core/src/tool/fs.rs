//! Filesystem tools: list, stat, mkdir, put, get.

use serde_json::json;

use dfsmate_types::tool::{
    GetRequest, ListData, ListRequest, MkdirRequest, PutRequest, StatRequest, ToolOutcome,
    MAX_LIST_LIMIT,
};

use crate::audit::AuditSink;
use crate::exec::{command, CommandRunner};
use crate::parse;

use super::{exec_failure, needs_confirm, Toolbox};

impl<R: CommandRunner, S: AuditSink> Toolbox<R, S> {
    /// `list`: paged directory listing.
    pub(super) async fn list(&self, req: ListRequest) -> ToolOutcome {
        let limit = req.limit.clamp(1, MAX_LIST_LIMIT);
        let args: Vec<&str> = if req.recursive {
            vec!["-R", &req.path]
        } else {
            vec![&req.path]
        };
        let argv = match command::dfs("ls", &args) {
            Ok(argv) => argv,
            Err(err) => return ToolOutcome::failure(err.to_string()),
        };

        let mut record = self.audit_start("list", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -ls failed"));
        }

        let entries = parse::parse_ls(&out.stdout);
        let total = entries.len();
        let start = req.offset.min(total);
        let end = start.saturating_add(limit).min(total);
        let items: Vec<_> = entries[start..end].to_vec();
        let next_offset = (end < total).then_some(end);
        ToolOutcome::success(ListData {
            total_in_page: items.len(),
            items,
            next_offset,
        })
    }

    /// `stat`: metadata for one path.
    pub(super) async fn stat(&self, req: StatRequest) -> ToolOutcome {
        let argv = match command::dfs("stat", &[command::STAT_FORMAT, &req.path]) {
            Ok(argv) => argv,
            Err(err) => return ToolOutcome::failure(err.to_string()),
        };

        let mut record = self.audit_start("stat", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -stat failed"));
        }

        match parse::parse_stat(&out.stdout) {
            Some(stat) => ToolOutcome::success(stat),
            // Unexpected stat shape; hand back the raw line instead.
            None => ToolOutcome::success(json!({
                "path": req.path,
                "raw": out.stdout.trim(),
            })),
        }
    }

    /// `mkdir`: create a directory, gated when strict confirm is on.
    pub(super) async fn mkdir(&self, req: MkdirRequest) -> ToolOutcome {
        if self.strict_confirm() && !req.confirm {
            return needs_confirm("mkdir");
        }
        let args: Vec<&str> = if req.parents {
            vec!["-p", &req.path]
        } else {
            vec![&req.path]
        };
        let argv = match command::dfs("mkdir", &args) {
            Ok(argv) => argv,
            Err(err) => return ToolOutcome::failure(err.to_string()),
        };

        let mut record = self.audit_start("mkdir", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -mkdir failed"));
        }
        ToolOutcome::success(json!({ "path": req.path, "created": true }))
    }

    /// `put`: copy a container-local file into HDFS.
    pub(super) async fn put(&self, req: PutRequest) -> ToolOutcome {
        if req.overwrite && !req.confirm {
            return ToolOutcome::failure_with_hint(
                "overwrite requires explicit confirmation",
                "retry with confirm=true, or drop overwrite",
            );
        }
        let mut args: Vec<&str> = Vec::new();
        if req.overwrite {
            args.push("-f");
        }
        args.push(&req.local_path);
        args.push(&req.hdfs_path);
        let argv = match command::dfs("put", &args) {
            Ok(argv) => argv,
            Err(err) => return ToolOutcome::failure(err.to_string()),
        };

        let mut record = self.audit_start("put", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure_with_hint(
                exec_failure(&out, "hdfs dfs -put failed"),
                "the destination may already exist; set overwrite=true with confirm=true",
            );
        }
        ToolOutcome::success(json!({
            "local_path": req.local_path,
            "hdfs_path": req.hdfs_path,
        }))
    }

    /// `get`: copy an HDFS file to the container-local filesystem.
    pub(super) async fn get(&self, req: GetRequest) -> ToolOutcome {
        if req.overwrite && !req.confirm {
            return ToolOutcome::failure_with_hint(
                "overwrite requires explicit confirmation",
                "retry with confirm=true, or drop overwrite",
            );
        }
        let mut args: Vec<&str> = Vec::new();
        if req.overwrite {
            args.push("-f");
        }
        args.push(&req.hdfs_path);
        args.push(&req.local_path);
        let argv = match command::dfs("get", &args) {
            Ok(argv) => argv,
            Err(err) => return ToolOutcome::failure(err.to_string()),
        };

        let mut record = self.audit_start("get", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -get failed"));
        }
        ToolOutcome::success(json!({
            "hdfs_path": req.hdfs_path,
            "local_path": req.local_path,
        }))
    }
}
