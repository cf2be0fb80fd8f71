//! Quota tools: getquota, setquota.

use serde_json::json;

use dfsmate_types::tool::{GetQuotaRequest, QuotaData, SetQuotaRequest, ToolOutcome};

use crate::audit::{self, AuditSink};
use crate::exec::{command, CommandRunner};
use crate::parse;

use super::{exec_failure, needs_confirm, Toolbox};

impl<R: CommandRunner, S: AuditSink> Toolbox<R, S> {
    /// `getquota`: quota and usage summary via `-count -q`.
    pub(super) async fn getquota(&self, req: GetQuotaRequest) -> ToolOutcome {
        let argv = command::count_quota(&req.path);

        let mut record = self.audit_start("getquota", &req);
        let out = match self.execute_audited(&mut record, argv).await {
            Ok(out) => out,
            Err(outcome) => return outcome,
        };
        self.flush_audit(&record).await;

        if !out.success() {
            return ToolOutcome::failure(exec_failure(&out, "hdfs dfs -count -q failed"));
        }
        let line = parse::quota_line(&out.stdout).unwrap_or_default();
        ToolOutcome::success(QuotaData {
            path: req.path,
            raw: audit::trim_tail(&out.stdout),
            line,
        })
    }

    /// `setquota`: set namespace and/or space quota, always confirm-gated.
    ///
    /// Runs `-setQuota` and `-setSpaceQuota` as separate admin commands,
    /// stopping at the first failure. One audit record covers the call; its
    /// argv is the last command that ran and its output is the concatenation.
    pub(super) async fn setquota(&self, req: SetQuotaRequest) -> ToolOutcome {
        if !req.confirm {
            return needs_confirm("setquota");
        }
        if req.namespace_quota.is_none() && req.space_quota.is_none() {
            return ToolOutcome::failure(
                "setquota requires namespace_quota and/or space_quota",
            );
        }

        let mut commands = Vec::new();
        if let Some(n) = req.namespace_quota {
            commands.push(command::set_quota(n, &req.path));
        }
        if let Some(space) = &req.space_quota {
            commands.push(command::set_space_quota(space, &req.path));
        }

        let mut record = self.audit_start("setquota", &req);
        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut applied: Vec<String> = Vec::new();

        for argv in commands {
            let verb = argv[2].clone();
            let out = match self.execute_audited(&mut record, argv).await {
                Ok(out) => out,
                Err(outcome) => return outcome,
            };
            stdout.push_str(&out.stdout);
            stderr.push_str(&out.stderr);
            if !out.success() {
                record.ok = false;
                record.stdout = audit::trim_tail(&stdout);
                record.stderr = audit::trim_tail(&stderr);
                self.flush_audit(&record).await;
                return ToolOutcome::failure(exec_failure(&out, "hdfs dfsadmin quota change failed"));
            }
            applied.push(verb);
        }

        record.ok = true;
        record.stdout = audit::trim_tail(&stdout);
        record.stderr = audit::trim_tail(&stderr);
        self.flush_audit(&record).await;

        ToolOutcome::success(json!({
            "path": req.path,
            "namespace_quota": req.namespace_quota,
            "space_quota": req.space_quota,
            "applied": applied,
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use dfsmate_types::error::ExecError;

    use crate::exec::ExecOutput;
    use crate::tool::testing::{MemorySink, ScriptedRunner};
    use crate::tool::Toolbox;

    const COUNT_OUT: &str =
        "        none             inf            none             inf            2            3               4096 /data\n";

    fn toolbox(results: Vec<Result<ExecOutput, ExecError>>) -> Toolbox<ScriptedRunner, MemorySink> {
        Toolbox::new(ScriptedRunner::new(results), MemorySink::default(), true)
    }

    #[tokio::test]
    async fn test_getquota_extracts_last_line() {
        let tb = toolbox(vec![ScriptedRunner::ok(COUNT_OUT)]);
        let outcome = tb.dispatch("getquota", json!({"path": "/data"})).await;
        assert!(outcome.is_ok());
        let d = outcome.data.unwrap();
        assert!(d["line"].as_str().unwrap().ends_with("/data"));
        assert!(d["raw"].as_str().unwrap().contains("4096"));
    }

    #[tokio::test]
    async fn test_getquota_is_not_gated() {
        let tb = toolbox(vec![ScriptedRunner::ok(COUNT_OUT)]);
        let outcome = tb.dispatch("getquota", json!({"path": "/data"})).await;
        assert!(outcome.is_ok());
        let seen = tb.runner.seen.lock().unwrap();
        assert_eq!(seen[0], vec!["hdfs", "dfs", "-count", "-q", "/data"]);
    }

    #[tokio::test]
    async fn test_setquota_requires_confirm() {
        let tb = toolbox(vec![]);
        let outcome = tb
            .dispatch("setquota", json!({"path": "/data", "namespace_quota": 100}))
            .await;
        assert!(!outcome.is_ok());
        assert_eq!(outcome.hint.as_deref(), Some("retry with confirm=true"));
    }

    #[tokio::test]
    async fn test_setquota_requires_at_least_one_quota() {
        let tb = toolbox(vec![]);
        let outcome = tb
            .dispatch("setquota", json!({"path": "/data", "confirm": true}))
            .await;
        assert!(!outcome.is_ok());
        assert!(outcome.error.unwrap().contains("namespace_quota"));
    }

    #[tokio::test]
    async fn test_setquota_runs_both_commands() {
        let tb = toolbox(vec![ScriptedRunner::ok(""), ScriptedRunner::ok("")]);
        let outcome = tb
            .dispatch(
                "setquota",
                json!({
                    "path": "/data",
                    "namespace_quota": 1000,
                    "space_quota": "1g",
                    "confirm": true
                }),
            )
            .await;
        assert!(outcome.is_ok());
        let seen = tb.runner.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], vec!["hdfs", "dfsadmin", "-setQuota", "1000", "/data"]);
        assert_eq!(seen[1], vec!["hdfs", "dfsadmin", "-setSpaceQuota", "1g", "/data"]);
        let d = outcome.data.unwrap();
        assert_eq!(d["applied"], json!(["-setQuota", "-setSpaceQuota"]));
        // One audit record for the whole call.
        assert_eq!(tb.sink.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_setquota_stops_at_first_failure() {
        let tb = toolbox(vec![ScriptedRunner::failed(1, "setQuota: Permission denied")]);
        let outcome = tb
            .dispatch(
                "setquota",
                json!({
                    "path": "/data",
                    "namespace_quota": 1000,
                    "space_quota": "1g",
                    "confirm": true
                }),
            )
            .await;
        assert!(!outcome.is_ok());
        // The space-quota command never ran.
        assert_eq!(tb.runner.seen.lock().unwrap().len(), 1);
        let records = tb.sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].ok);
    }
}
