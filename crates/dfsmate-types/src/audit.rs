//! Audit trail types.
//!
//! One [`AuditRecord`] is appended to the JSON-line audit file per tool
//! invocation that reached the executor. Permission-changing tools also
//! carry a before/after snapshot and a computed diff.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tool::RiskTier;

/// Permissions/ownership of a single exact path, captured via
/// `hdfs dfs -stat '%A|%u|%g|%F'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermSnapshot {
    pub path: String,
    pub perm: String,
    pub owner: String,
    pub group: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Field-level difference between two [`PermSnapshot`]s.
///
/// `changes` maps a field name (`perm`, `owner`, `group`) to a
/// `[before, after]` pair; only changed fields appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermDiff {
    pub changed: bool,
    pub changes: BTreeMap<String, Vec<String>>,
}

/// One line of the append-only audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Local timestamp with UTC offset, `%Y-%m-%dT%H:%M:%S%z`.
    pub ts: String,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskTier>,
    pub args: serde_json::Value,
    /// The full argv that was handed to the exec boundary.
    pub command: Vec<String>,
    pub ok: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<PermSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<PermSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<PermDiff>,
}

impl AuditRecord {
    /// Start a record for a tool invocation; exec fields are filled by the
    /// caller once the command has run.
    pub fn new(ts: String, tool: impl Into<String>, risk: RiskTier, args: serde_json::Value) -> Self {
        Self {
            ts,
            tool: tool.into(),
            risk: Some(risk),
            args,
            command: Vec::new(),
            ok: false,
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            user: "unknown".to_string(),
            before: None,
            after: None,
            diff: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perm_snapshot_type_field_name() {
        let snap = PermSnapshot {
            path: "/data".to_string(),
            perm: "drwxr-xr-x".to_string(),
            owner: "hdfs".to_string(),
            group: "supergroup".to_string(),
            kind: Some("directory".to_string()),
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["type"], "directory");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_audit_record_optional_fields_omitted() {
        let rec = AuditRecord::new(
            "2026-08-29T10:00:00+0000".to_string(),
            "list",
            crate::tool::RiskTier::Safe,
            serde_json::json!({"path": "/"}),
        );
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("before").is_none());
        assert!(json.get("after").is_none());
        assert!(json.get("diff").is_none());
        assert_eq!(json["user"], "unknown");
        assert_eq!(json["risk"], "safe");
    }

    #[test]
    fn test_audit_record_json_line_roundtrip() {
        let mut rec = AuditRecord::new(
            "2026-08-29T10:00:00+0000".to_string(),
            "chmod",
            crate::tool::RiskTier::Risky,
            serde_json::json!({"path": "/data", "mode": "755"}),
        );
        rec.command = vec!["docker".into(), "exec".into(), "namenode".into()];
        rec.ok = true;
        let line = serde_json::to_string(&rec).unwrap();
        let parsed: AuditRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.tool, "chmod");
        assert!(parsed.ok);
        assert_eq!(parsed.command.len(), 3);
    }
}
