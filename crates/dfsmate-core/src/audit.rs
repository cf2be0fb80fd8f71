//! Audit helpers: the sink trait, timestamps, output trimming, and
//! permission diffs.

use std::collections::BTreeMap;
use std::future::Future;

use dfsmate_types::audit::{AuditRecord, PermDiff, PermSnapshot};
use dfsmate_types::error::AuditError;
use dfsmate_types::tool::AUDIT_TRIM_CHARS;

/// Receives one record per tool invocation that reached the executor.
pub trait AuditSink: Send + Sync {
    fn record(
        &self,
        record: &AuditRecord,
    ) -> impl Future<Output = Result<(), AuditError>> + Send;
}

/// Local timestamp with UTC offset, `2026-08-29T10:00:00+0200` style.
pub fn now_ts() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%z").to_string()
}

/// Keep at most the last [`AUDIT_TRIM_CHARS`] characters of `text`.
///
/// The tail is what matters for command output (errors and summaries come
/// last). Trimming counts characters, not bytes, so multi-byte output never
/// splits a code point.
pub fn trim_tail(text: &str) -> String {
    trim_tail_to(text, AUDIT_TRIM_CHARS)
}

fn trim_tail_to(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    text.chars().skip(count - max_chars).collect()
}

/// Compute a field-level diff of two permission snapshots.
///
/// Only `perm`, `owner`, and `group` participate; the path and type fields
/// identify the snapshot rather than describe mutable state.
pub fn perm_diff(before: &PermSnapshot, after: &PermSnapshot) -> PermDiff {
    let mut changes = BTreeMap::new();
    for (field, b, a) in [
        ("perm", &before.perm, &after.perm),
        ("owner", &before.owner, &after.owner),
        ("group", &before.group, &after.group),
    ] {
        if b != a {
            changes.insert(field.to_string(), vec![b.clone(), a.clone()]);
        }
    }
    PermDiff {
        changed: !changes.is_empty(),
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(perm: &str, owner: &str, group: &str) -> PermSnapshot {
        PermSnapshot {
            path: "/data".to_string(),
            perm: perm.to_string(),
            owner: owner.to_string(),
            group: group.to_string(),
            kind: Some("directory".to_string()),
        }
    }

    #[test]
    fn test_trim_tail_short_input_untouched() {
        assert_eq!(trim_tail("hello"), "hello");
    }

    #[test]
    fn test_trim_tail_keeps_last_chars() {
        let long = "x".repeat(AUDIT_TRIM_CHARS) + "TAIL";
        let trimmed = trim_tail(&long);
        assert_eq!(trimmed.chars().count(), AUDIT_TRIM_CHARS);
        assert!(trimmed.ends_with("TAIL"));
    }

    #[test]
    fn test_trim_tail_multibyte_safe() {
        let text = "é".repeat(10);
        let trimmed = trim_tail_to(&text, 3);
        assert_eq!(trimmed, "ééé");
    }

    #[test]
    fn test_perm_diff_no_change() {
        let d = perm_diff(&snap("drwxr-xr-x", "hdfs", "supergroup"), &snap("drwxr-xr-x", "hdfs", "supergroup"));
        assert!(!d.changed);
        assert!(d.changes.is_empty());
    }

    #[test]
    fn test_perm_diff_reports_changed_fields() {
        let d = perm_diff(
            &snap("drwxr-xr-x", "hdfs", "supergroup"),
            &snap("drwxrwxrwx", "alice", "supergroup"),
        );
        assert!(d.changed);
        assert_eq!(
            d.changes.get("perm"),
            Some(&vec!["drwxr-xr-x".to_string(), "drwxrwxrwx".to_string()])
        );
        assert_eq!(
            d.changes.get("owner"),
            Some(&vec!["hdfs".to_string(), "alice".to_string()])
        );
        assert!(d.changes.get("group").is_none());
    }

    #[test]
    fn test_now_ts_has_offset() {
        let ts = now_ts();
        // 2026-08-29T10:00:00+0200 is 24 chars with 'T' at index 10.
        assert_eq!(ts.len(), 24);
        assert_eq!(&ts[10..11], "T");
    }
}
