//! Parsers for `hdfs` CLI output.
//!
//! HDFS output is line-oriented and whitespace-separated; these parsers are
//! deliberately tolerant. Lines that do not match the expected shape are
//! skipped (ls) or cause a `None` return so callers can fall back to the raw
//! text instead of failing the whole tool call.

use dfsmate_types::audit::PermSnapshot;
use dfsmate_types::tool::{EntryKind, LsEntry, StatData};

/// Parse `hdfs dfs -ls [-R]` output into entries.
///
/// The `Found N items` banner is skipped. A valid line has at least eight
/// whitespace-separated columns: perm, replication, owner, group, size,
/// date, time, path. Paths containing spaces re-join the trailing columns.
pub fn parse_ls(stdout: &str) -> Vec<LsEntry> {
    let mut entries = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("Found ") {
            continue;
        }
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 8 {
            continue;
        }
        let perm = cols[0];
        let kind = if perm.starts_with('d') {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        let size = cols[4].parse::<u64>().unwrap_or(0);
        entries.push(LsEntry {
            path: cols[7..].join(" "),
            kind,
            perm: perm.to_string(),
            owner: cols[2].to_string(),
            group: cols[3].to_string(),
            size,
            date: cols[5].to_string(),
            time: cols[6].to_string(),
            replication: cols[1].to_string(),
        });
    }
    entries
}

/// Parse one `hdfs dfs -stat '%n|%b|%o|%r|%u|%g|%y|%F'` line.
///
/// Returns `None` when the line does not have exactly eight fields; the
/// caller then reports the raw output instead.
pub fn parse_stat(line: &str) -> Option<StatData> {
    let line = line.trim();
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 8 {
        return None;
    }
    Some(StatData {
        name: fields[0].to_string(),
        size: fields[1].parse::<u64>().unwrap_or(0),
        block_size: fields[2].to_string(),
        replication: fields[3].to_string(),
        owner: fields[4].to_string(),
        group: fields[5].to_string(),
        modified: fields[6].to_string(),
        kind: fields[7].to_string(),
        raw: line.to_string(),
    })
}

/// Parse one `hdfs dfs -stat '%A|%u|%g|%F'` line into a permission snapshot.
pub fn parse_perm_snapshot(path: &str, line: &str) -> Option<PermSnapshot> {
    let line = line.trim();
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 4 {
        return None;
    }
    Some(PermSnapshot {
        path: path.to_string(),
        perm: fields[0].to_string(),
        owner: fields[1].to_string(),
        group: fields[2].to_string(),
        kind: Some(fields[3].to_string()),
    })
}

/// Last non-empty line of `hdfs dfs -count -q -v` output, which carries the
/// quota numbers for the queried path (earlier lines are the header).
pub fn quota_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .map(str::to_string)
}
