//! Allow-listed `hdfs` command builders.
//!
//! Every argv handed to the exec boundary is built here. `hdfs dfs` goes
//! through [`dfs`], which rejects subcommands outside the allow list;
//! `dfsadmin` and `balancer` invocations have dedicated builders so there is
//! no generic escape hatch for arbitrary admin commands.

use dfsmate_types::error::ExecError;

/// `hdfs dfs` subcommands the tool surface is allowed to run.
pub const ALLOWED_DFS_SUBCOMMANDS: &[&str] =
    &["ls", "stat", "mkdir", "put", "get", "chmod", "chown"];

/// Format string for the `stat` tool: name, size, block size, replication,
/// owner, group, mtime, type.
pub const STAT_FORMAT: &str = "%n|%b|%o|%r|%u|%g|%y|%F";

/// Format string for permission snapshots: perm, owner, group, type.
pub const PERM_STAT_FORMAT: &str = "%A|%u|%g|%F";

/// Build an `hdfs dfs -<subcommand> ...` argv, enforcing the allow list.
pub fn dfs(subcommand: &str, args: &[&str]) -> Result<Vec<String>, ExecError> {
    if !ALLOWED_DFS_SUBCOMMANDS.contains(&subcommand) {
        return Err(ExecError::ForbiddenSubcommand(subcommand.to_string()));
    }
    let mut argv = vec!["hdfs".to_string(), "dfs".to_string(), format!("-{subcommand}")];
    argv.extend(args.iter().map(|a| a.to_string()));
    Ok(argv)
}

/// `hdfs dfs -count -q <path>`: quota and usage summary.
pub fn count_quota(path: &str) -> Vec<String> {
    vec![
        "hdfs".to_string(),
        "dfs".to_string(),
        "-count".to_string(),
        "-q".to_string(),
        path.to_string(),
    ]
}

/// `hdfs dfsadmin -setQuota <n> <path>`: namespace quota.
pub fn set_quota(namespace_quota: u64, path: &str) -> Vec<String> {
    vec![
        "hdfs".to_string(),
        "dfsadmin".to_string(),
        "-setQuota".to_string(),
        namespace_quota.to_string(),
        path.to_string(),
    ]
}

/// `hdfs dfsadmin -setSpaceQuota <size> <path>`: space quota.
pub fn set_space_quota(space_quota: &str, path: &str) -> Vec<String> {
    vec![
        "hdfs".to_string(),
        "dfsadmin".to_string(),
        "-setSpaceQuota".to_string(),
        space_quota.to_string(),
        path.to_string(),
    ]
}

/// `hdfs dfs -createSnapshot <path> [name]`.
pub fn create_snapshot(path: &str, name: Option<&str>) -> Vec<String> {
    let mut argv = vec![
        "hdfs".to_string(),
        "dfs".to_string(),
        "-createSnapshot".to_string(),
        path.to_string(),
    ];
    if let Some(name) = name {
        argv.push(name.to_string());
    }
    argv
}

/// `hdfs dfs -deleteSnapshot <path> <name>`.
pub fn delete_snapshot(path: &str, name: &str) -> Vec<String> {
    vec![
        "hdfs".to_string(),
        "dfs".to_string(),
        "-deleteSnapshot".to_string(),
        path.to_string(),
        name.to_string(),
    ]
}

/// `hdfs dfs -renameSnapshot <path> <old> <new>`.
pub fn rename_snapshot(path: &str, old_name: &str, new_name: &str) -> Vec<String> {
    vec![
        "hdfs".to_string(),
        "dfs".to_string(),
        "-renameSnapshot".to_string(),
        path.to_string(),
        old_name.to_string(),
        new_name.to_string(),
    ]
}

/// `hdfs dfsadmin -allowSnapshot <path>`.
pub fn allow_snapshot(path: &str) -> Vec<String> {
    vec![
        "hdfs".to_string(),
        "dfsadmin".to_string(),
        "-allowSnapshot".to_string(),
        path.to_string(),
    ]
}

/// `hdfs dfsadmin -disallowSnapshot <path>`.
pub fn disallow_snapshot(path: &str) -> Vec<String> {
    vec![
        "hdfs".to_string(),
        "dfsadmin".to_string(),
        "-disallowSnapshot".to_string(),
        path.to_string(),
    ]
}

/// `hdfs balancer`: trigger a rebalancing run.
pub fn balancer() -> Vec<String> {
    vec!["hdfs".to_string(), "balancer".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dfs_allowed_subcommand() {
        let argv = dfs("ls", &["-R", "/data"]).unwrap();
        assert_eq!(argv, vec!["hdfs", "dfs", "-ls", "-R", "/data"]);
    }

    #[test]
    fn test_dfs_forbidden_subcommand() {
        let err = dfs("rm", &["-r", "/"]).unwrap_err();
        assert!(matches!(err, ExecError::ForbiddenSubcommand(ref s) if s == "rm"));
    }

    #[test]
    fn test_dfs_rejects_admin_verbs() {
        assert!(dfs("createSnapshot", &["/data"]).is_err());
        assert!(dfs("setQuota", &["10", "/data"]).is_err());
    }

    #[test]
    fn test_count_quota_argv() {
        assert_eq!(
            count_quota("/data"),
            vec!["hdfs", "dfs", "-count", "-q", "/data"]
        );
    }

    #[test]
    fn test_quota_builders() {
        assert_eq!(
            set_quota(1000, "/data"),
            vec!["hdfs", "dfsadmin", "-setQuota", "1000", "/data"]
        );
        assert_eq!(
            set_space_quota("1g", "/data"),
            vec!["hdfs", "dfsadmin", "-setSpaceQuota", "1g", "/data"]
        );
    }

    #[test]
    fn test_snapshot_builders() {
        assert_eq!(
            create_snapshot("/data", None),
            vec!["hdfs", "dfs", "-createSnapshot", "/data"]
        );
        assert_eq!(
            create_snapshot("/data", Some("s1")),
            vec!["hdfs", "dfs", "-createSnapshot", "/data", "s1"]
        );
        assert_eq!(
            rename_snapshot("/data", "s1", "s2"),
            vec!["hdfs", "dfs", "-renameSnapshot", "/data", "s1", "s2"]
        );
        assert_eq!(
            allow_snapshot("/data"),
            vec!["hdfs", "dfsadmin", "-allowSnapshot", "/data"]
        );
    }

    #[test]
    fn test_balancer_argv() {
        assert_eq!(balancer(), vec!["hdfs", "balancer"]);
    }
}
