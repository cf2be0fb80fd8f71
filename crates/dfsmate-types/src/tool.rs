//! Tool request/response models for the HDFS administrative tool surface.
//!
//! Every tool request derives [`schemars::JsonSchema`]; the generated schema
//! is published verbatim as the MCP tool input schema and as the OpenAI
//! function parameter schema, so field docs below are operator-visible.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Audit records keep at most this many trailing characters of stdout/stderr.
pub const AUDIT_TRIM_CHARS: usize = 5000;

/// Hard cap on the `limit` paging parameter of the `list` tool.
pub const MAX_LIST_LIMIT: usize = 5000;

/// Tools that only read HDFS state.
pub const SAFE_TOOLS: &[&str] = &["list", "stat", "get", "getquota"];

/// Tools that mutate HDFS state or are heavyweight.
pub const RISKY_TOOLS: &[&str] = &[
    "mkdir",
    "chmod",
    "chown",
    "setquota",
    "getquota",
    "snapshot_create",
    "snapshot_delete",
    "snapshot_rename",
    "snapshot_allow",
    "snapshot_disallow",
    "balancer_trigger",
];

/// Risk classification of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Safe,
    Risky,
    Unknown,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Safe => write!(f, "safe"),
            RiskTier::Risky => write!(f, "risky"),
            RiskTier::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "safe" => Ok(RiskTier::Safe),
            "risky" => Ok(RiskTier::Risky),
            "unknown" => Ok(RiskTier::Unknown),
            other => Err(format!("invalid risk tier: '{other}'")),
        }
    }
}

/// Resolve the risk tier for a tool name.
///
/// The safe set wins when a tool appears in both tables (`getquota` does).
pub fn risk_for(tool: &str) -> RiskTier {
    if SAFE_TOOLS.contains(&tool) {
        RiskTier::Safe
    } else if RISKY_TOOLS.contains(&tool) {
        RiskTier::Risky
    } else {
        RiskTier::Unknown
    }
}

// ---------------------------------------------------------------------------
// Result envelope
// ---------------------------------------------------------------------------

/// Uniform tool result envelope.
///
/// Serializes as `{"ok":true,"data":...}` on success and
/// `{"ok":false,"error":...,"hint":...}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ToolOutcome {
    /// Build a success envelope from any serializable payload.
    ///
    /// Serialization of the payload is infallible for the types we emit;
    /// a failure degrades to a failure envelope rather than a panic.
    pub fn success<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                ok: true,
                data: Some(value),
                error: None,
                hint: None,
            },
            Err(err) => Self::failure(format!("failed to serialize tool result: {err}")),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
            hint: None,
        }
    }

    pub fn failure_with_hint(error: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
            hint: Some(hint.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn default_root() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_limit() -> usize {
    200
}

/// Request for the `list` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ListRequest {
    /// HDFS directory path to list, e.g. `/data/raw`.
    pub path: String,
    /// List recursively (`-R`).
    pub recursive: bool,
    /// Max number of items per page (1..=5000).
    pub limit: usize,
    /// Start index for paging.
    pub offset: usize,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            path: default_root(),
            recursive: false,
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Request for the `stat` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatRequest {
    /// HDFS path (file or directory).
    pub path: String,
}

/// Request for the `mkdir` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MkdirRequest {
    /// Directory path to create.
    pub path: String,
    /// Create parent directories (`-p`).
    #[serde(default = "default_true")]
    pub parents: bool,
    /// Must be true when the strict-confirm policy is enabled.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `put` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PutRequest {
    /// Source path inside the namenode container, e.g. `/tmp/a.txt`.
    pub local_path: String,
    /// Destination path in HDFS.
    pub hdfs_path: String,
    /// Overwrite the destination if it exists (requires confirm=true).
    #[serde(default)]
    pub overwrite: bool,
    /// Explicit confirmation; required when overwrite=true.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `get` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetRequest {
    /// Source path in HDFS.
    pub hdfs_path: String,
    /// Destination path inside the namenode container.
    pub local_path: String,
    /// Overwrite the local destination (requires confirm=true).
    #[serde(default)]
    pub overwrite: bool,
    /// Explicit confirmation; required when overwrite=true.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `chmod` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChmodRequest {
    /// HDFS path.
    pub path: String,
    /// Permission mode, e.g. `755` or `u+rwx,g+rx,o+rx`.
    pub mode: String,
    /// Apply recursively (`-R`).
    #[serde(default)]
    pub recursive: bool,
    /// Must be true; chmod is a risky operation.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `chown` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChownRequest {
    /// HDFS path.
    pub path: String,
    /// New owner.
    pub owner: String,
    /// Optional new group.
    #[serde(default)]
    pub group: Option<String>,
    /// Apply recursively (`-R`).
    #[serde(default)]
    pub recursive: bool,
    /// Must be true; chown is a risky operation.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `getquota` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetQuotaRequest {
    /// HDFS path.
    pub path: String,
}

/// Request for the `setquota` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetQuotaRequest {
    /// HDFS path.
    pub path: String,
    /// Max number of names (files + directories) under the path.
    #[serde(default)]
    pub namespace_quota: Option<u64>,
    /// Space quota value, e.g. `1g` or `1073741824`.
    #[serde(default)]
    pub space_quota: Option<String>,
    /// Must be true; quota changes can block writes.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `snapshot_create` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotCreateRequest {
    /// Snapshottable HDFS directory.
    pub path: String,
    /// Optional snapshot name; HDFS generates one when omitted.
    #[serde(default)]
    pub name: Option<String>,
    /// Must be true to create the snapshot.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `snapshot_delete` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotDeleteRequest {
    /// HDFS directory owning the snapshot.
    pub path: String,
    /// Snapshot name.
    pub name: String,
    /// Must be true; deleting a snapshot is destructive.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `snapshot_rename` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotRenameRequest {
    /// HDFS directory owning the snapshot.
    pub path: String,
    /// Current snapshot name.
    pub old_name: String,
    /// New snapshot name.
    pub new_name: String,
    /// Must be true to rename the snapshot.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `snapshot_allow` and `snapshot_disallow` tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotPolicyRequest {
    /// HDFS directory to mark snapshottable (or not).
    pub path: String,
    /// Must be true to change the snapshot policy.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for the `balancer_trigger` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BalancerRequest {
    /// Must be true to start balancing.
    #[serde(default)]
    pub confirm: bool,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Whether an `ls` line describes a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Dir => write!(f, "dir"),
        }
    }
}

/// One parsed line of `hdfs dfs -ls` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub perm: String,
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub date: String,
    pub time: String,
    pub replication: String,
}

/// Payload of a successful `list` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListData {
    pub items: Vec<LsEntry>,
    pub next_offset: Option<usize>,
    pub total_in_page: usize,
}

/// Payload of a successful `stat` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatData {
    pub name: String,
    pub size: u64,
    pub block_size: String,
    pub replication: String,
    pub owner: String,
    pub group: String,
    pub modified: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub raw: String,
}

/// Payload of a successful `getquota` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaData {
    pub path: String,
    pub raw: String,
    pub line: String,
}
