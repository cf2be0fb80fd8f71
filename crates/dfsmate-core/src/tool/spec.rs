//! The published tool catalog.
//!
//! One [`ToolSpec`] per tool, with the argument schema generated from the
//! request structs in `dfsmate-types`. The MCP server and the agent loop
//! both publish this catalog verbatim.

use schemars::JsonSchema;
use serde_json::Value;

use dfsmate_types::llm::ToolSpec;
use dfsmate_types::tool::{
    BalancerRequest, ChmodRequest, ChownRequest, GetQuotaRequest, GetRequest, ListRequest,
    MkdirRequest, PutRequest, SetQuotaRequest, SnapshotCreateRequest, SnapshotDeleteRequest,
    SnapshotPolicyRequest, SnapshotRenameRequest, StatRequest,
};

/// Names of every published tool, in catalog order.
pub fn tool_names() -> &'static [&'static str] {
    &[
        "list",
        "stat",
        "mkdir",
        "put",
        "get",
        "chmod",
        "chown",
        "getquota",
        "setquota",
        "snapshot_create",
        "snapshot_delete",
        "snapshot_rename",
        "snapshot_allow",
        "snapshot_disallow",
        "balancer_trigger",
    ]
}

fn spec<T: JsonSchema>(name: &str, description: &str) -> ToolSpec {
    let schema = schemars::schema_for!(T);
    let parameters =
        serde_json::to_value(schema).unwrap_or_else(|_| Value::Object(Default::default()));
    ToolSpec {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// Build the full tool catalog.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        spec::<ListRequest>(
            "list",
            "List an HDFS directory with paging. Safe, read-only.",
        ),
        spec::<StatRequest>(
            "stat",
            "Show metadata (size, owner, permissions, mtime) for one HDFS path. Safe, read-only.",
        ),
        spec::<MkdirRequest>(
            "mkdir",
            "Create an HDFS directory. Requires confirm=true under the strict-confirm policy.",
        ),
        spec::<PutRequest>(
            "put",
            "Upload a file from the namenode container into HDFS. Overwriting requires confirm=true.",
        ),
        spec::<GetRequest>(
            "get",
            "Download an HDFS file into the namenode container. Safe unless overwriting.",
        ),
        spec::<ChmodRequest>(
            "chmod",
            "Change HDFS permissions. Risky; requires confirm=true.",
        ),
        spec::<ChownRequest>(
            "chown",
            "Change HDFS owner and group. Risky; requires confirm=true.",
        ),
        spec::<GetQuotaRequest>(
            "getquota",
            "Show namespace/space quota and usage for an HDFS path. Safe, read-only.",
        ),
        spec::<SetQuotaRequest>(
            "setquota",
            "Set namespace and/or space quota on an HDFS path. Risky; requires confirm=true.",
        ),
        spec::<SnapshotCreateRequest>(
            "snapshot_create",
            "Create a snapshot of a snapshottable HDFS directory. Risky; requires confirm=true.",
        ),
        spec::<SnapshotDeleteRequest>(
            "snapshot_delete",
            "Delete an HDFS snapshot. Risky; requires confirm=true.",
        ),
        spec::<SnapshotRenameRequest>(
            "snapshot_rename",
            "Rename an HDFS snapshot. Risky; requires confirm=true.",
        ),
        spec::<SnapshotPolicyRequest>(
            "snapshot_allow",
            "Allow snapshots on an HDFS directory. Risky; requires confirm=true.",
        ),
        spec::<SnapshotPolicyRequest>(
            "snapshot_disallow",
            "Disallow snapshots on an HDFS directory. Risky; requires confirm=true.",
        ),
        spec::<BalancerRequest>(
            "balancer_trigger",
            "Run the HDFS balancer once. Risky; requires confirm=true.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_names() {
        let specs = tool_specs();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, tool_names());
    }

    #[test]
    fn test_every_spec_has_object_schema() {
        for spec in tool_specs() {
            let params = &spec.parameters;
            assert!(
                params.get("properties").is_some() || params.get("type").is_some(),
                "{} has no usable schema",
                spec.name
            );
            assert!(!spec.description.is_empty());
        }
    }

    #[test]
    fn test_confirm_field_documented_on_risky_tools() {
        for spec in tool_specs() {
            if dfsmate_types::tool::risk_for(&spec.name) == dfsmate_types::tool::RiskTier::Risky {
                assert!(
                    spec.parameters["properties"].get("confirm").is_some(),
                    "{} is risky but its schema has no confirm field",
                    spec.name
                );
            }
        }
    }
}
