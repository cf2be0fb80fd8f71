//! Append-only JSONL audit log.
//!
//! One serialized [`AuditRecord`] per line. The file is created (with its
//! parent directories) at startup so permission problems show up before the
//! first tool call rather than during one.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use dfsmate_core::audit::AuditSink;
use dfsmate_types::audit::AuditRecord;
use dfsmate_types::error::AuditError;

pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Open (creating if needed) the audit log at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        debug!(path = %path.display(), "audit log ready");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last `n` records, oldest first. Unparseable lines are skipped so a
    /// torn final line never hides the rest of the trail.
    pub async fn tail(&self, n: usize) -> Result<Vec<AuditRecord>, AuditError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let mut records: Vec<AuditRecord> = contents
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect();
        let skip = records.len().saturating_sub(n);
        Ok(records.split_off(skip))
    }
}

impl AuditSink for JsonlAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
