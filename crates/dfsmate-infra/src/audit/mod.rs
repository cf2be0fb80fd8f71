//! Audit persistence.

mod jsonl;

pub use jsonl::JsonlAuditSink;
