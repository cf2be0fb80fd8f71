//! Business logic for dfsmate: allow-listed command building, the retrying
//! executor seam, CLI output parsing, the audit trail, the tool handlers,
//! and the chat agent loop.
//!
//! Infrastructure implementations (docker exec, JSONL audit file, the
//! OpenRouter client) live in `dfsmate-infra`.

pub mod agent;
pub mod audit;
pub mod exec;
pub mod llm;
pub mod parse;
pub mod tool;
