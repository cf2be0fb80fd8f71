//! Shared domain types for dfsmate.
//!
//! This crate has no business logic; it defines the data shapes exchanged
//! between the tool layer, the executor, the audit trail, and the chat
//! agent, plus the error enums for each concern.

pub mod audit;
pub mod config;
pub mod error;
pub mod llm;
pub mod tool;
