//! The chat agent: a tool-calling loop over a [`crate::llm::ChatProvider`]
//! with operator-side confirmation gating.

mod engine;
pub mod prompts;

pub use engine::{
    ActionEntry, Agent, AllowAll, GateDecision, ToolGate, TurnReport, MAX_TOOL_STEPS,
};
