//! The agent turn loop.
//!
//! One [`Agent::run_turn`] call takes a user message, lets the model call
//! tools for up to [`MAX_TOOL_STEPS`] rounds, and returns the final reply
//! plus a report of every action taken. Conversation history persists across
//! turns on the agent itself.

use std::future::Future;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use dfsmate_types::error::AgentError;
use dfsmate_types::llm::{ChatMessage, ChatRequest, ToolCall};
use dfsmate_types::tool::{risk_for, RiskTier, ToolOutcome};

use crate::audit::AuditSink;
use crate::exec::CommandRunner;
use crate::llm::ChatProvider;
use crate::tool::{tool_specs, Toolbox};

use super::prompts::SYSTEM_PROMPT;

/// Max model round-trips with tool calls per user turn.
pub const MAX_TOOL_STEPS: usize = 10;

/// Sampling temperature for administrative work.
const TEMPERATURE: f32 = 0.2;

/// Operator-side review of a tool call before it executes.
///
/// The gate may rewrite the arguments (the CLI gate resets model-supplied
/// `confirm`/`overwrite` flags and sets them only after the operator
/// approves) or deny the call outright.
pub trait ToolGate: Send + Sync {
    fn review(
        &self,
        tool: &str,
        risk: RiskTier,
        args: Value,
    ) -> impl Future<Output = GateDecision> + Send;
}

/// Outcome of a gate review.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Execute with these (possibly rewritten) arguments.
    Approved(Value),
    /// Do not execute; the reason goes back to the model as a failure.
    Denied(String),
}

/// Gate that passes every call through untouched. Used by the MCP server,
/// where the connected client is the confirmation authority.
pub struct AllowAll;

impl ToolGate for AllowAll {
    async fn review(&self, _tool: &str, _risk: RiskTier, args: Value) -> GateDecision {
        GateDecision::Approved(args)
    }
}

/// One executed (or denied) tool call within a turn.
#[derive(Debug, Clone)]
pub struct ActionEntry {
    pub tool: String,
    pub args: Value,
    pub ok: bool,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// What happened during one user turn.
#[derive(Debug, Clone, Default)]
pub struct TurnReport {
    /// The model's final text reply; `None` when the step budget ran out
    /// before the model produced one.
    pub reply: Option<String>,
    pub actions: Vec<ActionEntry>,
    pub step_limited: bool,
}

/// A stateful chat agent over the HDFS tool surface.
pub struct Agent<P, R, S, G> {
    provider: P,
    toolbox: Toolbox<R, S>,
    gate: G,
    model: String,
    history: Vec<ChatMessage>,
}

impl<P, R, S, G> Agent<P, R, S, G>
where
    P: ChatProvider,
    R: CommandRunner,
    S: AuditSink,
    G: ToolGate,
{
    pub fn new(provider: P, toolbox: Toolbox<R, S>, gate: G, model: impl Into<String>) -> Self {
        Self {
            provider,
            toolbox,
            gate,
            model: model.into(),
            history: vec![ChatMessage::system(SYSTEM_PROMPT)],
        }
    }

    /// Run one user turn to completion.
    pub async fn run_turn(&mut self, input: &str) -> Result<TurnReport, AgentError> {
        self.history.push(ChatMessage::user(input));
        let mut report = TurnReport::default();

        for step in 0..MAX_TOOL_STEPS {
            let request = ChatRequest {
                model: self.model.clone(),
                messages: self.history.clone(),
                tools: tool_specs(),
                temperature: Some(TEMPERATURE),
            };
            let response = self.provider.complete(request).await?;

            if !response.wants_tools() {
                self.history.push(ChatMessage::assistant(response.content.clone()));
                report.reply = Some(response.content);
                return Ok(report);
            }

            debug!(step, calls = response.tool_calls.len(), "model requested tools");
            self.history.push(ChatMessage::assistant_with_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let (outcome, entry) = self.execute_call(call).await;
                let payload = serde_json::to_string(&outcome)
                    .unwrap_or_else(|_| r#"{"ok":false,"error":"unserializable tool result"}"#.to_string());
                self.history.push(ChatMessage::tool(call.id.clone(), payload));
                report.actions.push(entry);
            }
        }

        warn!(max_steps = MAX_TOOL_STEPS, "turn hit the tool step budget");
        report.step_limited = true;
        Ok(report)
    }

    async fn execute_call(&self, call: &ToolCall) -> (ToolOutcome, ActionEntry) {
        // Malformed argument JSON from the model degrades to {}.
        let args: Value = serde_json::from_str(&call.arguments)
            .unwrap_or_else(|_| Value::Object(Default::default()));
        let risk = risk_for(&call.name);

        let started = Instant::now();
        let outcome = match self.gate.review(&call.name, risk, args.clone()).await {
            GateDecision::Approved(reviewed) => self.toolbox.dispatch(&call.name, reviewed).await,
            GateDecision::Denied(reason) => {
                info!(tool = %call.name, "operator denied tool call");
                ToolOutcome::failure(reason)
            }
        };
        let entry = ActionEntry {
            tool: call.name.clone(),
            args,
            ok: outcome.is_ok(),
            error: outcome.error.clone(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        (outcome, entry)
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::json;

    use dfsmate_types::llm::{ChatError, ChatResponse};

    use crate::tool::testing::{MemorySink, ScriptedRunner};

    use super::*;

    /// Provider that replays scripted responses.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<ChatResponse>>,
        pub requests_seen: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<ChatResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests_seen: Mutex::new(0),
            }
        }

        fn text(content: &str) -> ChatResponse {
            ChatResponse {
                id: "r".to_string(),
                model: "openai/gpt-4o-mini".to_string(),
                content: content.to_string(),
                tool_calls: Vec::new(),
            }
        }

        fn tool_call(name: &str, arguments: &str) -> ChatResponse {
            ChatResponse {
                id: "r".to_string(),
                model: "openai/gpt-4o-mini".to_string(),
                content: String::new(),
                tool_calls: vec![ToolCall {
                    id: "call_1".to_string(),
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                }],
            }
        }
    }

    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, ChatError> {
            *self.requests_seen.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(ChatError::EmptyResponse)
        }
    }

    /// Gate that denies every risky call.
    struct DenyRisky;

    impl ToolGate for DenyRisky {
        async fn review(&self, _tool: &str, risk: RiskTier, args: Value) -> GateDecision {
            match risk {
                RiskTier::Safe => GateDecision::Approved(args),
                _ => GateDecision::Denied("User denied confirmation".to_string()),
            }
        }
    }

    fn agent<G: ToolGate>(
        responses: Vec<ChatResponse>,
        exec_results: Vec<Result<crate::exec::ExecOutput, dfsmate_types::error::ExecError>>,
        gate: G,
    ) -> Agent<ScriptedProvider, ScriptedRunner, MemorySink, G> {
        Agent::new(
            ScriptedProvider::new(responses),
            Toolbox::new(ScriptedRunner::new(exec_results), MemorySink::default(), true),
            gate,
            "openai/gpt-4o-mini",
        )
    }

    #[tokio::test]
    async fn test_plain_reply_no_tools() {
        let mut agent = agent(vec![ScriptedProvider::text("hello")], vec![], AllowAll);
        let report = agent.run_turn("hi").await.unwrap();
        assert_eq!(report.reply.as_deref(), Some("hello"));
        assert!(report.actions.is_empty());
        assert!(!report.step_limited);
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let mut agent = agent(
            vec![
                ScriptedProvider::tool_call("list", r#"{"path":"/data"}"#),
                ScriptedProvider::text("the directory is empty"),
            ],
            vec![ScriptedRunner::ok("Found 0 items\n")],
            AllowAll,
        );
        let report = agent.run_turn("what's in /data?").await.unwrap();
        assert_eq!(report.reply.as_deref(), Some("the directory is empty"));
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.actions[0].tool, "list");
        assert!(report.actions[0].ok);

        // History carries the tool result back to the model.
        let history = agent.history();
        let tool_msg = history
            .iter()
            .find(|m| m.tool_call_id.is_some())
            .expect("tool message in history");
        assert!(tool_msg.content.contains(r#""ok":true"#));
    }

    #[tokio::test]
    async fn test_malformed_arguments_degrade_to_empty_object() {
        let mut agent = agent(
            vec![
                ScriptedProvider::tool_call("list", "{not json"),
                ScriptedProvider::text("done"),
            ],
            // ListRequest defaults apply: path "/".
            vec![ScriptedRunner::ok("Found 0 items\n")],
            AllowAll,
        );
        let report = agent.run_turn("list").await.unwrap();
        assert!(report.actions[0].ok);
        assert_eq!(report.actions[0].args, json!({}));
    }

    #[tokio::test]
    async fn test_denied_call_feeds_failure_to_model() {
        let mut agent = agent(
            vec![
                ScriptedProvider::tool_call("chmod", r#"{"path":"/","mode":"777","confirm":true}"#),
                ScriptedProvider::text("the operator declined"),
            ],
            vec![],
            DenyRisky,
        );
        let report = agent.run_turn("chmod 777 /").await.unwrap();
        assert_eq!(report.actions.len(), 1);
        assert!(!report.actions[0].ok);
        assert_eq!(
            report.actions[0].error.as_deref(),
            Some("User denied confirmation")
        );
        assert_eq!(report.reply.as_deref(), Some("the operator declined"));
    }

    #[tokio::test]
    async fn test_step_budget_caps_the_loop() {
        let responses: Vec<ChatResponse> = (0..MAX_TOOL_STEPS + 5)
            .map(|_| ScriptedProvider::tool_call("stat", r#"{"path":"/"}"#))
            .collect();
        let exec_results = (0..MAX_TOOL_STEPS)
            .map(|_| ScriptedRunner::ok("/|0|0|3|hdfs|supergroup|2026-01-01 00:00:00|directory"))
            .collect();
        let mut agent = agent(responses, exec_results, AllowAll);
        let report = agent.run_turn("loop forever").await.unwrap();
        assert!(report.step_limited);
        assert!(report.reply.is_none());
        assert_eq!(report.actions.len(), MAX_TOOL_STEPS);
        assert_eq!(*agent.provider.requests_seen.lock().unwrap(), MAX_TOOL_STEPS);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mut agent = agent(vec![], vec![], AllowAll);
        let err = agent.run_turn("hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Chat(ChatError::EmptyResponse)));
    }
}
