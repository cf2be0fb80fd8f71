//! The chat-provider trait the agent loop talks to.

use std::future::Future;

use dfsmate_types::llm::{ChatError, ChatRequest, ChatResponse};

/// A chat-completion backend with tool calling.
///
/// The production implementation is the OpenRouter client in
/// `dfsmate-infra`; tests script responses directly.
pub trait ChatProvider: Send + Sync {
    /// Provider name for logging (`openrouter`).
    fn name(&self) -> &str;

    fn complete(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, ChatError>> + Send;
}
