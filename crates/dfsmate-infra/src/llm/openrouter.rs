//! OpenRouterProvider -- concrete [`ChatProvider`] for the OpenRouter
//! chat-completions API (OpenAI-compatible wire format, with tool calling).
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dfsmate_core::llm::ChatProvider;
use dfsmate_types::config::DEFAULT_BASE_URL;
use dfsmate_types::llm::{ChatError, ChatMessage, ChatRequest, ChatResponse, ToolCall};

/// OpenRouter chat provider.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenRouterProvider {
    /// OpenRouter uses these attribution headers instead of a user agent.
    const REFERER: &'static str = "http://localhost";
    const TITLE: &'static str = "dfsmate";

    pub fn new(api_key: SecretString) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ChatError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn to_wire_request(request: &ChatRequest) -> WireRequest {
        let messages = request.messages.iter().map(WireMessage::from).collect();
        let tools: Vec<WireTool> = request
            .tools
            .iter()
            .map(|t| WireTool {
                kind: "function".to_string(),
                function: WireFunctionDef {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect();
        let tool_choice = (!tools.is_empty()).then(|| "auto".to_string());
        WireRequest {
            model: request.model.clone(),
            messages,
            tools,
            tool_choice,
            temperature: request.temperature,
        }
    }
}

impl ChatProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let body = Self::to_wire_request(&request);
        let url = self.url("/chat/completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .header("HTTP-Referer", Self::REFERER)
            .header("X-Title", Self::TITLE)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => ChatError::AuthenticationFailed,
                429 => ChatError::RateLimited { retry_after_ms },
                400 => ChatError::InvalidRequest(error_body),
                _ => ChatError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Deserialization(format!("failed to parse response: {e}")))?;

        let choice = wire.choices.into_iter().next().ok_or(ChatError::EmptyResponse)?;
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|c| ToolCall {
                id: c.id,
                name: c.function.name,
                arguments: c.function.arguments,
            })
            .collect();

        Ok(ChatResponse {
            id: wire.id,
            model: wire.model,
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types (OpenAI chat-completions shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    /// Null content is legal on assistant messages that only carry tool calls.
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        let tool_calls = (!msg.tool_calls.is_empty()).then(|| {
            msg.tool_calls
                .iter()
                .map(|c| WireToolCall {
                    id: c.id.clone(),
                    kind: "function".to_string(),
                    function: WireFunctionCall {
                        name: c.name.clone(),
                        arguments: c.arguments.clone(),
                    },
                })
                .collect()
        });
        Self {
            role: msg.role.to_string(),
            content: (!msg.content.is_empty() || tool_calls.is_none())
                .then(|| msg.content.clone()),
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionDef,
}

#[derive(Debug, Serialize)]
struct WireFunctionDef {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[cfg(test)]
mod tests {
    use dfsmate_types::llm::ToolSpec;

    use super::*;

    fn make_provider() -> OpenRouterProvider {
        OpenRouterProvider::new(SecretString::from("sk-test-not-real")).unwrap()
    }

    #[test]
    fn test_provider_name_and_url() {
        let provider = make_provider().with_base_url("http://localhost:9999/api/v1");
        assert_eq!(provider.name(), "openrouter");
        assert_eq!(
            provider.url("/chat/completions"),
            "http://localhost:9999/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_wire_request_shape() {
        let request = ChatRequest {
            model: "openai/gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            tools: vec![ToolSpec {
                name: "list".to_string(),
                description: "list a directory".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            }],
            temperature: Some(0.2),
        };
        let wire = OpenRouterProvider::to_wire_request(&request);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["model"], "openai/gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "list");
        assert_eq!(json["tool_choice"], "auto");
        assert_eq!(json["temperature"], 0.2);
    }

    #[test]
    fn test_wire_request_without_tools_omits_tool_choice() {
        let request = ChatRequest {
            model: "openai/gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::user("hi")],
            tools: vec![],
            temperature: None,
        };
        let json = serde_json::to_value(OpenRouterProvider::to_wire_request(&request)).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_choice").is_none());
    }

    #[test]
    fn test_assistant_tool_call_message_has_null_content() {
        let msg = ChatMessage::assistant_with_tool_calls(
            "",
            vec![ToolCall {
                id: "call_1".to_string(),
                name: "stat".to_string(),
                arguments: r#"{"path":"/"}"#.to_string(),
            }],
        );
        let json = serde_json::to_value(WireMessage::from(&msg)).unwrap();
        assert!(json["content"].is_null());
        assert_eq!(json["tool_calls"][0]["function"]["name"], "stat");
        assert_eq!(json["tool_calls"][0]["type"], "function");
    }

    #[test]
    fn test_tool_result_message_carries_call_id() {
        let msg = ChatMessage::tool("call_1", r#"{"ok":true}"#);
        let json = serde_json::to_value(WireMessage::from(&msg)).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
        assert_eq!(json["content"], r#"{"ok":true}"#);
    }

    #[test]
    fn test_response_parsing_with_tool_calls() {
        let body = r#"{
            "id": "gen-1",
            "model": "openai/gpt-4o-mini",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "list", "arguments": "{\"path\":\"/data\"}"}
                    }]
                }
            }]
        }"#;
        let wire: WireResponse = serde_json::from_str(body).unwrap();
        let choice = &wire.choices[0];
        assert!(choice.message.content.is_none());
        let calls = choice.message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "list");
        assert_eq!(calls[0].function.arguments, "{\"path\":\"/data\"}");
    }

    #[test]
    fn test_response_parsing_plain_text() {
        let body = r#"{
            "id": "gen-2",
            "model": "openai/gpt-4o-mini",
            "choices": [{"message": {"content": "all clear"}}]
        }"#;
        let wire: WireResponse = serde_json::from_str(body).unwrap();
        assert_eq!(wire.choices[0].message.content.as_deref(), Some("all clear"));
        assert!(wire.choices[0].message.tool_calls.is_none());
    }
}
