//! The MCP server loop: newline-delimited JSON-RPC over a byte stream.
//!
//! Requests are handled sequentially; tool calls run one at a time against
//! the namenode, which matches how the audit trail is meant to read.
//!
//! Tool failures are not JSON-RPC errors: a `tools/call` whose envelope says
//! `ok=false` still succeeds at the RPC layer, with `isError` set so the
//! client can tell. RPC errors are reserved for malformed or unknown
//! requests.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use dfsmate_core::audit::AuditSink;
use dfsmate_core::exec::CommandRunner;
use dfsmate_core::tool::{tool_names, tool_specs, Toolbox};

use super::protocol::{
    JsonRpcRequest, JsonRpcResponse, ToolCallParams, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
    PROTOCOL_VERSION,
};

pub struct McpServer<R, S> {
    toolbox: Toolbox<R, S>,
}

impl<R: CommandRunner, S: AuditSink> McpServer<R, S> {
    pub fn new(toolbox: Toolbox<R, S>) -> Self {
        Self { toolbox }
    }

    /// Read newline-delimited requests from `reader` until EOF, writing one
    /// response line per request (notifications get none).
    pub async fn run(
        &self,
        reader: impl AsyncRead + Unpin,
        mut writer: impl AsyncWrite + Unpin,
    ) -> std::io::Result<()> {
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }

    /// Handle one raw line; `None` means no response is due (notification).
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "unparseable request");
                let response =
                    JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                return serde_json::to_string(&response).ok();
            }
        };

        let id = request.id.clone()?;
        let response = self.handle_request(&request, id).await;
        serde_json::to_string(&response).ok()
    }

    async fn handle_request(&self, request: &JsonRpcRequest, id: Value) -> JsonRpcResponse {
        debug!(method = %request.method, "handling request");
        match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": "dfsmate",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => {
                let tools: Vec<Value> = tool_specs()
                    .into_iter()
                    .map(|spec| {
                        json!({
                            "name": spec.name,
                            "description": spec.description,
                            "inputSchema": spec.parameters,
                        })
                    })
                    .collect();
                JsonRpcResponse::success(id, json!({ "tools": tools }))
            }

            "tools/call" => self.handle_tool_call(request.params.clone(), id).await,

            other => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("method not found: '{other}'"),
            ),
        }
    }

    async fn handle_tool_call(&self, params: Option<Value>, id: Value) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(params)) => params,
            Ok(None) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, "missing params");
            }
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };
        if !tool_names().contains(&params.name.as_str()) {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("unknown tool: '{}'", params.name),
            );
        }

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        let outcome = self.toolbox.dispatch(&params.name, arguments).await;
        let text = serde_json::to_string(&outcome)
            .unwrap_or_else(|_| r#"{"ok":false,"error":"unserializable tool result"}"#.to_string());
        JsonRpcResponse::success(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
                "isError": !outcome.is_ok(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use dfsmate_core::exec::ExecOutput;
    use dfsmate_types::audit::AuditRecord;
    use dfsmate_types::error::{AuditError, ExecError};

    use super::*;

    struct ScriptedRunner {
        results: Mutex<VecDeque<ExecOutput>>,
    }

    impl ScriptedRunner {
        fn ok(stdout: &str) -> ExecOutput {
            ExecOutput {
                exit_code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
                command: Vec::new(),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(&self, argv: Vec<String>) -> Result<ExecOutput, ExecError> {
            let mut out = self
                .results
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted runner exhausted");
            out.command = argv;
            Ok(out)
        }
    }

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl AuditSink for MemorySink {
        async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn server(results: Vec<ExecOutput>) -> McpServer<ScriptedRunner, MemorySink> {
        McpServer::new(Toolbox::new(
            ScriptedRunner {
                results: Mutex::new(results.into()),
            },
            MemorySink::default(),
            true,
        ))
    }

    async fn respond(server: &McpServer<ScriptedRunner, MemorySink>, line: &str) -> Value {
        let raw = server.handle_line(line).await.expect("expected a response");
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server(vec![]);
        let resp = respond(
            &server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        )
        .await;
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(resp["result"]["serverInfo"]["name"], "dfsmate");
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = server(vec![]);
        let out = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_tools_list_publishes_catalog() {
        let server = server(vec![]);
        let resp = respond(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), tool_names().len());
        assert_eq!(tools[0]["name"], "list");
        assert!(tools[0]["inputSchema"]["properties"].get("path").is_some());
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let server = server(vec![ScriptedRunner::ok("Found 0 items\n")]);
        let resp = respond(
            &server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"list","arguments":{"path":"/"}}}"#,
        )
        .await;
        assert_eq!(resp["result"]["isError"], false);
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        let envelope: Value = serde_json::from_str(text).unwrap();
        assert_eq!(envelope["ok"], true);
    }

    #[tokio::test]
    async fn test_tools_call_failure_is_not_rpc_error() {
        let server = server(vec![]);
        // chmod without confirm: gate rejection, but still a JSON-RPC success.
        let resp = respond(
            &server,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"chmod","arguments":{"path":"/","mode":"777"}}}"#,
        )
        .await;
        assert!(resp.get("error").is_none());
        assert_eq!(resp["result"]["isError"], true);
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("confirmation"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let server = server(vec![]);
        let resp = respond(
            &server,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"rmrf","arguments":{}}}"#,
        )
        .await;
        assert_eq!(resp["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = server(vec![]);
        let resp = respond(
            &server,
            r#"{"jsonrpc":"2.0","id":6,"method":"resources/list"}"#,
        )
        .await;
        assert_eq!(resp["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let server = server(vec![]);
        let resp = respond(&server, "{nonsense").await;
        assert_eq!(resp["error"]["code"], -32700);
        assert_eq!(resp["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_run_loop_over_byte_stream() {
        let server = server(vec![ScriptedRunner::ok("Found 0 items\n")]);
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"list","arguments":{}}}"#,
            "\n",
        );
        let mut output: Vec<u8> = Vec::new();
        server.run(input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let responses: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        // The notification produced no response line.
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], 2);
    }
}
