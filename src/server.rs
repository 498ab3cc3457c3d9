use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::io::{BufRead, Write};

use crate::client::{EditorTransport, HttpEditorClient};
use crate::config::{load_config, BridgeConfig};
use crate::dispatch::Dispatcher;

const SERVER_NAME: &str = "unity-mcp-bridge";

pub struct ServerState {
    dispatcher: Dispatcher,
}

impl ServerState {
    pub fn new(config: BridgeConfig, transport: Box<dyn EditorTransport>) -> Self {
        Self { dispatcher: Dispatcher::new(config, transport) }
    }

    fn tool_list(&mut self, id: Value) -> Value {
        let tools = self.dispatcher.list_tools();
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": { "tools": tools }
        })
    }

    fn tool_call(&mut self, id: Value, params: &Value) -> Value {
        let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
            return json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "content": [{"type":"text","text": "Missing tool name"}], "isError": true }
            });
        };
        let args = params
            .get("arguments")
            .and_then(|a| a.as_object())
            .cloned()
            .unwrap_or_else(Map::new);

        let out = self.dispatcher.call_tool(name, &args);
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": out.into_value()
        })
    }

    /// One JSON-RPC message in, at most one reply out. Notifications get none.
    pub fn handle_message(&mut self, msg: &Value) -> Option<Value> {
        let id = msg.get("id").cloned()?;
        let method = msg.get("method").and_then(|m| m.as_str()).unwrap_or("");

        let reply = match method {
            "initialize" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": msg.get("params").and_then(|p| p.get("protocolVersion")).cloned().unwrap_or(json!("2024-11-05")),
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
                }
            }),
            "ping" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {}
            }),
            "tools/list" => self.tool_list(id),
            "tools/call" => {
                let params = msg.get("params").cloned().unwrap_or(json!({}));
                self.tool_call(id, &params)
            }
            "resources/list" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "resources": [] }
            }),
            "prompts/list" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "prompts": [] }
            }),
            _ => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("Method not found: {method}") }
            }),
        };
        Some(reply)
    }
}

pub fn run_stdio_server() -> Result<()> {
    let config = load_config();
    tracing::info!(endpoint = %config.unity_url, source = ?config.url_source, "starting stdio server");
    let mut state = ServerState::new(config, Box::new(HttpEditorClient));
    serve(&mut state, std::io::stdin().lock(), std::io::stdout())
}

/// Line-delimited loop; returns when input closes.
pub fn serve(state: &mut ServerState, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let Ok(line) = line else { continue };
        if line.trim().is_empty() {
            continue;
        }

        let msg: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparsable JSON-RPC line");
                continue;
            }
        };

        let Some(reply) = state.handle_message(&msg) else {
            continue;
        };
        writeln!(output, "{reply}").context("writing JSON-RPC reply")?;
        output.flush().context("flushing stdout")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HealthReport, ToolOutput};
    use crate::error::BridgeError;

    struct Offline;

    impl EditorTransport for Offline {
        fn health(&self, endpoint: &str, _: u64) -> Result<HealthReport, BridgeError> {
            Err(BridgeError::Connection { endpoint: endpoint.into(), reason: "offline".into() })
        }
        fn list_tools(&self, endpoint: &str, _: u64) -> Result<Vec<Value>, BridgeError> {
            Err(BridgeError::Connection { endpoint: endpoint.into(), reason: "offline".into() })
        }
        fn call(&self, endpoint: &str, _: &str, _: &Map<String, Value>, _: u64) -> Result<ToolOutput, BridgeError> {
            Err(BridgeError::Connection { endpoint: endpoint.into(), reason: "offline".into() })
        }
    }

    fn run(lines: &[Value]) -> Vec<Value> {
        let mut state = ServerState::new(BridgeConfig::default(), Box::new(Offline));
        let input: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let mut out = Vec::new();
        serve(&mut state, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn notifications_and_garbage_get_no_reply() {
        let replies = run(&[
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
        ]);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], 1);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let replies = run(&[json!({"jsonrpc": "2.0", "id": "x", "method": "sampling/create"})]);
        assert_eq!(replies[0]["error"]["code"], -32601);
    }

    #[test]
    fn offline_editor_still_lists_and_answers() {
        let replies = run(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2025-03-26"}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "unity.scene.getActive", "arguments": {}}}),
        ]);
        assert_eq!(replies[0]["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(replies[1]["result"]["tools"].as_array().unwrap().len(), 2);
        assert_eq!(replies[2]["result"]["isError"], true);
    }

    #[test]
    fn missing_tool_name_is_a_tool_error() {
        let replies = run(&[json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call", "params": {}})]);
        assert_eq!(replies[0]["result"]["isError"], true);
    }
}
