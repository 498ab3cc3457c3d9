//! HTTP transport to the Unity editor bridge.
//!
//! Three request shapes: `GET /health`, `GET /tools`, `POST /tools/call`.
//! The tree snapshot is just another operation (`unity.scene.list`).

use std::io::{self, Read};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::BridgeError;
use crate::tree::TreeSnapshot;

pub const SCENE_LIST_OPERATION: &str = "unity.scene.list";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Successful `{content, isError}` envelope. `is_error` is a business-level
/// failure reported by the editor, not a transport fault.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub content: Vec<Value>,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            content: vec![json!({"type": "text", "text": text.into()})],
            is_error,
        }
    }

    pub fn json(value: &Value, is_error: bool) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text, is_error)
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|c| c.get("type").and_then(|t| t.as_str()) == Some("text"))
            .and_then(|c| c.get("text"))
            .and_then(|t| t.as_str())
    }

    /// First text item parsed as JSON, if it is JSON.
    pub fn first_json(&self) -> Option<Value> {
        serde_json::from_str(self.first_text()?).ok()
    }

    pub fn into_value(self) -> Value {
        json!({"content": self.content, "isError": self.is_error})
    }
}

/// Seam between the dispatcher and the network. Tests plug in a scripted fake.
pub trait EditorTransport {
    fn health(&self, endpoint: &str, timeout_ms: u64) -> Result<HealthReport, BridgeError>;

    fn list_tools(&self, endpoint: &str, timeout_ms: u64) -> Result<Vec<Value>, BridgeError>;

    fn call(
        &self,
        endpoint: &str,
        name: &str,
        arguments: &Map<String, Value>,
        timeout_ms: u64,
    ) -> Result<ToolOutput, BridgeError>;
}

/// Blocking `ureq` client; one agent per call so every call gets its own budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpEditorClient;

impl HttpEditorClient {
    fn agent(timeout_ms: u64) -> ureq::Agent {
        let budget = Duration::from_millis(timeout_ms.max(1));
        // `timeout` is the overall deadline; the per-phase ones only bound a single read.
        ureq::AgentBuilder::new()
            .timeout(budget)
            .timeout_connect(budget)
            .timeout_read(budget)
            .timeout_write(budget)
            .build()
    }

    fn finish(
        result: Result<ureq::Response, ureq::Error>,
        endpoint: &str,
        operation: &str,
        timeout_ms: u64,
    ) -> Result<Value, BridgeError> {
        match result {
            Ok(resp) => {
                // `into_string` caps bodies at 10 MB; scene snapshots can exceed that.
                let mut body = Vec::new();
                resp.into_reader()
                    .read_to_end(&mut body)
                    .map_err(|e| read_error(e, endpoint, operation, timeout_ms))?;
                serde_json::from_slice(&body).map_err(|e| BridgeError::MalformedResponse {
                    reason: format!("'{operation}' returned non-JSON body: {e}"),
                })
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                // Editors report business errors with non-2xx codes too.
                if let Ok(v) = serde_json::from_str::<Value>(&body) {
                    if let Some(err) = upstream_error(&v) {
                        return Err(err);
                    }
                }
                Err(BridgeError::Http { status, body })
            }
            Err(ureq::Error::Transport(t)) => {
                if transport_timed_out(&t) {
                    Err(BridgeError::Timeout { operation: operation.to_string(), timeout_ms })
                } else {
                    Err(BridgeError::Connection {
                        endpoint: endpoint.to_string(),
                        reason: t.to_string(),
                    })
                }
            }
        }
    }
}

impl EditorTransport for HttpEditorClient {
    fn health(&self, endpoint: &str, timeout_ms: u64) -> Result<HealthReport, BridgeError> {
        let url = format!("{endpoint}/health");
        let v = Self::finish(Self::agent(timeout_ms).get(&url).call(), endpoint, "health", timeout_ms)?;
        parse_health(v)
    }

    fn list_tools(&self, endpoint: &str, timeout_ms: u64) -> Result<Vec<Value>, BridgeError> {
        let url = format!("{endpoint}/tools");
        let v = Self::finish(Self::agent(timeout_ms).get(&url).call(), endpoint, "tools/list", timeout_ms)?;
        parse_tool_list(v)
    }

    fn call(
        &self,
        endpoint: &str,
        name: &str,
        arguments: &Map<String, Value>,
        timeout_ms: u64,
    ) -> Result<ToolOutput, BridgeError> {
        let url = format!("{endpoint}/tools/call");
        let body = json!({"name": name, "arguments": arguments});
        let result = Self::agent(timeout_ms).post(&url).send_json(body);
        let v = Self::finish(result, endpoint, name, timeout_ms)?;
        parse_call_envelope(v)
    }
}

fn transport_timed_out(t: &ureq::Transport) -> bool {
    let mut source = std::error::Error::source(t);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(io_err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
                return true;
            }
        }
        source = err.source();
    }
    t.to_string().contains("timed out")
}

fn read_error(e: io::Error, endpoint: &str, operation: &str, timeout_ms: u64) -> BridgeError {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => BridgeError::Timeout {
            operation: operation.to_string(),
            timeout_ms,
        },
        _ => BridgeError::Connection {
            endpoint: endpoint.to_string(),
            reason: format!("reading response: {e}"),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelope parsing (transport independent)
// ─────────────────────────────────────────────────────────────────────────────

fn upstream_error(v: &Value) -> Option<BridgeError> {
    match v.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(BridgeError::Upstream { message: message.clone(), code: None }),
        Value::Object(obj) => Some(BridgeError::Upstream {
            message: obj
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown editor error")
                .to_string(),
            code: obj.get("code").filter(|c| !c.is_null()).cloned(),
        }),
        other => Some(BridgeError::Upstream { message: other.to_string(), code: None }),
    }
}

/// `{error}` wins over `{content}`; anything else is malformed.
pub fn parse_call_envelope(v: Value) -> Result<ToolOutput, BridgeError> {
    if let Some(err) = upstream_error(&v) {
        return Err(err);
    }
    let Some(content) = v.get("content").and_then(|c| c.as_array()) else {
        return Err(BridgeError::MalformedResponse {
            reason: "expected `content` array or `error` object".into(),
        });
    };
    Ok(ToolOutput {
        content: content.clone(),
        is_error: v.get("isError").and_then(|e| e.as_bool()).unwrap_or(false),
    })
}

pub fn parse_health(v: Value) -> Result<HealthReport, BridgeError> {
    if let Some(err) = upstream_error(&v) {
        return Err(err);
    }
    serde_json::from_value(v).map_err(|e| BridgeError::MalformedResponse {
        reason: format!("health report: {e}"),
    })
}

pub fn parse_tool_list(v: Value) -> Result<Vec<Value>, BridgeError> {
    match v {
        Value::Array(tools) => Ok(tools),
        Value::Object(mut obj) => match obj.remove("tools") {
            Some(Value::Array(tools)) => Ok(tools),
            _ => Err(BridgeError::MalformedResponse { reason: "expected `tools` array".into() }),
        },
        _ => Err(BridgeError::MalformedResponse { reason: "expected `tools` array".into() }),
    }
}

/// Fetch a fresh hierarchy snapshot. Never cached.
pub fn fetch_tree(
    transport: &dyn EditorTransport,
    endpoint: &str,
    max_depth: usize,
    timeout_ms: u64,
) -> Result<TreeSnapshot, BridgeError> {
    let mut args = Map::new();
    args.insert("maxDepth".into(), json!(max_depth));
    let out = transport.call(endpoint, SCENE_LIST_OPERATION, &args, timeout_ms)?;
    if out.is_error {
        return Err(BridgeError::Upstream {
            message: out.first_text().unwrap_or("scene listing failed").to_string(),
            code: None,
        });
    }
    let v = out.first_json().ok_or_else(|| BridgeError::MalformedResponse {
        reason: format!("{SCENE_LIST_OPERATION} did not return JSON text"),
    })?;
    let mut snap = TreeSnapshot::from_value(&v).ok_or_else(|| BridgeError::MalformedResponse {
        reason: format!("{SCENE_LIST_OPERATION} payload has no root object list"),
    })?;
    snap.max_depth.get_or_insert(max_depth);
    Ok(snap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_envelope_becomes_upstream() {
        let err = parse_call_envelope(json!({"error": {"message": "no such object", "code": "NOT_FOUND"}}))
            .unwrap_err();
        assert_eq!(err.to_string(), "editor error [NOT_FOUND]: no such object");
    }

    #[test]
    fn content_envelope_is_unwrapped() {
        let out = parse_call_envelope(json!({
            "content": [{"type": "text", "text": "{\"ok\":true}"}],
            "isError": false
        }))
        .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.first_json(), Some(json!({"ok": true})));
    }

    #[test]
    fn missing_content_is_malformed() {
        let err = parse_call_envelope(json!({"result": 1})).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedResponse { .. }));
        let err = parse_tool_list(json!({"items": []})).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedResponse { .. }));
    }

    #[test]
    fn null_error_field_is_ignored() {
        let out = parse_call_envelope(json!({"error": null, "content": []})).unwrap();
        assert!(out.content.is_empty());
    }

    #[test]
    fn health_report_fields() {
        let h = parse_health(json!({"status": "ok", "projectName": "Demo", "version": "2022.3"})).unwrap();
        assert_eq!(h.project_name.as_deref(), Some("Demo"));
        assert!(parse_health(json!({"projectName": "x"})).is_err());
    }

    /// Answers a single request with `response`, pausing `pause` between bytes when non-zero.
    fn serve_once(response: Vec<u8>, pause: Duration) -> String {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else { return };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line.trim_end().is_empty() {
                    break;
                }
                if let Some((k, v)) = line.trim_end().split_once(':') {
                    if k.eq_ignore_ascii_case("content-length") {
                        content_length = v.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut body);

            if pause.is_zero() {
                let _ = stream.write_all(&response);
                return;
            }
            for byte in response {
                if stream.write_all(&[byte]).and_then(|_| stream.flush()).is_err() {
                    return;
                }
                std::thread::sleep(pause);
            }
        });
        endpoint
    }

    fn http_ok(body: &str) -> Vec<u8> {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .into_bytes()
    }

    #[test]
    fn trickling_editor_is_cut_off_at_the_budget() {
        let envelope = json!({"content": [{"type": "text", "text": "done"}], "isError": false}).to_string();
        let endpoint = serve_once(http_ok(&envelope), Duration::from_millis(60));

        let started = std::time::Instant::now();
        let err = HttpEditorClient
            .call(&endpoint, "unity.scene.getActive", &Map::new(), 300)
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(err.is_connectivity(), "{err}");
        assert!(elapsed < Duration::from_secs(2), "call ran {elapsed:?} against a 300 ms budget");
    }

    #[test]
    fn oversized_envelope_is_read_in_full() {
        let big = "x".repeat(11 * 1024 * 1024);
        let envelope = json!({"content": [{"type": "text", "text": big}], "isError": false}).to_string();
        let endpoint = serve_once(http_ok(&envelope), Duration::ZERO);

        let out = HttpEditorClient
            .call(&endpoint, "unity.scene.list", &Map::new(), 30_000)
            .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.first_text().map(str::len), Some(11 * 1024 * 1024));
    }

    #[test]
    fn non_json_body_is_malformed_not_unreachable() {
        let endpoint = serve_once(http_ok("<html>proxy</html>"), Duration::ZERO);
        let err = HttpEditorClient.health(&endpoint, 5_000).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedResponse { .. }), "{err}");
        assert!(!err.is_connectivity());
    }

    struct TreeOnly(Value);

    impl EditorTransport for TreeOnly {
        fn health(&self, _: &str, _: u64) -> Result<HealthReport, BridgeError> {
            unreachable!()
        }
        fn list_tools(&self, _: &str, _: u64) -> Result<Vec<Value>, BridgeError> {
            unreachable!()
        }
        fn call(&self, _: &str, name: &str, args: &Map<String, Value>, _: u64) -> Result<ToolOutput, BridgeError> {
            assert_eq!(name, SCENE_LIST_OPERATION);
            assert_eq!(args["maxDepth"], 7);
            Ok(ToolOutput::text(self.0.to_string(), false))
        }
    }

    #[test]
    fn tree_fetch_parses_first_text_item() {
        let t = TreeOnly(json!({"rootObjects": [{"name": "Main Camera"}]}));
        let snap = fetch_tree(&t, "http://localhost:5051", 7, 1_000).unwrap();
        assert_eq!(snap.roots[0].path, "Main Camera");
        assert_eq!(snap.max_depth, Some(7));
    }

    #[test]
    fn tree_fetch_rejects_non_tree_payload() {
        let t = TreeOnly(json!({"status": "ok"}));
        assert!(matches!(
            fetch_tree(&t, "http://localhost:5051", 7, 1_000),
            Err(BridgeError::MalformedResponse { .. })
        ));
    }
}
