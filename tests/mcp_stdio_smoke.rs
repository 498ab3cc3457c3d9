use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Stdio};

use serde_json::{json, Value};

/// Minimal stand-in for the editor's HTTP bridge: one request per connection.
fn spawn_fake_editor() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake editor");
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let _ = handle(stream);
        }
    });
    port
}

fn handle(mut stream: TcpStream) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((k, v)) = header.split_once(':') {
            if k.eq_ignore_ascii_case("content-length") {
                content_length = v.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");
    let reply = route(method, path, &body);

    let payload = reply.to_string();
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    )?;
    stream.flush()
}

fn text(v: Value) -> Value {
    json!({"content": [{"type": "text", "text": v.to_string()}], "isError": false})
}

fn route(method: &str, path: &str, body: &[u8]) -> Value {
    match (method, path) {
        ("GET", "/health") => json!({"status": "ok", "projectName": "SmokeProject", "version": "2022.3.10f1"}),
        ("GET", "/tools") => json!({"tools": [
            {
                "name": "unity.gameObject.destroy",
                "description": "Destroy a GameObject.",
                "inputSchema": {
                    "type": "object",
                    "properties": {"gameObjectPath": {"type": "string"}},
                    "required": ["gameObjectPath"]
                }
            },
            {"name": "unity.scene.getActive", "description": "Active scene info."}
        ]}),
        ("POST", "/tools/call") => {
            let req: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
            let name = req["name"].as_str().unwrap_or("");
            match name {
                "unity.scene.list" => text(json!({"rootObjects": [
                    {"name": "Player"},
                    {"name": "Team", "children": [{"name": "Player"}]}
                ]})),
                _ => text(json!({"ok": true, "name": name, "arguments": req["arguments"]})),
            }
        }
        _ => json!({"error": {"message": format!("no route {method} {path}"), "code": 404}}),
    }
}

fn call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}

fn result_json(v: &Value) -> Value {
    let text = v["result"]["content"][0]["text"].as_str().expect("text content");
    serde_json::from_str(text).expect("json text")
}

#[test]
fn mcp_stdio_smoke() {
    // `cargo test` sets this for integration tests.
    let bin = env!("CARGO_BIN_EXE_unity-mcp-bridge");
    let port = spawn_fake_editor();
    let scratch = tempfile::tempdir().unwrap();

    let mut child = Command::new(bin)
        .arg("mcp")
        .env("UNITY_MCP_URL", format!("http://127.0.0.1:{port}"))
        .env("UNITY_MCP_CONFIG", scratch.path().join("absent.json"))
        .env("UNITY_MCP_RUNTIME_FILE", scratch.path().join("runtime.json"))
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn unity-mcp-bridge mcp");

    let messages = vec![
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": { "protocolVersion": "2024-11-05" }
        }),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        call(3, "unity.gameObject.destroy", json!({"gameObjectPath": "Player"})),
        call(4, "unity.gameObject.destroy", json!({"gameObjectPath": "Player", "__confirm": true})),
        call(5, "unity.gameObject.destroy", json!({"gameObjectPath": "Team/Player", "__confirm": true})),
        call(6, "bridge.ping", json!({})),
    ];

    {
        let stdin = child.stdin.as_mut().expect("child stdin");
        // Keep each JSON-RPC message on one line (server reads by lines()).
        for m in &messages {
            writeln!(stdin, "{m}").unwrap();
        }
    }

    // Close stdin so the server loop can exit.
    drop(child.stdin.take());

    let stdout = child.stdout.take().expect("child stdout");
    let reader = BufReader::new(stdout);

    let mut replies_by_id: HashMap<i64, Value> = HashMap::new();
    for line in reader.lines() {
        let line = line.expect("read stdout line");
        if line.trim().is_empty() {
            continue;
        }
        let v: Value = serde_json::from_str(&line).expect("stdout is json");
        let id = v.get("id").and_then(|x| x.as_i64()).expect("json-rpc response id");
        replies_by_id.insert(id, v);
    }

    let status = child.wait().expect("wait child");
    assert!(status.success(), "mcp process should exit cleanly");
    assert_eq!(replies_by_id.len(), 6, "notification must not be answered");

    // initialize
    {
        let v = &replies_by_id[&1];
        assert_eq!(v["jsonrpc"], "2.0");
        assert_eq!(v["result"]["serverInfo"]["name"], "unity-mcp-bridge");
    }

    // tools/list merges local and editor tools
    {
        let tools = replies_by_id[&2]["result"]["tools"].as_array().expect("tools array");
        let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        for required in ["bridge.status", "bridge.ping", "unity.gameObject.destroy", "unity.scene.getActive"] {
            assert!(names.contains(&required), "missing tool: {required}");
        }
        let destroy = tools.iter().find(|t| t["name"] == "unity.gameObject.destroy").unwrap();
        assert!(destroy["inputSchema"]["properties"]["__confirm"].is_object());
    }

    // unconfirmed destroy is held back
    {
        let v = &replies_by_id[&3];
        assert_eq!(v["result"]["isError"], true);
        assert_eq!(result_json(v)["error"], "confirmation_required");
    }

    // confirmed but ambiguous
    {
        let v = &replies_by_id[&4];
        let body = result_json(v);
        assert_eq!(body["error"], "ambiguous_target");
        assert_eq!(body["matchesFound"], 2);
    }

    // exact path goes through with reserved keys stripped
    {
        let v = &replies_by_id[&5];
        assert_eq!(v["result"]["isError"], false);
        let body = result_json(v);
        assert_eq!(body["name"], "unity.gameObject.destroy");
        assert_eq!(body["arguments"]["gameObjectPath"], "Team/Player");
        assert!(body["arguments"].get("__confirm").is_none());
    }

    // local ping reaches the editor's health endpoint
    {
        let body = result_json(&replies_by_id[&6]);
        assert_eq!(body["ok"], true);
        assert_eq!(body["health"]["projectName"], "SmokeProject");
    }
}
