//! MCP JSON-RPC integration tests.
//!
//! These tests spawn `agronomy --mcp` as a child process and communicate
//! via stdin/stdout using newline-delimited JSON-RPC (rmcp's stdio transport).

#![cfg(all(feature = "cli", feature = "mcp"))]

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

fn agronomy_binary() -> String {
    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("target");
    path.push("debug");
    path.push("agronomy");
    path.to_string_lossy().into_owned()
}

fn send_jsonrpc(stdin: &mut impl Write, msg: &Value) {
    let body = serde_json::to_string(msg).unwrap();
    writeln!(stdin, "{body}").unwrap();
    stdin.flush().unwrap();
}

fn read_jsonrpc_line(reader: &mut BufReader<impl std::io::Read>) -> Option<Value> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return read_jsonrpc_line(reader); // skip blank lines
            }
            serde_json::from_str(trimmed).ok()
        }
        Err(_) => None,
    }
}

/// Spawn the MCP server, send requests, collect responses.
fn mcp_session(requests: Vec<Value>) -> Vec<Value> {
    let bin = agronomy_binary();
    let mut child = Command::new(&bin)
        .arg("--mcp")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to spawn {bin}: {e}"));

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let mut reader = BufReader::new(stdout);

    let mut responses = Vec::new();
    for req in &requests {
        send_jsonrpc(&mut stdin, req);
        // Only read a response for requests with an "id" (not notifications)
        if req.get("id").is_some() {
            if let Some(resp) = read_jsonrpc_line(&mut reader) {
                responses.push(resp);
            }
        }
    }

    drop(stdin);
    let _ = child.wait();
    responses
}

fn initialize() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "0.1.0"}
        }
    })
}

fn initialized() -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    })
}

/// Initialize, call one tool as request id 2, return its response.
fn call_tool(name: &str, arguments: Value) -> Value {
    let responses = mcp_session(vec![
        initialize(),
        initialized(),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    ]);
    responses
        .into_iter()
        .find(|r| r["id"] == 2)
        .expect("no response for tools/call")
}

fn tool_text(resp: &Value) -> Value {
    let content = &resp["result"]["content"][0];
    assert_eq!(content["type"], "text");
    serde_json::from_str(content["text"].as_str().unwrap()).unwrap()
}

#[test]
fn mcp_initialize_returns_server_info() {
    let responses = mcp_session(vec![initialize()]);

    assert!(!responses.is_empty(), "No response received");
    let resp = &responses[0];
    assert_eq!(resp["jsonrpc"], "2.0");
    assert_eq!(resp["id"], 1);
    let result = &resp["result"];
    assert!(result.get("serverInfo").is_some());
    assert_eq!(result["serverInfo"]["name"], "agronomy");
}

#[test]
fn mcp_tools_list_has_all_tools() {
    let responses = mcp_session(vec![
        initialize(),
        initialized(),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/list",
            "params": {}
        }),
    ]);

    assert!(responses.len() >= 2, "Expected at least 2 responses, got {}", responses.len());
    let tools_resp = responses.iter().find(|r| r["id"] == 2).unwrap();
    let tools = tools_resp["result"]["tools"].as_array().unwrap();

    let tool_names: Vec<&str> = tools
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    let expected = [
        "recommend_crop",
        "recommend_fertilizer",
        "analyze_soil",
        "price_outlook",
        "classify",
        "weather_code",
        "table",
    ];

    for name in &expected {
        assert!(
            tool_names.contains(name),
            "Missing tool: {name}. Found: {tool_names:?}"
        );
    }
    assert_eq!(tool_names.len(), 7, "Expected 7 tools, got {}", tool_names.len());
}

#[test]
fn mcp_tools_call_recommend_crop() {
    let resp = call_tool(
        "recommend_crop",
        json!({"records": [{
            "nitrogen": 80, "phosphorous": 48, "potassium": 40,
            "temperature": 24, "humidity": 82, "ph": 6.4, "rainfall": 236
        }]}),
    );
    let parsed = tool_text(&resp);
    assert_eq!(parsed[0]["_crop"], "Rice");
    assert!(parsed[0]["_distance"].is_number());
}

#[test]
fn mcp_tools_call_recommend_fertilizer() {
    let resp = call_tool(
        "recommend_fertilizer",
        json!({"records": [{
            "nitrogen": 37, "phosphorous": 0, "potassium": 0,
            "temperature": 26, "humidity": 52, "moisture": 38,
            "soilType": "Sandy", "cropType": "Maize"
        }]}),
    );
    let parsed = tool_text(&resp);
    assert_eq!(parsed[0]["_fertilizer"], "Urea");
}

#[test]
fn mcp_tools_call_price_outlook() {
    let resp = call_tool("price_outlook", json!({"crop": "cotton"}));
    let parsed = tool_text(&resp);
    assert_eq!(parsed["crop"], "Cotton");
    assert_eq!(parsed["trend"], "+10%");
}

#[test]
fn mcp_tools_call_weather_code() {
    let resp = call_tool("weather_code", json!({"code": 63}));
    let parsed = tool_text(&resp);
    assert_eq!(parsed["description"], "Moderate rain");
}

#[test]
fn mcp_classify_rejects_invalid_table() {
    let resp = call_tool(
        "classify",
        json!({
            "records": [{"x": 1}],
            "table": {"name": "broken", "centroids": []}
        }),
    );
    assert!(resp.get("error").is_some(), "expected error, got {resp}");
}
