//! JSON-RPC 2.0 wire types for the stdio MCP transport.
//!
//! Messages are newline-delimited JSON objects. Anything on stdout that is
//! not a response to one of our requests (log chatter, server-initiated
//! requests and notifications) is skipped.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

/// MCP protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const JSONRPC_VERSION: &str = "2.0";

pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl<'a> JsonRpcRequest<'a> {
    pub const fn new(id: u64, method: &'a str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// A request without an id; no response is expected.
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<'a> {
    jsonrpc: &'static str,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl<'a> JsonRpcNotification<'a> {
    pub const fn new(method: &'a str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Value,
    /// `Some(Value::Null)` for an explicit `"result": null`.
    #[serde(default, deserialize_with = "present")]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    /// Numeric correlation id. Providers occasionally echo it as a string.
    pub fn correlation_id(&self) -> Option<u64> {
        match &self.id {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Parse one stdout line into a response.
///
/// Returns `None` for blank lines, non-JSON output, messages carrying a
/// `method` (requests or notifications from the provider) and objects with
/// neither `result` nor `error`.
pub fn parse_line(line: &str) -> Option<JsonRpcResponse> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => {
            debug!(line = trimmed, "skipping non-JSON provider output");
            return None;
        }
    };

    let object = value.as_object()?;
    if object.contains_key("method") {
        debug!(line = trimmed, "ignoring provider-initiated message");
        return None;
    }
    if !object.contains_key("result") && !object.contains_key("error") {
        debug!(line = trimmed, "ignoring message without result or error");
        return None;
    }

    serde_json::from_value(value).ok()
}

/// Per-session correlation id allocator. The first id is `1`.
#[derive(Debug)]
pub struct RequestIds {
    next: u64,
}

impl RequestIds {
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    pub const fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters of the `initialize` request.
pub fn initialize_params() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": "provisio",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Parameters of a `tools/call` request. `null` arguments become `{}`.
pub fn tool_call_params(name: &str, arguments: &Value) -> Value {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments.clone()
    };
    json!({ "name": name, "arguments": arguments })
}

/// Text of the first `text` content item of a tool result.
pub fn first_text(result: &Value) -> Option<&str> {
    result
        .get("content")?
        .as_array()?
        .iter()
        .find_map(|item| item.get("text").and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new(1, methods::INITIALIZE, Some(initialize_params()));
        let value: Value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 1);
        assert_eq!(value["method"], "initialize");
        assert_eq!(value["params"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[test]
    fn test_notification_has_no_id() {
        let value = serde_json::to_value(JsonRpcNotification::new(methods::INITIALIZED, None)).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("params").is_none());
    }

    #[test]
    fn test_parse_response_and_string_id() {
        let response = parse_line(r#"{"jsonrpc":"2.0","id":"2","result":{"tools":[]}}"#).unwrap();
        assert_eq!(response.correlation_id(), Some(2));
        assert!(response.result.is_some());
    }

    #[test]
    fn test_null_result_is_present() {
        let response = parse_line(r#"{"jsonrpc":"2.0","id":2,"result":null}"#).unwrap();
        assert_eq!(response.result, Some(Value::Null));

        let response = parse_line(r#"{"jsonrpc":"2.0","id":2,"error":{"message":"x"}}"#).unwrap();
        assert_eq!(response.result, None);
    }

    #[test]
    fn test_parse_error_response() {
        let response =
            parse_line(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"nope"}}"#).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.to_string(), "nope (code -32601)");
    }

    #[test]
    fn test_skips_noise() {
        assert!(parse_line("").is_none());
        assert!(parse_line("Server listening on stdio").is_none());
        assert!(parse_line(r#"{"jsonrpc":"2.0","method":"notifications/message","params":{}}"#).is_none());
        assert!(parse_line(r#"{"id":1}"#).is_none());
        assert!(parse_line("[1,2]").is_none());
    }

    #[test]
    fn test_ids_increment_from_one() {
        let mut ids = RequestIds::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_tool_call_params_defaults_arguments() {
        let params = tool_call_params("get_weather", &Value::Null);
        assert_eq!(params, json!({"name": "get_weather", "arguments": {}}));
    }

    #[test]
    fn test_first_text() {
        let result = json!({"content": [{"type": "image"}, {"type": "text", "text": "boom"}]});
        assert_eq!(first_text(&result), Some("boom"));
        assert_eq!(first_text(&json!({})), None);
    }
}
