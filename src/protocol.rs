//! JSON-RPC 2.0 wire types for the probe.
//!
//! The target service speaks line-delimited JSON-RPC over stdio: one JSON
//! object per line on stdin, one per line on stdout. Tool invocations use the
//! MCP convention of a generic `tools/call` method with the tool name and
//! arguments nested in `params`.

use serde::{Deserialize, Deserializer, Serialize};

/// Protocol version tag carried by every request and echoed by responses.
pub const JSONRPC_VERSION: &str = "2.0";

// ─── JSON-RPC 2.0 ───────────────────────────────────────────────────────────

/// JSON-RPC 2.0 request message.
///
/// Field order matches the wire shape
/// `{"jsonrpc":"2.0","method":…,"params":…,"id":…}` so serialized requests
/// read the same as the protocol documentation. `params` is always an object,
/// never omitted; the target expects an empty map rather than a missing key.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request.
    pub fn new(id: u64, method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response message (success or error).
///
/// `result` is any JSON value, null included, so an explicit `result: null`
/// is kept as `Some(Value::Null)` rather than folded into "absent". Only a
/// missing member deserializes to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub result: Option<serde_json::Value>,
    pub error: Option<JsonRpcError>,
}

/// Keep an explicit JSON null as a present value; `#[serde(default)]` covers
/// the missing-member case.
fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    /// Check the response against the result/error exclusivity rule.
    ///
    /// A conforming response carries the `"2.0"` version tag and exactly one
    /// of `result` / `error`. Returns a human-readable description of the
    /// first violation found, or `None` for a well-formed response.
    pub fn shape_violation(&self) -> Option<String> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Some(format!("unexpected version tag '{}'", self.jsonrpc));
        }
        match (&self.result, &self.error) {
            (Some(_), Some(_)) => Some("both result and error present".to_string()),
            (None, None) => Some("neither result nor error present".to_string()),
            _ => None,
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

// ─── Tool Calls ──────────────────────────────────────────────────────────────

/// Generic method name under which tool invocations travel.
pub const TOOLS_CALL_METHOD: &str = "tools/call";

/// A tool invocation: the operation name and its argument object.
///
/// Framed inside a request as `params = {"name": …, "arguments": …}` under
/// the `tools/call` method.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a tool call. `arguments` should be a JSON object; tools taking
    /// no arguments get an empty map.
    pub fn new(name: &str, arguments: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            arguments,
        }
    }

    /// Frame this call as a complete JSON-RPC request with the given id.
    pub fn request(&self, id: u64) -> JsonRpcRequest {
        let params = serde_json::json!({
            "name": self.name,
            "arguments": self.arguments,
        });
        JsonRpcRequest::new(id, TOOLS_CALL_METHOD, params)
    }
}

// ─── Standard Error Codes ────────────────────────────────────────────────────

/// Well-known JSON-RPC error codes, used to annotate error responses in the
/// report.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist or is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Short label for a well-known code, if it is one.
    pub fn label(code: i32) -> Option<&'static str> {
        match code {
            PARSE_ERROR => Some("parse error"),
            INVALID_REQUEST => Some("invalid request"),
            METHOD_NOT_FOUND => Some("method not found"),
            INVALID_PARAMS => Some("invalid params"),
            INTERNAL_ERROR => Some("internal error"),
            _ => None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
