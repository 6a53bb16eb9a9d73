//! JSON-RPC 2.0 messages, one JSON document per line.
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"tools/call","params":{...}}\n
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::rpc_codes;

pub const JSONRPC_VERSION: &str = "2.0";

/// Longest accepted input line.
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Raw incoming message before classification.
#[derive(Debug, Deserialize)]
struct RawMessage {
    jsonrpc: Option<String>,
    /// Absent for notifications. `Some(Value::Null)` is a request with null id.
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

// Distinguish `"id": null` from a missing id.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A decoded line.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Request {
        id: Value,
        method: String,
        params: Value,
    },
    Notification {
        method: String,
    },
    /// A reply to something the server never sends; dropped.
    Response,
    /// Malformed input, with the error reply to send.
    Invalid(JsonRpcResponse),
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn error(&self) -> Option<&JsonRpcError> {
        self.error.as_ref()
    }

    /// Single-line encoding.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"encoding failed: {}"}}}}"#,
                rpc_codes::INTERNAL_ERROR,
                e.to_string().replace('"', "'")
            )
        })
    }
}

/// Classify one input line.
pub fn decode(line: &str) -> Incoming {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            return Incoming::Invalid(JsonRpcResponse::failure(
                Value::Null,
                rpc_codes::PARSE_ERROR,
                format!("Parse error: {}", e),
            ))
        }
    };
    if !value.is_object() {
        return Incoming::Invalid(JsonRpcResponse::failure(
            Value::Null,
            rpc_codes::INVALID_REQUEST,
            "Invalid request: expected a JSON object",
        ));
    }

    let raw: RawMessage = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            return Incoming::Invalid(JsonRpcResponse::failure(
                Value::Null,
                rpc_codes::INVALID_REQUEST,
                format!("Invalid request: {}", e),
            ))
        }
    };

    if raw.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
        return Incoming::Invalid(JsonRpcResponse::failure(
            raw.id.unwrap_or(Value::Null),
            rpc_codes::INVALID_REQUEST,
            "Invalid request: jsonrpc must be \"2.0\"",
        ));
    }

    match (raw.id, raw.method) {
        (Some(id), Some(method)) => Incoming::Request {
            id,
            method,
            params: raw.params.unwrap_or(Value::Null),
        },
        (None, Some(method)) => Incoming::Notification { method },
        (Some(_), None) => Incoming::Response,
        (None, None) => Incoming::Invalid(JsonRpcResponse::failure(
            Value::Null,
            rpc_codes::INVALID_REQUEST,
            "Invalid request: missing method",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn error_code(incoming: Incoming) -> i64 {
        match incoming {
            Incoming::Invalid(response) => response.error().unwrap().code,
            other => panic!("expected invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_request() {
        let incoming = decode(r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#);
        assert_eq!(
            incoming,
            Incoming::Request {
                id: json!(7),
                method: "ping".to_string(),
                params: Value::Null,
            }
        );
    }

    #[test]
    fn test_null_id_is_request() {
        let incoming = decode(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#);
        assert!(matches!(incoming, Incoming::Request { id: Value::Null, .. }));
    }

    #[test]
    fn test_notification() {
        let incoming = decode(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
        assert_eq!(
            incoming,
            Incoming::Notification {
                method: "notifications/initialized".to_string()
            }
        );
    }

    #[test]
    fn test_client_response_dropped() {
        assert_eq!(decode(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#), Incoming::Response);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code(decode("{not json")), rpc_codes::PARSE_ERROR);
        assert_eq!(error_code(decode("[1,2]")), rpc_codes::INVALID_REQUEST);
        assert_eq!(
            error_code(decode(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#)),
            rpc_codes::INVALID_REQUEST
        );
        assert_eq!(
            error_code(decode(r#"{"jsonrpc":"2.0","method":42}"#)),
            rpc_codes::INVALID_REQUEST
        );
    }

    #[test]
    fn test_response_encoding() {
        let ok = JsonRpcResponse::success(json!(1), json!({}));
        assert_eq!(ok.encode(), r#"{"jsonrpc":"2.0","id":1,"result":{}}"#);

        let err = JsonRpcResponse::failure(json!("a"), rpc_codes::METHOD_NOT_FOUND, "nope");
        assert_eq!(
            err.encode(),
            r#"{"jsonrpc":"2.0","id":"a","error":{"code":-32601,"message":"nope"}}"#
        );
    }
}
