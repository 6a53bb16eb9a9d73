//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use reqwest::StatusCode;
use thiserror::Error;

use crate::http::HttpError;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the geo-mcp server.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation errors (map to JSON-RPC INVALID_PARAMS).
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource or tool not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// JSON-RPC method the server does not implement.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Upstream API answered with a non-success status.
    #[error("upstream API returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// Outbound request failed after the retry budget was spent.
    #[error("request failed: {0}")]
    Transport(#[from] HttpError),

    /// Missing or inconsistent configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors (map to JSON-RPC INTERNAL_ERROR).
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON-RPC 2.0 error codes used by the server.
pub mod rpc_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    /// MCP extension: `resources/read` on an unknown URI.
    pub const RESOURCE_NOT_FOUND: i64 = -32002;
}

impl Error {
    /// Convert to a JSON-RPC error code.
    pub fn to_rpc_code(&self) -> i64 {
        match self {
            Error::Validation(_) | Error::Serialization(_) => rpc_codes::INVALID_PARAMS,
            Error::NotFound(_) => rpc_codes::RESOURCE_NOT_FOUND,
            Error::MethodNotFound(_) => rpc_codes::METHOD_NOT_FOUND,
            Error::Upstream { .. }
            | Error::Transport(_)
            | Error::Config(_)
            | Error::Internal(_)
            | Error::Io(_) => rpc_codes::INTERNAL_ERROR,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound(method.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
