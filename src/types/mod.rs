//! Core types for the geo-mcp server.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (InvocationId, ResourceId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for the API, retry, resources and tools
//! - **Build**: Build identity used for client identification

mod build;
mod config;
mod errors;
mod ids;

pub use build::BuildInfo;
pub use config::{
    ApiConfig, Config, ObservabilityConfig, ResourceConfig, RetryConfig, ToolFilterConfig,
    ENV_ACCESS_TOKEN, ENV_API_ENDPOINT, ENV_DISABLE_TOOLS, ENV_ENABLE_TOOLS, ENV_LOG_FORMAT,
};
pub use errors::{rpc_codes, Error, Result};
pub use ids::{InvocationId, ResourceId};
