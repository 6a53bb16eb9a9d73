//! Configuration structures.
//!
//! Configuration is built from defaults, then overlaid with environment
//! variables and finally with command-line flags in the binary.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::{Error, Result};

/// Environment variable holding the upstream API access token.
pub const ENV_ACCESS_TOKEN: &str = "MAPBOX_ACCESS_TOKEN";
/// Environment variable overriding the upstream API base URL.
pub const ENV_API_ENDPOINT: &str = "MAPBOX_API_ENDPOINT";
/// Comma-separated allowlist of tool names.
pub const ENV_ENABLE_TOOLS: &str = "GEO_MCP_ENABLE_TOOLS";
/// Comma-separated denylist of tool names.
pub const ENV_DISABLE_TOOLS: &str = "GEO_MCP_DISABLE_TOOLS";
/// `json` switches log output to JSON lines.
pub const ENV_LOG_FORMAT: &str = "GEO_MCP_LOG_FORMAT";

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry stage configuration.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Ephemeral resource store configuration.
    #[serde(default)]
    pub resources: ResourceConfig,

    /// Tool enable/disable filtering.
    #[serde(default)]
    pub tools: ToolFilterConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values produced by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|t| !t.trim().is_empty()) {
            config.api.access_token = Some(token.trim().to_string());
        }
        if let Some(endpoint) = lookup(ENV_API_ENDPOINT).filter(|e| !e.trim().is_empty()) {
            config.api.endpoint = endpoint.trim().to_string();
        }
        if let Some(list) = lookup(ENV_ENABLE_TOOLS) {
            config.tools.enabled = Some(split_list(&list));
        }
        if let Some(list) = lookup(ENV_DISABLE_TOOLS) {
            config.tools.disabled = split_list(&list);
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.observability.json_logs = format.eq_ignore_ascii_case("json");
        }

        config
    }

    /// Reject configurations the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::config("retry.max_attempts must be at least 1"));
        }
        if self.retry.base_delay > self.retry.max_delay {
            return Err(Error::config(format!(
                "retry.base_delay ({:?}) exceeds retry.max_delay ({:?})",
                self.retry.base_delay, self.retry.max_delay
            )));
        }
        if self.resources.default_ttl.is_zero() {
            return Err(Error::config("resources.default_ttl must be positive"));
        }
        if self.resources.sweep_interval.is_zero() {
            return Err(Error::config("resources.sweep_interval must be positive"));
        }
        reqwest::Url::parse(&self.api.endpoint).map_err(|e| {
            Error::config(format!("api.endpoint '{}' is not a URL: {}", self.api.endpoint, e))
        })?;
        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Upstream API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every tool path is joined onto.
    pub endpoint: String,

    /// Access token appended to upstream requests.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Per-attempt request deadline.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mapbox.com/".to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Retry stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,

    /// Delay floor between attempts.
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,

    /// Delay ceiling between attempts.
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// HTTP statuses that trigger another attempt.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            retryable_statuses: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

/// Ephemeral resource store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Lifetime applied when a resource is created without an explicit TTL.
    #[serde(with = "humantime_serde")]
    pub default_ttl: Duration,

    /// How often the background sweep runs.
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,

    /// Serialized payloads above this size are returned by reference.
    pub inline_limit_bytes: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
            inline_limit_bytes: 64 * 1024,
        }
    }
}

/// Tool enable/disable filtering, applied before any invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolFilterConfig {
    /// When set, only these tools are exposed.
    #[serde(default)]
    pub enabled: Option<Vec<String>>,

    /// Tools never exposed, applied after `enabled`.
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
