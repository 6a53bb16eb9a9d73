//! Identification stage: stamps every request with the build identity.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, USER_AGENT};

use super::pipeline::{HttpResult, Next, Policy};
use super::HttpRequest;
use crate::types::BuildInfo;

/// Sets `User-Agent` from [`BuildInfo`] unless the caller already set one.
#[derive(Debug, Clone)]
pub struct UserAgentPolicy {
    value: HeaderValue,
}

impl UserAgentPolicy {
    pub fn new(build: &BuildInfo) -> Self {
        let value = HeaderValue::from_str(&build.user_agent()).unwrap_or_else(|e| {
            tracing::warn!("user_agent_invalid: {}, falling back to package name", e);
            HeaderValue::from_static(env!("CARGO_PKG_NAME"))
        });
        Self { value }
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }
}

#[async_trait]
impl Policy for UserAgentPolicy {
    fn name(&self) -> &'static str {
        "user_agent"
    }

    async fn handle(&self, mut request: HttpRequest, next: Next<'_>) -> HttpResult {
        if !request.headers.contains_key(USER_AGENT) {
            request.headers.insert(USER_AGENT, self.value.clone());
        }
        next.run(request).await
    }
}
