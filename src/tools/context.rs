//! Shared handles passed to every tool invocation.

use reqwest::Url;
use serde_json::{json, Value};
use std::sync::Arc;

use super::result::{ContentBlock, ToolOutput};
use crate::http::{HttpPipeline, HttpRequest, HttpResponse};
use crate::resources::{temp_uri, ResourceData, ResourceStore};
use crate::types::{ApiConfig, BuildInfo, Error, ResourceId, Result, ENV_ACCESS_TOKEN};

/// Everything a tool body may touch.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub pipeline: Arc<HttpPipeline>,
    pub resources: Arc<ResourceStore>,
    pub api: ApiConfig,
    pub build: BuildInfo,
    /// Serialized payloads above this size are stored and returned by URI.
    pub inline_limit_bytes: usize,
}

impl ToolContext {
    /// Upstream URL for `path`, with the access token attached.
    ///
    /// Fails before any I/O when no token is configured.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        let token = self
            .api
            .access_token
            .as_deref()
            .ok_or_else(|| Error::config(format!("{} is not set", ENV_ACCESS_TOKEN)))?;
        let base = Url::parse(&self.api.endpoint)
            .map_err(|e| Error::config(format!("invalid API endpoint: {}", e)))?;
        let mut url = base
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::validation(format!("invalid request path '{}': {}", path, e)))?;
        url.query_pairs_mut().append_pair("access_token", token);
        Ok(url)
    }

    /// Dispatch through the pipeline; non-2xx becomes [`Error::Upstream`].
    pub async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = match request.timeout {
            Some(_) => request,
            None => request.with_timeout(self.api.request_timeout),
        };
        let response = self.pipeline.dispatch(request).await?;
        response.error_for_status()
    }

    pub async fn fetch_json(&self, request: HttpRequest) -> Result<Value> {
        self.fetch(request).await?.json()
    }

    /// Return `value` inline, or store it and return a reference when it
    /// exceeds the inline limit.
    ///
    /// `reference` builds the structured payload for the stored case from
    /// the resource URI.
    pub fn inline_or_store(
        &self,
        tool: &str,
        value: Value,
        reference: impl FnOnce(&str) -> Value,
    ) -> Result<ToolOutput> {
        let size = serde_json::to_vec(&value)?.len();
        if size <= self.inline_limit_bytes {
            return Ok(ToolOutput::structured(value));
        }

        let id = ResourceId::new();
        let uri = temp_uri(id.as_str());
        let resource = self.resources.create(
            id.as_str(),
            uri.clone(),
            ResourceData::Json(value),
            Some(json!({
                "tool": tool,
                "description": format!("Full {} result ({} bytes)", tool, size),
            })),
            None,
        );
        tracing::info!(tool, uri = %uri, size, "tool_output_stored_as_resource");

        let text = format!(
            "Result is {} bytes, above the inline limit; stored as {} until {}. \
             Read it with resource_reader_tool or resources/read.",
            size,
            uri,
            resource.expires_at().to_rfc3339()
        );
        Ok(ToolOutput {
            content: vec![ContentBlock::text(text)],
            structured: Some(reference(&uri)),
        })
    }
}
