//! The tool contract: validate input, execute, check output, assemble.
//!
//! ```text
//! Received ─▶ Validated ─▶ Executing ─▶ Succeeded ─▶ Sanitized
//!    │                         │
//!    └─▶ Rejected              └─▶ Failed
//! ```
//!
//! [`invoke`] never returns an error: every outcome is a [`ToolResult`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::Instrument;

use super::context::ToolContext;
use super::descriptor::ToolDescriptor;
use super::result::{ContentBlock, ToolOutput, ToolResult};
use super::sanitize::{check_output, pretty};
use crate::types::{InvocationId, Result};

/// A tool body. Input arrives already validated with defaults filled.
#[async_trait]
pub trait Tool: Send + Sync + fmt::Debug {
    fn descriptor(&self) -> &ToolDescriptor;

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput>;
}

/// Outcome of a schema check.
#[derive(Debug, Clone, PartialEq)]
pub enum Checked {
    /// Passed (or nothing to check). Holds the coerced payload, if any.
    Validated(Option<Value>),
    /// Output failed its schema; the raw payload survives as text.
    Degraded { raw_text: String, reason: String },
    /// Input failed its schema, or execution failed.
    Rejected { reason: String },
}

/// Build the final result. Total over every [`Checked`] variant.
pub fn assemble(content: Vec<ContentBlock>, checked: Checked) -> ToolResult {
    match checked {
        Checked::Validated(Some(value)) => {
            let content = if content.is_empty() {
                vec![ContentBlock::text(pretty(&value))]
            } else {
                content
            };
            ToolResult::structured(content, value)
        }
        Checked::Validated(None) => ToolResult::success(content),
        Checked::Degraded { raw_text, .. } => {
            let content = if content.is_empty() {
                vec![ContentBlock::text(raw_text)]
            } else {
                content
            };
            ToolResult::success(content)
        }
        Checked::Rejected { reason } => ToolResult::error(reason),
    }
}

/// Deserialize validated input into the tool's argument type.
pub fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T> {
    Ok(serde_json::from_value(input)?)
}

/// Run one invocation end to end.
pub async fn invoke(tool: &dyn Tool, raw_input: Value, ctx: &ToolContext) -> ToolResult {
    let descriptor = tool.descriptor();
    let invocation = InvocationId::new();
    let span = tracing::info_span!(
        "tool_invocation",
        tool = %descriptor.name,
        invocation = %invocation,
    );

    async move {
        tracing::debug!("tool_invocation_received");

        let input = match descriptor.input_schema.parse(&raw_input) {
            Ok(input) => input,
            Err(violation) => {
                tracing::info!(error = %violation, "tool_input_rejected");
                return assemble(
                    Vec::new(),
                    Checked::Rejected {
                        reason: format!("Invalid input for {}: {}", descriptor.name, violation),
                    },
                );
            }
        };

        tracing::debug!("tool_executing");
        let output = match tool.execute(input, ctx).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(error = %err, "tool_execution_failed");
                return assemble(
                    Vec::new(),
                    Checked::Rejected {
                        reason: format!("{} failed: {}", descriptor.name, err),
                    },
                );
            }
        };

        let checked = check_output(
            &descriptor.name,
            output.structured,
            descriptor.output_schema.as_ref(),
        );
        let degraded = matches!(checked, Checked::Degraded { .. });
        let result = assemble(output.content, checked);
        tracing::debug!(degraded, "tool_invocation_completed");
        result
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::context::testing::{context, ScriptedTransport};
    use crate::tools::descriptor::ToolAnnotations;
    use crate::types::Error;
    use pretty_assertions::assert_eq;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct SearchArgs {
        q: String,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct SearchOut {
        total: u32,
    }

    /// Counts features in a canned upstream response.
    #[derive(Debug)]
    struct CountTool {
        descriptor: ToolDescriptor,
        reply: Value,
    }

    impl CountTool {
        fn new(reply: Value) -> Self {
            Self {
                descriptor: ToolDescriptor::new::<SearchArgs>(
                    "count_tool",
                    "Count matches",
                    ToolAnnotations::remote("Count"),
                )
                .unwrap()
                .with_output::<SearchOut>()
                .unwrap(),
                reply,
            }
        }
    }

    #[async_trait]
    impl Tool for CountTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput> {
            let args: SearchArgs = parse_input(input)?;
            let url = ctx.api_url("search")?;
            let request = crate::http::HttpRequest::get(url).with_query("q", &args.q);
            let _ = ctx.fetch(request).await?;
            Ok(ToolOutput::structured(self.reply.clone()))
        }
    }

    fn ok_response() -> crate::http::HttpResult {
        Ok(crate::http::HttpResponse::new(reqwest::StatusCode::OK, "{}"))
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_calls() {
        let transport = ScriptedTransport::new(vec![ok_response()]);
        let ctx = context(transport.clone(), Some("t"));
        let tool = CountTool::new(json!({"total": 1}));

        let result = invoke(&tool, json!({}), &ctx).await;

        assert!(result.is_error());
        assert!(result.text().contains("\"q\""), "{}", result.text());
        assert!(result.structured_content().is_none());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_io() {
        let transport = ScriptedTransport::new(vec![ok_response()]);
        let ctx = context(transport.clone(), None);
        let tool = CountTool::new(json!({"total": 1}));

        let result = invoke(&tool, json!({"q": "x"}), &ctx).await;

        assert!(result.is_error());
        assert!(result.text().contains("MAPBOX_ACCESS_TOKEN"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_valid_output_is_structured() {
        let transport = ScriptedTransport::new(vec![ok_response()]);
        let ctx = context(transport.clone(), Some("t"));
        let tool = CountTool::new(json!({"total": 2}));

        let result = invoke(&tool, json!({"q": "x"}), &ctx).await;

        assert!(!result.is_error());
        assert_eq!(result.structured_content(), Some(&json!({"total": 2})));
        assert_eq!(result.text(), pretty(&json!({"total": 2})));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_output_degrades() {
        let transport = ScriptedTransport::new(vec![ok_response()]);
        let ctx = context(transport, Some("t"));
        let tool = CountTool::new(json!({"total": "two"}));

        let result = invoke(&tool, json!({"q": "x"}), &ctx).await;

        assert!(!result.is_error());
        assert!(result.structured_content().is_none());
        assert!(result.text().contains("\"two\""));
    }

    #[tokio::test]
    async fn test_upstream_error_is_error_result() {
        let transport = ScriptedTransport::new(vec![Ok(crate::http::HttpResponse::new(
            reqwest::StatusCode::UNAUTHORIZED,
            "Not Authorized - Invalid Token",
        ))]);
        let ctx = context(transport, Some("t"));
        let tool = CountTool::new(json!({"total": 1}));

        let result = invoke(&tool, json!({"q": "x"}), &ctx).await;

        assert!(result.is_error());
        assert!(result.text().contains("401"));
        assert!(result.text().contains("Invalid Token"));
    }

    #[test]
    fn test_assemble_is_total() {
        assert!(assemble(Vec::new(), Checked::Rejected { reason: "r".into() }).is_error());
        assert!(!assemble(Vec::new(), Checked::Validated(None)).is_error());
        let degraded = assemble(
            Vec::new(),
            Checked::Degraded {
                raw_text: "raw".into(),
                reason: "bad".into(),
            },
        );
        assert_eq!(degraded.text(), "raw");
    }

    #[test]
    fn test_parse_input_type_error() {
        let err = parse_input::<SearchArgs>(json!({"q": 1})).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
