//! `version_tool`: build identity of the running server.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::tools::{Tool, ToolAnnotations, ToolContext, ToolDescriptor, ToolOutput};
use crate::types::{BuildInfo, Result};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VersionInput {}

/// Reports the server's build identity. No network access.
#[derive(Debug)]
pub struct VersionTool {
    descriptor: ToolDescriptor,
}

impl VersionTool {
    pub fn new() -> Result<Self> {
        let descriptor = ToolDescriptor::new::<VersionInput>(
            "version_tool",
            "Get the name, version and source revision of this server.",
            ToolAnnotations::local("Server version"),
        )?
        .with_output::<BuildInfo>()?;
        Ok(Self { descriptor })
    }
}

#[async_trait]
impl Tool for VersionTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let structured = serde_json::to_value(&ctx.build)?;
        Ok(ToolOutput::text(format!(
            "{} (revision {}, branch {})",
            ctx.build, ctx.build.revision, ctx.build.branch
        ))
        .with_structured(structured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::context::testing::{context, ScriptedTransport};
    use crate::tools::invoke;
    use serde_json::json;

    #[tokio::test]
    async fn test_reports_build() {
        let transport = ScriptedTransport::new(Vec::new());
        let ctx = context(transport.clone(), None);
        let tool = VersionTool::new().unwrap();

        let result = invoke(&tool, json!({}), &ctx).await;

        assert!(!result.is_error());
        let structured = result.structured_content().unwrap();
        assert_eq!(structured["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(structured["version"], env!("CARGO_PKG_VERSION"));
        assert!(result.text().contains(env!("CARGO_PKG_VERSION")));
        assert_eq!(transport.calls(), 0);
    }
}
