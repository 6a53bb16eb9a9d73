//! `resource_reader_tool`: reads back stored results by URI.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::resources::ResourceData;
use crate::tools::{
    parse_input, ContentBlock, Tool, ToolAnnotations, ToolContext, ToolDescriptor, ToolOutput,
};
use crate::types::Result;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResourceReaderInput {
    /// URI returned by an earlier tool call.
    #[schemars(length(min = 1))]
    pub uri: String,
}

/// Reads a temporary resource for clients without `resources/read` support.
#[derive(Debug)]
pub struct ResourceReaderTool {
    descriptor: ToolDescriptor,
}

impl ResourceReaderTool {
    pub fn new() -> Result<Self> {
        let descriptor = ToolDescriptor::new::<ResourceReaderInput>(
            "resource_reader_tool",
            "Read a temporary resource created by another tool, by URI.",
            ToolAnnotations::local("Read resource"),
        )?;
        Ok(Self { descriptor })
    }
}

#[async_trait]
impl Tool for ResourceReaderTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let args: ResourceReaderInput = parse_input(input)?;
        // A miss is an answer, not a failure.
        let Some(resource) = ctx.resources.get(&args.uri) else {
            return Ok(ToolOutput::text(format!(
                "Resource {} was not found or has expired.",
                args.uri
            )));
        };

        let output = match resource.data {
            ResourceData::Json(value) => ToolOutput::text(serde_json::to_string_pretty(&value)?),
            ResourceData::Text { text, .. } => ToolOutput::text(text),
            ResourceData::Binary { bytes, mime_type } if mime_type.starts_with("image/") => {
                ToolOutput::default().with_block(ContentBlock::image(&bytes, mime_type))
            }
            ResourceData::Binary { bytes, mime_type } => ToolOutput::text(format!(
                "Binary resource ({}, {} bytes); use resources/read to fetch it.",
                mime_type,
                bytes.len()
            )),
        };
        Ok(output)
    }
}
