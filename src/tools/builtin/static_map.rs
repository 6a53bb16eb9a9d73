//! `static_map_image_tool`: rendered map images.

use async_trait::async_trait;
use bytes::Bytes;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::common::Coordinate;
use crate::http::HttpRequest;
use crate::resources::{temp_uri, ResourceData};
use crate::tools::{
    parse_input, ContentBlock, Tool, ToolAnnotations, ToolContext, ToolDescriptor, ToolOutput,
};
use crate::types::{ResourceId, Result};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StaticMapInput {
    #[serde(flatten)]
    pub center: Coordinate,
    #[schemars(range(min = 0.0, max = 22.0))]
    pub zoom: f64,
    #[serde(default = "default_size")]
    #[schemars(range(min = 1, max = 1280))]
    pub width: u32,
    #[serde(default = "default_size")]
    #[schemars(range(min = 1, max = 1280))]
    pub height: u32,
    /// `owner/style_id` of the map style.
    #[serde(default = "default_style")]
    #[schemars(regex(pattern = r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$"))]
    pub style: String,
}

fn default_size() -> u32 {
    600
}

fn default_style() -> String {
    "mapbox/streets-v12".to_string()
}

/// Renders a map image centred on a point.
#[derive(Debug)]
pub struct StaticMapTool {
    descriptor: ToolDescriptor,
}

impl StaticMapTool {
    pub fn new() -> Result<Self> {
        let descriptor = ToolDescriptor::new::<StaticMapInput>(
            "static_map_image_tool",
            "Render a static map image centred on a coordinate.",
            ToolAnnotations::remote("Static map image"),
        )?;
        Ok(Self { descriptor })
    }
}

#[async_trait]
impl Tool for StaticMapTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let args: StaticMapInput = parse_input(input)?;
        let path = format!(
            "styles/v1/{}/static/{},{}/{}x{}",
            args.style,
            args.center.path_segment(),
            args.zoom,
            args.width,
            args.height
        );
        let response = ctx.fetch(HttpRequest::get(ctx.api_url(&path)?)).await?;
        let mime_type = response
            .content_type()
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or("image/png")
            .to_string();
        let caption = format!(
            "Static map of {} at zoom {} ({}x{}, {})",
            args.center.path_segment(),
            args.zoom,
            args.width,
            args.height,
            args.style
        );

        if response.body.len() <= ctx.inline_limit_bytes {
            return Ok(ToolOutput::text(caption).with_block(ContentBlock::image(&response.body, mime_type)));
        }

        let id = ResourceId::new();
        let uri = temp_uri(id.as_str());
        let size = response.body.len();
        ctx.resources.create(
            id.as_str(),
            uri.clone(),
            ResourceData::Binary {
                bytes: Bytes::clone(&response.body),
                mime_type,
            },
            Some(json!({"tool": self.descriptor.name, "description": caption})),
            None,
        );
        tracing::info!(uri = %uri, size, "tool_output_stored_as_resource");
        Ok(ToolOutput::text(format!(
            "{}. Image is {} bytes; stored as {}.",
            caption, size, uri
        )))
    }
}
