//! `search_and_geocode_tool`: forward geocoding.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::common::{default_forward_limit, Coordinate, FeatureCollection};
use crate::http::HttpRequest;
use crate::tools::{parse_input, Tool, ToolAnnotations, ToolContext, ToolDescriptor, ToolOutput};
use crate::types::Result;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GeocodeInput {
    /// Free-form search text: an address, place name or point of interest.
    #[schemars(length(min = 1, max = 256))]
    pub q: String,
    /// Maximum number of results.
    #[serde(default = "default_forward_limit")]
    #[schemars(range(min = 1, max = 10))]
    pub limit: u8,
    /// Bias results toward this position.
    #[serde(default)]
    pub proximity: Option<Coordinate>,
    /// Comma-separated ISO 3166 alpha-2 country codes.
    #[serde(default)]
    pub country: Option<String>,
    /// IETF language tag for result names.
    #[serde(default)]
    pub language: Option<String>,
}

/// Forward geocoding: text to coordinates.
#[derive(Debug)]
pub struct GeocodeTool {
    descriptor: ToolDescriptor,
}

impl GeocodeTool {
    pub fn new() -> Result<Self> {
        let descriptor = ToolDescriptor::new::<GeocodeInput>(
            "search_and_geocode_tool",
            "Search for places, addresses and points of interest by name and \
             return their coordinates as GeoJSON features.",
            ToolAnnotations::remote("Search and geocode"),
        )?
        .with_output::<FeatureCollection>()?;
        Ok(Self { descriptor })
    }
}

#[async_trait]
impl Tool for GeocodeTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let args: GeocodeInput = parse_input(input)?;
        let mut request = HttpRequest::get(ctx.api_url("search/geocode/v6/forward")?)
            .with_query("q", &args.q)
            .with_query("limit", &args.limit.to_string());
        if let Some(proximity) = args.proximity {
            request = request.with_query("proximity", &proximity.path_segment());
        }
        if let Some(country) = &args.country {
            request = request.with_query("country", country);
        }
        if let Some(language) = &args.language {
            request = request.with_query("language", language);
        }

        Ok(ToolOutput::structured(ctx.fetch_json(request).await?))
    }
}
