//! `directions_tool`: routes between 2 to 25 waypoints.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::Coordinate;
use crate::http::HttpRequest;
use crate::tools::{parse_input, Tool, ToolAnnotations, ToolContext, ToolDescriptor, ToolOutput};
use crate::types::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingProfile {
    #[default]
    DrivingTraffic,
    Driving,
    Walking,
    Cycling,
}

impl RoutingProfile {
    fn as_path(self) -> &'static str {
        match self {
            RoutingProfile::DrivingTraffic => "driving-traffic",
            RoutingProfile::Driving => "driving",
            RoutingProfile::Walking => "walking",
            RoutingProfile::Cycling => "cycling",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DirectionsInput {
    /// Waypoints in travel order.
    #[schemars(length(min = 2, max = 25))]
    pub coordinates: Vec<Coordinate>,
    #[serde(default)]
    pub profile: RoutingProfile,
    /// Ask for alternative routes.
    #[serde(default)]
    pub alternatives: bool,
}

/// Upstream `code` plus either inline routes or a resource reference.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DirectionsOutput {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoints: Option<Vec<Value>>,
    /// Set when the full response was stored as a resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_uri: Option<String>,
}

/// Route between waypoints. Large route geometry is returned by reference.
#[derive(Debug)]
pub struct DirectionsTool {
    descriptor: ToolDescriptor,
}

impl DirectionsTool {
    pub fn new() -> Result<Self> {
        let descriptor = ToolDescriptor::new::<DirectionsInput>(
            "directions_tool",
            "Get a route between 2 to 25 waypoints with distance, duration and \
             GeoJSON geometry. Large routes are stored as a temporary resource.",
            ToolAnnotations::remote("Directions"),
        )?
        .with_output::<DirectionsOutput>()?;
        Ok(Self { descriptor })
    }
}

#[async_trait]
impl Tool for DirectionsTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let args: DirectionsInput = parse_input(input)?;
        let waypoints: Vec<String> = args.coordinates.iter().map(Coordinate::path_segment).collect();
        let path = format!(
            "directions/v5/mapbox/{}/{}",
            args.profile.as_path(),
            waypoints.join(";")
        );
        let request = HttpRequest::get(ctx.api_url(&path)?)
            .with_query("geometries", "geojson")
            .with_query("overview", "full")
            .with_query("alternatives", &args.alternatives.to_string());

        let body = ctx.fetch_json(request).await?;
        let code = body
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        ctx.inline_or_store(&self.descriptor.name, body, |uri| {
            json!({"code": code, "resource_uri": uri})
        })
    }
}
