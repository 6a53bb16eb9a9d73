//! `isochrone_tool`: reachable areas within given travel times.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{Coordinate, FeatureCollection};
use crate::http::HttpRequest;
use crate::tools::{parse_input, Tool, ToolAnnotations, ToolContext, ToolDescriptor, ToolOutput};
use crate::types::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IsochroneProfile {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl IsochroneProfile {
    fn as_path(self) -> &'static str {
        match self {
            IsochroneProfile::Driving => "driving",
            IsochroneProfile::Walking => "walking",
            IsochroneProfile::Cycling => "cycling",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IsochroneInput {
    #[serde(flatten)]
    pub origin: Coordinate,
    #[serde(default)]
    pub profile: IsochroneProfile,
    /// Travel times, in minutes, for each contour (1 to 60).
    #[schemars(length(min = 1, max = 4), inner(range(min = 1, max = 60)))]
    pub contours_minutes: Vec<u32>,
    /// Return filled polygons rather than lines.
    #[serde(default = "default_polygons")]
    pub polygons: bool,
}

fn default_polygons() -> bool {
    true
}

/// Area reachable within the given travel times.
#[derive(Debug)]
pub struct IsochroneTool {
    descriptor: ToolDescriptor,
}

impl IsochroneTool {
    pub fn new() -> Result<Self> {
        let descriptor = ToolDescriptor::new::<IsochroneInput>(
            "isochrone_tool",
            "Compute the areas reachable from a point within 1 to 4 travel times \
             (minutes), as GeoJSON contours.",
            ToolAnnotations::remote("Isochrone"),
        )?
        .with_output::<FeatureCollection>()?;
        Ok(Self { descriptor })
    }
}

#[async_trait]
impl Tool for IsochroneTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let args: IsochroneInput = parse_input(input)?;
        let minutes: Vec<String> = args.contours_minutes.iter().map(u32::to_string).collect();
        let path = format!(
            "isochrone/v1/mapbox/{}/{}",
            args.profile.as_path(),
            args.origin.path_segment()
        );
        let request = HttpRequest::get(ctx.api_url(&path)?)
            .with_query("contours_minutes", &minutes.join(","))
            .with_query("polygons", &args.polygons.to_string());

        let body = ctx.fetch_json(request).await?;
        ctx.inline_or_store(&self.descriptor.name, body, |uri| {
            serde_json::json!({"type": "FeatureCollection", "features": [], "resource_uri": uri})
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::tools::context::testing::{context, ScriptedTransport};
    use crate::tools::invoke;
    use reqwest::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_request_shape() {
        let body = json!({"type": "FeatureCollection", "features": [{"type": "Feature"}]});
        let transport = ScriptedTransport::new(vec![Ok(HttpResponse::new(
            StatusCode::OK,
            body.to_string(),
        ))]);
        let ctx = context(transport.clone(), Some("pk.test"));
        let tool = IsochroneTool::new().unwrap();

        let result = invoke(
            &tool,
            json!({"longitude": 21.0, "latitude": 52.2, "contours_minutes": [5, 10]}),
            &ctx,
        )
        .await;

        assert!(!result.is_error(), "{}", result.text());
        let url = transport.last_url();
        assert_eq!(url.path(), "/isochrone/v1/mapbox/driving/21,52.2");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("contours_minutes".into(), "5,10".into())));
        assert!(query.contains(&("polygons".into(), "true".into())));
    }

    #[tokio::test]
    async fn test_too_many_contours_rejected() {
        let transport = ScriptedTransport::new(Vec::new());
        let ctx = context(transport.clone(), Some("pk.test"));
        let tool = IsochroneTool::new().unwrap();

        let result = invoke(
            &tool,
            json!({"longitude": 0.0, "latitude": 0.0, "contours_minutes": [1, 2, 3, 4, 5]}),
            &ctx,
        )
        .await;

        assert!(result.is_error());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_contour_out_of_range_rejected_before_io() {
        let transport = ScriptedTransport::new(Vec::new());
        let ctx = context(transport.clone(), Some("pk.test"));
        let tool = IsochroneTool::new().unwrap();

        let result = invoke(
            &tool,
            json!({"longitude": 0.0, "latitude": 0.0, "contours_minutes": [10, 90, 0]}),
            &ctx,
        )
        .await;

        assert!(result.is_error());
        let text = result.text();
        assert!(text.starts_with("Invalid input for isochrone_tool"), "{}", text);
        assert!(text.contains("/contours_minutes/1"), "{}", text);
        assert!(text.contains("/contours_minutes/2"), "{}", text);
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_contour_bounds_in_schema() {
        let tool = IsochroneTool::new().unwrap();
        let items = &tool.descriptor().input_schema.document()["properties"]["contours_minutes"]["items"];
        assert_eq!(items["minimum"], 1.0);
        assert_eq!(items["maximum"], 60.0);
    }
}
