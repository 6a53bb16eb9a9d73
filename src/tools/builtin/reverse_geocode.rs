//! `reverse_geocode_tool`: coordinates to place names.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::common::{default_reverse_limit, Coordinate, FeatureCollection};
use crate::http::HttpRequest;
use crate::tools::{parse_input, Tool, ToolAnnotations, ToolContext, ToolDescriptor, ToolOutput};
use crate::types::Result;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReverseGeocodeInput {
    #[serde(flatten)]
    pub position: Coordinate,
    #[serde(default = "default_reverse_limit")]
    #[schemars(range(min = 1, max = 5))]
    pub limit: u8,
    #[serde(default)]
    pub language: Option<String>,
}

/// Reverse geocoding: coordinates to addresses and places.
#[derive(Debug)]
pub struct ReverseGeocodeTool {
    descriptor: ToolDescriptor,
}

impl ReverseGeocodeTool {
    pub fn new() -> Result<Self> {
        let descriptor = ToolDescriptor::new::<ReverseGeocodeInput>(
            "reverse_geocode_tool",
            "Find the address or place at a longitude/latitude.",
            ToolAnnotations::remote("Reverse geocode"),
        )?
        .with_output::<FeatureCollection>()?;
        Ok(Self { descriptor })
    }
}

#[async_trait]
impl Tool for ReverseGeocodeTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let args: ReverseGeocodeInput = parse_input(input)?;
        let mut request = HttpRequest::get(ctx.api_url("search/geocode/v6/reverse")?)
            .with_query("longitude", &args.position.longitude.to_string())
            .with_query("latitude", &args.position.latitude.to_string())
            .with_query("limit", &args.limit.to_string());
        if let Some(language) = &args.language {
            request = request.with_query("language", language);
        }
        Ok(ToolOutput::structured(ctx.fetch_json(request).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpError, HttpResponse};
    use crate::tools::context::testing::{context, ScriptedTransport};
    use crate::tools::invoke;
    use reqwest::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_reverse_query() {
        let body = json!({"type": "FeatureCollection", "features": []});
        let transport = ScriptedTransport::new(vec![Ok(HttpResponse::new(
            StatusCode::OK,
            body.to_string(),
        ))]);
        let ctx = context(transport.clone(), Some("pk.test"));
        let tool = ReverseGeocodeTool::new().unwrap();

        let result = invoke(&tool, json!({"longitude": -73.99, "latitude": 40.73}), &ctx).await;

        assert!(!result.is_error(), "{}", result.text());
        assert_eq!(result.structured_content(), Some(&body));
        let url = transport.last_url();
        assert_eq!(url.path(), "/search/geocode/v6/reverse");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("longitude".into(), "-73.99".into())));
        assert!(query.contains(&("limit".into(), "1".into())));
    }

    #[tokio::test]
    async fn test_transport_failure_is_error_result() {
        let transport = ScriptedTransport::new(vec![Err(HttpError::transport("connection reset"))]);
        let ctx = context(transport, Some("pk.test"));
        let tool = ReverseGeocodeTool::new().unwrap();

        let result = invoke(&tool, json!({"longitude": 0.0, "latitude": 0.0}), &ctx).await;

        assert!(result.is_error());
        assert!(result.text().contains("connection reset"));
    }
}
