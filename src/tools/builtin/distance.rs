//! `distance_tool`: great-circle distance, computed locally.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::Coordinate;
use crate::tools::{parse_input, Tool, ToolAnnotations, ToolContext, ToolDescriptor, ToolOutput};
use crate::types::Result;

/// Mean Earth radius (IUGG), kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnits {
    #[default]
    Km,
    Mi,
    M,
}

impl DistanceUnits {
    fn from_km(self, km: f64) -> f64 {
        match self {
            DistanceUnits::Km => km,
            DistanceUnits::Mi => km / 1.609_344,
            DistanceUnits::M => km * 1000.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DistanceUnits::Km => "km",
            DistanceUnits::Mi => "mi",
            DistanceUnits::M => "m",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DistanceInput {
    pub from: Coordinate,
    pub to: Coordinate,
    #[serde(default)]
    pub units: DistanceUnits,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DistanceOutput {
    pub distance: f64,
    pub units: DistanceUnits,
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Straight-line distance between two points, computed locally.
#[derive(Debug)]
pub struct DistanceTool {
    descriptor: ToolDescriptor,
}

impl DistanceTool {
    pub fn new() -> Result<Self> {
        let descriptor = ToolDescriptor::new::<DistanceInput>(
            "distance_tool",
            "Calculate the great-circle distance between two coordinates. \
             Runs locally without calling the API.",
            ToolAnnotations::local("Distance between points"),
        )?
        .with_output::<DistanceOutput>()?;
        Ok(Self { descriptor })
    }
}

#[async_trait]
impl Tool for DistanceTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<ToolOutput> {
        let args: DistanceInput = parse_input(input)?;
        let distance = args.units.from_km(haversine_km(args.from, args.to));
        // Three decimals is millimetres in the smallest unit.
        let distance = (distance * 1000.0).round() / 1000.0;
        let output = DistanceOutput {
            distance,
            units: args.units,
        };
        Ok(
            ToolOutput::text(format!("{} {}", distance, args.units.label()))
                .with_structured(serde_json::to_value(output)?),
        )
    }
}
