//! Argument and output shapes shared by several tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MIN_LONGITUDE: f64 = -180.0;
const MIN_LATITUDE: f64 = -90.0;

/// WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinate {
    /// Degrees east, -180 to 180.
    #[schemars(range(min = "MIN_LONGITUDE", max = 180.0))]
    pub longitude: f64,
    /// Degrees north, -90 to 90.
    #[schemars(range(min = "MIN_LATITUDE", max = 90.0))]
    pub latitude: f64,
}

impl Coordinate {
    /// `lon,lat` as used in upstream URL paths.
    pub fn path_segment(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

/// GeoJSON FeatureCollection. Extra members are allowed.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    #[schemars(regex(pattern = "^FeatureCollection$"))]
    pub kind: String,
    pub features: Vec<Value>,
}

/// Default `limit` for forward geocoding.
pub fn default_forward_limit() -> u8 {
    5
}

/// Default `limit` for reverse geocoding.
pub fn default_reverse_limit() -> u8 {
    1
}
