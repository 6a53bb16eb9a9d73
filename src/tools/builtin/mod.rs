//! Built-in geospatial tools.

use std::sync::Arc;

use super::Tool;
use crate::types::Result;

mod common;
mod directions;
mod distance;
mod geocode;
mod isochrone;
mod resource_reader;
mod reverse_geocode;
mod static_map;
mod version;

pub use common::{Coordinate, FeatureCollection};
pub use directions::{DirectionsTool, RoutingProfile};
pub use distance::{haversine_km, DistanceTool, DistanceUnits};
pub use geocode::GeocodeTool;
pub use isochrone::{IsochroneProfile, IsochroneTool};
pub use resource_reader::ResourceReaderTool;
pub use reverse_geocode::ReverseGeocodeTool;
pub use static_map::StaticMapTool;
pub use version::VersionTool;

/// One instance of every built-in tool.
pub fn all() -> Result<Vec<Arc<dyn Tool>>> {
    Ok(vec![
        Arc::new(VersionTool::new()?),
        Arc::new(DistanceTool::new()?),
        Arc::new(GeocodeTool::new()?),
        Arc::new(ReverseGeocodeTool::new()?),
        Arc::new(DirectionsTool::new()?),
        Arc::new(IsochroneTool::new()?),
        Arc::new(StaticMapTool::new()?),
        Arc::new(ResourceReaderTool::new()?),
    ])
}
