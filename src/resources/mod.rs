//! Ephemeral resources: large tool outputs handed back by URI.

mod store;
mod sweeper;

pub use store::{temp_uri, Resource, ResourceData, ResourceStore, TEMP_URI_PREFIX};
pub use sweeper::{ResourceSweeper, SweepStats};
