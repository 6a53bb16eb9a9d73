//! # geo-mcp - Geospatial MCP tool server
//!
//! Exposes geocoding, routing, isochrone and map-rendering tools to MCP
//! clients over stdio:
//! - Outbound request pipeline (identification, retry with backoff, tracing)
//! - Schema-checked tool contract with output downgrade on schema drift
//! - TTL-bounded store for results too large to return inline
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!  stdin lines →  │ McpServer ─▶ ToolRegistry ─▶ invoke(tool)    │  → stdout
//!                 │                  │              │            │
//!                 │           ResourceStore   HttpPipeline ──────┼─▶ upstream API
//!                 │                  ▲                           │
//!                 │           ResourceSweeper (periodic)         │
//!                 └──────────────────────────────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod http;
pub mod resources;
pub mod schema;
pub mod server;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
