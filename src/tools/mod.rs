//! Tools: contract, output checking, registry and the built-in set.

pub mod builtin;
pub(crate) mod context;
mod contract;
mod descriptor;
mod registry;
mod result;
mod sanitize;

pub use context::ToolContext;
pub use contract::{assemble, invoke, parse_input, Checked, Tool};
pub use descriptor::{ToolAnnotations, ToolDescriptor};
pub use registry::ToolRegistry;
pub use result::{ContentBlock, ToolOutput, ToolResult};
pub use sanitize::{check_output, sanitize};
