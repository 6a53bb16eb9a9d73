//! Tool registry: lookup by name, listing, and enable/disable filtering.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::builtin;
use super::contract::{invoke, Tool};
use super::context::ToolContext;
use super::result::ToolResult;
use crate::types::{Error, Result, ToolFilterConfig};

/// Registered tools keyed by name.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    entries: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for tool in builtin::all()? {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.descriptor().name.clone();
        if self.entries.contains_key(&name) {
            return Err(Error::validation(format!("Tool already registered: {}", name)));
        }
        self.entries.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.entries.get(name)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Tool names, sorted.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// `tools/list` entries, sorted by name.
    pub fn listing(&self) -> Vec<Value> {
        let mut tools: Vec<&Arc<dyn Tool>> = self.entries.values().collect();
        tools.sort_by(|a, b| a.descriptor().name.cmp(&b.descriptor().name));
        tools.iter().map(|t| t.descriptor().listing()).collect()
    }

    /// Apply an allowlist, then a denylist. Unknown names are logged and ignored.
    pub fn filtered(&self, filter: &ToolFilterConfig) -> Self {
        let mentioned = filter
            .enabled
            .iter()
            .flatten()
            .chain(filter.disabled.iter());
        for name in mentioned {
            if !self.has_tool(name) {
                tracing::warn!(tool = %name, "tool_filter_unknown_name");
            }
        }

        let entries = self
            .entries
            .iter()
            .filter(|(name, _)| {
                filter
                    .enabled
                    .as_ref()
                    .map_or(true, |enabled| enabled.iter().any(|e| e == *name))
            })
            .filter(|(name, _)| !filter.disabled.iter().any(|d| d == *name))
            .map(|(name, tool)| (name.clone(), tool.clone()))
            .collect();
        Self { entries }
    }

    /// Invoke a tool by name. Unknown names yield an error result.
    pub async fn call(&self, name: &str, arguments: Value, ctx: &ToolContext) -> ToolResult {
        match self.entries.get(name) {
            Some(tool) => invoke(tool.as_ref(), arguments, ctx).await,
            None => ToolResult::error(format!("Unknown tool: {}", name)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
