//! Tool metadata: name, description, schemas and behaviour hints.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Value};

use crate::schema::Schema;
use crate::types::{Error, Result};

/// Behaviour hints advertised to clients. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub read_only_hint: bool,
    pub destructive_hint: bool,
    pub idempotent_hint: bool,
    pub open_world_hint: bool,
}

impl ToolAnnotations {
    /// Read-only, idempotent, local computation.
    pub fn local(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            read_only_hint: true,
            destructive_hint: false,
            idempotent_hint: true,
            open_world_hint: false,
        }
    }

    /// Read-only call to the upstream API.
    pub fn remote(title: &str) -> Self {
        Self {
            open_world_hint: true,
            ..Self::local(title)
        }
    }
}

/// Complete description of one tool.
#[derive(Debug)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Schema,
    pub output_schema: Option<Schema>,
    pub annotations: ToolAnnotations,
}

impl ToolDescriptor {
    /// Descriptor with the input schema generated from `I`.
    pub fn new<I: JsonSchema>(
        name: &str,
        description: &str,
        annotations: ToolAnnotations,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: Schema::for_type::<I>()?,
            output_schema: None,
            annotations,
        })
    }

    /// Declare the structured output shape as the schema of `O`.
    pub fn with_output<O: JsonSchema>(mut self) -> Result<Self> {
        self.output_schema = Some(Schema::for_type::<O>()?);
        Ok(self)
    }

    /// Entry of a `tools/list` response.
    pub fn listing(&self) -> Value {
        let mut entry = json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema.document(),
            "annotations": self.annotations,
        });
        if let Some(title) = &self.annotations.title {
            entry["title"] = json!(title);
        }
        if let Some(output) = &self.output_schema {
            entry["outputSchema"] = output.document().clone();
        }
        entry
    }
}
