//! Output checking: structured payloads that fail the declared output
//! schema are downgraded to plain text instead of failing the call.

use serde_json::Value;

use super::contract::{assemble, Checked};
use super::result::ToolResult;
use crate::schema::Schema;

/// Check a structured payload against the tool's output schema.
pub fn check_output(tool: &str, structured: Option<Value>, schema: Option<&Schema>) -> Checked {
    let Some(payload) = structured else {
        return Checked::Validated(None);
    };
    let Some(schema) = schema else {
        return Checked::Validated(Some(payload));
    };

    match schema.parse(&payload) {
        Ok(coerced) => Checked::Validated(Some(coerced)),
        Err(violation) => {
            tracing::warn!(tool, error = %violation, "output_schema_mismatch");
            Checked::Degraded {
                raw_text: pretty(&payload),
                reason: violation.to_string(),
            }
        }
    }
}

/// Re-check an already assembled result.
///
/// Errors, results without structured content and tools without an output
/// schema pass through unchanged. On mismatch the tool's own content is
/// kept and only `structuredContent` is dropped; the raw dump is used only
/// when the tool produced no content.
pub fn sanitize(tool: &str, result: ToolResult, schema: Option<&Schema>) -> ToolResult {
    if result.is_error() || result.structured_content().is_none() || schema.is_none() {
        return result;
    }
    let (content, structured) = result.into_parts();
    assemble(content, check_output(tool, structured, schema))
}

pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
