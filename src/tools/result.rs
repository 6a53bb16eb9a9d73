//! What a tool hands back to the caller.

use base64::Engine;
use serde::Serialize;
use serde_json::Value;

/// One block of human-readable output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        /// Base64 payload.
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// Image block from raw bytes.
    pub fn image(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        ContentBlock::Image {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Image { .. } => None,
        }
    }
}

/// Result of one tool invocation, as sent over the wire.
///
/// Constructors keep the two invariants: content is never empty, and an
/// error never carries structured content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    structured_content: Option<Value>,
    is_error: bool,
}

const EMPTY_OUTPUT: &str = "Tool completed with no output.";

impl ToolResult {
    /// Successful result without a structured payload.
    pub fn success(content: Vec<ContentBlock>) -> Self {
        Self {
            content: non_empty(content),
            structured_content: None,
            is_error: false,
        }
    }

    /// Successful result with a validated structured payload.
    pub fn structured(content: Vec<ContentBlock>, structured: Value) -> Self {
        Self {
            content: non_empty(content),
            structured_content: Some(structured),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(message)],
            structured_content: None,
            is_error: true,
        }
    }

    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    pub fn structured_content(&self) -> Option<&Value> {
        self.structured_content.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Concatenated text blocks, newline-separated.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_parts(self) -> (Vec<ContentBlock>, Option<Value>) {
        (self.content, self.structured_content)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn non_empty(content: Vec<ContentBlock>) -> Vec<ContentBlock> {
    if content.is_empty() {
        vec![ContentBlock::text(EMPTY_OUTPUT)]
    } else {
        content
    }
}

/// Raw output of a tool body, before output checking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub content: Vec<ContentBlock>,
    pub structured: Option<Value>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            structured: None,
        }
    }

    /// Structured payload only; a text rendering is added on assembly.
    pub fn structured(value: Value) -> Self {
        Self {
            content: Vec::new(),
            structured: Some(value),
        }
    }

    pub fn with_structured(mut self, value: Value) -> Self {
        self.structured = Some(value);
        self
    }

    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.content.push(block);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_error_wire_shape() {
        let result = ToolResult::error("boom");
        assert_eq!(
            result.to_value(),
            json!({"content": [{"type": "text", "text": "boom"}], "isError": true})
        );
    }

    #[test]
    fn test_structured_wire_shape() {
        let result = ToolResult::structured(vec![ContentBlock::text("{}")], json!({"a": 1}));
        assert_eq!(
            result.to_value(),
            json!({
                "content": [{"type": "text", "text": "{}"}],
                "structuredContent": {"a": 1},
                "isError": false
            })
        );
    }

    #[test]
    fn test_content_never_empty() {
        let result = ToolResult::success(Vec::new());
        assert_eq!(result.content().len(), 1);
        assert_eq!(result.text(), EMPTY_OUTPUT);
    }

    #[test]
    fn test_image_block() {
        let block = ContentBlock::image(b"png", "image/png");
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "image", "data": "cG5n", "mimeType": "image/png"})
        );
        assert!(block.as_text().is_none());
    }
}
