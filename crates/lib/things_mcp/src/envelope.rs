//! Uniform tool response.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use things_core::ExecutionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text".into(),
            text: text.into(),
        }
    }
}

/// The one response shape for both success and failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub is_error: bool,
    pub content: Vec<TextContent>,
}

impl ResponseEnvelope {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            content: vec![TextContent::new(text)],
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![TextContent::new(message)],
        }
    }

    /// Error envelope carrying only the headline message of `err`.
    pub fn from_error(err: &ExecutionError) -> Self {
        Self::error(err.to_string())
    }

    /// Text of the first content block.
    pub fn text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or_default()
    }
}

impl From<ResponseEnvelope> for CallToolResult {
    fn from(envelope: ResponseEnvelope) -> Self {
        let content = envelope
            .content
            .into_iter()
            .map(|c| Content::text(c.text))
            .collect();
        if envelope.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_with_is_error_flag() {
        let value = serde_json::to_value(ResponseEnvelope::success("done")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "isError": false,
                "content": [{ "type": "text", "text": "done" }]
            })
        );
    }

    #[test]
    fn error_envelope_uses_headline_only() {
        let err = ExecutionError::ScriptFailure {
            script: "get-inbox".into(),
            detail: "raw stderr with /private/paths".into(),
        };
        let envelope = ResponseEnvelope::from_error(&err);
        assert!(envelope.is_error);
        assert_eq!(envelope.text(), "Script execution failed: get-inbox");
    }

    #[test]
    fn converts_into_call_tool_result() {
        let result: CallToolResult = ResponseEnvelope::error("nope").into();
        assert_eq!(result.is_error, Some(true));
        let text = result.content.first().and_then(|c| c.raw.as_text()).map(|t| t.text.clone());
        assert_eq!(text.as_deref(), Some("nope"));
    }
}
