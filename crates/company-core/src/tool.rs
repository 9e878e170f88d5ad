use serde::{Deserialize, Serialize};

/// A request from the LLM to invoke a specific tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the LLM for this call.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments to pass to the tool.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Build a call with a generated-by-caller id.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// The result returned after executing a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The ID of the [`ToolCall`] this result corresponds to.
    pub call_id: String,
    /// The textual output produced by the tool, usually JSON.
    pub content: String,
    /// Whether the tool execution ended in an error.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful tool result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates an error tool result with free-form content.
    pub fn error(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }

    /// Creates an error result carrying a structured `{"error": ..., ...context}` payload.
    ///
    /// `context` fields are merged next to `error` when it is a JSON object.
    pub fn error_payload(
        call_id: impl Into<String>,
        message: impl Into<String>,
        context: serde_json::Value,
    ) -> Self {
        let mut payload = serde_json::Map::new();
        payload.insert("error".to_string(), serde_json::Value::String(message.into()));
        if let serde_json::Value::Object(extra) = context {
            for (key, value) in extra {
                if key != "error" {
                    payload.insert(key, value);
                }
            }
        }
        Self::error(
            call_id,
            serde_json::to_string_pretty(&serde_json::Value::Object(payload))
                .unwrap_or_else(|_| "{\"error\": \"unserializable error payload\"}".to_string()),
        )
    }
}
