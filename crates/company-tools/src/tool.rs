use async_trait::async_trait;
use company_core::{CompanyResult, ToolCall, ToolResult};
use company_security::Capability;
use serde::{Deserialize, Serialize};

/// Metadata describing a tool's interface and required permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name agents call.
    pub name: String,
    /// Shown to the model.
    pub description: String,
    /// JSON Schema of the arguments.
    pub parameters_schema: serde_json::Value,
    /// Capabilities a caller must hold.
    pub required_capabilities: Vec<Capability>,
}

/// Trait every tool an agent can call implements.
///
/// Expected failures (missing file, timeout, network error) are returned as
/// `Ok(ToolResult)` with `is_error` set; `Err` is reserved for failures the
/// caller must handle.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, schema and required capabilities.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Run the call. Expected failures come back as error payloads.
    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult>;
}

/// Read a string argument, trimmed. Missing or non-string yields `""`.
pub(crate) fn str_arg<'a>(call: &'a ToolCall, key: &str) -> &'a str {
    call.arguments[key].as_str().unwrap_or_default().trim()
}

/// Pretty-print a JSON value as a successful result.
pub(crate) fn json_success(call_id: &str, value: &serde_json::Value) -> CompanyResult<ToolResult> {
    Ok(ToolResult::success(call_id, serde_json::to_string_pretty(value)?))
}
