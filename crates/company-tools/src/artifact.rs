use crate::tool::{json_success, str_arg, Tool, ToolDescriptor};
use async_trait::async_trait;
use company_core::{CompanyError, CompanyResult, ToolCall, ToolResult};
use company_security::{Capability, ConfinedRoot};
use std::path::Path;
use tracing::{info, warn};

const MAX_WRITE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Writes text artifacts under the artifacts root.
pub struct WriteArtifactTool {
    descriptor: ToolDescriptor,
    root: ConfinedRoot,
}

impl WriteArtifactTool {
    /// Tool name.
    pub const NAME: &'static str = "write_artifact";

    /// Writes are confined to `artifacts_root`.
    pub fn new(artifacts_root: impl AsRef<Path>) -> Self {
        let root = ConfinedRoot::new(artifacts_root.as_ref());
        Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Write a text artifact safely under the artifacts directory."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "relative_path": {
                            "type": "string",
                            "description": "Path under the artifacts directory, e.g. finance/cost_estimate.md"
                        },
                        "content": {
                            "type": "string",
                            "description": "Text content to write"
                        }
                    },
                    "required": ["relative_path", "content"]
                }),
                required_capabilities: vec![Capability::FileWrite {
                    allowed_paths: vec![root.root().display().to_string()],
                }],
            },
            root,
        }
    }
}

#[async_trait]
impl Tool for WriteArtifactTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let relative_path = str_arg(&call, "relative_path");
        let content = call.arguments["content"].as_str().unwrap_or_default();

        if content.len() > MAX_WRITE_SIZE {
            return Ok(ToolResult::error_payload(
                &call.id,
                format!(
                    "Content too large: {} bytes (max: {MAX_WRITE_SIZE} bytes)",
                    content.len()
                ),
                serde_json::json!({"relative_path": relative_path}),
            ));
        }

        let target = match self.root.resolve(relative_path) {
            Ok(target) => target,
            Err(e @ (CompanyError::PathTraversal(_) | CompanyError::Validation(_))) => {
                warn!(relative_path, "Artifact write rejected");
                return Ok(ToolResult::error_payload(
                    &call.id,
                    e.to_string(),
                    serde_json::json!({"relative_path": relative_path}),
                ));
            }
            Err(e) => return Err(e),
        };

        if let Some(parent) = target.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return Ok(ToolResult::error_payload(
                    &call.id,
                    format!("Failed to create directory '{}': {e}", parent.display()),
                    serde_json::json!({"relative_path": relative_path}),
                ));
            }
        }

        if let Err(e) = tokio::fs::write(&target, content).await {
            return Ok(ToolResult::error_payload(
                &call.id,
                format!("Failed to write artifact: {e}"),
                serde_json::json!({"relative_path": relative_path}),
            ));
        }

        info!(path = %target.display(), bytes = content.len(), "Artifact written");
        json_success(
            &call.id,
            &serde_json::json!({
                "path": target.display().to_string(),
                "bytes_written": content.len(),
            }),
        )
    }
}
