use crate::tool::{json_success, str_arg, Tool, ToolDescriptor};
use async_trait::async_trait;
use company_core::{CompanyError, CompanyResult, ToolCall, ToolResult};
use company_security::{Capability, ConfinedRoot};
use std::path::Path;
use tracing::{info, warn};

const MAX_READ_SIZE: u64 = 1024 * 1024; // 1MB

/// Paths the scaffolding writer refuses to touch, matched case-insensitively.
const BLOCKED_WRITE_PATTERNS: &[&str] = &[
    ".git/",
    ".ssh/",
    ".env",
    "credentials",
    "id_rsa",
    "id_ed25519",
];

fn file_capability_paths(root: &ConfinedRoot) -> Vec<String> {
    vec![root.root().display().to_string()]
}

fn rejected(call: &ToolCall, file_path: &str, e: CompanyError) -> CompanyResult<ToolResult> {
    match e {
        CompanyError::PathTraversal(_) | CompanyError::Validation(_) => {
            warn!(tool = %call.name, file_path, "Repository path rejected");
            Ok(ToolResult::error_payload(
                &call.id,
                e.to_string(),
                serde_json::json!({"file_path": file_path}),
            ))
        }
        other => Err(other),
    }
}

/// Reads text files under the repository root.
pub struct RepoReadTool {
    descriptor: ToolDescriptor,
    root: ConfinedRoot,
}

impl RepoReadTool {
    /// Tool name.
    pub const NAME: &'static str = "repo_read";

    /// Access is confined to `repo_root`.
    pub fn new(repo_root: impl AsRef<Path>) -> Self {
        let root = ConfinedRoot::new(repo_root.as_ref());
        Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Read a text file from the repository.".to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": {
                            "type": "string",
                            "description": "Repository-relative text file path"
                        }
                    },
                    "required": ["file_path"]
                }),
                required_capabilities: vec![Capability::FileRead {
                    allowed_paths: file_capability_paths(&root),
                }],
            },
            root,
        }
    }
}

#[async_trait]
impl Tool for RepoReadTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let file_path = str_arg(&call, "file_path");
        let target = match self.root.resolve(file_path) {
            Ok(target) => target,
            Err(e) => return rejected(&call, file_path, e),
        };

        let metadata = match tokio::fs::metadata(&target).await {
            Ok(m) if m.is_file() => m,
            _ => {
                return Ok(ToolResult::error_payload(
                    &call.id,
                    format!("File not found: {file_path}"),
                    serde_json::Value::Null,
                ));
            }
        };

        if metadata.len() > MAX_READ_SIZE {
            return Ok(ToolResult::error_payload(
                &call.id,
                format!(
                    "File too large: {} bytes (max: {MAX_READ_SIZE} bytes)",
                    metadata.len()
                ),
                serde_json::json!({"file_path": file_path}),
            ));
        }

        match tokio::fs::read_to_string(&target).await {
            Ok(content) => {
                info!(path = %target.display(), bytes = content.len(), "Repository file read");
                Ok(ToolResult::success(&call.id, content))
            }
            Err(e) => Ok(ToolResult::error_payload(
                &call.id,
                format!("Failed to read file: {e}"),
                serde_json::json!({"file_path": file_path}),
            )),
        }
    }
}

/// Writes scaffolding files under the repository root. Overwrites existing files.
pub struct RepoWriteTool {
    descriptor: ToolDescriptor,
    root: ConfinedRoot,
}

impl RepoWriteTool {
    /// Tool name.
    pub const NAME: &'static str = "repo_write";

    /// Access is confined to `repo_root`.
    pub fn new(repo_root: impl AsRef<Path>) -> Self {
        let root = ConfinedRoot::new(repo_root.as_ref());
        Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Write a text file in the repository.".to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": {
                            "type": "string",
                            "description": "Repository-relative text file path"
                        },
                        "content": {
                            "type": "string",
                            "description": "Content to write"
                        }
                    },
                    "required": ["file_path", "content"]
                }),
                required_capabilities: vec![Capability::FileWrite {
                    allowed_paths: file_capability_paths(&root),
                }],
            },
            root,
        }
    }
}

#[async_trait]
impl Tool for RepoWriteTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let file_path = str_arg(&call, "file_path");
        let content = call.arguments["content"].as_str().unwrap_or_default();

        let lowered = file_path.to_lowercase();
        if let Some(pattern) = BLOCKED_WRITE_PATTERNS.iter().find(|p| lowered.contains(*p)) {
            warn!(file_path, pattern, "Blocked repository write");
            return Ok(ToolResult::error_payload(
                &call.id,
                format!("Write blocked: path matches protected pattern '{pattern}'"),
                serde_json::json!({"file_path": file_path}),
            ));
        }

        let target = match self.root.resolve(file_path) {
            Ok(target) => target,
            Err(e) => return rejected(&call, file_path, e),
        };

        let written = match target.parent() {
            Some(parent) => tokio::fs::create_dir_all(parent).await,
            None => Ok(()),
        };
        if let Err(e) = written {
            return Ok(ToolResult::error_payload(
                &call.id,
                format!("Failed to create directory: {e}"),
                serde_json::json!({"file_path": file_path}),
            ));
        }
        if let Err(e) = tokio::fs::write(&target, content).await {
            return Ok(ToolResult::error_payload(
                &call.id,
                format!("Failed to write file: {e}"),
                serde_json::json!({"file_path": file_path}),
            ));
        }

        info!(path = %target.display(), bytes = content.len(), "Repository file written");
        json_success(
            &call.id,
            &serde_json::json!({
                "path": target.display().to_string(),
                "bytes_written": content.len(),
            }),
        )
    }
}
