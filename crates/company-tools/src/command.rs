use crate::tool::{json_success, str_arg, Tool, ToolDescriptor};
use async_trait::async_trait;
use company_core::{CompanyResult, ToolCall, ToolResult};
use company_security::Capability;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Hard ceiling for a per-call `timeout_secs` override.
pub const MAX_COMMAND_TIMEOUT_SECS: u64 = 300;

const DANGEROUS_PATTERNS: &[&str] = &["rm -rf /", "mkfs", "dd if=", ":(){ :|:& };:"];

/// Runs a shell command in the repository root and reports exit code and output.
///
/// Backs both `run_tests` and `run_lint`; the two differ only in name and
/// description so agents can be bound to one without the other.
pub struct CommandTool {
    descriptor: ToolDescriptor,
    working_dir: PathBuf,
    default_timeout_secs: u64,
}

impl CommandTool {
    /// Tool name of the test runner.
    pub const RUN_TESTS: &'static str = "run_tests";
    /// Tool name of the linter.
    pub const RUN_LINT: &'static str = "run_lint";

    /// `run_tests`, executed in `repo_root`.
    pub fn run_tests(repo_root: impl AsRef<Path>, default_timeout_secs: u64) -> Self {
        Self::new(
            Self::RUN_TESTS,
            "Run a local test command and return stdout/stderr/exit code.",
            repo_root.as_ref(),
            default_timeout_secs,
        )
    }

    /// `run_lint`, executed in `repo_root`.
    pub fn run_lint(repo_root: impl AsRef<Path>, default_timeout_secs: u64) -> Self {
        Self::new(
            Self::RUN_LINT,
            "Run a local lint command and return stdout/stderr/exit code.",
            repo_root.as_ref(),
            default_timeout_secs,
        )
    }

    fn new(name: &str, description: &str, repo_root: &Path, default_timeout_secs: u64) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: name.to_string(),
                description: description.to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "command": {
                            "type": "string",
                            "description": "Shell command to execute"
                        },
                        "timeout_secs": {
                            "type": "integer",
                            "description": format!(
                                "Timeout in seconds (default: {default_timeout_secs}, max: {MAX_COMMAND_TIMEOUT_SECS})"
                            )
                        }
                    },
                    "required": ["command"]
                }),
                required_capabilities: vec![Capability::ShellExec {
                    allowed_commands: vec![repo_root.display().to_string()],
                }],
            },
            working_dir: repo_root.to_path_buf(),
            default_timeout_secs: default_timeout_secs.min(MAX_COMMAND_TIMEOUT_SECS),
        }
    }
}

#[async_trait]
impl Tool for CommandTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let command = str_arg(&call, "command").to_string();
        if command.is_empty() {
            return Ok(ToolResult::error_payload(
                &call.id,
                "command cannot be empty",
                serde_json::Value::Null,
            ));
        }

        let timeout_secs = call.arguments["timeout_secs"]
            .as_u64()
            .unwrap_or(self.default_timeout_secs)
            .clamp(1, MAX_COMMAND_TIMEOUT_SECS);

        if let Some(pattern) = DANGEROUS_PATTERNS.iter().find(|p| command.contains(*p)) {
            warn!(command = %command, "Blocked dangerous command");
            return Ok(ToolResult::error_payload(
                &call.id,
                format!("Command blocked: contains dangerous pattern '{pattern}'"),
                serde_json::json!({"command": command}),
            ));
        }

        info!(
            tool = %self.descriptor.name,
            command = %command,
            timeout = timeout_secs,
            "Executing command"
        );

        let result = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            tokio::process::Command::new("sh")
                .arg("-c")
                .arg(&command)
                .current_dir(&self.working_dir)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => json_success(
                &call.id,
                &serde_json::json!({
                    "command": command,
                    "exit_code": output.status.code().unwrap_or(-1),
                    "stdout": truncate_output(&String::from_utf8_lossy(&output.stdout), 50_000),
                    "stderr": truncate_output(&String::from_utf8_lossy(&output.stderr), 10_000),
                }),
            ),
            Ok(Err(e)) => Ok(ToolResult::error_payload(
                &call.id,
                format!("Failed to execute command: {e}"),
                serde_json::json!({"command": command}),
            )),
            Err(_) => {
                warn!(command = %command, timeout = timeout_secs, "Command timed out");
                Ok(ToolResult::error_payload(
                    &call.id,
                    format!("Command timed out after {timeout_secs}s"),
                    serde_json::json!({"command": command, "timeout_secs": timeout_secs}),
                ))
            }
        }
    }
}

fn truncate_output(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... [truncated, {} total bytes]", &s[..cut], s.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_runs_in_repo_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "present").unwrap();
        let tool = CommandTool::run_tests(dir.path(), 30);

        let call = ToolCall::new("t1", "run_tests", json!({"command": "cat marker.txt"}));
        let result = tool.execute(call).await.unwrap();
        assert!(!result.is_error);
        let payload: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(payload["exit_code"], 0);
        assert_eq!(payload["stdout"], "present");
        assert_eq!(payload["command"], "cat marker.txt");
    }

    #[tokio::test]
    async fn test_failing_command_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let tool = CommandTool::run_lint(dir.path(), 30);
        let call = ToolCall::new("t2", "run_lint", json!({"command": "echo bad >&2; exit 3"}));
        let result = tool.execute(call).await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(payload["exit_code"], 3);
        assert_eq!(payload["stderr"], "bad\n");
    }

    #[tokio::test]
    async fn test_timeout_is_error_payload() {
        let dir = tempfile::tempdir().unwrap();
        let tool = CommandTool::run_tests(dir.path(), 30);
        let args = json!({"command": "sleep 10", "timeout_secs": 1});
        let call = ToolCall::new("t3", "run_tests", args);
        let result = tool.execute(call).await.unwrap();
        assert!(result.is_error);
        let payload: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert!(payload["error"].as_str().unwrap().contains("timed out"));
        assert_eq!(payload["timeout_secs"], 1);
    }

    #[tokio::test]
    async fn test_blocks_dangerous() {
        let dir = tempfile::tempdir().unwrap();
        let tool = CommandTool::run_tests(dir.path(), 30);
        let call = ToolCall::new("t4", "run_tests", json!({"command": "rm -rf /"}));
        let result = tool.execute(call).await.unwrap();
        assert!(result.is_error);
        assert!(result.content.contains("blocked"));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let s = "ééééé";
        let out = truncate_output(s, 3);
        assert!(out.starts_with('é'));
        assert!(out.contains("truncated"));
    }
}
