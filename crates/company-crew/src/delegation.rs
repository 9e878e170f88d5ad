use crate::agent::AgentSpec;
use crate::executor::AgentRuntime;
use async_trait::async_trait;
use company_core::{CompanyResult, ToolCall, ToolResult};
use company_tools::{Tool, ToolDescriptor};
use std::sync::Arc;
use tracing::{info, warn};

/// Lets an agent with `allow_delegation` hand a sub-task to a coworker in
/// the same crew. The coworker runs synchronously with its own tools and
/// cannot delegate further.
pub struct DelegateWorkTool {
    descriptor: ToolDescriptor,
    coworkers: Vec<AgentSpec>,
    runtime: Arc<AgentRuntime>,
}

impl DelegateWorkTool {
    /// Tool name.
    pub const NAME: &'static str = "delegate_work";

    pub(crate) fn new(coworkers: Vec<AgentSpec>, runtime: Arc<AgentRuntime>) -> Self {
        let roles: Vec<&str> = coworkers.iter().map(|c| c.role.as_str()).collect();
        Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: format!(
                    "Delegate a specific task to one of the following coworkers: {}. \
                     Provide all necessary context; \
                     the coworker knows nothing else about the task.",
                    roles.join(", ")
                ),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "coworker": {
                            "type": "string",
                            "enum": roles,
                            "description": "Role of the coworker to delegate to"
                        },
                        "task": {
                            "type": "string",
                            "description": "The task to delegate"
                        },
                        "context": {
                            "type": "string",
                            "description": "Everything the coworker needs to know"
                        }
                    },
                    "required": ["coworker", "task"]
                }),
                required_capabilities: vec![],
            },
            coworkers,
            runtime,
        }
    }

    fn find(&self, name: &str) -> Option<&AgentSpec> {
        let wanted = name.trim().trim_matches('"').to_lowercase();
        self.coworkers
            .iter()
            .find(|c| c.role.to_lowercase() == wanted || c.key == wanted)
    }
}

#[async_trait]
impl Tool for DelegateWorkTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let coworker_name = call.arguments["coworker"].as_str().unwrap_or_default();
        let task = call.arguments["task"].as_str().unwrap_or_default().trim();
        let context = call.arguments["context"].as_str().unwrap_or_default().trim();

        if task.is_empty() {
            return Ok(ToolResult::error_payload(
                &call.id,
                "task cannot be empty",
                serde_json::Value::Null,
            ));
        }

        let Some(coworker) = self.find(coworker_name) else {
            let available: Vec<&str> = self.coworkers.iter().map(|c| c.role.as_str()).collect();
            return Ok(ToolResult::error_payload(
                &call.id,
                format!("Unknown coworker '{coworker_name}'"),
                serde_json::json!({"available": available}),
            ));
        };

        let mut prompt = task.to_string();
        if !context.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(context);
        }

        info!(coworker = %coworker.role, "Delegating work");
        match self
            .runtime
            .run_agent(coworker, &prompt, self.runtime.registry.clone(), &coworker.tools)
            .await
        {
            Ok(answer) => Ok(ToolResult::success(&call.id, answer)),
            Err(e) => {
                warn!(coworker = %coworker.role, error = %e, "Delegated work failed");
                Ok(ToolResult::error_payload(
                    &call.id,
                    format!("Delegation to '{}' failed: {e}", coworker.role),
                    serde_json::Value::Null,
                ))
            }
        }
    }
}
