use crate::context::ContextWindow;
use crate::llm::{LlmClient, LlmResponse};
use company_core::{CompanyError, CompanyResult, Message, Role};
use company_security::{AuditLog, AuditOutcome, PermissionSet};
use company_tools::{ToolDescriptor, ToolRegistry};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

const DEFAULT_MAX_TURNS: u32 = 20;
const CONTEXT_MAX_MESSAGES: usize = 100;

/// The agentic loop for one agent invocation.
/// Prompt → LLM → ToolCall → execute tool → backfill → repeat.
///
/// The runner only advertises the tools it was bound to and only holds the
/// capabilities those tools declare, so a call to any other tool is denied by
/// the registry.
pub struct AgentRunner {
    llm: LlmClient,
    registry: Arc<ToolRegistry>,
    tools: Vec<ToolDescriptor>,
    permissions: PermissionSet,
    audit: Arc<AuditLog>,
    max_turns: u32,
    run_id: Uuid,
}

impl AgentRunner {
    /// Bind the runner to `tool_names`. Unknown names are a configuration error.
    pub fn new(
        llm: LlmClient,
        registry: Arc<ToolRegistry>,
        tool_names: &[String],
        audit: Arc<AuditLog>,
    ) -> CompanyResult<Self> {
        Ok(Self {
            tools: registry.descriptors_for(tool_names)?,
            permissions: registry.permissions_for(tool_names)?,
            llm,
            registry,
            audit,
            max_turns: DEFAULT_MAX_TURNS,
            run_id: Uuid::new_v4(),
        })
    }

    /// Turn limit, at least 1.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// Tag audit entries with the surrounding flow run.
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    /// Run the loop and return the agent's final answer.
    pub async fn run(&self, system_prompt: &str, user_input: &str) -> CompanyResult<String> {
        let run_id = self.run_id;
        let mut context = ContextWindow::new(CONTEXT_MAX_MESSAGES);
        context.set_system_prompt(system_prompt);
        context.push(Message::user(user_input));

        info!(
            run_id = %run_id,
            tools = self.tools.len(),
            capabilities = self.permissions.len(),
            "Starting agentic loop"
        );

        for turn in 0..self.max_turns {
            let response = self
                .llm
                .chat(context.system_prompt(), context.messages(), &self.tools)
                .await?;

            match response {
                LlmResponse::Done(text) => {
                    context.push(Message::assistant(&text));
                    self.audit.log_action(
                        run_id,
                        "agent_response",
                        None,
                        serde_json::json!({"turn": turn, "type": "final", "chars": text.len()}),
                        AuditOutcome::Success,
                    );
                    info!(run_id = %run_id, turns = turn + 1, "Agentic loop completed");
                    return Ok(text);
                }

                LlmResponse::Text(text) => {
                    context.push(Message::assistant(text));
                }

                LlmResponse::ToolUse {
                    content,
                    tool_calls,
                } => {
                    if let Some(text) = content {
                        context.push(Message::assistant(text));
                    }

                    for call in tool_calls {
                        info!(
                            run_id = %run_id,
                            tool = %call.name,
                            call_id = %call.id,
                            "Executing tool call"
                        );
                        self.audit.log_action(
                            run_id,
                            "tool_call",
                            Some(call.name.clone()),
                            serde_json::json!({
                                "call_id": call.id,
                                "arguments": call.arguments,
                            }),
                            AuditOutcome::Success,
                        );

                        let tool_name = call.name.clone();
                        let denied = self
                            .registry
                            .denied_capability(&tool_name, &self.permissions)
                            .is_some();
                        match self.registry.execute(call, &self.permissions).await {
                            Ok(tool_result) => {
                                let outcome = if denied {
                                    AuditOutcome::Denied
                                } else if tool_result.is_error {
                                    AuditOutcome::Error
                                } else {
                                    AuditOutcome::Success
                                };
                                self.audit.log_action(
                                    run_id,
                                    "tool_result",
                                    Some(tool_name),
                                    serde_json::json!({
                                        "call_id": tool_result.call_id,
                                        "is_error": tool_result.is_error,
                                    }),
                                    outcome,
                                );

                                let result_content = serde_json::json!({
                                    "type": "tool_result",
                                    "tool_use_id": tool_result.call_id,
                                    "content": tool_result.content,
                                    "is_error": tool_result.is_error,
                                });
                                context.push(Message::new(Role::Tool, result_content.to_string()));
                            }
                            Err(e) => {
                                error!(error = %e, tool = %tool_name, "Tool execution failed");
                                self.audit.log_action(
                                    run_id,
                                    "tool_error",
                                    Some(tool_name),
                                    serde_json::json!({"error": e.to_string()}),
                                    AuditOutcome::Error,
                                );
                                context.push(Message::new(Role::Tool, format!("Tool error: {e}")));
                            }
                        }
                    }
                }
            }
        }

        warn!(
            run_id = %run_id,
            max_turns = self.max_turns,
            "Agentic loop reached max turns"
        );

        Err(CompanyError::Agent(format!(
            "Agentic loop exceeded maximum of {} turns",
            self.max_turns
        )))
    }
}
