use crate::agent::AgentSpec;
use crate::context::{TaskContext, TaskOutput};
use crate::executor::TaskExecutor;
use crate::task::TaskSpec;
use company_agent::RetryPolicy;
use company_core::{CompanyError, CompanyResult, ToolCall};
use company_tools::{ToolRegistry, WriteArtifactTool};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Result of a crew run.
#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    /// Output of the last task; what the crew hands back to the flow.
    pub output: String,
    /// Every task's output, in execution order.
    pub task_outputs: Vec<TaskOutput>,
}

/// An ordered list of tasks run sequentially against a fixed roster.
pub struct Crew {
    name: String,
    agents: Vec<AgentSpec>,
    tasks: Vec<TaskSpec>,
    executor: Arc<dyn TaskExecutor>,
    registry: Arc<ToolRegistry>,
    retry: RetryPolicy,
}

impl Crew {
    /// Fails when there are no tasks or a task names an agent outside `agents`.
    pub fn new(
        name: impl Into<String>,
        agents: Vec<AgentSpec>,
        tasks: Vec<TaskSpec>,
        executor: Arc<dyn TaskExecutor>,
        registry: Arc<ToolRegistry>,
    ) -> CompanyResult<Self> {
        let name = name.into();
        if tasks.is_empty() {
            return Err(CompanyError::Configuration(format!("Crew '{name}' has no tasks")));
        }
        for task in &tasks {
            if !agents.iter().any(|a| a.key == task.agent) {
                return Err(CompanyError::Configuration(format!(
                    "Crew '{name}': task '{}' is bound to unknown agent '{}'",
                    task.key, task.agent
                )));
            }
        }
        Ok(Self {
            name,
            agents,
            tasks,
            executor,
            registry,
            retry: RetryPolicy::default(),
        })
    }

    /// Retry policy for failed or empty task outputs.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Crew name, as used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run every task in declared order and return the last task's output.
    pub async fn kickoff(&self, request: &str) -> CompanyResult<CrewOutput> {
        let start = Instant::now();
        info!(crew = %self.name, tasks = self.tasks.len(), "Crew kickoff");

        let mut context = TaskContext::new(request);

        for (index, task) in self.tasks.iter().enumerate() {
            let agent = self
                .agents
                .iter()
                .find(|a| a.key == task.agent)
                .ok_or_else(|| {
                    CompanyError::Configuration(format!("Unknown agent '{}'", task.agent))
                })?;
            let description = task
                .render_description(request)
                .map_err(|e| self.task_failed(task, e.to_string()))?;

            info!(
                crew = %self.name,
                task = %task.key,
                agent = %agent.role,
                step = index + 1,
                "Task started"
            );
            let output = self.run_task(task, agent, &description, &context).await?;
            info!(crew = %self.name, task = %task.key, chars = output.len(), "Task completed");

            if let Some(path) = &task.output_file {
                self.persist(task, path, &output).await;
            }

            context.push(TaskOutput {
                task: task.key.clone(),
                agent_role: agent.role.clone(),
                output,
            });
        }

        let task_outputs = context.into_outputs();
        let output = task_outputs
            .last()
            .map(|o| o.output.clone())
            .unwrap_or_default();

        info!(
            crew = %self.name,
            duration_ms = start.elapsed().as_millis() as u64,
            "Crew finished"
        );
        Ok(CrewOutput {
            output,
            task_outputs,
        })
    }

    /// Invoke the executor, retrying failures and empty outputs per the retry policy.
    async fn run_task(
        &self,
        task: &TaskSpec,
        agent: &AgentSpec,
        description: &str,
        context: &TaskContext,
    ) -> CompanyResult<String> {
        let mut attempt = 0;
        loop {
            let reason = match self
                .executor
                .execute(agent, task, description, context, &self.agents)
                .await
            {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => "agent returned an empty output".to_string(),
                Err(e) if !is_retryable_task_error(&e) => {
                    error!(
                        crew = %self.name,
                        task = %task.key,
                        error = %e,
                        "Task failed, not retrying"
                    );
                    return Err(self.task_failed(task, e.to_string()));
                }
                Err(e) => e.to_string(),
            };

            if attempt >= self.retry.max_retries {
                error!(
                    crew = %self.name,
                    task = %task.key,
                    attempts = attempt + 1,
                    reason = %reason,
                    "Task failed"
                );
                return Err(self.task_failed(task, reason));
            }

            let delay = self.retry.backoff(attempt);
            warn!(
                crew = %self.name,
                task = %task.key,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                reason = %reason,
                "Task attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn task_failed(&self, task: &TaskSpec, reason: String) -> CompanyError {
        CompanyError::CrewExecution {
            crew: self.name.clone(),
            task: task.key.clone(),
            reason,
        }
    }

    /// Write a task's output through `write_artifact`. Failures are logged only.
    async fn persist(&self, task: &TaskSpec, path: &str, output: &str) {
        let names = [WriteArtifactTool::NAME.to_string()];
        let permissions = match self.registry.permissions_for(&names) {
            Ok(p) => p,
            Err(e) => {
                warn!(task = %task.key, error = %e, "Cannot persist task output");
                return;
            }
        };
        let call = ToolCall::new(
            format!("{}-output", task.key),
            WriteArtifactTool::NAME,
            serde_json::json!({"relative_path": path, "content": output}),
        );
        match self.registry.execute(call, &permissions).await {
            Ok(result) if !result.is_error => {
                info!(crew = %self.name, task = %task.key, path, "Task output persisted");
            }
            Ok(result) => warn!(
                crew = %self.name,
                task = %task.key,
                path,
                error = %result.content,
                "Task output not persisted"
            ),
            Err(e) => warn!(
                crew = %self.name,
                task = %task.key,
                path,
                error = %e,
                "Task output not persisted"
            ),
        }
    }
}

/// Structural errors are not worth another attempt.
fn is_retryable_task_error(err: &CompanyError) -> bool {
    !matches!(
        err,
        CompanyError::Configuration(_) | CompanyError::Template(_) | CompanyError::Validation(_)
    )
}
