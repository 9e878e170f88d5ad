use crate::agent::AgentSpec;
use crate::context::TaskContext;
use crate::delegation::DelegateWorkTool;
use crate::task::TaskSpec;
use async_trait::async_trait;
use company_agent::{build_backend, AgentRunner, LlmBackend, LlmClient, ModelConfig};
use company_core::CompanyResult;
use company_security::AuditLog;
use company_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Produces the text output of one task for one agent.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// `coworkers` is the whole crew roster, `agent` included.
    async fn execute(
        &self,
        agent: &AgentSpec,
        task: &TaskSpec,
        description: &str,
        context: &TaskContext,
        coworkers: &[AgentSpec],
    ) -> CompanyResult<String>;
}

/// Creates the LLM backend used for a given agent.
pub type BackendFactory =
    Arc<dyn Fn(&AgentSpec) -> CompanyResult<Box<dyn LlmBackend>> + Send + Sync>;

/// Everything needed to run one agent through the tool loop.
#[derive(Clone)]
pub(crate) struct AgentRuntime {
    pub(crate) factory: BackendFactory,
    pub(crate) registry: Arc<ToolRegistry>,
    pub(crate) audit: Arc<AuditLog>,
    pub(crate) max_turns: u32,
    pub(crate) run_id: Uuid,
}

impl AgentRuntime {
    /// Run `agent` on `prompt` with its bound tools, plus any extra tools
    /// registered in `registry` (delegation).
    pub(crate) async fn run_agent(
        &self,
        agent: &AgentSpec,
        prompt: &str,
        registry: Arc<ToolRegistry>,
        tool_names: &[String],
    ) -> CompanyResult<String> {
        let llm = LlmClient::from_backend((self.factory)(agent)?);
        let runner = AgentRunner::new(llm, registry, tool_names, self.audit.clone())?
            .with_max_turns(self.max_turns)
            .with_run_id(self.run_id);
        if agent.verbose {
            info!(agent = %agent.role, prompt, "Agent prompt");
        } else {
            debug!(agent = %agent.role, chars = prompt.len(), "Agent prompt");
        }
        runner.run(&agent.system_prompt(), prompt).await
    }
}

/// Build the user prompt for a task.
///
/// Descriptions that do not quote the CEO request get it appended, so
/// overridden task templates still tell the agent what is being asked.
pub fn task_prompt(description: &str, expected_output: &str, context: &TaskContext) -> String {
    let mut prompt = description.to_string();
    let request = context.request().trim();
    if !request.is_empty() && !description.contains(request) {
        prompt.push_str("\n\nCEO request: ");
        prompt.push_str(request);
    }
    prompt.push_str(&format!(
        "\n\nThis is the expected criteria for your final answer: {expected_output}\n\
         You MUST return the actual complete content as the final answer, not a summary."
    ));
    if let Some(prior) = context.render_prior() {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        prompt.push_str(&prior);
    }
    prompt
}

/// Executes tasks by running the bound agent through [`AgentRunner`].
pub struct LlmTaskExecutor {
    runtime: AgentRuntime,
}

impl LlmTaskExecutor {
    /// Executor creating each agent's backend through `factory`.
    pub fn new(
        factory: BackendFactory,
        registry: Arc<ToolRegistry>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            runtime: AgentRuntime {
                factory,
                registry,
                audit,
                max_turns: 20,
                run_id: Uuid::new_v4(),
            },
        }
    }

    /// Every agent uses the same model configuration.
    pub fn from_model_config(
        config: ModelConfig,
        registry: Arc<ToolRegistry>,
        audit: Arc<AuditLog>,
    ) -> Self {
        let max_turns = config.max_turns;
        let factory: BackendFactory = Arc::new(move |_agent: &AgentSpec| build_backend(&config));
        Self::new(factory, registry, audit).with_max_turns(max_turns)
    }

    /// Tool loop turn limit per agent run.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.runtime.max_turns = max_turns;
        self
    }

    /// Tag every agent's audit entries with the flow run.
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.runtime.run_id = run_id;
        self
    }
}

#[async_trait]
impl TaskExecutor for LlmTaskExecutor {
    async fn execute(
        &self,
        agent: &AgentSpec,
        task: &TaskSpec,
        description: &str,
        context: &TaskContext,
        coworkers: &[AgentSpec],
    ) -> CompanyResult<String> {
        let prompt = task_prompt(description, &task.expected_output, context);

        let others: Vec<AgentSpec> = coworkers
            .iter()
            .filter(|c| c.key != agent.key)
            .cloned()
            .collect();

        if !agent.allow_delegation || others.is_empty() {
            return self
                .runtime
                .run_agent(agent, &prompt, self.runtime.registry.clone(), &agent.tools)
                .await;
        }

        let mut registry = (*self.runtime.registry).clone();
        registry.register(Arc::new(DelegateWorkTool::new(
            others,
            Arc::new(self.runtime.clone()),
        )));
        let mut tool_names = agent.tools.clone();
        tool_names.push(DelegateWorkTool::NAME.to_string());

        self.runtime
            .run_agent(agent, &prompt, Arc::new(registry), &tool_names)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::context::TaskOutput;

    #[test]
    fn test_task_prompt_without_context() {
        let ctx = TaskContext::new("Launch a budgeting app");
        let prompt = task_prompt("Scope: Launch a budgeting app", "A scope doc", &ctx);
        assert!(prompt.starts_with(
            "Scope: Launch a budgeting app\n\n\
             This is the expected criteria for your final answer: A scope doc"
        ));
        assert!(!prompt.contains("CEO request:"));
        assert!(!prompt.contains("context you're working with"));
    }

    #[test]
    fn test_task_prompt_appends_unquoted_request() {
        let ctx = TaskContext::new("Launch a budgeting app");
        let prompt = task_prompt("Draft the pricing page", "A page", &ctx);
        assert!(prompt.starts_with(
            "Draft the pricing page\n\nCEO request: Launch a budgeting app\n\n"
        ));
    }

    #[test]
    fn test_task_prompt_with_context() {
        let mut ctx = TaskContext::new("r");
        ctx.push(TaskOutput {
            task: "cost_estimation".into(),
            agent_role: "Financial Analyst".into(),
            output: "$90k".into(),
        });
        let prompt = task_prompt("Set controls for r", "Controls", &ctx);
        assert!(prompt.ends_with("### cost_estimation (Financial Analyst)\n$90k"));
    }
}
