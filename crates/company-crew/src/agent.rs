use crate::config::CrewConfig;
use company_core::CompanyResult;
use serde::Serialize;

/// A role-specialized agent as bound inside one crew run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSpec {
    /// Stable key from `agents.yaml`.
    pub key: String,
    /// Role, used as the agent's display name.
    pub role: String,
    /// What the agent is trying to achieve.
    pub goal: String,
    /// Persona text for the system prompt.
    pub backstory: String,
    /// May hand sub-tasks to coworkers.
    pub allow_delegation: bool,
    /// Log prompts at info level.
    pub verbose: bool,
    /// Tool names, in binding order.
    pub tools: Vec<String>,
}

impl AgentSpec {
    /// Build from the `key` entry of `agents.yaml`, binding `tools`.
    pub fn from_config(config: &CrewConfig, key: &str, tools: Vec<String>) -> CompanyResult<Self> {
        let cfg = config.agent(key)?;
        let mut bound: Vec<String> = Vec::with_capacity(tools.len());
        for tool in tools {
            if !bound.contains(&tool) {
                bound.push(tool);
            }
        }
        Ok(Self {
            key: key.to_string(),
            role: cfg.role.trim().to_string(),
            goal: cfg.goal.trim().to_string(),
            backstory: cfg.backstory.trim().to_string(),
            allow_delegation: cfg.allow_delegation,
            verbose: cfg.verbose,
            tools: bound,
        })
    }

    /// System prompt describing who the agent is.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}
