use crate::agent::AgentSpec;
use crate::config::CrewConfig;
use crate::template;
use company_core::{CompanyError, CompanyResult};
use serde::Serialize;

/// Name of the request placeholder in task descriptions.
pub const REQUEST_PLACEHOLDER: &str = "ceo_request";

/// One unit of work bound to exactly one agent of the crew's roster.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSpec {
    /// Stable key from `tasks.yaml`.
    pub key: String,
    /// Unrendered description template.
    pub description: String,
    /// What a finished answer looks like.
    pub expected_output: String,
    /// Key of the agent performing the task.
    pub agent: String,
    /// Where the output is persisted, relative to the artifacts root.
    pub output_file: Option<String>,
}

impl TaskSpec {
    /// Build from the `key` entry of `tasks.yaml`. The referenced agent must
    /// be part of `roster`.
    pub fn from_config(
        config: &CrewConfig,
        key: &str,
        roster: &[AgentSpec],
    ) -> CompanyResult<Self> {
        let cfg = config.task(key)?;
        if !roster.iter().any(|a| a.key == cfg.agent) {
            return Err(CompanyError::Configuration(format!(
                "Task '{key}' references agent '{}' which is not in the crew roster",
                cfg.agent
            )));
        }
        Ok(Self {
            key: key.to_string(),
            description: cfg.description.clone(),
            expected_output: cfg.expected_output.trim().to_string(),
            agent: cfg.agent.clone(),
            output_file: cfg
                .output_file
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
        })
    }

    /// The description with the request substituted.
    pub fn render_description(&self, request: &str) -> CompanyResult<String> {
        template::render(&self.description, &[(REQUEST_PLACEHOLDER, request)])
            .map(|d| d.trim().to_string())
            .map_err(|e| match e {
                CompanyError::Template(msg) => {
                    CompanyError::Template(format!("task '{}': {msg}", self.key))
                }
                other => other,
            })
    }
}
