use company_core::{CompanyError, CompanyResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One entry of `agents.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent role.
    pub role: String,
    /// Agent goal.
    pub goal: String,
    /// Agent backstory.
    pub backstory: String,
    /// Defaults to false.
    #[serde(default)]
    pub allow_delegation: bool,
    /// Defaults to false.
    #[serde(default)]
    pub verbose: bool,
}

/// One entry of `tasks.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Template; `{ceo_request}` is substituted at run time.
    pub description: String,
    /// What a finished answer looks like.
    pub expected_output: String,
    /// Key of the agent in `agents.yaml` that performs this task.
    pub agent: String,
    /// Path relative to the artifacts root.
    #[serde(default)]
    pub output_file: Option<String>,
}

/// The agents and tasks of one crew, keyed by stable identifiers.
#[derive(Debug, Clone, Default)]
pub struct CrewConfig {
    /// `agents.yaml` entries.
    pub agents: BTreeMap<String, AgentConfig>,
    /// `tasks.yaml` entries.
    pub tasks: BTreeMap<String, TaskConfig>,
}

impl CrewConfig {
    /// Parse both files; malformed YAML is a configuration error.
    pub fn from_yaml(agents_yaml: &str, tasks_yaml: &str) -> CompanyResult<Self> {
        let agents = serde_yaml_ng::from_str(agents_yaml)
            .map_err(|e| CompanyError::Configuration(format!("Invalid agents.yaml: {e}")))?;
        let tasks = serde_yaml_ng::from_str(tasks_yaml)
            .map_err(|e| CompanyError::Configuration(format!("Invalid tasks.yaml: {e}")))?;
        Ok(Self { agents, tasks })
    }

    /// Load `<dir>/agents.yaml` and `<dir>/tasks.yaml`.
    pub fn load_dir(dir: &Path) -> CompanyResult<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| {
                CompanyError::Configuration(format!("Cannot read {}: {e}", path.display()))
            })
        };
        Self::from_yaml(&read("agents.yaml")?, &read("tasks.yaml")?)
    }

    /// The agent entry for `key`.
    pub fn agent(&self, key: &str) -> CompanyResult<&AgentConfig> {
        self.agents
            .get(key)
            .ok_or_else(|| CompanyError::Configuration(format!("Unknown agent key: '{key}'")))
    }

    /// The task entry for `key`.
    pub fn task(&self, key: &str) -> CompanyResult<&TaskConfig> {
        self.tasks
            .get(key)
            .ok_or_else(|| CompanyError::Configuration(format!("Unknown task key: '{key}'")))
    }
}
