use company_agent::{ModelConfig, RetryPolicy};
use company_flow::DEFAULT_REPORT_PATH;
use company_tools::internet::clamp_timeout_secs;
use company_tools::{InternetSettings, ToolSettings, DEFAULT_COMMAND_TIMEOUT_SECS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Contents of `company.toml`. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CompanyConfig {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
    #[serde(default = "default_true")]
    pub parallel_departments: bool,
    /// Directory holding `<department>/agents.yaml` and `tasks.yaml` overrides.
    #[serde(default)]
    pub crew_config_dir: Option<PathBuf>,
    /// Retries for a failed or empty task output.
    #[serde(default = "default_task_retry")]
    pub task_retry: RetryPolicy,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            parallel_departments: true,
            crew_config_dir: None,
            task_retry: default_task_retry(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    #[serde(default = "default_repo_root")]
    pub repo_root: PathBuf,
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Overrides `INTERNET_TOOL_TIMEOUT_SECONDS`.
    #[serde(default)]
    pub internet_timeout_secs: Option<u64>,
    /// Overrides `INTERNET_TOOL_USER_AGENT`.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            repo_root: default_repo_root(),
            command_timeout_secs: default_command_timeout(),
            internet_timeout_secs: None,
            user_agent: None,
        }
    }
}

impl ToolsConfig {
    /// Combine with the internet settings read from the environment.
    pub fn settings(&self, env: InternetSettings) -> ToolSettings {
        let mut internet = env;
        if let Some(secs) = self.internet_timeout_secs {
            internet.timeout = Duration::from_secs(clamp_timeout_secs(secs));
        }
        if let Some(agent) = self.user_agent.as_deref().filter(|a| !a.trim().is_empty()) {
            internet.user_agent = agent.to_string();
        }
        let mut settings = ToolSettings::new(&self.artifacts_dir, &self.repo_root);
        settings.command_timeout_secs = self.command_timeout_secs;
        settings.internet = internet;
        settings
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_PATH)
}
fn default_true() -> bool {
    true
}
fn default_task_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        backoff_base_ms: 1000,
        backoff_max_ms: 10_000,
    }
}
fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}
fn default_repo_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_command_timeout() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

/// Name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "company.toml";

/// Read the configuration. An explicit path must exist; the default file is
/// optional.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<CompanyConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !path.is_file() {
                return Ok(CompanyConfig::default());
            }
            path
        }
    };
    let raw = std::fs::read_to_string(&path).map_err(|e| {
        anyhow::anyhow!("Failed to read config file '{}': {e}", path.display())
    })?;
    toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {e}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use company_agent::LlmProvider;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: CompanyConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.model.provider, LlmProvider::Claude);
        assert_eq!(
            config.flow.report_path,
            PathBuf::from("artifacts/reports/final_orchestration_report.md")
        );
        assert!(config.flow.parallel_departments);
        assert_eq!(config.tools.command_timeout_secs, 120);
    }

    #[test]
    fn test_full_file() {
        let config: CompanyConfig = toml::from_str(
            r#"
            log_format = "json"

            [model]
            provider = "openrouter"
            model_id = "anthropic/claude-sonnet-4"

            [flow]
            report_path = "out/report.md"
            parallel_departments = false
            crew_config_dir = "crews"

            [flow.task_retry]
            max_retries = 0
            backoff_base_ms = 1
            backoff_max_ms = 1

            [tools]
            artifacts_dir = "out"
            command_timeout_secs = 30
            internet_timeout_secs = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.model.provider, LlmProvider::OpenRouter);
        assert!(!config.flow.parallel_departments);
        assert_eq!(config.flow.crew_config_dir, Some(PathBuf::from("crews")));
        assert_eq!(config.flow.task_retry.max_retries, 0);

        let settings = config.tools.settings(InternetSettings::default());
        assert_eq!(settings.artifacts_dir, PathBuf::from("out"));
        assert_eq!(settings.command_timeout_secs, 30);
        assert_eq!(settings.internet.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("company.toml");
        std::fs::write(&path, "[tools]\nrepo_root = \"/srv/repo\"\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.tools.repo_root, PathBuf::from("/srv/repo"));
    }
}
