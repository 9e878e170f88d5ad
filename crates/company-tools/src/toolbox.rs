use crate::artifact::WriteArtifactTool;
use crate::command::CommandTool;
use crate::finance::CostModelTool;
use crate::internet::{InternetSearchTool, InternetSettings, ReadWebpageTool};
use crate::legal::{ComplianceChecklistTool, ContractReviewTool};
use crate::marketing::ClaimsCheckTool;
use crate::registry::ToolRegistry;
use crate::repo::{RepoReadTool, RepoWriteTool};
use company_core::CompanyResult;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Default timeout for `run_tests` / `run_lint`.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;

/// Names of the tools every non-technical department gets on top of its roster.
pub const INTERNET_TOOL_NAMES: [&str; 2] = [InternetSearchTool::NAME, ReadWebpageTool::NAME];

/// Where tools may act and how long they may take.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Root for `write_artifact`.
    pub artifacts_dir: PathBuf,
    /// Root for the repository and command tools.
    pub repo_root: PathBuf,
    /// Default command timeout.
    pub command_timeout_secs: u64,
    /// Settings for the internet tools.
    pub internet: InternetSettings,
}

impl ToolSettings {
    /// Defaults for everything but the two roots.
    pub fn new(artifacts_dir: impl Into<PathBuf>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            repo_root: repo_root.into(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            internet: InternetSettings::default(),
        }
    }
}

/// Build a registry holding every tool agents can be bound to.
pub fn build_registry(settings: &ToolSettings) -> CompanyResult<ToolRegistry> {
    let internet = Arc::new(settings.internet.clone());
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(WriteArtifactTool::new(&settings.artifacts_dir)));
    registry.register(Arc::new(RepoReadTool::new(&settings.repo_root)));
    registry.register(Arc::new(RepoWriteTool::new(&settings.repo_root)));
    registry.register(Arc::new(CommandTool::run_tests(
        &settings.repo_root,
        settings.command_timeout_secs,
    )));
    registry.register(Arc::new(CommandTool::run_lint(
        &settings.repo_root,
        settings.command_timeout_secs,
    )));
    registry.register(Arc::new(InternetSearchTool::new(internet.clone())?));
    registry.register(Arc::new(ReadWebpageTool::new(internet)?));
    registry.register(Arc::new(CostModelTool::new()));
    registry.register(Arc::new(ContractReviewTool::new()));
    registry.register(Arc::new(ComplianceChecklistTool::new()));
    registry.register(Arc::new(ClaimsCheckTool::new()?));

    info!(
        tools = registry.tool_count(),
        artifacts_dir = %settings.artifacts_dir.display(),
        repo_root = %settings.repo_root.display(),
        "Tool registry ready"
    );
    Ok(registry)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_every_tool() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ToolSettings::new(dir.path().join("artifacts"), dir.path());
        let registry = build_registry(&settings).unwrap();
        for name in [
            "write_artifact",
            "repo_read",
            "repo_write",
            "run_tests",
            "run_lint",
            "internet_search",
            "read_webpage",
            "cost_model",
            "contract_review",
            "compliance_checklist",
            "claims_check",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert_eq!(registry.tool_count(), 11);
    }

    #[test]
    fn test_artifact_and_repo_write_need_distinct_grants() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ToolSettings::new(dir.path().join("artifacts"), dir.path().join("repo"));
        let registry = build_registry(&settings).unwrap();
        let perms = registry.permissions_for(&["write_artifact".to_string()]).unwrap();
        let repo_write = registry.get("repo_write").unwrap().descriptor();
        assert!(!perms.has(&repo_write.required_capabilities[0]));
    }
}
