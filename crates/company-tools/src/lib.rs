//! Tools the company's agents call by name.
//!
//! Every tool implements [`Tool`]: a [`ToolDescriptor`] (name, description,
//! JSON-schema parameters, required capabilities) plus an async `execute`.
//! Expected failures come back as error payloads, never as panics.
//!
//! # Main entry points
//!
//! - [`build_registry()`] — Register the full tool set for a run.
//! - [`ToolRegistry`] — Permission-checked, schema-validated dispatch by name.

/// `write_artifact`.
pub mod artifact;
/// `run_tests` and `run_lint`.
pub mod command;
/// `cost_model`.
pub mod finance;
/// `internet_search` and `read_webpage`.
pub mod internet;
/// `contract_review` and `compliance_checklist`.
pub mod legal;
/// `claims_check` and the risky-claim heuristics.
pub mod marketing;
/// Tool registry.
pub mod registry;
/// `repo_read` and `repo_write`.
pub mod repo;
/// Argument validation against descriptor schemas.
pub mod schema;
/// The `Tool` trait.
pub mod tool;
/// Registry construction from settings.
pub mod toolbox;

pub use artifact::WriteArtifactTool;
pub use command::CommandTool;
pub use finance::CostModelTool;
pub use internet::{InternetSearchTool, InternetSettings, ReadWebpageTool};
pub use legal::{ComplianceChecklistTool, ContractReviewTool};
pub use marketing::{ClaimsCheckTool, RiskyClaims};
pub use registry::ToolRegistry;
pub use repo::{RepoReadTool, RepoWriteTool};
pub use tool::{Tool, ToolDescriptor};
pub use toolbox::{build_registry, ToolSettings, DEFAULT_COMMAND_TIMEOUT_SECS, INTERNET_TOOL_NAMES};
