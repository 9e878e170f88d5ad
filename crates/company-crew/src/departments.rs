use crate::agent::AgentSpec;
use crate::config::CrewConfig;
use crate::crew::Crew;
use crate::executor::TaskExecutor;
use crate::task::TaskSpec;
use company_core::{CompanyError, CompanyResult};
use company_tools::{
    ClaimsCheckTool, CommandTool, ComplianceChecklistTool, ContractReviewTool, CostModelTool,
    RepoReadTool, RepoWriteTool, ToolRegistry, WriteArtifactTool, INTERNET_TOOL_NAMES,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const WRITE: &str = WriteArtifactTool::NAME;

/// Agent key and the tools it is bound to.
type Binding = (&'static str, &'static [&'static str]);

const TECHNICAL_ROSTER: &[Binding] = &[
    ("cto", &[RepoReadTool::NAME]),
    ("product_owner", &[WRITE]),
    ("software_architect", &[WRITE]),
    ("tech_lead", &[WRITE]),
    ("backend_developer", &[WRITE, RepoReadTool::NAME, RepoWriteTool::NAME]),
    ("frontend_developer", &[WRITE, RepoReadTool::NAME, RepoWriteTool::NAME]),
    ("devops_engineer", &[WRITE]),
    ("qa_tester", &[WRITE, CommandTool::RUN_TESTS, CommandTool::RUN_LINT]),
    ("ui_designer", &[WRITE]),
    ("ux_designer", &[WRITE]),
];

const TECHNICAL_TASKS: &[&str] = &[
    "product_scoping",
    "ux_flows",
    "ui_specs",
    "architecture",
    "implementation_plan",
    "backend_implementation",
    "frontend_implementation",
    "devops_pipeline_setup",
    "qa_validation",
    "final_technical_review",
];

const FINANCE_ROSTER: &[Binding] = &[
    ("cfo", &[WRITE]),
    ("financial_analyst", &[WRITE, CostModelTool::NAME]),
    ("cost_controller", &[WRITE]),
];

const FINANCE_TASKS: &[&str] = &["cost_estimation", "budget_controls", "cfo_approval_gate"];

const COMPLIANCE_ROSTER: &[Binding] = &[
    ("cco", &[WRITE]),
    ("legal_counsel", &[WRITE, ContractReviewTool::NAME]),
    ("compliance_analyst", &[WRITE, ComplianceChecklistTool::NAME]),
];

const COMPLIANCE_TASKS: &[&str] = &[
    "compliance_scope_definition",
    "legal_review",
    "compliance_gap_analysis",
    "compliance_release_gate",
];

const MARKETING_ROSTER: &[Binding] = &[
    ("cmo", &[WRITE]),
    ("marketing_strategist", &[WRITE]),
    ("copywriter_communications", &[WRITE]),
    ("brand_communications_reviewer", &[ClaimsCheckTool::NAME]),
];

const MARKETING_TASKS: &[&str] = &[
    "strategy_brief",
    "announcement_drafting",
    "brand_review",
    "cmo_approval_gate",
];

/// The four crews of the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    /// Product, architecture and build plan.
    Technical,
    /// Costs, budget and controls.
    Finance,
    /// Legal and regulatory review.
    Compliance,
    /// Positioning, copy and launch.
    Marketing,
}

impl Department {
    /// Flow order.
    pub const ALL: [Department; 4] = [
        Department::Technical,
        Department::Finance,
        Department::Compliance,
        Department::Marketing,
    ];

    /// Stable identifier; also the config sub-directory name.
    pub fn name(self) -> &'static str {
        match self {
            Department::Technical => "technical",
            Department::Finance => "finance",
            Department::Compliance => "compliance",
            Department::Marketing => "marketing",
        }
    }

    /// Display name, e.g. "Finance Crew".
    pub fn crew_name(self) -> &'static str {
        match self {
            Department::Technical => "Technical Crew",
            Department::Finance => "Finance Crew",
            Department::Compliance => "Compliance Crew",
            Department::Marketing => "Marketing Crew",
        }
    }

    /// Task keys in execution order.
    pub fn task_order(self) -> &'static [&'static str] {
        match self {
            Department::Technical => TECHNICAL_TASKS,
            Department::Finance => FINANCE_TASKS,
            Department::Compliance => COMPLIANCE_TASKS,
            Department::Marketing => MARKETING_TASKS,
        }
    }

    fn roster(self) -> &'static [Binding] {
        match self {
            Department::Technical => TECHNICAL_ROSTER,
            Department::Finance => FINANCE_ROSTER,
            Department::Compliance => COMPLIANCE_ROSTER,
            Department::Marketing => MARKETING_ROSTER,
        }
    }

    /// Every department but Technical gets the internet tools.
    pub fn uses_internet_tools(self) -> bool {
        !matches!(self, Department::Technical)
    }

    /// Tools bound to `agent_key`; internet tools come first when the
    /// department uses them.
    pub fn tools_for(self, agent_key: &str) -> CompanyResult<Vec<String>> {
        let (_, own) = self
            .roster()
            .iter()
            .find(|(key, _)| *key == agent_key)
            .ok_or_else(|| {
                CompanyError::Configuration(format!(
                    "Agent '{agent_key}' is not part of the {} roster",
                    self.crew_name()
                ))
            })?;
        let mut tools: Vec<String> = Vec::new();
        if self.uses_internet_tools() {
            tools.extend(INTERNET_TOOL_NAMES.iter().map(ToString::to_string));
        }
        tools.extend(own.iter().map(ToString::to_string));
        Ok(tools)
    }

    /// The configuration compiled into the binary.
    pub fn default_config(self) -> CompanyResult<CrewConfig> {
        let (agents, tasks) = match self {
            Department::Technical => (
                include_str!("../config/technical/agents.yaml"),
                include_str!("../config/technical/tasks.yaml"),
            ),
            Department::Finance => (
                include_str!("../config/finance/agents.yaml"),
                include_str!("../config/finance/tasks.yaml"),
            ),
            Department::Compliance => (
                include_str!("../config/compliance/agents.yaml"),
                include_str!("../config/compliance/tasks.yaml"),
            ),
            Department::Marketing => (
                include_str!("../config/marketing/agents.yaml"),
                include_str!("../config/marketing/tasks.yaml"),
            ),
        };
        CrewConfig::from_yaml(agents, tasks)
    }

    /// Load `<dir>/<name>/{agents,tasks}.yaml` when that directory exists,
    /// otherwise the embedded defaults.
    pub fn load_config(self, override_dir: Option<&Path>) -> CompanyResult<CrewConfig> {
        if let Some(dir) = override_dir {
            let dept_dir = dir.join(self.name());
            if dept_dir.is_dir() {
                info!(
                    department = self.name(),
                    dir = %dept_dir.display(),
                    "Loading crew config override"
                );
                return CrewConfig::load_dir(&dept_dir);
            }
        }
        self.default_config()
    }

    /// Agent specs for the whole roster, in roster order.
    pub fn agents(self, config: &CrewConfig) -> CompanyResult<Vec<AgentSpec>> {
        self.roster()
            .iter()
            .map(|(key, _)| AgentSpec::from_config(config, key, self.tools_for(key)?))
            .collect()
    }

    /// Assemble the crew. Every bound tool must exist in `registry`.
    pub fn build_crew(
        self,
        config: &CrewConfig,
        executor: Arc<dyn TaskExecutor>,
        registry: Arc<ToolRegistry>,
    ) -> CompanyResult<Crew> {
        let agents = self.agents(config)?;
        for agent in &agents {
            registry.descriptors_for(&agent.tools)?;
        }
        let tasks = self
            .task_order()
            .iter()
            .map(|key| TaskSpec::from_config(config, key, &agents))
            .collect::<CompanyResult<Vec<_>>>()?;
        Crew::new(self.crew_name(), agents, tasks, executor, registry)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.crew_name())
    }
}
