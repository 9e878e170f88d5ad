use crate::report::{render_report, write_report};
use crate::state::OrganizationState;
use company_agent::RetryPolicy;
use company_core::CompanyResult;
use company_crew::{CrewRunner, Department, DepartmentCrew, TaskExecutor};
use company_tools::ToolRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The company pipeline: Technical, then Finance and Compliance, then
/// Marketing, then the report. Every crew receives the raw request.
pub struct OrganizationFlow {
    technical: Arc<dyn CrewRunner>,
    finance: Arc<dyn CrewRunner>,
    compliance: Arc<dyn CrewRunner>,
    marketing: Arc<dyn CrewRunner>,
    report_path: PathBuf,
    parallel_departments: bool,
}

impl OrganizationFlow {
    /// Flow over the given crews. Finance and Compliance run concurrently.
    pub fn new(
        technical: Arc<dyn CrewRunner>,
        finance: Arc<dyn CrewRunner>,
        compliance: Arc<dyn CrewRunner>,
        marketing: Arc<dyn CrewRunner>,
        report_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            technical,
            finance,
            compliance,
            marketing,
            report_path: report_path.into(),
            parallel_departments: true,
        }
    }

    /// Wire the four [`Department`] crews to one executor and registry.
    pub fn from_departments(
        executor: Arc<dyn TaskExecutor>,
        registry: Arc<ToolRegistry>,
        config_dir: Option<&Path>,
        retry: RetryPolicy,
        report_path: impl Into<PathBuf>,
    ) -> CompanyResult<Self> {
        let crew = |department: Department| -> CompanyResult<Arc<dyn CrewRunner>> {
            let department_crew =
                DepartmentCrew::new(department, config_dir, executor.clone(), registry.clone())?
                    .with_retry_policy(retry.clone());
            let runner: Arc<dyn CrewRunner> = Arc::new(department_crew);
            Ok(runner)
        };
        Ok(Self::new(
            crew(Department::Technical)?,
            crew(Department::Finance)?,
            crew(Department::Compliance)?,
            crew(Department::Marketing)?,
            report_path,
        ))
    }

    /// Run Finance and Compliance one after the other instead of concurrently.
    pub fn with_parallel_departments(mut self, parallel: bool) -> Self {
        self.parallel_departments = parallel;
        self
    }

    /// Run every stage and return the path of the written report.
    pub async fn kickoff(&self, ceo_request: &str) -> CompanyResult<PathBuf> {
        let state = self.run(ceo_request).await?;
        Ok(state.final_report_path()?.to_path_buf())
    }

    /// Run every stage and return the finalized state.
    pub async fn run(&self, ceo_request: &str) -> CompanyResult<OrganizationState> {
        let start = Instant::now();
        let mut state = OrganizationState::new(ceo_request)?;
        info!(request_chars = state.ceo_request().len(), "Flow started");

        self.technical_stage(&mut state).await?;
        self.finance_compliance_stage(&mut state).await?;
        self.marketing_stage(&mut state).await?;
        self.finalize(&mut state).await?;

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            report = %self.report_path.display(),
            "Flow finished"
        );
        Ok(state)
    }

    async fn technical_stage(&self, state: &mut OrganizationState) -> CompanyResult<()> {
        let output = run_crew(self.technical.as_ref(), state.ceo_request()).await?;
        state.record_technical(output)
    }

    async fn finance_compliance_stage(&self, state: &mut OrganizationState) -> CompanyResult<()> {
        let request = state.ceo_request();
        let (finance, compliance) = if self.parallel_departments {
            tokio::try_join!(
                run_crew(self.finance.as_ref(), request),
                run_crew(self.compliance.as_ref(), request),
            )?
        } else {
            (
                run_crew(self.finance.as_ref(), request).await?,
                run_crew(self.compliance.as_ref(), request).await?,
            )
        };
        state.record_finance_compliance(finance, compliance)
    }

    async fn marketing_stage(&self, state: &mut OrganizationState) -> CompanyResult<()> {
        let output = run_crew(self.marketing.as_ref(), state.ceo_request()).await?;
        state.record_marketing(output)
    }

    async fn finalize(&self, state: &mut OrganizationState) -> CompanyResult<()> {
        let report = render_report(state)?;
        write_report(&self.report_path, &report).await?;
        state.record_report(self.report_path.clone())
    }
}

async fn run_crew(crew: &dyn CrewRunner, request: &str) -> CompanyResult<String> {
    let start = Instant::now();
    info!(crew = crew.name(), "Crew started");
    match crew.run(request).await {
        Ok(output) => {
            info!(
                crew = crew.name(),
                chars = output.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Crew completed"
            );
            Ok(output)
        }
        Err(e) => {
            error!(crew = crew.name(), error = %e, "Crew failed");
            Err(e)
        }
    }
}
