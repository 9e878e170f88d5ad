use crate::config::CrewConfig;
use crate::crew::Crew;
use crate::departments::Department;
use crate::executor::TaskExecutor;
use async_trait::async_trait;
use company_agent::RetryPolicy;
use company_core::CompanyResult;
use company_tools::ToolRegistry;
use std::path::Path;
use std::sync::Arc;

/// A crew as the flow sees it: request in, final text out.
#[async_trait]
pub trait CrewRunner: Send + Sync {
    /// Crew name for logs and errors.
    fn name(&self) -> &str;

    /// Run the crew on `request` and return its final output.
    async fn run(&self, request: &str) -> CompanyResult<String>;
}

/// Runs one [`Department`]'s crew. The crew is rebuilt on every run so
/// agent specs never outlive it.
pub struct DepartmentCrew {
    department: Department,
    config: CrewConfig,
    executor: Arc<dyn TaskExecutor>,
    registry: Arc<ToolRegistry>,
    retry: RetryPolicy,
}

impl DepartmentCrew {
    /// Load the department's configuration and check that it builds.
    pub fn new(
        department: Department,
        config_dir: Option<&Path>,
        executor: Arc<dyn TaskExecutor>,
        registry: Arc<ToolRegistry>,
    ) -> CompanyResult<Self> {
        let config = department.load_config(config_dir)?;
        department.build_crew(&config, executor.clone(), registry.clone())?;
        Ok(Self {
            department,
            config,
            executor,
            registry,
            retry: RetryPolicy::default(),
        })
    }

    /// Retry policy handed to every crew built for a run.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn crew(&self) -> CompanyResult<Crew> {
        Ok(self
            .department
            .build_crew(&self.config, self.executor.clone(), self.registry.clone())?
            .with_retry_policy(self.retry.clone()))
    }
}

#[async_trait]
impl CrewRunner for DepartmentCrew {
    fn name(&self) -> &str {
        self.department.crew_name()
    }

    async fn run(&self, request: &str) -> CompanyResult<String> {
        let output = self.crew()?.kickoff(request).await?;
        Ok(output.output)
    }
}
