#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use company_core::{CompanyError, CompanyResult};
use company_crew::CrewRunner;
use company_flow::{FlowStage, OrganizationFlow, REPORT_TITLE};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared, ordered log of crew starts and finishes.
type Journal = Arc<Mutex<Vec<String>>>;

struct SpyCrew {
    name: &'static str,
    output: Option<&'static str>,
    delay: Duration,
    journal: Journal,
    requests: Mutex<Vec<String>>,
}

impl SpyCrew {
    fn new(name: &'static str, output: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name,
            output: Some(output),
            delay: Duration::ZERO,
            journal: journal.clone(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(name: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name,
            output: None,
            delay: Duration::ZERO,
            journal: journal.clone(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn slow(
        name: &'static str,
        output: &'static str,
        delay_ms: u64,
        journal: &Journal,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            output: Some(output),
            delay: Duration::from_millis(delay_ms),
            journal: journal.clone(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrewRunner for SpyCrew {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, request: &str) -> CompanyResult<String> {
        self.requests.lock().unwrap().push(request.to_string());
        self.journal.lock().unwrap().push(format!("start {}", self.name));
        tokio::time::sleep(self.delay).await;
        self.journal.lock().unwrap().push(format!("end {}", self.name));
        self.output
            .map(String::from)
            .ok_or_else(|| CompanyError::CrewExecution {
                crew: self.name.to_string(),
                task: "gate".to_string(),
                reason: "agent returned an empty output".to_string(),
            })
    }
}

struct Company {
    technical: Arc<SpyCrew>,
    finance: Arc<SpyCrew>,
    compliance: Arc<SpyCrew>,
    marketing: Arc<SpyCrew>,
    journal: Journal,
}

impl Company {
    fn healthy() -> Self {
        let journal: Journal = Arc::default();
        Self {
            technical: SpyCrew::new("Technical Crew", "GO: ship the MVP", &journal),
            finance: SpyCrew::new("Finance Crew", "APPROVED at $90k", &journal),
            compliance: SpyCrew::new("Compliance Crew", "PASS WITH CONDITIONS", &journal),
            marketing: SpyCrew::new("Marketing Crew", "Launch messaging approved", &journal),
            journal,
        }
    }

    fn flow(&self, report: &Path) -> OrganizationFlow {
        OrganizationFlow::new(
            self.technical.clone(),
            self.finance.clone(),
            self.compliance.clone(),
            self.marketing.clone(),
            report,
        )
    }

    fn total_runs(&self) -> usize {
        [&self.technical, &self.finance, &self.compliance, &self.marketing]
            .iter()
            .map(|c| c.requests().len())
            .sum()
    }
}

#[tokio::test]
async fn test_budgeting_app_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("artifacts/reports/final_orchestration_report.md");
    let company = Company::healthy();

    let returned = company
        .flow(&report_path)
        .kickoff("Launch a budgeting app")
        .await
        .unwrap();
    assert_eq!(returned, report_path);

    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.starts_with(REPORT_TITLE));
    assert!(report.contains("## CEO Request\nLaunch a budgeting app"));
    for output in [
        "GO: ship the MVP",
        "APPROVED at $90k",
        "PASS WITH CONDITIONS",
        "Launch messaging approved",
    ] {
        assert!(report.contains(output), "missing {output}");
    }

    for crew in [&company.technical, &company.finance, &company.compliance, &company.marketing] {
        assert_eq!(crew.requests(), vec!["Launch a budgeting app"]);
    }
}

#[tokio::test]
async fn test_request_is_trimmed_before_crews_see_it() {
    let dir = tempfile::tempdir().unwrap();
    let company = Company::healthy();
    let state = company
        .flow(&dir.path().join("report.md"))
        .run("  Launch a budgeting app\n")
        .await
        .unwrap();
    assert_eq!(state.stage(), FlowStage::Finalized);
    assert_eq!(company.marketing.requests(), vec!["Launch a budgeting app"]);
}

#[tokio::test]
async fn test_blank_request_runs_no_crew() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.md");
    let company = Company::healthy();

    for request in ["", "   \t\n"] {
        let err = company.flow(&report_path).kickoff(request).await.unwrap_err();
        assert!(matches!(err, CompanyError::Validation(ref m) if m == "CEO request is required."));
    }
    assert_eq!(company.total_runs(), 0);
    assert!(!report_path.exists());
}

#[tokio::test]
async fn test_stages_respect_dependencies() {
    let dir = tempfile::tempdir().unwrap();
    let company = Company::healthy();
    company
        .flow(&dir.path().join("report.md"))
        .kickoff("r")
        .await
        .unwrap();

    let journal = company.journal.lock().unwrap().clone();
    let at = |entry: &str| journal.iter().position(|e| e == entry).unwrap();
    assert_eq!(at("start Technical Crew"), 0);
    assert!(at("end Technical Crew") < at("start Finance Crew"));
    assert!(at("end Technical Crew") < at("start Compliance Crew"));
    assert!(at("end Finance Crew") < at("start Marketing Crew"));
    assert!(at("end Compliance Crew") < at("start Marketing Crew"));
}

#[tokio::test]
async fn test_finance_and_compliance_run_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let journal: Journal = Arc::default();
    let company = Company {
        technical: SpyCrew::new("Technical Crew", "t", &journal),
        finance: SpyCrew::slow("Finance Crew", "f", 100, &journal),
        compliance: SpyCrew::slow("Compliance Crew", "c", 100, &journal),
        marketing: SpyCrew::new("Marketing Crew", "m", &journal),
        journal,
    };
    company
        .flow(&dir.path().join("report.md"))
        .kickoff("r")
        .await
        .unwrap();

    let journal = company.journal.lock().unwrap().clone();
    let at = |entry: &str| journal.iter().position(|e| e == entry).unwrap();
    assert!(at("start Compliance Crew") < at("end Finance Crew"));
    assert!(at("start Finance Crew") < at("end Compliance Crew"));
}

#[tokio::test]
async fn test_sequential_departments() {
    let dir = tempfile::tempdir().unwrap();
    let company = Company::healthy();
    company
        .flow(&dir.path().join("report.md"))
        .with_parallel_departments(false)
        .kickoff("r")
        .await
        .unwrap();

    let journal = company.journal.lock().unwrap().clone();
    let at = |entry: &str| journal.iter().position(|e| e == entry).unwrap();
    assert!(at("end Finance Crew") < at("start Compliance Crew"));
}

#[tokio::test]
async fn test_crew_failure_aborts_without_report() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.md");
    let journal: Journal = Arc::default();
    let company = Company {
        technical: SpyCrew::new("Technical Crew", "t", &journal),
        finance: SpyCrew::new("Finance Crew", "f", &journal),
        compliance: SpyCrew::failing("Compliance Crew", &journal),
        marketing: SpyCrew::new("Marketing Crew", "m", &journal),
        journal,
    };

    let err = company.flow(&report_path).kickoff("r").await.unwrap_err();
    assert!(matches!(
        err,
        CompanyError::CrewExecution { ref crew, .. } if crew == "Compliance Crew"
    ));
    assert!(company.marketing.requests().is_empty());
    assert!(!report_path.exists());
}
