use company_core::{CompanyError, CompanyResult};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Position of a run in the flow. Stages only move forward, one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FlowStage {
    /// Request accepted, nothing run yet.
    Start,
    /// Technical crew output recorded.
    TechnicalDone,
    /// Finance and Compliance outputs recorded.
    FinanceComplianceDone,
    /// Marketing crew output recorded.
    MarketingDone,
    /// Report written.
    Finalized,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStage::Start => "start",
            FlowStage::TechnicalDone => "technical_done",
            FlowStage::FinanceComplianceDone => "finance_compliance_done",
            FlowStage::MarketingDone => "marketing_done",
            FlowStage::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// Shared state of one flow run. Each output slot is written exactly once,
/// by its own stage.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationState {
    ceo_request: String,
    stage: FlowStage,
    technical_output: Option<String>,
    finance_output: Option<String>,
    compliance_output: Option<String>,
    marketing_output: Option<String>,
    final_report_path: Option<PathBuf>,
}

impl OrganizationState {
    /// Start a run. The request is trimmed and must not be empty.
    pub fn new(ceo_request: &str) -> CompanyResult<Self> {
        let ceo_request = ceo_request.trim();
        if ceo_request.is_empty() {
            return Err(CompanyError::Validation("CEO request is required.".to_string()));
        }
        Ok(Self {
            ceo_request: ceo_request.to_string(),
            stage: FlowStage::Start,
            technical_output: None,
            finance_output: None,
            compliance_output: None,
            marketing_output: None,
            final_report_path: None,
        })
    }

    /// The trimmed CEO request.
    pub fn ceo_request(&self) -> &str {
        &self.ceo_request
    }

    /// Current stage.
    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    /// Store the Technical output; only valid at [`FlowStage::Start`].
    pub fn record_technical(&mut self, output: String) -> CompanyResult<()> {
        self.expect_stage(FlowStage::Start)?;
        write_once(&mut self.technical_output, "technical_output", output)?;
        self.stage = FlowStage::TechnicalDone;
        Ok(())
    }

    /// Both fan-out outputs land together, after the join.
    pub fn record_finance_compliance(
        &mut self,
        finance: String,
        compliance: String,
    ) -> CompanyResult<()> {
        self.expect_stage(FlowStage::TechnicalDone)?;
        write_once(&mut self.finance_output, "finance_output", finance)?;
        write_once(&mut self.compliance_output, "compliance_output", compliance)?;
        self.stage = FlowStage::FinanceComplianceDone;
        Ok(())
    }

    /// Store the Marketing output once both fan-out outputs are in.
    pub fn record_marketing(&mut self, output: String) -> CompanyResult<()> {
        self.expect_stage(FlowStage::FinanceComplianceDone)?;
        write_once(&mut self.marketing_output, "marketing_output", output)?;
        self.stage = FlowStage::MarketingDone;
        Ok(())
    }

    /// Record where the report was written and finish the run.
    pub fn record_report(&mut self, path: PathBuf) -> CompanyResult<()> {
        self.expect_stage(FlowStage::MarketingDone)?;
        write_once(&mut self.final_report_path, "final_report_path", path)?;
        self.stage = FlowStage::Finalized;
        Ok(())
    }

    /// Technical crew output; an error before it is recorded.
    pub fn technical_output(&self) -> CompanyResult<&str> {
        read_slot(&self.technical_output, "technical_output")
    }

    /// Finance crew output.
    pub fn finance_output(&self) -> CompanyResult<&str> {
        read_slot(&self.finance_output, "finance_output")
    }

    /// Compliance crew output.
    pub fn compliance_output(&self) -> CompanyResult<&str> {
        read_slot(&self.compliance_output, "compliance_output")
    }

    /// Marketing crew output.
    pub fn marketing_output(&self) -> CompanyResult<&str> {
        read_slot(&self.marketing_output, "marketing_output")
    }

    /// Path of the written report.
    pub fn final_report_path(&self) -> CompanyResult<&Path> {
        self.final_report_path.as_deref().ok_or_else(|| {
            CompanyError::Flow("final_report_path read before it was written".to_string())
        })
    }

    fn expect_stage(&self, expected: FlowStage) -> CompanyResult<()> {
        if self.stage != expected {
            return Err(CompanyError::Flow(format!(
                "invalid transition: expected stage {expected}, flow is at {}",
                self.stage
            )));
        }
        Ok(())
    }
}

fn write_once<T>(slot: &mut Option<T>, field: &str, value: T) -> CompanyResult<()> {
    if slot.is_some() {
        return Err(CompanyError::Flow(format!("{field} already written")));
    }
    *slot = Some(value);
    Ok(())
}

fn read_slot<'a>(slot: &'a Option<String>, field: &str) -> CompanyResult<&'a str> {
    slot.as_deref()
        .ok_or_else(|| CompanyError::Flow(format!("{field} read before it was written")))
}
