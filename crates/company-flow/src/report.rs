use crate::state::OrganizationState;
use company_core::CompanyResult;
use std::path::Path;
use tracing::info;

/// First line of every report.
pub const REPORT_TITLE: &str = "# AI Company Orchestration Report";

/// Default location of the final report, relative to the working directory.
pub const DEFAULT_REPORT_PATH: &str = "artifacts/reports/final_orchestration_report.md";

/// Render the Markdown report. Every stage output must already be recorded.
pub fn render_report(state: &OrganizationState) -> CompanyResult<String> {
    let sections = [
        ("CEO Request", state.ceo_request()),
        ("Technical Crew Output", state.technical_output()?),
        ("Finance Crew Output", state.finance_output()?),
        ("Compliance Crew Output", state.compliance_output()?),
        ("Marketing Crew Output", state.marketing_output()?),
    ];

    let mut lines = vec![REPORT_TITLE.to_string(), String::new()];
    for (heading, body) in sections {
        lines.push(format!("## {heading}"));
        lines.push(body.trim_end().to_string());
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

/// Write the report, creating parent directories.
pub async fn write_report(path: &Path, content: &str) -> CompanyResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), bytes = content.len(), "Report written");
    Ok(())
}
