//! The company orchestration flow.
//!
//! [`OrganizationFlow`] drives four crews through a fixed pipeline and
//! threads their outputs through an [`OrganizationState`]:
//!
//! ```text
//! request -> Technical -> (Finance, Compliance) -> Marketing -> report
//! ```
//!
//! The report is written only when every stage succeeded.

/// The four-stage flow.
pub mod flow;
/// Markdown report rendering.
pub mod report;
/// Per-run state and stage transitions.
pub mod state;

pub use flow::OrganizationFlow;
pub use report::{render_report, write_report, DEFAULT_REPORT_PATH, REPORT_TITLE};
pub use state::{FlowStage, OrganizationState};
