//! Human-readable rendering of analysis and run results.
pub mod report;

pub use report::{format_report, AuditSummary};
