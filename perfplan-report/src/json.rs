//! JSON Output

use crate::aggregate::AggregateSummary;
use crate::tree::ReportTree;

/// Generate a prettified JSON document of the full report tree.
pub fn generate_json_report(report: &ReportTree) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Generate a prettified JSON document of an aggregate summary.
pub fn generate_json_summary(summary: &AggregateSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}
