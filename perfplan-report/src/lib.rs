#![warn(missing_docs)]
//! perfplan Report - Result Tree and Aggregation
//!
//! - [`ResultSink`] / [`CaseResult`]: non-raising assertions, log lines, attachments
//! - [`ReportTree`]: plan → group → suite → case hierarchy handed to plugins
//! - [`summarize_report`]: depth-first extraction of attached raw series
//! - Text, JSON and CSV renderings of aggregate summaries

mod aggregate;
mod csv;
mod json;
mod sink;
mod text;
mod tree;
mod value;

pub use aggregate::{
    AggregateSummary, CaseSummary, LATENCY_ATTACHMENT, LATENCY_SERIES, STRESS_ATTACHMENT,
    STRESS_SERIES, WELL_KNOWN_SERIES, summarize_report,
};
pub use csv::{CSV_HEADER, generate_csv_summary};
pub use json::{generate_json_report, generate_json_summary};
pub use sink::{Assertion, CaseEntry, CaseResult, ResultSink};
pub use text::generate_text_summary;
pub use tree::{NodeCategory, NodeStatus, ReportMeta, ReportNode, ReportSummary, ReportTree};
pub use value::{RawValue, ValueMap};

/// Output format for rendered summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented plain text
    Text,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "human" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Render an aggregate summary in the requested format
pub fn render_summary(
    summary: &AggregateSummary,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(generate_text_summary(summary)),
        OutputFormat::Json => generate_json_summary(summary),
        OutputFormat::Csv => Ok(generate_csv_summary(summary)),
    }
}
