//! Per-test summary of the attached raw data, rendered as text, JSON or CSV.

use super::{Plugin, PluginError, PluginOptions, validate_options};
use perfplan_report::{OutputFormat, ReportTree, render_summary, summarize_report};
use std::path::PathBuf;

/// Summarizes every case's raw series once the plan completes
#[derive(Debug)]
pub struct DataReporterPlugin {
    output_file: Option<PathBuf>,
    format: OutputFormat,
    last_rendered: Option<String>,
}

impl DataReporterPlugin {
    /// Plugin name
    pub const NAME: &'static str = "data_reporter";

    const OPTIONS: &'static [&'static str] = &["output_file", "report_format"];

    /// Build from `output_file` and `report_format` (`text|json|csv`) options
    pub fn new(options: &PluginOptions) -> Result<Self, PluginError> {
        validate_options(Self::NAME, options, Self::OPTIONS)?;

        let format = match options.get("report_format") {
            Some(value) => value.parse().map_err(|_| PluginError::InvalidOption {
                plugin: Self::NAME.to_string(),
                option: "report_format".to_string(),
                value: value.clone(),
            })?,
            None => OutputFormat::Text,
        };

        Ok(Self {
            output_file: options.get("output_file").map(PathBuf::from),
            format,
            last_rendered: None,
        })
    }

    /// Output of the most recent `test_plan_result`
    pub fn last_rendered(&self) -> Option<&str> {
        self.last_rendered.as_deref()
    }
}

impl Plugin for DataReporterPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn test_plan_result(&mut self, report: &ReportTree) -> Result<(), PluginError> {
        tracing::info!("--- Test Plan Result Processed by DataReporterPlugin ---");

        let summary = summarize_report(report);
        let rendered =
            render_summary(&summary, self.format).map_err(|e| PluginError::Hook(e.to_string()))?;

        for line in rendered.lines() {
            tracing::info!("{}", line);
        }

        if let Some(path) = &self.output_file {
            std::fs::write(path, &rendered)?;
            tracing::info!(path = %path.display(), "wrote data report");
        }

        self.last_rendered = Some(rendered);
        Ok(())
    }
}
