//! Publishes per-case data point counts and ranges to the log.

use super::{Plugin, PluginError, PluginOptions, validate_options};
use perfplan_core::RawResult;
use perfplan_report::{ReportTree, summarize_report};

/// Logs a "publish" line per summarized case plus a grand total
#[derive(Debug, Default)]
pub struct MetricReporterPlugin {
    completed_runs: usize,
    last_total: Option<usize>,
}

impl MetricReporterPlugin {
    /// Plugin name
    pub const NAME: &'static str = "metric_reporter";

    /// Build the plugin; it takes no options
    pub fn new(options: &PluginOptions) -> Result<Self, PluginError> {
        validate_options(Self::NAME, options, &[])?;
        Ok(Self::default())
    }

    /// Data points published by the most recent `test_plan_result`
    pub fn last_total(&self) -> Option<usize> {
        self.last_total
    }

    /// Runs observed through `on_test_complete`
    pub fn completed_runs(&self) -> usize {
        self.completed_runs
    }
}

impl Plugin for MetricReporterPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_test_complete(&mut self, result: &RawResult) -> Result<(), PluginError> {
        self.completed_runs += 1;
        tracing::debug!(
            engine = %result.engine_name,
            test_type = %result.test_type,
            iterations = result.iterations,
            aborted = result.aborted,
            "run observed"
        );
        Ok(())
    }

    fn test_plan_result(&mut self, report: &ReportTree) -> Result<(), PluginError> {
        let summary = summarize_report(report);

        for entry in &summary.entries {
            tracing::info!(
                "Publishing {} data points for {} (min {:.3} ms, max {:.3} ms)",
                entry.stats.count,
                entry.test_id,
                entry.stats.min,
                entry.stats.max
            );
        }
        tracing::info!(
            "Published {} data points across {} tests",
            summary.total_points,
            summary.entries.len()
        );

        self.last_total = Some(summary.total_points);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfplan_report::{
        CaseResult, NodeCategory, ReportMeta, ReportNode, ResultSink, STRESS_ATTACHMENT,
        STRESS_SERIES, ValueMap,
    };

    #[test]
    fn test_counts_points() {
        let mut case = CaseResult::new();
        let mut body = ValueMap::new();
        body.insert(STRESS_SERIES.into(), vec![1.0; 10].into());
        case.attach(STRESS_ATTACHMENT, body);
        let root = ReportNode::new("Plan", NodeCategory::Plan).with_child(
            ReportNode::new("BetaEngine_stress", NodeCategory::Group)
                .with_child(ReportNode::case("run_performance_test", case)),
        );

        let mut plugin = MetricReporterPlugin::new(&PluginOptions::new()).unwrap();
        assert_eq!(plugin.last_total(), None);
        plugin
            .test_plan_result(&ReportTree::new(root, ReportMeta::now()))
            .unwrap();
        assert_eq!(plugin.last_total(), Some(10));
    }

    #[test]
    fn test_takes_no_options() {
        let mut options = PluginOptions::new();
        options.insert("endpoint".into(), "http://localhost".into());
        assert!(MetricReporterPlugin::new(&options).is_err());
    }

    #[test]
    fn test_observes_completed_runs() {
        let mut plugin = MetricReporterPlugin::default();
        plugin
            .on_test_complete(&RawResult::new("latency", "AlphaEngine"))
            .unwrap();
        assert_eq!(plugin.completed_runs(), 1);
    }
}
