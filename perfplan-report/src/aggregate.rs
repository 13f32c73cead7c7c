//! Report Aggregation
//!
//! Walks a completed report tree, pulls raw series out of well-known case
//! attachments and reduces each one to `{count, min, max, mean}`.
//!
//! ```text
//! plan
//!  └─ group ("AlphaEngine_latency")
//!      └─ suite
//!          └─ case ("run_performance_test")
//!               attachments["LatencyRawData"]["latency_data_ms"] ─▶ SeriesSummary
//! ```
//!
//! Every call builds its own result; plugins never share aggregation state.

use crate::tree::{NodeCategory, ReportNode, ReportTree};
use perfplan_stats::{SeriesSummary, compute_summary};
use serde::{Deserialize, Serialize};

/// Attachment key written by the latency strategy
pub const LATENCY_ATTACHMENT: &str = "LatencyRawData";
/// Series key inside [`LATENCY_ATTACHMENT`]
pub const LATENCY_SERIES: &str = "latency_data_ms";
/// Attachment key written by the stress strategy
pub const STRESS_ATTACHMENT: &str = "StressRawData";
/// Per-round total series inside [`STRESS_ATTACHMENT`]
pub const STRESS_SERIES: &str = "stress_data_ms";

/// Attachment/series pairs looked up on every case, first match wins
pub const WELL_KNOWN_SERIES: &[(&str, &str)] = &[
    (LATENCY_ATTACHMENT, LATENCY_SERIES),
    (STRESS_ATTACHMENT, STRESS_SERIES),
];

/// Summary of one case's raw series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    /// `"<group-name>/<case-name>"`
    pub test_id: String,
    /// Enclosing group name (engine and test type)
    pub group: String,
    /// Case name
    pub case: String,
    /// Attachment the series came from
    pub attachment: String,
    /// Reduced series
    pub stats: SeriesSummary,
}

/// Result of walking a whole tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// One entry per case with data, in tree order
    pub entries: Vec<CaseSummary>,
    /// Raw data points processed across the tree
    pub total_points: usize,
}

impl AggregateSummary {
    /// Look up a summary by `"<group>/<case>"`
    pub fn get(&self, test_id: &str) -> Option<&CaseSummary> {
        self.entries.iter().find(|e| e.test_id == test_id)
    }

    /// Whether any data was found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summarize every case of a report tree
pub fn summarize_report(tree: &ReportTree) -> AggregateSummary {
    let mut summary = AggregateSummary::default();
    walk(&tree.root, None, &mut summary);
    summary
}

fn walk<'a>(node: &'a ReportNode, group: Option<&'a str>, out: &mut AggregateSummary) {
    let group = if node.category == NodeCategory::Group {
        Some(node.name.as_str())
    } else {
        group
    };

    if node.category == NodeCategory::Case {
        if let Some((attachment, series)) = find_series(node) {
            let group = group.unwrap_or("");
            out.total_points += series.len();
            out.entries.push(CaseSummary {
                test_id: format!("{}/{}", group, node.name),
                group: group.to_string(),
                case: node.name.clone(),
                attachment: attachment.to_string(),
                stats: compute_summary(series),
            });
        }
    }

    for child in &node.children {
        walk(child, group, out);
    }
}

/// First non-empty well-known series attached to a case
fn find_series(node: &ReportNode) -> Option<(&'static str, &[f64])> {
    WELL_KNOWN_SERIES.iter().find_map(|(key, field)| {
        node.attachment(key)
            .and_then(|body| body.get(*field))
            .and_then(|v| v.as_series())
            .filter(|s| !s.is_empty())
            .map(|s| (*key, s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{CaseResult, ResultSink};
    use crate::tree::ReportMeta;
    use crate::value::ValueMap;

    fn case_with(key: &str, field: &str, series: Vec<f64>) -> ReportNode {
        let mut result = CaseResult::new();
        let mut body = ValueMap::new();
        body.insert(field.to_string(), series.into());
        result.attach(key, body);
        ReportNode::case("run_performance_test", result)
    }

    fn group(name: &str, case: ReportNode) -> ReportNode {
        ReportNode::new(name, NodeCategory::Group)
            .with_child(ReportNode::new("PerformanceSuite", NodeCategory::Suite).with_child(case))
    }

    #[test]
    fn test_summarizes_latency_and_stress() {
        let root = ReportNode::new("plan", NodeCategory::Plan)
            .with_child(group(
                "Alpha_latency",
                case_with(LATENCY_ATTACHMENT, LATENCY_SERIES, vec![1.0, 2.0, 3.0]),
            ))
            .with_child(group(
                "Alpha_stress",
                case_with(STRESS_ATTACHMENT, STRESS_SERIES, vec![4.0, 6.0]),
            ));
        let summary = summarize_report(&ReportTree::new(root, ReportMeta::now()));

        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.total_points, 5);

        let latency = summary.get("Alpha_latency/run_performance_test").unwrap();
        assert_eq!(latency.stats.count, 3);
        assert_eq!(latency.stats.min, 1.0);
        assert_eq!(latency.stats.max, 3.0);
        assert!((latency.stats.mean - 2.0).abs() < f64::EPSILON);
        assert_eq!(latency.attachment, LATENCY_ATTACHMENT);

        let stress = summary.get("Alpha_stress/run_performance_test").unwrap();
        assert!((stress.stats.mean - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skips_missing_and_empty_series() {
        let root = ReportNode::new("plan", NodeCategory::Plan)
            .with_child(group(
                "Alpha_latency",
                case_with(LATENCY_ATTACHMENT, LATENCY_SERIES, vec![]),
            ))
            .with_child(group(
                "Beta_latency",
                case_with("OtherData", LATENCY_SERIES, vec![1.0]),
            ));
        let summary = summarize_report(&ReportTree::new(root, ReportMeta::now()));

        assert!(summary.is_empty());
        assert_eq!(summary.total_points, 0);
    }
}
