//! Result Sink
//!
//! Records log lines, assertion verdicts and attachments for one test case.
//! Assertions never raise: a failed check is recorded and execution continues,
//! so every finding of a run is reported, not just the first one.

use crate::value::{RawValue, ValueMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Destination for verdicts produced while analyzing a run
pub trait ResultSink {
    /// Record a log line
    fn log(&mut self, message: String);

    /// Record a generic pass/fail assertion; returns the verdict
    fn assert_true(&mut self, condition: bool, description: &str) -> bool;

    /// Record `actual < bound`; returns the verdict
    fn assert_less(&mut self, actual: f64, bound: f64, description: &str) -> bool;

    /// Record `actual == expected`; returns the verdict
    fn assert_equal(&mut self, actual: &RawValue, expected: &RawValue, description: &str) -> bool;

    /// Record an unconditional failure (e.g. the run itself errored)
    fn fail(&mut self, description: &str);

    /// Attach a named raw-data blob, replacing any previous one with that key
    fn attach(&mut self, key: &str, body: ValueMap);
}

/// A recorded assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    /// Human-readable description of the criterion
    pub description: String,
    /// Verdict
    pub passed: bool,
    /// Comparison detail, e.g. `0.214 < 1.0`
    pub detail: String,
}

/// One entry in a case's result log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CaseEntry {
    /// Free-form log line
    Log {
        /// Message text
        message: String,
    },
    /// Assertion verdict
    Assertion(Assertion),
}

/// Result of a single test case: ordered entries plus attachments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseResult {
    /// Log lines and assertions in recording order
    pub entries: Vec<CaseEntry>,
    /// Named attachments
    pub attachments: BTreeMap<String, ValueMap>,
}

impl CaseResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded assertions
    pub fn assertions(&self) -> impl Iterator<Item = &Assertion> {
        self.entries.iter().filter_map(|e| match e {
            CaseEntry::Assertion(a) => Some(a),
            CaseEntry::Log { .. } => None,
        })
    }

    /// Recorded assertions that failed
    pub fn failed_assertions(&self) -> impl Iterator<Item = &Assertion> {
        self.assertions().filter(|a| !a.passed)
    }

    /// Recorded log lines
    pub fn logs(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            CaseEntry::Log { message } => Some(message.as_str()),
            CaseEntry::Assertion(_) => None,
        })
    }

    /// A case passes when no assertion failed
    pub fn passed(&self) -> bool {
        self.failed_assertions().next().is_none()
    }

    fn record(&mut self, description: &str, passed: bool, detail: String) -> bool {
        if !passed {
            tracing::warn!(%description, %detail, "assertion failed");
        }
        self.entries.push(CaseEntry::Assertion(Assertion {
            description: description.to_string(),
            passed,
            detail,
        }));
        passed
    }
}

impl ResultSink for CaseResult {
    fn log(&mut self, message: String) {
        tracing::debug!(%message, "case log");
        self.entries.push(CaseEntry::Log { message });
    }

    fn assert_true(&mut self, condition: bool, description: &str) -> bool {
        self.record(description, condition, format!("{}", condition))
    }

    fn assert_less(&mut self, actual: f64, bound: f64, description: &str) -> bool {
        self.record(description, actual < bound, format!("{:.3} < {}", actual, bound))
    }

    fn assert_equal(&mut self, actual: &RawValue, expected: &RawValue, description: &str) -> bool {
        self.record(
            description,
            actual == expected,
            format!("{:?} == {:?}", actual, expected),
        )
    }

    fn fail(&mut self, description: &str) {
        self.record(description, false, "failed".to_string());
    }

    fn attach(&mut self, key: &str, body: ValueMap) {
        self.attachments.insert(key.to_string(), body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertions_accumulate() {
        let mut case = CaseResult::new();

        assert!(!case.assert_less(2.0, 1.0, "first"));
        assert!(case.assert_less(0.5, 1.0, "second"));
        assert!(!case.assert_true(false, "third"));

        assert_eq!(case.assertions().count(), 3);
        let failed: Vec<_> = case
            .failed_assertions()
            .map(|a| a.description.as_str())
            .collect();
        assert_eq!(failed, vec!["first", "third"]);
        assert!(!case.passed());
    }

    #[test]
    fn test_assert_equal() {
        let mut case = CaseResult::new();
        assert!(case.assert_equal(&"Alpha".into(), &"Alpha".into(), "engine"));
        assert!(!case.assert_equal(&RawValue::Int(1), &RawValue::Int(2), "count"));
        assert!(!case.passed());
    }

    #[test]
    fn test_logs_and_attachments() {
        let mut case = CaseResult::new();
        case.log("Avg Latency: 0.200 ms".to_string());

        let mut body = ValueMap::new();
        body.insert("latency_data_ms".into(), vec![0.2].into());
        case.attach("LatencyRawData", body);

        assert_eq!(case.logs().collect::<Vec<_>>(), vec!["Avg Latency: 0.200 ms"]);
        assert!(case.attachments.contains_key("LatencyRawData"));
        assert!(case.passed());
    }

    #[test]
    fn test_fail_marks_case() {
        let mut case = CaseResult::new();
        case.fail("Test failed with error: boom");
        assert!(!case.passed());
    }
}
