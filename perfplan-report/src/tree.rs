//! Report Tree
//!
//! Hierarchical result of a plan run: plan → group → suite → case. Case nodes
//! carry the entries and attachments recorded through a [`CaseResult`]; the
//! structure is fixed once built and handed to plugins read-only.

use crate::sink::{CaseEntry, CaseResult};
use crate::value::ValueMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Level of a node in the report tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// Root of a run
    Plan,
    /// One (engine, test type) unit
    Group,
    /// Suite inside a group
    Suite,
    /// Leaf test case
    Case,
}

/// Pass/fail status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Every assertion below this node passed
    Passed,
    /// At least one assertion below this node failed
    Failed,
}

/// A named node of the report tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportNode {
    /// Node name
    pub name: String,
    /// Tree level
    pub category: NodeCategory,
    /// Log lines and assertions (case nodes only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<CaseEntry>,
    /// Named raw-data attachments (case nodes only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attachments: BTreeMap<String, ValueMap>,
    /// Child nodes in insertion order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportNode>,
}

impl ReportNode {
    /// Create an empty node
    pub fn new(name: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            name: name.into(),
            category,
            entries: Vec::new(),
            attachments: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a case node from a recorded result
    pub fn case(name: impl Into<String>, result: CaseResult) -> Self {
        Self {
            name: name.into(),
            category: NodeCategory::Case,
            entries: result.entries,
            attachments: result.attachments,
            children: Vec::new(),
        }
    }

    /// Builder-style child insertion
    pub fn with_child(mut self, child: ReportNode) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attachment by key
    pub fn attachment(&self, key: &str) -> Option<&ValueMap> {
        self.attachments.get(key)
    }

    /// Status derived from own assertions and all descendants
    pub fn status(&self) -> NodeStatus {
        let own_failed = self.entries.iter().any(|e| match e {
            CaseEntry::Assertion(a) => !a.passed,
            CaseEntry::Log { .. } => false,
        });

        if own_failed
            || self
                .children
                .iter()
                .any(|c| c.status() == NodeStatus::Failed)
        {
            NodeStatus::Failed
        } else {
            NodeStatus::Passed
        }
    }

    /// All case nodes below (and including) this node, depth-first
    pub fn cases(&self) -> Vec<&ReportNode> {
        let mut out = Vec::new();
        self.collect_cases(&mut out);
        out
    }

    fn collect_cases<'a>(&'a self, out: &mut Vec<&'a ReportNode>) {
        if self.category == NodeCategory::Case {
            out.push(self);
        }
        for child in &self.children {
            child.collect_cases(out);
        }
    }
}

/// Run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Harness version
    pub version: String,
    /// Start of the run
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run
    pub total_duration_ms: f64,
}

impl ReportMeta {
    /// Metadata stamped with the current time and a zero duration
    pub fn now() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            total_duration_ms: 0.0,
        }
    }
}

/// Case counts over a whole tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of case nodes
    pub total_cases: usize,
    /// Cases with no failed assertion
    pub passed: usize,
    /// Cases with at least one failed assertion
    pub failed: usize,
}

/// Completed report of a plan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTree {
    /// Run metadata
    pub meta: ReportMeta,
    /// Plan node
    pub root: ReportNode,
}

impl ReportTree {
    /// Wrap a plan node
    pub fn new(root: ReportNode, meta: ReportMeta) -> Self {
        Self { meta, root }
    }

    /// Overall status of the plan
    pub fn status(&self) -> NodeStatus {
        self.root.status()
    }

    /// Count passed and failed cases
    pub fn summary(&self) -> ReportSummary {
        self.root
            .cases()
            .into_iter()
            .fold(ReportSummary::default(), |mut acc, case| {
                acc.total_cases += 1;
                match case.status() {
                    NodeStatus::Passed => acc.passed += 1,
                    NodeStatus::Failed => acc.failed += 1,
                }
                acc
            })
    }
}
