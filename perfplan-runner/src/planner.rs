//! Test Planner
//!
//! Expands a [`TestPlan`] into the ordered list of (engine, test type) units
//! to execute.
//!
//! - Unit ids are `<engine>_<test_type>`
//! - A repeated unit id is dropped with a warning; the first occurrence wins
//! - An optional regex is matched against the unit id
//!
//! Units keep plan order; nothing is re-sorted.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tests to run against one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Registered engine name
    pub engine: String,
    /// Strategy test types, in execution order
    pub tests: Vec<String>,
}

impl PlanEntry {
    /// Create an entry
    pub fn new(engine: impl Into<String>, tests: &[&str]) -> Self {
        Self {
            engine: engine.into(),
            tests: tests.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Named list of engine/test assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlan {
    /// Plan name, used as the report root
    #[serde(default = "default_plan_name")]
    pub name: String,
    /// Entries in execution order
    #[serde(default = "default_entries")]
    pub entries: Vec<PlanEntry>,
}

impl Default for TestPlan {
    fn default() -> Self {
        Self {
            name: default_plan_name(),
            entries: default_entries(),
        }
    }
}

fn default_plan_name() -> String {
    "TradingEnginePerformancePlan".to_string()
}
fn default_entries() -> Vec<PlanEntry> {
    vec![
        PlanEntry::new("AlphaEngine", &["latency", "stress"]),
        PlanEntry::new("BetaEngine", &["latency", "stress"]),
    ]
}

/// One (engine, test type) pair to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUnit {
    /// `<engine>_<test_type>`
    pub id: String,
    /// Engine name
    pub engine: String,
    /// Strategy test type
    pub test_type: String,
}

impl TestUnit {
    /// Create a unit for an engine and test type
    pub fn new(engine: impl Into<String>, test_type: impl Into<String>) -> Self {
        let engine = engine.into();
        let test_type = test_type.into();
        Self {
            id: format!("{}_{}", engine, test_type),
            engine,
            test_type,
        }
    }
}

/// Expand a plan into units, dropping duplicates and applying `filter`
pub fn build_units(plan: &TestPlan, filter: Option<&Regex>) -> Vec<TestUnit> {
    let mut units: Vec<TestUnit> = Vec::new();

    for entry in &plan.entries {
        for test_type in &entry.tests {
            let unit = TestUnit::new(entry.engine.as_str(), test_type.as_str());
            if units.iter().any(|u| u.id == unit.id) {
                tracing::warn!(unit = %unit.id, "duplicate test unit in plan, skipping");
                continue;
            }
            units.push(unit);
        }
    }

    if let Some(re) = filter {
        units.retain(|u| re.is_match(&u.id));
    }

    units
}
