//! Output Formatting
//!
//! Human-readable rendering of a report tree: one block per unit group with
//! a status icon, the case's log lines and every assertion verdict, followed
//! by pass/fail totals.

use perfplan_report::{CaseEntry, NodeStatus, ReportNode, ReportTree};

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &ReportTree) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("perfplan Results: {}\n", report.root.name));
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for group in &report.root.children {
        let status_icon = match group.status() {
            NodeStatus::Passed => "✓",
            NodeStatus::Failed => "✗",
        };
        output.push_str(&format!("{} {}\n", status_icon, group.name));

        for case in group.cases() {
            format_case(&mut output, case);
        }
        output.push('\n');
    }

    let summary = report.summary();
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "{} tests: {} passed, {} failed ({:.1} ms)\n",
        summary.total_cases, summary.passed, summary.failed, report.meta.total_duration_ms
    ));

    output
}

fn format_case(output: &mut String, case: &ReportNode) {
    for entry in &case.entries {
        match entry {
            CaseEntry::Log { message } => {
                output.push_str(&format!("      {}\n", message));
            }
            CaseEntry::Assertion(a) => {
                let verdict = if a.passed { "PASS" } else { "FAIL" };
                output.push_str(&format!(
                    "      [{}] {} ({})\n",
                    verdict, a.description, a.detail
                ));
            }
        }
    }
}
