//! Plain-text Output

use crate::aggregate::AggregateSummary;

/// Render an aggregate summary as an indented text block.
pub fn generate_text_summary(summary: &AggregateSummary) -> String {
    let mut out = String::new();

    if summary.is_empty() {
        out.push_str("No performance data found in the report attachments.\n");
        return out;
    }

    for entry in &summary.entries {
        out.push_str(&format!("  > Summary for {}:\n", entry.test_id));
        out.push_str(&format!(
            "    - data points: {}  min: {:.3} ms  max: {:.3} ms  avg: {:.3} ms\n",
            entry.stats.count, entry.stats.min, entry.stats.max, entry.stats.mean
        ));
    }
    out.push_str(&format!(
        "Processed {} unique test summaries ({} raw data points).\n",
        summary.entries.len(),
        summary.total_points
    ));

    out
}
