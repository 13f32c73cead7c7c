//! CSV Output

use crate::aggregate::AggregateSummary;

/// Header row of [`generate_csv_summary`]
pub const CSV_HEADER: &str = "test_id,attachment,data_points,min_ms,max_ms,avg_ms";

/// Generate a CSV table with one row per summarized case.
pub fn generate_csv_summary(summary: &AggregateSummary) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for entry in &summary.entries {
        out.push_str(&format!(
            "{},{},{},{:.6},{:.6},{:.6}\n",
            escape(&entry.test_id),
            escape(&entry.attachment),
            entry.stats.count,
            entry.stats.min,
            entry.stats.max,
            entry.stats.mean
        ));
    }

    out
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
