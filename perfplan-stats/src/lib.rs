#![warn(missing_docs)]
//! perfplan Statistics
//!
//! Reduces raw per-iteration measurements into summaries:
//! - Nearest-rank percentiles (no interpolation, result is an observed sample)
//! - Series summaries: count, min, max, mean, standard deviation
//! - Unit conversion helpers for nanosecond timings

mod percentiles;
mod summary;

pub use percentiles::{Percentiles, compute_percentile, compute_percentiles, nearest_rank_index};
pub use summary::{SeriesSummary, compute_summary, mean};

/// Nanoseconds per millisecond
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Convert a nanosecond series to milliseconds
pub fn nanos_to_millis(samples: &[f64]) -> Vec<f64> {
    samples.iter().map(|ns| ns / NANOS_PER_MILLI).collect()
}
