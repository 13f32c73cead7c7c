//! Summary Statistics
//!
//! Reduces a raw measurement series to `{count, min, max, mean}` plus
//! dispersion. Everything is computed over ALL samples; nothing is trimmed.

use serde::{Deserialize, Serialize};

/// Summary of one measurement series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Number of samples
    pub count: usize,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std_dev: f64,
}

/// Compute summary statistics for a series.
///
/// An empty series yields an all-zero summary with `count == 0`.
pub fn compute_summary(samples: &[f64]) -> SeriesSummary {
    if samples.is_empty() {
        return SeriesSummary::default();
    }

    let count = samples.len();
    let mean = mean(samples);

    let min = samples
        .iter()
        .cloned()
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(0.0);
    let max = samples
        .iter()
        .cloned()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(0.0);

    let std_dev = if count < 2 {
        0.0
    } else {
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    };

    SeriesSummary {
        count,
        min,
        max,
        mean,
        std_dev,
    }
}

/// Arithmetic mean, 0.0 for an empty series
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

impl SeriesSummary {
    /// Coefficient of variation (relative stddev, percent)
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }

    /// Whether the summary was computed from at least one sample
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
