//! Percentile Computation
//!
//! Nearest-rank percentiles: the result is always an observed sample, never an
//! interpolated value. Tail percentiles (p99) are computed over the raw series,
//! outliers included, because the tail is the signal.

use serde::{Deserialize, Serialize};

/// Standard percentiles reported for a latency series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Percentiles {
    /// 50th percentile (median)
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

/// 0-based index into a sorted series of `n` samples selected by the
/// nearest-rank method: `max(0, ceil(p/100 * n) - 1)`, clamped to `n - 1`.
///
/// Returns `None` for an empty series.
pub fn nearest_rank_index(n: usize, percentile: f64) -> Option<usize> {
    if n == 0 {
        return None;
    }

    let p = percentile.clamp(0.0, 100.0);
    // Multiply before dividing so integral percentiles stay exact
    let rank = (p * n as f64 / 100.0).ceil() as usize;

    Some(rank.saturating_sub(1).min(n - 1))
}

/// Compute a single nearest-rank percentile from unsorted samples
///
/// # Examples
///
/// ```
/// # use perfplan_stats::compute_percentile;
/// let samples = vec![5.0, 1.0, 4.0, 2.0, 3.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 3.0);
/// assert_eq!(compute_percentile(&samples, 99.0), 5.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    let Some(idx) = nearest_rank_index(samples.len(), percentile) else {
        return 0.0;
    };

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted[idx]
}

/// Compute all standard percentiles with a single sort
pub fn compute_percentiles(samples: &[f64]) -> Percentiles {
    if samples.is_empty() {
        return Percentiles::default();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pick = |p: f64| {
        nearest_rank_index(sorted.len(), p)
            .map(|i| sorted[i])
            .unwrap_or(0.0)
    };

    Percentiles {
        p50: pick(50.0),
        p90: pick(90.0),
        p95: pick(95.0),
        p99: pick(99.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p99_index_hand_computed() {
        // ceil(0.99 * n) - 1
        assert_eq!(nearest_rank_index(1, 99.0), Some(0));
        assert_eq!(nearest_rank_index(10, 99.0), Some(9));
        assert_eq!(nearest_rank_index(100, 99.0), Some(98));
        assert_eq!(nearest_rank_index(1000, 99.0), Some(989));
    }

    #[test]
    fn test_index_bounds() {
        assert_eq!(nearest_rank_index(0, 99.0), None);
        assert_eq!(nearest_rank_index(10, 0.0), Some(0));
        assert_eq!(nearest_rank_index(10, 100.0), Some(9));
        assert_eq!(nearest_rank_index(10, 250.0), Some(9));
    }

    #[test]
    fn test_median() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(compute_percentile(&samples, 50.0), 3.0);
    }

    #[test]
    fn test_p99_uses_sorted_series() {
        let samples: Vec<f64> = (1..=100).rev().map(|x| x as f64).collect();
        assert_eq!(compute_percentile(&samples, 99.0), 99.0);
    }

    #[test]
    fn test_no_interpolation() {
        let samples = vec![10.0, 20.0];
        // An interpolating estimator would return 15.0 here
        assert_eq!(compute_percentile(&samples, 50.0), 10.0);
    }

    #[test]
    fn test_single_sample() {
        let samples = vec![42.0];
        assert_eq!(compute_percentile(&samples, 99.0), 42.0);
    }

    #[test]
    fn test_empty_samples() {
        let samples: Vec<f64> = Vec::new();
        assert_eq!(compute_percentile(&samples, 50.0), 0.0);
        assert_eq!(compute_percentiles(&samples), Percentiles::default());
    }

    #[test]
    fn test_compute_all_percentiles() {
        let samples: Vec<f64> = (1..=1000).map(|x| x as f64).collect();
        let p = compute_percentiles(&samples);

        assert_eq!(p.p50, 500.0);
        assert_eq!(p.p90, 900.0);
        assert_eq!(p.p95, 950.0);
        assert_eq!(p.p99, 990.0);
    }
}
