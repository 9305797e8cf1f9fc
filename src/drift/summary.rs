// Descriptive statistics attached to every feature verdict
//
// Uses trueno::Vector for SIMD mean/stddev and aprender's DescriptiveStats
// for the median (R-7 quantile, QuickSelect). Both work in f32, so values
// are centred on the sample midrange in f64 first; the f32 rounding error
// then scales with the spread of the sample rather than its magnitude.

use aprender::stats::DescriptiveStats;
use serde::{Deserialize, Serialize};
use trueno::Vector;

/// Summary of one feature sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std: f64,
    pub median: f64,
    pub count: usize,
}

impl SampleSummary {
    /// Summarize non-missing values; all-zero summary for an empty sample
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std: 0.0,
                median: 0.0,
                count: 0,
            };
        }

        let (low, high) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        let centre = match low / 2.0 + high / 2.0 {
            c if c.is_finite() => c,
            _ => 0.0,
        };

        let data: Vec<f32> = values.iter().map(|&x| (x - centre) as f32).collect();
        let v = Vector::from_slice(&data);

        let offset = v.mean().unwrap_or(0.0);
        let median = DescriptiveStats::new(&v).quantile(0.5).unwrap_or(offset);

        // trueno reports the population stddev
        let n = values.len() as f64;
        let std = if values.len() > 1 {
            f64::from(v.stddev().unwrap_or(0.0)) * (n / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Self {
            mean: centre + f64::from(offset),
            std,
            median: centre + f64::from(median),
            count: values.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_basic() {
        let s = SampleSummary::from_values(&[2.0, 4.0, 6.0, 8.0]);
        assert!((s.mean - 5.0).abs() < 1e-4);
        // population var 5.0, sample var 20/3
        assert!((s.std - (20.0f64 / 3.0).sqrt()).abs() < 1e-3);
        assert!((s.median - 5.0).abs() < 1e-4);
        assert_eq!(s.count, 4);
    }

    #[test]
    fn test_summary_single_value() {
        let s = SampleSummary::from_values(&[7.0]);
        assert!((s.mean - 7.0).abs() < 1e-6);
        assert_eq!(s.std, 0.0);
    }

    #[test]
    fn test_summary_large_magnitude_small_spread() {
        // 1e7 + {0, 1, 2, 3}: f32 alone cannot resolve the spread
        let values: Vec<f64> = (0..4).map(|i| 1.0e7 + f64::from(i)).collect();
        let s = SampleSummary::from_values(&values);
        assert!((s.mean - 10_000_001.5).abs() < 1e-3);
        assert!((s.median - 10_000_001.5).abs() < 1e-3);
        assert!((s.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_summary_empty() {
        let s = SampleSummary::from_values(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean, 0.0);
    }
}
