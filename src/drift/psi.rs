// Population Stability Index over percentile bins of the reference sample
//
// PSI = Σ (curr_prop - ref_prop) * ln(curr_prop / ref_prop)
//
// Bin edges are the evenly spaced percentiles of the reference sample
// (linear interpolation between order statistics). Both samples are
// histogrammed against the same edges; values outside the reference range
// fall outside every bin. Counts are smoothed by an additive epsilon so the
// log term is always defined.

use crate::config::PsiThresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a PSI value could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsiFailure {
    /// Reference sample has no values
    EmptyReference,
    /// Current sample has no values
    EmptyCurrent,
    /// A sample contains ±inf, or the sum overflowed
    NonFinite,
}

impl fmt::Display for PsiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PsiFailure::EmptyReference => write!(f, "reference sample is empty"),
            PsiFailure::EmptyCurrent => write!(f, "current sample is empty"),
            PsiFailure::NonFinite => write!(f, "non-finite values in sample"),
        }
    }
}

/// Outcome of a PSI computation
///
/// A failed or degenerate computation is reported as such instead of being
/// folded into a zero score; `value()` still yields the neutral 0.0 so one
/// bad feature never blocks a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PsiOutcome {
    /// PSI was computed
    Computed(f64),
    /// Fewer than 3 unique breakpoints: the reference carries no binning signal
    Degenerate { unique_breakpoints: usize },
    /// The inputs could not be binned
    Failed(PsiFailure),
}

impl PsiOutcome {
    /// PSI score, 0.0 when nothing was computed
    pub fn value(&self) -> f64 {
        match self {
            PsiOutcome::Computed(psi) => *psi,
            PsiOutcome::Degenerate { .. } | PsiOutcome::Failed(_) => 0.0,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, PsiOutcome::Computed(_))
    }

    /// Human-readable reason when no score was computed
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            PsiOutcome::Computed(_) => None,
            PsiOutcome::Degenerate { unique_breakpoints } => Some(format!(
                "degenerate reference distribution ({} unique breakpoints)",
                unique_breakpoints
            )),
            PsiOutcome::Failed(reason) => Some(format!("PSI computation failed: {}", reason)),
        }
    }
}

/// Drift tier derived from a PSI score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftTier {
    NoDrift,
    ModerateDrift,
    SignificantDrift,
}

impl DriftTier {
    /// Classify a PSI score: `< moderate` none, `[moderate, significant)` moderate,
    /// `>= significant` significant
    pub fn from_psi(psi: f64, thresholds: &PsiThresholds) -> Self {
        if psi >= thresholds.significant {
            DriftTier::SignificantDrift
        } else if psi >= thresholds.moderate {
            DriftTier::ModerateDrift
        } else {
            DriftTier::NoDrift
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriftTier::NoDrift => "NO_DRIFT",
            DriftTier::ModerateDrift => "MODERATE_DRIFT",
            DriftTier::SignificantDrift => "SIGNIFICANT_DRIFT",
        }
    }
}

impl fmt::Display for DriftTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentile of sorted data with linear interpolation between order statistics
pub(crate) fn percentile(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = (percentile / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * weight
    }
}

/// `bins + 1` evenly spaced percentiles of the reference, sorted and deduplicated
fn breakpoints(reference: &[f64], bins: usize) -> Vec<f64> {
    let mut sorted = reference.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| percentile(&sorted, 100.0 * i as f64 / bins as f64))
        .collect();
    edges.sort_by(f64::total_cmp);
    edges.dedup();
    edges
}

/// Count values per bin; bins are half-open except the last, which is closed
fn histogram(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len() - 1;
    let mut counts = vec![0; bins];
    let (first, last) = (edges[0], edges[bins]);

    for &v in values {
        if v < first || v > last {
            continue;
        }
        let at_or_below = edges.partition_point(|&edge| edge <= v);
        counts[(at_or_below - 1).min(bins - 1)] += 1;
    }
    counts
}

/// Calculate PSI between a reference and a current sample
///
/// Missing values must be dropped by the caller.
///
/// # Example
/// ```
/// use deriva::config::PsiThresholds;
/// use deriva::drift::calculate_psi;
///
/// let reference: Vec<f64> = (0..1000).map(f64::from).collect();
/// let outcome = calculate_psi(&reference, &reference, &PsiThresholds::default());
/// assert_eq!(outcome.value(), 0.0);
/// assert!(outcome.is_computed());
/// ```
pub fn calculate_psi(reference: &[f64], current: &[f64], settings: &PsiThresholds) -> PsiOutcome {
    if reference.is_empty() {
        return PsiOutcome::Failed(PsiFailure::EmptyReference);
    }
    if current.is_empty() {
        return PsiOutcome::Failed(PsiFailure::EmptyCurrent);
    }
    if reference.iter().chain(current).any(|v| !v.is_finite()) {
        return PsiOutcome::Failed(PsiFailure::NonFinite);
    }

    let edges = breakpoints(reference, settings.bins);
    if edges.len() < 3 {
        return PsiOutcome::Degenerate {
            unique_breakpoints: edges.len(),
        };
    }

    let ref_counts = histogram(reference, &edges);
    let curr_counts = histogram(current, &edges);

    let eps = settings.epsilon;
    let ref_total = reference.len() as f64 + eps * settings.bins as f64;
    let curr_total = current.len() as f64 + eps * settings.bins as f64;

    let psi: f64 = ref_counts
        .iter()
        .zip(&curr_counts)
        .map(|(&r, &c)| {
            let ref_prop = (r as f64 + eps) / ref_total;
            let curr_prop = (c as f64 + eps) / curr_total;
            (curr_prop - ref_prop) * (curr_prop / ref_prop).ln()
        })
        .sum();

    if psi.is_finite() {
        PsiOutcome::Computed(psi)
    } else {
        PsiOutcome::Failed(PsiFailure::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: i32) -> Vec<f64> {
        (0..n).map(f64::from).collect()
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 4.0);
        assert!((percentile(&sorted, 50.0) - 2.5).abs() < 1e-12);
        assert_eq!(percentile(&[7.0], 30.0), 7.0);
    }

    #[test]
    fn test_histogram_edges() {
        let edges = [0.0, 1.0, 2.0];
        // 2.0 lands in the closed last bin, 2.5 and -1 are outside
        let counts = histogram(&[-1.0, 0.0, 0.5, 1.0, 2.0, 2.5], &edges);
        assert_eq!(counts, vec![2, 2]);
    }

    #[test]
    fn test_identical_samples_zero() {
        let reference = grid(500);
        let outcome = calculate_psi(&reference, &reference, &PsiThresholds::default());
        assert_eq!(outcome, PsiOutcome::Computed(0.0));
    }

    #[test]
    fn test_shifted_sample_significant() {
        let reference = grid(1000);
        let current: Vec<f64> = reference.iter().map(|v| v + 500.0).collect();
        let psi = calculate_psi(&reference, &current, &PsiThresholds::default()).value();
        assert!(psi >= 0.2, "psi {} should be significant", psi);
        assert_eq!(
            DriftTier::from_psi(psi, &PsiThresholds::default()),
            DriftTier::SignificantDrift
        );
    }

    #[test]
    fn test_constant_reference_is_degenerate() {
        let reference = vec![3.0; 50];
        let outcome = calculate_psi(&reference, &grid(50), &PsiThresholds::default());
        assert_eq!(
            outcome,
            PsiOutcome::Degenerate {
                unique_breakpoints: 1
            }
        );
        assert_eq!(outcome.value(), 0.0);
        assert!(outcome.diagnostic().unwrap().contains("degenerate"));
    }

    #[test]
    fn test_empty_samples_fail_open() {
        let settings = PsiThresholds::default();
        let empty_ref = calculate_psi(&[], &grid(10), &settings);
        assert_eq!(empty_ref, PsiOutcome::Failed(PsiFailure::EmptyReference));
        assert_eq!(empty_ref.value(), 0.0);

        let empty_cur = calculate_psi(&grid(10), &[], &settings);
        assert_eq!(empty_cur, PsiOutcome::Failed(PsiFailure::EmptyCurrent));
        assert!(!empty_cur.is_computed());
    }

    #[test]
    fn test_infinite_values_fail() {
        let outcome = calculate_psi(&grid(10), &[1.0, f64::INFINITY], &PsiThresholds::default());
        assert_eq!(outcome, PsiOutcome::Failed(PsiFailure::NonFinite));
        assert!(outcome.diagnostic().unwrap().contains("non-finite"));
    }

    #[test]
    fn test_tier_boundaries() {
        let t = PsiThresholds::default();
        assert_eq!(DriftTier::from_psi(0.0, &t), DriftTier::NoDrift);
        assert_eq!(DriftTier::from_psi(0.0999, &t), DriftTier::NoDrift);
        assert_eq!(DriftTier::from_psi(0.1, &t), DriftTier::ModerateDrift);
        assert_eq!(DriftTier::from_psi(0.1999, &t), DriftTier::ModerateDrift);
        assert_eq!(DriftTier::from_psi(0.2, &t), DriftTier::SignificantDrift);
    }

    #[test]
    fn test_tier_serializes_screaming_case() {
        let json = serde_json::to_string(&DriftTier::ModerateDrift).unwrap();
        assert_eq!(json, "\"MODERATE_DRIFT\"");
        assert_eq!(DriftTier::SignificantDrift.to_string(), "SIGNIFICANT_DRIFT");
    }
}
