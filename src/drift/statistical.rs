// Per-feature Kolmogorov-Smirnov drift tests

use crate::config::DriftConfig;
use crate::dataset::Dataset;
use crate::drift::feature::shared_numeric_columns;
use crate::drift::ks::{ks_2samp, KsTestResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalDriftSummary {
    pub total_features: usize,
    pub drifted_features: usize,
    pub significance_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalDriftReport {
    pub statistical_drift: BTreeMap<String, KsTestResult>,
    pub summary: StatisticalDriftSummary,
    pub timestamp: DateTime<Local>,
}

/// Run a KS test on every shared numeric feature
///
/// Features with no usable values on either side are skipped with a warning.
pub fn detect_statistical_drift(
    reference: &Dataset,
    current: &Dataset,
    config: &DriftConfig,
) -> StatisticalDriftReport {
    tracing::info!("Running statistical drift tests...");

    let alpha = config.drift.ks_alpha;
    let mut statistical_drift = BTreeMap::new();

    for name in shared_numeric_columns(reference, current, &config.label_column) {
        let ref_values = reference.numeric_values(name).unwrap_or_default();
        let curr_values = current.numeric_values(name).unwrap_or_default();

        match ks_2samp(&ref_values, &curr_values, alpha) {
            Some(result) => {
                statistical_drift.insert(name.to_string(), result);
            }
            None => tracing::warn!("Feature '{}': no values to compare, KS test skipped", name),
        }
    }

    let drifted_features = statistical_drift
        .values()
        .filter(|r| r.drift_detected)
        .count();

    tracing::info!(
        "  Features with statistical drift: {}/{}",
        drifted_features,
        statistical_drift.len()
    );

    StatisticalDriftReport {
        summary: StatisticalDriftSummary {
            total_features: statistical_drift.len(),
            drifted_features,
            significance_level: alpha,
        },
        statistical_drift,
        timestamp: Local::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    #[test]
    fn test_statistical_drift_counts() {
        let base: Vec<f64> = (0..200).map(f64::from).collect();
        let shifted: Vec<f64> = (150..350).map(f64::from).collect();

        let reference = Dataset::from_columns(vec![
            Column::numeric("stable", base.clone()),
            Column::numeric("moving", base.clone()),
        ])
        .unwrap();
        let current = Dataset::from_columns(vec![
            Column::numeric("stable", base),
            Column::numeric("moving", shifted),
        ])
        .unwrap();

        let report = detect_statistical_drift(&reference, &current, &DriftConfig::default());
        assert_eq!(report.summary.total_features, 2);
        assert_eq!(report.summary.drifted_features, 1);
        assert_eq!(report.summary.significance_level, 0.05);
        assert!(report.statistical_drift["moving"].drift_detected);
        assert!(!report.statistical_drift["stable"].drift_detected);
    }

    #[test]
    fn test_all_missing_feature_skipped() {
        let reference = Dataset::from_csv_str("a,b\n1,\n2,\n3,\n").unwrap();
        let current = Dataset::from_csv_str("a,b\n1,5\n2,6\n3,7\n").unwrap();

        let report = detect_statistical_drift(&reference, &current, &DriftConfig::default());
        assert_eq!(report.summary.total_features, 1);
        assert!(report.statistical_drift.contains_key("a"));
    }
}
