// Per-feature PSI drift across every shared numeric column

use crate::config::DriftConfig;
use crate::dataset::Dataset;
use crate::drift::psi::{calculate_psi, DriftTier};
use crate::drift::summary::SampleSummary;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall status of a feature drift run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureDriftStatus {
    DriftDetected,
    NoDrift,
}

/// Drift verdict for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVerdict {
    pub psi: f64,
    pub status: DriftTier,
    pub ref_mean: f64,
    pub curr_mean: f64,
    pub ref_std: f64,
    pub curr_std: f64,
    pub ref_median: f64,
    pub curr_median: f64,
    /// Set when PSI could not be computed and 0.0 was reported instead
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub psi_diagnostic: Option<String>,
}

/// Aggregate over all analysed features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDriftSummary {
    /// Shared numeric non-label columns analysed
    pub total_features: usize,
    /// Features at SIGNIFICANT_DRIFT
    pub drifted_features: usize,
    /// Names of those features, in column order
    pub drifted_feature_names: Vec<String>,
    /// `drifted_features / total_features * 100`, 0 when nothing was analysed
    pub drift_percentage: f64,
    pub overall_status: FeatureDriftStatus,
}

/// Result of a feature drift run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDriftReport {
    pub feature_drift: BTreeMap<String, FeatureVerdict>,
    pub summary: FeatureDriftSummary,
    pub timestamp: DateTime<Local>,
}

impl FeatureDriftReport {
    pub fn drift_detected(&self) -> bool {
        self.summary.overall_status == FeatureDriftStatus::DriftDetected
    }
}

/// Columns present in both datasets, numeric on both sides, excluding the label
///
/// Follows the column order of the current dataset.
pub fn shared_numeric_columns<'a>(
    reference: &Dataset,
    current: &'a Dataset,
    label_column: &str,
) -> Vec<&'a str> {
    current
        .column_names()
        .filter(|name| *name != label_column)
        .filter(|name| current.numeric(name).is_some() && reference.numeric(name).is_some())
        .collect()
}

/// Detect drift in individual features using PSI
///
/// Non-numeric columns are skipped silently. A feature whose PSI cannot be
/// computed is reported as NO_DRIFT with a diagnostic instead of failing the
/// whole run.
pub fn detect_feature_drift(
    reference: &Dataset,
    current: &Dataset,
    config: &DriftConfig,
) -> FeatureDriftReport {
    tracing::info!("Detecting feature drift...");

    let mut feature_drift = BTreeMap::new();
    let mut drifted_feature_names = Vec::new();

    for name in shared_numeric_columns(reference, current, &config.label_column) {
        // Both lookups succeed: shared_numeric_columns checked them
        let ref_values = reference.numeric_values(name).unwrap_or_default();
        let curr_values = current.numeric_values(name).unwrap_or_default();

        let outcome = calculate_psi(&ref_values, &curr_values, &config.psi);
        if let Some(reason) = outcome.diagnostic() {
            tracing::warn!("Feature '{}': {}", name, reason);
        }

        let psi = outcome.value();
        let status = DriftTier::from_psi(psi, &config.psi);
        if status == DriftTier::SignificantDrift {
            drifted_feature_names.push(name.to_string());
        }

        let ref_summary = SampleSummary::from_values(&ref_values);
        let curr_summary = SampleSummary::from_values(&curr_values);

        tracing::debug!("Feature '{}': psi={:.4} status={}", name, psi, status);

        feature_drift.insert(
            name.to_string(),
            FeatureVerdict {
                psi,
                status,
                ref_mean: ref_summary.mean,
                curr_mean: curr_summary.mean,
                ref_std: ref_summary.std,
                curr_std: curr_summary.std,
                ref_median: ref_summary.median,
                curr_median: curr_summary.median,
                psi_diagnostic: outcome.diagnostic(),
            },
        );
    }

    // Numerator and denominator come from the same filtered column set
    let total_features = feature_drift.len();
    let drifted_features = drifted_feature_names.len();
    let drift_percentage = if total_features > 0 {
        drifted_features as f64 / total_features as f64 * 100.0
    } else {
        0.0
    };
    let overall_status = if drifted_features > 0 {
        FeatureDriftStatus::DriftDetected
    } else {
        FeatureDriftStatus::NoDrift
    };

    tracing::info!("  Total features analyzed: {}", total_features);
    tracing::info!("  Drifted features: {}", drifted_features);
    tracing::info!("  Overall status: {:?}", overall_status);

    FeatureDriftReport {
        feature_drift,
        summary: FeatureDriftSummary {
            total_features,
            drifted_features,
            drifted_feature_names,
            drift_percentage,
            overall_status,
        },
        timestamp: Local::now(),
    }
}
