// Target (label) distribution drift

use crate::config::DriftConfig;
use crate::dataset::Dataset;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label value treated as the positive class
pub const POSITIVE_CLASS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetDriftStatus {
    SignificantDrift,
    NoDrift,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDriftReport {
    /// Label value → share of non-missing rows
    pub reference_distribution: BTreeMap<String, f64>,
    pub current_distribution: BTreeMap<String, f64>,
    /// |reference positive rate - current positive rate|
    pub drift_magnitude: f64,
    pub status: TargetDriftStatus,
    pub timestamp: DateTime<Local>,
}

impl TargetDriftReport {
    pub fn is_significant(&self) -> bool {
        self.status == TargetDriftStatus::SignificantDrift
    }
}

/// Map key for a label value: integral values print without a fraction
pub(crate) fn label_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Normalized frequency of each label value, ignoring missing labels
pub fn label_distribution(labels: &[Option<f64>]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in labels.iter().flatten() {
        *counts.entry(label_key(*value)).or_insert(0) += 1;
    }

    let total: usize = counts.values().sum();
    counts
        .into_iter()
        .map(|(label, count)| (label, count as f64 / total as f64))
        .collect()
}

/// Detect a shift in the positive-class rate of the label column
///
/// Returns `None` when the label column is missing (or non-numeric) in
/// either dataset; that is a soft failure, not an error.
pub fn detect_target_drift(
    reference: &Dataset,
    current: &Dataset,
    config: &DriftConfig,
) -> Option<TargetDriftReport> {
    tracing::info!("Detecting target distribution drift...");

    let label = config.label_column.as_str();
    let (Some(ref_labels), Some(curr_labels)) = (reference.numeric(label), current.numeric(label))
    else {
        tracing::warn!("Target column '{}' not found", label);
        return None;
    };

    let reference_distribution = label_distribution(ref_labels);
    let current_distribution = label_distribution(curr_labels);

    let positive = label_key(POSITIVE_CLASS);
    let ref_rate = reference_distribution.get(&positive).copied().unwrap_or(0.0);
    let curr_rate = current_distribution.get(&positive).copied().unwrap_or(0.0);
    let drift_magnitude = (ref_rate - curr_rate).abs();

    let status = if drift_magnitude > config.drift.target_shift {
        TargetDriftStatus::SignificantDrift
    } else {
        TargetDriftStatus::NoDrift
    };

    tracing::info!("  Target drift magnitude: {:.4}", drift_magnitude);
    tracing::info!("  Status: {:?}", status);

    Some(TargetDriftReport {
        reference_distribution,
        current_distribution,
        drift_magnitude,
        status,
        timestamp: Local::now(),
    })
}
