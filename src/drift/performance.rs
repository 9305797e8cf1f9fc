// Model performance drift against a recorded baseline accuracy

use crate::config::DriftConfig;
use crate::dataset::Dataset;
use crate::evaluation::metrics::{accuracy, weighted_f1, MetricsError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A trained model that labels rows of a feature dataset
///
/// How the model was trained is outside this crate; only its predictions
/// are consumed.
pub trait Classifier {
    /// Predict one label per row of `features`
    fn predict(&self, features: &Dataset) -> anyhow::Result<Vec<f64>>;
}

/// Predictions computed elsewhere and replayed as a model
#[derive(Debug, Clone)]
pub struct PrecomputedPredictions {
    predictions: Vec<f64>,
}

impl PrecomputedPredictions {
    pub fn new(predictions: Vec<f64>) -> Self {
        Self { predictions }
    }

    /// Read predictions from a named numeric column
    pub fn from_column(dataset: &Dataset, column: &str) -> anyhow::Result<Self> {
        let values = dataset
            .numeric(column)
            .ok_or_else(|| anyhow::anyhow!("Prediction column '{}' not found or not numeric", column))?;
        let predictions = values
            .iter()
            .enumerate()
            .map(|(row, v)| v.ok_or_else(|| anyhow::anyhow!("Missing prediction on row {}", row + 1)))
            .collect::<anyhow::Result<Vec<f64>>>()?;
        Ok(Self { predictions })
    }
}

impl Classifier for PrecomputedPredictions {
    fn predict(&self, features: &Dataset) -> anyhow::Result<Vec<f64>> {
        if self.predictions.len() != features.len() {
            anyhow::bail!(
                "Have {} predictions for {} rows",
                self.predictions.len(),
                features.len()
            );
        }
        Ok(self.predictions.clone())
    }
}

/// Errors from performance drift detection
#[derive(Error, Debug)]
pub enum PerformanceError {
    #[error("Baseline accuracy must be in (0, 1], got {0}")]
    InvalidBaseline(f64),

    #[error("Model prediction failed: {0}")]
    Model(String),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

pub type Result<T> = std::result::Result<T, PerformanceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegradationStatus {
    SignificantDegradation,
    ModerateDegradation,
    NoDegradation,
}

impl DegradationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradationStatus::SignificantDegradation => "SIGNIFICANT_DEGRADATION",
            DegradationStatus::ModerateDegradation => "MODERATE_DEGRADATION",
            DegradationStatus::NoDegradation => "NO_DEGRADATION",
        }
    }

    pub fn is_degraded(&self) -> bool {
        *self != DegradationStatus::NoDegradation
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceDriftReport {
    pub baseline_accuracy: f64,
    pub current_accuracy: f64,
    pub current_f1: f64,
    pub accuracy_drop: f64,
    /// `(baseline - current) / baseline * 100`
    pub performance_degradation_pct: f64,
    pub status: DegradationStatus,
    pub timestamp: DateTime<Local>,
}

/// Classify an accuracy degradation percentage
pub fn classify_degradation(degradation_pct: f64, config: &DriftConfig) -> DegradationStatus {
    if degradation_pct > config.drift.significant_degradation_pct {
        DegradationStatus::SignificantDegradation
    } else if degradation_pct > config.drift.moderate_degradation_pct {
        DegradationStatus::ModerateDegradation
    } else {
        DegradationStatus::NoDegradation
    }
}

/// Score a model on current data and compare against its baseline accuracy
pub fn detect_performance_drift(
    model: &dyn Classifier,
    features: &Dataset,
    labels: &[f64],
    baseline_accuracy: f64,
    config: &DriftConfig,
) -> Result<PerformanceDriftReport> {
    tracing::info!("Detecting model performance drift...");

    if !(baseline_accuracy > 0.0 && baseline_accuracy <= 1.0) {
        return Err(PerformanceError::InvalidBaseline(baseline_accuracy));
    }

    let predictions = model
        .predict(features)
        .map_err(|e| PerformanceError::Model(format!("{:#}", e)))?;
    let current_accuracy = accuracy(labels, &predictions)?;
    let current_f1 = weighted_f1(labels, &predictions)?;

    let accuracy_drop = baseline_accuracy - current_accuracy;
    let performance_degradation_pct = accuracy_drop / baseline_accuracy * 100.0;
    let status = classify_degradation(performance_degradation_pct, config);

    tracing::info!("  Baseline accuracy: {:.4}", baseline_accuracy);
    tracing::info!("  Current accuracy: {:.4}", current_accuracy);
    tracing::info!(
        "  Performance degradation: {:.2}%",
        performance_degradation_pct
    );
    tracing::info!("  Status: {}", status.as_str());

    Ok(PerformanceDriftReport {
        baseline_accuracy,
        current_accuracy,
        current_f1,
        accuracy_drop,
        performance_degradation_pct,
        status,
        timestamp: Local::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn features(rows: usize) -> Dataset {
        Dataset::from_columns(vec![Column::numeric("age", vec![30.0; rows])]).unwrap()
    }

    #[test]
    fn test_classify_degradation_boundaries() {
        let config = DriftConfig::default();
        assert_eq!(
            classify_degradation(10.5, &config),
            DegradationStatus::SignificantDegradation
        );
        assert_eq!(
            classify_degradation(10.0, &config),
            DegradationStatus::ModerateDegradation
        );
        assert_eq!(
            classify_degradation(5.0, &config),
            DegradationStatus::NoDegradation
        );
        assert_eq!(
            classify_degradation(-3.0, &config),
            DegradationStatus::NoDegradation
        );
    }

    #[test]
    fn test_significant_degradation() {
        // 7/10 correct vs baseline 0.9 → 22.2% degradation
        let labels = vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let model =
            PrecomputedPredictions::new(vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0]);

        let report =
            detect_performance_drift(&model, &features(10), &labels, 0.9, &DriftConfig::default())
                .unwrap();
        assert!((report.current_accuracy - 0.7).abs() < 1e-12);
        assert!((report.accuracy_drop - 0.2).abs() < 1e-9);
        assert!((report.performance_degradation_pct - 22.222_222).abs() < 1e-4);
        assert_eq!(report.status, DegradationStatus::SignificantDegradation);
        assert!(report.status.is_degraded());
    }

    #[test]
    fn test_improved_model_no_degradation() {
        let labels = vec![1.0, 0.0, 1.0, 0.0];
        let model = PrecomputedPredictions::new(labels.clone());

        let report =
            detect_performance_drift(&model, &features(4), &labels, 0.8, &DriftConfig::default())
                .unwrap();
        assert_eq!(report.current_accuracy, 1.0);
        assert!(report.performance_degradation_pct < 0.0);
        assert_eq!(report.status, DegradationStatus::NoDegradation);
    }

    #[test]
    fn test_invalid_baseline_rejected() {
        let model = PrecomputedPredictions::new(vec![1.0]);
        let err = detect_performance_drift(&model, &features(1), &[1.0], 0.0, &DriftConfig::default())
            .unwrap_err();
        assert!(matches!(err, PerformanceError::InvalidBaseline(_)));
    }

    #[test]
    fn test_prediction_count_mismatch() {
        let model = PrecomputedPredictions::new(vec![1.0, 0.0]);
        let err = detect_performance_drift(&model, &features(3), &[1.0, 0.0, 1.0], 0.9, &DriftConfig::default())
            .unwrap_err();
        assert!(matches!(err, PerformanceError::Model(_)));
    }

    #[test]
    fn test_predictions_from_column() {
        let ds = Dataset::from_csv_str("prediction\n1\n0\n1\n").unwrap();
        let model = PrecomputedPredictions::from_column(&ds, "prediction").unwrap();
        assert_eq!(model.predict(&features(3)).unwrap(), vec![1.0, 0.0, 1.0]);

        assert!(PrecomputedPredictions::from_column(&ds, "missing").is_err());
        let gappy = Dataset::from_csv_str("prediction\n1\nNA\n0\n").unwrap();
        assert!(PrecomputedPredictions::from_column(&gappy, "prediction").is_err());
    }
}
