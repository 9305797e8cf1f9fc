//! Drift session: a reference dataset held once and checked against many
//! current samples.
//!
//! Every call takes the current data explicitly and leaves the session
//! untouched, so repeated or interleaved checks are independent.

use crate::config::DriftConfig;
use crate::dataset::{Dataset, DatasetError};
use crate::drift::{
    detect_feature_drift, detect_performance_drift, detect_statistical_drift, detect_target_drift,
    Classifier, DriftReport, PerformanceError, ReportError, ReportStore,
};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Label column '{0}' is missing or incomplete in the current data")]
    MissingLabels(String),

    #[error(transparent)]
    Performance(#[from] PerformanceError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Model and baseline needed for performance drift
///
/// True labels come from the label column of the current dataset.
pub struct PerformanceInputs<'a> {
    pub model: &'a dyn Classifier,
    pub baseline_accuracy: f64,
}

/// Reference dataset plus the thresholds to judge drift with
#[derive(Debug, Clone)]
pub struct DriftSession {
    reference: Dataset,
    config: DriftConfig,
}

impl DriftSession {
    pub fn new(reference: Dataset, config: DriftConfig) -> Self {
        tracing::info!(
            "Reference data: {} rows, {} columns",
            reference.len(),
            reference.columns().len()
        );
        Self { reference, config }
    }

    /// Load the reference dataset from CSV
    ///
    /// A missing file is fatal for the session.
    pub fn load<P: AsRef<Path>>(path: P, config: DriftConfig) -> Result<Self> {
        let reference = Dataset::from_csv_path(path)?;
        Ok(Self::new(reference, config))
    }

    pub fn reference(&self) -> &Dataset {
        &self.reference
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Run every detector and assemble a report without touching disk
    ///
    /// Performance drift runs only when `performance` is supplied.
    pub fn assess(
        &self,
        current: &Dataset,
        performance: Option<PerformanceInputs<'_>>,
    ) -> Result<DriftReport> {
        tracing::info!("Running comprehensive drift check on {} rows", current.len());

        let feature_drift = detect_feature_drift(&self.reference, current, &self.config);
        let statistical_drift = detect_statistical_drift(&self.reference, current, &self.config);
        let target_drift = detect_target_drift(&self.reference, current, &self.config);

        let performance_drift = match performance {
            Some(inputs) => {
                let label = self.config.label_column.as_str();
                let labels = current
                    .numeric(label)
                    .and_then(|values| values.iter().copied().collect::<Option<Vec<f64>>>())
                    .ok_or_else(|| SessionError::MissingLabels(label.to_string()))?;
                let features = current.without_column(label);
                Some(detect_performance_drift(
                    inputs.model,
                    &features,
                    &labels,
                    inputs.baseline_accuracy,
                    &self.config,
                )?)
            }
            None => None,
        };

        let report = DriftReport::assemble(
            current.len(),
            feature_drift,
            statistical_drift,
            target_drift,
            performance_drift,
        );

        tracing::info!(
            "Drift detected: {}",
            report.overall_assessment.drift_detected
        );
        tracing::info!(
            "Recommendation: {}",
            report.overall_assessment.recommendation
        );

        Ok(report)
    }

    /// Assess `current` and persist the report to `store`
    pub fn comprehensive_drift_check(
        &self,
        current: &Dataset,
        performance: Option<PerformanceInputs<'_>>,
        store: &ReportStore,
    ) -> Result<DriftReport> {
        let report = self.assess(current, performance)?;
        store.save(&report)?;
        Ok(report)
    }
}
