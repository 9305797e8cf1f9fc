//! Comprehensive drift report assembly and persistence
//!
//! A report bundles the feature, statistical, target and (optionally)
//! performance results of one run together with an overall assessment.
//! `ReportStore` writes each report twice: once under a timestamped name
//! and once over `drift_report_latest.json`.

use crate::drift::feature::FeatureDriftReport;
use crate::drift::performance::PerformanceDriftReport;
use crate::drift::statistical::StatisticalDriftReport;
use crate::drift::target::TargetDriftReport;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the report file overwritten on every save
pub const LATEST_REPORT_FILE: &str = "drift_report_latest.json";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallAssessment {
    pub drift_detected: bool,
    pub action_required: bool,
    pub recommendation: String,
}

/// One complete drift run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub timestamp: DateTime<Local>,
    /// Rows in the current dataset
    pub data_size: usize,
    pub feature_drift: FeatureDriftReport,
    pub statistical_drift: StatisticalDriftReport,
    /// Serialized as `{}` when the label column was unavailable
    #[serde(with = "empty_object", default)]
    pub target_drift: Option<TargetDriftReport>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub performance_drift: Option<PerformanceDriftReport>,
    pub overall_assessment: OverallAssessment,
}

impl DriftReport {
    /// Combine detector results and derive the overall assessment
    pub fn assemble(
        data_size: usize,
        feature_drift: FeatureDriftReport,
        statistical_drift: StatisticalDriftReport,
        target_drift: Option<TargetDriftReport>,
        performance_drift: Option<PerformanceDriftReport>,
    ) -> Self {
        let drift_detected = feature_drift.drift_detected()
            || target_drift
                .as_ref()
                .is_some_and(TargetDriftReport::is_significant);

        let recommendation = recommendation(
            &feature_drift,
            target_drift.as_ref(),
            performance_drift.as_ref(),
        );

        Self {
            timestamp: Local::now(),
            data_size,
            feature_drift,
            statistical_drift,
            target_drift,
            performance_drift,
            overall_assessment: OverallAssessment {
                drift_detected,
                action_required: drift_detected,
                recommendation,
            },
        }
    }

    pub fn drift_detected(&self) -> bool {
        self.overall_assessment.drift_detected
    }
}

/// Concatenate the message of every triggered rule with `" | "`
pub fn recommendation(
    feature_drift: &FeatureDriftReport,
    target_drift: Option<&TargetDriftReport>,
    performance_drift: Option<&PerformanceDriftReport>,
) -> String {
    let mut messages = Vec::new();

    if feature_drift.drift_detected() {
        messages.push("RETRAIN MODEL: Significant feature drift detected".to_string());
    }

    if target_drift.is_some_and(TargetDriftReport::is_significant) {
        messages.push("INVESTIGATE DATA: Target distribution has shifted significantly".to_string());
    }

    if let Some(perf) = performance_drift {
        if perf.status.is_degraded() {
            messages.push(format!("MODEL RETRAINING REQUIRED: {}", perf.status.as_str()));
        }
    }

    if messages.is_empty() {
        messages.push("NO ACTION REQUIRED: Model is performing well".to_string());
    }

    messages.join(" | ")
}

/// Paths written by one save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub timestamped: PathBuf,
    pub latest: PathBuf,
}

/// Directory of persisted drift reports
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the report under its timestamped name and over the latest file
    ///
    /// Both files receive the same serialized bytes.
    pub fn save(&self, report: &DriftReport) -> Result<SavedReport> {
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(report)?;
        let timestamped = self.dir.join(format!(
            "drift_report_{}.json",
            report.timestamp.format("%Y%m%d_%H%M%S")
        ));
        let latest = self.dir.join(LATEST_REPORT_FILE);

        fs::write(&timestamped, &json)?;
        fs::write(&latest, &json)?;

        tracing::info!("Drift report saved: {}", timestamped.display());
        tracing::info!("Latest report: {}", latest.display());

        Ok(SavedReport {
            timestamped,
            latest,
        })
    }

    /// Read back the most recently saved report
    pub fn load_latest(&self) -> Result<DriftReport> {
        let content = fs::read_to_string(self.dir.join(LATEST_REPORT_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// `None` round-trips through an empty JSON object
mod empty_object {
    use crate::drift::target::TargetDriftReport;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeReport {
        Report(TargetDriftReport),
        Empty {},
    }

    pub fn serialize<S: Serializer>(
        value: &Option<TargetDriftReport>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(report) => report.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TargetDriftReport>, D::Error> {
        Ok(match MaybeReport::deserialize(deserializer)? {
            MaybeReport::Report(report) => Some(report),
            MaybeReport::Empty {} => None,
        })
    }
}
