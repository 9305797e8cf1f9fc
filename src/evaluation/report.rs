//! Model evaluation reports
//!
//! A model is evaluated from its predictions on the train and test splits.
//! Each split is a table with `y_true` and `y_pred` columns, plus an
//! optional `y_prob` column of positive-class probabilities that enables
//! ROC-AUC for classifiers.

use crate::config::FitThresholds;
use crate::dataset::{Dataset, DatasetError};
use crate::evaluation::fit::{
    diagnose_classification, diagnose_regression, ClassificationFitVerdict, RegressionFitVerdict,
};
use crate::evaluation::metrics::{
    roc_auc, ClassificationMetrics, ClassificationReport, ConfusionMatrix, MetricsError,
    RegressionMetrics,
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the persisted evaluation report
pub const EVALUATION_REPORT_FILE: &str = "model_evaluation_report.json";

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Prediction file is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("Missing value in column '{column}' on row {row}")]
    MissingValue { column: &'static str, row: usize },

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvaluationError>;

/// True and predicted values for one data split
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSet {
    pub y_true: Vec<f64>,
    pub y_pred: Vec<f64>,
    pub y_prob: Option<Vec<f64>>,
}

impl PredictionSet {
    pub fn new(y_true: Vec<f64>, y_pred: Vec<f64>) -> Self {
        Self {
            y_true,
            y_pred,
            y_prob: None,
        }
    }

    pub fn with_probabilities(mut self, y_prob: Vec<f64>) -> Self {
        self.y_prob = Some(y_prob);
        self
    }

    /// Read `y_true` / `y_pred` (and `y_prob` when present) from a dataset
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let y_prob = if dataset.has_column("y_prob") {
            Some(required_column(dataset, "y_prob")?)
        } else {
            None
        };
        Ok(Self {
            y_true: required_column(dataset, "y_true")?,
            y_pred: required_column(dataset, "y_pred")?,
            y_prob,
        })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_dataset(&Dataset::from_csv_path(path)?)
    }
}

fn required_column(dataset: &Dataset, column: &'static str) -> Result<Vec<f64>> {
    let values = dataset
        .numeric(column)
        .ok_or(EvaluationError::MissingColumn(column))?;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v.ok_or(EvaluationError::MissingValue { column, row: i + 1 }))
        .collect()
}

/// Evaluation of a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEvaluation {
    pub model_name: String,
    pub train_metrics: ClassificationMetrics,
    pub test_metrics: ClassificationMetrics,
    pub confusion_matrix: ConfusionMatrix,
    /// Per-class scores on the test split
    pub classification_report: ClassificationReport,
    pub overfitting_status: ClassificationFitVerdict,
    pub timestamp: DateTime<Local>,
}

/// Evaluation of a regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionEvaluation {
    pub model_name: String,
    pub train_metrics: RegressionMetrics,
    pub test_metrics: RegressionMetrics,
    pub overfitting_status: RegressionFitVerdict,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum ModelEvaluation {
    Classification(ClassificationEvaluation),
    Regression(RegressionEvaluation),
}

impl ModelEvaluation {
    pub fn model_name(&self) -> &str {
        match self {
            ModelEvaluation::Classification(e) => &e.model_name,
            ModelEvaluation::Regression(e) => &e.model_name,
        }
    }

    pub fn status(&self) -> crate::evaluation::FitStatus {
        match self {
            ModelEvaluation::Classification(e) => e.overfitting_status.status,
            ModelEvaluation::Regression(e) => e.overfitting_status.status,
        }
    }
}

/// Score a classifier on both splits and diagnose its fit
pub fn evaluate_classification(
    model_name: &str,
    train: &PredictionSet,
    test: &PredictionSet,
    thresholds: &FitThresholds,
) -> Result<ClassificationEvaluation> {
    tracing::info!("Evaluating classification model: {}", model_name);

    let train_metrics = classification_metrics(train)?;
    let test_metrics = classification_metrics(test)?;
    let confusion_matrix = ConfusionMatrix::new(&test.y_true, &test.y_pred)?;
    let classification_report = confusion_matrix.report();
    let overfitting_status = diagnose_classification(&train_metrics, &test_metrics, thresholds);

    tracing::info!("  Train Accuracy: {:.4}", train_metrics.accuracy);
    tracing::info!("  Test Accuracy: {:.4}", test_metrics.accuracy);
    tracing::info!("  Test F1: {:.4}", test_metrics.f1);
    if let Some(auc) = test_metrics.roc_auc {
        tracing::info!("  Test ROC-AUC: {:.4}", auc);
    }
    tracing::info!("  Overfitting Status: {}", overfitting_status.status);

    Ok(ClassificationEvaluation {
        model_name: model_name.to_string(),
        train_metrics,
        test_metrics,
        confusion_matrix,
        classification_report,
        overfitting_status,
        timestamp: Local::now(),
    })
}

/// Weighted scores of one split, with ROC-AUC when probabilities exist
fn classification_metrics(set: &PredictionSet) -> Result<ClassificationMetrics> {
    let mut metrics = ClassificationMetrics::compute(&set.y_true, &set.y_pred)?;
    if let Some(y_prob) = &set.y_prob {
        metrics.roc_auc = match roc_auc(&set.y_true, y_prob) {
            Ok(auc) => Some(auc),
            Err(MetricsError::NotBinary(classes)) => {
                tracing::warn!("ROC-AUC skipped: {} classes in y_true", classes);
                None
            }
            Err(e) => return Err(e.into()),
        };
    }
    Ok(metrics)
}

/// Score a regressor on both splits and diagnose its fit
pub fn evaluate_regression(
    model_name: &str,
    train: &PredictionSet,
    test: &PredictionSet,
    thresholds: &FitThresholds,
) -> Result<RegressionEvaluation> {
    tracing::info!("Evaluating regression model: {}", model_name);

    let train_metrics = RegressionMetrics::compute(&train.y_true, &train.y_pred)?;
    let test_metrics = RegressionMetrics::compute(&test.y_true, &test.y_pred)?;
    let overfitting_status = diagnose_regression(&train_metrics, &test_metrics, thresholds);

    tracing::info!("  Train R2: {:.4}", train_metrics.r2);
    tracing::info!("  Test R2: {:.4}", test_metrics.r2);
    tracing::info!("  Test RMSE: {:.4}", test_metrics.rmse);
    tracing::info!("  Overfitting Status: {}", overfitting_status.status);

    Ok(RegressionEvaluation {
        model_name: model_name.to_string(),
        train_metrics,
        test_metrics,
        overfitting_status,
        timestamp: Local::now(),
    })
}

/// Collected evaluations, keyed by model name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub models: BTreeMap<String, ModelEvaluation>,
}

impl EvaluationReport {
    pub fn insert(&mut self, evaluation: ModelEvaluation) {
        self.models
            .insert(evaluation.model_name().to_string(), evaluation);
    }

    /// Write the report as pretty JSON to `dir/model_evaluation_report.json`
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(EVALUATION_REPORT_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Saved evaluation report: {}", path.display());
        Ok(path)
    }
}
