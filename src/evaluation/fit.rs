// Overfitting / underfitting diagnosis from train-test metric gaps
//
// The gap check always runs first: a large train/test gap is reported as
// OVERFITTING even when the test score alone would also qualify as
// underfitting.

use crate::config::FitThresholds;
use crate::evaluation::metrics::{ClassificationMetrics, RegressionMetrics};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitStatus {
    Overfitting,
    Underfitting,
    GoodFit,
}

impl FitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitStatus::Overfitting => "OVERFITTING",
            FitStatus::Underfitting => "UNDERFITTING",
            FitStatus::GoodFit => "GOOD_FIT",
        }
    }

    /// Fixed advice for each status
    pub fn recommendation(&self) -> &'static str {
        match self {
            FitStatus::Overfitting => {
                "Consider: 1) Regularization, 2) More training data, 3) Reduce model complexity, 4) Cross-validation"
            }
            FitStatus::Underfitting => {
                "Consider: 1) More complex model, 2) More features, 3) Feature engineering, 4) Remove regularization"
            }
            FitStatus::GoodFit => "Model is performing well! Continue monitoring.",
        }
    }
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitSeverity {
    None,
    Medium,
    High,
}

/// Fit diagnosis for a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationFitVerdict {
    pub status: FitStatus,
    pub severity: FitSeverity,
    pub accuracy_gap: f64,
    pub f1_gap: f64,
    pub recommendation: String,
}

/// Fit diagnosis for a regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFitVerdict {
    pub status: FitStatus,
    pub severity: FitSeverity,
    pub r2_gap: f64,
    pub recommendation: String,
}

/// Diagnose a classifier from its train and test scores
///
/// OVERFITTING when the accuracy or F1 gap exceeds `overfit_gap` (HIGH when
/// the accuracy gap exceeds `overfit_high_gap`); otherwise UNDERFITTING when
/// test accuracy is below `underfit_accuracy` (HIGH below
/// `underfit_high_accuracy`); otherwise GOOD_FIT.
///
/// # Example
/// ```
/// use deriva::config::FitThresholds;
/// use deriva::evaluation::{diagnose_classification, ClassificationMetrics, FitStatus};
///
/// let train = ClassificationMetrics { accuracy: 0.95, precision: 0.95, recall: 0.95, f1: 0.95, roc_auc: None };
/// let test = ClassificationMetrics { accuracy: 0.80, precision: 0.80, recall: 0.80, f1: 0.80, roc_auc: None };
/// let verdict = diagnose_classification(&train, &test, &FitThresholds::default());
/// assert_eq!(verdict.status, FitStatus::Overfitting);
/// ```
pub fn diagnose_classification(
    train: &ClassificationMetrics,
    test: &ClassificationMetrics,
    thresholds: &FitThresholds,
) -> ClassificationFitVerdict {
    let accuracy_gap = train.accuracy - test.accuracy;
    let f1_gap = train.f1 - test.f1;

    let (status, severity) =
        if accuracy_gap > thresholds.overfit_gap || f1_gap > thresholds.overfit_gap {
            let severity = if accuracy_gap > thresholds.overfit_high_gap {
                FitSeverity::High
            } else {
                FitSeverity::Medium
            };
            (FitStatus::Overfitting, severity)
        } else if test.accuracy < thresholds.underfit_accuracy {
            let severity = if test.accuracy < thresholds.underfit_high_accuracy {
                FitSeverity::High
            } else {
                FitSeverity::Medium
            };
            (FitStatus::Underfitting, severity)
        } else {
            (FitStatus::GoodFit, FitSeverity::None)
        };

    ClassificationFitVerdict {
        status,
        severity,
        accuracy_gap,
        f1_gap,
        recommendation: status.recommendation().to_string(),
    }
}

/// Diagnose a regressor from its train and test R²
pub fn diagnose_regression(
    train: &RegressionMetrics,
    test: &RegressionMetrics,
    thresholds: &FitThresholds,
) -> RegressionFitVerdict {
    let r2_gap = train.r2 - test.r2;

    let (status, severity) = if r2_gap > thresholds.overfit_gap {
        let severity = if r2_gap > thresholds.overfit_high_gap {
            FitSeverity::High
        } else {
            FitSeverity::Medium
        };
        (FitStatus::Overfitting, severity)
    } else if test.r2 < thresholds.underfit_r2 {
        let severity = if test.r2 < thresholds.underfit_high_r2 {
            FitSeverity::High
        } else {
            FitSeverity::Medium
        };
        (FitStatus::Underfitting, severity)
    } else {
        (FitStatus::GoodFit, FitSeverity::None)
    };

    RegressionFitVerdict {
        status,
        severity,
        r2_gap,
        recommendation: status.recommendation().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cls(accuracy: f64, f1: f64) -> ClassificationMetrics {
        ClassificationMetrics {
            accuracy,
            precision: accuracy,
            recall: accuracy,
            f1,
            roc_auc: None,
        }
    }

    fn reg(r2: f64) -> RegressionMetrics {
        RegressionMetrics {
            mse: 1.0,
            rmse: 1.0,
            mae: 1.0,
            r2,
        }
    }

    #[test]
    fn test_gap_at_high_boundary_is_medium() {
        let v = diagnose_classification(&cls(0.95, 0.95), &cls(0.80, 0.80), &FitThresholds::default());
        assert_eq!(v.status, FitStatus::Overfitting);
        assert_eq!(v.severity, FitSeverity::Medium);
    }

    #[test]
    fn test_large_gap_is_high() {
        let v = diagnose_classification(&cls(0.99, 0.99), &cls(0.75, 0.75), &FitThresholds::default());
        assert_eq!(v.status, FitStatus::Overfitting);
        assert_eq!(v.severity, FitSeverity::High);
    }

    #[test]
    fn test_gap_check_precedes_underfitting() {
        let v = diagnose_classification(&cls(0.70, 0.70), &cls(0.55, 0.55), &FitThresholds::default());
        assert_eq!(v.status, FitStatus::Overfitting);
        assert_eq!(v.severity, FitSeverity::Medium);
    }

    #[test]
    fn test_f1_gap_alone_triggers_overfitting() {
        let v = diagnose_classification(&cls(0.85, 0.90), &cls(0.82, 0.70), &FitThresholds::default());
        assert_eq!(v.status, FitStatus::Overfitting);
        // Severity follows the accuracy gap
        assert_eq!(v.severity, FitSeverity::Medium);
        assert!((v.f1_gap - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_underfitting_tiers() {
        let t = FitThresholds::default();
        let medium = diagnose_classification(&cls(0.58, 0.58), &cls(0.55, 0.55), &t);
        assert_eq!(medium.status, FitStatus::Underfitting);
        assert_eq!(medium.severity, FitSeverity::Medium);

        let high = diagnose_classification(&cls(0.48, 0.48), &cls(0.45, 0.45), &t);
        assert_eq!(high.status, FitStatus::Underfitting);
        assert_eq!(high.severity, FitSeverity::High);
    }

    #[test]
    fn test_good_fit() {
        let v = diagnose_classification(&cls(0.88, 0.87), &cls(0.85, 0.84), &FitThresholds::default());
        assert_eq!(v.status, FitStatus::GoodFit);
        assert_eq!(v.severity, FitSeverity::None);
        assert_eq!(v.recommendation, "Model is performing well! Continue monitoring.");
    }

    #[test]
    fn test_regression_variants() {
        let t = FitThresholds::default();

        let over = diagnose_regression(&reg(0.95), &reg(0.70), &t);
        assert_eq!(over.status, FitStatus::Overfitting);
        assert_eq!(over.severity, FitSeverity::High);

        let under = diagnose_regression(&reg(0.45), &reg(0.40), &t);
        assert_eq!(under.status, FitStatus::Underfitting);
        assert_eq!(under.severity, FitSeverity::Medium);

        let very_under = diagnose_regression(&reg(0.25), &reg(0.20), &t);
        assert_eq!(very_under.severity, FitSeverity::High);

        let good = diagnose_regression(&reg(0.80), &reg(0.75), &t);
        assert_eq!(good.status, FitStatus::GoodFit);
    }

    #[test]
    fn test_verdict_serialization() {
        let v = diagnose_classification(&cls(0.9, 0.9), &cls(0.5, 0.5), &FitThresholds::default());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["status"], "OVERFITTING");
        assert_eq!(json["severity"], "HIGH");
        assert!(json["recommendation"]
            .as_str()
            .unwrap()
            .starts_with("Consider: 1) Regularization"));
    }
}
