//! Classification and regression metrics
//!
//! Weighted averages follow the usual convention: per-class scores are
//! weighted by the class support in `y_true`, classes are the union of
//! observed true and predicted labels, and an undefined ratio counts as 0.

use crate::drift::label_key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors raised when predictions and labels cannot be compared
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MetricsError {
    #[error("Length mismatch: {truth} true values, {predicted} predictions")]
    LengthMismatch { truth: usize, predicted: usize },

    #[error("Cannot score an empty prediction set")]
    Empty,

    #[error("ROC-AUC needs exactly two classes in y_true, found {0}")]
    NotBinary(usize),
}

pub type Result<T> = std::result::Result<T, MetricsError>;

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(MetricsError::LengthMismatch {
            truth: y_true.len(),
            predicted: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(MetricsError::Empty);
    }
    Ok(())
}

/// Classification scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Present when positive-class probabilities were supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roc_auc: Option<f64>,
}

impl ClassificationMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;
        let confusion = ConfusionMatrix::new(y_true, y_pred)?;
        let (precision, recall, f1) = confusion.weighted_scores();
        Ok(Self {
            accuracy: confusion.accuracy(),
            precision,
            recall,
            f1,
            roc_auc: None,
        })
    }
}

/// Regression scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;
        let n = y_true.len() as f64;

        let mse = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / n;
        let mae = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (t - p).abs())
            .sum::<f64>()
            / n;

        let mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
        let ss_res = mse * n;
        // Constant target: perfect predictions score 1, anything else 0
        let r2 = if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        };

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
        })
    }
}

/// Accuracy: fraction of exact label matches
pub fn accuracy(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Support-weighted F1 over all observed labels
pub fn weighted_f1(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    Ok(ConfusionMatrix::new(y_true, y_pred)?.weighted_scores().2)
}

/// Area under the ROC curve for binary labels
///
/// The larger of the two labels is the positive class. Computed as the
/// normalized Mann-Whitney U statistic with tied scores sharing their
/// average rank, which equals the trapezoidal area under the ROC curve.
pub fn roc_auc(y_true: &[f64], scores: &[f64]) -> Result<f64> {
    check_lengths(y_true, scores)?;

    let mut classes: Vec<f64> = y_true.iter().map(|v| v + 0.0).collect();
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    if classes.len() != 2 {
        return Err(MetricsError::NotBinary(classes.len()));
    }
    let positive = classes[1];

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // 1-based average ranks over runs of equal scores
    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        let positives_in_run = order[start..end]
            .iter()
            .filter(|&&i| y_true[i] == positive)
            .count();
        positive_rank_sum += rank * positives_in_run as f64;
        start = end;
    }

    let n_pos = y_true.iter().filter(|&&v| v == positive).count() as f64;
    let n_neg = y_true.len() as f64 - n_pos;
    Ok((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Precision, recall and F1 of one class (or an average over classes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class scores with macro and support-weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Keyed by label, integral labels without a fractional part
    pub classes: BTreeMap<String, ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

/// Confusion matrix over the sorted union of labels (rows = truth)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<f64>,
    pub matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;

        // `+ 0.0` folds -0.0 into 0.0 so both share a bit pattern
        let mut labels: Vec<f64> = y_true.iter().chain(y_pred).map(|v| v + 0.0).collect();
        labels.sort_by(f64::total_cmp);
        labels.dedup();

        let index: BTreeMap<u64, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.to_bits(), i))
            .collect();

        let mut matrix = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            matrix[index[&(t + 0.0).to_bits()]][index[&(p + 0.0).to_bits()]] += 1;
        }

        Ok(Self { labels, matrix })
    }

    fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.labels.len()).map(|i| self.matrix[i][i]).sum();
        correct as f64 / self.total() as f64
    }

    /// Scores of the class at `index` in `labels`
    fn class_scores(&self, index: usize) -> ClassScores {
        let tp = self.matrix[index][index] as f64;
        let support: usize = self.matrix[index].iter().sum();
        let predicted: usize = self.matrix.iter().map(|row| row[index]).sum();

        let precision = if predicted > 0 { tp / predicted as f64 } else { 0.0 };
        let recall = if support > 0 { tp / support as f64 } else { 0.0 };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassScores {
            precision,
            recall,
            f1_score,
            support,
        }
    }

    /// Weighted (precision, recall, f1)
    pub fn weighted_scores(&self) -> (f64, f64, f64) {
        let total = self.total() as f64;
        (0..self.labels.len())
            .map(|i| self.class_scores(i))
            .fold((0.0, 0.0, 0.0), |(p, r, f), scores| {
                let weight = scores.support as f64 / total;
                (
                    p + weight * scores.precision,
                    r + weight * scores.recall,
                    f + weight * scores.f1_score,
                )
            })
    }

    /// Per-class breakdown in the layout of a classification report
    pub fn report(&self) -> ClassificationReport {
        let per_class: Vec<ClassScores> =
            (0..self.labels.len()).map(|i| self.class_scores(i)).collect();
        let k = per_class.len() as f64;
        let total = self.total();

        let macro_avg = ClassScores {
            precision: per_class.iter().map(|s| s.precision).sum::<f64>() / k,
            recall: per_class.iter().map(|s| s.recall).sum::<f64>() / k,
            f1_score: per_class.iter().map(|s| s.f1_score).sum::<f64>() / k,
            support: total,
        };
        let (precision, recall, f1_score) = self.weighted_scores();

        ClassificationReport {
            classes: self
                .labels
                .iter()
                .map(|&label| label_key(label))
                .zip(per_class)
                .collect(),
            accuracy: self.accuracy(),
            macro_avg,
            weighted_avg: ClassScores {
                precision,
                recall,
                f1_score,
                support: total,
            },
        }
    }
}
