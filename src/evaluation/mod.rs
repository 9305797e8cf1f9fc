// Model evaluation: metrics, fit diagnosis, and evaluation reports
//
// Train and test scores are compared to decide whether a model generalizes
// (GOOD_FIT), memorizes its training split (OVERFITTING), or lacks capacity
// (UNDERFITTING). Gap and floor thresholds come from `FitThresholds`.

mod fit;
pub mod metrics;
mod report;

pub use fit::{
    diagnose_classification, diagnose_regression, ClassificationFitVerdict, FitSeverity,
    FitStatus, RegressionFitVerdict,
};
pub use metrics::{
    roc_auc, ClassScores, ClassificationMetrics, ClassificationReport, ConfusionMatrix,
    MetricsError, RegressionMetrics,
};
pub use report::{
    evaluate_classification, evaluate_regression, ClassificationEvaluation, EvaluationError,
    EvaluationReport, ModelEvaluation, PredictionSet, RegressionEvaluation,
    EVALUATION_REPORT_FILE,
};
