// Drift detection between a reference dataset and current data
//
// Detectors:
// - feature: per-feature PSI with drift tiers
// - statistical: per-feature two-sample KS test
// - target: shift of the positive-class rate
// - performance: accuracy degradation of a model against its baseline
//
// `report` combines one run of every detector into a `DriftReport` and
// persists it through `ReportStore`.

mod feature;
mod ks;
mod performance;
mod psi;
mod report;
mod statistical;
mod summary;
mod target;


pub use feature::{
    detect_feature_drift, shared_numeric_columns, FeatureDriftReport, FeatureDriftStatus,
    FeatureDriftSummary, FeatureVerdict,
};
pub use ks::{kolmogorov_survival, ks_2samp, KsTestResult, KS_TEST_NAME};
pub use performance::{
    classify_degradation, detect_performance_drift, Classifier, DegradationStatus,
    PerformanceDriftReport, PerformanceError, PrecomputedPredictions,
};
pub use psi::{calculate_psi, DriftTier, PsiFailure, PsiOutcome};
pub use report::{
    recommendation, DriftReport, OverallAssessment, ReportError, ReportStore, SavedReport,
    LATEST_REPORT_FILE,
};
pub use statistical::{detect_statistical_drift, StatisticalDriftReport, StatisticalDriftSummary};
pub use summary::SampleSummary;
pub use target::{
    detect_target_drift, label_distribution, TargetDriftReport, TargetDriftStatus, POSITIVE_CLASS,
};

pub(crate) use target::label_key;
