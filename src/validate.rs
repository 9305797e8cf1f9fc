//! Data validation for raw migraine datasets
//!
//! Six checks run against a loaded dataset. Only `missing_columns` and
//! `value_ranges` can fail a dataset; the others warn or always pass.

use crate::dataset::{ColumnData, Dataset};
use crate::drift::{label_key, SampleSummary};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the persisted validation report
pub const VALIDATION_REPORT_FILE: &str = "data_validation.json";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Fail => "FAIL",
        }
    }

    fn pass_or(ok: bool, otherwise: CheckStatus) -> Self {
        if ok {
            CheckStatus::Pass
        } else {
            otherwise
        }
    }
}

/// Column type a validation rule expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// Every value is a whole number
    Integer,
    /// Any float
    Numeric,
}

/// Schema a dataset is validated against
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub required_columns: Vec<String>,
    pub expected_types: Vec<(String, ExpectedType)>,
    /// Inclusive `[min, max]` per column
    pub value_ranges: Vec<(String, f64, f64)>,
    pub target_column: String,
}

impl Default for ValidationRules {
    /// Schema of the migraine trigger dataset
    fn default() -> Self {
        let required = [
            "age",
            "gender",
            "sleep_hours",
            "sleep_quality",
            "stress_level",
            "hydration",
            "exercise",
            "screen_time",
            "caffeine_intake",
            "alcohol_intake",
            "weather_changes",
            "menstrual_cycle",
            "dehydration",
            "bright_light",
            "loud_noises",
            "strong_smells",
            "missed_meals",
            "specific_foods",
            "physical_activity",
            "neck_pain",
            "weather_pressure",
            "humidity",
            "temperature_change",
            "migraine_occurrence",
            "migraine_severity",
        ];

        Self {
            required_columns: required.iter().map(|c| c.to_string()).collect(),
            expected_types: vec![
                ("age".into(), ExpectedType::Numeric),
                ("gender".into(), ExpectedType::Integer),
                ("migraine_occurrence".into(), ExpectedType::Integer),
                ("migraine_severity".into(), ExpectedType::Numeric),
            ],
            value_ranges: vec![
                ("age".into(), 0.0, 120.0),
                ("gender".into(), 0.0, 1.0),
                ("sleep_hours".into(), 0.0, 24.0),
                ("sleep_quality".into(), 1.0, 10.0),
                ("stress_level".into(), 1.0, 10.0),
                ("migraine_occurrence".into(), 0.0, 1.0),
                ("migraine_severity".into(), 0.0, 10.0),
            ],
            target_column: "migraine_occurrence".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingColumnsCheck {
    pub status: CheckStatus,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValuesCheck {
    pub status: CheckStatus,
    pub total_missing: usize,
    pub columns_with_missing: BTreeMap<String, usize>,
}

/// A check that reports a list of human-readable issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuesCheck {
    pub status: CheckStatus,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDistributionCheck {
    pub status: CheckStatus,
    pub distribution: BTreeMap<String, usize>,
    /// Largest class count over smallest
    pub imbalance_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatesCheck {
    pub status: CheckStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationChecks {
    pub missing_columns: MissingColumnsCheck,
    pub missing_values: MissingValuesCheck,
    pub data_types: IssuesCheck,
    pub value_ranges: IssuesCheck,
    /// Absent when the dataset has no target column
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_distribution: Option<TargetDistributionCheck>,
    pub duplicates: DuplicatesCheck,
}

impl ValidationChecks {
    pub fn statuses(&self) -> Vec<CheckStatus> {
        let mut statuses = vec![
            self.missing_columns.status,
            self.missing_values.status,
            self.data_types.status,
            self.value_ranges.status,
        ];
        if let Some(target) = &self.target_distribution {
            statuses.push(target.status);
        }
        statuses.push(self.duplicates.status);
        statuses
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub numeric_summary: BTreeMap<String, SampleSummary>,
    /// Pearson correlation of each numeric column with the target
    pub correlation_with_target: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub timestamp: DateTime<Local>,
    pub dataset_path: String,
    pub total_records: usize,
    pub checks: ValidationChecks,
    pub statistics: DatasetStatistics,
    /// PASS unless any check failed
    pub overall_status: CheckStatus,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.overall_status == CheckStatus::Pass
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Saved validation report: {}", path.display());
        Ok(())
    }
}

/// Run every check on `dataset`
///
/// `source` is recorded in the report as the dataset path.
pub fn validate_dataset(dataset: &Dataset, source: &str, rules: &ValidationRules) -> ValidationReport {
    tracing::info!("Starting data validation of {}", source);

    let checks = ValidationChecks {
        missing_columns: check_missing_columns(dataset, rules),
        missing_values: check_missing_values(dataset),
        data_types: check_data_types(dataset, rules),
        value_ranges: check_value_ranges(dataset, rules),
        target_distribution: check_target_distribution(dataset, rules),
        duplicates: check_duplicates(dataset),
    };

    let statuses = checks.statuses();
    let failed = statuses.iter().filter(|s| **s == CheckStatus::Fail).count();
    let warnings = statuses.iter().filter(|s| **s == CheckStatus::Warning).count();
    let summary = ValidationSummary {
        total_checks: statuses.len(),
        passed: statuses.len() - failed - warnings,
        warnings,
        failed,
    };
    let overall_status = CheckStatus::pass_or(failed == 0, CheckStatus::Fail);

    tracing::info!("Total records: {}", dataset.len());
    tracing::info!("Overall status: {}", overall_status.as_str());
    tracing::info!(
        "Passed: {} Warnings: {} Failed: {}",
        summary.passed,
        summary.warnings,
        summary.failed
    );

    ValidationReport {
        timestamp: Local::now(),
        dataset_path: source.to_string(),
        total_records: dataset.len(),
        checks,
        statistics: statistics(dataset, &rules.target_column),
        overall_status,
        summary,
    }
}

fn check_missing_columns(dataset: &Dataset, rules: &ValidationRules) -> MissingColumnsCheck {
    let missing: Vec<String> = rules
        .required_columns
        .iter()
        .filter(|c| !dataset.has_column(c))
        .cloned()
        .collect();
    for column in &missing {
        tracing::warn!("Missing required column: {}", column);
    }
    MissingColumnsCheck {
        status: CheckStatus::pass_or(missing.is_empty(), CheckStatus::Fail),
        missing,
    }
}

fn check_missing_values(dataset: &Dataset) -> MissingValuesCheck {
    let columns_with_missing: BTreeMap<String, usize> = dataset
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.missing_count()))
        .filter(|(_, count)| *count > 0)
        .collect();
    let total_missing = columns_with_missing.values().sum();
    MissingValuesCheck {
        status: CheckStatus::pass_or(total_missing == 0, CheckStatus::Warning),
        total_missing,
        columns_with_missing,
    }
}

fn check_data_types(dataset: &Dataset, rules: &ValidationRules) -> IssuesCheck {
    let mut issues = Vec::new();
    for (name, expected) in &rules.expected_types {
        let Some(column) = dataset.column(name) else {
            continue;
        };
        match (&column.data, expected) {
            (ColumnData::Text(_), _) => issues.push(format!("{}: expected numeric, got text", name)),
            // A gap forces the column to float, as a fractional value does
            (ColumnData::Numeric(values), ExpectedType::Integer) => {
                if values.iter().any(|v| v.map_or(true, |v| v.fract() != 0.0)) {
                    issues.push(format!("{}: expected integer, got float", name));
                }
            }
            (ColumnData::Numeric(_), ExpectedType::Numeric) => {}
        }
    }
    IssuesCheck {
        status: CheckStatus::pass_or(issues.is_empty(), CheckStatus::Warning),
        issues,
    }
}

fn check_value_ranges(dataset: &Dataset, rules: &ValidationRules) -> IssuesCheck {
    let mut issues = Vec::new();
    for (name, min, max) in &rules.value_ranges {
        let Some(values) = dataset.numeric(name) else {
            continue;
        };
        let out_of_range = values
            .iter()
            .flatten()
            .filter(|v| **v < *min || **v > *max)
            .count();
        if out_of_range > 0 {
            issues.push(format!(
                "{}: {} values out of range [{}, {}]",
                name, out_of_range, min, max
            ));
        }
    }
    IssuesCheck {
        status: CheckStatus::pass_or(issues.is_empty(), CheckStatus::Fail),
        issues,
    }
}

fn check_target_distribution(
    dataset: &Dataset,
    rules: &ValidationRules,
) -> Option<TargetDistributionCheck> {
    let labels = dataset.numeric(&rules.target_column)?;

    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    for value in labels.iter().flatten() {
        *distribution.entry(label_key(*value)).or_insert(0) += 1;
    }

    let max = distribution.values().copied().max().unwrap_or(0);
    let min = distribution.values().copied().min().unwrap_or(0);
    let imbalance_ratio = if min > 0 { max as f64 / min as f64 } else { 0.0 };

    Some(TargetDistributionCheck {
        status: CheckStatus::Pass,
        distribution,
        imbalance_ratio,
    })
}

fn check_duplicates(dataset: &Dataset) -> DuplicatesCheck {
    let count = dataset.duplicate_rows();
    DuplicatesCheck {
        status: CheckStatus::pass_or(count == 0, CheckStatus::Warning),
        count,
    }
}

fn statistics(dataset: &Dataset, target_column: &str) -> DatasetStatistics {
    let mut numeric_summary = BTreeMap::new();
    let mut correlation_with_target = BTreeMap::new();
    let target = dataset.numeric(target_column);

    for column in dataset.columns() {
        let ColumnData::Numeric(values) = &column.data else {
            continue;
        };
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        numeric_summary.insert(column.name.clone(), SampleSummary::from_values(&present));

        if let Some(target) = target {
            if let Some(r) = pearson(values, target) {
                correlation_with_target.insert(column.name.clone(), r);
            }
        }
    }

    DatasetStatistics {
        numeric_summary,
        correlation_with_target,
    }
}

/// Pearson correlation over rows where both values are present
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    let denom = (var_x * var_y).sqrt();
    (denom > 0.0).then(|| cov / denom)
}
