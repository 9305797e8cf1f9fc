//! Integration tests for `deriva evaluate`, `deriva validate` and `deriva monitor`
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

mod utils;

use predicates::prelude::*;
use std::fs;
use utils::{write_cohort, write_file, write_prediction_set};

const MIGRAINE_COLUMNS: [&str; 25] = [
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

/// Full-schema dataset; `age_override` replaces the age of the first row
fn migraine_csv(rows: usize, age_override: Option<i32>) -> String {
    let mut content = MIGRAINE_COLUMNS.join(",");
    content.push('\n');
    for i in 0..rows {
        let age = match (i, age_override) {
            (0, Some(age)) => age,
            _ => 25 + i as i32,
        };
        let values: Vec<String> = MIGRAINE_COLUMNS
            .iter()
            .map(|column| match *column {
                "age" => age.to_string(),
                "gender" | "migraine_occurrence" => (i % 2).to_string(),
                "sleep_hours" => "7".to_string(),
                "sleep_quality" | "stress_level" => (1 + i % 10).to_string(),
                "migraine_severity" => (i % 10).to_string(),
                _ => (i % 3).to_string(),
            })
            .collect();
        content.push_str(&values.join(","));
        content.push('\n');
    }
    content
}

#[test]
fn test_evaluate_classification_overfitting() {
    let dir = tempfile::tempdir().unwrap();
    let y: Vec<f64> = (0..20).map(|i| f64::from(i % 2)).collect();
    let train = write_prediction_set(dir.path(), "train.csv", &y, &y);
    // Half of the test predictions wrong
    let flipped: Vec<f64> = y
        .iter()
        .enumerate()
        .map(|(i, v)| if i < 10 { 1.0 - v } else { *v })
        .collect();
    let test = write_prediction_set(dir.path(), "test.csv", &y, &flipped);
    let out = dir.path().join("evaluation");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("evaluate")
        .arg("--train")
        .arg(&train)
        .arg("--test")
        .arg(&test)
        .arg("--model-name")
        .arg("random_forest")
        .arg("--output-dir")
        .arg(&out);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Fit status: OVERFITTING"))
        .stdout(predicate::str::contains("Regularization"));

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.join("model_evaluation_report.json")).unwrap(),
    )
    .unwrap();
    let model = &report["models"]["random_forest"];
    assert_eq!(model["task"], "classification");
    assert_eq!(model["overfitting_status"]["severity"], "HIGH");
    assert_eq!(model["test_metrics"]["accuracy"], 0.5);
}

#[test]
fn test_evaluate_probabilities_add_roc_auc() {
    let dir = tempfile::tempdir().unwrap();
    let train = write_file(
        dir.path(),
        "train.csv",
        "y_true,y_pred,y_prob\n0,0,0.1\n0,0,0.2\n1,1,0.8\n1,1,0.9\n",
    );
    let test = write_file(
        dir.path(),
        "test.csv",
        "y_true,y_pred,y_prob\n0,0,0.1\n0,1,0.4\n1,0,0.35\n1,1,0.8\n",
    );
    let out = dir.path().join("evaluation");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("evaluate")
        .arg("--train")
        .arg(&train)
        .arg("--test")
        .arg(&test)
        .arg("--output-dir")
        .arg(&out);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ROC-AUC: 0.7500"))
        .stdout(predicate::str::contains("class 1: precision 0.5000"));

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.join("model_evaluation_report.json")).unwrap(),
    )
    .unwrap();
    let model = &report["models"]["model"];
    assert_eq!(model["train_metrics"]["roc_auc"], 1.0);
    assert_eq!(model["test_metrics"]["roc_auc"], 0.75);
    assert_eq!(model["classification_report"]["classes"]["0"]["support"], 2);
    assert_eq!(model["classification_report"]["weighted_avg"]["support"], 4);
}

#[test]
fn test_evaluate_regression_json() {
    let dir = tempfile::tempdir().unwrap();
    let y: Vec<f64> = (0..10).map(f64::from).collect();
    let train = write_prediction_set(dir.path(), "train.csv", &y, &y);
    let test = write_prediction_set(dir.path(), "test.csv", &y, &y);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("evaluate")
        .arg("--task")
        .arg("regression")
        .arg("--train")
        .arg(&train)
        .arg("--test")
        .arg(&test)
        .arg("--output-dir")
        .arg(dir.path().join("evaluation"))
        .arg("--format")
        .arg("json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["models"]["model"]["task"], "regression");
    assert_eq!(report["models"]["model"]["test_metrics"]["r2"], 1.0);
    assert_eq!(report["models"]["model"]["overfitting_status"]["status"], "GOOD_FIT");
}

#[test]
fn test_evaluate_missing_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_file(dir.path(), "bad.csv", "y_true\n1\n0\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("evaluate")
        .arg("--train")
        .arg(&bad)
        .arg("--test")
        .arg(&bad)
        .arg("--output-dir")
        .arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("y_pred"));
}

#[test]
fn test_validate_clean_dataset_passes() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "raw.csv", &migraine_csv(20, None));
    let output = dir.path().join("reports").join("data_validation.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("validate")
        .arg("--data")
        .arg(&data)
        .arg("--output")
        .arg(&output);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Overall Status: PASS"))
        .stdout(predicate::str::contains("Failed: 0"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["total_records"], 20);
    assert_eq!(report["checks"]["target_distribution"]["imbalance_ratio"], 1.0);
}

#[test]
fn test_validate_out_of_range_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "raw.csv", &migraine_csv(5, Some(150)));
    let output = dir.path().join("data_validation.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("validate")
        .arg("--data")
        .arg(&data)
        .arg("--output")
        .arg(&output);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Overall Status: FAIL"))
        .stdout(predicate::str::contains(
            "age: 1 values out of range [0, 120]",
        ));

    // Report is written even when validation fails
    assert!(output.exists());
}

#[test]
fn test_monitor_rejects_zero_interval() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_cohort(dir.path(), "ref.csv", 20, 0, 5);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("monitor")
        .arg("--reference")
        .arg(&reference)
        .arg("--current")
        .arg(&reference)
        .arg("--interval")
        .arg("0")
        .arg("--iterations")
        .arg("2");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--interval"));
}

#[test]
fn test_validate_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("validate")
        .arg("--data")
        .arg(dir.path().join("absent.csv"))
        .arg("--output")
        .arg(dir.path().join("out.json"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_monitor_bounded_run_writes_alerts() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_cohort(dir.path(), "ref.csv", 300, 0, 90);
    let current = write_cohort(dir.path(), "cur.csv", 300, 40, 90);
    let alerts = dir.path().join("alerts");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("deriva");
    cmd.arg("monitor")
        .arg("--reference")
        .arg(&reference)
        .arg("--current")
        .arg(&current)
        .arg("--interval")
        .arg("1")
        .arg("--iterations")
        .arg("2")
        .arg("--reports-dir")
        .arg(dir.path().join("drift"))
        .arg("--alerts-dir")
        .arg(&alerts);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Checks run: 2, alerts raised: 4"));

    // One timestamped report per cycle plus the latest copy
    assert_eq!(fs::read_dir(dir.path().join("drift")).unwrap().count(), 3);

    let files: Vec<_> = fs::read_dir(&alerts).unwrap().collect();
    assert!(!files.is_empty());
    let lines: usize = files
        .into_iter()
        .map(|f| fs::read_to_string(f.unwrap().path()).unwrap().lines().count())
        .sum();
    assert_eq!(lines, 4);
}
