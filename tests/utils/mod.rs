// Integration test utilities
//
// Deterministic synthetic cohorts written as CSV files

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "age,sleep_hours,stress_level,region,migraine_occurrence";

/// CSV body for a cohort of `n` rows
///
/// `age_offset` shifts every age; the first `positives` rows are labelled 1.
pub fn cohort_csv(n: usize, age_offset: i32, positives: usize) -> String {
    let mut content = format!("{}\n", HEADER);
    for i in 0..n {
        let age = 20 + (i * 37 % 50) as i32 + age_offset;
        let sleep = 5.0 + (i * 13 % 40) as f64 / 10.0;
        let stress = 1 + i % 10;
        let region = if i % 3 == 0 { "north" } else { "south" };
        let label = usize::from(i < positives);
        content.push_str(&format!(
            "{},{},{},{},{}\n",
            age, sleep, stress, region, label
        ));
    }
    content
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn write_cohort(dir: &Path, name: &str, n: usize, age_offset: i32, positives: usize) -> PathBuf {
    write_file(dir, name, &cohort_csv(n, age_offset, positives))
}

/// Predictions file with the first `wrong` of `labels` flipped
pub fn write_predictions(dir: &Path, name: &str, labels: &[u8], wrong: usize) -> PathBuf {
    let mut content = String::from("prediction\n");
    for (i, label) in labels.iter().enumerate() {
        let value = if i < wrong { 1 - label } else { *label };
        content.push_str(&format!("{}\n", value));
    }
    write_file(dir, name, &content)
}

/// Labels matching `cohort_csv(n, _, positives)`
pub fn cohort_labels(n: usize, positives: usize) -> Vec<u8> {
    (0..n).map(|i| u8::from(i < positives)).collect()
}

/// `y_true,y_pred` file
pub fn write_prediction_set(dir: &Path, name: &str, y_true: &[f64], y_pred: &[f64]) -> PathBuf {
    let mut content = String::from("y_true,y_pred\n");
    for (t, p) in y_true.iter().zip(y_pred) {
        content.push_str(&format!("{},{}\n", t, p));
    }
    write_file(dir, name, &content)
}
