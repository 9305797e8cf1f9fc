//! Periodic drift monitoring with JSONL alerts
//!
//! Each cycle reloads the current dataset, runs and persists a comprehensive
//! drift check, and appends any alerts to `alerts_YYYYMMDD.jsonl`.

use crate::config::DriftConfig;
use crate::dataset::Dataset;
use crate::drift::{DriftReport, PrecomputedPredictions, ReportStore};
use crate::session::{DriftSession, PerformanceInputs};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Column read from a predictions file
pub const PREDICTION_COLUMN: &str = "prediction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: DateTime<Local>,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
}

impl Alert {
    pub fn new(alert_type: &str, severity: AlertSeverity, message: String) -> Self {
        Self {
            timestamp: Local::now(),
            alert_type: alert_type.to_string(),
            severity,
            message,
        }
    }
}

/// Alerts raised by one drift report
pub fn alerts_for(report: &DriftReport, config: &DriftConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for (feature, verdict) in &report.feature_drift.feature_drift {
        if verdict.psi > config.psi.significant {
            alerts.push(Alert::new(
                "data_drift",
                AlertSeverity::Warning,
                format!(
                    "Significant drift detected in '{}': PSI={:.4}",
                    feature, verdict.psi
                ),
            ));
        }
    }

    if let Some(perf) = &report.performance_drift {
        if perf.performance_degradation_pct > config.drift.significant_degradation_pct {
            alerts.push(Alert::new(
                "performance_degradation",
                AlertSeverity::Critical,
                format!(
                    "Significant performance degradation: {:.2}%",
                    perf.performance_degradation_pct
                ),
            ));
        }
    }

    if report.drift_detected() {
        alerts.push(Alert::new(
            "drift_detected",
            AlertSeverity::Warning,
            report.overall_assessment.recommendation.clone(),
        ));
    }

    alerts
}

/// Append-only alert files, one per day
#[derive(Debug, Clone)]
pub struct AlertLog {
    dir: PathBuf,
}

impl AlertLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File that alerts raised at `at` go to
    pub fn path_for(&self, at: &DateTime<Local>) -> PathBuf {
        self.dir
            .join(format!("alerts_{}.jsonl", at.format("%Y%m%d")))
    }

    /// Append one alert as a JSON line
    pub fn append(&self, alert: &Alert) -> Result<PathBuf> {
        match alert.severity {
            AlertSeverity::Critical => tracing::error!("CRITICAL ALERT: {}", alert.message),
            AlertSeverity::Warning => tracing::warn!("WARNING: {}", alert.message),
            AlertSeverity::Info => tracing::info!("INFO: {}", alert.message),
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create alerts directory {}", self.dir.display()))?;
        let path = self.path_for(&alert.timestamp);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open alert log {}", path.display()))?;
        writeln!(file, "{}", serde_json::to_string(alert)?)?;
        Ok(path)
    }
}

/// Where each cycle reads its current data from
#[derive(Debug, Clone)]
pub struct MonitorSource {
    pub current: PathBuf,
    /// Predictions file with a `prediction` column, row-aligned with `current`
    pub predictions: Option<PathBuf>,
    pub baseline_accuracy: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions {
    pub interval: Duration,
    /// Number of cycles to run; 0 runs until the process is stopped
    pub iterations: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    pub checks_run: u64,
    pub alerts_raised: usize,
}

/// Run one monitoring cycle: reload, check, persist, alert
pub fn run_cycle(
    session: &DriftSession,
    source: &MonitorSource,
    store: &ReportStore,
    alerts: &AlertLog,
) -> Result<(DriftReport, usize)> {
    let current = Dataset::from_csv_path(&source.current)
        .with_context(|| format!("Failed to load current data {}", source.current.display()))?;

    let model = match (&source.predictions, source.baseline_accuracy) {
        (Some(path), Some(_)) => Some(load_predictions(path)?),
        _ => None,
    };
    let performance = match (&model, source.baseline_accuracy) {
        (Some(model), Some(baseline_accuracy)) => Some(PerformanceInputs {
            model,
            baseline_accuracy,
        }),
        _ => None,
    };

    let report = session.comprehensive_drift_check(&current, performance, store)?;

    let raised = alerts_for(&report, session.config());
    for alert in &raised {
        alerts.append(alert)?;
    }
    Ok((report, raised.len()))
}

/// Load a predictions file as a replayable model
pub fn load_predictions(path: &Path) -> Result<PrecomputedPredictions> {
    let dataset = Dataset::from_csv_path(path)
        .with_context(|| format!("Failed to load predictions {}", path.display()))?;
    PrecomputedPredictions::from_column(&dataset, PREDICTION_COLUMN)
}

/// Run cycles every `options.interval` until `options.iterations` are done
pub fn run_monitor(
    session: &DriftSession,
    source: &MonitorSource,
    store: &ReportStore,
    alerts: &AlertLog,
    options: MonitorOptions,
) -> Result<MonitorSummary> {
    tracing::info!(
        "Starting continuous monitoring (interval: {}s)",
        options.interval.as_secs()
    );

    let mut summary = MonitorSummary::default();
    loop {
        let (report, raised) = run_cycle(session, source, store, alerts)?;
        summary.checks_run += 1;
        summary.alerts_raised += raised;

        tracing::info!(
            "Check {}: drift_detected={} alerts={}",
            summary.checks_run,
            report.drift_detected(),
            raised
        );

        if options.iterations != 0 && summary.checks_run >= options.iterations {
            break;
        }
        thread::sleep(options.interval);
    }

    tracing::info!(
        "Monitoring finished: {} checks, {} alerts",
        summary.checks_run,
        summary.alerts_raised
    );
    Ok(summary)
}
