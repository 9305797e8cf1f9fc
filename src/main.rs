use anyhow::{Context, Result};
use clap::Parser;
use deriva::cli::{
    CheckArgs, Cli, Command, EvaluateArgs, MonitorArgs, OutputFormat, Preset, Task, ValidateArgs,
};
use deriva::config::DriftConfig;
use deriva::dataset::Dataset;
use deriva::drift::{DriftReport, ReportStore};
use deriva::evaluation::{
    evaluate_classification, evaluate_regression, EvaluationReport, ModelEvaluation, PredictionSet,
};
use deriva::monitor::{self, AlertLog, MonitorOptions, MonitorSource};
use deriva::session::{DriftSession, PerformanceInputs};
use deriva::validate::{validate_dataset, ValidationReport, ValidationRules};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const RULE: &str = "================================================================================";

/// Initialize the tracing subscriber on stderr
///
/// `RUST_LOG` wins when set; otherwise `info`, or `trace` with `--debug`.
fn init_tracing(debug: bool) {
    let default_level = if debug { "trace" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Preset thresholds, replaced wholesale by a config file when given
fn load_config(cli: &Cli) -> Result<DriftConfig> {
    if let Some(path) = &cli.config {
        return DriftConfig::from_toml(path);
    }
    Ok(match cli.preset {
        Preset::Default => DriftConfig::default(),
        Preset::Strict => DriftConfig::strict(),
        Preset::Permissive => DriftConfig::permissive(),
    })
}

fn print_drift_summary(report: &DriftReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let summary = &report.feature_drift.summary;
            println!("{}", RULE);
            println!("DRIFT DETECTION SUMMARY");
            println!("{}", RULE);
            println!("Data size: {}", report.data_size);
            println!(
                "Features analyzed: {} (drifted: {}, {:.1}%)",
                summary.total_features, summary.drifted_features, summary.drift_percentage
            );
            if !summary.drifted_feature_names.is_empty() {
                println!("Drifted features: {}", summary.drifted_feature_names.join(", "));
            }
            match &report.target_drift {
                Some(target) => println!(
                    "Target drift: {:.4} ({:?})",
                    target.drift_magnitude, target.status
                ),
                None => println!("Target drift: unavailable"),
            }
            if let Some(perf) = &report.performance_drift {
                println!(
                    "Performance: {:.4} vs baseline {:.4} ({})",
                    perf.current_accuracy,
                    perf.baseline_accuracy,
                    perf.status.as_str()
                );
            }
            println!("Drift Detected: {}", report.overall_assessment.drift_detected);
            println!("Recommendation: {}", report.overall_assessment.recommendation);
            println!("{}", RULE);
        }
    }
    Ok(())
}

fn run_check(args: CheckArgs, mut config: DriftConfig, format: OutputFormat) -> Result<ExitCode> {
    if let Some(dir) = args.reports_dir {
        config.reports_dir = dir;
    }
    let store = ReportStore::new(&config.reports_dir);
    let session = DriftSession::load(&args.reference, config)
        .with_context(|| format!("Failed to load reference data {}", args.reference.display()))?;
    let current = Dataset::from_csv_path(&args.current)
        .with_context(|| format!("Failed to load current data {}", args.current.display()))?;

    let model = args
        .predictions
        .as_deref()
        .map(monitor::load_predictions)
        .transpose()?;
    let performance = match (&model, args.baseline_accuracy) {
        (Some(model), Some(baseline_accuracy)) => Some(PerformanceInputs {
            model,
            baseline_accuracy,
        }),
        _ => None,
    };

    let report = session.comprehensive_drift_check(&current, performance, &store)?;
    print_drift_summary(&report, format)?;
    Ok(ExitCode::SUCCESS)
}

fn run_evaluate(args: EvaluateArgs, config: DriftConfig, format: OutputFormat) -> Result<ExitCode> {
    let train = PredictionSet::from_csv_path(&args.train)
        .with_context(|| format!("Failed to load train predictions {}", args.train.display()))?;
    let test = PredictionSet::from_csv_path(&args.test)
        .with_context(|| format!("Failed to load test predictions {}", args.test.display()))?;

    let evaluation = match args.task {
        Task::Classification => ModelEvaluation::Classification(evaluate_classification(
            &args.model_name,
            &train,
            &test,
            &config.fit,
        )?),
        Task::Regression => ModelEvaluation::Regression(evaluate_regression(
            &args.model_name,
            &train,
            &test,
            &config.fit,
        )?),
    };

    let mut report = EvaluationReport::default();
    report.insert(evaluation);
    report.save(&args.output_dir)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("{}", RULE);
            println!("MODEL EVALUATION SUMMARY");
            println!("{}", RULE);
            for (name, evaluation) in &report.models {
                match evaluation {
                    ModelEvaluation::Classification(e) => {
                        println!(
                            "{}: accuracy {:.4} (train {:.4}), f1 {:.4}",
                            name,
                            e.test_metrics.accuracy,
                            e.train_metrics.accuracy,
                            e.test_metrics.f1
                        );
                        if let Some(auc) = e.test_metrics.roc_auc {
                            println!("ROC-AUC: {:.4}", auc);
                        }
                        for (label, scores) in &e.classification_report.classes {
                            println!(
                                "  class {}: precision {:.4}, recall {:.4}, f1 {:.4}, support {}",
                                label,
                                scores.precision,
                                scores.recall,
                                scores.f1_score,
                                scores.support
                            );
                        }
                    }
                    ModelEvaluation::Regression(e) => println!(
                        "{}: r2 {:.4} (train {:.4}), rmse {:.4}",
                        name, e.test_metrics.r2, e.train_metrics.r2, e.test_metrics.rmse
                    ),
                }
                println!("Fit status: {}", evaluation.status());
                println!("Recommendation: {}", evaluation.status().recommendation());
            }
            println!("{}", RULE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_validation_summary(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("{}", RULE);
            println!("DATA VALIDATION SUMMARY");
            println!("{}", RULE);
            println!("Total Records: {}", report.total_records);
            println!("Overall Status: {}", report.overall_status.as_str());
            println!("Passed: {}", report.summary.passed);
            println!("Warnings: {}", report.summary.warnings);
            println!("Failed: {}", report.summary.failed);
            println!("{}", RULE);
            for issue in report
                .checks
                .value_ranges
                .issues
                .iter()
                .chain(&report.checks.data_types.issues)
            {
                println!("  {}", issue);
            }
            for column in &report.checks.missing_columns.missing {
                println!("  missing column: {}", column);
            }
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs, format: OutputFormat) -> Result<ExitCode> {
    let dataset = Dataset::from_csv_path(&args.data)
        .with_context(|| format!("Failed to load dataset {}", args.data.display()))?;
    let report = validate_dataset(
        &dataset,
        &args.data.display().to_string(),
        &ValidationRules::default(),
    );
    report.save(&args.output)?;
    print_validation_summary(&report, format)?;

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("Validation FAILED");
        Ok(ExitCode::FAILURE)
    }
}

fn run_monitor(args: MonitorArgs, mut config: DriftConfig, format: OutputFormat) -> Result<ExitCode> {
    if let Some(dir) = args.reports_dir {
        config.reports_dir = dir;
    }
    if let Some(dir) = args.alerts_dir {
        config.alerts_dir = dir;
    }
    let store = ReportStore::new(&config.reports_dir);
    let alerts = AlertLog::new(&config.alerts_dir);
    let session = DriftSession::load(&args.reference, config)
        .with_context(|| format!("Failed to load reference data {}", args.reference.display()))?;

    let source = MonitorSource {
        current: args.current,
        predictions: args.predictions,
        baseline_accuracy: args.baseline_accuracy,
    };
    let options = MonitorOptions {
        interval: Duration::from_secs(args.interval),
        iterations: args.iterations,
    };

    let summary = monitor::run_monitor(&session, &source, &store, &alerts, options)?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "checks_run": summary.checks_run,
                "alerts_raised": summary.alerts_raised,
            })
        ),
        OutputFormat::Text => println!(
            "Checks run: {}, alerts raised: {}",
            summary.checks_run, summary.alerts_raised
        ),
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    let format = cli.format;

    match cli.command {
        Command::Check(args) => run_check(args, config, format),
        Command::Evaluate(args) => run_evaluate(args, config, format),
        Command::Validate(args) => run_validate(args, format),
        Command::Monitor(args) => run_monitor(args, config, format),
    }
}
