//! CLI argument parsing for Deriva

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command summaries on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Built-in threshold presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Default,
    /// Flags drift earlier
    Strict,
    /// Tolerates larger shifts
    Permissive,
}

/// Kind of model being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Task {
    Classification,
    Regression,
}

#[derive(Parser, Debug)]
#[command(name = "deriva")]
#[command(version)]
#[command(about = "Data drift detection and model fit diagnostics", long_about = None)]
pub struct Cli {
    /// Enable trace-level logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Threshold preset, overridden by --config
    #[arg(long, value_enum, default_value = "default", global = true)]
    pub preset: Preset,

    /// TOML file with drift thresholds
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a comprehensive drift check and save the report
    Check(CheckArgs),
    /// Evaluate a model from its train and test predictions
    Evaluate(EvaluateArgs),
    /// Validate a raw dataset
    Validate(ValidateArgs),
    /// Re-run the drift check on an interval and raise alerts
    Monitor(MonitorArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Reference (training-time) dataset CSV
    #[arg(long, value_name = "FILE")]
    pub reference: PathBuf,

    /// Current dataset CSV
    #[arg(long, value_name = "FILE")]
    pub current: PathBuf,

    /// CSV with a `prediction` column aligned with the current rows
    #[arg(long, value_name = "FILE", requires = "baseline_accuracy")]
    pub predictions: Option<PathBuf>,

    /// Accuracy recorded when the model was deployed
    #[arg(long, value_name = "ACCURACY", requires = "predictions")]
    pub baseline_accuracy: Option<f64>,

    /// Directory for drift reports (defaults to the configured one)
    #[arg(long, value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, value_enum, default_value = "classification")]
    pub task: Task,

    /// Train split predictions (`y_true,y_pred`)
    #[arg(long, value_name = "FILE")]
    pub train: PathBuf,

    /// Test split predictions (`y_true,y_pred`)
    #[arg(long, value_name = "FILE")]
    pub test: PathBuf,

    #[arg(long, default_value = "model")]
    pub model_name: String,

    /// Directory for model_evaluation_report.json
    #[arg(long, value_name = "DIR", default_value = "reports/evaluation")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Raw dataset CSV
    #[arg(long, value_name = "FILE")]
    pub data: PathBuf,

    /// Where to write the validation report
    #[arg(long, value_name = "FILE", default_value = "reports/data_validation.json")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[arg(long, value_name = "FILE")]
    pub reference: PathBuf,

    /// Current dataset CSV, reloaded every cycle
    #[arg(long, value_name = "FILE")]
    pub current: PathBuf,

    #[arg(long, value_name = "FILE", requires = "baseline_accuracy")]
    pub predictions: Option<PathBuf>,

    #[arg(long, value_name = "ACCURACY", requires = "predictions")]
    pub baseline_accuracy: Option<f64>,

    /// Seconds between checks (minimum 1; report names are stamped to the second)
    #[arg(
        long,
        value_name = "SECONDS",
        default_value = "60",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Number of checks to run (0 = until interrupted)
    #[arg(long, value_name = "N", default_value = "0")]
    pub iterations: u64,

    #[arg(long, value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    pub alerts_dir: Option<PathBuf>,
}
