// Threshold configuration for drift detection and fit diagnosis
//
// Every numeric cut-off used by the detectors lives here so it can be tuned
// from a TOML file without touching code. Defaults reproduce the thresholds
// the monitoring pipeline has always used.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Population Stability Index settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsiThresholds {
    /// Number of percentile bins computed from the reference sample
    pub bins: usize,

    /// Additive smoothing applied to bin counts before the log term
    pub epsilon: f64,

    /// PSI at or above this is MODERATE_DRIFT
    pub moderate: f64,

    /// PSI at or above this is SIGNIFICANT_DRIFT
    pub significant: f64,
}

impl Default for PsiThresholds {
    fn default() -> Self {
        Self {
            bins: 10,
            epsilon: 0.0001,
            moderate: 0.1,
            significant: 0.2,
        }
    }
}

/// Thresholds for target and model performance drift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftThresholds {
    /// Two-sample KS significance level (alpha)
    pub ks_alpha: f64,

    /// Positive-rate shift above this is SIGNIFICANT_DRIFT
    pub target_shift: f64,

    /// Accuracy degradation (%) above this is MODERATE_DEGRADATION
    pub moderate_degradation_pct: f64,

    /// Accuracy degradation (%) above this is SIGNIFICANT_DEGRADATION
    pub significant_degradation_pct: f64,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            ks_alpha: 0.05,
            target_shift: 0.1,
            moderate_degradation_pct: 5.0,
            significant_degradation_pct: 10.0,
        }
    }
}

/// Train/test gap thresholds for fit diagnosis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitThresholds {
    /// Gap above this is OVERFITTING
    pub overfit_gap: f64,

    /// Gap above this raises overfitting severity to HIGH
    pub overfit_high_gap: f64,

    /// Test accuracy below this is UNDERFITTING (classification)
    pub underfit_accuracy: f64,

    /// Test accuracy below this raises underfitting severity to HIGH
    pub underfit_high_accuracy: f64,

    /// Test R² below this is UNDERFITTING (regression)
    pub underfit_r2: f64,

    /// Test R² below this raises underfitting severity to HIGH
    pub underfit_high_r2: f64,
}

impl Default for FitThresholds {
    fn default() -> Self {
        Self {
            overfit_gap: 0.10,
            overfit_high_gap: 0.15,
            underfit_accuracy: 0.60,
            underfit_high_accuracy: 0.50,
            underfit_r2: 0.50,
            underfit_high_r2: 0.30,
        }
    }
}

/// Complete configuration for a drift or evaluation run
///
/// # Example
/// ```
/// use deriva::config::DriftConfig;
///
/// let config = DriftConfig::default();
/// assert_eq!(config.psi.significant, 0.2);
/// assert_eq!(config.drift.ks_alpha, 0.05);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Binary label column, excluded from feature drift
    pub label_column: String,

    /// Directory receiving drift reports
    pub reports_dir: PathBuf,

    /// Directory receiving alert logs
    pub alerts_dir: PathBuf,

    pub psi: PsiThresholds,
    pub drift: DriftThresholds,
    pub fit: FitThresholds,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            label_column: "migraine_occurrence".to_string(),
            reports_dir: PathBuf::from("reports/drift"),
            alerts_dir: PathBuf::from("reports/alerts"),
            psi: PsiThresholds::default(),
            drift: DriftThresholds::default(),
            fit: FitThresholds::default(),
        }
    }
}

impl DriftConfig {
    /// Create a strict configuration (flags drift earlier)
    pub fn strict() -> Self {
        Self {
            psi: PsiThresholds {
                moderate: 0.05,
                significant: 0.1,
                ..PsiThresholds::default()
            },
            drift: DriftThresholds {
                ks_alpha: 0.10,
                target_shift: 0.05,
                moderate_degradation_pct: 2.5,
                significant_degradation_pct: 5.0,
            },
            fit: FitThresholds {
                overfit_gap: 0.05,
                overfit_high_gap: 0.10,
                ..FitThresholds::default()
            },
            ..Self::default()
        }
    }

    /// Create a permissive configuration (tolerates larger shifts)
    pub fn permissive() -> Self {
        Self {
            psi: PsiThresholds {
                moderate: 0.2,
                significant: 0.3,
                ..PsiThresholds::default()
            },
            drift: DriftThresholds {
                ks_alpha: 0.01,
                target_shift: 0.2,
                moderate_degradation_pct: 10.0,
                significant_degradation_pct: 20.0,
            },
            fit: FitThresholds {
                overfit_gap: 0.15,
                overfit_high_gap: 0.25,
                ..FitThresholds::default()
            },
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file; omitted keys keep their defaults
    ///
    /// # Example TOML
    /// ```toml
    /// label_column = "migraine_occurrence"
    ///
    /// [psi]
    /// bins = 10
    /// significant = 0.25
    ///
    /// [fit]
    /// overfit_gap = 0.08
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse TOML drift configuration")?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.label_column.trim().is_empty() {
            return Err("label_column must not be empty".to_string());
        }

        if self.psi.bins < 2 {
            return Err(format!("psi.bins must be >= 2, got {}", self.psi.bins));
        }

        if self.psi.epsilon <= 0.0 {
            return Err(format!(
                "psi.epsilon must be positive, got {}",
                self.psi.epsilon
            ));
        }

        if self.psi.moderate < 0.0 || self.psi.moderate > self.psi.significant {
            return Err(format!(
                "psi thresholds must satisfy 0 <= moderate <= significant, got {} / {}",
                self.psi.moderate, self.psi.significant
            ));
        }

        if !(0.0..=1.0).contains(&self.drift.ks_alpha) {
            return Err(format!(
                "drift.ks_alpha must be in [0, 1], got {}",
                self.drift.ks_alpha
            ));
        }

        if !(0.0..=1.0).contains(&self.drift.target_shift) {
            return Err(format!(
                "drift.target_shift must be in [0, 1], got {}",
                self.drift.target_shift
            ));
        }

        if self.drift.moderate_degradation_pct > self.drift.significant_degradation_pct {
            return Err(format!(
                "moderate_degradation_pct ({}) exceeds significant_degradation_pct ({})",
                self.drift.moderate_degradation_pct, self.drift.significant_degradation_pct
            ));
        }

        if self.fit.overfit_gap < 0.0 || self.fit.overfit_gap > self.fit.overfit_high_gap {
            return Err(format!(
                "fit gaps must satisfy 0 <= overfit_gap <= overfit_high_gap, got {} / {}",
                self.fit.overfit_gap, self.fit.overfit_high_gap
            ));
        }

        if self.fit.underfit_high_accuracy > self.fit.underfit_accuracy {
            return Err(format!(
                "underfit_high_accuracy ({}) exceeds underfit_accuracy ({})",
                self.fit.underfit_high_accuracy, self.fit.underfit_accuracy
            ));
        }

        if self.fit.underfit_high_r2 > self.fit.underfit_r2 {
            return Err(format!(
                "underfit_high_r2 ({}) exceeds underfit_r2 ({})",
                self.fit.underfit_high_r2, self.fit.underfit_r2
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DriftConfig::default();
        assert_eq!(config.label_column, "migraine_occurrence");
        assert_eq!(config.psi.bins, 10);
        assert_eq!(config.psi.epsilon, 0.0001);
        assert_eq!(config.psi.moderate, 0.1);
        assert_eq!(config.psi.significant, 0.2);
        assert_eq!(config.drift.ks_alpha, 0.05);
        assert_eq!(config.drift.target_shift, 0.1);
        assert_eq!(config.fit.overfit_gap, 0.10);
        assert_eq!(config.fit.overfit_high_gap, 0.15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(DriftConfig::strict().validate().is_ok());
        assert!(DriftConfig::permissive().validate().is_ok());
        assert!(DriftConfig::strict().psi.significant < DriftConfig::permissive().psi.significant);
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_bins() {
        let mut config = DriftConfig::default();
        config.psi.bins = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_psi_ordering() {
        let mut config = DriftConfig::default();
        config.psi.moderate = 0.3;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_alpha() {
        let mut config = DriftConfig::default();
        config.drift.ks_alpha = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_fit_gaps() {
        let mut config = DriftConfig::default();
        config.fit.overfit_gap = 0.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "label_column = \"has_migraine\"\n\n[psi]\nsignificant = 0.25\n\n[fit]\noverfit_gap = 0.08"
        )
        .unwrap();

        let config = DriftConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.label_column, "has_migraine");
        assert_eq!(config.psi.significant, 0.25);
        assert_eq!(config.psi.bins, 10);
        assert_eq!(config.fit.overfit_gap, 0.08);
        assert_eq!(config.drift.ks_alpha, 0.05);
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[psi]\nbins = 0").unwrap();
        assert!(DriftConfig::from_toml(file.path()).is_err());
    }

    #[test]
    fn test_from_toml_missing_file() {
        assert!(DriftConfig::from_toml("/nonexistent/deriva.toml").is_err());
    }
}
