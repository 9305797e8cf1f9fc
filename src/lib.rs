//! Deriva - data drift detection and model fit diagnostics
//!
//! This library compares a reference dataset against current data to detect
//! feature drift (PSI), distribution shifts (two-sample KS test), target
//! drift and model performance degradation, and diagnoses overfitting or
//! underfitting from train/test metrics.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod drift;
pub mod evaluation;
pub mod monitor;
pub mod session;
pub mod validate;
