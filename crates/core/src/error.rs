//! Error types for sleuth-core.
//!
//! Detection itself never fails; only building an analyzer from a
//! configuration can.

use thiserror::Error;

/// Result type for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating an [`crate::AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Suspicion thresholds must satisfy low < medium < high.
    #[error("{detector} thresholds must increase (low {low}, medium {medium}, high {high})")]
    UnorderedThresholds {
        detector: &'static str,
        low: f64,
        medium: f64,
        high: f64,
    },

    /// A cap or count that has to be positive was zero.
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },

    /// A numeric setting is outside its allowed range.
    #[error("{field} out of range: {message}")]
    OutOfRange {
        field: &'static str,
        message: String,
    },

    /// YAML parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
