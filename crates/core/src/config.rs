//! Tunable constants for the entropy model and the detectors.
//!
//! Every struct deserializes with `#[serde(default)]`, so a configuration file
//! only needs to name the settings it changes:
//!
//! ```
//! use sleuth_core::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_yaml_str("sequences:\n  max_sequences: 50\n").unwrap();
//! assert_eq!(config.sequences.max_sequences, 50);
//! assert_eq!(config.sequences.max_positions_per_value, 100);
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::suspicion::Thresholds;
use serde::{Deserialize, Serialize};

/// Entropy model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    /// Integers in `year_min..=year_max` are treated as calendar years.
    pub year_min: i64,
    pub year_max: i64,
    /// Raw entropy assigned to a calendar year.
    pub year_score: u64,
    /// Denominators of the simple fractions a value may be a rounding of.
    pub fraction_denominators: Vec<u32>,
    /// The fraction-adjusted entropy replaces the digit entropy when it is
    /// below this share of it.
    pub fraction_ratio: f64,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        EntropyConfig {
            year_min: 1900,
            year_max: 2030,
            year_score: 100,
            fraction_denominators: vec![3, 7, 9, 11, 13],
            fraction_ratio: 0.5,
        }
    }
}

/// Duplicate value detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueDetectorConfig {
    /// Power applied to the entropy score before weighting by occurrences.
    pub entropy_exponent: f64,
    pub thresholds: Thresholds,
}

impl Default for ValueDetectorConfig {
    fn default() -> Self {
        ValueDetectorConfig {
            entropy_exponent: 1.5,
            thresholds: Thresholds::new(15.0, 22.0, 40.0),
        }
    }
}

/// Duplicate row detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowDetectorConfig {
    /// Only values with at least this raw entropy seed candidate pairs.
    pub index_floor: u64,
    /// A pair is kept when its row entropy score exceeds this.
    pub min_score: f64,
    pub min_shared_columns: usize,
    pub thresholds: Thresholds,
}

impl Default for RowDetectorConfig {
    fn default() -> Self {
        RowDetectorConfig {
            index_floor: 200,
            min_score: 8.0,
            min_shared_columns: 2,
            thresholds: Thresholds::new(7.0, 9.0, 16.0),
        }
    }
}

/// Repeated sequence detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceDetectorConfig {
    /// Hard cap on remembered positions per distinct value in a column.
    pub max_positions_per_value: usize,
    /// Hard cap on accepted runs per sheet.
    pub max_sequences: usize,
    pub min_length: usize,
    /// A run is kept when its summed entropy score exceeds this.
    pub min_score: f64,
    /// Ignore pairings whose start positions are consecutive rows.
    pub skip_adjacent_starts: bool,
    /// Ignore runs that continue an identical run starting one row earlier.
    pub skip_run_tails: bool,
    /// Report runs whose first copy ends right where the second begins.
    pub allow_adjacent_runs: bool,
    pub thresholds: Thresholds,
}

impl Default for SequenceDetectorConfig {
    fn default() -> Self {
        SequenceDetectorConfig {
            max_positions_per_value: 100,
            max_sequences: 1000,
            min_length: 2,
            min_score: 10.0,
            skip_adjacent_starts: true,
            skip_run_tails: true,
            allow_adjacent_runs: false,
            thresholds: Thresholds::new(4.0, 5.0, 10.0),
        }
    }
}

/// All settings of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub entropy: EntropyConfig,
    pub values: ValueDetectorConfig,
    pub rows: RowDetectorConfig,
    pub sequences: SequenceDetectorConfig,
}

impl AnalysisConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(source: &str) -> ConfigResult<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the detectors rely on.
    pub fn validate(&self) -> ConfigResult<()> {
        let entropy = &self.entropy;
        if entropy.year_min > entropy.year_max {
            return Err(ConfigError::OutOfRange {
                field: "entropy.year_min",
                message: format!("{} is after year_max {}", entropy.year_min, entropy.year_max),
            });
        }
        if !(entropy.fraction_ratio > 0.0 && entropy.fraction_ratio <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "entropy.fraction_ratio",
                message: format!("{} is not in (0, 1]", entropy.fraction_ratio),
            });
        }
        if entropy.fraction_denominators.contains(&0) {
            return Err(ConfigError::OutOfRange {
                field: "entropy.fraction_denominators",
                message: "denominators must be positive".to_string(),
            });
        }
        if !(self.values.entropy_exponent.is_finite() && self.values.entropy_exponent > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "values.entropy_exponent",
                message: format!("{} is not a positive number", self.values.entropy_exponent),
            });
        }

        check_thresholds("values", &self.values.thresholds)?;
        check_thresholds("rows", &self.rows.thresholds)?;
        check_thresholds("sequences", &self.sequences.thresholds)?;

        check_min("rows.min_shared_columns", self.rows.min_shared_columns, 1)?;
        check_min(
            "sequences.max_positions_per_value",
            self.sequences.max_positions_per_value,
            1,
        )?;
        check_min("sequences.max_sequences", self.sequences.max_sequences, 1)?;
        check_min("sequences.min_length", self.sequences.min_length, 2)?;
        Ok(())
    }
}

fn check_thresholds(detector: &'static str, thresholds: &Thresholds) -> ConfigResult<()> {
    if thresholds.is_ordered() {
        Ok(())
    } else {
        Err(ConfigError::UnorderedThresholds {
            detector,
            low: thresholds.low,
            medium: thresholds.medium,
            high: thresholds.high,
        })
    }
}

fn check_min(field: &'static str, value: usize, min: usize) -> ConfigResult<()> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooSmall { field, min, value })
    }
}
