//! # sleuth-core
//!
//! Detection of statistically improbable duplication in spreadsheet numbers.
//!
//! This crate provides:
//! - The entropy model scoring how specific a number looks
//! - Column categorization (which columns should hold per-row values)
//! - Duplicate value, duplicate row and repeated sequence detectors
//! - Suspicion levels on size-adjusted scores
//! - The per-sheet analysis pipeline and its configuration
//!
//! Detectors never fail. A sheet without data rows or a categorization that
//! names no existing unique column simply yields no findings.

/// Per-sheet pipeline and report.
pub mod analysis;
/// Column categorization.
pub mod categorize;
/// Tunable settings.
pub mod config;
/// The detectors and their result records.
pub mod detect;
/// Entropy model.
pub mod entropy;
/// Error types and result aliases.
pub mod error;
/// Suspicion levels and thresholds.
pub mod suspicion;

/// Re-export the pipeline.
pub use analysis::{Analyzer, SheetReport};
/// Re-export categorization types.
pub use categorize::{
    CategorizationContext, Categorizer, ColumnCategorization, FixedCategorizer, RuleCategorizer,
};
/// Re-export configuration types.
pub use config::{
    AnalysisConfig, EntropyConfig, RowDetectorConfig, SequenceDetectorConfig, ValueDetectorConfig,
};
/// Re-export detectors and records.
pub use detect::{
    CellRef, DuplicateRow, DuplicateRowDetector, DuplicateValue, DuplicateValueDetector,
    RepeatedSequence, SequenceDetector, SequenceStart, SharedValue,
};
/// Re-export the entropy model.
pub use entropy::{size_factor, EntropyModel};
/// Re-export core error types.
pub use error::{ConfigError, ConfigResult};
/// Re-export suspicion types.
pub use suspicion::{Suspicion, Thresholds};
