//! Bucketing of size-adjusted scores into suspicion levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered qualitative bucket for a finding.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Suspicion {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Suspicion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Suspicion::None => "none",
            Suspicion::Low => "low",
            Suspicion::Medium => "medium",
            Suspicion::High => "high",
        };
        f.write_str(label)
    }
}

/// Per-detector cut points on the size-adjusted score.
///
/// A score strictly above a cut point reaches that level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Thresholds {
    #[must_use]
    pub const fn new(low: f64, medium: f64, high: f64) -> Self {
        Thresholds { low, medium, high }
    }

    #[must_use]
    pub fn classify(&self, score: f64) -> Suspicion {
        if score > self.high {
            Suspicion::High
        } else if score > self.medium {
            Suspicion::Medium
        } else if score > self.low {
            Suspicion::Low
        } else {
            Suspicion::None
        }
    }

    pub(crate) fn is_ordered(&self) -> bool {
        self.low.is_finite()
            && self.high.is_finite()
            && self.low < self.medium
            && self.medium < self.high
    }
}
