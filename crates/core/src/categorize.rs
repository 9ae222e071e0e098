//! Which columns are scanned for duplication.
//!
//! A column is either *unique* (values should differ per row, e.g. a measured
//! weight) or *shared* (repeats are expected, e.g. a site code). Only unique
//! columns are scanned. Categorizations name columns by their display name;
//! names that do not exist in a sheet are ignored.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sleuth_sheet::Sheet;
use std::collections::HashSet;
use std::sync::OnceLock;

/// The unique/shared split of a sheet's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCategorization {
    pub unique: Vec<String>,
    pub shared: Vec<String>,
}

impl ColumnCategorization {
    #[must_use]
    pub fn new<S: Into<String>>(
        unique: impl IntoIterator<Item = S>,
        shared: impl IntoIterator<Item = S>,
    ) -> Self {
        ColumnCategorization {
            unique: unique.into_iter().map(Into::into).collect(),
            shared: shared.into_iter().map(Into::into).collect(),
        }
    }

    /// Physical indices of the unique columns, sorted and deduplicated.
    ///
    /// A name matching several columns (duplicate headers) selects all of
    /// them. A column that is also named as shared is excluded.
    #[must_use]
    pub fn unique_columns(&self, sheet: &Sheet) -> Vec<usize> {
        let shared: HashSet<usize> = self
            .shared
            .iter()
            .flat_map(|name| sheet.column_indices(name).iter().copied())
            .collect();

        let mut columns: Vec<usize> = self
            .unique
            .iter()
            .flat_map(|name| sheet.column_indices(name).iter().copied())
            .filter(|col| !shared.contains(col))
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }
}

/// Extra information a categorizer may use besides the sheet itself.
#[derive(Debug, Clone, Default)]
pub struct CategorizationContext {
    pub dataset: Option<String>,
    pub description: Option<String>,
}

/// Source of column categorizations: rules, manual curation or an outside
/// classifier.
pub trait Categorizer: Send + Sync {
    fn categorize(&self, sheet: &Sheet, context: &CategorizationContext) -> ColumnCategorization;
}

/// Returns the same categorization for every sheet.
#[derive(Debug, Clone, Default)]
pub struct FixedCategorizer {
    categorization: ColumnCategorization,
}

impl FixedCategorizer {
    #[must_use]
    pub fn new(categorization: ColumnCategorization) -> Self {
        FixedCategorizer { categorization }
    }
}

impl Categorizer for FixedCategorizer {
    fn categorize(&self, _sheet: &Sheet, _context: &CategorizationContext) -> ColumnCategorization {
        self.categorization.clone()
    }
}

fn is_grouping_header(name: &str) -> bool {
    static GROUPING: OnceLock<Option<Regex>> = OnceLock::new();
    GROUPING
        .get_or_init(|| {
            Regex::new(
                r"(?i)\b(id|ids|identifier|subject|participant|patient|animal|group|groups|cohort|arm|site|location|region|country|center|centre|year|month|day|date|time|visit|wave|sex|gender|treatment|condition|dose|block|batch|plate|well|code|index|no|number)\b",
            )
            .ok()
        })
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// Header- and content-based categorization.
///
/// A column with no analyzable values is left out. It is shared when its
/// header reads like a grouping or identifier column, or when too few of its
/// values are distinct. Everything else is unique.
#[derive(Debug, Clone)]
pub struct RuleCategorizer {
    min_distinct_ratio: f64,
}

impl Default for RuleCategorizer {
    fn default() -> Self {
        RuleCategorizer {
            min_distinct_ratio: 0.5,
        }
    }
}

impl RuleCategorizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns whose share of distinct values is below `ratio` are shared.
    #[must_use]
    pub fn with_min_distinct_ratio(mut self, ratio: f64) -> Self {
        self.min_distinct_ratio = ratio;
        self
    }

    fn distinct_ratio(sheet: &Sheet, col: usize) -> Option<f64> {
        let values: Vec<u64> = sheet
            .column_data(col)?
            .iter()
            .filter_map(|cell| cell.analyzable_number())
            .map(f64::to_bits)
            .collect();
        if values.is_empty() {
            return None;
        }
        let distinct: HashSet<u64> = values.iter().copied().collect();
        Some(distinct.len() as f64 / values.len() as f64)
    }
}

impl Categorizer for RuleCategorizer {
    fn categorize(&self, sheet: &Sheet, _context: &CategorizationContext) -> ColumnCategorization {
        let mut result = ColumnCategorization::default();

        for (col, name) in sheet.column_names().iter().enumerate() {
            let Some(ratio) = Self::distinct_ratio(sheet, col) else {
                continue;
            };
            let target = if is_grouping_header(name) || ratio < self.min_distinct_ratio {
                &mut result.shared
            } else {
                &mut result.unique
            };
            if !target.contains(name) {
                target.push(name.clone());
            }
        }

        tracing::debug!(
            sheet = sheet.name(),
            unique = result.unique.len(),
            shared = result.shared.len(),
            "categorized columns by rule"
        );
        result
    }
}
