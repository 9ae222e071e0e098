use super::{analyzable, by_score_desc, column_name, same_value};
use crate::categorize::ColumnCategorization;
use crate::config::RowDetectorConfig;
use crate::entropy::{size_factor, EntropyModel};
use crate::suspicion::Suspicion;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sleuth_sheet::a1_notation::to_a1_notation;
use sleuth_sheet::Sheet;
use std::collections::BTreeSet;

/// One column on which two rows agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedValue {
    pub col: usize,
    pub column: String,
    pub value: f64,
    pub address_first: String,
    pub address_second: String,
}

/// Two rows agreeing on several specific values.
///
/// `rows` holds grid row indices (header rows included), first < second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRow {
    pub rows: (usize, usize),
    pub shared: Vec<SharedValue>,
    /// Unique columns where both rows hold an analyzable value.
    pub columns_compared: usize,
    pub entropy_score: f64,
    /// Size-adjusted score.
    pub score: f64,
    pub suspicion: Suspicion,
}

impl DuplicateRow {
    pub fn shared_count(&self) -> usize {
        self.shared.len()
    }
}

/// Finds row pairs that agree on more specific values than chance allows.
#[derive(Debug, Clone)]
pub struct DuplicateRowDetector<'a> {
    model: &'a EntropyModel,
    config: RowDetectorConfig,
}

impl<'a> DuplicateRowDetector<'a> {
    pub fn new(model: &'a EntropyModel, config: RowDetectorConfig) -> Self {
        DuplicateRowDetector { model, config }
    }

    pub fn detect(&self, sheet: &Sheet, categorization: &ColumnCategorization) -> Vec<DuplicateRow> {
        let columns = categorization.unique_columns(sheet);
        if columns.is_empty() || sheet.data_row_count() < 2 {
            return Vec::new();
        }

        let pairs = self.candidate_pairs(sheet, &columns);
        let size = size_factor(sheet.analyzable_count());
        let mut found: Vec<DuplicateRow> = pairs
            .iter()
            .filter_map(|&(first, second)| self.compare(sheet, &columns, first, second, size))
            .collect();

        found.sort_by(|a, b| {
            by_score_desc(a.entropy_score, b.entropy_score)
                .then(b.shared.len().cmp(&a.shared.len()))
                .then(a.rows.cmp(&b.rows))
        });

        tracing::debug!(
            sheet = sheet.name(),
            candidates = pairs.len(),
            findings = found.len(),
            "duplicate row scan finished"
        );
        found
    }

    /// Row pairs linked by at least one value above the index floor, each
    /// unordered pair once.
    fn candidate_pairs(&self, sheet: &Sheet, columns: &[usize]) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();

        for &col in columns {
            let mut index: IndexMap<u64, Vec<usize>> = IndexMap::new();
            for row in sheet.data_rows() {
                let Some(value) = analyzable(sheet, row, col) else {
                    continue;
                };
                if self.model.raw_entropy(value) >= self.config.index_floor {
                    index.entry(value.to_bits()).or_default().push(row);
                }
            }

            for rows in index.values().filter(|rows| rows.len() >= 2) {
                for (n, &first) in rows.iter().enumerate() {
                    for &second in &rows[n + 1..] {
                        pairs.insert((first, second));
                    }
                }
            }
        }
        pairs
    }

    fn compare(
        &self,
        sheet: &Sheet,
        columns: &[usize],
        first: usize,
        second: usize,
        size: f64,
    ) -> Option<DuplicateRow> {
        let mut columns_compared = 0;
        let mut shared = Vec::new();

        for &col in columns {
            let (Some(a), Some(b)) = (analyzable(sheet, first, col), analyzable(sheet, second, col))
            else {
                continue;
            };
            columns_compared += 1;
            if same_value(a, b) {
                shared.push(SharedValue {
                    col,
                    column: column_name(sheet, col),
                    value: a,
                    address_first: to_a1_notation(first, col),
                    address_second: to_a1_notation(second, col),
                });
            }
        }

        if shared.len() < self.config.min_shared_columns {
            return None;
        }

        let values: Vec<f64> = shared.iter().map(|s| s.value).collect();
        let entropy_score = self.model.row_entropy_score(&values, columns_compared);
        if entropy_score <= self.config.min_score {
            return None;
        }

        let score = entropy_score / size;
        Some(DuplicateRow {
            rows: (first, second),
            shared,
            columns_compared,
            entropy_score,
            score,
            suspicion: self.config.thresholds.classify(score),
        })
    }
}
