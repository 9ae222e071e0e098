use super::{analyzable, by_score_desc, CellRef, DuplicateRow};
use crate::categorize::ColumnCategorization;
use crate::config::ValueDetectorConfig;
use crate::entropy::{size_factor, EntropyModel};
use crate::suspicion::Suspicion;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sleuth_sheet::Sheet;
use std::collections::HashSet;

/// A number occurring in two or more analyzable cells of unique columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateValue {
    pub value: f64,
    /// Every occurrence, in row then column order.
    pub cells: Vec<CellRef>,
    pub raw_entropy: u64,
    pub entropy_score: f64,
    /// Size-adjusted score.
    pub score: f64,
    pub suspicion: Suspicion,
}

impl DuplicateValue {
    pub fn occurrences(&self) -> usize {
        self.cells.len()
    }
}

/// Finds repeated specific values.
#[derive(Debug, Clone)]
pub struct DuplicateValueDetector<'a> {
    model: &'a EntropyModel,
    config: ValueDetectorConfig,
}

impl<'a> DuplicateValueDetector<'a> {
    pub fn new(model: &'a EntropyModel, config: ValueDetectorConfig) -> Self {
        DuplicateValueDetector { model, config }
    }

    pub fn detect(
        &self,
        sheet: &Sheet,
        categorization: &ColumnCategorization,
    ) -> Vec<DuplicateValue> {
        self.detect_with_suppression(sheet, categorization, &[])
    }

    /// Like [`detect`](Self::detect), but cells already explained by a
    /// duplicate row are skipped: for each row pair, the second row's cells
    /// in the agreeing columns do not count as further occurrences.
    ///
    /// Pairs classified [`Suspicion::None`] explain nothing and suppress no
    /// cells.
    pub fn detect_with_suppression(
        &self,
        sheet: &Sheet,
        categorization: &ColumnCategorization,
        rows: &[DuplicateRow],
    ) -> Vec<DuplicateValue> {
        let columns = categorization.unique_columns(sheet);
        if columns.is_empty() || sheet.analyzable_count() == 0 {
            return Vec::new();
        }

        let suppressed: HashSet<(usize, usize)> = rows
            .iter()
            .filter(|pair| pair.suspicion >= Suspicion::Low)
            .flat_map(|pair| pair.shared.iter().map(move |shared| (pair.rows.1, shared.col)))
            .collect();

        let mut groups: IndexMap<u64, Vec<(usize, usize)>> = IndexMap::new();
        for row in sheet.data_rows() {
            for &col in &columns {
                if suppressed.contains(&(row, col)) {
                    continue;
                }
                if let Some(value) = analyzable(sheet, row, col) {
                    groups.entry(value.to_bits()).or_default().push((row, col));
                }
            }
        }

        let size = size_factor(sheet.analyzable_count());
        let mut found: Vec<DuplicateValue> = groups
            .into_iter()
            .filter(|(_, positions)| positions.len() >= 2)
            .filter_map(|(bits, positions)| {
                self.score_group(sheet, f64::from_bits(bits), &positions, size)
            })
            .collect();

        found.sort_by(|a, b| by_score_desc(a.score, b.score).then(a.value.total_cmp(&b.value)));

        tracing::debug!(
            sheet = sheet.name(),
            columns = columns.len(),
            suppressed = suppressed.len(),
            findings = found.len(),
            "duplicate value scan finished"
        );
        found
    }

    fn score_group(
        &self,
        sheet: &Sheet,
        value: f64,
        positions: &[(usize, usize)],
        size: f64,
    ) -> Option<DuplicateValue> {
        let raw_entropy = self.model.raw_entropy(value);
        let entropy_score = self.model.value_score(value);
        let weighted =
            entropy_score.powf(self.config.entropy_exponent) * (positions.len() as f64).log2();
        let score = weighted / size;
        let suspicion = self.config.thresholds.classify(score);
        if suspicion < Suspicion::Low {
            return None;
        }

        let cells = positions
            .iter()
            .filter_map(|&(row, col)| sheet.cell(row, col))
            .map(|cell| CellRef::new(sheet, cell))
            .collect();

        Some(DuplicateValue {
            value,
            cells,
            raw_entropy,
            entropy_score,
            score,
            suspicion,
        })
    }
}
