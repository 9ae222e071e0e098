use super::{by_score_desc, column_name, same_value};
use crate::categorize::ColumnCategorization;
use crate::config::SequenceDetectorConfig;
use crate::entropy::{size_factor, EntropyModel};
use crate::suspicion::Suspicion;
use serde::{Deserialize, Serialize};
use sleuth_sheet::{Cell, Sheet};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Where one copy of a repeated run begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStart {
    pub row: usize,
    pub address: String,
}

/// A vertical run of values that appears at two or more places in a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatedSequence {
    pub col: usize,
    pub column: String,
    /// Start of every copy, sorted by row.
    pub starts: Vec<SequenceStart>,
    pub values: Vec<f64>,
    pub entropy_score: f64,
    /// Size-adjusted score.
    pub score: f64,
    pub suspicion: Suspicion,
}

impl RepeatedSequence {
    pub fn run_length(&self) -> usize {
        self.values.len()
    }

    pub fn copies(&self) -> usize {
        self.starts.len()
    }
}

/// Finds runs of identical values repeated down a column.
#[derive(Debug, Clone)]
pub struct SequenceDetector<'a> {
    model: &'a EntropyModel,
    config: SequenceDetectorConfig,
}

/// Scan state for one column.
struct ColumnScan<'s> {
    col: usize,
    column: String,
    cells: &'s [Cell],
    data: Range<usize>,
    positions: HashMap<u64, Vec<usize>>,
    checked: HashSet<(usize, usize)>,
    capped: bool,
}

impl ColumnScan<'_> {
    fn value(&self, row: usize) -> Option<f64> {
        self.cells.get(row).and_then(Cell::analyzable_number)
    }

    /// The run at `(j, i)` continues a pair already compared one row up.
    /// A pair never compared, e.g. because the position cap dropped `j - 1`,
    /// does not make it a tail.
    fn is_tail(&self, j: usize, i: usize) -> bool {
        if !self.checked.contains(&(j - 1, i - 1)) {
            return false;
        }
        matches!(
            (self.value(j - 1), self.value(i - 1)),
            (Some(a), Some(b)) if same_value(a, b)
        )
    }

    fn start(&self, row: usize) -> SequenceStart {
        SequenceStart {
            row,
            address: self.cells[row].address().to_string(),
        }
    }
}

impl<'a> SequenceDetector<'a> {
    pub fn new(model: &'a EntropyModel, config: SequenceDetectorConfig) -> Self {
        SequenceDetector { model, config }
    }

    pub fn detect(
        &self,
        sheet: &Sheet,
        categorization: &ColumnCategorization,
    ) -> Vec<RepeatedSequence> {
        let columns = categorization.unique_columns(sheet);
        if columns.is_empty() || sheet.data_row_count() < 2 {
            return Vec::new();
        }

        let size = size_factor(sheet.analyzable_count());
        let mut found = Vec::new();

        for &col in &columns {
            let Some(cells) = sheet.column(col) else {
                continue;
            };
            let mut scan = ColumnScan {
                col,
                column: column_name(sheet, col),
                cells,
                data: sheet.data_rows(),
                positions: HashMap::new(),
                checked: HashSet::new(),
                capped: false,
            };
            if !self.scan_column(&mut scan, size, &mut found) {
                tracing::warn!(
                    sheet = sheet.name(),
                    limit = self.config.max_sequences,
                    "sequence finding limit reached, remaining columns skipped"
                );
                break;
            }
        }

        let pairwise = found.len();
        let merged = merge(found);
        tracing::debug!(
            sheet = sheet.name(),
            pairwise,
            findings = merged.len(),
            "repeated sequence scan finished"
        );
        merged
    }

    /// Returns `false` once the per-sheet finding limit is hit.
    fn scan_column(
        &self,
        scan: &mut ColumnScan<'_>,
        size: f64,
        found: &mut Vec<RepeatedSequence>,
    ) -> bool {
        for i in scan.data.clone() {
            let Some(value) = scan.value(i) else {
                continue;
            };
            let prior = scan.positions.get(&value.to_bits()).cloned().unwrap_or_default();

            for j in prior {
                if found.len() >= self.config.max_sequences {
                    return false;
                }
                if let Some(run) = self.extend(scan, j, i, size) {
                    found.push(run);
                }
            }

            let cap = self.config.max_positions_per_value;
            let positions = scan.positions.entry(value.to_bits()).or_default();
            if positions.len() < cap {
                positions.push(i);
            } else if !scan.capped {
                scan.capped = true;
                tracing::warn!(
                    column = %scan.column,
                    value,
                    cap,
                    "position list full, later occurrences not paired"
                );
            }
        }
        true
    }

    /// Grow a run from the earlier position `j` and the later position `i`.
    fn extend(
        &self,
        scan: &mut ColumnScan<'_>,
        j: usize,
        i: usize,
        size: f64,
    ) -> Option<RepeatedSequence> {
        if scan.checked.contains(&(j, i)) {
            return None;
        }
        if self.config.skip_adjacent_starts && i == j + 1 {
            return None;
        }

        let mut len = 0;
        while j + len < i && i + len < scan.data.end {
            let (Some(a), Some(b)) = (scan.value(j + len), scan.value(i + len)) else {
                break;
            };
            scan.checked.insert((j + len, i + len));
            if !same_value(a, b) {
                break;
            }
            len += 1;
        }

        if len < self.config.min_length {
            return None;
        }
        if !self.config.allow_adjacent_runs && j + len == i {
            return None;
        }
        if self.config.skip_run_tails && j > scan.data.start && scan.is_tail(j, i) {
            return None;
        }

        let values: Vec<f64> = (j..j + len).filter_map(|row| scan.value(row)).collect();
        let entropy_score = self.model.sequence_entropy_score(&values);
        if entropy_score <= self.config.min_score {
            return None;
        }

        let score = entropy_score / size;
        Some(RepeatedSequence {
            col: scan.col,
            column: scan.column.clone(),
            starts: vec![scan.start(j), scan.start(i)],
            values,
            entropy_score,
            score,
            suspicion: self.config.thresholds.classify(score),
        })
    }
}

fn compare_runs(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

fn is_same_block(a: &RepeatedSequence, b: &RepeatedSequence) -> bool {
    a.col == b.col
        && a.score.to_bits() == b.score.to_bits()
        && a.values.len() == b.values.len()
        && a.values.iter().zip(&b.values).all(|(&x, &y)| same_value(x, y))
}

/// Fold the pairwise findings of one block repeated k times into a single
/// record with k starts.
fn merge(mut found: Vec<RepeatedSequence>) -> Vec<RepeatedSequence> {
    found.sort_by(|a, b| {
        by_score_desc(a.score, b.score)
            .then_with(|| compare_runs(&a.values, &b.values))
            .then(a.col.cmp(&b.col))
            .then(a.starts[0].row.cmp(&b.starts[0].row))
    });

    let mut merged: Vec<RepeatedSequence> = Vec::with_capacity(found.len());
    for record in found {
        match merged.last_mut() {
            Some(last) if is_same_block(last, &record) => {
                last.starts.extend(record.starts);
                last.starts.sort_by_key(|start| start.row);
                last.starts.dedup_by_key(|start| start.row);
            }
            _ => merged.push(record),
        }
    }
    merged
}
