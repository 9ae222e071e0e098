//! The three duplication detectors.
//!
//! Each detector is a pure, single-threaded scan over one immutable
//! [`Sheet`]: it builds its own short-lived indices, never fails, and returns
//! its findings sorted best-first. All scores are divided by
//! [`size_factor`](crate::entropy::size_factor) of the sheet's analyzable cell
//! count before they are classified.

mod rows;
mod sequences;
mod values;

pub use rows::{DuplicateRow, DuplicateRowDetector, SharedValue};
pub use sequences::{RepeatedSequence, SequenceDetector, SequenceStart};
pub use values::{DuplicateValue, DuplicateValueDetector};

use serde::{Deserialize, Serialize};
use sleuth_sheet::{Cell, Sheet};
use std::cmp::Ordering;

/// Location of a cell in a finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
    /// Display name of the column.
    pub column: String,
    /// A1-style address.
    pub address: String,
}

impl CellRef {
    pub(crate) fn new(sheet: &Sheet, cell: &Cell) -> Self {
        CellRef {
            row: cell.row(),
            col: cell.col(),
            column: column_name(sheet, cell.col()),
            address: cell.address().to_string(),
        }
    }
}

pub(crate) fn column_name(sheet: &Sheet, col: usize) -> String {
    sheet.column_name(col).unwrap_or_default().to_string()
}

/// The analyzable value at `(row, col)`, if any.
pub(crate) fn analyzable(sheet: &Sheet, row: usize, col: usize) -> Option<f64> {
    sheet.cell(row, col).and_then(Cell::analyzable_number)
}

/// Values are snapped at load time, so equal decimals are equal bit for bit.
pub(crate) fn same_value(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

/// Descending by score.
pub(crate) fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
