//! Column display names built from one or more header rows.

use crate::a1_notation::column_index_to_letters;
use crate::cell::CellValue;
use serde::{Deserialize, Serialize};

/// Separator placed between the parts of a multi-row header.
pub const HEADER_SEPARATOR: &str = " - ";

/// A merged cell region, inclusive on both ends (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl MergedRange {
    #[must_use]
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        MergedRange {
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.start_row..=self.end_row).contains(&row)
            && (self.start_col..=self.end_col).contains(&col)
    }
}

/// Compute the display name of every column.
///
/// Each merged region touching the header area spreads its top-left text over
/// the cells it covers. Per column the non-empty header texts are then joined
/// top to bottom with [`HEADER_SEPARATOR`], collapsing a text repeated by a
/// vertical merge. A column without any header text is named by its letter.
pub(crate) fn column_names(
    rows: &[Vec<CellValue>],
    header_rows: usize,
    col_count: usize,
    merged: &[MergedRange],
) -> Vec<String> {
    if col_count == 0 {
        return Vec::new();
    }
    let header_rows = header_rows.min(rows.len());
    let mut texts: Vec<Vec<String>> = rows[..header_rows]
        .iter()
        .map(|row| {
            (0..col_count)
                .map(|col| row.get(col).map(|v| v.to_string().trim().to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    for range in merged.iter().filter(|m| m.start_row < header_rows) {
        let source = texts[range.start_row]
            .get(range.start_col)
            .cloned()
            .unwrap_or_default();
        for row in range.start_row..=range.end_row.min(header_rows - 1) {
            for col in range.start_col..=range.end_col.min(col_count.saturating_sub(1)) {
                texts[row][col].clone_from(&source);
            }
        }
    }

    (0..col_count)
        .map(|col| {
            let mut parts: Vec<&str> = Vec::new();
            for row in &texts {
                let text = row[col].as_str();
                if !text.is_empty() && parts.last() != Some(&text) {
                    parts.push(text);
                }
            }
            if parts.is_empty() {
                column_index_to_letters(col)
            } else {
                parts.join(HEADER_SEPARATOR)
            }
        })
        .collect()
}
