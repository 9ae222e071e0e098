use crate::cell::{Cell, CellValue};
use crate::error::{Result, SheetError};
use crate::header::{self, MergedRange};
use std::collections::HashMap;
use std::ops::Range;

/// Options controlling how raw rows become a [`Sheet`].
#[derive(Debug, Clone)]
pub struct SheetOptions {
    /// Number of leading rows holding column headers (default: 1)
    pub header_rows: usize,
    /// Merged regions, used to name columns under merged headers
    pub merged: Vec<MergedRange>,
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions {
            header_rows: 1,
            merged: Vec::new(),
        }
    }
}

impl SheetOptions {
    /// Set the number of header rows
    #[must_use]
    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    /// Set the merged regions
    #[must_use]
    pub fn with_merged(mut self, merged: Vec<MergedRange>) -> Self {
        self.merged = merged;
        self
    }
}

/// An immutable, rectangular grid of normalized cells for one worksheet
/// (row-major storage plus its transpose).
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    cells: Vec<Vec<Cell>>,
    columns: Vec<Vec<Cell>>,
    header_rows: usize,
    column_names: Vec<String>,
    column_index: HashMap<String, Vec<usize>>,
    analyzable_count: usize,
}

impl Sheet {
    /// Build a sheet from raw rows.
    ///
    /// Rows shorter than the widest row are padded with empty cells, so every
    /// row of the grid has the same length.
    #[must_use]
    pub fn new(name: &str, rows: Vec<Vec<CellValue>>, options: SheetOptions) -> Self {
        let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        let header_rows = options.header_rows.min(rows.len());
        let column_names = header::column_names(&rows, header_rows, col_count, &options.merged);

        let cells: Vec<Vec<Cell>> = rows
            .into_iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let mut values = row.into_iter();
                (0..col_count)
                    .map(|col_idx| Cell::new(values.next().unwrap_or_default(), row_idx, col_idx))
                    .collect()
            })
            .collect();

        let columns: Vec<Vec<Cell>> = (0..col_count)
            .map(|col_idx| cells.iter().map(|row| row[col_idx].clone()).collect())
            .collect();

        let analyzable_count = cells
            .iter()
            .skip(header_rows)
            .flatten()
            .filter(|cell| cell.is_analyzable())
            .count();

        let mut column_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, name) in column_names.iter().enumerate() {
            column_index.entry(name.clone()).or_default().push(i);
        }

        tracing::debug!(
            sheet = name,
            rows = cells.len(),
            cols = col_count,
            analyzable = analyzable_count,
            "built sheet grid"
        );

        Sheet {
            name: name.to_string(),
            cells,
            columns,
            header_rows,
            column_names,
            column_index,
            analyzable_count,
        }
    }

    /// Create a sheet from a 2D vector of values, first row as header
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::new("Sheet1", converted, SheetOptions::default())
    }

    /// Create a sheet from text, inferring each cell's type with
    /// [`CellValue::parse`]; first row as header
    #[must_use]
    pub fn from_text_rows<S: AsRef<str>>(data: Vec<Vec<S>>) -> Self {
        let parsed = data
            .iter()
            .map(|row| row.iter().map(|s| CellValue::parse(s.as_ref())).collect())
            .collect();
        Self::new("Sheet1", parsed, SheetOptions::default())
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of rows, header rows included
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    /// Indices of the data (non-header) rows
    #[must_use]
    pub fn data_rows(&self) -> Range<usize> {
        self.header_rows..self.cells.len()
    }

    #[must_use]
    pub fn data_row_count(&self) -> usize {
        self.data_rows().len()
    }

    /// Number of analyzable cells among the data rows (the matrix size).
    #[must_use]
    pub fn analyzable_count(&self) -> usize {
        self.analyzable_count
    }

    // ===== Cell Access =====

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&Cell> {
        self.cell(row, col).ok_or(SheetError::IndexOutOfBounds {
            row,
            col,
            rows: self.row_count(),
            cols: self.col_count(),
        })
    }

    /// Get a cell using A1-style notation (e.g., "A1", "C7")
    pub fn get_a1(&self, notation: &str) -> Result<&Cell> {
        let (row, col) = crate::a1_notation::parse_a1(notation)?;
        self.get(row, col)
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.cells.get(index).map(Vec::as_slice)
    }

    /// A column from the transposed grid, header rows included
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&[Cell]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    /// The data cells of a column, top to bottom
    #[must_use]
    pub fn column_data(&self, index: usize) -> Option<&[Cell]> {
        self.columns
            .get(index)
            .map(|column| &column[self.header_rows..])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn columns(&self) -> impl Iterator<Item = &[Cell]> {
        self.columns.iter().map(Vec::as_slice)
    }

    // ===== Named Access =====

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.column_names.get(index).map(String::as_str)
    }

    /// Every column whose display name matches, in column order.
    ///
    /// Repeated header names map to all of their columns.
    #[must_use]
    pub fn column_indices(&self, name: &str) -> &[usize] {
        self.column_index
            .get(name.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first column with the given display name
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_indices(name).first().copied()
    }

    /// Like [`Sheet::column_index`], failing with `ColumnNotFound`
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }
}
