use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::header::MergedRange;
use crate::sheet::{Sheet, SheetOptions};
use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Options for reading Excel files
#[derive(Debug, Clone)]
pub struct XlsxReadOptions {
    /// Number of header rows at the top of each worksheet's used range
    pub header_rows: usize,
}

impl Default for XlsxReadOptions {
    fn default() -> Self {
        XlsxReadOptions { header_rows: 1 }
    }
}

impl XlsxReadOptions {
    /// Set the number of header rows
    #[must_use]
    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }
}

fn workbook_error(e: XlsxError) -> SheetError {
    SheetError::Workbook(e.to_string())
}

/// Excel stores dates as days since 1899-12-30
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    // Beyond year 9999 in either direction
    if !serial.is_finite() || serial.abs() > 2_958_465.0 {
        return None;
    }
    let millis = (serial * 86_400_000.0).round();
    epoch.checked_add_signed(Duration::milliseconds(millis as i64))
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map_or_else(|| CellValue::Float(dt.as_f64()), CellValue::Date),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}

/// Lay a calamine range onto a grid anchored at A1.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };
    let mut rows = vec![vec![CellValue::Null; end_col as usize + 1]; end_row as usize + 1];
    if let Some((start_row, start_col)) = range.start() {
        for (r, row) in range.rows().enumerate() {
            for (c, data) in row.iter().enumerate() {
                rows[start_row as usize + r][start_col as usize + c] = data_to_cell_value(data);
            }
        }
    }
    rows
}

/// Replace cells that hold a formula with a formula value caching the result.
fn apply_formulas(rows: &mut [Vec<CellValue>], formulas: &Range<String>) {
    let Some((start_row, start_col)) = formulas.start() else {
        return;
    };
    for (r, row) in formulas.rows().enumerate() {
        for (c, source) in row.iter().enumerate() {
            if source.is_empty() {
                continue;
            }
            let (abs_row, abs_col) = (start_row as usize + r, start_col as usize + c);
            if let Some(cell) = rows.get_mut(abs_row).and_then(|row| row.get_mut(abs_col)) {
                let cached = std::mem::take(cell);
                *cell = CellValue::formula_with_cached(format!("={source}"), cached);
            }
        }
    }
}

impl Book {
    /// Load every worksheet of an Excel file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or a worksheet cannot be read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_xlsx_with_options(path, &XlsxReadOptions::default())
    }

    /// Load every worksheet of an Excel file with options
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or a worksheet cannot be read.
    pub fn from_xlsx_with_options<P: AsRef<Path>>(
        path: P,
        options: &XlsxReadOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook: Xlsx<BufReader<File>> = open_workbook(path).map_err(workbook_error)?;

        let book_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Book1");
        let mut book = Book::with_name(book_name);

        for sheet_name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(workbook_error)?;
            let mut rows = range_to_rows(&range);

            match workbook.worksheet_formula(&sheet_name) {
                Ok(formulas) => apply_formulas(&mut rows, &formulas),
                Err(e) => tracing::warn!(sheet = %sheet_name, "could not read formulas: {e}"),
            }

            let merged = match workbook.worksheet_merge_cells(&sheet_name) {
                Some(Ok(regions)) => regions
                    .iter()
                    .map(|d| {
                        MergedRange::new(
                            d.start.0 as usize,
                            d.start.1 as usize,
                            d.end.0 as usize,
                            d.end.1 as usize,
                        )
                    })
                    .collect(),
                Some(Err(e)) => {
                    tracing::warn!(sheet = %sheet_name, "could not read merged cells: {e}");
                    Vec::new()
                }
                None => Vec::new(),
            };

            // Header rows count from the first used row.
            let first_row = range.start().map_or(0, |(row, _)| row as usize);
            let sheet_options = SheetOptions::default()
                .with_header_rows(first_row + options.header_rows)
                .with_merged(merged);

            book.add_sheet(Sheet::new(&sheet_name, rows, sheet_options));
        }

        Ok(book)
    }
}
