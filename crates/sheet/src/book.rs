use crate::csv::CsvOptions;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::IndexMap;
use std::path::Path;

/// The worksheets of one loaded file (preserves workbook order)
#[derive(Debug, Clone)]
pub struct Book {
    name: String,
    sheets: IndexMap<String, Sheet>,
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Book1")
    }

    /// Create a new empty book with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Book {
            name: name.to_string(),
            sheets: IndexMap::new(),
        }
    }

    /// Load a book from a spreadsheet file, choosing the reader by extension.
    ///
    /// `.csv`/`.tsv` produce a single-sheet book; `.xlsx`/`.xlsm` one sheet per
    /// worksheet.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::UnsupportedFormat` for other extensions, or the
    /// underlying read error.
    pub fn from_path<P: AsRef<Path>>(path: P, header_rows: usize) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "tsv" => {
                let base = if extension == "tsv" {
                    CsvOptions::tsv()
                } else {
                    CsvOptions::default()
                };
                let sheet = Sheet::from_csv_with_options(path, base.with_header_rows(header_rows))?;
                let mut book = Book::with_name(sheet.name());
                book.add_sheet(sheet);
                Ok(book)
            }
            #[cfg(not(target_arch = "wasm32"))]
            "xlsx" | "xlsm" => {
                let options = crate::xlsx::XlsxReadOptions::default().with_header_rows(header_rows);
                Book::from_xlsx_with_options(path, &options)
            }
            _ => Err(SheetError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Get the book name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Add a sheet under its own name, replacing any sheet with that name
    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.insert(sheet.name().to_string(), sheet);
    }

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Iterate over the sheets in order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    /// Consume the book, returning its sheets in order
    #[must_use]
    pub fn into_sheets(self) -> Vec<Sheet> {
        self.sheets.into_values().collect()
    }
}
