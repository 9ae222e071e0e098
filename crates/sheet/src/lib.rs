//! Worksheet grid for sleuth
//!
//! Turns raw spreadsheet content into an immutable grid of normalized cells:
//! every cell knows whether it is numeric, a date or a formula, numbers are
//! cleaned of floating-point representation noise once at load time, and the
//! grid keeps its transpose and display names for (possibly multi-row,
//! merged) headers.
//!
//! # Examples
//!
//! ## Building a sheet from text
//!
//! ```
//! use sleuth_sheet::Sheet;
//!
//! let sheet = Sheet::from_text_rows(vec![
//!     vec!["ID", "Weight"],
//!     vec!["1001", "72.5"],
//!     vec!["1002", "=B2*2"],
//! ]);
//!
//! assert_eq!(sheet.row_count(), 3);
//! assert_eq!(sheet.column_index("Weight"), Some(1));
//! // The formula cell is numeric-looking but not analyzable.
//! assert_eq!(sheet.analyzable_count(), 3);
//! ```
//!
//! ## Multi-row merged headers
//!
//! ```
//! use sleuth_sheet::{CellValue, MergedRange, Sheet, SheetOptions};
//!
//! let rows = vec![
//!     vec![CellValue::from("Visit 1"), CellValue::Null],
//!     vec![CellValue::from("Weight"), CellValue::from("Height")],
//!     vec![CellValue::Float(71.2), CellValue::Float(180.4)],
//! ];
//! let options = SheetOptions::default()
//!     .with_header_rows(2)
//!     .with_merged(vec![MergedRange::new(0, 0, 0, 1)]);
//! let sheet = Sheet::new("visits", rows, options);
//!
//! assert_eq!(sheet.column_names(), ["Visit 1 - Weight", "Visit 1 - Height"]);
//! ```
//!
//! ## Loading from a file
//!
//! ```no_run
//! use sleuth_sheet::Book;
//!
//! let book = Book::from_path("measurements.xlsx", 1).unwrap();
//! for sheet in book.sheets() {
//!     println!("{}: {} analyzable cells", sheet.name(), sheet.analyzable_count());
//! }
//! ```

pub mod a1_notation;
mod book;
mod cell;
mod csv;
mod error;
mod header;
pub mod numeric;
mod sheet;
#[cfg(not(target_arch = "wasm32"))]
mod xlsx;

/// Re-export the workbook container.
pub use book::Book;
/// Re-export cell types.
pub use cell::{Cell, CellValue, FormulaCell};
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export header types.
pub use header::{MergedRange, HEADER_SEPARATOR};
/// Re-export sheet types.
pub use sheet::{Sheet, SheetOptions};
#[cfg(not(target_arch = "wasm32"))]
/// Re-export XLSX read options (non-WASM only).
pub use xlsx::XlsxReadOptions;
