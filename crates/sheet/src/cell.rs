use crate::a1_notation::to_a1_notation;
use crate::numeric::snap;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Represents a formula stored in a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaCell {
    pub source: String,
    pub cached: Option<Box<CellValue>>,
}

/// Represents a raw cell value as delivered by a loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDateTime),
    Formula(FormulaCell),
}

impl CellValue {
    /// Create a formula cell value.
    #[must_use]
    pub fn formula<S: Into<String>>(source: S) -> Self {
        CellValue::Formula(FormulaCell {
            source: source.into(),
            cached: None,
        })
    }

    /// Create a formula cell value carrying its computed result.
    #[must_use]
    pub fn formula_with_cached<S: Into<String>>(source: S, cached: CellValue) -> Self {
        CellValue::Formula(FormulaCell {
            source: source.into(),
            cached: Some(Box::new(cached)),
        })
    }

    /// Return the cached value for formulas, or self for non-formulas.
    #[must_use]
    pub fn cached_or_self(&self) -> &CellValue {
        match self {
            CellValue::Formula(formula) => formula.cached.as_deref().unwrap_or(self),
            _ => self,
        }
    }

    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.cached_or_self(), CellValue::Null)
    }

    /// Check if the value is a formula
    #[must_use]
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula(_))
    }

    /// The numeric payload, if the (cached) value is a finite number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self.cached_or_self() {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    /// Get the value as a string
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Formula(formula) => formula.source.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the value is a date, either typed or a date-shaped string.
    #[must_use]
    pub fn is_date(&self) -> bool {
        match self.cached_or_self() {
            CellValue::Date(_) => true,
            CellValue::String(s) => looks_like_date(s),
            _ => false,
        }
    }

    /// Parse a string into a `CellValue` with type inference
    /// Tries: null -> formula -> bool -> int -> float -> string
    #[must_use]
    pub fn parse(s: &str) -> CellValue {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Null;
        }

        if trimmed.starts_with('=') {
            return CellValue::formula(trimmed.to_string());
        }

        // Note: "1"/"0" are parsed as Int, not Bool
        match trimmed.to_lowercase().as_str() {
            "true" | "yes" => return CellValue::Bool(true),
            "false" | "no" => return CellValue::Bool(false),
            _ => {}
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }

        CellValue::String(s.to_string())
    }
}

fn looks_like_date(s: &str) -> bool {
    static DATE_SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    DATE_SHAPE
        .get_or_init(|| {
            Regex::new(r"^\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}(?:[ T]\d{1,2}:\d{2}(?::\d{2})?)?$").ok()
        })
        .as_ref()
        .is_some_and(|re| re.is_match(s.trim()))
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cached_or_self() {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Formula(formula) => write!(f, "{}", formula.source),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// One normalized grid position.
///
/// The numeric payload is snapped (see [`crate::numeric::snap`]) when the cell
/// is built, so two cells holding the same decimal compare equal bit for bit.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    value: CellValue,
    row: usize,
    col: usize,
    address: String,
    number: Option<f64>,
    is_date: bool,
    is_formula: bool,
}

impl Cell {
    #[must_use]
    pub fn new(value: CellValue, row: usize, col: usize) -> Self {
        let is_date = value.is_date();
        let is_formula = value.is_formula();
        let number = if is_date {
            None
        } else {
            value.as_number().map(snap)
        };

        Cell {
            address: to_a1_notation(row, col),
            value,
            row,
            col,
            number,
            is_date,
            is_formula,
        }
    }

    /// An empty cell, used to pad ragged rows.
    #[must_use]
    pub fn empty(row: usize, col: usize) -> Self {
        Self::new(CellValue::Null, row, col)
    }

    #[must_use]
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }

    /// Spreadsheet-style address, e.g. `C7`
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The noise-corrected numeric value, for numeric cells.
    #[must_use]
    pub fn number(&self) -> Option<f64> {
        self.number
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.number.is_some()
    }

    #[must_use]
    pub fn is_date(&self) -> bool {
        self.is_date
    }

    #[must_use]
    pub fn is_formula(&self) -> bool {
        self.is_formula
    }

    /// A directly entered number. Only these take part in duplication analysis.
    #[must_use]
    pub fn is_analyzable(&self) -> bool {
        self.is_numeric() && !self.is_formula
    }

    /// The value of an analyzable cell.
    #[must_use]
    pub fn analyzable_number(&self) -> Option<f64> {
        if self.is_formula {
            None
        } else {
            self.number
        }
    }
}
