//! A1-style addressing (`C7` = row 6, column 2, both 0-based).

use crate::error::{Result, SheetError};

/// Convert 0-based column index to column letters
/// 0=A, 1=B, ... 25=Z, 26=AA, 27=AB, ...
#[must_use]
pub fn column_index_to_letters(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Convert column letters (case-insensitive) to a 0-based column index
pub fn column_letters_to_index(letters: &str) -> Result<usize> {
    if letters.is_empty() {
        return Err(SheetError::InvalidCellNotation(letters.to_string()));
    }
    letters.chars().try_fold(0usize, |acc, ch| {
        let upper = ch.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(acc * 26 + (upper as usize - 'A' as usize) + 1)
        } else {
            Err(SheetError::InvalidCellNotation(letters.to_string()))
        }
    })
    .map(|one_based| one_based - 1)
}

/// Convert (row, col) to A1 notation
/// (0, 0) = "A1", (6, 2) = "C7"
#[must_use]
pub fn to_a1_notation(row: usize, col: usize) -> String {
    format!("{}{}", column_index_to_letters(col), row + 1)
}

/// Parse A1-style cell notation into 0-based (row, column)
pub fn parse_a1(notation: &str) -> Result<(usize, usize)> {
    let invalid = || SheetError::InvalidCellNotation(notation.to_string());

    let split = notation
        .find(|ch: char| ch.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = notation.split_at(split);
    if letters.is_empty() {
        return Err(invalid());
    }

    let col = column_letters_to_index(letters).map_err(|_| invalid())?;
    let row = digits.parse::<usize>().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok((row - 1, col))
}
