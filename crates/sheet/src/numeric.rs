//! Floating-point representation cleanup.
//!
//! Spreadsheet numbers routinely arrive as the binary approximation of a short
//! decimal (`0.1 + 0.2` stored as `0.30000000000000004`). Every numeric cell is
//! snapped back to its shortest nearby decimal once, when the grid is built, so
//! later equality checks can compare `f64` values exactly.

/// Relative distance within which a shorter decimal replaces the stored value.
pub const NOISE_TOLERANCE: f64 = 1e-12;

/// Highest number of decimal places tried while snapping.
pub const MAX_DECIMAL_PLACES: u32 = 15;

/// Magnitudes at or above this carry no fractional digits worth snapping.
const MAX_SNAP_MAGNITUDE: f64 = 1e15;

/// Round `x` to `places` decimal places.
#[must_use]
pub fn round_to(x: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (x * scale).round() / scale
}

/// Snap `x` to the decimal with the fewest places lying within
/// [`NOISE_TOLERANCE`] of it.
///
/// Non-finite values are returned unchanged and `-0.0` becomes `0.0`.
///
/// ```
/// use sleuth_sheet::numeric::snap;
///
/// assert_eq!(snap(0.1 + 0.2), 0.3);
/// assert_eq!(snap(8.53291), 8.53291);
/// ```
#[must_use]
pub fn snap(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    if !x.is_finite() || x.abs() >= MAX_SNAP_MAGNITUDE {
        return x;
    }

    let tolerance = x.abs() * NOISE_TOLERANCE;
    for places in 0..=MAX_DECIMAL_PLACES {
        let rounded = round_to(x, places);
        if (rounded - x).abs() <= tolerance {
            return rounded;
        }
    }
    x
}

/// Number of digits after the decimal point in the shortest round-trip
/// representation of `x`.
#[must_use]
pub fn decimal_places(x: f64) -> u32 {
    let text = format!("{}", x.abs());
    text.split_once('.')
        .map_or(0, |(_, fraction)| fraction.len() as u32)
}

/// The significant digits of `x`: decimal point and sign dropped, leading and
/// trailing zeros stripped. Zero yields an empty string.
#[must_use]
pub fn significant_digits(x: f64) -> String {
    let text = format!("{}", x.abs());
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').trim_end_matches('0').to_string()
}

/// Whether `x` has no fractional part.
#[must_use]
pub fn is_integral(x: f64) -> bool {
    x.is_finite() && x.fract() == 0.0
}
