//! Heuristic information content of a number.
//!
//! "Entropy" here is not Shannon entropy: it measures how arbitrary a value
//! looks from its significant digits, so that an exact repeat of `8.53291`
//! counts for far more than a repeat of `100`. Calendar years and roundings
//! of simple fractions are pulled down because they recur legitimately.

use crate::config::EntropyConfig;
use sleuth_sheet::numeric::{
    decimal_places, is_integral, round_to, significant_digits, snap, NOISE_TOLERANCE,
};

const SMALL_RAW_LIMIT: f64 = 100.0;
const MEDIUM_RAW_LIMIT: f64 = 100_000.0;
const SMALL_COEFFICIENT: f64 = 2.0;
const MEDIUM_COEFFICIENT: f64 = 1.5;
const LARGE_COEFFICIENT: f64 = 1.0;

/// The significant digits of `value` read as an integer.
///
/// ```
/// use sleuth_core::entropy::digit_entropy;
///
/// assert_eq!(digit_entropy(8.53291), 853_291);
/// assert_eq!(digit_entropy(12_000.0), 12);
/// assert_eq!(digit_entropy(0.0), 0);
/// ```
#[must_use]
pub fn digit_entropy(value: f64) -> u64 {
    let digits = significant_digits(value);
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u64::MAX)
    }
}

/// Compress a raw entropy onto a log scale with a steeper slope for small
/// values, continuous at both breakpoints.
#[must_use]
pub fn entropy_score(raw: u64) -> f64 {
    let raw = raw as f64;
    let small_top = SMALL_COEFFICIENT * SMALL_RAW_LIMIT.log10();
    let medium_top = small_top + MEDIUM_COEFFICIENT * (MEDIUM_RAW_LIMIT / SMALL_RAW_LIMIT).log10();

    if raw < 1.0 {
        0.0
    } else if raw < SMALL_RAW_LIMIT {
        SMALL_COEFFICIENT * raw.log10()
    } else if raw < MEDIUM_RAW_LIMIT {
        small_top + MEDIUM_COEFFICIENT * (raw / SMALL_RAW_LIMIT).log10()
    } else {
        medium_top + LARGE_COEFFICIENT * (raw / MEDIUM_RAW_LIMIT).log10()
    }
}

/// Matrix-size normalizer: raw scores are divided by this before
/// thresholding. Grows with the number of analyzable cells, never below 1.
#[must_use]
pub fn size_factor(analyzable_cells: usize) -> f64 {
    (analyzable_cells as f64).log10().max(1.0)
}

/// Scores numbers according to an [`EntropyConfig`].
#[derive(Debug, Clone, Default)]
pub struct EntropyModel {
    config: EntropyConfig,
}

impl EntropyModel {
    #[must_use]
    pub fn new(config: EntropyConfig) -> Self {
        EntropyModel { config }
    }

    #[must_use]
    pub fn config(&self) -> &EntropyConfig {
        &self.config
    }

    fn is_year(&self, value: f64) -> bool {
        is_integral(value)
            && value >= self.config.year_min as f64
            && value <= self.config.year_max as f64
    }

    /// Digit entropy with the calendar-year and hidden-fraction corrections.
    #[must_use]
    pub fn raw_entropy(&self, value: f64) -> u64 {
        if self.is_year(value) {
            return self.config.year_score;
        }

        let base = digit_entropy(value);
        let places = decimal_places(value);
        if is_integral(value) || places < 2 {
            return base;
        }

        let lowest = self
            .config
            .fraction_denominators
            .iter()
            .map(|&d| digit_entropy(snap_fraction_product(value * f64::from(d), places, d)))
            .min();

        match lowest {
            Some(adjusted) if (adjusted as f64) < base as f64 * self.config.fraction_ratio => {
                adjusted
            }
            _ => base,
        }
    }

    #[must_use]
    pub fn value_score(&self, value: f64) -> f64 {
        entropy_score(self.raw_entropy(value))
    }

    /// Summed score of a run of values.
    #[must_use]
    pub fn sequence_entropy_score(&self, values: &[f64]) -> f64 {
        values.iter().map(|&v| self.value_score(v)).sum()
    }

    /// Summed score of the values two rows share, scaled by the square root
    /// of how many columns were compared.
    #[must_use]
    pub fn row_entropy_score(&self, values: &[f64], columns_compared: usize) -> f64 {
        let compared = columns_compared.max(1) as f64;
        self.sequence_entropy_score(values) / compared.sqrt()
    }
}

/// Snap `value × d` back to a short decimal if it lies within the worst-case
/// rounding error of a `places`-decimal recording of some `k / d`.
///
/// Only decimals far coarser than the recording precision count, so that a
/// random value rarely lands on one by chance.
fn snap_fraction_product(product: f64, places: u32, denominator: u32) -> f64 {
    let denominator_digits = denominator.to_string().len() as i64;
    let max_places = i64::from(places) - 2 - denominator_digits;
    let tolerance = f64::from(denominator) * 0.5 * 10f64.powi(-(places as i32))
        + product.abs() * NOISE_TOLERANCE;

    for q in 0..=max_places.max(-1) {
        let candidate = round_to(product, q as u32);
        if (candidate - product).abs() <= tolerance {
            return candidate;
        }
    }
    snap(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> EntropyModel {
        EntropyModel::default()
    }

    #[test]
    fn test_trailing_zeros_are_stripped() {
        let m = model();
        assert_eq!(m.raw_entropy(1000.0), 1);
        assert_eq!(m.raw_entropy(1.0), 1);
        assert_eq!(m.raw_entropy(12_000.0), 12);
        assert_eq!(m.raw_entropy(100.0), 1);
    }

    #[test]
    fn test_years_get_fixed_score() {
        let m = model();
        for year in 1900..=2030 {
            assert_eq!(m.raw_entropy(f64::from(year)), 100, "year {year}");
        }
        assert_eq!(m.raw_entropy(1899.0), 1899);
        assert_eq!(m.raw_entropy(2031.0), 2031);
        assert_eq!(m.raw_entropy(2000.5), 20005);
    }

    #[test]
    fn test_specific_values_keep_their_digits() {
        let m = model();
        assert_eq!(m.raw_entropy(8.532_91), 853_291);
        assert_eq!(m.raw_entropy(1_234_567.0), 1_234_567);
        assert_eq!(m.raw_entropy(-72.25), 7225);
    }

    #[test]
    fn test_hidden_fractions_are_discounted() {
        let m = model();
        // 1/3 and 15/7 recorded to six places
        assert_eq!(m.raw_entropy(0.333_333), 1);
        assert_eq!(m.raw_entropy(2.142_857), 15);
        // 5/9
        assert_eq!(m.raw_entropy(0.555_556), 5);
    }

    #[test]
    fn test_short_decimals_skip_fraction_check() {
        let m = model();
        assert_eq!(m.raw_entropy(0.33), 33);
        assert_eq!(m.raw_entropy(2.5), 25);
    }

    #[test]
    fn test_entropy_score_is_continuous_and_increasing() {
        assert_eq!(entropy_score(0), 0.0);
        assert_eq!(entropy_score(1), 0.0);
        assert!((entropy_score(100) - 4.0).abs() < 1e-9);
        assert!((entropy_score(100_000) - 8.5).abs() < 1e-9);
        assert!((entropy_score(99) - 4.0).abs() < 0.01);
        assert!((entropy_score(99_999) - 8.5).abs() < 0.01);

        let mut previous = -1.0;
        for raw in [1, 5, 50, 99, 100, 500, 12_345, 100_000, 1_234_567, u64::MAX] {
            let score = entropy_score(raw);
            assert!(score > previous || raw == 1, "{raw}");
            previous = score;
        }
    }

    #[test]
    fn test_row_score_divides_by_sqrt_of_columns() {
        let m = model();
        let values = [1_234_567.0, 8_500_001.0];
        let sum = m.sequence_entropy_score(&values);
        assert!((m.row_entropy_score(&values, 4) - sum / 2.0).abs() < 1e-9);
        assert!((m.row_entropy_score(&values, 0) - sum).abs() < 1e-9);
    }

    #[test]
    fn test_size_factor_is_monotonic_with_floor() {
        assert_eq!(size_factor(0), 1.0);
        assert_eq!(size_factor(6), 1.0);
        assert!((size_factor(1000) - 3.0).abs() < 1e-9);
        let mut previous = 0.0;
        for n in (0..10_000).step_by(97) {
            let factor = size_factor(n);
            assert!(factor >= previous);
            previous = factor;
        }
    }
}
