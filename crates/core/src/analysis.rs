//! Running all detectors over a sheet.

use crate::categorize::{CategorizationContext, Categorizer, ColumnCategorization};
use crate::config::AnalysisConfig;
use crate::detect::{
    DuplicateRow, DuplicateRowDetector, DuplicateValue, DuplicateValueDetector, RepeatedSequence,
    SequenceDetector,
};
use crate::entropy::{size_factor, EntropyModel};
use crate::error::ConfigResult;
use crate::suspicion::Suspicion;
use serde::{Deserialize, Serialize};
use sleuth_sheet::Sheet;

/// Everything found in one worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetReport {
    pub sheet: String,
    pub analyzable_cells: usize,
    pub size_factor: f64,
    pub categorization: ColumnCategorization,
    pub duplicate_rows: Vec<DuplicateRow>,
    pub duplicate_values: Vec<DuplicateValue>,
    pub repeated_sequences: Vec<RepeatedSequence>,
}

impl SheetReport {
    /// Highest suspicion level of any finding.
    pub fn max_suspicion(&self) -> Suspicion {
        let rows = self.duplicate_rows.iter().map(|r| r.suspicion);
        let values = self.duplicate_values.iter().map(|v| v.suspicion);
        let sequences = self.repeated_sequences.iter().map(|s| s.suspicion);
        rows.chain(values).chain(sequences).max().unwrap_or_default()
    }

    pub fn finding_count(&self) -> usize {
        self.duplicate_rows.len() + self.duplicate_values.len() + self.repeated_sequences.len()
    }

    pub fn is_clean(&self) -> bool {
        self.finding_count() == 0
    }

    /// Drop findings below `level`.
    pub fn retain_at_least(&mut self, level: Suspicion) {
        self.duplicate_rows.retain(|r| r.suspicion >= level);
        self.duplicate_values.retain(|v| v.suspicion >= level);
        self.repeated_sequences.retain(|s| s.suspicion >= level);
    }
}

/// Validated configuration plus the entropy model built from it.
///
/// ```
/// use sleuth_core::{Analyzer, ColumnCategorization};
/// use sleuth_sheet::Sheet;
///
/// let sheet = Sheet::from_text_rows(vec![
///     vec!["ID", "Score"],
///     vec!["1234567", "100"],
///     vec!["7654321", "200"],
///     vec!["1234567", "300"],
/// ]);
/// let report = Analyzer::default().analyze(&sheet, &ColumnCategorization::new(["ID"], []));
/// assert_eq!(report.duplicate_values.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
    model: EntropyModel,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> ConfigResult<Self> {
        config.validate()?;
        let model = EntropyModel::new(config.entropy.clone());
        Ok(Analyzer { config, model })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn model(&self) -> &EntropyModel {
        &self.model
    }

    /// Run the row detector, then the value detector with the rows' cells
    /// suppressed, then the sequence detector.
    pub fn analyze(&self, sheet: &Sheet, categorization: &ColumnCategorization) -> SheetReport {
        let duplicate_rows = DuplicateRowDetector::new(&self.model, self.config.rows.clone())
            .detect(sheet, categorization);
        let duplicate_values = DuplicateValueDetector::new(&self.model, self.config.values.clone())
            .detect_with_suppression(sheet, categorization, &duplicate_rows);
        let repeated_sequences = SequenceDetector::new(&self.model, self.config.sequences.clone())
            .detect(sheet, categorization);

        let report = SheetReport {
            sheet: sheet.name().to_string(),
            analyzable_cells: sheet.analyzable_count(),
            size_factor: size_factor(sheet.analyzable_count()),
            categorization: categorization.clone(),
            duplicate_rows,
            duplicate_values,
            repeated_sequences,
        };

        tracing::info!(
            sheet = %report.sheet,
            analyzable = report.analyzable_cells,
            rows = report.duplicate_rows.len(),
            values = report.duplicate_values.len(),
            sequences = report.repeated_sequences.len(),
            max = %report.max_suspicion(),
            "analyzed sheet"
        );
        report
    }

    /// Categorize the sheet's columns first, then [`analyze`](Self::analyze).
    pub fn analyze_with(
        &self,
        sheet: &Sheet,
        categorizer: &dyn Categorizer,
        context: &CategorizationContext,
    ) -> SheetReport {
        let categorization = categorizer.categorize(sheet, context);
        self.analyze(sheet, &categorization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::FixedCategorizer;
    use crate::error::ConfigError;

    fn sheet() -> Sheet {
        Sheet::from_text_rows(vec![
            vec!["ID", "Score", "Site"],
            vec!["1234567", "8500001", "3"],
            vec!["7654321", "90", "3"],
            vec!["1234567", "8500001", "4"],
        ])
    }

    #[test]
    fn test_row_pair_suppresses_its_values() {
        let categorization = ColumnCategorization::new(["ID", "Score"], ["Site"]);
        let report = Analyzer::default().analyze(&sheet(), &categorization);

        assert_eq!(report.duplicate_rows.len(), 1);
        assert!(report.duplicate_values.is_empty());
        assert_eq!(report.max_suspicion(), Suspicion::Medium);
        assert_eq!(report.finding_count(), 1);
    }

    #[test]
    fn test_unsuspicious_row_pair_keeps_its_values() {
        let mut rows = vec![
            vec!["A", "B", "C", "D"],
            vec!["1234567", "8500001", "11", "51"],
            vec!["1234567", "8500001", "12", "52"],
        ];
        for n in 0..8 {
            rows.push(vec![
                ["21", "22", "23", "24", "25", "26", "27", "28"][n],
                ["31", "32", "33", "34", "35", "36", "37", "38"][n],
                ["13", "14", "15", "16", "17", "18", "19", "20"][n],
                ["53", "54", "55", "56", "57", "58", "59", "60"][n],
            ]);
        }
        let sheet = Sheet::from_text_rows(rows);
        assert_eq!(sheet.analyzable_count(), 40);

        let categorization = ColumnCategorization::new(["A", "B", "C", "D"], []);
        let mut report = Analyzer::default().analyze(&sheet, &categorization);

        assert_eq!(report.duplicate_rows.len(), 1);
        assert_eq!(report.duplicate_rows[0].suspicion, Suspicion::None);
        assert_eq!(report.duplicate_values.len(), 2);

        report.retain_at_least(Suspicion::Low);
        assert!(report.duplicate_rows.is_empty());
        let values: Vec<f64> = report.duplicate_values.iter().map(|v| v.value).collect();
        assert_eq!(values, [8_500_001.0, 1_234_567.0]);
    }

    #[test]
    fn test_analyze_with_categorizer() {
        let categorizer = FixedCategorizer::new(ColumnCategorization::new(["ID"], []));
        let report = Analyzer::default().analyze_with(
            &sheet(),
            &categorizer,
            &CategorizationContext::default(),
        );
        assert!(report.duplicate_rows.is_empty());
        assert_eq!(report.duplicate_values.len(), 1);
        assert_eq!(report.categorization.unique, vec!["ID".to_string()]);
    }

    #[test]
    fn test_retain_at_least() {
        let categorization = ColumnCategorization::new(["ID", "Score"], []);
        let mut report = Analyzer::default().analyze(&sheet(), &categorization);
        report.retain_at_least(Suspicion::High);
        assert!(report.is_clean());
        assert_eq!(report.max_suspicion(), Suspicion::None);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.rows.min_shared_columns = 0;
        assert!(matches!(
            Analyzer::new(config),
            Err(ConfigError::TooSmall { .. })
        ));
    }

    #[test]
    fn test_report_serializes() {
        let report = Analyzer::default().analyze(&sheet(), &ColumnCategorization::new(["ID"], []));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sheet"], "Sheet1");
        assert_eq!(json["duplicate_values"][0]["suspicion"], "medium");
    }
}
