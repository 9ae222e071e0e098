use sleuth_core::{
    Analyzer, CategorizationContext, ColumnCategorization, DuplicateRowDetector,
    DuplicateValueDetector, EntropyModel, RowDetectorConfig, RuleCategorizer, SequenceDetector,
    SequenceDetectorConfig, Suspicion, ValueDetectorConfig,
};
use sleuth_sheet::{CellValue, Sheet, SheetOptions};
use std::io::Write;

fn text_sheet(rows: &[&[&str]]) -> Sheet {
    Sheet::from_text_rows(rows.iter().map(|row| row.to_vec()).collect())
}

fn unique(names: &[&str]) -> ColumnCategorization {
    ColumnCategorization::new(names.iter().copied(), [])
}

#[test]
fn test_duplicate_value_example() {
    let sheet = text_sheet(&[
        &["ID", "Amount"],
        &["1234567", "100"],
        &["7654321", "200"],
        &["1234567", "300"],
    ]);
    let model = EntropyModel::default();
    let detector = DuplicateValueDetector::new(&model, ValueDetectorConfig::default());

    let found = detector.detect(&sheet, &unique(&["ID"]));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, 1_234_567.0);
    assert_eq!(found[0].occurrences(), 2);

    let sheet = text_sheet(&[&["ID", "Amount"], &["1", "100"], &["2", "200"], &["1", "300"]]);
    assert!(detector.detect(&sheet, &unique(&["ID"])).is_empty());
}

#[test]
fn test_duplicate_row_example() {
    let sheet = text_sheet(&[
        &["ID", "Score"],
        &["1234567", "8500001"],
        &["7654321", "90"],
        &["1234567", "8500001"],
    ]);
    let model = EntropyModel::default();
    let detector = DuplicateRowDetector::new(&model, RowDetectorConfig::default());

    let found = detector.detect(&sheet, &unique(&["ID", "Score"]));
    assert_eq!(found.len(), 1);
    // first and third data rows, below one header row
    assert_eq!(found[0].rows, (1, 3));
    assert_eq!(found[0].shared_count(), 2);

    assert!(detector.detect(&sheet, &unique(&["ID"])).is_empty());
}

fn run_column(copies: usize) -> Sheet {
    let run = ["8.53291", "4.71185", "6.29374", "3.18562", "7.40916", "5.92837"];
    let separators = ["10.5", "20.25", "30.75", "40.125"];
    let mut rows: Vec<Vec<&str>> = vec![vec!["Reading"]];
    for copy in 0..copies {
        rows.extend(run.iter().map(|v| vec![*v]));
        rows.push(vec![separators[copy]]);
    }
    Sheet::from_text_rows(rows)
}

#[test]
fn test_repeated_sequence_example() {
    let model = EntropyModel::default();
    let detector = SequenceDetector::new(&model, SequenceDetectorConfig::default());

    let found = detector.detect(&run_column(2), &unique(&["Reading"]));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].values.len(), 6);
    let starts: Vec<usize> = found[0].starts.iter().map(|s| s.row).collect();
    assert_eq!(starts, [1, 8]);

    let found = detector.detect(&run_column(3), &unique(&["Reading"]));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].copies(), 3);

    let found = detector.detect(&run_column(4), &unique(&["Reading"]));
    assert_eq!(found.len(), 1);
    let starts: Vec<usize> = found[0].starts.iter().map(|s| s.row).collect();
    assert_eq!(starts, [1, 8, 15, 22]);
}

#[test]
fn test_shared_columns_never_reported() {
    let sheet = text_sheet(&[
        &["Weight", "Batch", "Height"],
        &["71.23", "8532917", "180.41"],
        &["65.87", "8532917", "172.94"],
        &["82.19", "8532917", "165.38"],
        &["71.23", "4718543", "180.41"],
    ]);
    let categorization = ColumnCategorization::new(["Weight", "Height"], ["Batch"]);
    let report = Analyzer::default().analyze(&sheet, &categorization);

    for value in &report.duplicate_values {
        assert!(value.cells.iter().all(|cell| cell.column != "Batch"));
        assert_ne!(value.value, 8_532_917.0);
    }
    for pair in &report.duplicate_rows {
        assert!(pair.shared.iter().all(|shared| shared.column != "Batch"));
    }
    assert!(report.repeated_sequences.iter().all(|s| s.column != "Batch"));
}

#[test]
fn test_analysis_is_idempotent() {
    let mut rows = vec![vec!["A", "B", "C"]];
    let block = [
        ["1234567", "8.53291", "4.71185"],
        ["7654321", "6.29374", "3.18562"],
        ["2345678", "7.40916", "5.92837"],
    ];
    for _ in 0..3 {
        rows.extend(block.iter().map(|r| r.to_vec()));
        rows.push(vec!["9.1", "8.2", "7.3"]);
    }
    let sheet = Sheet::from_text_rows(rows);
    let categorization = unique(&["A", "B", "C"]);
    let analyzer = Analyzer::default();

    let first = analyzer.analyze(&sheet, &categorization);
    let second = analyzer.analyze(&sheet, &categorization);
    assert_eq!(first, second);
    assert!(first.finding_count() > 0);
}

#[test]
fn test_more_cells_never_raise_scores() {
    let base: Vec<Vec<CellValue>> = vec![
        vec!["ID".into(), "Filler".into()],
        vec![1_234_567.into(), 11.into()],
        vec![7_654_321.into(), 12.into()],
        vec![1_234_567.into(), 13.into()],
    ];
    let categorization = unique(&["ID"]);
    let model = EntropyModel::default();
    let detector = DuplicateValueDetector::new(&model, ValueDetectorConfig::default());

    let mut previous = f64::INFINITY;
    for extra in [0usize, 20, 200, 2000] {
        let mut rows = base.clone();
        rows.extend((0..extra).map(|n| vec![CellValue::Null, CellValue::Int(100 + n as i64)]));
        let sheet = Sheet::new("grow", rows, SheetOptions::default());

        let found = detector.detect(&sheet, &categorization);
        let score = found.first().map_or(0.0, |record| record.score);
        assert!(score <= previous, "{extra} extra cells raised the score");
        previous = score;
    }
    assert!(previous < f64::INFINITY);
}

#[test]
fn test_empty_inputs_give_empty_results() {
    let analyzer = Analyzer::default();

    let header_only = text_sheet(&[&["A", "B"]]);
    let report = analyzer.analyze(&header_only, &unique(&["A", "B"]));
    assert!(report.is_clean());
    assert_eq!(report.max_suspicion(), Suspicion::None);

    let empty = Sheet::new("empty", Vec::new(), SheetOptions::default());
    assert!(analyzer.analyze(&empty, &unique(&["A"])).is_clean());

    let sheet = text_sheet(&[&["A"], &["1234567"], &["1234567"]]);
    assert!(analyzer
        .analyze(&sheet, &ColumnCategorization::default())
        .is_clean());
    assert!(analyzer.analyze(&sheet, &unique(&["Nope"])).is_clean());
}

#[test]
fn test_formula_cells_are_not_analyzed() {
    let sheet = text_sheet(&[
        &["A", "B"],
        &["1234567", "=A2"],
        &["7654321", "=A2"],
    ]);
    let report = Analyzer::default().analyze(&sheet, &unique(&["A", "B"]));
    assert!(report.is_clean());
}

#[test]
fn test_csv_fixture_with_rule_categorizer() {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp file");
    writeln!(file, "Subject ID,Weight,Glucose,Site").unwrap();
    writeln!(file, "1,71.234,5.8132,3").unwrap();
    writeln!(file, "2,65.871,6.2941,3").unwrap();
    writeln!(file, "3,71.234,5.8132,4").unwrap();
    writeln!(file, "4,82.196,4.9375,4").unwrap();
    file.flush().unwrap();

    let sheet = Sheet::from_csv(file.path()).expect("load csv");
    let report = Analyzer::default().analyze_with(
        &sheet,
        &RuleCategorizer::new(),
        &CategorizationContext::default(),
    );

    assert_eq!(report.categorization.unique, ["Weight", "Glucose"]);
    assert_eq!(report.duplicate_rows.len(), 1);
    assert_eq!(report.duplicate_rows[0].rows, (1, 3));
}
