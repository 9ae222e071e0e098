//! # sleuth-cli
//!
//! Command-line interface for sleuth: load a workbook, decide which columns
//! to scan, analyze every worksheet and print the findings.

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::{ColoredString, Colorize};
use sleuth_core::{
    AnalysisConfig, Analyzer, CategorizationContext, Categorizer, ColumnCategorization,
    DuplicateRow, DuplicateValue, FixedCategorizer, RepeatedSequence, RuleCategorizer,
    SheetReport, Suspicion,
};
use sleuth_sheet::{Book, Sheet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// sleuth - find improbable duplication in spreadsheet numbers
#[derive(Parser)]
#[command(name = "sleuth")]
#[command(author, version, about = "Detect suspicious duplicated numbers in spreadsheets", long_about = None)]
struct Cli {
    /// Workbook to analyze (.csv, .tsv, .xlsx, .xlsm)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Only analyze this worksheet
    #[arg(long = "sheet", value_name = "NAME")]
    sheet: Option<String>,

    /// Number of header rows above the data
    #[arg(long = "header-rows", default_value_t = 1)]
    header_rows: usize,

    /// Column whose values should differ per row (repeatable)
    #[arg(short = 'u', long = "unique", value_name = "COL")]
    unique: Vec<String>,

    /// Column whose repeats are expected (repeatable)
    #[arg(short = 's', long = "shared", value_name = "COL")]
    shared: Vec<String>,

    /// Analysis settings (YAML, or JSON by extension)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Hide findings below this level
    #[arg(short = 'm', long = "min-level", default_value = "low")]
    min_level: Level,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for reports.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON array of sheet reports
    Json,
    /// Colored text sections (default)
    #[default]
    Table,
}

/// Suspicion level accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Level {
    None,
    Low,
    Medium,
    High,
}

impl From<Level> for Suspicion {
    fn from(level: Level) -> Self {
        match level {
            Level::None => Suspicion::None,
            Level::Low => Suspicion::Low,
            Level::Medium => Suspicion::Medium,
            Level::High => Suspicion::High,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let config = load_config(cli.config.as_deref())?;
    let analyzer = Arc::new(Analyzer::new(config).context("Invalid analysis configuration")?);

    let book = Book::from_path(&cli.file, cli.header_rows)
        .with_context(|| format!("Failed to load workbook: {}", cli.file.display()))?;
    let sheets = select_sheets(book, cli.sheet.as_deref())?;

    let categorizer = categorizer(&cli);
    let context = CategorizationContext {
        dataset: Some(cli.file.display().to_string()),
        description: None,
    };

    let mut reports = analyze_sheets(analyzer, categorizer, context, sheets).await?;
    let min_level = Suspicion::from(cli.min_level);
    for report in &mut reports {
        report.retain_at_least(min_level);
    }

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Table => {
            for report in &reports {
                print!("{}", render_report(report));
            }
        }
    }
    Ok(())
}

/// Read analysis settings, or fall back to the defaults.
fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        AnalysisConfig::from_json_str(&source)
    } else {
        AnalysisConfig::from_yaml_str(&source)
    };
    config.with_context(|| format!("Invalid config: {}", path.display()))
}

fn select_sheets(book: Book, name: Option<&str>) -> Result<Vec<Sheet>> {
    let Some(name) = name else {
        return Ok(book.into_sheets());
    };
    if let Err(e) = book.get_sheet(name) {
        bail!("{e} (available: {})", book.sheet_names().join(", "));
    }
    Ok(book
        .into_sheets()
        .into_iter()
        .filter(|sheet| sheet.name() == name)
        .collect())
}

/// Manual categorization when any column was named, rules otherwise.
fn categorizer(cli: &Cli) -> Arc<dyn Categorizer> {
    if cli.unique.is_empty() {
        Arc::new(RuleCategorizer::new())
    } else {
        Arc::new(FixedCategorizer::new(ColumnCategorization::new(
            cli.unique.iter().cloned(),
            cli.shared.iter().cloned(),
        )))
    }
}

/// Analyze every sheet on the blocking pool; reports keep workbook order.
async fn analyze_sheets(
    analyzer: Arc<Analyzer>,
    categorizer: Arc<dyn Categorizer>,
    context: CategorizationContext,
    sheets: Vec<Sheet>,
) -> Result<Vec<SheetReport>> {
    let handles: Vec<_> = sheets
        .into_iter()
        .map(|sheet| {
            let analyzer = Arc::clone(&analyzer);
            let categorizer = Arc::clone(&categorizer);
            let context = context.clone();
            tokio::task::spawn_blocking(move || {
                analyzer.analyze_with(&sheet, categorizer.as_ref(), &context)
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("Sheet analysis task failed")?);
    }
    Ok(reports)
}

fn label(suspicion: Suspicion) -> ColoredString {
    let text = format!("{:<6}", suspicion.to_string().to_uppercase());
    match suspicion {
        Suspicion::High => text.red().bold(),
        Suspicion::Medium => text.yellow().bold(),
        Suspicion::Low => text.cyan(),
        Suspicion::None => text.dimmed(),
    }
}

fn render_report(report: &SheetReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({} analyzable cells, size factor {:.2})",
        "==".bold(),
        report.sheet.bold(),
        report.analyzable_cells,
        report.size_factor
    );

    let unique = &report.categorization.unique;
    if unique.is_empty() {
        let _ = writeln!(out, "  {}", "no unique columns, nothing scanned".dimmed());
        return out;
    }
    let _ = writeln!(out, "  unique columns: {}", unique.join(", "));
    if report.is_clean() {
        let _ = writeln!(out, "  {}", "no findings".green());
        return out;
    }

    if !report.duplicate_rows.is_empty() {
        let _ = writeln!(out, "\n  {}", "Duplicate rows".bold());
        for pair in &report.duplicate_rows {
            let _ = writeln!(out, "    {}", render_row(pair));
        }
    }
    if !report.duplicate_values.is_empty() {
        let _ = writeln!(out, "\n  {}", "Duplicate values".bold());
        for value in &report.duplicate_values {
            let _ = writeln!(out, "    {}", render_value(value));
        }
    }
    if !report.repeated_sequences.is_empty() {
        let _ = writeln!(out, "\n  {}", "Repeated sequences".bold());
        for run in &report.repeated_sequences {
            let _ = writeln!(out, "    {}", render_sequence(run));
        }
    }
    out.push('\n');
    out
}

fn render_row(pair: &DuplicateRow) -> String {
    let shared: Vec<String> = pair
        .shared
        .iter()
        .map(|s| format!("{}={} ({}/{})", s.column, s.value, s.address_first, s.address_second))
        .collect();
    format!(
        "{} rows {} & {}  {}/{} columns  score {:.2}  {}",
        label(pair.suspicion),
        pair.rows.0 + 1,
        pair.rows.1 + 1,
        pair.shared_count(),
        pair.columns_compared,
        pair.score,
        shared.join(", ")
    )
}

fn render_value(value: &DuplicateValue) -> String {
    let cells: Vec<&str> = value.cells.iter().map(|c| c.address.as_str()).collect();
    format!(
        "{} {}  x{}  score {:.2}  {}",
        label(value.suspicion),
        value.value,
        value.occurrences(),
        value.score,
        cells.join(", ")
    )
}

fn render_sequence(run: &RepeatedSequence) -> String {
    let starts: Vec<&str> = run.starts.iter().map(|s| s.address.as_str()).collect();
    let values: Vec<String> = run.values.iter().map(ToString::to_string).collect();
    format!(
        "{} {}  {} values x{}  score {:.2}  at {}  [{}]",
        label(run.suspicion),
        run.column,
        run.run_length(),
        run.copies(),
        run.score,
        starts.join(", "),
        values.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn report() -> SheetReport {
        let sheet = Sheet::from_text_rows(vec![
            vec!["ID", "Score"],
            vec!["1234567", "8500001"],
            vec!["7654321", "90"],
            vec!["1234567", "8500001"],
        ]);
        Analyzer::default().analyze(&sheet, &ColumnCategorization::new(["ID", "Score"], []))
    }

    // ========================================================================
    // CLI argument parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["sleuth", "data.xlsx"]);
        assert_eq!(cli.file, PathBuf::from("data.xlsx"));
        assert_eq!(cli.header_rows, 1);
        assert!(cli.unique.is_empty());
        assert!(matches!(cli.format, OutputFormat::Table));
        assert_eq!(cli.min_level, Level::Low);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_columns() {
        let cli = Cli::parse_from([
            "sleuth", "data.csv", "-u", "Weight", "--unique", "Height", "-s", "Site",
        ]);
        assert_eq!(cli.unique, ["Weight", "Height"]);
        assert_eq!(cli.shared, ["Site"]);
    }

    #[test]
    fn test_cli_parse_format_and_level() {
        let cli = Cli::parse_from(["sleuth", "d.csv", "-f", "json", "--min-level", "high", "-v"]);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(Suspicion::from(cli.min_level), Suspicion::High);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_requires_file() {
        assert!(Cli::try_parse_from(["sleuth"]).is_err());
    }

    // ========================================================================
    // Configuration and categorizer selection
    // ========================================================================

    #[test]
    fn test_load_config_by_extension() {
        assert_eq!(load_config(None).unwrap(), AnalysisConfig::default());

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "rows:\n  index_floor: 1000").unwrap();
        assert_eq!(load_config(Some(yaml.path())).unwrap().rows.index_floor, 1000);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(json, r#"{{"values": {{"entropy_exponent": 2.0}}}}"#).unwrap();
        let config = load_config(Some(json.path())).unwrap();
        assert!((config.values.entropy_exponent - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_config_reports_path() {
        let mut bad = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(bad, "sequences:\n  min_length: 1").unwrap();
        let err = load_config(Some(bad.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));

        assert!(load_config(Some(Path::new("/nonexistent/sleuth.yaml"))).is_err());
    }

    #[test]
    fn test_categorizer_choice() {
        let sheet = Sheet::from_text_rows(vec![vec!["Weight", "Site"], vec!["71.2", "3"]]);
        let context = CategorizationContext::default();

        let cli = Cli::parse_from(["sleuth", "d.csv", "-u", "Weight"]);
        let fixed = categorizer(&cli).categorize(&sheet, &context);
        assert_eq!(fixed.unique, ["Weight"]);
        assert!(fixed.shared.is_empty());

        let cli = Cli::parse_from(["sleuth", "d.csv"]);
        let rules = categorizer(&cli).categorize(&sheet, &context);
        assert_eq!(rules.unique, ["Weight"]);
        assert_eq!(rules.shared, ["Site"]);
    }

    #[test]
    fn test_select_sheets() {
        let mut book = Book::new();
        book.add_sheet(Sheet::new("a", Vec::new(), sleuth_sheet::SheetOptions::default()));
        book.add_sheet(Sheet::new("b", Vec::new(), sleuth_sheet::SheetOptions::default()));

        assert_eq!(select_sheets(book.clone(), None).unwrap().len(), 2);
        let only_b = select_sheets(book.clone(), Some("b")).unwrap();
        assert_eq!(only_b[0].name(), "b");
        let err = select_sheets(book, Some("c")).unwrap_err();
        assert!(err.to_string().contains("available: a, b"));
    }

    // ========================================================================
    // Pipeline and rendering
    // ========================================================================

    #[tokio::test]
    async fn test_analyze_sheets_keeps_order() {
        let sheets: Vec<Sheet> = ["first", "second", "third"]
            .iter()
            .map(|name| Sheet::new(name, Vec::new(), sleuth_sheet::SheetOptions::default()))
            .collect();
        let reports = analyze_sheets(
            Arc::new(Analyzer::default()),
            Arc::new(RuleCategorizer::new()),
            CategorizationContext::default(),
            sheets,
        )
        .await
        .unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.sheet.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_render_report_sections() {
        colored::control::set_override(false);
        let text = render_report(&report());
        assert!(text.contains("Sheet1"));
        assert!(text.contains("Duplicate rows"));
        assert!(text.contains("MEDIUM"));
        assert!(text.contains("rows 2 & 4"));
        assert!(text.contains("ID=1234567 (A2/A4)"));
        assert!(!text.contains("Duplicate values"));
    }

    #[test]
    fn test_render_clean_report() {
        colored::control::set_override(false);
        let mut report = report();
        report.retain_at_least(Suspicion::High);
        assert!(render_report(&report).contains("no findings"));

        report.categorization = ColumnCategorization::default();
        assert!(render_report(&report).contains("no unique columns"));
    }

    #[test]
    fn test_json_output_shape() {
        let json = serde_json::to_value(vec![report()]).unwrap();
        assert_eq!(json[0]["duplicate_rows"][0]["rows"][0], 1);
        assert_eq!(json[0]["duplicate_rows"][0]["suspicion"], "medium");
    }
}
