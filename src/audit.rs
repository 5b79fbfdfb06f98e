mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod report;

use log::{debug, info, warn};

use roll_audit::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::audit::config_reader::*;
use crate::audit::report::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AuditError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find the worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display(
        "The workbook {path} has several worksheets {names:?}, the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String, names: Vec<String> },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid audit rules"))]
    InvalidRules { source: roll_audit::AuditErrors },
    #[snafu(display("Expected a positive number for {field}"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("No input file: use --input or set inputSettings.filePath"))]
    MissingInput {},
    #[snafu(display("Unknown input type {provider:?} (expected xlsx or csv)"))]
    UnknownProvider { provider: String },
    #[snafu(display("The configuration file {path} has no parent directory"))]
    MissingParentDir { path: String },
    #[snafu(display("Difference detected between the audit result and the reference {path}"))]
    ReferenceMismatch { path: String },
}

type AuditResult<T> = Result<T, AuditError>;
type BAuditResult<T> = Result<T, Box<AuditError>>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Xlsx,
    Csv,
}

impl Provider {
    fn parse(s: &str) -> AuditResult<Provider> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Provider::Xlsx),
            "csv" => Ok(Provider::Csv),
            _ => UnknownProviderSnafu { provider: s }.fail(),
        }
    }

    /// Guesses the provider from the file extension. Excel is the default.
    fn from_path(path: &str) -> Provider {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Provider::Csv,
            _ => Provider::Xlsx,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(String),
}

/// Everything needed for one run, once the configuration file and the
/// command line have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input_path: String,
    pub provider: Provider,
    pub worksheet: Option<String>,
    /// 1-based number of the first row holding data.
    pub first_data_row: usize,
    pub rules: AuditRules,
    pub output: Option<OutputTarget>,
    pub preview_count: usize,
    pub content_max_chars: usize,
    pub reference: Option<String>,
}

fn join_path(root: &Option<PathBuf>, path: &str) -> String {
    match root {
        Some(r) => r.join(path).display().to_string(),
        None => path.to_string(),
    }
}

/// Merges the configuration file (if any) with the command line. The command line wins.
pub fn resolve_settings(args: &Args) -> BAuditResult<RunSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {
                    path: config_path.clone(),
                })?
                .to_path_buf();
            (config, Some(root))
        }
        None => (AuditConfig::default(), None),
    };
    debug!("resolve_settings: config: {:?}", config);

    let input_path = match (&args.input, &config.input_settings.file_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => join_path(&root, p),
        (None, None) => return Err(Box::new(AuditError::MissingInput {})),
    };

    let provider = match args
        .input_type
        .as_ref()
        .or(config.input_settings.provider.as_ref())
    {
        Some(p) => Provider::parse(p)?,
        None => Provider::from_path(&input_path),
    };

    let mut rules = config.rules.to_rules()?;
    if let Some(keywords) = &args.junk_keyword {
        rules.junk_keywords = keywords.clone();
    }
    if let Some(threshold) = args.short_threshold {
        rules.short_row_threshold = threshold;
    }

    let output = match (&args.out, &config.output_settings.output_path) {
        (Some(o), _) if o == "stdout" => Some(OutputTarget::Stdout),
        (Some(o), _) => Some(OutputTarget::File(o.clone())),
        (None, Some(o)) if o == "stdout" => Some(OutputTarget::Stdout),
        (None, Some(o)) => Some(OutputTarget::File(join_path(&root, o))),
        (None, None) => None,
    };

    Ok(RunSettings {
        input_path,
        provider,
        worksheet: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.input_settings.excel_worksheet_name.clone()),
        first_data_row: config.input_settings.first_data_row_index()?,
        rules,
        output,
        preview_count: match args.preview {
            Some(p) => p,
            None => config.output_settings.preview_count()?,
        },
        content_max_chars: config.output_settings.content_max_chars()?,
        reference: args.reference.clone(),
    })
}

/// Reads the sheet and separates the header from the data rows.
fn read_sheet(settings: &RunSettings) -> BAuditResult<(Option<Cells>, Vec<SheetRow>)> {
    info!(
        "Attempting to read {:?} file {:?}",
        settings.provider, settings.input_path
    );
    let rows = match settings.provider {
        Provider::Xlsx => {
            io_excel::read_excel_rows(&settings.input_path, settings.worksheet.as_deref())?
        }
        Provider::Csv => io_csv::read_csv_rows(&settings.input_path)?,
    };
    info!("Read {} rows from {:?}", rows.len(), settings.input_path);
    Ok(io_common::split_header(rows, settings.first_data_row))
}

/// Compares the result with a reference file and prints the differences.
fn check_reference(reference_path: &str, result: &AuditResultFile) -> BAuditResult<()> {
    let reference = read_reference(reference_path)?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    // Both sides go through a JSON value so that the keys are ordered the same way.
    let result_js: JSValue = serde_json::to_value(result).context(ParsingJsonSnafu {})?;
    let pretty_result = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    if pretty_reference != pretty_result {
        warn!("Found differences with the reference file {}", reference_path);
        print_diff(pretty_reference.as_str(), pretty_result.as_str(), "\n");
        return Err(Box::new(AuditError::ReferenceMismatch {
            path: reference_path.to_string(),
        }));
    }
    info!("The result matches the reference {}", reference_path);
    Ok(())
}

/// Audits a spreadsheet: prints the summary, writes the result file and
/// checks it against the reference if requested.
pub fn run_audit_file(settings: &RunSettings) -> BAuditResult<AuditResultFile> {
    let (header, rows) = read_sheet(settings)?;
    let report =
        run_audit(header.as_deref(), &rows, &settings.rules).context(InvalidRulesSnafu {})?;

    let result = build_result(
        &report,
        &io_common::simplify_file_name(&settings.input_path),
        settings.content_max_chars,
    );
    let pretty_result = serde_json::to_string_pretty(&result).context(ParsingJsonSnafu {})?;

    match &settings.output {
        Some(OutputTarget::Stdout) => {
            println!("{}", pretty_result);
        }
        Some(OutputTarget::File(path)) => {
            println!("{}", render_summary(&report, settings.preview_count));
            fs::write(path, format!("{}\n", pretty_result)).context(WritingJsonSnafu { path })?;
            println!("Audit complete. Saved to {}", path);
        }
        None => {
            println!("{}", render_summary(&report, settings.preview_count));
        }
    }

    if let Some(reference_path) = &settings.reference {
        check_reference(reference_path, &result)?;
    }
    Ok(result)
}

pub fn run(args: &Args) -> BAuditResult<()> {
    if let Some(result_path) = &args.from_result {
        let result = read_result_file(result_path)?;
        println!("{}", render_failed_rows(&result, FAILED_ROW_SNIPPET_CHARS));
        return Ok(());
    }
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);
    run_audit_file(&settings)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rollaudit-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args(cmd: &[&str]) -> Args {
        let mut all = vec!["rollaudit"];
        all.extend_from_slice(cmd);
        Args::parse_from(all)
    }

    const SHEET: &str = "\
STT,Họ và tên,Ngày sinh,Giới tính,Số CCCD,Dân tộc
DANH SÁCH CỬ TRI,,,,,
1,Nguyễn Văn An,01/01/1970,Nam,079070000001,Kinh
2,Trần Thị Bình,02/02/1980,Nữ,079180000002,Kinh
,,,,,
3,Lê Văn Cường,03/03/1990,Nam,,Kinh
4,Phạm Thị Dung,04/04/1985,Nữ,079070000001,Kinh
5,,,,079199000005,Kinh Thường trú
ghi chú,,,,,
Người lập biểu,,,,,
";

    #[test]
    fn provider_from_name_and_path() {
        assert_eq!(Provider::parse("CSV").unwrap(), Provider::Csv);
        assert_eq!(Provider::parse("excel").unwrap(), Provider::Xlsx);
        assert!(matches!(
            Provider::parse("ods"),
            Err(AuditError::UnknownProvider { .. })
        ));
        assert_eq!(Provider::from_path("a/b/kv22.CSV"), Provider::Csv);
        assert_eq!(Provider::from_path("kv22.xlsx"), Provider::Xlsx);
        assert_eq!(Provider::from_path("kv22"), Provider::Xlsx);
    }

    #[test]
    fn settings_from_command_line() {
        let settings = resolve_settings(&args(&[
            "--input",
            "kv22.csv",
            "--junk-keyword",
            "UBND",
            "--junk-keyword",
            "Tổng số",
            "--short-threshold",
            "15",
            "--preview",
            "3",
            "--out",
            "stdout",
        ]))
        .unwrap();
        assert_eq!(settings.input_path, "kv22.csv");
        assert_eq!(settings.provider, Provider::Csv);
        assert_eq!(settings.first_data_row, 2);
        assert_eq!(settings.rules.junk_keywords, vec!["UBND", "Tổng số"]);
        assert_eq!(settings.rules.short_row_threshold, 15);
        assert_eq!(settings.rules.min_id_digits, 9);
        assert_eq!(settings.preview_count, 3);
        assert_eq!(settings.content_max_chars, 200);
        assert_eq!(settings.output, Some(OutputTarget::Stdout));
    }

    #[test]
    fn settings_without_input() {
        let res = resolve_settings(&args(&[]));
        assert!(matches!(res.map_err(|e| *e), Err(AuditError::MissingInput {})));
    }

    #[test]
    fn settings_from_config_file() {
        let dir = test_dir("config");
        let config_path = dir.join("audit.json");
        fs::write(
            &config_path,
            r#"{
                "inputSettings": {"filePath": "kv22.xlsx", "firstDataRowIndex": "3"},
                "rules": {"junkKeywords": ["UBND"], "maxIdDigits": 12, "minIdDigits": 12},
                "outputSettings": {"outputPath": "out.json", "previewCount": 5}
            }"#,
        )
        .unwrap();
        let config_s = config_path.display().to_string();

        let settings = resolve_settings(&args(&["--config", &config_s])).unwrap();
        assert_eq!(
            settings.input_path,
            dir.join("kv22.xlsx").display().to_string()
        );
        assert_eq!(settings.provider, Provider::Xlsx);
        assert_eq!(settings.first_data_row, 3);
        assert_eq!(settings.rules.junk_keywords, vec!["UBND"]);
        assert_eq!(settings.rules.min_id_digits, 12);
        assert_eq!(settings.preview_count, 5);
        assert_eq!(
            settings.output,
            Some(OutputTarget::File(dir.join("out.json").display().to_string()))
        );

        // The command line takes precedence.
        let settings = resolve_settings(&args(&[
            "--config",
            &config_s,
            "--input",
            "other.csv",
            "--out",
            "elsewhere.json",
            "--preview",
            "1",
        ]))
        .unwrap();
        assert_eq!(settings.input_path, "other.csv");
        assert_eq!(settings.provider, Provider::Csv);
        assert_eq!(settings.preview_count, 1);
        assert_eq!(
            settings.output,
            Some(OutputTarget::File("elsewhere.json".to_string()))
        );
    }

    #[test]
    fn audit_csv_file() {
        let dir = test_dir("csv");
        let input = dir.join("kv22.csv");
        fs::write(&input, SHEET).unwrap();
        let out = dir.join("result.json");
        let input_s = input.display().to_string();
        let out_s = out.display().to_string();

        let settings = resolve_settings(&args(&["--input", &input_s, "--out", &out_s])).unwrap();
        let result = run_audit_file(&settings).unwrap();
        assert_eq!(result.total_rows, 6);
        assert_eq!(result.valid_count, 4);
        assert_eq!(result.failed_count, 2);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.empty_count, 1);
        assert_eq!(result.junk_count, 2);
        assert_eq!(result.duplicate_group_count, 1);
        assert_eq!(result.duplicates[0].rows, vec![3, 7]);
        assert_eq!(result.failed_rows[0].row, 6);
        assert_eq!(result.skipped_rows[0].content, "ghi chú");
        assert_eq!(result.id_column.as_ref().map(|c| c.column), Some(5));

        let written: AuditResultFile = read_result_file(&out_s).unwrap();
        assert_eq!(written, result);
        let js: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(js["failed_rows"][1]["row"], 8);
        assert_eq!(js["failed_rows"][1]["content"], "5 079199000005 Kinh Thường trú");

        // The result is its own reference.
        let settings = RunSettings {
            output: None,
            reference: Some(out_s.clone()),
            ..settings
        };
        run_audit_file(&settings).unwrap();

        // A different reference is rejected.
        let reference = dir.join("reference.json");
        fs::write(&reference, r#"{"total_rows": 1}"#).unwrap();
        let settings = RunSettings {
            reference: Some(reference.display().to_string()),
            ..settings
        };
        let res = run_audit_file(&settings).map_err(|e| *e);
        assert!(matches!(res, Err(AuditError::ReferenceMismatch { .. })));
    }

    #[test]
    fn audit_xlsx_file() {
        let input = format!("{}/testdata/kv22.xlsx", env!("CARGO_MANIFEST_DIR"));
        let settings = resolve_settings(&args(&["--input", &input, "--out", "stdout"])).unwrap();
        assert_eq!(settings.provider, Provider::Xlsx);
        let result = run_audit_file(&settings).unwrap();
        assert_eq!(result.total_rows, 3);
        assert_eq!(result.valid_count, 2);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.junk_count, 1);
        assert_eq!(result.failed_rows[0].row, 3);
        assert_eq!(result.failed_rows[0].content, "2 Lê An 1970-01-01 00:00:00");
        assert_eq!(result.duplicates[0].rows, vec![2, 4]);
        assert_eq!(result.junk_rows[0].keyword, "Người lập biểu");
        // Column A of the sheet is empty.
        assert_eq!(result.id_column.as_ref().map(|c| c.column), Some(5));
        assert_eq!(result.source.as_deref(), Some("kv22.xlsx"));
    }

    #[test]
    fn print_stored_result() {
        let dir = test_dir("from-result");
        let input = dir.join("kv22.csv");
        fs::write(&input, SHEET).unwrap();
        let out = dir.join("result.json");
        let input_s = input.display().to_string();
        let out_s = out.display().to_string();
        run(&args(&["--input", &input_s, "--out", &out_s])).unwrap();

        // No spreadsheet is read: the input does not need to exist any more.
        fs::remove_file(&input).unwrap();
        run(&args(&["--from-result", &out_s])).unwrap();

        let broken = dir.join("broken.json");
        fs::write(&broken, "{\"total_rows\": ").unwrap();
        let res = run(&args(&["--from-result", &broken.display().to_string()])).map_err(|e| *e);
        assert!(matches!(res, Err(AuditError::ParsingJson { .. })));

        let res = run(&args(&["--from-result", "/nonexistent/result.json"])).map_err(|e| *e);
        assert!(matches!(res, Err(AuditError::OpeningJson { .. })));
    }

    #[test]
    fn audit_missing_file() {
        let settings = resolve_settings(&args(&["--input", "/nonexistent/kv22.xlsx"])).unwrap();
        let res = run_audit_file(&settings).map_err(|e| *e);
        assert!(matches!(res, Err(AuditError::OpeningExcel { .. })));
    }

    #[test]
    fn audit_with_invalid_rules() {
        let dir = test_dir("rules");
        let input = dir.join("kv22.csv");
        fs::write(&input, SHEET).unwrap();
        let input_s = input.display().to_string();
        let mut settings = resolve_settings(&args(&["--input", &input_s])).unwrap();
        settings.rules.min_id_digits = 13;
        let res = run_audit_file(&settings).map_err(|e| *e);
        assert!(matches!(res, Err(AuditError::InvalidRules { .. })));
    }
}
