use clap::Parser;

/// Audits a voter-roll spreadsheet before upload: rows without an identity number
/// (CCCD/CMND), rows without a name, and duplicated identity numbers.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file with the input, rules and output settings.
    /// Paths in this file are relative to its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The spreadsheet to audit. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. By default, it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file with several worksheets, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the result of the audit will be written in JSON
    /// format to the given location. Setting this option overrides the path that may be specified
    /// with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (repeatable) A keyword marking administrative rows. If passed, the list replaces the
    /// default keywords and the ones of the configuration file.
    #[clap(long, value_parser)]
    pub junk_keyword: Option<Vec<String>>,

    /// (default 20) Rows with fewer characters are skipped.
    #[clap(long, value_parser)]
    pub short_threshold: Option<usize>,

    /// (default 10) The number of examples printed for each list in the summary.
    #[clap(long, value_parser)]
    pub preview: Option<usize>,

    /// (file path) A reference result in JSON format. If provided, rollaudit will
    /// check that the result of the audit matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path) Prints the failed rows of a result file written by a previous audit, without
    /// reading any spreadsheet.
    #[clap(long, value_parser)]
    pub from_result: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
