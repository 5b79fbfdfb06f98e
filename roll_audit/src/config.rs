// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The cells of one spreadsheet row. A `None` is a null cell.
pub type Cells = Vec<Option<String>>;

/// A row as read from the spreadsheet, with its 1-based row number.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetRow {
    pub row: usize,
    pub cells: Cells,
}

impl SheetRow {
    pub fn new(row: usize, cells: Cells) -> SheetRow {
        SheetRow { row, cells }
    }
}

// ******** Output data structures *********

/// An identity number found in a row, with the text that precedes it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IdentityMatch {
    pub id: String,
    /// The trimmed text before the identity number. It usually holds the
    /// sequence number and the full name of the voter.
    pub name: String,
    pub missing_name: bool,
}

/// All the possible outcomes for one row. Exactly one applies.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RowOutcome {
    /// Every cell is null or blank.
    Empty,
    /// Administrative boilerplate (title, header, signature line).
    /// Holds the configured keyword that matched.
    Junk { keyword: String },
    /// Too little text to hold a voter record.
    Short,
    /// A voter record with an identity number.
    Valid(IdentityMatch),
    /// Recognizable content without any identity number.
    MissingId,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ClassifiedRow {
    /// The non-null cells, trimmed and joined with single spaces.
    pub line: String,
    pub outcome: RowOutcome,
}

/// Why a row could not be uploaded as-is.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum FailureReason {
    MissingId,
    MissingName,
}

impl FailureReason {
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::MissingId => "missing_id",
            FailureReason::MissingName => "missing_name",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::MissingId => write!(f, "no valid identity number found"),
            FailureReason::MissingName => write!(f, "no name found before the identity number"),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FailedRow {
    pub row: usize,
    pub reason: FailureReason,
    pub line: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SkippedRow {
    pub row: usize,
    pub line: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct JunkRow {
    pub row: usize,
    pub keyword: String,
    pub line: String,
}

/// An identity number seen on more than one row.
/// The first row is the one that would be kept.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DuplicateGroup {
    pub id: String,
    pub rows: Vec<usize>,
    pub names: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum IdColumnSource {
    /// The header of the column names the identity number.
    Header,
    /// The header gave nothing, the column holds identity numbers in its first rows.
    Sample,
}

/// The column that holds the identity numbers (0-based).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IdColumn {
    pub index: usize,
    pub header: Option<String>,
    pub source: IdColumnSource,
}

/// Raw counts for one audit. Derived figures (expected uploads and the like)
/// are left to the caller.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AuditCounts {
    /// Rows that are neither empty nor junk. Short rows are included.
    pub total_rows: usize,
    pub empty: usize,
    pub junk: usize,
    pub short: usize,
    /// Rows with an identity number, including the ones without a name.
    pub valid: usize,
    pub missing_id: usize,
    pub missing_name: usize,
    /// Different identity numbers, counting once the ones found on several rows.
    pub distinct_ids: usize,
    /// Identity numbers found on exactly one row.
    pub single_ids: usize,
    pub duplicate_groups: usize,
    /// Rows carrying an identity number already seen on an earlier row.
    pub duplicate_extra_rows: usize,
}

impl AuditCounts {
    pub fn failed(&self) -> usize {
        self.missing_id + self.missing_name
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AuditReport {
    pub counts: AuditCounts,
    pub failed_rows: Vec<FailedRow>,
    pub skipped_rows: Vec<SkippedRow>,
    pub junk_rows: Vec<JunkRow>,
    pub duplicates: Vec<DuplicateGroup>,
    pub id_column: Option<IdColumn>,
}

/// Errors that prevent an audit from starting.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AuditErrors {
    InvalidIdDigits { min: u32, max: u32 },
    EmptyJunkKeyword,
    InvalidPattern(String),
}

impl Error for AuditErrors {}

impl Display for AuditErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditErrors::InvalidIdDigits { min, max } => {
                write!(f, "invalid identity digit range {}..={}", min, max)
            }
            AuditErrors::EmptyJunkKeyword => write!(f, "junk keywords may not be blank"),
            AuditErrors::InvalidPattern(msg) => write!(f, "invalid identity pattern: {}", msg),
        }
    }
}

// ********* Configuration **********

/// The header and footer lines found in the voter rolls.
pub const DEFAULT_JUNK_KEYWORDS: &[&str] = &[
    "DANH SÁCH CỬ TRI",
    "Họ và tên",
    "Ngày sinh",
    "Tổng số",
    "Người lập biểu",
    "UBND",
    "Danh sách này được lập",
    "Cử tri tham gia bầu cử",
];

pub const DEFAULT_ID_HEADER_KEYWORDS: &[&str] = &["cccd", "cmnd", "căn cước"];

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AuditRules {
    /// Case-insensitive substrings that mark a row as junk.
    pub junk_keywords: Vec<String>,
    pub min_id_digits: u32,
    pub max_id_digits: u32,
    /// Rows with fewer characters than this are short.
    pub short_row_threshold: usize,
    /// Names with fewer characters than this are missing.
    pub min_name_length: usize,
    /// Case-insensitive substrings that mark the identity column header.
    pub id_header_keywords: Vec<String>,
}

impl AuditRules {
    pub const DEFAULT_MIN_ID_DIGITS: u32 = 9;
    pub const DEFAULT_MAX_ID_DIGITS: u32 = 12;
    pub const DEFAULT_SHORT_ROW_THRESHOLD: usize = 20;
    pub const DEFAULT_MIN_NAME_LENGTH: usize = 2;

    /// Rules without any junk keyword.
    pub fn without_keywords() -> AuditRules {
        AuditRules {
            junk_keywords: Vec::new(),
            ..AuditRules::default()
        }
    }

    pub fn junk_keywords(self, keywords: &[&str]) -> AuditRules {
        AuditRules {
            junk_keywords: keywords.iter().map(|s| s.to_string()).collect(),
            ..self
        }
    }

    pub fn short_row_threshold(self, threshold: usize) -> AuditRules {
        AuditRules {
            short_row_threshold: threshold,
            ..self
        }
    }
}

impl Default for AuditRules {
    fn default() -> Self {
        AuditRules {
            junk_keywords: DEFAULT_JUNK_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            min_id_digits: AuditRules::DEFAULT_MIN_ID_DIGITS,
            max_id_digits: AuditRules::DEFAULT_MAX_ID_DIGITS,
            short_row_threshold: AuditRules::DEFAULT_SHORT_ROW_THRESHOLD,
            min_name_length: AuditRules::DEFAULT_MIN_NAME_LENGTH,
            id_header_keywords: DEFAULT_ID_HEADER_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
