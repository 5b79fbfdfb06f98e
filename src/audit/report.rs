// The result file and the console summary of an audit.

use roll_audit::*;
use serde::{Deserialize, Serialize};

/// The number of characters of each row shown when re-printing a result file.
pub const FAILED_ROW_SNIPPET_CHARS: usize = 50;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FailedRowJs {
    pub row: usize,
    pub reason: String,
    /// `missing_id` or `missing_name`.
    #[serde(default)]
    pub reason_code: String,
    pub content: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRowJs {
    pub row: usize,
    pub content: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JunkRowJs {
    pub row: usize,
    pub keyword: String,
    pub content: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateJs {
    pub cccd: String,
    pub rows: Vec<usize>,
    pub names: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct IdColumnJs {
    /// 1-based, as shown in a spreadsheet.
    pub column: usize,
    pub header: Option<String>,
    pub source: String,
}

/// The JSON record written after an audit.
///
/// The fields after `valid_count` are optional when reading, so that result
/// files holding only the basic counts can still be loaded.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AuditResultFile {
    pub total_rows: usize,
    pub failed_count: usize,
    pub failed_rows: Vec<FailedRowJs>,
    pub skipped_count: usize,
    pub skipped_rows: Vec<SkippedRowJs>,
    pub valid_count: usize,
    #[serde(default)]
    pub empty_count: usize,
    #[serde(default)]
    pub junk_count: usize,
    #[serde(default)]
    pub missing_id_count: usize,
    #[serde(default)]
    pub missing_name_count: usize,
    #[serde(default)]
    pub distinct_id_count: usize,
    #[serde(default)]
    pub single_id_count: usize,
    #[serde(default)]
    pub duplicate_group_count: usize,
    #[serde(default)]
    pub duplicate_extra_rows: usize,
    #[serde(default)]
    pub junk_rows: Vec<JunkRowJs>,
    #[serde(default)]
    pub duplicates: Vec<DuplicateJs>,
    #[serde(default)]
    pub id_column: Option<IdColumnJs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn id_source_name(source: IdColumnSource) -> &'static str {
    match source {
        IdColumnSource::Header => "header",
        IdColumnSource::Sample => "sample",
    }
}

pub fn build_result(
    report: &AuditReport,
    source_name: &str,
    content_max_chars: usize,
) -> AuditResultFile {
    let c = &report.counts;
    AuditResultFile {
        total_rows: c.total_rows,
        failed_count: c.failed(),
        failed_rows: report
            .failed_rows
            .iter()
            .map(|f| FailedRowJs {
                row: f.row,
                reason: f.reason.to_string(),
                reason_code: f.reason.code().to_string(),
                content: truncate_chars(&f.line, content_max_chars),
            })
            .collect(),
        skipped_count: c.short,
        skipped_rows: report
            .skipped_rows
            .iter()
            .map(|s| SkippedRowJs {
                row: s.row,
                content: truncate_chars(&s.line, content_max_chars),
            })
            .collect(),
        valid_count: c.valid,
        empty_count: c.empty,
        junk_count: c.junk,
        missing_id_count: c.missing_id,
        missing_name_count: c.missing_name,
        distinct_id_count: c.distinct_ids,
        single_id_count: c.single_ids,
        duplicate_group_count: c.duplicate_groups,
        duplicate_extra_rows: c.duplicate_extra_rows,
        junk_rows: report
            .junk_rows
            .iter()
            .map(|j| JunkRowJs {
                row: j.row,
                keyword: j.keyword.clone(),
                content: truncate_chars(&j.line, content_max_chars),
            })
            .collect(),
        duplicates: report
            .duplicates
            .iter()
            .map(|d| DuplicateJs {
                cccd: d.id.clone(),
                rows: d.rows.clone(),
                names: d.names.clone(),
            })
            .collect(),
        id_column: report.id_column.as_ref().map(|ic| IdColumnJs {
            column: ic.index + 1,
            header: ic.header.clone(),
            source: id_source_name(ic.source).to_string(),
        }),
        source: Some(source_name.to_string()),
    }
}

/// Adds a titled list, keeping the first `preview` items.
fn push_preview<T>(
    lines: &mut Vec<String>,
    title: &str,
    items: &[T],
    preview: usize,
    fmt: impl Fn(&T) -> String,
) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{} ({}):", title, items.len()));
    for item in items.iter().take(preview) {
        lines.push(format!("  {}", fmt(item)));
    }
    if items.len() > preview {
        lines.push(format!("  ... and {} more", items.len() - preview));
    }
}

/// The human-readable summary of an audit.
pub fn render_summary(report: &AuditReport, preview: usize) -> String {
    let c = &report.counts;
    let mut lines: Vec<String> = vec![
        format!("Total rows:             {}", c.total_rows),
        format!("Empty rows:             {}", c.empty),
        format!("Junk rows:              {}", c.junk),
        format!("Short rows (skipped):   {}", c.short),
        format!("Valid rows:             {}", c.valid),
        format!("Missing identity:       {}", c.missing_id),
        format!("Missing name:           {}", c.missing_name),
        format!("Failed rows:            {}", c.failed()),
        format!("Distinct identities:    {}", c.distinct_ids),
        format!("Identities seen once:   {}", c.single_ids),
        format!("Duplicated identities:  {}", c.duplicate_groups),
        format!("Duplicate extra rows:   {}", c.duplicate_extra_rows),
    ];
    match &report.id_column {
        Some(ic) => lines.push(format!(
            "Identity column:        {} ({}, from {})",
            ic.index + 1,
            ic.header.as_deref().unwrap_or("no header"),
            id_source_name(ic.source)
        )),
        None => lines.push("Identity column:        not found".to_string()),
    }

    push_preview(&mut lines, "Failed rows", &report.failed_rows, preview, |f| {
        format!("Row {}: {} | {}", f.row, f.reason, f.line)
    });
    push_preview(&mut lines, "Skipped rows", &report.skipped_rows, preview, |s| {
        format!("Row {}: {}", s.row, s.line)
    });
    push_preview(&mut lines, "Junk rows", &report.junk_rows, preview, |j| {
        format!("Row {}: [{}] {}", j.row, j.keyword, j.line)
    });
    push_preview(&mut lines, "Duplicates", &report.duplicates, preview, |d| {
        let rows: Vec<String> = d.rows.iter().map(|r| r.to_string()).collect();
        format!("{}: rows {}", d.id, rows.join(", "))
    });
    lines.join("\n")
}

/// Prints again the failed rows of a stored result file.
pub fn render_failed_rows(result: &AuditResultFile, snippet_chars: usize) -> String {
    let mut lines: Vec<String> = vec![
        format!("Failed rows: {}", result.failed_count),
        format!("Valid rows: {}", result.valid_count),
    ];
    for f in result.failed_rows.iter() {
        let snippet = truncate_chars(&f.content, snippet_chars);
        let ellipsis = if snippet.chars().count() < f.content.chars().count() {
            "..."
        } else {
            ""
        };
        lines.push(format!(
            "Row {}: {} | {}{}",
            f.row, f.reason, snippet, ellipsis
        ));
    }
    lines.join("\n")
}
