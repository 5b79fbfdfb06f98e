use log::{debug, info};
use std::collections::HashMap;

use crate::classifier::RowClassifier;
use crate::duplicates::DuplicateTracker;
pub use crate::config::*;

/// A builder for auditing rows one at a time.
///
/// ```
/// pub use roll_audit::builder::Builder;
/// pub use roll_audit::AuditRules;
/// # use roll_audit::AuditErrors;
///
/// let mut builder = Builder::new(&AuditRules::default().short_row_threshold(10))?;
///
/// builder.add_row_simple(&["1", "Nguyen Van A", "079123456789", "Ha Noi"]);
/// builder.add_row_simple(&["2", "Tran Thi B", "079123456789", "Ha Noi"]);
///
/// let report = builder.build();
/// assert_eq!(report.counts.valid, 2);
/// assert_eq!(report.counts.duplicate_groups, 1);
/// # Ok::<(), AuditErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AuditRules,
    pub(crate) _classifier: RowClassifier,
    pub(crate) _header: Option<Cells>,
    pub(crate) _rows: Vec<SheetRow>,
}

impl Builder {
    pub fn new(rules: &AuditRules) -> Result<Builder, AuditErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _classifier: RowClassifier::new(rules)?,
            _header: None,
            _rows: Vec::new(),
        })
    }

    /// Sets the header row. It is only used to locate the identity column.
    pub fn header(self, cells: &[Option<String>]) -> Builder {
        Builder {
            _header: Some(cells.to_vec()),
            ..self
        }
    }

    /// Adds a row with its spreadsheet row number.
    pub fn add_row(&mut self, row: usize, cells: &[Option<String>]) {
        self._rows.push(SheetRow::new(row, cells.to_vec()));
    }

    /// Adds a row made of non-null cells, numbered after the last row added.
    ///
    /// Numbering starts at 2, the first row being the header.
    pub fn add_row_simple(&mut self, cells: &[&str]) {
        let row = self._rows.last().map_or(2, |r| r.row + 1);
        let cells: Cells = cells.iter().map(|s| Some(s.to_string())).collect();
        self._rows.push(SheetRow::new(row, cells));
    }

    pub fn build(&self) -> AuditReport {
        let mut report = AuditReport::default();
        let mut tracker = DuplicateTracker::new();
        let mut names: HashMap<usize, String> = HashMap::new();

        for sheet_row in self._rows.iter() {
            let classified = self._classifier.classify(&sheet_row.cells);
            let row = sheet_row.row;
            match classified.outcome {
                RowOutcome::Empty => {
                    report.counts.empty += 1;
                }
                RowOutcome::Junk { keyword } => {
                    report.counts.junk += 1;
                    report.junk_rows.push(JunkRow {
                        row,
                        keyword,
                        line: classified.line,
                    });
                }
                RowOutcome::Short => {
                    report.counts.total_rows += 1;
                    report.counts.short += 1;
                    report.skipped_rows.push(SkippedRow {
                        row,
                        line: classified.line.trim().to_string(),
                    });
                }
                RowOutcome::MissingId => {
                    report.counts.total_rows += 1;
                    report.counts.missing_id += 1;
                    report.failed_rows.push(FailedRow {
                        row,
                        reason: FailureReason::MissingId,
                        line: classified.line,
                    });
                }
                RowOutcome::Valid(m) => {
                    report.counts.total_rows += 1;
                    report.counts.valid += 1;
                    if !tracker.record(&m.id, row) {
                        info!(
                            "Duplicate identity number {} on row {} (first seen on row {:?})",
                            m.id,
                            row,
                            tracker.occurrences(&m.id).first()
                        );
                    }
                    if m.missing_name {
                        report.counts.missing_name += 1;
                        report.failed_rows.push(FailedRow {
                            row,
                            reason: FailureReason::MissingName,
                            line: classified.line,
                        });
                    }
                    names.insert(row, m.name);
                }
            }
        }

        report.duplicates = tracker
            .duplicates()
            .map(|(id, rows)| DuplicateGroup {
                id: id.to_string(),
                rows: rows.to_vec(),
                names: rows
                    .iter()
                    .map(|r| names.get(r).cloned().unwrap_or_default())
                    .collect(),
            })
            .collect();
        report.counts.distinct_ids = tracker.distinct_count();
        report.counts.single_ids = tracker.single_occurrence_count();
        report.counts.duplicate_groups = tracker.duplicate_group_count();
        report.counts.duplicate_extra_rows = tracker.extra_occurrence_count();

        if let Some(header) = self._header.as_deref() {
            report.id_column = crate::locate_id_column_with(
                &self._classifier,
                &self._rules,
                header,
                &self._rows,
            );
        }
        debug!("build: counts: {:?}", report.counts);
        report
    }
}
