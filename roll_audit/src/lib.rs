/*!
Row classification and duplicate tracking for voter-roll spreadsheets.

Voter rolls exported as spreadsheets mix voter records with administrative
lines (titles, column headers, totals, signatures). This crate sorts the rows
of such a sheet into a few classes and reports the problems that would block
an upload: rows without an identity number (CCCD/CMND), rows without a name
and identity numbers that occur more than once.

```
use roll_audit::*;
# use roll_audit::AuditErrors;

let rows = vec![
    SheetRow::new(2, vec![Some("DANH SÁCH CỬ TRI".to_string())]),
    SheetRow::new(3, vec![Some("1 Nguyen Van A 079123456789 Ha Noi".to_string())]),
    SheetRow::new(4, vec![None, None]),
    SheetRow::new(5, vec![Some("2 Tran Thi B 079123456789 Ha Noi".to_string())]),
];
let report = run_audit(None, &rows, &AuditRules::default())?;
assert_eq!(report.counts.junk, 1);
assert_eq!(report.counts.empty, 1);
assert_eq!(report.counts.valid, 2);
assert_eq!(report.duplicates[0].rows, vec![3, 5]);
# Ok::<(), AuditErrors>(())
```
*/

mod config;
use log::{debug, info};

pub mod builder;
pub mod classifier;
pub mod duplicates;
pub mod manual;

pub use crate::classifier::RowClassifier;
pub use crate::config::*;
pub use crate::duplicates::DuplicateTracker;

/// The number of data rows inspected when the header does not name the identity column.
pub const ID_COLUMN_SAMPLE_ROWS: usize = 8;

/// Audits all the rows of a sheet with the given rules.
///
/// Arguments:
/// * `header` the header row, if any. It is only used to locate the identity column.
/// * `rows` the data rows, in sheet order
/// * `rules` the classification rules
pub fn run_audit(
    header: Option<&[Option<String>]>,
    rows: &[SheetRow],
    rules: &AuditRules,
) -> Result<AuditReport, AuditErrors> {
    info!("Auditing {:?} rows, rules: {:?}", rows.len(), rules);
    let mut builder = builder::Builder::new(rules)?;
    if let Some(h) = header {
        builder = builder.header(h);
    }
    for r in rows.iter() {
        builder.add_row(r.row, &r.cells);
    }
    let report = builder.build();
    info!("Audit done: {:?}", report.counts);
    Ok(report)
}

/// Finds the column holding the identity numbers.
///
/// The header is searched first for one of the identity header keywords. If
/// none is found, the first data rows are scanned for a cell that is an
/// identity number on its own.
pub fn locate_id_column(
    header: &[Option<String>],
    rows: &[SheetRow],
    rules: &AuditRules,
) -> Result<Option<IdColumn>, AuditErrors> {
    let classifier = RowClassifier::new(rules)?;
    Ok(locate_id_column_with(&classifier, rules, header, rows))
}

pub(crate) fn locate_id_column_with(
    classifier: &RowClassifier,
    rules: &AuditRules,
    header: &[Option<String>],
    rows: &[SheetRow],
) -> Option<IdColumn> {
    let keywords: Vec<String> = rules
        .id_header_keywords
        .iter()
        .map(|kw| kw.to_lowercase())
        .collect();
    for (index, cell) in header.iter().enumerate() {
        if let Some(h) = cell {
            let lowered = h.to_lowercase();
            if keywords.iter().any(|kw| lowered.contains(kw.as_str())) {
                debug!("locate_id_column: found header {:?} at {}", h, index);
                return Some(IdColumn {
                    index,
                    header: Some(h.clone()),
                    source: IdColumnSource::Header,
                });
            }
        }
    }

    let sample = &rows[..rows.len().min(ID_COLUMN_SAMPLE_ROWS)];
    let num_cols = sample
        .iter()
        .map(|r| r.cells.len())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    (0..num_cols)
        .find(|idx| {
            sample.iter().any(|r| {
                r.cells
                    .get(*idx)
                    .and_then(|c| c.as_deref())
                    .map_or(false, |s| classifier.is_identity(s))
            })
        })
        .map(|index| IdColumn {
            index,
            header: header.get(index).cloned().flatten(),
            source: IdColumnSource::Sample,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn row(idx: usize, values: &[&str]) -> SheetRow {
        SheetRow::new(
            idx,
            values
                .iter()
                .map(|s| {
                    if s.is_empty() {
                        None
                    } else {
                        Some(s.to_string())
                    }
                })
                .collect(),
        )
    }

    fn sample_sheet() -> Vec<SheetRow> {
        vec![
            row(2, &["DANH SÁCH CỬ TRI BẦU CỬ ĐẠI BIỂU QUỐC HỘI"]),
            row(3, &["STT", "Họ và tên", "Ngày sinh", "Giới tính", "Số CCCD"]),
            row(4, &["1", "Nguyễn Văn An", "01/01/1970", "Nam", "079070000001", "Kinh"]),
            row(5, &["2", "Trần Thị Bình", "02/02/1980", "Nữ", "079180000002", "Kinh"]),
            row(6, &["", "", ""]),
            row(7, &["3", "Lê Văn Cường", "03/03/1990", "Nam", "", "Kinh"]),
            row(8, &["4", "Phạm Thị Dung", "04/04/1985", "Nữ", "079070000001", "Kinh"]),
            row(9, &["5", "", "", "", "079199000005", "Kinh Thường trú"]),
            row(10, &["ghi chú"]),
            row(11, &["Tổng số: 5 người"]),
            row(12, &["6", "Hoàng Văn Em", "05/05/1975", "Nam", "079070000001", "Kinh"]),
            row(13, &["UBND PHƯỜNG", "", "Người lập biểu"]),
        ]
    }

    #[test]
    fn audit_sample_sheet() {
        init();
        let report = run_audit(None, &sample_sheet(), &AuditRules::default()).unwrap();
        let c = &report.counts;
        assert_eq!(c.empty, 1);
        assert_eq!(c.junk, 4);
        assert_eq!(c.short, 1);
        assert_eq!(c.valid, 5);
        assert_eq!(c.missing_id, 1);
        assert_eq!(c.missing_name, 1);
        assert_eq!(c.failed(), 2);
        assert_eq!(c.total_rows, 7);
        assert_eq!(c.distinct_ids, 3);
        assert_eq!(c.single_ids, 2);
        assert_eq!(c.duplicate_groups, 1);
        assert_eq!(c.duplicate_extra_rows, 2);

        assert_eq!(
            report.failed_rows,
            vec![
                FailedRow {
                    row: 7,
                    reason: FailureReason::MissingId,
                    line: "3 Lê Văn Cường 03/03/1990 Nam Kinh".to_string(),
                },
                FailedRow {
                    row: 9,
                    reason: FailureReason::MissingName,
                    line: "5 079199000005 Kinh Thường trú".to_string(),
                },
            ]
        );
        assert_eq!(
            report.skipped_rows,
            vec![SkippedRow {
                row: 10,
                line: "ghi chú".to_string()
            }]
        );
        let junk_rows: Vec<usize> = report.junk_rows.iter().map(|j| j.row).collect();
        assert_eq!(junk_rows, vec![2, 3, 11, 13]);
        assert_eq!(
            report.duplicates,
            vec![DuplicateGroup {
                id: "079070000001".to_string(),
                rows: vec![4, 8, 12],
                names: vec![
                    "1 Nguyễn Văn An 01/01/1970 Nam".to_string(),
                    "4 Phạm Thị Dung 04/04/1985 Nữ".to_string(),
                    "6 Hoàng Văn Em 05/05/1975 Nam".to_string(),
                ],
            }]
        );
        assert_eq!(report.id_column, None);
    }

    #[test]
    fn audit_is_idempotent() {
        init();
        let rows = sample_sheet();
        let rules = AuditRules::default();
        let r1 = run_audit(None, &rows, &rules).unwrap();
        let r2 = run_audit(None, &rows, &rules).unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn audit_duplicate_sequence() {
        init();
        let rules = AuditRules::without_keywords().short_row_threshold(0);
        let ids = [
            "111111111",
            "222222222",
            "111111111",
            "333333333",
            "111111111",
        ];
        let rows: Vec<SheetRow> = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| row(idx + 2, &["Voter", id]))
            .collect();
        let report = run_audit(None, &rows, &rules).unwrap();
        assert_eq!(report.counts.duplicate_groups, 1);
        assert_eq!(report.counts.distinct_ids, 3);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].id, "111111111");
        assert_eq!(report.duplicates[0].rows, vec![2, 4, 6]);
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let rules = AuditRules {
            min_id_digits: 0,
            ..AuditRules::default()
        };
        assert_eq!(
            run_audit(None, &[], &rules).unwrap_err(),
            AuditErrors::InvalidIdDigits { min: 0, max: 12 }
        );
    }

    #[test]
    fn id_column_from_header() {
        let header = row(1, &["STT", "Họ và tên", "Số CCCD/CMND", "Dân tộc"]).cells;
        let res = locate_id_column(&header, &[], &AuditRules::default()).unwrap();
        assert_eq!(
            res,
            Some(IdColumn {
                index: 2,
                header: Some("Số CCCD/CMND".to_string()),
                source: IdColumnSource::Header,
            })
        );
        let header = row(1, &["STT", "Họ và tên", "", "Số Căn Cước"]).cells;
        let res = locate_id_column(&header, &[], &AuditRules::default()).unwrap();
        assert_eq!(res.map(|c| c.index), Some(3));
    }

    #[test]
    fn id_column_from_sample() {
        let header = row(1, &["A", "B", "C"]).cells;
        let rows = vec![
            row(2, &["1", "Nguyen Van A", "", "", "12345"]),
            row(3, &["2", "Tran Thi B", "", "", " 079123456789 "]),
        ];
        let res = locate_id_column(&header, &rows, &AuditRules::default()).unwrap();
        assert_eq!(
            res,
            Some(IdColumn {
                index: 4,
                header: None,
                source: IdColumnSource::Sample,
            })
        );
        let rows = vec![row(2, &["1", "Nguyen Van A 079123456789"])];
        assert_eq!(
            locate_id_column(&header, &rows, &AuditRules::default()).unwrap(),
            None
        );
    }

    #[test]
    fn id_column_in_report() {
        let header = row(1, &["STT", "Họ tên", "CCCD"]).cells;
        let report = run_audit(
            Some(header.as_slice()),
            &sample_sheet(),
            &AuditRules::default(),
        )
        .unwrap();
        assert_eq!(report.id_column.map(|c| c.index), Some(2));
    }
}
