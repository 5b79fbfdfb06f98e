// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use log::debug;
use snafu::prelude::*;

use crate::audit::io_common::format_number;
use crate::audit::*;

pub fn read_excel_rows(path: &str, worksheet_name: Option<&str>) -> BAuditResult<Vec<SheetRow>> {
    let wrange = get_range(path, worksheet_name)?;
    debug!(
        "read_excel_rows: path: {:?} start: {:?} end: {:?}",
        path,
        wrange.start(),
        wrange.end()
    );
    Ok(range_to_rows(&wrange))
}

/// Converts a worksheet range to rows numbered as in the spreadsheet (from 1).
///
/// The cells are aligned on the sheet columns: the first cell of each row is
/// in column A.
pub fn range_to_rows(wrange: &Range<DataType>) -> Vec<SheetRow> {
    // The range starts at the first non-empty cell, not necessarily at A1.
    let (first_row, first_col) = wrange
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));
    wrange
        .rows()
        .enumerate()
        .map(|(idx, row)| {
            let cells: Cells = std::iter::repeat(None)
                .take(first_col)
                .chain(row.iter().map(cell_text))
                .collect();
            SheetRow::new(first_row + idx + 1, cells)
        })
        .collect()
}

/// The text of a cell, or None for an empty cell.
pub fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty => None,
        DataType::String(s) => Some(s.clone()),
        DataType::Float(f) => Some(format_number(*f)),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        DataType::DateTime(f) => Some(date_text(*f).unwrap_or_else(|| format_number(*f))),
        DataType::Error(e) => Some(format!("{:?}", e)),
    }
}

/// Writes a date serial of the 1900 date system as `YYYY-MM-DD HH:MM:SS`,
/// or `HH:MM:SS` for a time of day alone.
pub fn date_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial.abs() > 1e8 {
        return None;
    }
    // The 1900 system counts a 29 February 1900 that never existed.
    let serial = if serial > 0.0 && serial < 60.0 {
        serial + 1.0
    } else {
        serial
    };
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86400.0).round() as i64;
    let dt = base.checked_add_signed(Duration::seconds(seconds))?;
    if serial > 0.0 && serial < 1.0 {
        Some(dt.format("%H:%M:%S").to_string())
    } else {
        Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> BAuditResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }

    pick_worksheet(path, workbook.worksheets())
}

/// The only worksheet of a workbook.
fn pick_worksheet(
    path: &str,
    all_worksheets: Vec<(String, Range<DataType>)>,
) -> BAuditResult<Range<DataType>> {
    match all_worksheets.as_slice() {
        [] => Err(Box::new(AuditError::EmptyExcel {
            path: path.to_string(),
        })),
        [(worksheet_name, wrange)] => {
            debug!("pick_worksheet: path: {:?} worksheet: {:?}", path, worksheet_name);
            Ok(wrange.clone())
        }
        _ => Err(Box::new(AuditError::AmbiguousWorksheet {
            path: path.to_string(),
            names: all_worksheets.iter().map(|(n, _)| n.clone()).collect(),
        })),
    }
}
