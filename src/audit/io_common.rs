use std::path::Path;

use roll_audit::{Cells, SheetRow};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Splits the rows read from a sheet into the header and the data rows.
///
/// The rows numbered before `first_data_row` are headers, the last of them
/// being returned as the header of the sheet.
pub fn split_header(rows: Vec<SheetRow>, first_data_row: usize) -> (Option<Cells>, Vec<SheetRow>) {
    let (headers, data): (Vec<SheetRow>, Vec<SheetRow>) =
        rows.into_iter().partition(|r| r.row < first_data_row);
    (headers.into_iter().last().map(|r| r.cells), data)
}

/// Writes a float the way it is shown in a spreadsheet: integral values have no decimals.
pub fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}
