// Primitives for reading CSV files.

use log::debug;
use snafu::prelude::*;

use crate::audit::*;

/// Reads all the rows of a CSV file. Rows are numbered from 1 and may have
/// different lengths. Empty fields are read as empty cells.
pub fn read_csv_rows(path: &str) -> BAuditResult<Vec<SheetRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut res: Vec<SheetRow> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The index starts at 1 to respect most conventions in the excel world
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Cells = line
            .iter()
            .map(|s| {
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            })
            .collect();
        debug!("read_csv_rows: lineno: {:?} row: {:?}", lineno, &cells);
        res.push(SheetRow::new(lineno, cells));
    }
    Ok(res)
}
