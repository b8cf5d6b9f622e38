// Reads a report saved as an Excel workbook, one worksheet per table.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::{debug, info};
use snafu::prelude::*;

use crate::tally::*;

/// The text of a cell. Counts are often stored as floats: integral values lose the
/// fractional part so that they read like the numbers of the report.
fn cell_text(cell: &DataType) -> TallyResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok(String::new()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        _ => whatever!("cell_text: could not understand cell {:?}", cell),
    }
}

pub fn read_xlsx_tables(path: &str) -> TallyResult<Tables> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let names: Vec<String> = workbook.sheet_names().to_owned();
    let mut tables = Tables::new();
    for name in names.iter() {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?;
        let mut rows: Vec<Vec<String>> = Vec::new();
        for row in wrange.rows() {
            let cells: TallyResult<Vec<String>> = row.iter().map(cell_text).collect();
            rows.push(cells?);
        }
        debug!("read_xlsx_tables: worksheet {}: {} rows", name, rows.len());
        tables.push_table(rows);
    }
    info!("read_xlsx_tables: {} tables from {}", names.len(), path);
    Ok(tables)
}
