// Reads a report saved as a directory of CSV files, one file per table.

use log::{debug, info};
use snafu::prelude::*;

use std::fs;
use std::path::PathBuf;

use crate::tally::io_common::simplify_file_name;
use crate::tally::*;

/// The CSV files of the directory, in file name order.
fn table_files(dir: &str) -> TallyResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).context(OpeningFileSnafu { path: dir })?;
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.context(OpeningFileSnafu { path: dir })?.path();
        let is_csv = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_csv_table(path: &str) -> TallyResult<Vec<Vec<String>>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvReadSnafu { path })?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.into_records() {
        let record = record.context(CsvReadSnafu { path })?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    debug!(
        "read_csv_table: {}: {} rows",
        simplify_file_name(path),
        rows.len()
    );
    Ok(rows)
}

pub fn read_csv_tables(dir: &str) -> TallyResult<Tables> {
    let files = table_files(dir)?;
    ensure_whatever!(!files.is_empty(), "No CSV file found in {}", dir);
    let mut tables = Tables::new();
    for file in files.iter() {
        let path = file.display().to_string();
        tables.push_table(read_csv_table(&path)?);
    }
    info!("read_csv_tables: {} tables from {}", files.len(), dir);
    Ok(tables)
}
