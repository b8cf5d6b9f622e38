use log::{info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;
use ward_metrics::*;

use crate::args::Args;
use crate::tally::config_reader::*;
use crate::tally::io_common::{resolve_path, write_outputs};

mod config_reader;
mod export;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error reading {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error rendering JSON"))]
    RenderingJson { source: serde_json::Error },
    #[snafu(display("Error reading the CSV file {path}"))]
    CsvRead { source: csv::Error, path: String },
    #[snafu(display("Error rendering the CSV records"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error flushing the CSV records"))]
    CsvFlush { source: std::io::Error },
    #[snafu(display("The report could not be processed ({:?})", source.kind()))]
    Pipeline { source: WardError },
    #[snafu(display("The export differs from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// The provider of the tables of the report.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Xlsx,
}

fn read_tables(path: &str, provider: Provider) -> TallyResult<Tables> {
    info!("Attempting to read tables from {:?} ({:?})", path, provider);
    match provider {
        Provider::Csv => io_csv::read_csv_tables(path),
        Provider::Xlsx => io_xlsx::read_xlsx_tables(path),
    }
}

/// Where the rendered outputs go. `None` skips an output.
struct Destinations {
    csv: String,
    plot: Option<String>,
    summary: Option<String>,
}

fn destinations(args: &Args, config: &TallyConfig, root: &Path) -> Destinations {
    let output = config.output.clone().unwrap_or_default();
    let from_config = |p: Option<String>| p.map(|s| resolve_path(root, &s));
    Destinations {
        csv: args
            .out
            .clone()
            .or_else(|| from_config(output.csv_path))
            .unwrap_or_else(|| "stdout".to_string()),
        plot: args.plot.clone().or_else(|| from_config(output.plot_path)),
        summary: args.summary.clone().or_else(|| from_config(output.summary_path)),
    }
}

fn check_reference(reference_path: &str, export: &str) -> TallyResult<()> {
    let reference = fs::read_to_string(reference_path).context(OpeningFileSnafu {
        path: reference_path,
    })?;
    if reference != export {
        warn!("Found differences with the reference file {}", reference_path);
        print_diff(reference.as_str(), export, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The export matches the reference {}", reference_path);
    Ok(())
}

/// Reads the report, scores the wards and writes the outputs.
///
/// All the outputs are rendered first: nothing is written if any stage fails, and
/// a failed write leaves the destination files untouched.
pub fn run_tally(args: &Args) -> TallyResult<()> {
    let (config, root): (TallyConfig, PathBuf) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (TallyConfig::default(), PathBuf::new()),
    };
    info!("config: {:?}", config);

    let mut settings = config.settings()?;
    if let Some(key) = &args.sort_key {
        settings.plot.sort_key = parse_sort_key(key)?;
    }

    let source = config.source.clone();
    let input_path = match (&args.input, &source) {
        (Some(p), _) => p.clone(),
        (None, Some(s)) => resolve_path(&root, &s.path),
        (None, None) => whatever!("No input: pass --input or set source.path in the configuration"),
    };
    let provider = match (&args.input_type, &source) {
        (Some(t), _) => parse_provider(t)?,
        (None, Some(s)) => parse_provider(&s.provider)?,
        (None, None) => Provider::Csv,
    };

    let tables = read_tables(&input_path, provider)?;
    let analysis = run_ward_metrics(&tables, &settings).context(PipelineSnafu {})?;

    let name = config
        .jurisdiction
        .as_ref()
        .and_then(|j| j.name.clone())
        .unwrap_or_else(|| DEFAULT_JURISDICTION_NAME.to_string());
    let csv_text = export::export_csv(&analysis.metrics)?;
    let plot_text = export::plot_json(&analysis.plot, settings.plot.sort_key)?;
    let summary_text = export::summary_json(&name, &settings, &analysis)?;

    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &csv_text)?;
    }

    let dest = destinations(args, &config, &root);
    let mut outputs: Vec<(String, &str)> = vec![(dest.csv, csv_text.as_str())];
    if let Some(p) = dest.plot {
        outputs.push((p, plot_text.as_str()));
    }
    if let Some(p) = dest.summary {
        outputs.push((p, summary_text.as_str()));
    }
    write_outputs(&outputs)?;
    info!(
        "run_tally: {} active wards out of {}",
        analysis.metrics.len(),
        analysis.registry.len()
    );
    Ok(())
}
