use clap::Parser;

/// Scores the wards of a precinct-level election report and sizes the bars of the ward plot.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the jurisdiction, the input and the outputs.
    /// Without it, the Milwaukee County 2020 constants are used. See the documentation of the
    /// ward_metrics::manual module for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A previously exported CSV file. If provided, wardtally checks that the export
    /// matches the reference and fails otherwise.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the exported CSV records. Setting this option
    /// overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The tables of the report. Setting this option overrides the source
    /// path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: 'csv' for a directory of CSV files (one per table,
    /// in file name order) or 'xlsx' for a workbook with one worksheet per table.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the bars of the plot are written in JSON format
    /// to the given location.
    #[clap(long, value_parser)]
    pub plot: Option<String>,

    /// (file path, 'stdout' or empty) If specified, a summary of the run is written in JSON format
    /// to the given location.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// (logitAverage, logitMaxes or turnout) The score that orders the bars of the plot.
    #[clap(long, value_parser)]
    pub sort_key: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
