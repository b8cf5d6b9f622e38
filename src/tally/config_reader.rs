use log::debug;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs;

use ward_metrics::{Jurisdiction, PlotLayout, Settings, SortKey, TableLayout};

use crate::tally::*;

pub const DEFAULT_JURISDICTION_NAME: &str = "Milwaukee County, November 2020";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionConfig {
    pub name: Option<String>,
    #[serde(rename = "wardCount")]
    pub ward_count: u32,
    #[serde(rename = "ballotsCast")]
    pub ballots_cast: u64,
    #[serde(rename = "raceCount")]
    pub race_count: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub provider: String,
    pub path: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(rename = "totalsTable")]
    pub totals_table: Option<usize>,
    #[serde(rename = "firstRaceTable")]
    pub first_race_table: Option<usize>,
    #[serde(rename = "headerTotalColumn")]
    pub header_total_column: Option<usize>,
    #[serde(rename = "firstVoteColumn")]
    pub first_vote_column: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(rename = "abscissaPixels")]
    pub abscissa_pixels: Option<u64>,
    #[serde(rename = "minBarPixels")]
    pub min_bar_pixels: Option<u64>,
    #[serde(rename = "separatorPixels")]
    pub separator_pixels: Option<u64>,
    #[serde(rename = "sortKey")]
    pub sort_key: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "csvPath")]
    pub csv_path: Option<String>,
    #[serde(rename = "plotPath")]
    pub plot_path: Option<String>,
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    pub jurisdiction: Option<JurisdictionConfig>,
    pub source: Option<SourceConfig>,
    pub layout: Option<LayoutConfig>,
    #[serde(rename = "activityThreshold")]
    pub activity_threshold: Option<u64>,
    pub plot: Option<PlotConfig>,
    pub output: Option<OutputConfig>,
}

impl TallyConfig {
    /// The settings of the pipeline. Missing entries take the built-in defaults.
    pub fn settings(&self) -> TallyResult<Settings> {
        let jurisdiction = match &self.jurisdiction {
            Some(j) => Jurisdiction {
                ward_count: j.ward_count,
                ballots_cast: j.ballots_cast,
                race_count: j.race_count,
            },
            None => Jurisdiction::MILWAUKEE_2020,
        };
        let mut settings = Settings::new(jurisdiction);

        if let Some(l) = &self.layout {
            let d = TableLayout::DEFAULT_LAYOUT;
            settings.layout = TableLayout {
                totals_table: l.totals_table.unwrap_or(d.totals_table),
                first_race_table: l.first_race_table.unwrap_or(d.first_race_table),
                header_total_column: l.header_total_column.unwrap_or(d.header_total_column),
                first_vote_column: l.first_vote_column.unwrap_or(d.first_vote_column),
            };
        }
        if let Some(t) = self.activity_threshold {
            settings.activity_threshold = t;
        }
        if let Some(p) = &self.plot {
            let d = PlotLayout::DEFAULT_PLOT;
            settings.plot = PlotLayout {
                abscissa_pixels: p.abscissa_pixels.unwrap_or(d.abscissa_pixels),
                min_bar_pixels: p.min_bar_pixels.unwrap_or(d.min_bar_pixels),
                separator_pixels: p.separator_pixels.unwrap_or(d.separator_pixels),
                sort_key: match &p.sort_key {
                    Some(key) => parse_sort_key(key)?,
                    None => d.sort_key,
                },
            };
        }
        debug!("settings: {:?}", settings);
        Ok(settings)
    }
}

pub fn parse_sort_key(key: &str) -> TallyResult<SortKey> {
    match key {
        "logitAverage" => Ok(SortKey::LogitAverage),
        "logitMaxes" => Ok(SortKey::LogitMaxes),
        "turnout" => Ok(SortKey::Turnout),
        x => whatever!(
            "Unknown sort key {:?}: expected logitAverage, logitMaxes or turnout",
            x
        ),
    }
}

pub fn sort_key_name(key: SortKey) -> &'static str {
    match key {
        SortKey::LogitAverage => "logitAverage",
        SortKey::LogitMaxes => "logitMaxes",
        SortKey::Turnout => "turnout",
    }
}

pub fn parse_provider(provider: &str) -> TallyResult<Provider> {
    match provider {
        "csv" => Ok(Provider::Csv),
        "xlsx" => Ok(Provider::Xlsx),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

pub fn read_config(path: &str) -> TallyResult<TallyConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: TallyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_configuration() {
        let settings = TallyConfig::default().settings().unwrap();
        assert_eq!(settings.jurisdiction, Jurisdiction::MILWAUKEE_2020);
        assert_eq!(settings.plot, PlotLayout::DEFAULT_PLOT);
        assert_eq!(settings.activity_threshold, 40);
    }

    #[test]
    fn partial_sections_keep_the_defaults() {
        let config: TallyConfig = serde_json::from_str(
            r#"{
  "jurisdiction": {"wardCount": 10, "ballotsCast": 5000, "raceCount": 4},
  "layout": {"firstVoteColumn": 3},
  "activityThreshold": 0,
  "plot": {"abscissaPixels": 2000, "sortKey": "turnout"}
}"#,
        )
        .unwrap();
        let settings = config.settings().unwrap();
        assert_eq!(settings.jurisdiction.ward_count, 10);
        assert_eq!(settings.layout.first_vote_column, 3);
        assert_eq!(settings.layout.totals_table, 1);
        assert_eq!(settings.activity_threshold, 0);
        assert_eq!(settings.plot.abscissa_pixels, 2000);
        assert_eq!(settings.plot.min_bar_pixels, 4);
        assert_eq!(settings.plot.sort_key, SortKey::Turnout);
    }

    #[test]
    fn names_are_checked() {
        assert!(parse_sort_key("logitmaxes").is_err());
        assert_eq!(parse_provider("xlsx").unwrap(), Provider::Xlsx);
        assert!(parse_provider("html").is_err());
        for key in [SortKey::LogitAverage, SortKey::LogitMaxes, SortKey::Turnout] {
            assert_eq!(parse_sort_key(sort_key_name(key)).unwrap(), key);
        }
    }
}
