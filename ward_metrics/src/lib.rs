/*!
Derives per-ward scores from the tables of a precinct-level election report.

The pipeline runs in stages, each stage reading the frozen output of the
previous one:

1. the totals table is read into the [WardRegistry](registry::WardRegistry),
   and the ballots of all the wards are checked against the declared total,
2. the race tables are read into [Race]s, and the votes of every candidate are
   checked against its declared total,
3. the races are projected onto the wards,
4. every active ward is scored ([WardMetrics]),
5. the active wards are ordered and a bar width is allocated to each of them.

Any failure stops the run before anything is returned.

```
use ward_metrics::builder::JurisdictionBuilder;
use ward_metrics::*;

let tables = JurisdictionBuilder::new()
    .ward("Ward 1", 1000, 600)
    .ward("Ward 2", 500, 300)
    .race("President Vice President")
    .candidate("Joseph R. Biden", "Democratic", &[400, 100])
    .candidate("Donald J. Trump", "Republican", &[150, 180])
    .build();

let analysis = run_ward_metrics(&tables, &Settings::new(Jurisdiction {
    ward_count: 2,
    ballots_cast: 900,
    race_count: 1,
}))?;
assert_eq!(analysis.metrics[0].presidential.dem, 666666);
assert_eq!(analysis.plot.iter().map(|b| b.width).sum::<u64>(), 10000 - 3);
# Ok::<(), WardError>(())
```
*/

mod allocator;
pub mod builder;
mod catalog;
mod config;
pub mod manual;
mod metrics;
mod projector;
pub mod quick_start;
mod registry;
mod source;

use log::{debug, info};
use snafu::prelude::*;

pub use crate::allocator::{allocate_widths, build_plot, compare_for_plot, plot_order};
pub use crate::catalog::{classify_race, read_catalog, CandidateParser};
pub use crate::config::*;
pub use crate::metrics::{compute_metrics, logit, ppm};
pub use crate::projector::{project, WardRaceProjection};
pub use crate::registry::{read_wards, WardRegistry};
pub use crate::source::{clean_cell, Row, TabularSource, Tables};

/// Everything derived from one report.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub registry: WardRegistry,
    pub races: Vec<Race>,
    /// One entry per active ward, by ascending ward id.
    pub metrics: Vec<WardMetrics>,
    /// One bar per active ward, in plot order.
    pub plot: Vec<PlotBar>,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn bar_width(&self, ward: WardId) -> Option<u64> {
        self.plot.iter().find(|b| b.ward_id == ward).map(|b| b.width)
    }
}

/// Runs the whole pipeline on the given tables.
pub fn run_ward_metrics(source: &dyn TabularSource, settings: &Settings) -> WardResult<Analysis> {
    info!(
        "run_ward_metrics: {} tables, settings: {:?}",
        source.table_count(),
        settings
    );
    let layout = &settings.layout;
    let mut diagnostics = Diagnostics::default();

    let totals_idx = layout.totals_table;
    let totals = source.table(totals_idx).context(StructuralMismatchSnafu {
        table: totals_idx,
        message: "missing totals table",
    })?;
    // Column header first, jurisdiction total last.
    ensure!(
        totals.len() >= 2,
        StructuralMismatchSnafu {
            table: totals_idx,
            message: format!("the totals table has only {} rows", totals.len()),
        }
    );
    let registry = read_wards(
        &totals[1..totals.len() - 1],
        totals_idx,
        &settings.jurisdiction,
    )?;

    let races = read_catalog(
        source,
        layout,
        &settings.jurisdiction,
        &registry,
        &mut diagnostics,
    )?;
    log_races(&diagnostics);

    let projection = project(&races)?;
    let metrics = compute_metrics(
        &registry,
        &races,
        &projection,
        settings.activity_threshold,
        &mut diagnostics,
    );
    log_contests(&diagnostics);

    let plot = build_plot(&metrics, &settings.plot)?;

    Ok(Analysis {
        registry,
        races,
        metrics,
        plot,
        diagnostics,
    })
}

fn log_races(d: &Diagnostics) {
    for category in RaceCategory::ALL {
        info!(
            "Races of category {:?}: {}",
            category,
            d.races_per_category.get(category)
        );
    }
    info!(
        "Races with both parties: {}, democrat only: {}, republican only: {}, neither: {}",
        d.races_with_both_parties,
        d.races_democrat_only,
        d.races_republican_only,
        d.races_without_major_party
    );
    for name in d.unclassified_races.iter() {
        debug!("Minor race: {}", name);
    }
}

fn log_contests(d: &Diagnostics) {
    for category in RaceCategory::ALL {
        info!(
            "Most {:?} races in one ward: {} uncontested, {} contested, {} in all",
            category,
            d.max_uncontested_per_ward.get(category),
            d.max_contested_per_ward.get(category),
            d.max_races_per_ward.get(category)
        );
    }
}

/// Column names of the exported records, in order.
pub const EXPORT_HEADER: [&str; 21] = [
    "WardNo",
    "Registered",
    "TotalBallots",
    "ppmVoterTurnout",
    "ppmDemPOTUS",
    "ppmRepPOTUS",
    "ppmDemAverage",
    "ppmRepAverage",
    "logitAverage",
    "ppmDemMaxes",
    "ppmRepMaxes",
    "logitMaxes",
    "ppmDemREPUS",
    "ppmRepREPUS",
    "ppmDemSenWi",
    "ppmRepSenWi",
    "ppmDemRepWi",
    "ppmRepRepWi",
    "ppmDemMinor",
    "ppmRepMinor",
    "WardName",
];

fn opt<T: ToString>(x: Option<T>) -> String {
    x.map(|v| v.to_string()).unwrap_or_default()
}

impl WardMetrics {
    /// The exported record, aligned with [EXPORT_HEADER]. Undefined values are empty.
    pub fn export_record(&self) -> Vec<String> {
        vec![
            self.ward_id.to_string(),
            self.registered.to_string(),
            self.ballots_cast.to_string(),
            opt(self.turnout_ppm),
            self.presidential.dem.to_string(),
            self.presidential.rep.to_string(),
            opt(self.average.map(|p| p.dem)),
            opt(self.average.map(|p| p.rep)),
            opt(self.logit_average),
            self.maxes.dem.to_string(),
            self.maxes.rep.to_string(),
            opt(self.logit_maxes),
            self.federal_house.dem.to_string(),
            self.federal_house.rep.to_string(),
            self.state_senate.dem.to_string(),
            self.state_senate.rep.to_string(),
            self.state_assembly.dem.to_string(),
            self.state_assembly.rep.to_string(),
            self.minor.dem.to_string(),
            self.minor.rep.to_string(),
            self.ward_name.replace(',', ""),
        ]
    }
}
