// Renders the outputs of a run to memory. Nothing here touches the file system.

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::tally::config_reader::sort_key_name;
use crate::tally::*;

/// The export records, one line per active ward under the header line.
pub fn export_csv(metrics: &[WardMetrics]) -> TallyResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(EXPORT_HEADER).context(CsvWriteSnafu {})?;
    for m in metrics.iter() {
        wtr.write_record(m.export_record())
            .context(CsvWriteSnafu {})?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(CsvFlushSnafu {})?;
    let text = String::from_utf8(bytes)
        .whatever_context::<_, TallyError>("export_csv: invalid UTF-8")?;
    Ok(text)
}

fn pair_js(pair: Option<PpmPair>) -> (JSValue, JSValue) {
    match pair {
        Some(p) => (json!(p.dem), json!(p.rep)),
        None => (JSValue::Null, JSValue::Null),
    }
}

/// The bars in plot order, with what is needed to paint them.
pub fn plot_json(plot: &[PlotBar], sort_key: SortKey) -> TallyResult<String> {
    let bars: Vec<JSValue> = plot
        .iter()
        .map(|b| {
            let (dem_average, rep_average) = pair_js(b.average);
            json!({
                "wardNo": b.ward_id,
                "width": b.width,
                "ppmDemPOTUS": b.presidential.dem,
                "ppmRepPOTUS": b.presidential.rep,
                "ppmDemAverage": dem_average,
                "ppmRepAverage": rep_average,
                "ppmVoterTurnout": b.turnout_ppm,
            })
        })
        .collect();
    let js = json!({"sortKey": sort_key_name(sort_key), "bars": bars});
    serde_json::to_string_pretty(&js).context(RenderingJsonSnafu {})
}

fn counts_js(counts: &CategoryCounts) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for category in RaceCategory::ALL {
        m.insert(format!("{:?}", category), json!(counts.get(category)));
    }
    JSValue::Object(m)
}

/// A summary of the run: the jurisdiction, the plot geometry and the diagnostics.
pub fn summary_json(name: &str, settings: &Settings, analysis: &Analysis) -> TallyResult<String> {
    let d = &analysis.diagnostics;
    let j = &settings.jurisdiction;
    let other_candidates: Vec<JSValue> = d
        .other_party_candidates
        .iter()
        .map(|(candidate, party)| json!({"name": candidate, "party": party}))
        .collect();
    let js = json!({
        "jurisdiction": {
            "name": name,
            "wardCount": j.ward_count,
            "ballotsCast": j.ballots_cast,
            "raceCount": j.race_count,
        },
        "activeWards": d.active_wards,
        "activityThreshold": settings.activity_threshold,
        "plot": {
            "abscissaPixels": settings.plot.abscissa_pixels,
            "minBarPixels": settings.plot.min_bar_pixels,
            "separatorPixels": settings.plot.separator_pixels,
            "sortKey": sort_key_name(settings.plot.sort_key),
            "bars": analysis.plot.len(),
        },
        "diagnostics": {
            "democrats": d.democrats,
            "republicans": d.republicans,
            "otherCandidates": other_candidates,
            "unclassifiedRaces": d.unclassified_races,
            "racesPerCategory": counts_js(&d.races_per_category),
            "racesWithBothParties": d.races_with_both_parties,
            "racesDemocratOnly": d.races_democrat_only,
            "racesRepublicanOnly": d.races_republican_only,
            "racesWithoutMajorParty": d.races_without_major_party,
            "maxUncontestedPerWard": counts_js(&d.max_uncontested_per_ward),
            "maxContestedPerWard": counts_js(&d.max_contested_per_ward),
            "maxRacesPerWard": counts_js(&d.max_races_per_ward),
        },
    });
    serde_json::to_string_pretty(&js).context(RenderingJsonSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ward_id: WardId, width: u64, average: Option<PpmPair>) -> PlotBar {
        PlotBar {
            ward_id,
            width,
            presidential: PpmPair { dem: 600000, rep: 300000 },
            average,
            turnout_ppm: None,
        }
    }

    #[test]
    fn empty_export_has_the_header() {
        let text = export_csv(&[]).unwrap();
        assert_eq!(text, format!("{}\n", EXPORT_HEADER.join(",")));
    }

    #[test]
    fn undefined_values_are_null_in_the_plot() {
        let text = plot_json(
            &[
                bar(4, 10, None),
                bar(2, 20, Some(PpmPair { dem: 1, rep: 2 })),
            ],
            SortKey::LogitAverage,
        )
        .unwrap();
        let js: JSValue = serde_json::from_str(&text).unwrap();
        assert_eq!(js["sortKey"], "logitAverage");
        assert_eq!(js["bars"][0]["wardNo"], 4);
        assert!(js["bars"][0]["ppmDemAverage"].is_null());
        assert!(js["bars"][0]["ppmVoterTurnout"].is_null());
        assert_eq!(js["bars"][1]["ppmRepAverage"], 2);
    }
}
