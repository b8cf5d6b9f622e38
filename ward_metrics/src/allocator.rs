use std::cmp::Ordering;

use log::{debug, info};
use snafu::prelude::*;

use crate::config::*;

/// Splits `budget` pixels into one integer width per weight.
///
/// Every item first gets `min_width`. The rest is handed out in the given
/// order, each item taking `floor(remaining * weight / remaining_weight)`.
/// The last item takes exactly what is left, so the widths always add up to
/// `budget` without any correction pass.
pub fn allocate_widths(weights: &[u64], budget: u64, min_width: u64) -> WardResult<Vec<u64>> {
    if weights.is_empty() {
        return Ok(Vec::new());
    }
    for (position, weight) in weights.iter().enumerate() {
        ensure!(
            *weight > 0,
            InvalidWeightSnafu {
                position,
                weight: *weight,
            }
        );
    }
    let reserved = match min_width.checked_mul(weights.len() as u64) {
        Some(r) if r <= budget => r,
        r => {
            return PlotTooNarrowSnafu {
                budget,
                reserved: r.unwrap_or(u64::MAX),
            }
            .fail()
        }
    };

    let mut remaining: u128 = (budget - reserved) as u128;
    let mut unallocated: u128 = weights.iter().map(|w| *w as u128).sum();
    let mut res: Vec<u64> = Vec::with_capacity(weights.len());
    for weight in weights.iter() {
        let w = *weight as u128;
        let extra = remaining * w / unallocated;
        remaining -= extra;
        unallocated -= w;
        res.push(min_width + extra as u64);
    }
    debug!("allocate_widths: {} items, {} pixels", res.len(), budget);
    Ok(res)
}

fn sort_score(m: &WardMetrics, key: SortKey) -> Option<u64> {
    match key {
        SortKey::LogitAverage => m.logit_average.map(|s| s as u64),
        SortKey::LogitMaxes => m.logit_maxes.map(|s| s as u64),
        SortKey::Turnout => m.turnout_ppm,
    }
}

/// Plot order: ascending score, then ward id, then weight (ballots cast).
/// Wards without a score come first.
pub fn compare_for_plot(a: &WardMetrics, b: &WardMetrics, key: SortKey) -> Ordering {
    sort_score(a, key)
        .cmp(&sort_score(b, key))
        .then(a.ward_id.cmp(&b.ward_id))
        .then(a.ballots_cast.cmp(&b.ballots_cast))
}

pub fn plot_order(metrics: &[WardMetrics], key: SortKey) -> Vec<&WardMetrics> {
    let mut ordered: Vec<&WardMetrics> = metrics.iter().collect();
    ordered.sort_by(|a, b| compare_for_plot(a, b, key));
    ordered
}

/// Orders the wards and sizes one bar per ward, proportional to its ballots.
pub fn build_plot(metrics: &[WardMetrics], layout: &PlotLayout) -> WardResult<Vec<PlotBar>> {
    let ordered = plot_order(metrics, layout.sort_key);
    let budget = layout.budget(ordered.len())?;
    let weights: Vec<u64> = ordered.iter().map(|m| m.ballots_cast).collect();
    let widths = allocate_widths(&weights, budget, layout.min_bar_pixels)?;
    info!(
        "build_plot: {} bars over {} pixels, ordered by {:?}",
        ordered.len(),
        budget,
        layout.sort_key
    );
    Ok(ordered
        .iter()
        .zip(widths.iter())
        .map(|(m, width)| PlotBar {
            ward_id: m.ward_id,
            width: *width,
            presidential: m.presidential,
            average: m.average,
            turnout_ppm: m.turnout_ppm,
        })
        .collect())
}
