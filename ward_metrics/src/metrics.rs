use std::collections::HashMap;

use log::{debug, info, warn};

use crate::config::*;
use crate::projector::WardRaceProjection;
use crate::registry::WardRegistry;

const PPM: u64 = 1_000_000;

/// `count` as parts-per-million of `base`, truncated. Undefined for an empty base.
pub fn ppm(count: u64, base: u64) -> Option<u64> {
    if base == 0 {
        None
    } else {
        Some((count as u128 * PPM as u128 / base as u128) as u64)
    }
}

/// Log-odds of the republican share of a (dem, rep) pair, rescaled to [1, 999999].
///
/// 500000 is an even split. A pair without any vote has no share, hence no score.
pub fn logit(pair: PpmPair) -> Option<u32> {
    let total = pair.dem + pair.rep;
    if total == 0 {
        return None;
    }
    let fraction = pair.rep as f64 / total as f64;
    // fraction == 1 gives +inf and fraction == 0 gives -inf: both end up on the bounds.
    let odds = fraction / (1.0 - fraction);
    let score = (odds.ln() * 10_000.0 + 500_000.0).round();
    Some(score.clamp(1.0, 999_999.0) as u32)
}

fn max_pair(pairs: &[PpmPair]) -> PpmPair {
    PpmPair {
        dem: pairs.iter().map(|p| p.dem).max().unwrap_or(0),
        rep: pairs.iter().map(|p| p.rep).max().unwrap_or(0),
    }
}

#[derive(Default)]
struct Accumulator {
    sum: PpmPair,
    count: u64,
}

impl Accumulator {
    fn add(&mut self, pair: PpmPair) {
        self.sum.dem += pair.dem;
        self.sum.rep += pair.rep;
        self.count += 1;
    }

    fn average(&self) -> Option<PpmPair> {
        if self.count == 0 {
            None
        } else {
            Some(PpmPair {
                dem: self.sum.dem / self.count,
                rep: self.sum.rep / self.count,
            })
        }
    }
}

fn ward_metrics(
    ward: &Ward,
    projection: &WardRaceProjection,
    categories: &HashMap<RaceId, RaceCategory>,
) -> WardMetrics {
    let mut m = WardMetrics {
        ward_id: ward.id,
        ward_name: ward.name.clone(),
        registered: ward.registered,
        ballots_cast: ward.ballots_cast,
        turnout_ppm: ppm(ward.ballots_cast, ward.registered),
        presidential: PpmPair::default(),
        federal_house: PpmPair::default(),
        state_senate: PpmPair::default(),
        state_assembly: PpmPair::default(),
        minor: PpmPair::default(),
        average: None,
        maxes: PpmPair::default(),
        logit_average: None,
        logit_maxes: None,
        uncontested: CategoryCounts::default(),
        contested: CategoryCounts::default(),
    };
    let mut fixed_seen = CategoryCounts::default();
    let mut acc = Accumulator::default();

    for race_id in projection.races_of(ward.id) {
        let category = match categories.get(race_id) {
            Some(c) => *c,
            None => continue,
        };
        let vote = projection.vote(ward.id, *race_id);
        let (dem, rep) = (vote.dem.count(), vote.rep.count());
        if dem == 0 && rep == 0 {
            continue;
        }
        let contest = if dem > 0 && rep > 0 {
            Contest::Contested
        } else {
            Contest::Uncontested
        };
        match contest {
            Contest::Contested => m.contested.bump(category),
            Contest::Uncontested => m.uncontested.bump(category),
        }

        // Active wards always have ballots, the base cannot be zero here.
        let pair = PpmPair {
            dem: ppm(dem, ward.ballots_cast).unwrap_or(0),
            rep: ppm(rep, ward.ballots_cast).unwrap_or(0),
        };
        let slot = match category {
            RaceCategory::Presidential => &mut m.presidential,
            RaceCategory::FederalHouse => &mut m.federal_house,
            RaceCategory::StateSenate => &mut m.state_senate,
            RaceCategory::StateAssembly => &mut m.state_assembly,
            RaceCategory::Minor => {
                m.minor = max_pair(&[m.minor, pair]);
                continue;
            }
        };
        if fixed_seen.get(category) > 0 {
            warn!(
                "ward {}: race {} overrides an earlier {:?} race",
                ward.id, race_id, category
            );
        }
        fixed_seen.bump(category);
        *slot = pair;

        if contest == Contest::Contested && category != RaceCategory::Presidential {
            acc.add(pair);
        }
    }

    m.average = acc.average();
    m.maxes = max_pair(&[m.federal_house, m.state_senate, m.state_assembly, m.minor]);
    m.logit_average = m.average.and_then(logit);
    m.logit_maxes = logit(m.maxes);
    m
}

/// Scores every active ward, by ascending ward id.
pub fn compute_metrics(
    registry: &WardRegistry,
    races: &[Race],
    projection: &WardRaceProjection,
    activity_threshold: u64,
    diagnostics: &mut Diagnostics,
) -> Vec<WardMetrics> {
    let categories: HashMap<RaceId, RaceCategory> =
        races.iter().map(|r| (r.id, r.category)).collect();
    let mut res: Vec<WardMetrics> = Vec::new();
    for ward in registry.iter() {
        debug!(
            "compute_metrics: ward {} held {} races",
            ward.id,
            projection.races_of(ward.id).len()
        );
        if ward.ballots_cast < activity_threshold {
            continue;
        }
        let m = ward_metrics(ward, projection, &categories);
        debug!("compute_metrics: {:?}", m);
        diagnostics.max_uncontested_per_ward.raise_to(&m.uncontested);
        diagnostics.max_contested_per_ward.raise_to(&m.contested);
        diagnostics
            .max_races_per_ward
            .raise_to(&m.contested.plus(&m.uncontested));
        res.push(m);
    }
    diagnostics.active_wards = res.len() as u32;
    let without_average = res.iter().filter(|m| m.average.is_none()).count();
    info!(
        "compute_metrics: {} active wards out of {}, {} without a contested race to average",
        res.len(),
        registry.len(),
        without_average
    );
    res
}
