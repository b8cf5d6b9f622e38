use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};
use regex::Regex;
use snafu::prelude::*;

use crate::config::*;
use crate::registry::{parse_count, WardRegistry};
use crate::source::{Row, TabularSource};

/// Finds the category of a race from its name. The boolean is false when no
/// known phrase matched and the race fell back to `Minor`.
pub fn classify_race(name: &str) -> (RaceCategory, bool) {
    RACE_CATEGORY_PHRASES
        .iter()
        .find(|(phrase, _)| name.contains(phrase))
        .map(|(_, category)| (*category, true))
        .unwrap_or((RaceCategory::Minor, false))
}

/// Splits descriptors such as `"WRITE-IN (Nonpartisan)"` into a name and a party token.
pub struct CandidateParser {
    re: Regex,
}

impl CandidateParser {
    pub fn new() -> CandidateParser {
        CandidateParser {
            re: Regex::new(r"^(?P<candidate>.*) \((?P<party>.*)\)$")
                .expect("the candidate pattern is a valid regular expression"),
        }
    }

    pub fn parse<'a>(&self, field: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.re.captures(field)?;
        let candidate = caps.name("candidate")?.as_str();
        let party = caps.name("party")?.as_str();
        Some((candidate, party))
    }
}

impl Default for CandidateParser {
    fn default() -> Self {
        CandidateParser::new()
    }
}

fn structural(table: usize, message: String) -> WardError {
    WardError::StructuralMismatch { table, message }
}

/// Reads the race name and the candidates from a header table.
fn read_header(
    race_id: RaceId,
    rows: &[Row],
    table: usize,
    layout: &TableLayout,
    parser: &CandidateParser,
    diagnostics: &mut Diagnostics,
) -> WardResult<Race> {
    let name = rows
        .first()
        .and_then(|r| r.first())
        .cloned()
        .ok_or_else(|| structural(table, "the race header table has no race name".to_string()))?;
    debug!("read_header: race {} name {:?}", race_id, name);

    let (category, matched) = classify_race(&name);
    if !matched {
        info!("read_header: race {} {:?} is a minor race", race_id, name);
        diagnostics.unclassified_races.push(name.clone());
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    for (row_no, row) in rows.iter().enumerate().skip(1) {
        let total_col = layout.header_total_column;
        ensure!(
            row.len() > total_col,
            StructuralMismatchSnafu {
                table,
                message: format!(
                    "candidate row {} has {} cells, the declared total is expected in column {}",
                    row_no,
                    row.len(),
                    total_col
                ),
            }
        );
        let field = &row[0];
        let (cand_name, party_label) = parser.parse(field).context(CandidateDescriptorSnafu {
            table,
            row: row_no,
            field: field.as_str(),
        })?;
        let declared_total = parse_count(&row[total_col], table, row_no, total_col)?;
        let party = Party::from_token(party_label);
        match party {
            Party::Democrat => diagnostics.democrats += 1,
            Party::Republican => diagnostics.republicans += 1,
            Party::Other => {
                info!(
                    "read_header: race {}: {:?} runs for another party ({:?})",
                    race_id, cand_name, party_label
                );
                diagnostics
                    .other_party_candidates
                    .push((cand_name.to_string(), party_label.to_string()));
            }
        }
        debug!(
            "read_header: candidate {:?} {:?} declared {}",
            cand_name, party, declared_total
        );
        candidates.push(Candidate {
            name: cand_name.to_string(),
            party,
            party_label: party_label.to_string(),
            declared_total,
            votes: BTreeMap::new(),
        });
    }

    Ok(Race {
        id: race_id,
        name,
        category,
        candidates,
        wards: BTreeSet::new(),
    })
}

/// Fills the vote maps of the race from its data table and checks them against
/// the declared totals.
fn read_votes(
    race: &mut Race,
    rows: &[Row],
    table: usize,
    layout: &TableLayout,
    registry: &WardRegistry,
) -> WardResult<()> {
    // Column headers, then one row per ward, then the jurisdiction subtotal.
    ensure!(
        rows.len() >= 2,
        StructuralMismatchSnafu {
            table,
            message: format!("the data table has only {} rows", rows.len()),
        }
    );
    let first_col = layout.first_vote_column;
    let header = &rows[0];
    for (position, cand) in race.candidates.iter().enumerate() {
        let found = header
            .get(first_col + position)
            .map(|s| s.as_str())
            .unwrap_or("");
        ensure!(
            found == cand.name,
            CandidateOrderSnafu {
                table,
                position: position + 1,
                expected: cand.name.as_str(),
                found,
            }
        );
    }

    let num_cols = first_col + race.candidates.len();
    let ward_rows = &rows[1..rows.len() - 1];
    for (idx, row) in ward_rows.iter().enumerate() {
        let row_no = idx + 1;
        ensure!(
            row.len() >= num_cols,
            StructuralMismatchSnafu {
                table,
                message: format!(
                    "row {} has {} cells, expected at least {}",
                    row_no,
                    row.len(),
                    num_cols
                ),
            }
        );
        let raw_id = parse_count(&row[0], table, row_no, 0)?;
        let ward_id = WardId::try_from(raw_id)
            .ok()
            .filter(|id| registry.contains(*id))
            .context(StructuralMismatchSnafu {
                table,
                message: format!("row {} refers to unknown ward {}", row_no, raw_id),
            })?;
        for (position, cand) in race.candidates.iter_mut().enumerate() {
            let column = first_col + position;
            let votes = parse_count(&row[column], table, row_no, column)?;
            ensure!(
                !cand.votes.contains_key(&ward_id),
                DuplicateWardSnafu {
                    owner: format!("race {:?}, candidate {:?}", race.name, cand.name),
                    ward: ward_id,
                }
            );
            cand.votes.insert(ward_id, votes);
        }
        ensure!(
            race.wards.insert(ward_id),
            DuplicateWardSnafu {
                owner: format!("race {:?}", race.name),
                ward: ward_id,
            }
        );
    }

    for cand in race.candidates.iter() {
        let computed: u64 = cand.votes.values().sum();
        ensure!(
            computed == cand.declared_total,
            TotalMismatchSnafu {
                what: format!("race {:?}, votes for {:?}", race.name, cand.name),
                declared: cand.declared_total,
                computed,
            }
        );
    }
    Ok(())
}

/// Reads every race of the report, in race order.
///
/// Races are laid out as a header table immediately followed by its data table.
pub fn read_catalog(
    source: &dyn TabularSource,
    layout: &TableLayout,
    jurisdiction: &Jurisdiction,
    registry: &WardRegistry,
    diagnostics: &mut Diagnostics,
) -> WardResult<Vec<Race>> {
    let parser = CandidateParser::new();
    let mut races: Vec<Race> = Vec::new();
    for race_id in 1..=jurisdiction.race_count {
        let header_idx = layout.header_table(race_id);
        let data_idx = layout.data_table(race_id);
        let header_rows = source.table(header_idx).context(StructuralMismatchSnafu {
            table: header_idx,
            message: format!("missing header table of race {}", race_id),
        })?;
        let data_rows = source.table(data_idx).context(StructuralMismatchSnafu {
            table: data_idx,
            message: format!("missing data table of race {}", race_id),
        })?;

        let mut race = read_header(race_id, header_rows, header_idx, layout, &parser, diagnostics)?;
        read_votes(&mut race, data_rows, data_idx, layout, registry)?;
        debug!(
            "read_catalog: race {} {:?} ({:?}): {} candidates, {} wards",
            race.id,
            race.name,
            race.category,
            race.candidates.len(),
            race.wards.len()
        );
        races.push(race);
    }

    let trailing = source
        .table_count()
        .saturating_sub(layout.data_table(jurisdiction.race_count) + 1);
    if trailing > 0 {
        warn!("read_catalog: ignoring {} tables after the last race", trailing);
    }

    for race in races.iter() {
        diagnostics.races_per_category.bump(race.category);
        match (race.has_party(Party::Democrat), race.has_party(Party::Republican)) {
            (true, true) => diagnostics.races_with_both_parties += 1,
            (true, false) => diagnostics.races_democrat_only += 1,
            (false, true) => diagnostics.races_republican_only += 1,
            (false, false) => diagnostics.races_without_major_party += 1,
        }
    }
    info!(
        "read_catalog: {} races, {} democrats, {} republicans, {} other candidates",
        races.len(),
        diagnostics.democrats,
        diagnostics.republicans,
        diagnostics.other_candidates()
    );
    Ok(races)
}
