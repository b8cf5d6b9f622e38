use crate::config::WardId;
use crate::source::Tables;

struct RaceSketch {
    name: String,
    wards: Option<Vec<WardId>>,
    // (name, party token, votes in ward order)
    candidates: Vec<(String, String, Vec<u64>)>,
}

/// A builder for the tables of a small report.
///
/// The tables follow the default layout: a leading table without data, the
/// totals table, then a header table and a data table per race. Declared totals
/// are computed from the votes, so the result always passes the checks.
///
/// ```
/// use ward_metrics::builder::JurisdictionBuilder;
/// use ward_metrics::TabularSource;
///
/// let tables = JurisdictionBuilder::new()
///     .ward("Ward 1", 120, 80)
///     .ward("Ward 2", 90, 45)
///     .race_in("County Clerk", &[2])
///     .candidate("George L. Christenson", "Democratic", &[33])
///     .build();
///
/// assert_eq!(tables.table_count(), 4);
/// assert_eq!(tables.table(3).unwrap()[1], vec!["2", "Ward 2", "33"]);
/// ```
pub struct JurisdictionBuilder {
    wards: Vec<(String, u64, u64)>,
    races: Vec<RaceSketch>,
}

impl JurisdictionBuilder {
    pub fn new() -> JurisdictionBuilder {
        JurisdictionBuilder {
            wards: Vec::new(),
            races: Vec::new(),
        }
    }

    /// Adds the next ward. Ward ids follow the order of the calls, starting at 1.
    pub fn ward(mut self, name: &str, registered: u64, ballots_cast: u64) -> JurisdictionBuilder {
        self.wards.push((name.to_string(), registered, ballots_cast));
        self
    }

    /// Opens a race held in every ward.
    pub fn race(mut self, name: &str) -> JurisdictionBuilder {
        self.races.push(RaceSketch {
            name: name.to_string(),
            wards: None,
            candidates: Vec::new(),
        });
        self
    }

    /// Opens a race held in the given wards only.
    pub fn race_in(mut self, name: &str, wards: &[WardId]) -> JurisdictionBuilder {
        self.races.push(RaceSketch {
            name: name.to_string(),
            wards: Some(wards.to_vec()),
            candidates: Vec::new(),
        });
        self
    }

    /// Adds a candidate to the last race. `votes` follows the wards of the race;
    /// missing entries count as zero. A candidate added before any race opens an
    /// unnamed race held in every ward.
    pub fn candidate(mut self, name: &str, party: &str, votes: &[u64]) -> JurisdictionBuilder {
        if self.races.is_empty() {
            self = self.race("");
        }
        if let Some(race) = self.races.last_mut() {
            race.candidates
                .push((name.to_string(), party.to_string(), votes.to_vec()));
        }
        self
    }

    pub fn build(&self) -> Tables {
        let mut tables = Tables::new();
        tables.push_table(vec![vec!["Election results"]]);

        let mut totals: Vec<Vec<String>> = vec![vec![
            "Ward".to_string(),
            "Name".to_string(),
            "Registered Voters - Total".to_string(),
            "Ballots Cast - Total".to_string(),
        ]];
        for (idx, (name, registered, ballots)) in self.wards.iter().enumerate() {
            totals.push(vec![
                (idx + 1).to_string(),
                name.clone(),
                registered.to_string(),
                ballots.to_string(),
            ]);
        }
        totals.push(vec![
            "Total".to_string(),
            self.wards.iter().map(|w| w.1).sum::<u64>().to_string(),
            self.wards.iter().map(|w| w.2).sum::<u64>().to_string(),
        ]);
        tables.push_table(totals);

        let all_wards: Vec<WardId> = (1..=self.wards.len() as WardId).collect();
        for race in self.races.iter() {
            let wards = race.wards.clone().unwrap_or_else(|| all_wards.clone());
            let vote = |votes: &Vec<u64>, pos: usize| votes.get(pos).cloned().unwrap_or(0);

            let mut header: Vec<Vec<String>> = vec![vec![race.name.clone()]];
            for (name, party, votes) in race.candidates.iter() {
                let total: u64 = (0..wards.len()).map(|pos| vote(votes, pos)).sum();
                header.push(vec![
                    format!("{} ({})", name, party),
                    String::new(),
                    String::new(),
                    total.to_string(),
                ]);
            }
            tables.push_table(header);

            let mut data: Vec<Vec<String>> = Vec::new();
            let mut top = vec!["Ward".to_string(), "Name".to_string()];
            top.extend(race.candidates.iter().map(|c| c.0.clone()));
            data.push(top);
            for (pos, ward) in wards.iter().enumerate() {
                let ward_name = (*ward as usize)
                    .checked_sub(1)
                    .and_then(|idx| self.wards.get(idx))
                    .map(|w| w.0.clone())
                    .unwrap_or_default();
                let mut row = vec![ward.to_string(), ward_name];
                row.extend(race.candidates.iter().map(|c| vote(&c.2, pos).to_string()));
                data.push(row);
            }
            let mut subtotal = vec!["Total".to_string(), String::new()];
            subtotal.extend(
                race.candidates
                    .iter()
                    .map(|c| (0..wards.len()).map(|pos| vote(&c.2, pos)).sum::<u64>().to_string()),
            );
            data.push(subtotal);
            tables.push_table(data);
        }
        tables
    }
}

impl Default for JurisdictionBuilder {
    fn default() -> Self {
        JurisdictionBuilder::new()
    }
}
