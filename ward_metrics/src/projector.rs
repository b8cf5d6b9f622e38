use std::collections::{BTreeMap, HashMap};

use log::debug;
use snafu::prelude::*;

use crate::config::*;

/// The race results seen from the wards.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct WardRaceProjection {
    // Race ids are kept in ascending order for every ward.
    races_by_ward: BTreeMap<WardId, Vec<RaceId>>,
    votes: HashMap<(WardId, RaceId), WardRaceVote>,
}

impl WardRaceProjection {
    /// The races a ward took part in, by ascending race id.
    pub fn races_of(&self, ward: WardId) -> &[RaceId] {
        self.races_by_ward
            .get(&ward)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The major party votes of a ward in a race. Parties without a candidate
    /// in that race are `NotFielded`.
    pub fn vote(&self, ward: WardId, race: RaceId) -> WardRaceVote {
        self.votes
            .get(&(ward, race))
            .cloned()
            .unwrap_or(WardRaceVote::NOT_FIELDED)
    }
}

fn record(
    slot: &mut VoteEntry,
    votes: u64,
    race: &Race,
    cand: &Candidate,
    ward: WardId,
) -> WardResult<()> {
    ensure!(
        *slot == VoteEntry::NotFielded,
        DuplicateWardSnafu {
            owner: format!("race {:?}, {:?} of {:?}", race.name, cand.name, cand.party),
            ward,
        }
    );
    *slot = VoteEntry::Recorded(votes);
    Ok(())
}

/// Inverts the race-centric vote maps into (ward, race) lookups.
pub fn project(races: &[Race]) -> WardResult<WardRaceProjection> {
    let mut proj = WardRaceProjection::default();
    let mut sorted: Vec<&Race> = races.iter().collect();
    sorted.sort_by_key(|r| r.id);
    for race in sorted {
        for ward in race.wards.iter() {
            proj.races_by_ward.entry(*ward).or_default().push(race.id);
        }
        for cand in race.candidates.iter() {
            if cand.party == Party::Other {
                continue;
            }
            for (ward, votes) in cand.votes.iter() {
                let entry = proj
                    .votes
                    .entry((*ward, race.id))
                    .or_insert(WardRaceVote::NOT_FIELDED);
                match cand.party {
                    Party::Democrat => record(&mut entry.dem, *votes, race, cand, *ward)?,
                    Party::Republican => record(&mut entry.rep, *votes, race, cand, *ward)?,
                    Party::Other => {}
                }
            }
        }
    }
    debug!(
        "project: {} wards, {} (ward, race) pairs with a major party",
        proj.races_by_ward.len(),
        proj.votes.len()
    );
    Ok(proj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn candidate(name: &str, party: Party, votes: &[(WardId, u64)]) -> Candidate {
        let votes: BTreeMap<WardId, u64> = votes.iter().cloned().collect();
        Candidate {
            name: name.to_string(),
            party,
            party_label: String::new(),
            declared_total: votes.values().sum(),
            votes,
        }
    }

    fn race(id: RaceId, candidates: Vec<Candidate>) -> Race {
        let wards: BTreeSet<WardId> = candidates
            .iter()
            .flat_map(|c| c.votes.keys().cloned())
            .collect();
        Race {
            id,
            name: format!("Race {}", id),
            category: RaceCategory::Minor,
            candidates,
            wards,
        }
    }

    #[test]
    fn missing_party_is_not_fielded() {
        let races = vec![
            race(
                2,
                vec![candidate("Sheriff", Party::Democrat, &[(1, 0), (2, 30)])],
            ),
            race(
                1,
                vec![
                    candidate("D", Party::Democrat, &[(1, 10), (2, 20)]),
                    candidate("R", Party::Republican, &[(1, 5), (2, 0)]),
                    candidate("W", Party::Other, &[(1, 1), (2, 1)]),
                ],
            ),
        ];
        let proj = project(&races).unwrap();
        assert_eq!(proj.races_of(1), &[1, 2]);
        assert_eq!(
            proj.vote(2, 1),
            WardRaceVote {
                dem: VoteEntry::Recorded(20),
                rep: VoteEntry::Recorded(0)
            }
        );
        // Fielded with zero votes and not fielded at all stay distinct.
        let v = proj.vote(1, 2);
        assert_eq!(v.dem, VoteEntry::Recorded(0));
        assert_eq!(v.rep, VoteEntry::NotFielded);
        assert_eq!(v.dem.count(), v.rep.count());
        assert_eq!(proj.vote(3, 1), WardRaceVote::NOT_FIELDED);
        assert!(proj.races_of(3).is_empty());
    }

    #[test]
    fn two_democrats_in_one_race_collide() {
        let races = vec![race(
            1,
            vec![
                candidate("D1", Party::Democrat, &[(1, 10)]),
                candidate("D2", Party::Democrat, &[(1, 3)]),
            ],
        )];
        let err = project(&races).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    }
}
