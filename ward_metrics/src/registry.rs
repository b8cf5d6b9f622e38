use log::{debug, info};
use snafu::prelude::*;

use crate::config::*;
use crate::source::Row;

/// All the wards of the jurisdiction, dense and ordered by id (1..=N).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WardRegistry {
    wards: Vec<Ward>,
}

impl WardRegistry {
    pub fn get(&self, id: WardId) -> Option<&Ward> {
        if id == 0 {
            return None;
        }
        self.wards.get(id as usize - 1)
    }

    pub fn contains(&self, id: WardId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ward> {
        self.wards.iter()
    }

    pub fn len(&self) -> usize {
        self.wards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wards.is_empty()
    }

    pub fn total_ballots(&self) -> u64 {
        self.wards.iter().map(|w| w.ballots_cast).sum()
    }
}

pub(crate) fn parse_count(text: &str, table: usize, row: usize, column: usize) -> WardResult<u64> {
    text.parse::<u64>().context(InvalidNumberSnafu {
        table,
        row,
        column,
        text,
    })
}

/// Reads the ward rows of the totals table.
///
/// `rows` are the ward rows only: the caller drops the column header and the
/// trailing jurisdiction total. Row `i` must declare ward `i + 1`.
pub fn read_wards(rows: &[Row], table: usize, jurisdiction: &Jurisdiction) -> WardResult<WardRegistry> {
    let mut wards: Vec<Ward> = Vec::with_capacity(rows.len());
    let mut sum_ballots: u64 = 0;
    for (idx, row) in rows.iter().enumerate() {
        // Row 0 of the table is the header.
        let row_no = idx + 1;
        let expected_id = (idx + 1) as WardId;
        ensure!(
            row.len() == 4,
            StructuralMismatchSnafu {
                table,
                message: format!("ward row {} has {} cells instead of 4", row_no, row.len()),
            }
        );
        let id = parse_count(&row[0], table, row_no, 0)?;
        ensure!(
            id == expected_id as u64,
            StructuralMismatchSnafu {
                table,
                message: format!("row {} declares ward {} instead of ward {}", row_no, id, expected_id),
            }
        );
        let ward = Ward {
            id: expected_id,
            name: row[1].clone(),
            registered: parse_count(&row[2], table, row_no, 2)?,
            ballots_cast: parse_count(&row[3], table, row_no, 3)?,
        };
        debug!("read_wards: {:?}", ward);
        sum_ballots += ward.ballots_cast;
        wards.push(ward);
    }

    ensure!(
        wards.len() == jurisdiction.ward_count as usize,
        StructuralMismatchSnafu {
            table,
            message: format!(
                "found {} wards, expected wards 1 to {}",
                wards.len(),
                jurisdiction.ward_count
            ),
        }
    );
    ensure!(
        sum_ballots == jurisdiction.ballots_cast,
        TotalMismatchSnafu {
            what: "ballots cast in all wards",
            declared: jurisdiction.ballots_cast,
            computed: sum_ballots,
        }
    );
    info!(
        "read_wards: {} wards, {} ballots cast",
        wards.len(),
        sum_ballots
    );
    Ok(WardRegistry { wards })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn jurisdiction(ward_count: u32, ballots_cast: u64) -> Jurisdiction {
        Jurisdiction {
            ward_count,
            ballots_cast,
            race_count: 1,
        }
    }

    #[test]
    fn reads_sequential_wards() {
        let rows = vec![
            row(&["1", "City of Milwaukee Ward 1", "1502", "1185"]),
            row(&["2", "City of Milwaukee Ward 2", "524", "358"]),
        ];
        let registry = read_wards(&rows, 1, &jurisdiction(2, 1543)).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.total_ballots(), 1543);
        let w2 = registry.get(2).unwrap();
        assert_eq!(w2.name, "City of Milwaukee Ward 2");
        assert_eq!(w2.registered, 524);
        assert!(registry.get(0).is_none());
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn out_of_sequence_ward_is_structural() {
        let rows = vec![row(&["1", "a", "10", "5"]), row(&["3", "c", "10", "5"])];
        let err = read_wards(&rows, 1, &jurisdiction(2, 10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
    }

    #[test]
    fn missing_wards_are_structural() {
        let rows = vec![row(&["1", "a", "10", "5"])];
        let err = read_wards(&rows, 1, &jurisdiction(2, 5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
    }

    #[test]
    fn short_row_is_structural() {
        let rows = vec![row(&["1", "a", "10"])];
        let err = read_wards(&rows, 1, &jurisdiction(1, 5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
    }

    #[test]
    fn ballot_total_is_checked() {
        let rows = vec![row(&["1", "a", "10", "5"]), row(&["2", "b", "10", "6"])];
        let err = read_wards(&rows, 1, &jurisdiction(2, 12)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(err.to_string().contains("declared 12, found 11"));
    }

    #[test]
    fn garbage_count_is_a_parse_error() {
        let rows = vec![row(&["1", "a", "ten", "5"])];
        let err = read_wards(&rows, 1, &jurisdiction(1, 5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }
}
