// ********* Input data structures ***********

use std::collections::{BTreeMap, BTreeSet};
use std::num::ParseIntError;

use snafu::Snafu;

pub type WardId = u32;
pub type RaceId = u32;

/// One ward of the jurisdiction, as declared in the totals table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ward {
    pub id: WardId,
    pub name: String,
    pub registered: u64,
    pub ballots_cast: u64,
}

/// The broad category of a race, decided once from its name.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum RaceCategory {
    Presidential,
    FederalHouse,
    StateSenate,
    StateAssembly,
    /// Catch-all for any race name that matches none of the known phrases.
    Minor,
}

impl RaceCategory {
    pub const ALL: [RaceCategory; 5] = [
        RaceCategory::Presidential,
        RaceCategory::FederalHouse,
        RaceCategory::StateSenate,
        RaceCategory::StateAssembly,
        RaceCategory::Minor,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            RaceCategory::Presidential => 0,
            RaceCategory::FederalHouse => 1,
            RaceCategory::StateSenate => 2,
            RaceCategory::StateAssembly => 3,
            RaceCategory::Minor => 4,
        }
    }
}

/// Ordered list of known phrases. The first phrase contained in a race name wins.
pub const RACE_CATEGORY_PHRASES: [(&str, RaceCategory); 4] = [
    ("President Vice President", RaceCategory::Presidential),
    ("Representative in Congress", RaceCategory::FederalHouse),
    ("State Senator", RaceCategory::StateSenate),
    ("Representative to the Assembly", RaceCategory::StateAssembly),
];

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Party {
    Democrat,
    Republican,
    Other,
}

impl Party {
    /// Exact match on the party token found between parentheses.
    pub fn from_token(token: &str) -> Party {
        match token {
            "Democratic" => Party::Democrat,
            "Republican" => Party::Republican,
            _ => Party::Other,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub party: Party,
    /// The party token as written in the report, kept for diagnostics.
    pub party_label: String,
    pub declared_total: u64,
    /// Votes per ward. A missing ward means the candidate was not on that ballot.
    pub votes: BTreeMap<WardId, u64>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Race {
    /// Ordinal position of the race in the report, starting at 1.
    pub id: RaceId,
    pub name: String,
    pub category: RaceCategory,
    pub candidates: Vec<Candidate>,
    pub wards: BTreeSet<WardId>,
}

impl Race {
    pub fn has_party(&self, party: Party) -> bool {
        self.candidates.iter().any(|c| c.party == party)
    }
}

/// What the report says about one party in one (ward, race) pair.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VoteEntry {
    Recorded(u64),
    NotFielded,
}

impl VoteEntry {
    /// Both a zero count and an absent candidate contribute nothing to a ward score.
    pub fn count(&self) -> u64 {
        match self {
            VoteEntry::Recorded(n) => *n,
            VoteEntry::NotFielded => 0,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct WardRaceVote {
    pub dem: VoteEntry,
    pub rep: VoteEntry,
}

impl WardRaceVote {
    pub const NOT_FIELDED: WardRaceVote = WardRaceVote {
        dem: VoteEntry::NotFielded,
        rep: VoteEntry::NotFielded,
    };
}

// ******** Output data structures *********

/// A pair of values scaled to parts-per-million of the ward's ballots.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct PpmPair {
    pub dem: u64,
    pub rep: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Contest {
    /// Exactly one of the two major parties received votes.
    Uncontested,
    /// Both major parties received votes.
    Contested,
}

/// Number of races per category, indexed by `RaceCategory`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct CategoryCounts([u32; 5]);

impl CategoryCounts {
    pub fn get(&self, category: RaceCategory) -> u32 {
        self.0[category.index()]
    }

    pub(crate) fn bump(&mut self, category: RaceCategory) {
        self.0[category.index()] += 1;
    }

    /// Category by category sum of both counts.
    pub fn plus(&self, other: &CategoryCounts) -> CategoryCounts {
        let mut res = *self;
        for (mine, theirs) in res.0.iter_mut().zip(other.0.iter()) {
            *mine += *theirs;
        }
        res
    }

    pub(crate) fn raise_to(&mut self, other: &CategoryCounts) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            *mine = (*mine).max(*theirs);
        }
    }
}

/// The derived scores of one active ward.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WardMetrics {
    pub ward_id: WardId,
    pub ward_name: String,
    pub registered: u64,
    pub ballots_cast: u64,
    /// Undefined when the ward declares no registered voters.
    pub turnout_ppm: Option<u64>,
    pub presidential: PpmPair,
    pub federal_house: PpmPair,
    pub state_senate: PpmPair,
    pub state_assembly: PpmPair,
    /// Running maximum over all the minor races of the ward.
    pub minor: PpmPair,
    /// Mean over contested non-presidential races. Undefined without any such race.
    pub average: Option<PpmPair>,
    pub maxes: PpmPair,
    pub logit_average: Option<u32>,
    pub logit_maxes: Option<u32>,
    pub uncontested: CategoryCounts,
    pub contested: CategoryCounts,
}

/// One bar of the plot, in plot order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PlotBar {
    pub ward_id: WardId,
    pub width: u64,
    pub presidential: PpmPair,
    pub average: Option<PpmPair>,
    pub turnout_ppm: Option<u64>,
}

/// Non-fatal findings collected along the way. None of them stops a run.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Diagnostics {
    /// Names of the races that matched no known phrase.
    pub unclassified_races: Vec<String>,
    /// (candidate, party token) of every candidate outside the two major parties.
    pub other_party_candidates: Vec<(String, String)>,
    pub democrats: u32,
    pub republicans: u32,
    pub races_per_category: CategoryCounts,
    pub races_with_both_parties: u32,
    pub races_democrat_only: u32,
    pub races_republican_only: u32,
    pub races_without_major_party: u32,
    pub active_wards: u32,
    /// Highest number of uncontested races of each category found in a single active ward.
    pub max_uncontested_per_ward: CategoryCounts,
    /// Highest number of contested races of each category found in a single active ward.
    pub max_contested_per_ward: CategoryCounts,
    /// Highest number of races of each category, contested or not, found in a single
    /// active ward. More than 1 for a fixed category means a slot was overwritten.
    pub max_races_per_ward: CategoryCounts,
}

impl Diagnostics {
    pub fn other_candidates(&self) -> u32 {
        self.other_party_candidates.len() as u32
    }
}

// ********* Configuration **********

/// Constants of the jurisdiction, used as hard cross-checks and never inferred.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Jurisdiction {
    pub ward_count: u32,
    pub ballots_cast: u64,
    pub race_count: u32,
}

impl Jurisdiction {
    /// Milwaukee County, 3 November 2020 general election.
    pub const MILWAUKEE_2020: Jurisdiction = Jurisdiction {
        ward_count: 478,
        ballots_cast: 460300,
        race_count: 35,
    };
}

/// Where things live in the sequence of tables.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TableLayout {
    pub totals_table: usize,
    /// Header table of the first race. Its data table follows immediately.
    pub first_race_table: usize,
    /// Column of the declared total in a header row.
    pub header_total_column: usize,
    /// Column of the first candidate in a data row (after ward id and ward name).
    pub first_vote_column: usize,
}

impl TableLayout {
    pub const DEFAULT_LAYOUT: TableLayout = TableLayout {
        totals_table: 1,
        first_race_table: 2,
        header_total_column: 3,
        first_vote_column: 2,
    };

    pub fn header_table(&self, race_id: RaceId) -> usize {
        self.first_race_table + 2 * (race_id as usize - 1)
    }

    pub fn data_table(&self, race_id: RaceId) -> usize {
        self.header_table(race_id) + 1
    }
}

/// The score that orders the bars from left to right.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortKey {
    LogitAverage,
    LogitMaxes,
    Turnout,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PlotLayout {
    pub abscissa_pixels: u64,
    /// Reserved for every bar before the proportional share is handed out.
    pub min_bar_pixels: u64,
    /// Width of the line drawn left of every bar, plus the closing one.
    pub separator_pixels: u64,
    pub sort_key: SortKey,
}

impl PlotLayout {
    pub const DEFAULT_PLOT: PlotLayout = PlotLayout {
        abscissa_pixels: 10000,
        min_bar_pixels: 4,
        separator_pixels: 1,
        sort_key: SortKey::LogitAverage,
    };

    /// Pixels left for the bars themselves once the separators are drawn.
    pub fn budget(&self, num_bars: usize) -> WardResult<u64> {
        let n = num_bars as u64;
        let separators = self.separator_pixels.checked_mul(n.saturating_add(1));
        let reserved = separators.and_then(|sep| {
            self.min_bar_pixels
                .checked_mul(n)
                .and_then(|bars| bars.checked_add(sep))
        });
        match (separators, reserved) {
            (Some(sep), Some(r)) if r <= self.abscissa_pixels => Ok(self.abscissa_pixels - sep),
            // An overflow cannot fit either.
            _ => Err(WardError::PlotTooNarrow {
                budget: self.abscissa_pixels,
                reserved: reserved.unwrap_or(u64::MAX),
            }),
        }
    }
}

pub const ACTIVITY_THRESHOLD: u64 = 40;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub jurisdiction: Jurisdiction,
    pub layout: TableLayout,
    /// Wards with fewer ballots are left out of every derived output.
    pub activity_threshold: u64,
    pub plot: PlotLayout,
}

impl Settings {
    pub fn new(jurisdiction: Jurisdiction) -> Settings {
        Settings {
            jurisdiction,
            layout: TableLayout::DEFAULT_LAYOUT,
            activity_threshold: ACTIVITY_THRESHOLD,
            plot: PlotLayout::DEFAULT_PLOT,
        }
    }
}

// ********* Errors **********

/// The broad families of failures. All of them abort a run.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ErrorKind {
    StructuralMismatch,
    ParseError,
    ValidationError,
    DuplicateKey,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WardError {
    #[snafu(display("table {table}: {message}"))]
    StructuralMismatch { table: usize, message: String },

    #[snafu(display("table {table}, row {row}: cannot read a candidate and party from {field:?}"))]
    CandidateDescriptor {
        table: usize,
        row: usize,
        field: String,
    },

    #[snafu(display("table {table}, row {row}, column {column}: expected a count, found {text:?}"))]
    InvalidNumber {
        table: usize,
        row: usize,
        column: usize,
        text: String,
        source: ParseIntError,
    },

    #[snafu(display("{what}: declared {declared}, found {computed}"))]
    TotalMismatch {
        what: String,
        declared: u64,
        computed: u64,
    },

    #[snafu(display(
        "table {table}: candidate #{position} is {found:?} in the data table but {expected:?} in the header"
    ))]
    CandidateOrder {
        table: usize,
        position: usize,
        expected: String,
        found: String,
    },

    #[snafu(display("{owner}: ward {ward} is recorded twice"))]
    DuplicateWard { owner: String, ward: WardId },

    #[snafu(display("plot of {budget} pixels cannot hold the {reserved} reserved pixels"))]
    PlotTooNarrow { budget: u64, reserved: u64 },

    #[snafu(display("bar #{position} has weight {weight}, weights must be positive"))]
    InvalidWeight { position: usize, weight: u64 },
}

impl WardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WardError::StructuralMismatch { .. } => ErrorKind::StructuralMismatch,
            WardError::CandidateDescriptor { .. } | WardError::InvalidNumber { .. } => {
                ErrorKind::ParseError
            }
            WardError::TotalMismatch { .. }
            | WardError::CandidateOrder { .. }
            | WardError::PlotTooNarrow { .. }
            | WardError::InvalidWeight { .. } => ErrorKind::ValidationError,
            WardError::DuplicateWard { .. } => ErrorKind::DuplicateKey,
        }
    }
}

pub type WardResult<T> = Result<T, WardError>;
