use ward_metrics::builder::JurisdictionBuilder;
use ward_metrics::*;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn settings(ward_count: u32, ballots_cast: u64, race_count: u32) -> Settings {
    Settings::new(Jurisdiction {
        ward_count,
        ballots_cast,
        race_count,
    })
}

fn three_wards() -> Tables {
    JurisdictionBuilder::new()
        .ward("Ward 1", 1000, 600)
        .ward("Ward 2", 500, 300)
        .ward("Ward 3", 100, 30)
        .race("President Vice President")
        .candidate("Joseph R. Biden / Kamala D. Harris", "Democratic", &[400, 100, 20])
        .candidate("Donald J. Trump / Michael R. Pence", "Republican", &[150, 180, 8])
        .race("County Clerk")
        .candidate("George L. Christenson", "Democratic", &[350, 120, 15])
        .candidate("WRITE-IN", "Nonpartisan", &[2, 1, 0])
        .build()
}

#[test]
fn presidential_and_uncontested_minor() {
    init_logs();
    let analysis = run_ward_metrics(&three_wards(), &settings(3, 930, 2)).unwrap();

    // Ward 3 is below the activity threshold.
    let ids: Vec<WardId> = analysis.metrics.iter().map(|m| m.ward_id).collect();
    assert_eq!(ids, vec![1, 2]);

    let w1 = &analysis.metrics[0];
    assert_eq!(w1.turnout_ppm, Some(600000));
    assert_eq!(w1.presidential, PpmPair { dem: 666666, rep: 250000 });
    assert_eq!(w1.minor, PpmPair { dem: 583333, rep: 0 });
    assert_eq!(w1.federal_house, PpmPair::default());
    assert_eq!(w1.average, None);
    assert_eq!(w1.logit_average, None);
    assert_eq!(w1.maxes, PpmPair { dem: 583333, rep: 0 });
    assert_eq!(w1.logit_maxes, Some(1));
    assert_eq!(w1.uncontested.get(RaceCategory::Minor), 1);
    assert_eq!(w1.contested.get(RaceCategory::Presidential), 1);

    let w2 = &analysis.metrics[1];
    assert_eq!(w2.presidential, PpmPair { dem: 333333, rep: 600000 });
    assert_eq!(w2.minor, PpmPair { dem: 400000, rep: 0 });
    assert_eq!(w2.maxes, PpmPair { dem: 400000, rep: 0 });

    // Both wards lack an Average: ward id decides, then 9997 pixels split 2:1.
    let bars: Vec<(WardId, u64)> = analysis.plot.iter().map(|b| (b.ward_id, b.width)).collect();
    assert_eq!(bars, vec![(1, 6663), (2, 3334)]);
    assert_eq!(analysis.bar_width(3), None);

    let d = &analysis.diagnostics;
    assert_eq!(d.unclassified_races, vec!["County Clerk".to_string()]);
    assert_eq!((d.democrats, d.republicans, d.other_candidates()), (2, 1, 1));
    assert_eq!(d.races_with_both_parties, 1);
    assert_eq!(d.races_democrat_only, 1);
    assert_eq!(d.active_wards, 2);
    assert_eq!(d.max_uncontested_per_ward.get(RaceCategory::Minor), 1);
    assert_eq!(d.races_per_category.get(RaceCategory::Presidential), 1);
}

#[test]
fn export_record_follows_header() {
    let analysis = run_ward_metrics(&three_wards(), &settings(3, 930, 2)).unwrap();
    let record = analysis.metrics[0].export_record();
    assert_eq!(record.len(), EXPORT_HEADER.len());
    assert_eq!(
        record,
        vec![
            "1", "1000", "600", "600000", "666666", "250000", "", "", "", "583333", "0", "1", "0",
            "0", "0", "0", "0", "0", "583333", "0", "Ward 1"
        ]
    );
}

#[test]
fn averages_of_contested_races() {
    let tables = JurisdictionBuilder::new()
        .ward("Village, North", 1250, 1000)
        .race("President Vice President")
        .candidate("Biden", "Democratic", &[550])
        .candidate("Trump", "Republican", &[420])
        .race("Representative in Congress District 4")
        .candidate("Moore", "Democratic", &[600])
        .candidate("Rogers", "Republican", &[300])
        .race("State Senator District 3")
        .candidate("Carpenter", "Democratic", &[500])
        .candidate("Smith", "Republican", &[400])
        .race("Representative to the Assembly District 7")
        .candidate("Haywood", "Democratic", &[700])
        .candidate("WRITE-IN", "Nonpartisan", &[5])
        .build();
    let analysis = run_ward_metrics(&tables, &settings(1, 1000, 4)).unwrap();
    let m = &analysis.metrics[0];

    assert_eq!(m.turnout_ppm, Some(800000));
    assert_eq!(m.state_assembly, PpmPair { dem: 700000, rep: 0 });
    // The presidential race and the uncontested assembly race stay out of the average.
    assert_eq!(m.average, Some(PpmPair { dem: 550000, rep: 350000 }));
    assert_eq!(m.logit_average, Some(495480));
    assert_eq!(m.maxes, PpmPair { dem: 700000, rep: 400000 });
    assert_eq!(m.logit_maxes, Some(494404));
    assert_eq!(m.contested.get(RaceCategory::FederalHouse), 1);
    assert_eq!(m.uncontested.get(RaceCategory::StateAssembly), 1);
    assert_eq!(m.export_record()[20], "Village North");
}

#[test]
fn later_race_of_a_fixed_category_takes_the_slot() {
    init_logs();
    let tables = JurisdictionBuilder::new()
        .ward("Ward 1", 1200, 1000)
        .race("State Senator District 3")
        .candidate("Carpenter", "Democratic", &[500])
        .candidate("Smith", "Republican", &[400])
        .race("State Senator District 5")
        .candidate("Larson", "Democratic", &[300])
        .candidate("Jones", "Republican", &[600])
        .build();
    let analysis = run_ward_metrics(&tables, &settings(1, 1000, 2)).unwrap();
    let m = &analysis.metrics[0];

    assert_eq!(m.state_senate, PpmPair { dem: 300000, rep: 600000 });
    // Both races still count towards the average.
    assert_eq!(m.average, Some(PpmPair { dem: 400000, rep: 500000 }));
    assert_eq!(m.maxes, PpmPair { dem: 300000, rep: 600000 });
    assert_eq!(m.contested.get(RaceCategory::StateSenate), 2);
    assert_eq!(
        analysis.diagnostics.max_races_per_ward.get(RaceCategory::StateSenate),
        2
    );
}

#[test]
fn races_per_ward_adds_contested_and_uncontested() {
    let tables = JurisdictionBuilder::new()
        .ward("Ward 1", 1200, 1000)
        .race("Representative to the Assembly District 7")
        .candidate("Haywood", "Democratic", &[500])
        .candidate("Rodriguez", "Republican", &[400])
        .race("Representative to the Assembly District 8")
        .candidate("Bowen", "Democratic", &[700])
        .build();
    let analysis = run_ward_metrics(&tables, &settings(1, 1000, 2)).unwrap();
    let m = &analysis.metrics[0];
    assert_eq!(m.state_assembly, PpmPair { dem: 700000, rep: 0 });
    assert_eq!(m.average, Some(PpmPair { dem: 500000, rep: 400000 }));

    let d = &analysis.diagnostics;
    assert_eq!(d.max_contested_per_ward.get(RaceCategory::StateAssembly), 1);
    assert_eq!(d.max_uncontested_per_ward.get(RaceCategory::StateAssembly), 1);
    assert_eq!(d.max_races_per_ward.get(RaceCategory::StateAssembly), 2);
    assert_eq!(d.max_races_per_ward.get(RaceCategory::StateSenate), 0);
}

#[test]
fn activity_threshold_is_inclusive() {
    let tables = JurisdictionBuilder::new()
        .ward("Ward 1", 0, 40)
        .ward("Ward 2", 100, 39)
        .race("County Executive")
        .candidate("Crowley", "Democratic", &[20, 10])
        .build();
    let analysis = run_ward_metrics(&tables, &settings(2, 79, 1)).unwrap();
    assert_eq!(analysis.metrics.len(), 1);
    assert_eq!(analysis.metrics[0].ward_id, 1);
    // No registered voters: no turnout.
    assert_eq!(analysis.metrics[0].turnout_ppm, None);
    assert_eq!(analysis.plot.len(), 1);
    assert!(analysis.plot.iter().all(|b| b.ward_id != 2));
}

#[test]
fn races_without_major_party_votes_are_skipped() {
    let tables = JurisdictionBuilder::new()
        .ward("Ward 1", 100, 50)
        .race("Representative in Congress District 5")
        .candidate("Nobody", "Democratic", &[0])
        .candidate("Noone", "Republican", &[0])
        .candidate("Someone", "Independent", &[45])
        .build();
    let analysis = run_ward_metrics(&tables, &settings(1, 50, 1)).unwrap();
    let m = &analysis.metrics[0];
    assert_eq!(m.federal_house, PpmPair::default());
    assert_eq!(m.uncontested.get(RaceCategory::FederalHouse), 0);
    assert_eq!(m.contested.get(RaceCategory::FederalHouse), 0);
    assert_eq!(m.logit_maxes, None);
}

#[test]
fn sort_by_maxes_breaks_ties_on_ward_id() {
    let tables = JurisdictionBuilder::new()
        .ward("Ward 1", 100, 60)
        .ward("Ward 2", 100, 50)
        .ward("Ward 3", 100, 70)
        .race("County Clerk")
        .candidate("Dem", "Democratic", &[10, 10, 30])
        .candidate("Rep", "Republican", &[10, 10, 5])
        .build();
    let mut s = settings(3, 180, 1);
    s.plot.sort_key = SortKey::LogitMaxes;
    let analysis = run_ward_metrics(&tables, &s).unwrap();
    let order: Vec<WardId> = analysis.plot.iter().map(|b| b.ward_id).collect();
    // Ward 3 leans democrat. Wards 1 and 2 are both at an even split and keep
    // ward order even though ward 2 is smaller.
    assert_eq!(order, vec![3, 1, 2]);
    assert_eq!(analysis.metrics[0].logit_maxes, Some(500000));
}

#[test]
fn wrong_ballot_total_aborts() {
    let err = run_ward_metrics(&three_wards(), &settings(3, 931, 2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[test]
fn wrong_ward_count_aborts() {
    let err = run_ward_metrics(&three_wards(), &settings(4, 930, 2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
}

#[test]
fn missing_race_tables_abort() {
    let err = run_ward_metrics(&three_wards(), &settings(3, 930, 3)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
}

#[test]
fn tampered_vote_aborts() {
    let clean = three_wards();
    let mut tables = Tables::new();
    for idx in 0..clean.table_count() {
        let mut rows: Vec<Row> = clean.table(idx).unwrap().to_vec();
        if idx == 3 {
            // Ward 2 of the presidential race.
            rows[2][2] = "101".to_string();
        }
        tables.push_table(rows);
    }
    let err = run_ward_metrics(&tables, &settings(3, 930, 2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}
