use std::path::PathBuf;

use mlb_similar_players::ingest::{ColumnSpec, read_player_table};
use mlb_similar_players::pipeline::run;
use mlb_similar_players::report::export_workbook;
use mlb_similar_players::{PlayerTable, SimilarityConfig, UnknownPositionPolicy};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn sample_table() -> PlayerTable {
    read_player_table(&fixture_path("mlb_sample.csv"), &ColumnSpec::default())
        .expect("fixture should parse")
}

fn name_of(table: &PlayerTable, needle: &str) -> u32 {
    table
        .players()
        .iter()
        .find(|p| p.name == needle)
        .map(|p| p.id)
        .expect("player should exist")
}

#[test]
fn team_column_is_not_a_statistic() {
    let table = sample_table();
    assert_eq!(table.statistics().len(), 19);
    assert!(table.statistics().iter().all(|s| s != "Tm"));

    let config = SimilarityConfig::default();
    let weighted = ColumnSpec::default()
        .with_statistics(config.weights.iter().map(|w| w.statistic.clone()));
    let table = read_player_table(&fixture_path("mlb_sample.csv"), &weighted)
        .expect("weighted columns should parse");
    assert_eq!(table.statistics().len(), 19);
    assert!(run(&table, &config).is_ok());
}

#[test]
fn one_sheet_per_declared_position() {
    let table = sample_table();
    let report = run(&table, &SimilarityConfig::default()).expect("run should succeed");
    let labels: Vec<&str> = report.sheets.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["1B", "2B", "3B", "SS", "OF", "C", "DH", "ALL"]);

    assert_eq!(report.sheet("OF").unwrap().rows.len(), 3);
    assert_eq!(report.sheet("ALL").unwrap().rows.len(), 16);
}

#[test]
fn within_and_overall_lists() {
    let table = sample_table();
    let report = run(&table, &SimilarityConfig::default()).unwrap();

    let first_base = report.sheet("1B").unwrap();
    for row in &first_base.rows {
        assert_eq!(row.within.len(), 2);
        assert!(row.within.iter().all(|c| c.id != row.id));
        assert!(
            row.within
                .iter()
                .all(|c| table.get(c.id).unwrap().position == "1B")
        );
        assert_eq!(row.overall.len(), 5);
        assert!(row.overall.iter().all(|c| c.id != row.id));
        assert!(row.overall.windows(2).all(|w| w[0].score >= w[1].score));
    }

    // Lone designated hitter has nobody to compare against at the position.
    let dh = report.sheet("DH").unwrap();
    assert_eq!(dh.rows.len(), 1);
    assert!(dh.rows[0].within.is_empty());
    assert_eq!(dh.rows[0].overall.len(), 5);
}

#[test]
fn sluggers_find_each_other() {
    let table = sample_table();
    let report = run(&table, &SimilarityConfig::default()).unwrap();
    let judge = name_of(&table, "Aaron Judge");
    let row = report
        .sheet("OF")
        .unwrap()
        .rows
        .iter()
        .find(|r| r.id == judge)
        .unwrap();
    // The zero-stat pitcher is never a close match for a full-season hitter.
    let ohtani = name_of(&table, "Shohei Ohtani");
    assert!(row.overall.iter().all(|c| c.id != ohtani));
}

#[test]
fn undeclared_position_is_all_only_by_default() {
    let table = sample_table();
    let report = run(&table, &SimilarityConfig::default()).unwrap();
    let ohtani = name_of(&table, "Shohei Ohtani");
    assert_eq!(report.unassigned, vec![ohtani]);
    assert!(
        report
            .sheets
            .iter()
            .filter(|s| s.label != "ALL")
            .all(|s| s.rows.iter().all(|r| r.id != ohtani))
    );
    assert!(report.sheet("ALL").unwrap().rows.iter().any(|r| r.id == ohtani));
}

#[test]
fn undeclared_position_can_be_rejected() {
    let table = sample_table();
    let config = SimilarityConfig {
        unknown_position: UnknownPositionPolicy::Reject,
        ..SimilarityConfig::default()
    };
    let err = run(&table, &config).unwrap_err();
    assert!(err.is_data());
}

#[test]
fn empty_declared_position_aborts_the_run() {
    let table = sample_table();
    let mut config = SimilarityConfig::default();
    config.positions.insert(0, "RP".to_string());
    assert!(run(&table, &config).unwrap_err().is_data());
}

#[test]
fn weight_for_missing_column_is_a_configuration_error() {
    let table = sample_table();
    let mut config = SimilarityConfig::default();
    config.set_weight("WAR", 1.0);
    assert!(run(&table, &config).unwrap_err().is_configuration());
}

#[test]
fn repeated_runs_are_identical() {
    let table = sample_table();
    let single = SimilarityConfig {
        threads: Some(1),
        ..SimilarityConfig::default()
    };
    let many = SimilarityConfig {
        threads: Some(4),
        ..SimilarityConfig::default()
    };
    let a = run(&table, &single).unwrap();
    let b = run(&table, &single).unwrap();
    let c = run(&table, &many).unwrap();
    assert_eq!(a.sheets, b.sheets);
    assert_eq!(a.sheets, c.sheets);
}

#[test]
fn zero_weight_matches_omitting_the_statistic() {
    let table = sample_table();
    let mut zeroed = SimilarityConfig::default();
    zeroed.set_weight("SO", 0.0);
    let mut omitted = SimilarityConfig::default();
    omitted.weights.retain(|w| w.statistic != "SO");

    let a = run(&table, &zeroed).unwrap();
    let b = run(&table, &omitted).unwrap();
    for (sa, sb) in a.sheets.iter().zip(&b.sheets) {
        for (ra, rb) in sa.rows.iter().zip(&sb.rows) {
            let ids_a: Vec<u32> = ra.overall.iter().map(|c| c.id).collect();
            let ids_b: Vec<u32> = rb.overall.iter().map(|c| c.id).collect();
            assert_eq!(ids_a, ids_b);
            for (ca, cb) in ra.overall.iter().zip(&rb.overall) {
                assert!((ca.score - cb.score).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn workbook_is_written() {
    let table = sample_table();
    let report = run(&table, &SimilarityConfig::default()).unwrap();
    let mut path = std::env::temp_dir();
    path.push(format!("mlb_similar_players_{}.xlsx", std::process::id()));

    let export = export_workbook(&path, &report, true).expect("export should succeed");
    assert_eq!(export.sheets, 8);
    assert_eq!(export.rows, 3 + 2 + 2 + 2 + 3 + 2 + 1 + 16);
    // 1B/2B/3B/SS/OF/C/DH rows all have fewer than five position peers.
    assert_eq!(export.short_rows, 15);

    let meta = std::fs::metadata(&path).expect("workbook should exist");
    assert!(meta.len() > 0);
    let _ = std::fs::remove_file(&path);
}
