use mlb_similar_players::position_index::PositionIndex;
use mlb_similar_players::{PlayerTable, UnknownPositionPolicy};

fn labels(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn roster() -> PlayerTable {
    let mut table = PlayerTable::new(["HR"]);
    let rows = [
        (30, "C"),
        (4, "SS"),
        (12, "C"),
        (8, "1B"),
        (2, "SS"),
        (19, "P"),
    ];
    for (id, pos) in rows {
        table.insert(id, format!("Player {id}"), pos, [("HR", id as f64)]).unwrap();
    }
    table
}

#[test]
fn buckets_follow_declared_order_and_sort_ids() {
    let index = PositionIndex::build(
        &roster(),
        &labels(&["SS", "C", "1B", "ALL"]),
        UnknownPositionPolicy::AllOnly,
    )
    .unwrap();

    let got: Vec<(&str, Vec<u32>)> = index
        .buckets()
        .iter()
        .map(|b| (b.label.as_str(), b.ids.clone()))
        .collect();
    assert_eq!(
        got,
        vec![("SS", vec![2, 4]), ("C", vec![12, 30]), ("1B", vec![8])]
    );
    assert_eq!(index.all().ids, vec![2, 4, 8, 12, 19, 30]);
    assert_eq!(index.get("ALL").unwrap().len(), 6);
    assert_eq!(index.unassigned(), &[19]);
}

#[test]
fn all_bucket_exists_even_when_not_declared() {
    let index =
        PositionIndex::build(&roster(), &labels(&["C"]), UnknownPositionPolicy::AllOnly).unwrap();
    assert_eq!(index.buckets().len(), 1);
    assert_eq!(index.all().len(), 6);
}

#[test]
fn declared_position_without_players_is_empty_not_missing() {
    let index = PositionIndex::build(
        &roster(),
        &labels(&["DH", "C"]),
        UnknownPositionPolicy::AllOnly,
    )
    .unwrap();
    assert!(index.get("DH").unwrap().is_empty());
}

#[test]
fn empty_position_list_is_a_configuration_error() {
    let err = PositionIndex::build(&roster(), &[], UnknownPositionPolicy::AllOnly).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn reject_policy_reports_undeclared_positions() {
    let err = PositionIndex::build(
        &roster(),
        &labels(&["SS", "C", "1B"]),
        UnknownPositionPolicy::Reject,
    )
    .unwrap_err();
    assert!(err.is_data());
    assert!(err.to_string().contains("19"));
}
