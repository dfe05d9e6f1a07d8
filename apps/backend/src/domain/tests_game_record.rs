use crate::domain::{GameInfo, GameRecord, TestReport, WorkStatus};

fn game(tests: Vec<TestReport>) -> GameRecord {
    GameRecord::new(
        GameInfo {
            id: "g1".into(),
            title: "Sky Racer".into(),
            year: Some(1998),
            ..GameInfo::default()
        },
        tests,
    )
}

#[test]
fn latest_test_is_none_without_reports() {
    let record = game(vec![]);
    assert!(record.latest_test().is_none());
    assert_eq!(record.overall_status(), WorkStatus::Untested);
}

#[test]
fn latest_test_picks_max_updated_at() {
    let record = game(vec![
        TestReport::new("a", "g1", WorkStatus::Working, 10),
        TestReport::new("b", "g1", WorkStatus::NotWorking, 30),
        TestReport::new("c", "g1", WorkStatus::Working, 20),
    ]);
    assert_eq!(record.latest_test().map(|t| t.id.as_str()), Some("b"));
}

#[test]
fn latest_test_tie_keeps_first_in_input_order() {
    let record = game(vec![
        TestReport::new("first", "g1", WorkStatus::Working, 30),
        TestReport::new("second", "g1", WorkStatus::NotWorking, 30),
    ]);
    assert_eq!(record.latest_test().map(|t| t.id.as_str()), Some("first"));

    let swapped = game(vec![
        TestReport::new("second", "g1", WorkStatus::NotWorking, 30),
        TestReport::new("first", "g1", WorkStatus::Working, 30),
    ]);
    assert_eq!(swapped.latest_test().map(|t| t.id.as_str()), Some("second"));
}

#[test]
fn overall_status_delegates_to_resolver() {
    let record = game(vec![
        TestReport::new("a", "g1", WorkStatus::Working, 100),
        TestReport::new("b", "g1", WorkStatus::NotWorking, 200),
    ]);
    assert_eq!(record.overall_status(), WorkStatus::NotWorking);
    assert_eq!(record.tally().total(), 2);
}

#[test]
fn favorite_flag_is_not_serialized_with_game_info() {
    let record = game(vec![]);
    let value = serde_json::to_value(&record.info).unwrap();
    assert!(value.get("isFavorite").is_none());
    assert!(value.get("id").is_none());
    assert_eq!(value["title"], "Sky Racer");
}
