use crate::domain::status_resolver::{resolve, StatusTally};
use crate::domain::{TestReport, WorkStatus};

fn report(status: WorkStatus, at: i64) -> TestReport {
    TestReport::new(format!("r{at}"), "game", status, at)
}

#[test]
fn empty_set_is_untested() {
    assert_eq!(resolve(&[]), WorkStatus::Untested);
}

#[test]
fn unique_majority_wins_regardless_of_recency() {
    // Two old WORKING reports outweigh one fresh NOT_WORKING report
    let reports = [
        report(WorkStatus::Working, 100),
        report(WorkStatus::Working, 110),
        report(WorkStatus::NotWorking, 9_999),
    ];
    assert_eq!(resolve(&reports), WorkStatus::Working);
}

#[test]
fn single_report_decides() {
    assert_eq!(
        resolve(&[report(WorkStatus::NotWorking, 1)]),
        WorkStatus::NotWorking
    );
    assert_eq!(
        resolve(&[report(WorkStatus::Untested, 1)]),
        WorkStatus::Untested
    );
}

#[test]
fn two_way_tie_goes_to_newer_status() {
    // working=1, notWorking=1, untested=0 → candidates {WORKING, NOT_WORKING}
    let reports = [
        report(WorkStatus::Working, 100),
        report(WorkStatus::NotWorking, 200),
    ];
    assert_eq!(resolve(&reports), WorkStatus::NotWorking);

    let reversed = [
        report(WorkStatus::Working, 200),
        report(WorkStatus::NotWorking, 100),
    ];
    assert_eq!(resolve(&reversed), WorkStatus::Working);
}

#[test]
fn tie_break_uses_newest_report_of_each_status() {
    // WORKING has the single newest report even though its other report is the oldest
    let reports = [
        report(WorkStatus::Working, 1),
        report(WorkStatus::Working, 500),
        report(WorkStatus::NotWorking, 300),
        report(WorkStatus::NotWorking, 400),
    ];
    assert_eq!(resolve(&reports), WorkStatus::Working);
}

#[test]
fn three_way_tie_goes_to_newest() {
    let reports = [
        report(WorkStatus::Working, 10),
        report(WorkStatus::Untested, 30),
        report(WorkStatus::NotWorking, 20),
    ];
    assert_eq!(resolve(&reports), WorkStatus::Untested);
}

#[test]
fn identical_top_timestamps_fall_back_to_wire_name_order() {
    // NOT_WORKING < UNTESTED < WORKING
    let reports = [
        report(WorkStatus::Working, 50),
        report(WorkStatus::NotWorking, 50),
    ];
    assert_eq!(resolve(&reports), WorkStatus::NotWorking);

    let reports = [
        report(WorkStatus::Working, 50),
        report(WorkStatus::Untested, 50),
    ];
    assert_eq!(resolve(&reports), WorkStatus::Untested);

    let reports = [
        report(WorkStatus::Untested, 7),
        report(WorkStatus::Working, 7),
        report(WorkStatus::NotWorking, 7),
    ];
    assert_eq!(resolve(&reports), WorkStatus::NotWorking);
}

#[test]
fn untested_can_win_the_majority() {
    let reports = [
        report(WorkStatus::Untested, 1),
        report(WorkStatus::Untested, 2),
        report(WorkStatus::Working, 3),
    ];
    assert_eq!(resolve(&reports), WorkStatus::Untested);
}

#[test]
fn resolve_is_idempotent() {
    let reports = [
        report(WorkStatus::Working, 100),
        report(WorkStatus::NotWorking, 200),
        report(WorkStatus::Untested, 150),
    ];
    assert_eq!(resolve(&reports), resolve(&reports));
}

#[test]
fn tally_counts_and_newest() {
    let reports = [
        report(WorkStatus::Working, 10),
        report(WorkStatus::Working, 40),
        report(WorkStatus::NotWorking, 20),
    ];
    let tally = StatusTally::from_reports(&reports);

    assert_eq!(tally.working, 2);
    assert_eq!(tally.not_working, 1);
    assert_eq!(tally.untested, 0);
    assert_eq!(tally.total(), 3);
    assert_eq!(tally.newest(WorkStatus::Working), Some(40));
    assert_eq!(tally.newest(WorkStatus::Untested), None);
    assert_eq!(tally.leaders(), vec![WorkStatus::Working]);
}

#[test]
fn leaders_empty_without_reports() {
    assert!(StatusTally::default().leaders().is_empty());
}
