// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::{TestReport, WorkStatus};

/// Generate a random WorkStatus
pub fn work_status() -> impl Strategy<Value = WorkStatus> {
    prop_oneof![
        Just(WorkStatus::Working),
        Just(WorkStatus::Untested),
        Just(WorkStatus::NotWorking),
    ]
}

/// Generate a report with a small timestamp range so equal timestamps occur.
pub fn report() -> impl Strategy<Value = TestReport> {
    (work_status(), 0i64..50).prop_map(|(status, at)| TestReport::new("", "game", status, at))
}

/// Generate a report set (possibly empty) with ids assigned by position.
pub fn reports(max_len: usize) -> impl Strategy<Value = Vec<TestReport>> {
    prop::collection::vec(report(), 0..=max_len).prop_map(|mut reports| {
        for (i, r) in reports.iter_mut().enumerate() {
            r.id = format!("r{i}");
        }
        reports
    })
}
