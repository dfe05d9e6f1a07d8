//! Property tests for the aggregate status resolver (pure domain, no store).

use proptest::prelude::*;

use crate::domain::status_resolver::{resolve, StatusTally};
use crate::domain::test_gens;
use crate::domain::test_prelude;
use crate::domain::WorkStatus;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: the verdict always carries the highest count.
    #[test]
    fn prop_verdict_has_max_count(reports in test_gens::reports(12)) {
        let tally = StatusTally::from_reports(&reports);
        let verdict = resolve(&reports);
        let max = WorkStatus::ALL.iter().map(|s| tally.count(*s)).max().unwrap_or(0);

        prop_assert_eq!(tally.count(verdict), max);
    }

    /// Property: reordering the input never changes the verdict.
    #[test]
    fn prop_permutation_invariant(
        reports in test_gens::reports(12),
        rotate_by in 0usize..12,
    ) {
        let mut reversed = reports.clone();
        reversed.reverse();

        let mut rotated = reports.clone();
        if !rotated.is_empty() {
            let n = rotate_by % rotated.len();
            rotated.rotate_left(n);
        }

        let expected = resolve(&reports);
        prop_assert_eq!(resolve(&reversed), expected);
        prop_assert_eq!(resolve(&rotated), expected);
    }

    /// Property: a unique majority wins no matter how fresh the minority is.
    #[test]
    fn prop_unique_majority_wins(
        majority in test_gens::work_status(),
        extra in 1usize..5,
        minority_at in 1_000i64..2_000,
    ) {
        let minority = WorkStatus::ALL.into_iter().find(|s| *s != majority).unwrap();
        let mut reports: Vec<_> = (0..extra + 1)
            .map(|i| crate::domain::TestReport::new(format!("m{i}"), "g", majority, i as i64))
            .collect();
        for i in 0..extra {
            reports.push(crate::domain::TestReport::new(format!("n{i}"), "g", minority, minority_at + i as i64));
        }

        prop_assert_eq!(resolve(&reports), majority);
    }

    /// Property: resolve is deterministic.
    #[test]
    fn prop_idempotent(reports in test_gens::reports(12)) {
        prop_assert_eq!(resolve(&reports), resolve(&reports));
    }
}
