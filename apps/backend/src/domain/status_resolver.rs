//! Aggregate compatibility verdict for a set of test reports.
//!
//! Majority first, recency as the tie-break:
//! 1. no reports → `UNTESTED`
//! 2. the status with the highest report count wins outright
//! 3. among statuses sharing the highest count, the one whose newest report
//!    has the largest `updated_at_millis` wins
//! 4. if those newest timestamps are also equal, the status with the
//!    lexicographically smallest wire name wins
//!    (`NOT_WORKING` < `UNTESTED` < `WORKING`)
//!
//! The verdict depends only on the multiset of (status, timestamp) pairs,
//! never on the order reports arrive in.

use super::test_report::TestReport;
use super::work_status::WorkStatus;

/// Per-status counts and newest timestamps for a report set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusTally {
    pub working: usize,
    pub not_working: usize,
    pub untested: usize,
    newest_working: Option<i64>,
    newest_not_working: Option<i64>,
    newest_untested: Option<i64>,
}

impl StatusTally {
    pub fn from_reports<'a, I>(reports: I) -> Self
    where
        I: IntoIterator<Item = &'a TestReport>,
    {
        let mut tally = Self::default();
        for report in reports {
            tally.record(report.status, report.updated_at_millis);
        }
        tally
    }

    fn record(&mut self, status: WorkStatus, updated_at_millis: i64) {
        let (count, newest) = match status {
            WorkStatus::Working => (&mut self.working, &mut self.newest_working),
            WorkStatus::NotWorking => (&mut self.not_working, &mut self.newest_not_working),
            WorkStatus::Untested => (&mut self.untested, &mut self.newest_untested),
        };
        *count += 1;
        *newest = Some(newest.map_or(updated_at_millis, |t| t.max(updated_at_millis)));
    }

    pub fn count(&self, status: WorkStatus) -> usize {
        match status {
            WorkStatus::Working => self.working,
            WorkStatus::NotWorking => self.not_working,
            WorkStatus::Untested => self.untested,
        }
    }

    /// Newest `updated_at_millis` among reports with this status.
    pub fn newest(&self, status: WorkStatus) -> Option<i64> {
        match status {
            WorkStatus::Working => self.newest_working,
            WorkStatus::NotWorking => self.newest_not_working,
            WorkStatus::Untested => self.newest_untested,
        }
    }

    pub fn total(&self) -> usize {
        self.working + self.not_working + self.untested
    }

    /// Statuses sharing the highest count (empty when there are no reports).
    pub fn leaders(&self) -> Vec<WorkStatus> {
        let max = WorkStatus::ALL
            .iter()
            .map(|s| self.count(*s))
            .max()
            .unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }
        WorkStatus::ALL
            .into_iter()
            .filter(|s| self.count(*s) == max)
            .collect()
    }

    pub fn verdict(&self) -> WorkStatus {
        let leaders = self.leaders();
        match leaders.as_slice() {
            [] => WorkStatus::Untested,
            [only] => *only,
            _ => leaders
                .into_iter()
                .max_by(|a, b| {
                    self.newest(*a)
                        .cmp(&self.newest(*b))
                        // reversed so the smaller wire name compares greater
                        .then_with(|| b.as_str().cmp(a.as_str()))
                })
                .unwrap_or(WorkStatus::Untested),
        }
    }
}

/// Resolve the aggregate status of a report set.
pub fn resolve(reports: &[TestReport]) -> WorkStatus {
    StatusTally::from_reports(reports).verdict()
}
