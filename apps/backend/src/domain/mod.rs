//! Domain layer: pure compatibility types and the status resolver.

pub mod comment;
pub mod game_record;
pub mod status_resolver;
pub mod test_report;
pub mod work_status;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_game_record;
#[cfg(test)]
mod tests_props_status;
#[cfg(test)]
mod tests_status_resolver;

// Re-exports for ergonomics
pub use comment::Comment;
pub use game_record::{GameInfo, GameRecord};
pub use status_resolver::{resolve, StatusTally};
pub use test_report::{ReportDraft, TestReport};
pub use work_status::{IssueType, Reproducibility, WorkStatus};
