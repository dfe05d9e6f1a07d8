use serde::{Deserialize, Serialize};

use super::status_resolver::{resolve, StatusTally};
use super::test_report::TestReport;
use super::work_status::WorkStatus;

/// Catalog fields of a game, as stored in the games collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at_millis: i64,
}

/// A game together with its test reports and the viewer's favorite flag.
///
/// `is_favorite` belongs to the viewer's session, not to the stored game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub info: GameInfo,
    pub tests: Vec<TestReport>,
    pub is_favorite: bool,
}

impl GameRecord {
    pub fn new(info: GameInfo, tests: Vec<TestReport>) -> Self {
        Self {
            info,
            tests,
            is_favorite: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// Report with the largest `updated_at_millis`; on equal timestamps the
    /// earliest one in `tests` wins.
    pub fn latest_test(&self) -> Option<&TestReport> {
        self.tests.iter().reduce(|best, candidate| {
            if candidate.updated_at_millis > best.updated_at_millis {
                candidate
            } else {
                best
            }
        })
    }

    pub fn overall_status(&self) -> WorkStatus {
        resolve(&self.tests)
    }

    pub fn tally(&self) -> StatusTally {
        StatusTally::from_reports(&self.tests)
    }
}
