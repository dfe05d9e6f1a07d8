//! Test report: one user's structured compatibility submission.

use serde::{Deserialize, Serialize};

use super::work_status::{IssueType, Reproducibility, WorkStatus};

/// A single compatibility test submission.
///
/// Plain value object. The document id lives outside the stored body and is
/// filled in by the repos layer when the document is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(default)]
    pub status: WorkStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emulator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emulator_build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub reproducibility: Reproducibility,

    #[serde(default)]
    pub created_at_millis: i64,
    /// Sole ordering key for "latest".
    #[serde(default)]
    pub updated_at_millis: i64,

    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at_millis: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at_millis: Option<i64>,
}

impl TestReport {
    /// Minimal report with every optional field empty.
    pub fn new(
        id: impl Into<String>,
        game_id: impl Into<String>,
        status: WorkStatus,
        updated_at_millis: i64,
    ) -> Self {
        Self {
            id: id.into(),
            game_id: game_id.into(),
            author_email: None,
            status,
            device: None,
            os_version: None,
            app_version: None,
            emulator: None,
            emulator_build: None,
            notes: None,
            issue_type: IssueType::None,
            reproducibility: Reproducibility::Unknown,
            created_at_millis: updated_at_millis,
            updated_at_millis,
            archived: false,
            archived_at_millis: None,
            edited_at_millis: None,
        }
    }

    /// Provided metadata as (label, value) pairs; blank fields are skipped.
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        [
            ("Device", self.device.as_deref()),
            ("OS", self.os_version.as_deref()),
            ("App", self.app_version.as_deref()),
            ("Emulator", self.emulator.as_deref()),
            ("Build", self.emulator_build.as_deref()),
            ("Notes", self.notes.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            let value = value?.trim();
            (!value.is_empty()).then_some((label, value))
        })
        .collect()
    }

    /// One-line display text: status followed by the provided metadata.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.status.as_str().to_string()];
        parts.extend(
            self.details()
                .into_iter()
                .map(|(label, value)| format!("{label}: {value}")),
        );
        parts.join(" | ")
    }

    pub fn apply_draft(&mut self, draft: ReportDraft) {
        self.status = draft.status;
        self.device = draft.device;
        self.os_version = draft.os_version;
        self.app_version = draft.app_version;
        self.emulator = draft.emulator;
        self.emulator_build = draft.emulator_build;
        self.notes = draft.notes;
        self.issue_type = draft.issue_type;
        self.reproducibility = draft.reproducibility;
    }
}

/// User-editable part of a report, as submitted from a client form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub status: WorkStatus,
    pub device: Option<String>,
    pub os_version: Option<String>,
    pub app_version: Option<String>,
    pub emulator: Option<String>,
    pub emulator_build: Option<String>,
    pub notes: Option<String>,
    pub issue_type: IssueType,
    pub reproducibility: Reproducibility,
}
