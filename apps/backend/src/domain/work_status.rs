//! Compatibility verdict and the categorical fields of a test report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Compatibility verdict for one report, or the aggregate for a game.
///
/// Variant order carries no meaning; ties in aggregation are broken
/// explicitly by `status_resolver`, never by `Ord` on this type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    Working,
    #[default]
    Untested,
    NotWorking,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 3] = [
        WorkStatus::Working,
        WorkStatus::Untested,
        WorkStatus::NotWorking,
    ];

    /// Wire name, as stored in documents.
    pub const fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Working => "WORKING",
            WorkStatus::Untested => "UNTESTED",
            WorkStatus::NotWorking => "NOT_WORKING",
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "WORKING" => Ok(WorkStatus::Working),
            "UNTESTED" => Ok(WorkStatus::Untested),
            "NOT_WORKING" => Ok(WorkStatus::NotWorking),
            other => Err(DomainError::validation(
                ValidationKind::Other("WorkStatus".into()),
                format!("unknown work status '{other}'"),
            )),
        }
    }
}

/// Kind of problem a tester ran into.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    #[default]
    None,
    Crash,
    Graphics,
    Audio,
    Performance,
    Controls,
    #[serde(other)]
    Other,
}

/// How often the reported issue shows up.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reproducibility {
    Always,
    Often,
    Sometimes,
    Rarely,
    #[default]
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_serde() {
        let json = serde_json::to_string(&WorkStatus::NotWorking).unwrap();
        assert_eq!(json, "\"NOT_WORKING\"");
        let back: WorkStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WorkStatus::NotWorking);
    }

    #[test]
    fn parse_accepts_loose_spelling() {
        assert_eq!("not-working".parse::<WorkStatus>().unwrap(), WorkStatus::NotWorking);
        assert_eq!(" working ".parse::<WorkStatus>().unwrap(), WorkStatus::Working);
        assert!("broken".parse::<WorkStatus>().is_err());
    }

    #[test]
    fn unknown_categorical_values_fall_back() {
        let issue: IssueType = serde_json::from_str("\"SAVE_CORRUPTION\"").unwrap();
        assert_eq!(issue, IssueType::Other);
        let repro: Reproducibility = serde_json::from_str("\"EVERY_FULL_MOON\"").unwrap();
        assert_eq!(repro, Reproducibility::Unknown);
    }
}
