use serde::{Deserialize, Serialize};

/// A comment on a test report or on a game.
///
/// Both comment collections share this shape; `parent_id` is the test id or
/// the game id depending on the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at_millis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at_millis: Option<i64>,
}

impl Comment {
    pub fn new(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        text: impl Into<String>,
        created_at_millis: i64,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            author_email: None,
            author_name: None,
            text: text.into(),
            created_at_millis,
            edited_at_millis: None,
        }
    }

    pub fn is_edited(&self) -> bool {
        self.edited_at_millis.is_some()
    }
}
