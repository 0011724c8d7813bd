use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    /// Rich-text document as produced by the editor; stored verbatim.
    pub content: String,
    /// `None` for unfiled notes.
    pub folder_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Content")]
    pub content: String,
    #[serde(default, alias = "folderId", alias = "FolderID")]
    pub folder_id: Option<i64>,
}
