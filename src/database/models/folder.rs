use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    /// `None` for root folders.
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderInput {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default, alias = "parentId", alias = "ParentID")]
    pub parent_id: Option<i64>,
}
