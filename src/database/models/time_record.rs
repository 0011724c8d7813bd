use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The two independently stored interval record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRecordKind {
    /// Tracked time, recorded by the chronometer or entered manually.
    Entry,
    /// Planned time blocks.
    TimeBox,
}

impl TimeRecordKind {
    pub const ALL: [TimeRecordKind; 2] = [TimeRecordKind::Entry, TimeRecordKind::TimeBox];

    pub fn table(self) -> &'static str {
        match self {
            TimeRecordKind::Entry => "time_entries",
            TimeRecordKind::TimeBox => "time_box_entries",
        }
    }

    /// Human label used in messages, e.g. "time entry not found".
    pub fn label(self) -> &'static str {
        match self {
            TimeRecordKind::Entry => "time entry",
            TimeRecordKind::TimeBox => "time box entry",
        }
    }

    pub fn not_found_message(self) -> String {
        format!("{} not found", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TimeRecord {
    pub id: i64,
    pub owner_id: String,
    pub description: String,
    pub project_id: Option<i64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRecordInput {
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(default, alias = "projectId", alias = "ProjectID")]
    pub project_id: Option<i64>,
    #[serde(alias = "startDate", alias = "StartDate")]
    pub start_date: DateTime<Utc>,
    #[serde(alias = "endDate", alias = "EndDate")]
    pub end_date: DateTime<Utc>,
}
