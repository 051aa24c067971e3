use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::FromRow;
use std::fmt;

/// Platform a contest belongs to. Stored as the `contest_site` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contest_site")]
pub enum Site {
    Codeforces,
    Codechef,
    Leetcode,
}

impl Site {
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Codeforces => "Codeforces",
            Site::Codechef => "Codechef",
            Site::Leetcode => "Leetcode",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived at fetch time from platform-specific phase/date fields.
/// Not recomputed from `start_time` after storage; it may go stale until
/// the next aggregation run picks the contest up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contest_phase", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ContestStatus {
    Upcoming,
    Finished,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub contest_id: String,
    pub site: Site,
    pub title: String,
    pub start_time: DateTime<Utc>,
    /// Duration in hours, converted from whatever unit the platform reports.
    #[serde(rename = "duration")]
    pub duration_hours: f64,
    pub contest_status: ContestStatus,
    pub url: String,
    pub youtube_link: Option<String>,
}
