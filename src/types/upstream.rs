//! Response shapes of the external platform endpoints. Only the fields the
//! adapters actually consume are modeled; everything else is ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CodeforcesList {
    pub status: String,
    #[serde(default)]
    pub result: Vec<CodeforcesContest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesContest {
    pub id: i64,
    pub name: String,
    pub phase: String,
    pub duration_seconds: i64,
    /// Absent for contests without a scheduled start (e.g. some gyms).
    pub start_time_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CodechefList {
    #[serde(default)]
    pub future_contests: Vec<CodechefContest>,
    #[serde(default)]
    pub past_contests: Vec<CodechefContest>,
}

#[derive(Debug, Deserialize)]
pub struct CodechefContest {
    pub contest_code: String,
    pub contest_name: String,
    pub contest_start_date_iso: String,
    /// Minutes, reported as a decimal string.
    pub contest_duration: String,
}

#[derive(Debug, Deserialize)]
pub struct LeetcodeResponse {
    pub data: LeetcodeData,
}

#[derive(Debug, Deserialize)]
pub struct LeetcodeData {
    #[serde(rename = "allContests", default)]
    pub all_contests: Vec<LeetcodeContest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeContest {
    pub title: String,
    pub title_slug: String,
    /// Epoch seconds.
    pub start_time: i64,
    /// Seconds.
    pub duration: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub title: String,
    pub resource_id: PlaylistResourceId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResourceId {
    pub video_id: String,
}
