use crate::types::{
    tables::{Contest, ContestStatus, Site},
    upstream::{CodechefContest, CodechefList, CodeforcesList, LeetcodeContest, LeetcodeResponse},
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, Url};
use serde_json::json;
use tokio::time::Duration;

/// Number of entries considered from the Codeforces contest list, which the
/// endpoint returns newest-first.
const CODEFORCES_WINDOW: usize = 200;
/// Number of entries considered from the LeetCode `allContests` query.
const LEETCODE_WINDOW: usize = 100;

/// One per-platform fetch-and-normalize unit. A failing source surfaces as
/// an error to the aggregator, which logs it and proceeds with the others.
#[async_trait]
pub trait ContestSource: Send + Sync {
    fn site(&self) -> Site;

    async fn fetch(&self) -> Result<Vec<Contest>>;
}

pub struct CodeforcesClient {
    url: Url,
    client: Client,
}

impl CodeforcesClient {
    pub fn new() -> Self {
        CodeforcesClient {
            url: Url::parse("https://codeforces.com/api/contest.list").unwrap(),
            client: Client::builder()
                .gzip(true)
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
        }
    }
}

#[async_trait]
impl ContestSource for CodeforcesClient {
    fn site(&self) -> Site {
        Site::Codeforces
    }

    async fn fetch(&self) -> Result<Vec<Contest>> {
        let res = self.client.get(self.url.clone()).send().await?;

        if let Err(e) = res.error_for_status_ref() {
            let message = format!("error response returned from Codeforces contest list: {:?}", e);
            tracing::error!(message);
            anyhow::bail!(message);
        }

        let list: CodeforcesList = res.json().await?;
        if list.status != "OK" {
            anyhow::bail!("Codeforces contest list returned status {}", list.status);
        }

        let contests = normalize_codeforces(&list);
        tracing::info!("{} contests collected from Codeforces.", contests.len());

        Ok(contests)
    }
}

fn normalize_codeforces(list: &CodeforcesList) -> Vec<Contest> {
    list.result
        .iter()
        .take(CODEFORCES_WINDOW)
        .filter_map(|entry| {
            let start = entry.start_time_seconds?;
            let start_time = Utc.timestamp_opt(start, 0).single()?;
            let contest_status = if entry.phase == "BEFORE" {
                ContestStatus::Upcoming
            } else {
                ContestStatus::Finished
            };

            Some(Contest {
                contest_id: format!("cf_{}", entry.id),
                site: Site::Codeforces,
                title: entry.name.clone(),
                start_time,
                duration_hours: entry.duration_seconds as f64 / 3600.0,
                contest_status,
                url: format!("https://codeforces.com/contests/{}", entry.id),
                youtube_link: None,
            })
        })
        .collect()
}

pub struct CodechefClient {
    url: Url,
    client: Client,
}

impl CodechefClient {
    pub fn new() -> Self {
        CodechefClient {
            url: Url::parse(
                "https://www.codechef.com/api/list/contests/all?sort_by=START&sorting_order=asc&offset=0&mode=all",
            )
            .unwrap(),
            client: Client::builder()
                .gzip(true)
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
        }
    }
}

#[async_trait]
impl ContestSource for CodechefClient {
    fn site(&self) -> Site {
        Site::Codechef
    }

    async fn fetch(&self) -> Result<Vec<Contest>> {
        let res = self.client.get(self.url.clone()).send().await?;

        if let Err(e) = res.error_for_status_ref() {
            let message = format!("error response returned from CodeChef contest list: {:?}", e);
            tracing::error!(message);
            anyhow::bail!(message);
        }

        let list: CodechefList = res.json().await?;
        let contests = normalize_codechef(&list);
        tracing::info!("{} contests collected from CodeChef.", contests.len());

        Ok(contests)
    }
}

fn normalize_codechef(list: &CodechefList) -> Vec<Contest> {
    let mut contests = normalize_codechef_partition(&list.future_contests, ContestStatus::Upcoming);
    contests.extend(normalize_codechef_partition(
        &list.past_contests,
        ContestStatus::Finished,
    ));

    contests
}

fn normalize_codechef_partition(
    entries: &[CodechefContest],
    contest_status: ContestStatus,
) -> Vec<Contest> {
    entries
        .iter()
        .filter_map(|entry| {
            let start_time = parse_codechef_start(&entry.contest_start_date_iso)?;
            let minutes = entry.contest_duration.parse::<f64>().ok()?;

            Some(Contest {
                contest_id: format!("cc_{}", entry.contest_code),
                site: Site::Codechef,
                title: entry.contest_name.clone(),
                start_time,
                duration_hours: minutes / 60.0,
                contest_status,
                url: format!("https://codechef.com/{}", entry.contest_code),
                youtube_link: None,
            })
        })
        .collect()
}

fn parse_codechef_start(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(start) => Some(start.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("unparsable CodeChef start date {}: {}", raw, e);
            None
        }
    }
}

pub struct LeetcodeClient {
    url: Url,
    client: Client,
}

/// The endpoint exposes no status field, see `normalize_leetcode`.
const LEETCODE_QUERY: &str = "{ allContests { title titleSlug startTime duration } }";

impl LeetcodeClient {
    pub fn new() -> Self {
        LeetcodeClient {
            url: Url::parse("https://leetcode.com/graphql").unwrap(),
            client: Client::builder()
                .gzip(true)
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
        }
    }
}

#[async_trait]
impl ContestSource for LeetcodeClient {
    fn site(&self) -> Site {
        Site::Leetcode
    }

    async fn fetch(&self) -> Result<Vec<Contest>> {
        let res = self
            .client
            .post(self.url.clone())
            .json(&json!({ "query": LEETCODE_QUERY }))
            .send()
            .await?;

        if let Err(e) = res.error_for_status_ref() {
            let message = format!("error response returned from LeetCode graphql: {:?}", e);
            tracing::error!(message);
            anyhow::bail!(message);
        }

        let response: LeetcodeResponse = res.json().await?;
        let contests = normalize_leetcode(&response.data.all_contests);
        tracing::info!("{} contests collected from LeetCode.", contests.len());

        Ok(contests)
    }
}

/// Known heuristic: `allContests` carries no status field but lists the two
/// scheduled contests (weekly/biweekly) first, so only the first two entries
/// of the window are treated as upcoming. This breaks if the upstream
/// ordering ever changes; replace it with an authoritative field if the API
/// grows one.
fn normalize_leetcode(entries: &[LeetcodeContest]) -> Vec<Contest> {
    entries
        .iter()
        .take(LEETCODE_WINDOW)
        .enumerate()
        .filter_map(|(i, entry)| {
            let start_time = Utc.timestamp_opt(entry.start_time, 0).single()?;
            let contest_status = if i <= 1 {
                ContestStatus::Upcoming
            } else {
                ContestStatus::Finished
            };

            Some(Contest {
                contest_id: format!("lc_{}", entry.title_slug),
                site: Site::Leetcode,
                title: entry.title.clone(),
                start_time,
                duration_hours: entry.duration as f64 / 3600.0,
                contest_status,
                url: format!("https://leetcode.com/contest/{}", entry.title_slug),
                youtube_link: None,
            })
        })
        .collect()
}

/// The three production sources, in the order their results are merged.
pub fn all_sources() -> Vec<Box<dyn ContestSource>> {
    vec![
        Box::new(CodeforcesClient::new()),
        Box::new(CodechefClient::new()),
        Box::new(LeetcodeClient::new()),
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize_codeforces_maps_phase_and_units() {
        let list: CodeforcesList = serde_json::from_str(
            r#"{
                "status": "OK",
                "result": [
                    {"id": 1951, "name": "Codeforces Round 951 (Div. 2)", "phase": "BEFORE", "durationSeconds": 7200, "startTimeSeconds": 1767225600},
                    {"id": 1950, "name": "Codeforces Round 950 (Div 3)", "phase": "FINISHED", "durationSeconds": 8100, "startTimeSeconds": 1767139200},
                    {"id": 1949, "name": "Unscheduled Gym", "phase": "BEFORE", "durationSeconds": 7200}
                ]
            }"#,
        )
        .unwrap();

        let contests = normalize_codeforces(&list);

        assert_eq!(contests.len(), 2);
        assert_eq!(contests[0].contest_id, "cf_1951");
        assert_eq!(contests[0].contest_status, ContestStatus::Upcoming);
        assert_eq!(contests[0].duration_hours, 2.0);
        assert_eq!(contests[0].url, "https://codeforces.com/contests/1951");
        assert_eq!(contests[1].contest_status, ContestStatus::Finished);
        assert_eq!(contests[1].duration_hours, 2.25);
    }

    #[test]
    fn test_normalize_codeforces_caps_window() {
        let entries = (0..250)
            .map(|i| {
                format!(
                    r#"{{"id": {}, "name": "Round {}", "phase": "FINISHED", "durationSeconds": 7200, "startTimeSeconds": 1767139200}}"#,
                    i, i
                )
            })
            .collect::<Vec<String>>()
            .join(",");
        let list: CodeforcesList =
            serde_json::from_str(&format!(r#"{{"status": "OK", "result": [{}]}}"#, entries))
                .unwrap();

        assert_eq!(normalize_codeforces(&list).len(), CODEFORCES_WINDOW);
    }

    #[test]
    fn test_normalize_codechef_takes_status_from_partition() {
        let list: CodechefList = serde_json::from_str(
            r#"{
                "future_contests": [
                    {"contest_code": "START160", "contest_name": "Starters 160 (Rated)", "contest_start_date_iso": "2026-01-14T20:00:00+05:30", "contest_duration": "120"}
                ],
                "past_contests": [
                    {"contest_code": "START159", "contest_name": "Starters 159 (Rated)", "contest_start_date_iso": "2026-01-07T20:00:00+05:30", "contest_duration": "180"},
                    {"contest_code": "BROKEN", "contest_name": "Broken Date", "contest_start_date_iso": "not a date", "contest_duration": "120"}
                ]
            }"#,
        )
        .unwrap();

        let contests = normalize_codechef(&list);

        assert_eq!(contests.len(), 2);
        assert_eq!(contests[0].contest_id, "cc_START160");
        assert_eq!(contests[0].contest_status, ContestStatus::Upcoming);
        assert_eq!(contests[0].duration_hours, 2.0);
        assert_eq!(contests[0].url, "https://codechef.com/START160");
        assert_eq!(contests[1].contest_status, ContestStatus::Finished);
        assert_eq!(contests[1].duration_hours, 3.0);
    }

    #[test]
    fn test_normalize_leetcode_first_two_entries_are_upcoming() {
        let response: LeetcodeResponse = serde_json::from_str(
            r#"{
                "data": {
                    "allContests": [
                        {"title": "Weekly Contest 430", "titleSlug": "weekly-contest-430", "startTime": 1767312000, "duration": 5400},
                        {"title": "Biweekly Contest 121", "titleSlug": "biweekly-contest-121", "startTime": 1767225600, "duration": 5400},
                        {"title": "Weekly Contest 429", "titleSlug": "weekly-contest-429", "startTime": 1766707200, "duration": 5400}
                    ]
                }
            }"#,
        )
        .unwrap();

        let contests = normalize_leetcode(&response.data.all_contests);

        assert_eq!(contests.len(), 3);
        assert_eq!(contests[0].contest_id, "lc_weekly-contest-430");
        assert_eq!(contests[0].contest_status, ContestStatus::Upcoming);
        assert_eq!(contests[1].contest_status, ContestStatus::Upcoming);
        assert_eq!(contests[2].contest_status, ContestStatus::Finished);
        assert_eq!(contests[2].duration_hours, 1.5);
        assert_eq!(contests[2].url, "https://leetcode.com/contest/weekly-contest-429");
    }
}
