use crate::modules::solutions::matcher;
use crate::types::{
    tables::{Contest, Site},
    upstream::{PlaylistItem, PlaylistItemsResponse},
};
use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::{Client, Url};
use sqlx::{postgres::Postgres, Pool};
use std::collections::HashMap;
use tokio::time::Duration;

/// Most recent playlist items inspected per site and run.
const PLAYLIST_PAGE_SIZE: u32 = 70;

/// Fixed per-site playlists holding post-contest discussion videos.
static PLAYLISTS: Lazy<HashMap<Site, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (Site::Leetcode, "PLcXpkI9A-RZI6FhydNz3JBt_-p_i25Cbr"),
        (Site::Codeforces, "PLcXpkI9A-RZLUfBSNp-YQBCOezZKbDSgB"),
        (Site::Codechef, "PLcXpkI9A-RZIZ6lsE0KCcLWeKNoG45fYr"),
    ])
});

/// Scans finished contests without a video link and attaches the first
/// playlist item whose title contains the contest's canonical key. Contests
/// that stay unmatched remain candidates for the next run.
pub struct SolutionEnricher<'a> {
    url: Url,
    pool: &'a Pool<Postgres>,
    client: Client,
    api_key: String,
}

impl<'a> SolutionEnricher<'a> {
    pub fn new(pool: &'a Pool<Postgres>, api_key: String) -> Self {
        SolutionEnricher {
            url: Url::parse("https://www.googleapis.com/youtube/v3/playlistItems").unwrap(),
            pool,
            client: Client::builder()
                .gzip(true)
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            api_key,
        }
    }

    async fn fetch_playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>> {
        let max_results = PLAYLIST_PAGE_SIZE.to_string();
        let res = self
            .client
            .get(self.url.clone())
            .query(&[
                ("part", "snippet"),
                ("playlistId", playlist_id),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if let Err(e) = res.error_for_status_ref() {
            let message = format!("error response returned from playlist {}: {:?}", playlist_id, e);
            tracing::error!(message);
            anyhow::bail!(message);
        }

        let response: PlaylistItemsResponse = res.json().await?;

        Ok(response.items)
    }

    async fn pending_contests(&self) -> Result<Vec<Contest>> {
        let contests: Vec<Contest> = sqlx::query_as(
            "
            SELECT contest_id, site, title, start_time, duration_hours, contest_status, url, youtube_link
            FROM contests
            WHERE contest_status = 'FINISHED' AND youtube_link IS NULL;
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(contests)
    }

    async fn attach(&self, contest: &Contest, youtube_link: &str) -> Result<()> {
        // Guarded so a concurrent manual override is never clobbered.
        sqlx::query(
            "
            UPDATE contests
            SET youtube_link = $1, updated_at = NOW()
            WHERE contest_id = $2 AND youtube_link IS NULL;
            ",
        )
        .bind(youtube_link)
        .bind(&contest.contest_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// One enrichment run. Every internal failure is absorbed and logged so
    /// the scheduled job always completes.
    pub async fn run(&self) -> Result<()> {
        let pending = self.pending_contests().await?;
        if pending.is_empty() {
            tracing::info!("No finished contests are waiting for a video link.");
            return Ok(());
        }

        tracing::info!("{} finished contests are missing a video link.", pending.len());

        let mut attached = 0usize;
        for (site, playlist_id) in PLAYLISTS.iter() {
            let contests: Vec<&Contest> = pending.iter().filter(|c| c.site == *site).collect();
            if contests.is_empty() {
                continue;
            }

            let items = match self.fetch_playlist_items(playlist_id).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!("skipping {} contests for this run: {:?}", site, e);
                    continue;
                }
            };

            for contest in contests {
                let Some(youtube_link) = find_video(contest, &items) else {
                    tracing::info!("No video found matching {}.", contest.title);
                    continue;
                };

                match self.attach(contest, &youtube_link).await {
                    Ok(_) => {
                        tracing::info!("Attached {} to {}.", youtube_link, contest.contest_id);
                        attached += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            "an error occurred at attaching a link to {:?}: {}",
                            contest.contest_id,
                            e
                        );
                    }
                }
            }
        }

        tracing::info!("{} of {} contests received a video link.", attached, pending.len());

        Ok(())
    }
}

/// First playlist item (in playlist order) whose title contains the
/// contest's canonical key, as a watch URL.
pub fn find_video(contest: &Contest, items: &[PlaylistItem]) -> Option<String> {
    items
        .iter()
        .find(|item| matcher::matches(&contest.title, contest.site, &item.snippet.title))
        .map(|item| {
            format!(
                "https://www.youtube.com/watch?v={}",
                item.snippet.resource_id.video_id
            )
        })
}
