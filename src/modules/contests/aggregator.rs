use crate::modules::contests::adapters::{all_sources, ContestSource};
use crate::types::tables::{Contest, ContestStatus};
use anyhow::Result;
use futures::future;
use sqlx::{postgres::Postgres, Pool};
use std::cmp::Ordering;

/// Runs all platform sources concurrently, merges whatever they returned,
/// applies the ordering policy and upserts into the `contests` table keyed
/// by `contest_id`.
pub struct ContestAggregator<'a> {
    pool: &'a Pool<Postgres>,
    sources: Vec<Box<dyn ContestSource>>,
}

/// Total ordering for client consumption: upcoming contests first (soonest
/// start leading), finished contests after (most recent start leading).
pub fn compare_contests(a: &Contest, b: &Contest) -> Ordering {
    match (a.contest_status, b.contest_status) {
        (ContestStatus::Upcoming, ContestStatus::Upcoming) => a.start_time.cmp(&b.start_time),
        (ContestStatus::Finished, ContestStatus::Finished) => b.start_time.cmp(&a.start_time),
        (ContestStatus::Upcoming, ContestStatus::Finished) => Ordering::Less,
        (ContestStatus::Finished, ContestStatus::Upcoming) => Ordering::Greater,
    }
}

/// Settles every source independently and concatenates the successful
/// batches. A result is collected per task so one failing source cannot
/// cancel its siblings; the failure is logged and contributes nothing.
async fn collect(sources: &[Box<dyn ContestSource>]) -> Vec<Contest> {
    let results = future::join_all(sources.iter().map(|source| source.fetch())).await;

    let mut contests = Vec::new();
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(batch) => contests.extend(batch),
            Err(e) => {
                tracing::error!("fetch from {} failed, skipping this run: {:?}", source.site(), e);
            }
        }
    }

    contests
}

impl<'a> ContestAggregator<'a> {
    pub fn new(pool: &'a Pool<Postgres>) -> Self {
        ContestAggregator {
            pool,
            sources: all_sources(),
        }
    }

    /// Upserts contests one by one. `youtube_link` is deliberately left out
    /// of the UPDATE column list so a link attached by the enrichment pass
    /// (or by an admin) survives subsequent aggregation runs. A failing row
    /// is logged and skipped; the rest of the batch still goes through.
    pub async fn save(&self, contests: &[Contest]) -> Result<()> {
        tracing::info!("Start to save {} contests.", contests.len());

        let mut saved = 0usize;
        for contest in contests.iter() {
            let result = sqlx::query(
                "
                MERGE INTO contests
                USING
                    (VALUES($1, $2::contest_site, $3, $4::timestamptz, $5, $6::contest_phase, $7)) AS incoming(contest_id, site, title, start_time, duration_hours, contest_status, url)
                ON
                    contests.contest_id = incoming.contest_id
                WHEN MATCHED THEN
                    UPDATE SET (site, title, start_time, duration_hours, contest_status, url, updated_at) = (incoming.site, incoming.title, incoming.start_time, incoming.duration_hours, incoming.contest_status, incoming.url, NOW())
                WHEN NOT MATCHED THEN
                    INSERT (contest_id, site, title, start_time, duration_hours, contest_status, url)
                    VALUES (incoming.contest_id, incoming.site, incoming.title, incoming.start_time, incoming.duration_hours, incoming.contest_status, incoming.url);
                ",
            )
            .bind(&contest.contest_id)
            .bind(contest.site)
            .bind(&contest.title)
            .bind(contest.start_time)
            .bind(contest.duration_hours)
            .bind(contest.contest_status)
            .bind(&contest.url)
            .execute(self.pool)
            .await;

            match result {
                Ok(_) => saved += 1,
                Err(e) => {
                    tracing::error!("an error occurred at saving {:?}: {}", contest.contest_id, e);
                }
            }
        }

        tracing::info!("{} of {} contests successfully saved.", saved, contests.len());

        Ok(())
    }

    /// One aggregation run: fetch all platforms, sort, upsert.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Start to aggregate contests from all platforms.");

        let mut contests = collect(&self.sources).await;
        contests.sort_by(compare_contests);

        self.save(&contests).await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::tables::Site;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    fn contest(id: &str, site: Site, status: ContestStatus, offset_hours: i64) -> Contest {
        let base = Utc.timestamp_opt(1_767_225_600, 0).unwrap();
        Contest {
            contest_id: id.to_string(),
            site,
            title: id.to_string(),
            start_time: base + Duration::hours(offset_hours),
            duration_hours: 2.0,
            contest_status: status,
            url: format!("https://example.com/{}", id),
            youtube_link: None,
        }
    }

    #[test]
    fn test_upcoming_sorted_ascending_by_start() {
        let a = contest("a", Site::Codeforces, ContestStatus::Upcoming, 1);
        let b = contest("b", Site::Codeforces, ContestStatus::Upcoming, 3);
        assert_eq!(compare_contests(&a, &b), Ordering::Less);
        assert_eq!(compare_contests(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_finished_sorted_descending_by_start() {
        let a = contest("a", Site::Leetcode, ContestStatus::Finished, -5);
        let b = contest("b", Site::Leetcode, ContestStatus::Finished, -2);
        assert_eq!(compare_contests(&a, &b), Ordering::Greater);
        assert_eq!(compare_contests(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_upcoming_precedes_finished_regardless_of_time() {
        let upcoming = contest("u", Site::Codechef, ContestStatus::Upcoming, 100);
        let finished = contest("f", Site::Codechef, ContestStatus::Finished, -1);
        assert_eq!(compare_contests(&upcoming, &finished), Ordering::Less);
        assert_eq!(compare_contests(&finished, &upcoming), Ordering::Greater);
    }

    #[test]
    fn test_merged_batch_orders_as_expected() {
        let mut contests = vec![
            contest("cf_1", Site::Codeforces, ContestStatus::Upcoming, 1),
            contest("cf_2", Site::Codeforces, ContestStatus::Finished, -2),
            contest("cc_1", Site::Codechef, ContestStatus::Upcoming, 3),
        ];

        contests.sort_by(compare_contests);

        let order: Vec<&str> = contests.iter().map(|c| c.contest_id.as_str()).collect();
        assert_eq!(order, vec!["cf_1", "cc_1", "cf_2"]);
    }

    struct StaticSource {
        site: Site,
        contests: Vec<Contest>,
    }

    #[async_trait]
    impl ContestSource for StaticSource {
        fn site(&self) -> Site {
            self.site
        }

        async fn fetch(&self) -> Result<Vec<Contest>> {
            Ok(self.contests.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ContestSource for FailingSource {
        fn site(&self) -> Site {
            Site::Leetcode
        }

        async fn fetch(&self) -> Result<Vec<Contest>> {
            Err(anyhow!("simulated upstream outage"))
        }
    }

    #[tokio::test]
    async fn test_one_failing_source_does_not_drop_the_others() {
        let sources: Vec<Box<dyn ContestSource>> = vec![
            Box::new(StaticSource {
                site: Site::Codeforces,
                contests: vec![contest("cf_1", Site::Codeforces, ContestStatus::Upcoming, 1)],
            }),
            Box::new(FailingSource),
            Box::new(StaticSource {
                site: Site::Codechef,
                contests: vec![contest("cc_1", Site::Codechef, ContestStatus::Finished, -1)],
            }),
        ];

        let contests = collect(&sources).await;

        let ids: Vec<&str> = contests.iter().map(|c| c.contest_id.as_str()).collect();
        assert_eq!(ids, vec!["cf_1", "cc_1"]);
    }
}
