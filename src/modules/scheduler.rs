use crate::modules::{contests::aggregator::ContestAggregator, solutions::enricher::SolutionEnricher};
use sqlx::{postgres::Postgres, Pool};
use tokio::{
    task::JoinHandle,
    time::{self, Duration, Instant, MissedTickBehavior},
};

pub const AGGREGATION_PERIOD: Duration = Duration::from_secs(2 * 60 * 60);
pub const ENRICHMENT_PERIOD: Duration = Duration::from_secs(6 * 60 * 60);
/// Long enough for the startup aggregation run to likely have finished, so
/// the first enrichment pass sees fresh finished contests.
pub const ENRICHMENT_STARTUP_DELAY: Duration = Duration::from_secs(25);

/// Recurring aggregation trigger owned by the process for its lifetime.
/// The first tick fires immediately. A run's failure is logged and the
/// timer keeps going; forced runs triggered from the API race this timer
/// without coordination, which the idempotent upsert makes harmless.
pub fn start_aggregation(pool: Pool<Postgres>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = time::interval(AGGREGATION_PERIOD);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            tracing::info!("Start scheduled contest aggregation.");

            let aggregator = ContestAggregator::new(&pool);
            match aggregator.run().await {
                Ok(_) => tracing::info!("Scheduled contest aggregation completed."),
                Err(e) => tracing::error!("scheduled contest aggregation failed: {:?}", e),
            }
        }
    })
}

/// Recurring enrichment trigger, independent of the aggregation timer.
pub fn start_enrichment(pool: Pool<Postgres>, api_key: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = time::interval_at(
            Instant::now() + ENRICHMENT_STARTUP_DELAY,
            ENRICHMENT_PERIOD,
        );
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            tracing::info!("Start scheduled video link enrichment.");

            let enricher = SolutionEnricher::new(&pool, api_key.clone());
            match enricher.run().await {
                Ok(_) => tracing::info!("Scheduled video link enrichment completed."),
                Err(e) => tracing::error!("scheduled video link enrichment failed: {:?}", e),
            }
        }
    })
}
