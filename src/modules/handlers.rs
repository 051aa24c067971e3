use crate::modules::contests::aggregator::{compare_contests, ContestAggregator};
use crate::types::tables::Contest;
use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::Postgres, Pool};
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct ContestListResponse {
    pub success: bool,
    pub contests: Vec<Contest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContestListResponse {
    fn ok(contests: Vec<Contest>) -> Self {
        Self {
            success: true,
            contests,
            message: None,
        }
    }

    fn error(message: impl ToString) -> Self {
        Self {
            success: false,
            contests: Vec::new(),
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn new(success: bool, message: impl ToString) -> Self {
        Self {
            success,
            message: message.to_string(),
        }
    }
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(Extension(pool): Extension<Pool<Postgres>>) -> StatusCode {
    match sqlx::query("SELECT 1;").execute(&pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Full current snapshot in display order. No pagination; the client does
/// all filtering locally.
pub async fn list_contests(
    Extension(pool): Extension<Pool<Postgres>>,
) -> (StatusCode, Json<ContestListResponse>) {
    let result: Result<Vec<Contest>, sqlx::Error> = sqlx::query_as(
        "
        SELECT contest_id, site, title, start_time, duration_hours, contest_status, url, youtube_link
        FROM contests;
        ",
    )
    .fetch_all(&pool)
    .await;

    match result {
        Ok(mut contests) => {
            contests.sort_by(compare_contests);
            (StatusCode::OK, Json(ContestListResponse::ok(contests)))
        }
        Err(e) => {
            tracing::error!("failed to fetch contests from database: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContestListResponse::error("failed to fetch contests")),
            )
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddSolutionPayload {
    #[validate(length(min = 1))]
    pub contest_id: String,
    #[validate(url)]
    pub youtube_link: String,
}

#[derive(Debug, Error)]
pub enum SolutionLinkError {
    #[error("contest not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Unconditional overwrite, unlike the enrichment pass which only fills
/// absent links.
async fn attach_solution_link(
    pool: &Pool<Postgres>,
    payload: &AddSolutionPayload,
) -> Result<(), SolutionLinkError> {
    let result = sqlx::query(
        "
        UPDATE contests
        SET youtube_link = $1, updated_at = NOW()
        WHERE contest_id = $2;
        ",
    )
    .bind(&payload.youtube_link)
    .bind(&payload.contest_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(SolutionLinkError::NotFound);
    }

    Ok(())
}

pub async fn add_solution(
    Extension(pool): Extension<Pool<Postgres>>,
    Json(payload): Json<AddSolutionPayload>,
) -> (StatusCode, Json<MessageResponse>) {
    if let Err(rejection) = payload.validate() {
        tracing::error!("Validation error: {}", rejection);
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::new(
                false,
                format!("Validation error: [{}]", rejection).replace('\n', ", "),
            )),
        );
    }

    match attach_solution_link(&pool, &payload).await {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new(true, "YouTube link added successfully.")),
        ),
        Err(SolutionLinkError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(MessageResponse::new(false, "Contest not found.")),
        ),
        Err(SolutionLinkError::Database(e)) => {
            tracing::error!("failed to attach solution link: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse::new(false, "failed to attach solution link")),
            )
        }
    }
}

/// Out-of-band aggregation trigger. The run is spawned and races any
/// in-flight periodic run to completion; no coordination is attempted.
pub async fn force_refresh(
    Extension(pool): Extension<Pool<Postgres>>,
) -> (StatusCode, Json<MessageResponse>) {
    tokio::spawn(async move {
        let aggregator = ContestAggregator::new(&pool);
        match aggregator.run().await {
            Ok(_) => tracing::info!("Forced contest aggregation completed."),
            Err(e) => tracing::error!("forced contest aggregation failed: {:?}", e),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(true, "Contest refresh started.")),
    )
}
