use axum::{Json, extract::State};

use botwatch_types::api::{HealthResponse, StatsResponse};

use crate::error::ApiError;
use crate::{AppState, with_db};

/// Aggregates are recomputed on every call; nothing is cached.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = with_db(&state, |db| db.stats()).await?;

    Ok(Json(StatsResponse {
        users: stats.users,
        messages: stats.messages,
        last_message_at: stats.last_message_at,
    }))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    with_db(&state, |db| db.ping()).await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}
