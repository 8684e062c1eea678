use axum::{
    Json,
    extract::{State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
};
use tracing::debug;

use botwatch_db::models::{NewUser, UserRow};
use botwatch_types::api::{CreateUserRequest, UserResponse};
use botwatch_types::coerce;

use crate::error::ApiError;
use crate::pagination::{DEFAULT_USER_LIMIT, ListQuery, resolve_limit};
use crate::{AppState, with_db};

/// GET /api/users: newest users first.
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<ListQuery, QueryRejection>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let limit = resolve_limit(query, DEFAULT_USER_LIMIT);
    let rows = with_db(&state, move |db| db.list_users(limit)).await?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// POST /api/users: registers a bot user and echoes the stored row.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(req) = payload?;

    let telegram_id = coerce::positive_id(&req.telegram_id)
        .ok_or_else(|| ApiError::validation("invalid telegram_id"))?;

    let new_user = NewUser {
        telegram_id,
        username: coerce::optional_text(&req.username),
        first_name: coerce::optional_text(&req.first_name),
        last_name: coerce::optional_text(&req.last_name),
    };

    let row = with_db(&state, move |db| db.create_user(new_user)).await?;
    debug!("Created user {} (telegram_id {})", row.id, row.telegram_id);

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

fn to_response(row: UserRow) -> UserResponse {
    UserResponse {
        id: row.id,
        telegram_id: row.telegram_id,
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        created_at: row.created_at,
    }
}
