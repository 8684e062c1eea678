use axum::{
    Json,
    extract::{State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
};
use tracing::debug;

use botwatch_db::is_foreign_key_violation;
use botwatch_db::models::{MessageWithAuthorRow, NewMessage};
use botwatch_types::api::{CreateMessageRequest, MessageListItem, MessageResponse};
use botwatch_types::coerce;

use crate::error::ApiError;
use crate::pagination::{DEFAULT_MESSAGE_LIMIT, ListQuery, resolve_limit};
use crate::{AppState, with_db};

pub async fn list_messages(
    State(state): State<AppState>,
    query: Result<ListQuery, QueryRejection>,
) -> Result<Json<Vec<MessageListItem>>, ApiError> {
    let limit = resolve_limit(query, DEFAULT_MESSAGE_LIMIT);
    let rows = with_db(&state, move |db| db.list_messages(limit)).await?;
    Ok(Json(rows.into_iter().map(to_list_item).collect()))
}

/// Stores a message reported by the bot.
///
/// The referenced user is not looked up first. When the store enforces
/// foreign keys, an unknown `user_id` is reported as a validation error;
/// otherwise the row is accepted and later listed without author names.
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = payload?;

    let user_id =
        coerce::positive_id(&req.user_id).ok_or_else(|| ApiError::validation("invalid user_id"))?;
    let text = coerce::trimmed_text(&req.text).ok_or_else(|| ApiError::validation("text is required"))?;

    let new_message = NewMessage {
        user_id,
        chat_id: coerce::optional_text(&req.chat_id),
        text,
    };

    let row = with_db(&state, move |db| db.create_message(new_message))
        .await
        .map_err(|err| match err {
            ApiError::Internal(e) if is_foreign_key_violation(&e) => {
                ApiError::validation("user_id does not reference an existing user")
            }
            other => other,
        })?;
    debug!("Stored message {} from user {}", row.id, row.user_id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            id: row.id,
            user_id: row.user_id,
            chat_id: row.chat_id,
            text: row.text,
            created_at: row.created_at,
        }),
    ))
}

fn to_list_item(row: MessageWithAuthorRow) -> MessageListItem {
    MessageListItem {
        id: row.id,
        user_id: row.user_id,
        text: row.text,
        chat_id: row.chat_id,
        created_at: row.created_at,
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
    }
}
