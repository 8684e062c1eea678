use std::any::Any;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use botwatch_types::api::ErrorResponse;

/// Body sent for every 500. Internal details only go to the log.
const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input. Reported to the client as-is.
    #[error("{0}")]
    Validation(String),
    #[error("route not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => {
                debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "route not found".to_string()),
            ApiError::Internal(err) => {
                error!("Unhandled error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Fallback for anything under `/api` that no route matches.
pub async fn api_not_found() -> ApiError {
    ApiError::NotFound
}

/// Turns a handler panic into the same generic 500 as any other internal error.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "non-string panic payload"
    };
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: INTERNAL_MESSAGE.to_string(),
        }),
    )
        .into_response()
}
