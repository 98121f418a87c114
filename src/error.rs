use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ErrorResponse;

pub const NOT_FOUND_MESSAGE: &str = "Bookmark doesn't exist";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Everything a bookmark handler can fail with.
///
/// Only the first two are the client's fault. `Store` wraps whatever the
/// database layer returned; its details go to the log, never to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    pub fn missing_field(field: &str) -> Self {
        ApiError::Validation(format!("Missing '{}' in request body", field))
    }

    pub fn invalid_field(field: &str) -> Self {
        ApiError::Validation(format!("Invalid '{}' in request body", field))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Validation(msg) => msg.as_str(),
            ApiError::NotFound => NOT_FOUND_MESSAGE,
            ApiError::Store(e) => {
                tracing::error!(error = %crate::unpack_error(&**e), "store call failed");
                INTERNAL_MESSAGE
            }
        };

        (self.status(), Json(ErrorResponse::new_from_msg(message))).into_response()
    }
}
