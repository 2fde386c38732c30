use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Scraping failed: {0}")]
    ScrapeFailed(String),

    #[error(transparent)]
    Core(#[from] ca_core::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, json!({"error": "Method not allowed"})),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({"error": "Unauthorized"})),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({"error": message})),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({"error": "Not found"})),
            ApiError::ScrapeFailed(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Scraping failed", "message": message}),
            ),
            ApiError::Core(e) => {
                error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal server error", "message": e.to_string()}),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
