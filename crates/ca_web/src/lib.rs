use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route(
            "/api/scrape",
            post(handlers::trigger_scrape).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/chat",
            post(handlers::chat).fallback(handlers::method_not_allowed),
        )
        .route("/api/updates", get(handlers::list_updates))
        .route("/api/updates/:id", get(handlers::get_update))
        .route("/api/sources", get(handlers::list_sources))
        .route("/api/deadlines", get(handlers::deadlines))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, ApiError, AppState};
    pub use ca_core::{Error, Result};
}
