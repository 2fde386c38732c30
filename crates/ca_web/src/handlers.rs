use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use ca_core::deadlines::{next_deadline, Countdown};
use ca_core::{Category, DeadlineEvent, Source, UpdateQuery, UpdateRecord};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

pub const MAX_UPDATES_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatesParams {
    pub category: Option<String>,
    pub source: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourcesParams {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NextDeadline {
    pub event: DeadlineEvent,
    pub countdown: Countdown,
}

#[derive(Debug, Serialize)]
pub struct DeadlinesResponse {
    pub events: Vec<DeadlineEvent>,
    pub next: Option<NextDeadline>,
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ApiError> {
    match raw.map(str::trim).filter(|c| !c.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Unknown category: {}", raw))),
        None => Ok(None),
    }
}

fn authorized(headers: &HeaderMap, secret: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == secret)
}

pub async fn trigger_scrape(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScrapeResponse>, ApiError> {
    if let Some(secret) = state.cron_secret.as_deref() {
        if !authorized(&headers, secret) {
            warn!("rejected scrape trigger without a valid token");
            return Err(ApiError::Unauthorized);
        }
    }

    info!("scrape triggered over http");
    let report = state
        .manager
        .run_all()
        .await
        .map_err(|e| ApiError::ScrapeFailed(e.to_string()))?;

    Ok(Json(ScrapeResponse {
        success: true,
        count: report.processed,
    }))
}

pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<ChatResponse>, ApiError> {
    let message = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;

    let response = state.assistant.reply(&message).await;
    Ok(Json(ChatResponse { response }))
}

pub async fn list_updates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UpdatesParams>,
) -> Result<Json<Vec<UpdateRecord>>, ApiError> {
    let query = UpdateQuery {
        category: parse_category(params.category.as_deref())?,
        source: params.source.filter(|s| !s.is_empty()),
        search: params.q,
        limit: Some(params.limit.unwrap_or(ca_core::storage::DEFAULT_QUERY_LIMIT).min(MAX_UPDATES_LIMIT)),
    };
    Ok(Json(state.storage().query(&query).await?))
}

pub async fn get_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UpdateRecord>, ApiError> {
    state.storage().get(&id).await?.map(Json).ok_or(ApiError::NotFound)
}

pub async fn list_sources(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SourcesParams>,
) -> Result<Json<Vec<Source>>, ApiError> {
    let category = parse_category(params.category.as_deref())?;
    let registry = state.registry();
    let sources = registry
        .sources()
        .iter()
        .chain(std::iter::once(registry.exam_board()))
        .filter(|s| category.map_or(true, |c| s.category == c))
        .cloned()
        .collect();
    Ok(Json(sources))
}

pub async fn deadlines(State(state): State<Arc<AppState>>) -> Json<DeadlinesResponse> {
    let now = Utc::now();
    let events = state.registry().deadlines();
    let next = next_deadline(events, now).and_then(|event| {
        let countdown = Countdown::until(event.deadline?, now)?;
        Some(NextDeadline {
            event: event.clone(),
            countdown,
        })
    });
    Json(DeadlinesResponse {
        events: events.to_vec(),
        next,
    })
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
