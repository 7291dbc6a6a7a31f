//! HTTP read API over the cached generations.

use crate::core::{CacheManager, EnrichedNavRecord, MetadataProvider, SchemeDetails};
use crate::pipeline::amc::amc_prefixes;
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

pub const DEFAULT_HISTORY_LIMIT: usize = 70;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("NAV data is not ready yet, please try again later")]
    NotReady,
    #[error("Upstream data source is unavailable, please try again later")]
    Upstream,
    #[error("Invalid scheme code: {0}")]
    InvalidSchemeCode(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
            ApiError::InvalidSchemeCode(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    cache: Arc<CacheManager>,
    metadata: Arc<dyn MetadataProvider>,
}

impl AppState {
    pub fn new(cache: Arc<CacheManager>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self { cache, metadata }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/fetch-mf-data", get(fetch_mf_data))
        .route("/amc-prefixes", get(list_amc_prefixes))
        .route("/mf/{code}/history", get(scheme_history))
        .with_state(state)
}

/// CORS for the configured origin, or any origin when none is set.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::very_permissive());
    };
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {origin}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET])
        .allow_credentials(true))
}

async fn fetch_mf_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrichedNavRecord>>, ApiError> {
    let records = state.cache.enriched().await;
    if records.is_empty() {
        debug!("Enriched cache empty, reporting not ready");
        return Err(ApiError::NotReady);
    }
    Ok(Json(records.to_vec()))
}

async fn list_amc_prefixes(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let records = state.cache.cleaned().await;
    if records.is_empty() {
        return Err(ApiError::NotReady);
    }
    let prefixes = amc_prefixes(records.iter().map(|r| r.scheme_name.as_str()));
    Ok(Json(prefixes.into_iter().collect()))
}

/// AMFI scheme codes are purely numeric.
fn is_scheme_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn scheme_history(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<SchemeDetails>, ApiError> {
    if !is_scheme_code(&code) {
        debug!(scheme_code = %code, "Rejecting malformed scheme code");
        return Err(ApiError::InvalidSchemeCode(code));
    }
    let details = state.metadata.fetch_metadata(&code).await.map_err(|e| {
        warn!(scheme_code = %code, error = %e, "Scheme history lookup failed");
        ApiError::Upstream
    })?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(details.truncate_history(limit)))
}
