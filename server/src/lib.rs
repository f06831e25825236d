use anyhow::Result;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::{extract::{Path, Query, State}, routing::get, Json, Router};
use search_core::persist::IndexPaths;
use search_core::{DocId, SearchHit, Searcher};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (status, Json(ErrorResponse { error: error.to_string() }))
}

/// The index is immutable once loaded, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<Searcher>,
}

pub fn build_app(index_dir: impl AsRef<FsPath>, snippet_chars: usize) -> Result<Router> {
    let index_dir = index_dir.as_ref();
    // a missing or corrupt index is fatal at startup
    let searcher = Searcher::open(&IndexPaths::new(index_dir))?.with_snippet_chars(snippet_chars);
    tracing::info!(index_dir = %index_dir.display(), num_docs = searcher.index().num_docs(), "index loaded");
    Ok(router(searcher))
}

/// Read-only CORS policy. `allowed` is a comma-separated origin list; unset
/// or empty allows any origin.
pub fn cors_layer(allowed: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed
        .into_iter()
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let layer = CorsLayer::new().allow_methods([Method::GET]).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn router(searcher: Searcher) -> Router {
    let cors = cors_layer(std::env::var("CORS_ALLOW_ORIGIN").ok().as_deref());
    let state = AppState { searcher: Arc::new(searcher) };
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let mut hits = state.searcher.search(&params.q).map_err(|err| {
        tracing::debug!(query = %params.q, %err, "rejected query");
        api_error(StatusCode::BAD_REQUEST, err)
    })?;
    let total_hits = hits.len();
    hits.truncate(params.k.clamp(1, 100));
    Ok(Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), total_hits, results: hits }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = state
        .searcher
        .index()
        .document(doc_id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "not found"))?;
    Ok(Json(serde_json::json!({
        "doc_id": doc.id,
        "title": doc.title,
        "url": doc.url,
        "heading": doc.heading,
        "text": doc.normalized_text,
    })))
}
