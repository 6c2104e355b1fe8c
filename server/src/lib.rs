use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tfidf_core::ingest::read_documents;
use tfidf_core::tokenizer::normalize_term;
use tfidf_core::{
    CorpusIndex, CorpusStats, DocId, DocumentScore, DocumentSummary, IngestReport, LoadedBatch, NewDocument,
    RawDocument, TermScore,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiResult<T> = Result<T, (StatusCode, String)>;

#[derive(Deserialize)]
pub struct TopParams {
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Deserialize)]
pub struct PreviewParams {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}
fn default_max_chars() -> usize { 200 }

#[derive(Serialize)]
pub struct PreviewResponse {
    pub id: DocId,
    pub name: String,
    pub preview: String,
}

#[derive(Serialize)]
pub struct TermResponse {
    pub term: String,
    pub document_frequency: u32,
    pub max_score: f64,
    pub scores: Vec<DocumentScore>,
}

#[derive(Serialize)]
pub struct TermScoreResponse {
    pub term: String,
    pub id: DocId,
    pub score: f64,
}

/// One corpus per process. Writers hold the write lock for the whole
/// add/remove plus recompute, so readers never see a half-built index.
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<RwLock<CorpusIndex>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(corpus: CorpusIndex, admin_token: Option<String>) -> Self {
        Self { corpus: Arc::new(RwLock::new(corpus)), admin_token }
    }
}

/// Build the app from the environment, optionally preloading documents from disk.
pub fn build_app(corpus_path: Option<&FsPath>) -> Result<Router> {
    let mut corpus = CorpusIndex::new();
    if let Some(path) = corpus_path {
        let report = corpus.add_batch(read_documents(path)?);
        tracing::info!(path = %path.display(), added = report.added.len(), skipped = report.skipped.len(), "preloaded corpus");
    }
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(build_router(AppState::new(corpus, admin_token)))
}

pub fn build_router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/stats", get(stats_handler))
        .route("/documents", get(list_handler).post(add_handler).delete(clear_handler))
        .route("/documents/:id", delete(remove_handler))
        .route("/documents/:id/top", get(top_handler))
        .route("/documents/:id/preview", get(preview_handler))
        .route("/documents/upload/:name", post(upload_handler))
        .route("/terms/:term", get(term_handler))
        .route("/terms/:term/documents/:id", get(term_score_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<CorpusStats> {
    Json(state.corpus.read().stats())
}

pub async fn list_handler(State(state): State<AppState>) -> Json<Vec<DocumentSummary>> {
    Json(state.corpus.read().list_documents())
}

pub async fn add_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(docs): Json<Vec<NewDocument>>,
) -> ApiResult<Json<IngestReport>> {
    authorize(&state, &headers)?;
    let report = state.corpus.write().add_batch(LoadedBatch { documents: docs, skipped: Vec::new() });
    Ok(Json(report))
}

pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<IngestReport>> {
    authorize(&state, &headers)?;
    let report = state.corpus.write().ingest([RawDocument::new(name, body.to_vec())]);
    Ok(Json(report))
}

pub async fn clear_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    state.corpus.write().clear();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<DocId>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    if state.corpus.write().remove_document(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

pub async fn top_handler(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    Query(params): Query<TopParams>,
) -> ApiResult<Json<Vec<TermScore>>> {
    let corpus = state.corpus.read();
    if corpus.document(id).is_none() {
        return Err(not_found(id));
    }
    let k = params.k.max(1).min(100);
    Ok(Json(corpus.top_terms(id, k)))
}

pub async fn preview_handler(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    Query(params): Query<PreviewParams>,
) -> ApiResult<Json<PreviewResponse>> {
    let corpus = state.corpus.read();
    let name = corpus.document(id).map(|d| d.name().to_string()).ok_or_else(|| not_found(id))?;
    let preview = corpus.document_preview(id, params.max_chars).ok_or_else(|| not_found(id))?;
    Ok(Json(PreviewResponse { id, name, preview }))
}

pub async fn term_handler(State(state): State<AppState>, Path(term): Path<String>) -> Json<TermResponse> {
    let corpus = state.corpus.read();
    Json(TermResponse {
        term: normalize_term(&term),
        document_frequency: corpus.document_frequency(&term),
        max_score: corpus.max_score(&term),
        scores: corpus.term_scores(&term),
    })
}

pub async fn term_score_handler(
    State(state): State<AppState>,
    Path((term, id)): Path<(String, DocId)>,
) -> ApiResult<Json<TermScoreResponse>> {
    let corpus = state.corpus.read();
    if corpus.document(id).is_none() {
        return Err(not_found(id));
    }
    let score = corpus.term_score(&term, id);
    Ok(Json(TermScoreResponse { term: normalize_term(&term), id, score }))
}

fn not_found(id: DocId) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("document {id} not found"))
}

/// Mutations need `X-ADMIN-TOKEN` when ADMIN_TOKEN is configured; otherwise they are open.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Ok(()),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
