use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use newsqa_core::{
    summarize_or_fallback, Document, EngineError, IndexOptions, JsonFileSource, RankedResult, SearchEngine,
    Summarizer, DEFAULT_K,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod llm;

pub use llm::{select_summarizer, ChatCompletionsSummarizer, LlmConfig};

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<RankedResult>,
}

#[derive(Deserialize)]
pub struct AskRequest {
    #[serde(default, alias = "pergunta")]
    pub question: Option<String>,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub results: Vec<RankedResult>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub num_docs: usize,
    pub num_terms: usize,
}

/// Error rendered as `{"error": "..."}` with the matching status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
    fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }
    fn unauthorized(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, message: message.into() }
    }
    fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        tracing::error!(error = %err, "search engine error");
        ApiError::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

pub struct ServerConfig {
    pub corpus: PathBuf,
    pub index: IndexOptions,
    pub default_k: usize,
    /// Build the index before serving; a load failure aborts startup.
    pub eager: bool,
    pub llm: LlmConfig,
    pub admin_token: Option<String>,
}

impl ServerConfig {
    pub fn new<P: Into<PathBuf>>(corpus: P) -> Self {
        Self {
            corpus: corpus.into(),
            index: IndexOptions::default(),
            default_k: DEFAULT_K,
            eager: true,
            llm: LlmConfig::default(),
            admin_token: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub summarizer: Arc<dyn Summarizer>,
    pub default_k: usize,
    pub admin_token: Option<String>,
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    let engine = Arc::new(SearchEngine::new(JsonFileSource::new(&config.corpus), config.index));
    if config.eager {
        engine
            .ensure_index_built()
            .with_context(|| format!("failed to build index from {}", config.corpus.display()))?;
    }
    let state = AppState {
        engine,
        summarizer: select_summarizer(&config.llm),
        default_k: config.default_k,
        admin_token: config.admin_token,
    };
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/ask", post(ask_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(cors_from_env())
        .layer(TraceLayer::new_for_http())
}

/// CORS from `CORS_ALLOW_ORIGIN` (comma-separated), any origin otherwise.
fn cors_from_env() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("worker failed: {e}")))?
        .map_err(ApiError::from)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.unwrap_or(state.default_k).min(MAX_K);
    let engine = Arc::clone(&state.engine);
    let query = params.q.clone();
    let mut results = run_blocking(move || engine.ensure_and_search(&query, usize::MAX)).await?;
    let total_hits = results.len();
    results.truncate(k);
    Ok(Json(SearchResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        total_hits,
        results,
    }))
}

pub async fn ask_handler(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = req.question.as_deref().map(str::trim).unwrap_or_default().to_string();
    if question.is_empty() {
        return Err(ApiError::bad_request("Please type a question."));
    }
    let engine = Arc::clone(&state.engine);
    let summarizer = Arc::clone(&state.summarizer);
    let k = state.default_k;
    let (answer, results) = run_blocking(move || {
        let results = engine.ensure_and_search(&question, k)?;
        let answer = summarize_or_fallback(summarizer.as_ref(), &question, &results);
        Ok((answer, results))
    })
    .await?;
    Ok(Json(AskResponse { answer, total: results.len(), results }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<u32>,
) -> Result<Json<Document>, ApiError> {
    let engine = Arc::clone(&state.engine);
    let snapshot = run_blocking(move || {
        engine.ensure_index_built()?;
        engine.snapshot()
    })
    .await?;
    snapshot
        .corpus()
        .get(doc_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("document {doc_id} not found")))
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<ReloadResponse>, ApiError> {
    authorize(&state, &headers)?;
    let engine = Arc::clone(&state.engine);
    let snapshot = run_blocking(move || engine.reload()).await?;
    let resp = ReloadResponse {
        num_docs: snapshot.corpus().len(),
        num_terms: snapshot.index().vocabulary().len(),
    };
    tracing::info!(num_docs = resp.num_docs, num_terms = resp.num_terms, "index reloaded");
    Ok(Json(resp))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError::unauthorized("ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::unauthorized("invalid admin token"))
    }
}
