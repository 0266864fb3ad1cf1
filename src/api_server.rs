// Axum API Server Module
//
// Purpose: JSON query API over the legal-code datasets, direct dataset file
// access, the categories config, the browser UI and static assets

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use anyhow::Context;

use crate::categories::CategoryConfig;
use crate::config::ServerConfig;
use crate::dataset::{DatasetCode, DatasetStore};
use crate::error::QueryError;
use crate::query_engine::{LawQuery, QueryEngine};
use crate::web::handlers::pages;

/// Headers every successful JSON API response carries
const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub query_engine: Arc<QueryEngine>,
    /// Loaded once at startup, shared read-only
    pub categories: Arc<CategoryConfig>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing dataset store at {}...", config.data_dir.display());
        let store = DatasetStore::new(&config.data_dir);

        tracing::info!("Loading categories config...");
        let categories = CategoryConfig::load(&config.categories_path)
            .context("categories config is required at startup")?;

        // A broken reference is reported but does not stop the server;
        // the affected dataset answers with a 500 until fixed.
        if let Err(e) = categories.validate(&store) {
            tracing::warn!("Categories config references a bad dataset: {}", e);
        }

        Ok(Self::from_parts(
            QueryEngine::new(store),
            categories,
            config.static_dir.clone(),
        ))
    }

    pub fn from_parts(engine: QueryEngine, categories: CategoryConfig, static_dir: PathBuf) -> Self {
        Self {
            query_engine: Arc::new(engine),
            categories: Arc::new(categories),
            static_dir,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Query API
        .route("/api", get(query_sections))
        .route("/api/", get(query_sections))
        .route("/api/categories", get(list_categories))
        // Direct dataset file access: /api/{code}.json
        .route("/api/:file", get(get_dataset_file))

        // Categories config (served from the startup cache)
        .route("/config/categories.json", get(get_categories_config))

        // Browser UI
        .route("/", get(pages::browse_page))
        .route("/browse", get(pages::browse_page))

        // Everything else: static assets
        .fallback_service(static_files)

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn query_sections(
    State(state): State<AppState>,
    query: Result<Query<LawQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|e| QueryError::Unhandled {
        code: "unknown".to_string(),
        message: e.body_text(),
    })?;

    let attempted = query.code.clone().unwrap_or_else(|| "unknown".to_string());

    // File read + linear scans stay off the async workers
    let engine = state.query_engine.clone();
    let envelope = tokio::task::spawn_blocking(move || engine.execute(&query))
        .await
        .map_err(|e| QueryError::Unhandled {
            code: attempted,
            message: format!("Task join error: {}", e),
        })??;

    Ok((CORS_HEADERS, Json(envelope)).into_response())
}

async fn get_dataset_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let stem = file
        .strip_suffix(".json")
        .ok_or_else(|| AppError::NotFound(format!("{} not found", file)))?;
    let code: DatasetCode = stem.parse()?;

    let store = state.query_engine.store();
    if !store.path_for(code).exists() {
        return Err(AppError::NotFound(format!("{} not found", file)));
    }
    let bytes = store.raw(code)?;

    Ok((
        CORS_HEADERS,
        [(header::CONTENT_TYPE, "application/json")],
        bytes,
    )
        .into_response())
}

async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    let categories: Vec<serde_json::Value> = state
        .categories
        .iter()
        .map(|(name, ids)| {
            let data_ids: Vec<serde_json::Value> = ids
                .iter()
                .map(|id| {
                    serde_json::json!({
                        "id": id,
                        "display_name": CategoryConfig::display_name(id),
                    })
                })
                .collect();
            serde_json::json!({ "name": name, "data_ids": data_ids })
        })
        .collect();

    (CORS_HEADERS, Json(serde_json::Value::Array(categories)))
}

async fn get_categories_config(State(state): State<AppState>) -> impl IntoResponse {
    (CORS_HEADERS, Json(state.categories.document().clone()))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub(crate) enum AppError {
    Query(QueryError),
    NotFound(String),
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        AppError::Query(e)
    }
}

impl AppError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            AppError::Query(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Query(e) => {
                if status.is_server_error() {
                    tracing::error!("API error for code {}: {}", e.code(), e);
                } else {
                    tracing::warn!("Rejected query: {}", e);
                }
                serde_json::json!({
                    "error": e.to_string(),
                    "code": e.code(),
                })
            }
            AppError::NotFound(msg) => serde_json::json!({ "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}
