// Simple Finance - Web Server
// JSON API over a single Session; a front end renders tables and charts.

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use simple_finance::{CategoryEdit, CategoryStore, Config, Error, Session};

/// Shared application state (one session per process)
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

/// Library error mapped onto an HTTP status
struct ApiError(Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::RowOutOfRange(_) => StatusCode::NOT_FOUND,
            Error::UnknownCategory(_) => StatusCode::UNPROCESSABLE_ENTITY,
            e if e.is_parse_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        error_response(status, self.0.to_string())
    }
}

#[derive(Serialize)]
struct UploadResponse {
    debits: usize,
    credits: usize,
}

#[derive(Deserialize)]
struct NewCategory {
    name: String,
}

#[derive(Deserialize)]
struct Recategorize {
    category: String,
}

#[derive(Deserialize)]
struct ApplyEdits {
    edits: Vec<CategoryEdit>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// POST /api/upload - Load a statement CSV (request body)
async fn upload(State(state): State<AppState>, body: String) -> Response {
    let mut session = state.session.lock().await;

    match session.load_csv(body.as_bytes()) {
        Ok(()) => ApiResponse::ok(UploadResponse {
            debits: session.debits().len(),
            credits: session.credits().len(),
        }),
        Err(e) => {
            tracing::info!("Rejected upload: {e}");
            error_response(StatusCode::BAD_REQUEST, format!("Error processing csv file: {e}"))
        }
    }
}

/// GET /api/debits - Expense rows (index = row number for edits)
async fn get_debits(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    ApiResponse::ok(session.debits())
}

/// GET /api/credits - Payment rows
async fn get_credits(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    ApiResponse::ok(session.credits())
}

/// GET /api/categories - Category → keywords, in store order
async fn get_categories(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    ApiResponse::ok(session.store().to_map())
}

/// POST /api/categories - Create a category
async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<NewCategory>,
) -> Result<Response, ApiError> {
    let mut session = state.session.lock().await;
    let created = session.create_category(&request.name)?;
    Ok(ApiResponse::ok(serde_json::json!({ "created": created })))
}

/// POST /api/debits/:row/category - Re-categorize one expense row
async fn recategorize(
    State(state): State<AppState>,
    Path(row): Path<usize>,
    Json(request): Json<Recategorize>,
) -> Result<Response, ApiError> {
    let mut session = state.session.lock().await;
    let changed = session.recategorize(row, &request.category)?;
    Ok(ApiResponse::ok(serde_json::json!({ "changed": changed })))
}

/// POST /api/debits/apply - Apply a batch of edits
async fn apply_edits(
    State(state): State<AppState>,
    Json(request): Json<ApplyEdits>,
) -> Result<Response, ApiError> {
    let mut session = state.session.lock().await;
    let changed = session.apply_edits(&request.edits)?;
    Ok(ApiResponse::ok(serde_json::json!({ "changed": changed })))
}

/// GET /api/summary - Expense breakdown and total payments
async fn get_summary(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    ApiResponse::ok(session.summary())
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload))
        .route("/debits", get(get_debits))
        .route("/debits/apply", post(apply_edits))
        .route("/debits/:row/category", post(recategorize))
        .route("/credits", get(get_credits))
        .route("/categories", get(get_categories).post(create_category))
        .route("/summary", get(get_summary))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[derive(Parser)]
#[command(name = "simple-finance-server", version, about = "JSON API for statement categorization")]
struct ServerCli {
    #[command(flatten)]
    config: Config,

    /// Address to listen on
    #[arg(long, env = "SIMPLE_FINANCE_ADDR", default_value = "0.0.0.0:3000")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = ServerCli::parse();

    let store = CategoryStore::load(cli.config.backend()).with_context(|| {
        format!(
            "Failed to load categories from {}",
            cli.config.categories_path.display()
        )
    })?;

    let state = AppState {
        session: Arc::new(Mutex::new(Session::new(store))),
    };

    let listener = tokio::net::TcpListener::bind(&cli.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", cli.addr))?;

    tracing::info!("Server running on http://{}", cli.addr);
    axum::serve(listener, build_router(state))
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
