//! HTTP API for quotes, swap status and health

use crate::config::ServerConfig;
use crate::error::{SwapError, SwapResult};
use crate::quote::QuoteRequest;
use crate::service::SwapSimulator;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<SwapSimulator>,
}

/// Build the API router
pub fn router(simulator: Arc<SwapSimulator>) -> Router {
    let state = AppState { simulator };

    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/v0/tokens", get(get_tokens))
        .route("/v0/quote", post(request_quote))
        .route("/v0/status/:quote_id", get(get_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP API server
pub async fn run_server(config: ServerConfig, simulator: Arc<SwapSimulator>) -> SwapResult<()> {
    let app = router(simulator);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SwapError::Internal(format!("bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| SwapError::Internal(e.to_string()))?;

    Ok(())
}

/// Health check endpoint - basic liveness
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Swap counts by status
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.simulator.store().stats())
}

/// Asset registry listing
async fn get_tokens(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.simulator.registry().list())
}

async fn request_quote(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError {
        status: StatusCode::BAD_REQUEST,
        error: "validation_error",
        message: e.body_text(),
    })?;

    let response = state.simulator.request_quote(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_status(
    State(state): State<AppState>,
    Path(quote_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.simulator.get_swap_status(&quote_id)?;
    Ok(Json(status))
}

/// Error body returned by every failing endpoint
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl From<SwapError> for ApiError {
    fn from(err: SwapError) -> Self {
        Self {
            status: StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            error: err.kind(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.error.to_string(),
                message: self.message,
            }),
        )
            .into_response()
    }
}

// Response types

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}
