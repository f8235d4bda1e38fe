use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json,
    Router,
};
use runtime::{run_backtest, BacktestResult};
use serde::Serialize;
use tracing::{error, warn};

use crate::{state::AppState, ws};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/metadata", get(metadata))
        .route("/api/preview", get(preview))
        .route("/api/retro", get(retro))
        .route("/ws/stream", get(ws::stream_socket))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.health())
}

async fn metadata(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metadata())
}

async fn preview(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.preview())
}

async fn retro(
    State(state): State<AppState>,
) -> Result<Json<BacktestResult>, (StatusCode, Json<ErrorResponse>)> {
    let dataset = Arc::clone(state.dataset());
    let outcome = tokio::task::spawn_blocking(move || run_backtest(&dataset))
        .await
        .map_err(|err| {
            error!(error = %err, "backtest task failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "backtest task failed".to_string())
        })?;

    outcome.map(Json).map_err(|err| {
        warn!(error = %err, "backtest rejected dataset");
        failure(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    })
}

fn failure(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message }))
}
