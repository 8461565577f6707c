use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.uptime_secs(),
        "sessions": {
            "active": registry.len().await,
            "max": registry.limits().max_sessions,
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// 会话数已满时不再接收新流量
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let registry = state.registry();
    if registry.len().await < registry.limits().max_sessions {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
