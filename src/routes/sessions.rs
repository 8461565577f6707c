use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use rep_counter::{Exercise, ExerciseConfig, Landmark};
use serde::Deserialize;
use uuid::Uuid;

use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRequest {
    pub exercise: String,
    pub target_angle: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRequest {
    pub sequence: Option<u64>,
    pub landmarks: Vec<Option<Landmark>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRequest {
    pub target_angle: f64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/:id", get(get_session).delete(end_session))
        .route("/:id/frames", post(submit_frame))
        .route("/:id/reset", post(reset_session))
        .route("/:id/exercise", put(switch_exercise))
        .route("/:id/target", put(set_target))
}

/// Resolves an exercise request against the configured defaults and rejects
/// targets that would leave the counter unable to complete a rep.
fn resolve_config(state: &AppState, req: &ExerciseRequest) -> Result<ExerciseConfig, AppError> {
    let exercise: Exercise = req.exercise.parse()?;
    let config = match req.target_angle {
        Some(target) => ExerciseConfig::with_target(exercise, target),
        None => state.config().exercises.config_for(exercise),
    };
    config.validate()?;
    Ok(config)
}

async fn create_session(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = resolve_config(&state, &req)?;
    let snapshot = state.registry().create(config).await?;
    Ok(created(snapshot))
}

async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    ok(state.registry().list().await)
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.registry().get(id).await?))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.registry().remove(id).await?))
}

async fn submit_frame(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<FrameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .registry()
        .process_frame(id, req.sequence, &req.landmarks)
        .await?;
    Ok(ok(outcome))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<ResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.registry().reset(id, req.count).await?))
}

async fn switch_exercise(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<ExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = resolve_config(&state, &req)?;
    Ok(ok(state.registry().switch_exercise(id, config).await?))
}

async fn set_target(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<TargetRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state
        .registry()
        .set_target_angle(id, req.target_angle)
        .await?))
}
