use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use rep_counter::{Direction, Exercise};
use serde::Serialize;

use crate::response::ok;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseInfo {
    id: Exercise,
    name: &'static str,
    direction: Direction,
    target_angle: f64,
    threshold_angle: f64,
    advance_prompt: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_exercises))
}

/// Catalogue with the targets this deployment uses by default.
async fn list_exercises(State(state): State<AppState>) -> impl IntoResponse {
    let defaults = &state.config().exercises;
    let items: Vec<ExerciseInfo> = Exercise::ALL
        .iter()
        .map(|&exercise| {
            let config = defaults.config_for(exercise);
            ExerciseInfo {
                id: exercise,
                name: exercise.display_name(),
                direction: exercise.direction(),
                target_angle: config.target_angle,
                threshold_angle: config.threshold_angle,
                advance_prompt: exercise.advance_prompt(),
            }
        })
        .collect();
    ok(items)
}
