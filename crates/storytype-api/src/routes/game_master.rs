//! Routes for the Game-Master Narrative context.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use storytype_core::record::Side;
use storytype_game_master::application::command_handlers::{
    self, ChoiceOutcome, EndingOutcome, SceneOutcome,
};
use storytype_game_master::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /scene and POST /ending.
#[derive(Debug, Deserialize)]
pub struct StoryRequest {
    /// The session identifier.
    pub session_id: String,
}

/// Request body for POST /choice.
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    /// The session identifier.
    pub session_id: String,
    /// `"A"` or `"B"`.
    pub choice: Side,
}

/// POST /scene
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn generate_scene(
    State(state): State<AppState>,
    Json(request): Json<StoryRequest>,
) -> Result<Json<SceneOutcome>, ApiError> {
    let command = commands::GenerateScene {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling generate_scene command");

    let outcome = command_handlers::handle_generate_scene(
        &command,
        state.clock.as_ref(),
        &*state.rng,
        &*state.oracle,
        state.oracle_timeout,
        &*state.session_repository,
    )
    .await?;

    Ok(Json(outcome))
}

/// POST /choice
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn record_choice(
    State(state): State<AppState>,
    Json(request): Json<ChoiceRequest>,
) -> Result<Json<ChoiceOutcome>, ApiError> {
    let command = commands::RecordChoice {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        choice: request.choice,
    };

    info!(correlation_id = %command.correlation_id, choice = %command.choice, "handling record_choice command");

    let outcome = command_handlers::handle_record_choice(
        &command,
        state.clock.as_ref(),
        &*state.oracle,
        state.oracle_timeout,
        &*state.session_repository,
    )
    .await?;

    Ok(Json(outcome))
}

/// POST /ending
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn generate_ending(
    State(state): State<AppState>,
    Json(request): Json<StoryRequest>,
) -> Result<Json<EndingOutcome>, ApiError> {
    let command = commands::GenerateEnding {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling generate_ending command");

    let outcome = command_handlers::handle_generate_ending(
        &command,
        state.clock.as_ref(),
        &*state.oracle,
        state.oracle_timeout,
        &*state.session_repository,
    )
    .await?;

    Ok(Json(outcome))
}

/// Returns the router for the game-master context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scene", post(generate_scene))
        .route("/choice", post(record_choice))
        .route("/ending", post(generate_ending))
}
