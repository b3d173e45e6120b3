//! Routes for the Session & Progress context and fixed-turn questions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use storytype_core::record::Side;
use storytype_narrative::application::command_handlers::{NextQuestion, handle_next_question};
use storytype_narrative::domain::commands::RequestNextQuestion;
use storytype_session::application::command_handlers;
use storytype_session::application::query_handlers::{
    self, PersonalityResultView, SessionView,
};
use storytype_session::domain::commands;
use storytype_session::domain::story::{CustomStoryConfig, ModeKind, StoryMode};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body naming a session.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// The session identifier.
    pub session_id: String,
}

/// Request body for POST /answer.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// The session identifier.
    pub session_id: String,
    /// `"A"` or `"B"`.
    pub choice: Side,
}

/// Request body for POST /switch-mode.
#[derive(Debug, Deserialize)]
pub struct SwitchModeRequest {
    /// The session identifier.
    pub session_id: String,
    /// `"fixed-turn"` or `"game-master"`.
    pub mode: ModeKind,
}

/// Request body for POST /story-mode.
#[derive(Debug, Deserialize)]
pub struct StoryModeRequest {
    /// The session identifier.
    pub session_id: String,
    /// The story setting.
    pub story_mode: StoryMode,
}

/// Request body for POST /custom-story.
#[derive(Debug, Deserialize)]
pub struct CustomStoryRequest {
    /// The session identifier.
    pub session_id: String,
    /// The user's story configuration.
    pub config: CustomStoryConfig,
}

/// POST /
#[instrument(skip(state))]
async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let command = commands::FindOrCreateSession {
        correlation_id: Uuid::new_v4(),
        session_id: Uuid::new_v4().to_string(),
    };

    info!(correlation_id = %command.correlation_id, session_id = %command.session_id, "handling create_session command");

    let session = command_handlers::handle_find_or_create(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(SessionView::from(&session))))
}

/// GET /{session_id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let view = query_handlers::get_session_by_id(&session_id, &*state.session_repository).await?;
    Ok(Json(view))
}

/// GET /{session_id}/result
#[instrument(skip(state))]
async fn get_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PersonalityResultView>, ApiError> {
    let view =
        query_handlers::get_personality_result(&session_id, &*state.session_repository).await?;
    Ok(Json(view))
}

/// POST /find-or-create
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn find_or_create(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::FindOrCreateSession {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling find_or_create command");

    let session = command_handlers::handle_find_or_create(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /answer
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn submit_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::SubmitAnswer {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        choice: request.choice,
    };

    info!(correlation_id = %command.correlation_id, choice = %command.choice, "handling submit_answer command");

    let session = command_handlers::handle_submit_answer(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /back
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn step_back(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::StepBack {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling step_back command");

    let session = command_handlers::handle_step_back(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /complete
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn complete(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::CompleteSession {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling complete command");

    let session = command_handlers::handle_complete(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /resume
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn resume(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::ResumeSession {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling resume command");

    let session = command_handlers::handle_resume(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /switch-mode
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn switch_mode(
    State(state): State<AppState>,
    Json(request): Json<SwitchModeRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::SwitchMode {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        mode: request.mode,
    };

    info!(correlation_id = %command.correlation_id, mode = %command.mode, "handling switch_mode command");

    let session = command_handlers::handle_switch_mode(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /story-mode
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn choose_story_mode(
    State(state): State<AppState>,
    Json(request): Json<StoryModeRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::ChooseStoryMode {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        story_mode: request.story_mode,
    };

    info!(correlation_id = %command.correlation_id, story_mode = %command.story_mode, "handling choose_story_mode command");

    let session = command_handlers::handle_choose_story_mode(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /custom-story
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn configure_custom_story(
    State(state): State<AppState>,
    Json(request): Json<CustomStoryRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::ConfigureCustomStory {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        config: request.config,
    };

    info!(correlation_id = %command.correlation_id, "handling configure_custom_story command");

    let session = command_handlers::handle_configure_custom_story(
        &command,
        state.clock.as_ref(),
        &*state.session_repository,
    )
    .await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /next-question
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn next_question(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<NextQuestion>, ApiError> {
    let command = RequestNextQuestion {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling next_question command");

    let next = handle_next_question(
        &command,
        &state.orchestrator,
        state.clock.as_ref(),
        &*state.rng,
        &*state.oracle,
        state.oracle_timeout,
        &*state.session_repository,
    )
    .await?;

    Ok(Json(next))
}

/// Returns the router for the session context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/find-or-create", post(find_or_create))
        .route("/answer", post(submit_answer))
        .route("/back", post(step_back))
        .route("/complete", post(complete))
        .route("/resume", post(resume))
        .route("/switch-mode", post(switch_mode))
        .route("/story-mode", post(choose_story_mode))
        .route("/custom-story", post(configure_custom_story))
        .route("/next-question", post(next_question))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/result", get(get_result))
}
