//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod game_master;
pub mod health;
pub mod session;

/// The full route tree, shared by the server binary and integration tests.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/sessions", session::router())
        .nest("/api/v1/game-master", game_master::router())
}
