//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use storytype_core::clock::Clock;
use storytype_core::oracle::TextOracle;
use storytype_core::rng::DeterministicRng;
use storytype_narrative::domain::orchestrator::PhaseOrchestrator;
use storytype_store::pg_session_repository::PgSessionRepository;
use storytype_test_support::{FailingOracle, FixedClock, MockRng};
use tower::ServiceExt;

use storytype_api::routes;
use storytype_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router with a real `PgSessionRepository`, a
/// deterministic clock and RNG, and an oracle that always fails, so every
/// text comes from the fallback banks.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_oracle(pool, Arc::new(FailingOracle))
}

/// Build the full app router with a custom oracle.
pub fn build_test_app_with_oracle(pool: PgPool, oracle: Arc<dyn TextOracle>) -> Router {
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
    let app_state = AppState::new(
        fixed_clock(),
        rng,
        Arc::new(PgSessionRepository::new(pool)),
        oracle,
        Duration::from_secs(1),
        PhaseOrchestrator::default(),
    );

    routes::api_router().with_state(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
