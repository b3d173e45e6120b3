//! Storytype API server entry point.

use std::sync::{Arc, Mutex};

use sqlx::postgres::PgPoolOptions;
use storytype_api::config::AppConfig;
use storytype_api::error::AppError;
use storytype_api::routes;
use storytype_api::state::AppState;
use storytype_api::telemetry;
use storytype_core::clock::{Clock, SystemClock};
use storytype_core::oracle::{DisabledOracle, TextOracle};
use storytype_core::rng::{DeterministicRng, StdDeterministicRng};
use storytype_narrative::domain::orchestrator::PhaseOrchestrator;
use storytype_oracle::ChatCompletionsOracle;
use storytype_store::pg_session_repository::PgSessionRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let telemetry = telemetry::init()?;

    tracing::info!("Starting Storytype API server");

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr()?;

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let oracle: Arc<dyn TextOracle> = match config.oracle_settings() {
        Some(settings) => {
            tracing::info!(
                model = %settings.model,
                base_url = %settings.base_url,
                "text oracle enabled"
            );
            let oracle = ChatCompletionsOracle::new(settings)
                .map_err(|e| AppError::Config(format!("invalid oracle settings: {e}")))?;
            Arc::new(oracle)
        }
        None => {
            tracing::warn!("ORACLE_API_KEY not set; serving fallback content only");
            Arc::new(DisabledOracle)
        }
    };

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(StdDeterministicRng::from_entropy()));
    let app_state = AppState::new(
        clock,
        rng,
        Arc::new(PgSessionRepository::new(pool)),
        oracle,
        config.oracle_timeout,
        PhaseOrchestrator::new(config.arc_length),
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::api_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    telemetry.shutdown();
    Ok(())
}
