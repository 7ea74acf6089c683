//! Ops escrow service: entry point.
//!
//! Hosts one escrow registry behind a single-writer lock, rebuilds it from
//! the SQLite command log at start-up, and exposes a small Axum REST API
//! for submitting commands and querying projects.

mod api;
mod config;
mod db;
mod errors;
mod events;
mod registry;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use registry::RegistryState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    let registry_config = config
        .registry_config()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    // ─── Registry ─────────────────────────────────────────
    info!(
        "Escrow registry starting: admin {}, custody {}",
        config.admin, config.contract_address
    );
    let registry = RegistryState::restore(registry_config, pool).await?;

    // ─── REST API ─────────────────────────────────────────
    let api_state = Arc::new(api::ApiState { registry });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/commands", post(api::post_command))
        .route("/projects/:id", get(api::get_project))
        .route("/projects/:id/royalty", get(api::get_royalty))
        .route("/projects/:id/submissions", get(api::get_project_submissions))
        .route("/projects/:id/events", get(api::get_project_events))
        .route("/creators/:address/projects", get(api::get_creator_projects))
        .route("/creators/:address/open-count", get(api::get_creator_open_count))
        .route("/submitters/:address/projects", get(api::get_submitter_projects))
        .route(
            "/submitters/:address/projects/:id/submissions",
            get(api::get_submitter_submissions),
        )
        .route("/accounts/:address/balance", get(api::get_account_balance))
        .route("/accounts/:address/tokens", get(api::get_account_tokens))
        .route("/stats", get(api::get_stats))
        .route("/events", get(api::get_all_events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(api_state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
