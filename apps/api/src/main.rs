mod auth;
mod campaigns;
mod chat;
mod config;
mod dashboard;
mod db;
mod demos;
mod errors;
mod inference_client;
mod ingest;
mod models;
mod profiles;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::AuthClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::inference_client::InferenceClient;
use crate::ingest::store::PgCandidateStore;
use crate::ingest::validator::ColumnPolicy;
use crate::ingest::IngestionRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AdmitConnect API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Auth provider used to resolve bearer tokens into sessions
    let auth = AuthClient::new(config.auth_url.clone(), config.auth_api_key.clone());
    info!("Auth client initialized ({})", config.auth_url);

    // Initialize inference client
    let inference = InferenceClient::new(
        config.inference_api_token.clone(),
        config.inference_model_url.clone(),
    );
    info!("Inference client initialized (model: {})", inference.model());

    // Candidate ingestion: Postgres bulk insert behind the store trait
    let candidate_store = Arc::new(PgCandidateStore::new(db.clone()));
    let policy = ColumnPolicy::from_strict_flag(config.ingest_strict_columns);
    info!("CSV column policy: {policy:?}");
    let ingestion = IngestionRegistry::new(policy);

    let state = AppState {
        db,
        auth,
        inference,
        candidate_store,
        ingestion,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the dashboard host once it has a fixed domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
