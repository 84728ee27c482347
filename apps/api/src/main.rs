mod auth;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::InferenceClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{GenerationStore, InMemoryStore, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JD Generation API v{}", env!("CARGO_PKG_VERSION"));

    // Provider settings are mandatory: refuse to start without them.
    let inference = InferenceClient::new(config.inference())?;
    info!(
        "Inference client initialized (model: {}, timeout: {}s)",
        inference.model(),
        config.inference_timeout_secs
    );

    let store: Arc<dyn GenerationStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; generation records are kept in memory only");
            Arc::new(InMemoryStore::new())
        }
    };

    if config.api_token.is_none() {
        warn!("JDGEN_API_TOKEN not set; /jdgen/ accepts unauthenticated requests");
    }

    let state = AppState {
        store,
        inference: Arc::new(inference),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
