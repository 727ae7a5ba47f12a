mod body;
mod config;
mod dashboard;
mod db;
mod errors;
mod llm_client;
mod models;
mod nutrition;
mod recovery;
mod routes;
mod state;
mod workouts;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{CompletionProvider, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fitlog API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize the AI client; food parsing falls back to history without it
    let completion = build_completion_provider(&config)?;

    let state = AppState {
        db,
        completion,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_completion_provider(config: &Config) -> Result<Option<Arc<dyn CompletionProvider>>> {
    let Some((account_id, api_token)) = config.ai_credentials() else {
        warn!("Cloudflare credentials not set; food parsing will use history matching only");
        return Ok(None);
    };

    let client = LlmClient::new(
        account_id,
        api_token,
        &config.cloudflare_ai_model,
        Duration::from_secs(config.ai_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", client.model());
    Ok(Some(Arc::new(client)))
}
