mod analysis;
mod config;
mod db;
mod embedding;
mod errors;
mod interview;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
mod vector;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::{EmbeddingBackend, EmbeddingService, HashingEmbedder, HttpEmbedder};
use crate::interview::{spawn_report_worker, EventPublisher};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;
use crate::vector::JobIndex;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireFlow API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize embedding backend
    let backend: Arc<dyn EmbeddingBackend> = match &config.embedding_api_url {
        Some(url) => Arc::new(HttpEmbedder::new(
            url,
            config.embedding_api_key.clone(),
            config.embedding_model.clone(),
            config.embedding_dim,
        )?),
        None => Arc::new(HashingEmbedder::new(config.embedding_dim)),
    };
    let embeddings = EmbeddingService::new(backend);
    info!(
        "Embedding backend initialized (model: {}, dims: {})",
        embeddings.model_name(),
        embeddings.dimensions()
    );

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
        config.llm_max_retries,
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state and the interview report worker
    let (events, receiver) = EventPublisher::channel();
    let state = AppState::new(store, Arc::new(llm), embeddings, events);
    spawn_report_worker(receiver, state.reports.clone());

    if let Some(secs) = config.index_refresh_secs {
        spawn_index_refresher(state.index.clone(), Duration::from_secs(secs.max(1)));
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Rebuilds the job index on a fixed interval. The first tick fires
/// immediately, which also warms the index at startup.
fn spawn_index_refresher(index: Arc<JobIndex>, period: Duration) {
    info!("Job index refresh every {}s", period.as_secs());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match index.refresh().await {
                Ok(count) => info!("Job index refreshed ({count} jobs)"),
                Err(e) => error!("Job index refresh failed: {e}"),
            }
        }
    });
}
