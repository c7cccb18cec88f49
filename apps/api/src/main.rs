mod config;
mod content;
mod errors;
mod generation;
mod llm_client;
mod persona;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::content::fetcher::ContentFetcher;
use crate::generation::client::GenerationClient;
use crate::generation::generator::Ghostwriter;
use crate::persona::PersonaCorpus;
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting Ghostwriter v{}", env!("CARGO_PKG_VERSION"));

    // Missing key is not fatal at startup; generate/refine report it per request.
    if config.llm.api_key().is_none() {
        warn!("GEMINI_API_KEY is not set; generate and refine will fail until it is configured");
    }

    let corpus = PersonaCorpus::new(config.persona_dir.clone());
    info!(
        "Persona corpus: {} personas in {}",
        corpus.list().len(),
        corpus.dir().display()
    );

    let fetcher = ContentFetcher::new(&config.reader_base_url, config.use_reader_mode)?;
    info!(
        "Content fetcher initialized (reader mode: {})",
        fetcher.reader_enabled()
    );

    let client = GenerationClient::new(config.llm.clone())?;
    info!("Generation client initialized (model: {})", llm_client::MODEL);

    let state = AppState::new(Ghostwriter::new(corpus, fetcher, client));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
