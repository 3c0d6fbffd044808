//! HTTP server for the movie API.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{router, AppState, ModelArgs, ServerConfig};

/// Movie information and recommendation API
#[derive(Parser)]
#[command(name = "movie-api", long_about = None)]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:10000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig {
        bind: cli.bind,
        model: cli.model.into(),
    };

    info!("Starting movie API");
    let model = config.model.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(&model))
        .await
        .context("Model build task panicked")??;

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(state))).await?;
    Ok(())
}
