use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod relay;
mod state;
mod template;

use config::{Args, ProviderConfig};
use handlers::{generate_handler, health_handler, metrics_handler};
use rate_limit::Throttle;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let provider = ProviderConfig::from_env()?;

    let state = Arc::new(AppState {
        client: reqwest::Client::new(),
        throttle: Throttle::new(Duration::from_millis(args.cooldown_ms)),
        provider,
        template_path: args.template.clone(),
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        port = args.port,
        model = %state.provider.model,
        template = %args.template.display(),
        cooldown_ms = args.cooldown_ms,
        "prompt gateway listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
