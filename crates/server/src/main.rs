//! # server
//!
//! Binary entry point: configuration from the environment, tracing, and the
//! HTTP listener.

use server::{app, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,regression_core=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::new(&config)?;
    let addr = config.addr()?;

    tracing::info!(
        worker_threads = state.pool.threads(),
        history_limit = config.history_limit,
        timeout_secs = config.evaluation_timeout.map(|d| d.as_secs()),
        "server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
