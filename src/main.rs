use anyhow::{Context, Result};
use casgate::{web, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CAS gate");

    // Load configuration from environment
    let config = casgate::config::Config::load()?;
    tracing::info!(
        environment = ?config.environment,
        login_url = %config.gate.login_url,
        protocol = %config.gate.protocol,
        "Configuration loaded"
    );

    // The gate refuses to start with an invalid configuration
    let state = Arc::new(AppState::new(config.clone()).context("Invalid gate configuration")?);

    let app = web::create_router(state);

    // Bind and serve
    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("CAS gate listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
