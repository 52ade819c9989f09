use std::net::SocketAddr;

use anyhow::Context;
use ride_ledger_backend::config::AppConfig;
use ride_ledger_backend::{create_router, initialize_backend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `log` records from the library are bridged into tracing by `init()`
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    info!("Using data directory {}", config.data_directory.display());

    let app_state = initialize_backend(&config).await?;
    let app = create_router(
        app_state,
        &config.cors_origin,
        config.static_directory.as_deref(),
    );

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.bind_address))?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
