use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod accounts;
mod config;
mod error;
mod identity;
mod middleware;
mod models;
mod password;
mod repositories;
mod retention;
mod routes;
mod session;
mod state;
mod validation;

use tokio::net::TcpListener;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting biochar simulator service");

    let config = AppConfig::from_env()?;
    let app_state = AppState::from_config(&config).await?;

    info!(
        "Simulator service initialized with {:?} storage",
        config.storage
    );

    // Start the web server
    let app = routes::create_router(app_state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Simulator service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
