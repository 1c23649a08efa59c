use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod app_state;
mod auth;
mod compliance;
mod config;
mod db;
mod error;
mod middleware;
mod modules;
mod pdf;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::init().context("Failed to load configuration")?;

    let db = db::init_pool()
        .await
        .context("Failed to initialize database")?;

    let state = app_state::AppState::new(db, config.clone());
    let app = app::create_router(state);

    let addr = config.server_addr();
    info!("{} listening on {}", config.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    Ok(())
}
