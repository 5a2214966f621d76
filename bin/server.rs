// Church Roster - Web Server

use anyhow::{Context, Result};
use church_roster::api::{build_router, AppState};
use church_roster::{open_database, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "church_roster=info,roster_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let conn = open_database(&config.database_path)
        .with_context(|| format!("Failed to open database at {:?}", config.database_path))?;
    tracing::info!(path = ?config.database_path, "database opened");

    let state = AppState::new(conn, config.per_page);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;

    tracing::info!(address = %config.bind_address, "roster server listening");

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
