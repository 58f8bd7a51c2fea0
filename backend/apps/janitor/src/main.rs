//! Session Janitor Entry Point
//!
//! Runs migrations, then periodically deletes expired session rows and
//! expired refresh token index entries. Uses `anyhow` for startup errors;
//! store errors are `session::SessionError`.

use std::env;
use std::time::Duration;

use session::infra::postgres::{PgSessionStore, PgTokenIndex};
use session::{SessionStore, TokenIndex};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_janitor=info,session=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set in environment"))?;

    let interval_secs = match env::var("JANITOR_INTERVAL_SECS") {
        Ok(raw) => raw.trim().parse::<u64>()?,
        Err(_) => DEFAULT_INTERVAL_SECS,
    };
    anyhow::ensure!(interval_secs > 0, "JANITOR_INTERVAL_SECS must be positive");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let sessions = PgSessionStore::new(pool.clone());
    let index = PgTokenIndex::new(pool.clone());

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    tracing::info!(interval_secs, "Janitor started");

    loop {
        tokio::select! {
            _ = ticker.tick() => sweep(&sessions, &index).await,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    pool.close().await;
    Ok(())
}

/// One cleanup pass. Failures are logged and retried on the next tick.
async fn sweep(sessions: &PgSessionStore, index: &PgTokenIndex) {
    if let Err(e) = sessions.cleanup_expired().await {
        let app_error: kernel::error::app_error::AppError = e.into();
        tracing::warn!(error = %app_error, "Session cleanup failed, continuing anyway");
    }

    if let Err(e) = index.purge_expired().await {
        let app_error: kernel::error::app_error::AppError = e.into();
        tracing::warn!(error = %app_error, "Token index purge failed, continuing anyway");
    }
}
