use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;

use stockboard_backend::app;
use stockboard_backend::config::AppConfig;
use stockboard_backend::logging::{init_logging, LogSettings};
use stockboard_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(&LogSettings::from_env()?)?;

    let config = AppConfig::from_env()?;

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{}'", config.database_url))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await
        .context("Failed to open the SQLite database")?;

    stockboard_backend::migrate(&pool)
        .await
        .context("Failed to run database migrations")?;

    let state = AppState { pool };
    let app = app::create_app(state).layer(app::cors_layer(&config.cors_origins));

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Stock dashboard backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
