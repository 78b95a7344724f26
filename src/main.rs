use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fundraiser_api::{
    app::{build_app, serve, shutdown_signal},
    config::{AppConfig, LogFormat},
    db::{migrate, Db},
    ids::Snowflake,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::parse();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.default_log_filter());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
    }

    let ids = Arc::new(Snowflake::new(config.node_id)?);
    let db = Db::connect(&config.dsn, config.max_connections, ids).await?;

    let applied = migrate::run(db.pool(), &config.migrations)
        .await
        .context("run migrations")?;
    tracing::info!(files = applied.len(), "migrations up to date");

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    let grace = config.shutdown_timeout();
    let app = build_app(AppState::new(config, db.clone()));

    serve(listener, app, shutdown_signal(), grace).await?;

    db.close().await;
    tracing::info!("stopped");
    Ok(())
}
