use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use wishlist_api::config::ApiConfig;
use wishlist_api::router::build_router;
use wishlist_api::state::AppState;
use wishlist_core::config::Config as _;
use wishlist_core::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load().context("load configuration")?;
    init_tracing(config.log_format);

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    tokio::fs::create_dir_all(&config.uploads_folder)
        .await
        .with_context(|| format!("create uploads folder {}", config.uploads_folder))?;

    let addr = format!("0.0.0.0:{}", config.api_port);
    let state = AppState::from_config(db, config)?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
