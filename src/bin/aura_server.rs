use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use aura_insight::api;
use aura_insight::app_config::AppConfig;
use aura_insight::build_engine;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load + validate env ONCE
    let config = AppConfig::load()?;

    info!("Starting AURA insight server");

    let engine = Arc::new(build_engine(&config)?);
    info!(
        "✓ Conversations stored in {} (live model: {})",
        config.data_file.display(),
        engine.has_live_model()
    );

    let app = api::router(engine);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("🚀 Server ready on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
