use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mood_reel::{
    config::Config,
    credentials::Secrets,
    db::{create_redis_client, Cache},
    routes::{create_router, AppState},
    services::providers::TmdbClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let secrets = Secrets::load(&config.secrets_path)?;

    let (cache, cache_handle) = match config.redis_url.as_deref() {
        Some(redis_url) => {
            let client = create_redis_client(redis_url).context("Invalid Redis URL")?;
            let (cache, handle) = Cache::new(client).await;
            tracing::info!("Catalog cache enabled");
            (Some(cache), Some(handle))
        }
        None => {
            tracing::warn!("REDIS_URL not set, catalog responses will not be cached");
            (None, None)
        }
    };

    let catalog = TmdbClient::new(&config, cache)?;
    let addr = config.bind_address();
    let state = Arc::new(AppState::new(config, Arc::new(catalog), secrets));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
