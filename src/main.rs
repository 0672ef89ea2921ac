use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_calendar::{
    config::Config,
    db::{create_redis_client, Cache},
    models::{ServiceDirectory, ThemeCatalog},
    routes::{create_router, AppState},
    services::{
        providers::tmdb::TmdbProvider, AvailabilityCheck, DiscoveryEngine, DiscoverySettings,
        KeywordResolver, MovieSource,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_calendar=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client).await;

    let source: Arc<dyn MovieSource> = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.request_timeout(),
        config.keyword_cache_ttl_secs,
    )?);

    let catalog = Arc::new(ThemeCatalog::default());
    let resolver = KeywordResolver::new(
        source.clone(),
        catalog.clone(),
        config.keyword_lookup_delay(),
    );
    let settings = DiscoverySettings {
        page_budget: config.page_budget,
        watch_region: config.watch_region.clone(),
        availability: AvailabilityCheck::Query,
        min_vote_count: Some(config.min_vote_count),
        ..Default::default()
    };
    let engine = DiscoveryEngine::new(
        source,
        resolver,
        catalog,
        Arc::new(ServiceDirectory::default()),
        settings,
    );

    let state = Arc::new(AppState {
        engine,
        default_services: config.default_services.clone(),
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, region = %config.watch_region, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
