use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripbook_pricing::{
    api::ApiClient,
    app,
    cache::{start_rate_refresher, AppCache},
    config::Config,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripbook_pricing=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load config")?;
    tracing::info!(
        api = %config.booking_api_url,
        egp_discount = ?config.egp_discount,
        missing_price = ?config.missing_price,
        "Starting pricing service"
    );

    let client = Arc::new(
        ApiClient::new(&config.booking_api_url, config.api_timeout)
            .context("Failed to build booking API client")?,
    );
    let cache = AppCache::new(config.trip_cache_ttl, config.rate_cache_ttl);

    // Keep the EUR->EGP rate warm
    tokio::spawn(start_rate_refresher(
        cache.clone(),
        client.clone(),
        config.rate_refresh_interval,
    ));

    let state = AppState::new(client, cache, config.pricing_options());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
