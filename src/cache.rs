//! In-memory caching using moka
//!
//! Trip price tables and the EUR→EGP rate are read on every quote but change
//! rarely, so both are cached with short TTLs. Coupons are never cached: their
//! validity depends on the moment of use.

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::api::ExchangeRates;
use crate::pricing::models::Trip;

/// Application cache holding trips and exchange rates
#[derive(Clone)]
pub struct AppCache {
    /// Trips (id -> Trip)
    pub trips: Cache<String, Arc<Trip>>,
    /// Exchange rates (pair -> rate)
    pub rates: Cache<String, Decimal>,
}

impl AppCache {
    /// Cache key for the EUR→EGP rate
    pub const EUR_EGP: &'static str = "eur:egp";

    /// Create a new cache instance with the given TTLs
    pub fn new(trip_ttl: Duration, rate_ttl: Duration) -> Self {
        Self {
            // Trips: 1000 entries, idle entries dropped after half the TTL
            trips: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(trip_ttl)
                .time_to_idle(trip_ttl / 2)
                .build(),

            // Rates: a handful of currency pairs
            rates: Cache::builder()
                .max_capacity(8)
                .time_to_live(rate_ttl)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            trips_size: self.trips.entry_count(),
            rate_cached: self.rates.entry_count() > 0,
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.trips.invalidate_all();
        self.rates.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate a specific trip after its prices change
    pub async fn invalidate_trip(&self, trip_id: &str) {
        self.trips.invalidate(trip_id).await;
        info!("Cache invalidated for trip: {}", trip_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60), Duration::from_secs(15 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub trips_size: u64,
    pub rate_cached: bool,
}

/// Start background rate refresher
///
/// Fetches the EUR→EGP rate on startup and then every `every`.
pub async fn start_rate_refresher(cache: AppCache, rates: Arc<dyn ExchangeRates>, every: Duration) {
    let mut interval = interval(every);
    loop {
        interval.tick().await;
        refresh_rate(&cache, rates.as_ref()).await;
    }
}

async fn refresh_rate(cache: &AppCache, rates: &dyn ExchangeRates) {
    match rates.eur_to_egp().await {
        Ok(rate) => {
            cache.rates.insert(AppCache::EUR_EGP.to_string(), rate).await;
            info!(rate = %rate, "EUR->EGP rate refreshed");
        }
        Err(e) => warn!("Failed to refresh EUR->EGP rate: {}", e),
    }
}
