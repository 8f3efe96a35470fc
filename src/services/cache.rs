use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::models::Coordinate;
use crate::services::geocoder::{normalize_address, GeocodeError, Geocoder};

/// In-memory cache in front of a geocoder
///
/// Found coordinates and definite misses are both cached, so a repeated
/// address costs at most one lookup per TTL. Timeouts and provider errors are
/// not cached and are retried on the next call.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Cache<String, Option<Coordinate>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// Create a new cache holding up to `capacity` addresses for `ttl_secs`
    pub fn new(inner: G, capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, cache }
    }

    /// Drop a single address from the cache
    pub async fn invalidate(&self, address: &str) {
        self.cache.invalidate(&CacheKey::address(address)).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.entry_count(),
        }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let key = CacheKey::address(address);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::trace!("Geocode cache hit: {}", key);
            return cached.ok_or_else(|| GeocodeError::NotFound(address.to_string()));
        }

        tracing::trace!("Geocode cache miss: {}", key);
        match self.inner.resolve(address).await {
            Ok(coord) => {
                self.cache.insert(key, Some(coord.clone())).await;
                Ok(coord)
            }
            Err(GeocodeError::NotFound(missing)) => {
                self.cache.insert(key, None).await;
                Err(GeocodeError::NotFound(missing))
            }
            Err(e) => Err(e),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a geocoded address
    pub fn address(address: &str) -> String {
        format!("geocode:{}", normalize_address(address))
    }
}
