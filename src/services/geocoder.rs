use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::Coordinate;

/// Errors that can occur when resolving an address
#[derive(Debug, Clone, Error)]
pub enum GeocodeError {
    #[error("Address not found: {0}")]
    NotFound(String),

    #[error("Lookup for {address} timed out after {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    #[error("Geocoding provider error: {0}")]
    Provider(String),
}

/// Resolves free-text addresses to coordinates
///
/// Implementations may hit the network; callers treat every error as "no
/// coordinate" for that address.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        (**self).resolve(address).await
    }
}

/// Lookup key for an address: trimmed, lowercased, inner whitespace collapsed
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Geocoder backed by a fixed address table
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Coordinate>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_places<I, S>(places: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinate)>,
        S: AsRef<str>,
    {
        let mut geocoder = Self::new();
        for (address, coord) in places {
            geocoder.insert(address.as_ref(), coord);
        }
        geocoder
    }

    pub fn insert(&mut self, address: &str, coord: Coordinate) {
        self.places.insert(normalize_address(address), coord);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        self.places
            .get(&normalize_address(address))
            .cloned()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }
}

/// Bounds every lookup of the inner geocoder by a timeout
///
/// A slow address fails on its own without holding up other lookups.
#[derive(Debug, Clone)]
pub struct TimedGeocoder<G> {
    inner: G,
    timeout: Duration,
}

impl<G: Geocoder> TimedGeocoder<G> {
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for TimedGeocoder<G> {
    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        match tokio::time::timeout(self.timeout, self.inner.resolve(address)).await {
            Ok(result) => result,
            Err(_) => Err(GeocodeError::Timeout {
                address: address.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}
