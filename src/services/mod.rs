// Service exports
pub mod cache;
pub mod geocoder;
pub mod store;

pub use cache::{CacheKey, CacheStats, CachedGeocoder};
pub use geocoder::{GeocodeError, Geocoder, StaticGeocoder, TimedGeocoder};
pub use store::{Dataset, InMemoryStore, PersonRecord, PersonStore, PlaceRecord, StoreError};
