// Core algorithm exports
pub mod algorithm;
pub mod distance;
pub mod matcher;

pub use algorithm::{CompatibilityPolicy, RouteAlgorithm};
pub use distance::{euclidean_distance, haversine_distance, is_within_bounding_box, route_bounding_box, wrap_lat, wrap_lng};
pub use matcher::{DriverMatches, MatchError, MatchResult, Matcher};
