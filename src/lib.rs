//! Carpool Match - route-compatibility matching of riders to drivers
//!
//! This library decides whether a rider's trip is a reasonable detour for a
//! driver and scans a set of riders for the ones a driver can pick up.
//! Addresses are resolved through a pluggable [`services::Geocoder`].

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchResult, RouteAlgorithm, CompatibilityPolicy};
pub use crate::models::{Coordinate, Route, Person, Role};
