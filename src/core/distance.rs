use crate::models::{BoundingBox, Route};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Wrap a latitude back by one half-turn if it left [-90, 90]
#[inline]
pub fn wrap_lat(lat: f64) -> f64 {
    if lat > 90.0 {
        lat - 180.0
    } else if lat < -90.0 {
        lat + 180.0
    } else {
        lat
    }
}

/// Wrap a longitude back by one full turn if it left [-180, 180]
#[inline]
pub fn wrap_lng(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else if lng < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}

/// Pythagorean distance between two points, in raw degrees
///
/// This is a flat-plane approximation and ignores the curvature of the earth.
/// Route compatibility is defined in these units.
#[inline]
pub fn euclidean_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    ((lat1 - lat2).powi(2) + (lon1 - lon2).powi(2)).sqrt()
}

/// Calculate the Haversine distance between two points in kilometers
///
/// Only used for reporting; matching decisions use [`euclidean_distance`].
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Bounding box spanned by a route's endpoints, grown by `padding_degrees`
/// on every side
pub fn route_bounding_box(route: &Route, padding_degrees: f64) -> BoundingBox {
    let (start, end) = (route.start(), route.end());

    BoundingBox {
        min_lat: start.latitude.min(end.latitude) - padding_degrees,
        max_lat: start.latitude.max(end.latitude) + padding_degrees,
        min_lon: start.longitude.min(end.longitude) - padding_degrees,
        max_lon: start.longitude.max(end.longitude) + padding_degrees,
    }
}

/// Check if a point is within a bounding box (edges included)
#[inline]
pub fn is_within_bounding_box(
    lat: f64,
    lon: f64,
    bbox: &BoundingBox,
) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && lon >= bbox.min_lon
        && lon <= bbox.max_lon
}
