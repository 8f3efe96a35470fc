use crate::core::distance::{is_within_bounding_box, route_bounding_box};
use crate::models::Route;

/// Thresholds deciding whether a rider is an acceptable detour
///
/// All distances are flat-plane degrees, see
/// [`euclidean_distance`](crate::core::distance::euclidean_distance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompatibilityPolicy {
    /// Margin added around the driver's start/end box
    pub bbox_padding_degrees: f64,
    /// Allowed detour as a fraction of the driver's trip length
    pub max_detour_ratio: f64,
    /// Allowed detour on top of the ratio, so very short trips can match
    pub detour_slack_degrees: f64,
}

impl Default for CompatibilityPolicy {
    fn default() -> Self {
        Self {
            bbox_padding_degrees: 0.1,
            max_detour_ratio: 0.25,
            detour_slack_degrees: 0.02,
        }
    }
}

/// Decides whether a rider's trip fits along a driver's trip
///
/// # Stages
/// 1. Bounding box pre-filter: both rider endpoints must fall inside the
///    driver's padded start/end box
/// 2. Detour threshold: going start → pickup → drop-off → end may add at most
///    `max_detour_ratio * trip_length + detour_slack_degrees`
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteAlgorithm {
    policy: CompatibilityPolicy,
}

impl RouteAlgorithm {
    pub fn new(policy: CompatibilityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CompatibilityPolicy {
        &self.policy
    }

    /// `false` when either route is unresolved, otherwise [`Self::is_compatible`]
    pub fn routes_compatible(&self, driver: Option<&Route>, rider: Option<&Route>) -> bool {
        match (driver, rider) {
            (Some(driver), Some(rider)) => self.is_compatible(driver, rider),
            _ => false,
        }
    }

    pub fn is_compatible(&self, driver: &Route, rider: &Route) -> bool {
        let bbox = route_bounding_box(driver, self.policy.bbox_padding_degrees);

        let endpoints_inside = [rider.start(), rider.end()]
            .iter()
            .all(|c| is_within_bounding_box(c.latitude, c.longitude, &bbox));
        if !endpoints_inside {
            return false;
        }

        let allowed = self.policy.max_detour_ratio * driver.length() + self.policy.detour_slack_degrees;
        self.detour(driver, rider) <= allowed
    }

    /// Extra distance the driver covers to pick up and drop off the rider
    pub fn detour(&self, driver: &Route, rider: &Route) -> f64 {
        let via_rider = driver.start().distance(rider.start())
            + rider.length()
            + rider.end().distance(driver.end());

        via_rider - driver.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn route(start: (f64, f64), end: (f64, f64)) -> Route {
        Route::new(Coordinate::new(start.0, start.1), Coordinate::new(end.0, end.1))
    }

    fn driver_route() -> Route {
        route((40.0, -73.0), (40.5, -73.5))
    }

    #[test]
    fn test_unresolved_routes_never_match() {
        let algorithm = RouteAlgorithm::default();
        let driver = driver_route();

        assert!(!algorithm.routes_compatible(None, Some(&driver)));
        assert!(!algorithm.routes_compatible(Some(&driver), None));
        assert!(!algorithm.routes_compatible(None, None));
    }

    #[test]
    fn test_identical_route_matches() {
        let algorithm = RouteAlgorithm::default();
        let driver = driver_route();

        assert!(algorithm.routes_compatible(Some(&driver), Some(&driver)));
        assert_eq!(algorithm.detour(&driver, &driver), 0.0);
    }

    #[test]
    fn test_near_parallel_route_matches() {
        let algorithm = RouteAlgorithm::default();
        let rider = route((40.05, -73.02), (40.45, -73.48));

        assert!(algorithm.routes_compatible(Some(&driver_route()), Some(&rider)));
    }

    #[test]
    fn test_far_route_rejected() {
        let algorithm = RouteAlgorithm::default();
        let rider = route((10.0, 10.0), (11.0, 11.0));

        assert!(!algorithm.routes_compatible(Some(&driver_route()), Some(&rider)));
    }

    #[test]
    fn test_reverse_direction_rejected() {
        let algorithm = RouteAlgorithm::default();
        let rider = route((40.45, -73.48), (40.05, -73.02));

        // Same corridor, wrong way: inside the box but a large detour
        assert!(!algorithm.routes_compatible(Some(&driver_route()), Some(&rider)));
    }

    #[test]
    fn test_padding_controls_bbox() {
        let rider = route((39.95, -73.0), (40.5, -73.5));

        let strict = RouteAlgorithm::new(CompatibilityPolicy {
            bbox_padding_degrees: 0.0,
            ..CompatibilityPolicy::default()
        });
        assert!(!strict.is_compatible(&driver_route(), &rider));

        let loose = RouteAlgorithm::default();
        assert!(loose.is_compatible(&driver_route(), &rider));
    }

    #[test]
    fn test_degenerate_driver_route_uses_slack() {
        let algorithm = RouteAlgorithm::default();
        let driver = route((40.0, -73.0), (40.0, -73.0));
        let rider = route((40.005, -73.0), (40.0, -73.0));

        assert!(algorithm.is_compatible(&driver, &rider));
    }

    #[test]
    fn test_deterministic() {
        let algorithm = RouteAlgorithm::default();
        let rider = route((40.05, -73.02), (40.45, -73.48));

        let first = algorithm.is_compatible(&driver_route(), &rider);
        let second = algorithm.is_compatible(&driver_route(), &rider);
        assert_eq!(first, second);
    }
}
