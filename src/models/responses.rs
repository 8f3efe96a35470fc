use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{distance::haversine_distance, DriverMatches, RouteAlgorithm};
use crate::models::domain::Route;

/// Rider entry in a match report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedRider {
    pub id: Uuid,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub route: Route,
    /// Great-circle distance from the driver's start to the pickup
    #[serde(rename = "pickupDistanceKm")]
    pub pickup_distance_km: f64,
    /// Extra flat-plane distance the driver covers for this rider
    #[serde(rename = "detourDegrees")]
    pub detour_degrees: f64,
}

/// Match report for one driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverMatchesResponse {
    #[serde(rename = "driverId")]
    pub driver_id: Uuid,
    #[serde(rename = "driverName")]
    pub driver_name: String,
    #[serde(rename = "driverRoute")]
    pub driver_route: Option<Route>,
    pub riders: Vec<MatchedRider>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub unresolved: usize,
}

impl DriverMatchesResponse {
    pub fn from_matches(matches: &DriverMatches, algorithm: &RouteAlgorithm) -> Self {
        let driver = &matches.driver;
        let driver_route = driver.route();

        let riders = matches
            .result
            .riders
            .iter()
            .filter_map(|rider| {
                let (driver_route, rider_route) = (driver_route?, rider.route()?);
                let pickup = rider_route.start();

                Some(MatchedRider {
                    id: rider.id,
                    first_name: rider.first_name.clone(),
                    last_name: rider.last_name.clone(),
                    route: rider_route.clone(),
                    pickup_distance_km: haversine_distance(
                        driver_route.start().latitude,
                        driver_route.start().longitude,
                        pickup.latitude,
                        pickup.longitude,
                    ),
                    detour_degrees: algorithm.detour(driver_route, rider_route),
                })
            })
            .collect();

        Self {
            driver_id: driver.id,
            driver_name: format!("{} {}", driver.first_name, driver.last_name),
            driver_route: driver_route.cloned(),
            riders,
            total_candidates: matches.result.total_candidates,
            unresolved: matches.result.unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Matcher;
    use crate::models::{Coordinate, Person};
    use crate::services::geocoder::StaticGeocoder;

    #[tokio::test]
    async fn test_response_from_matches() {
        let geocoder = StaticGeocoder::from_places([
            ("a", Coordinate::new(40.0, -73.0)),
            ("b", Coordinate::new(40.5, -73.5)),
        ]);
        let matcher = Matcher::with_default_policy();
        let mut driver = Person::driver("Grace", "Hopper", "a", "b", "4/9/2016").unwrap();
        let riders = vec![Person::rider("Ada", "Lovelace", "a", "b", "4/9/2016").unwrap()];

        let result = matcher.find_suitable_riders(&mut driver, riders, &geocoder).await;
        let matches = DriverMatches { driver, result };
        let response = DriverMatchesResponse::from_matches(&matches, matcher.algorithm());

        assert_eq!(response.driver_name, "Grace Hopper");
        assert_eq!(response.riders.len(), 1);
        assert_eq!(response.riders[0].detour_degrees, 0.0);
        assert!(response.riders[0].pickup_distance_km < 0.01);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalCandidates"], 1);
        assert_eq!(json["riders"][0]["firstName"], "Ada");
        assert_eq!(json["driverRoute"]["start"]["lat"], 40.0);

        let keys = |value: &serde_json::Value| {
            let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        };
        assert_eq!(
            keys(&json),
            vec!["driverId", "driverName", "driverRoute", "riders", "totalCandidates", "unresolved"]
        );
        assert_eq!(
            keys(&json["riders"][0]),
            vec!["detourDegrees", "firstName", "id", "lastName", "pickupDistanceKm", "route"]
        );
    }
}
