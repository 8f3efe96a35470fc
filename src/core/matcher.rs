use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::core::algorithm::{CompatibilityPolicy, RouteAlgorithm};
use crate::models::Person;
use crate::services::geocoder::Geocoder;
use crate::services::store::{PersonStore, StoreError};

/// Errors that abort a matching scan
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Failed to read person records: {0}")]
    Store(#[from] StoreError),
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    /// Compatible riders, in the order the source listed them
    pub riders: Vec<Person>,
    pub total_candidates: usize,
    /// Riders skipped because an address did not geocode
    pub unresolved: usize,
}

impl MatchResult {
    fn empty(total_candidates: usize) -> Self {
        Self {
            riders: Vec::new(),
            total_candidates,
            unresolved: 0,
        }
    }
}

/// Matches for one driver
#[derive(Debug)]
pub struct DriverMatches {
    pub driver: Person,
    pub result: MatchResult,
}

/// Finds the riders a driver can pick up
///
/// # Pipeline Stages
/// 1. Resolve the driver's route (two geocoder lookups)
/// 2. Resolve each rider's route, `concurrency` riders at a time
/// 3. Keep riders whose route is compatible with the driver's
///
/// Rider order is preserved whatever the concurrency.
#[derive(Debug, Clone)]
pub struct Matcher {
    algorithm: RouteAlgorithm,
    concurrency: usize,
}

impl Matcher {
    pub fn new(policy: CompatibilityPolicy, concurrency: usize) -> Self {
        Self {
            algorithm: RouteAlgorithm::new(policy),
            concurrency: concurrency.max(1),
        }
    }

    pub fn with_default_policy() -> Self {
        Self::new(CompatibilityPolicy::default(), 1)
    }

    pub fn algorithm(&self) -> &RouteAlgorithm {
        &self.algorithm
    }

    /// Find the suitable riders for `driver` among `riders`
    ///
    /// Costs two geocoder lookups for the driver and up to two per rider.
    /// A rider whose route does not resolve is skipped and counted in
    /// `unresolved`; it never fails the scan. Records in `riders` that are
    /// not riders are ignored.
    pub async fn find_suitable_riders<G>(
        &self,
        driver: &mut Person,
        riders: Vec<Person>,
        geocoder: &G,
    ) -> MatchResult
    where
        G: Geocoder + ?Sized,
    {
        let riders: Vec<Person> = riders
            .into_iter()
            .filter(|person| {
                if !person.is_rider() {
                    tracing::debug!("Ignoring {} record {} in rider list", person.role, person.id);
                }
                person.is_rider()
            })
            .collect();
        let total_candidates = riders.len();

        let Some(driver_route) = driver.resolve_route(geocoder).await.cloned() else {
            tracing::warn!("Route for driver {} did not resolve, no riders can match", driver.id);
            return MatchResult::empty(total_candidates);
        };

        let resolved: Vec<Person> = stream::iter(riders)
            .map(|mut rider| async move {
                rider.resolve_route(geocoder).await;
                rider
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut unresolved = 0;
        let mut suitable = Vec::new();

        for rider in resolved {
            if rider.route().is_none() {
                unresolved += 1;
                continue;
            }

            if self.algorithm.routes_compatible(Some(&driver_route), rider.route()) {
                tracing::debug!("Rider {} is compatible with driver {}", rider.id, driver.id);
                suitable.push(rider);
            } else {
                tracing::debug!("Rider {} is not compatible with driver {}", rider.id, driver.id);
            }
        }

        tracing::info!(
            "Driver {}: {} suitable riders from {} candidates ({} unresolved)",
            driver.id,
            suitable.len(),
            total_candidates,
            unresolved
        );

        MatchResult {
            riders: suitable,
            total_candidates,
            unresolved,
        }
    }

    /// Find the suitable riders for `driver` among every rider in `store`
    pub async fn get_suitable_riders<S, G>(
        &self,
        driver: &mut Person,
        store: &S,
        geocoder: &G,
    ) -> Result<MatchResult, MatchError>
    where
        S: PersonStore + ?Sized,
        G: Geocoder + ?Sized,
    {
        let riders = store.all_riders().await?;
        Ok(self.find_suitable_riders(driver, riders, geocoder).await)
    }

    /// Run [`Matcher::get_suitable_riders`] for every driver in `store`
    pub async fn match_all_drivers<S, G>(
        &self,
        store: &S,
        geocoder: &G,
    ) -> Result<Vec<DriverMatches>, MatchError>
    where
        S: PersonStore + ?Sized,
        G: Geocoder + ?Sized,
    {
        let drivers = store.all_drivers().await?;
        let riders = store.all_riders().await?;

        let mut all = Vec::with_capacity(drivers.len());
        for mut driver in drivers {
            let result = self
                .find_suitable_riders(&mut driver, riders.clone(), geocoder)
                .await;
            all.push(DriverMatches { driver, result });
        }

        Ok(all)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_policy()
    }
}
