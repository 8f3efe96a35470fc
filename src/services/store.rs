use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Coordinate, DateParseError, Person, Role};
use crate::services::geocoder::StaticGeocoder;

/// Errors that can occur when loading or reading person records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML dataset: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record for {name}: {source}")]
    InvalidRecord {
        name: String,
        #[source]
        source: DateParseError,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only source of drivers and riders, in storage order
#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn all_riders(&self) -> Result<Vec<Person>, StoreError>;

    async fn all_drivers(&self) -> Result<Vec<Person>, StoreError>;
}

/// Person record as written in a dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub start: String,
    pub end: String,
    /// Travel date as `M/D/Y`
    pub date: String,
}

impl PersonRecord {
    pub fn into_person(self, role: Role) -> Result<Person, StoreError> {
        let name = format!("{} {}", self.first_name, self.last_name);
        let person = Person::new(role, self.first_name, self.last_name, self.start, self.end, &self.date)
            .map_err(|source| StoreError::InvalidRecord { name, source })?;

        Ok(match self.id {
            Some(id) => person.with_id(id),
            None => person,
        })
    }
}

/// Known address with its coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

/// Contents of a dataset file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub drivers: Vec<PersonRecord>,
    #[serde(default)]
    pub riders: Vec<PersonRecord>,
    #[serde(default)]
    pub places: Vec<PlaceRecord>,
}

impl Dataset {
    /// Load a dataset, parsing `.json` files as JSON and anything else as TOML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&text)?)
        } else {
            Ok(toml::from_str(&text)?)
        }
    }

    /// Geocoder answering for every place in the dataset
    pub fn geocoder(&self) -> StaticGeocoder {
        StaticGeocoder::from_places(
            self.places
                .iter()
                .map(|place| (place.address.as_str(), Coordinate::new(place.lat, place.lng))),
        )
    }

    /// Store holding the dataset's drivers and riders
    pub fn store(&self) -> Result<InMemoryStore, StoreError> {
        let drivers = self
            .drivers
            .iter()
            .cloned()
            .map(|record| record.into_person(Role::Driver))
            .collect::<Result<Vec<_>, _>>()?;
        let riders = self
            .riders
            .iter()
            .cloned()
            .map(|record| record.into_person(Role::Rider))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(InMemoryStore::new(drivers, riders))
    }
}

/// Person store held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    drivers: Vec<Person>,
    riders: Vec<Person>,
}

impl InMemoryStore {
    pub fn new(drivers: Vec<Person>, riders: Vec<Person>) -> Self {
        Self { drivers, riders }
    }

    /// Append a record to the list matching its role
    pub fn add(&mut self, person: Person) {
        match person.role {
            Role::Driver => self.drivers.push(person),
            Role::Rider => self.riders.push(person),
        }
    }
}

#[async_trait]
impl PersonStore for InMemoryStore {
    async fn all_riders(&self) -> Result<Vec<Person>, StoreError> {
        Ok(self.riders.clone())
    }

    async fn all_drivers(&self) -> Result<Vec<Person>, StoreError> {
        Ok(self.drivers.clone())
    }
}
