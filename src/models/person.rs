use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::domain::Route;
use crate::services::geocoder::Geocoder;

/// Separator used when rendering a person record
const FIELD_SEPARATOR: &str = "_";

/// Errors from parsing an `M/D/Y` travel date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("Expected M/D/Y date, got {0:?}")]
    WrongShape(String),

    #[error("Date component {component:?} in {input:?} is not a number")]
    NotNumeric { input: String, component: String },

    #[error("{0:?} is not a calendar date")]
    OutOfRange(String),
}

/// Parse an `M/D/Y` date such as `4/9/2016`
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let parts: Vec<&str> = input.trim().split('/').collect();
    if parts.len() != 3 {
        return Err(DateParseError::WrongShape(input.to_string()));
    }

    let numeric = |part: &str| {
        part.trim()
            .parse::<i64>()
            .map_err(|_| DateParseError::NotNumeric {
                input: input.to_string(),
                component: part.to_string(),
            })
    };

    let month = numeric(parts[0])?;
    let day = numeric(parts[1])?;
    let year = numeric(parts[2])?;

    let (Ok(year), Ok(month), Ok(day)) = (
        i32::try_from(year),
        u32::try_from(month),
        u32::try_from(day),
    ) else {
        return Err(DateParseError::OutOfRange(input.to_string()));
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateParseError::OutOfRange(input.to_string()))
}

/// Which side of a carpool a person is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Driver,
    Rider,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Driver => write!(f, "Driver"),
            Role::Rider => write!(f, "Rider"),
        }
    }
}

/// Driver or rider with free-text addresses and a travel date
///
/// The route starts out unresolved. [`Person::resolve_route`] geocodes both
/// addresses once and stores the route only when both succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub start_address: String,
    pub end_address: String,
    pub date: NaiveDate,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    route: Option<Route>,
}

impl Person {
    /// Build a record, parsing `date` as `M/D/Y`
    pub fn new(
        role: Role,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        start_address: impl Into<String>,
        end_address: impl Into<String>,
        date: &str,
    ) -> Result<Self, DateParseError> {
        Ok(Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            start_address: start_address.into(),
            end_address: end_address.into(),
            date: parse_date(date)?,
            role,
            route: None,
        })
    }

    pub fn driver(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        start_address: impl Into<String>,
        end_address: impl Into<String>,
        date: &str,
    ) -> Result<Self, DateParseError> {
        Self::new(Role::Driver, first_name, last_name, start_address, end_address, date)
    }

    pub fn rider(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        start_address: impl Into<String>,
        end_address: impl Into<String>,
        date: &str,
    ) -> Result<Self, DateParseError> {
        Self::new(Role::Rider, first_name, last_name, start_address, end_address, date)
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn is_driver(&self) -> bool {
        self.role == Role::Driver
    }

    pub fn is_rider(&self) -> bool {
        self.role == Role::Rider
    }

    /// The resolved route, if [`Person::resolve_route`] succeeded
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Geocode both addresses and cache the resulting route
    ///
    /// Costs one geocoder lookup per address on the first call and none
    /// afterwards once resolved. Any lookup failure leaves the route unset and
    /// yields `None`; the failure is logged, not returned.
    pub async fn resolve_route<G>(&mut self, geocoder: &G) -> Option<&Route>
    where
        G: Geocoder + ?Sized,
    {
        if self.route.is_none() {
            self.route = self.lookup_route(geocoder).await;
        }
        self.route.as_ref()
    }

    async fn lookup_route<G>(&self, geocoder: &G) -> Option<Route>
    where
        G: Geocoder + ?Sized,
    {
        let start = match geocoder.resolve(&self.start_address).await {
            Ok(coord) => coord,
            Err(e) => {
                tracing::warn!("{} is not a valid address for {}: {}", self.start_address, self.id, e);
                return None;
            }
        };

        let end = match geocoder.resolve(&self.end_address).await {
            Ok(coord) => coord,
            Err(e) => {
                tracing::warn!("{} is not a valid address for {}: {}", self.end_address, self.id, e);
                return None;
            }
        };

        Some(Route::new(start, end).with_date(self.date))
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = match &self.route {
            Some(route) => route.to_string(),
            None => "None".to_string(),
        };

        let fields = [
            self.last_name.as_str(),
            self.first_name.as_str(),
            self.start_address.as_str(),
            self.end_address.as_str(),
        ];
        write!(
            f,
            "{}{sep}{}{sep}{}",
            fields.join(FIELD_SEPARATOR),
            self.date,
            route,
            sep = FIELD_SEPARATOR
        )
    }
}
