use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::distance::{euclidean_distance, wrap_lat, wrap_lng};

/// Delimiter between the positional fields of a coordinate tag
pub const TAG_DELIMITER: char = ',';

/// Errors raised when reading tag fields off a coordinate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("Coordinate has no tag")]
    MissingTag,

    #[error("Tag {tag:?} has no field at index {index}")]
    TagIndexOutOfRange { tag: String, index: usize },
}

/// Geographic point in degrees with optional tag metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = Some(tag.into());
    }

    pub fn set_lat(&mut self, latitude: f64) {
        self.latitude = latitude;
    }

    pub fn set_lng(&mut self, longitude: f64) {
        self.longitude = longitude;
    }

    /// Shift the point and wrap each axis back once if it left its range
    ///
    /// The wrap is a single step: a sum more than one full range outside the
    /// bounds stays out of bounds.
    pub fn translate(&mut self, delta_lat: f64, delta_lng: f64) {
        self.latitude = wrap_lat(self.latitude + delta_lat);
        self.longitude = wrap_lng(self.longitude + delta_lng);
    }

    /// Flat-plane distance in degrees
    #[inline]
    pub fn distance(&self, other: &Coordinate) -> f64 {
        euclidean_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Positional field of the tag, split on [`TAG_DELIMITER`]
    pub fn tag_param(&self, index: usize) -> Result<&str, CoordinateError> {
        let tag = self.tag.as_deref().ok_or(CoordinateError::MissingTag)?;
        tag.split(TAG_DELIMITER)
            .nth(index)
            .ok_or_else(|| CoordinateError::TagIndexOutOfRange {
                tag: tag.to_string(),
                index,
            })
    }

    /// Latitude field of a `lng,lat` tag
    pub fn lat_tag(&self) -> Result<&str, CoordinateError> {
        self.tag_param(1)
    }

    /// Longitude field of a `lng,lat` tag
    pub fn lng_tag(&self) -> Result<&str, CoordinateError> {
        self.tag_param(0)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"lat\": {:?}, \"lng\": {:?}", self.latitude, self.longitude)?;
        if let Some(tag) = &self.tag {
            write!(f, " Tag: {}", tag)?;
        }
        write!(f, "}}")
    }
}

/// A single trip from `start` to `end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    start: Coordinate,
    end: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

impl Route {
    pub fn new(start: Coordinate, end: Coordinate) -> Self {
        Self {
            start,
            end,
            date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn start(&self) -> &Coordinate {
        &self.start
    }

    pub fn end(&self) -> &Coordinate {
        &self.end
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Straight-line length of the trip in degrees
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}to{}", self.start, self.end)
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_wraps_both_axes() {
        let mut coord = Coordinate::new(85.0, 170.0);
        coord.translate(10.0, 20.0);

        assert_eq!(coord.latitude, -85.0);
        assert_eq!(coord.longitude, -170.0);
    }

    #[test]
    fn test_translate_within_range_is_plain_addition() {
        let mut coord = Coordinate::new(40.0, -73.0);
        coord.translate(0.5, -0.5);

        assert_eq!(coord.latitude, 40.5);
        assert_eq!(coord.longitude, -73.5);
    }

    #[test]
    fn test_translate_wraps_only_once() {
        let mut coord = Coordinate::new(0.0, 0.0);
        coord.translate(300.0, 800.0);

        // One subtraction per axis, still outside the valid range
        assert_eq!(coord.latitude, 120.0);
        assert_eq!(coord.longitude, 440.0);
    }

    #[test]
    fn test_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);

        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_tag_params() {
        let coord = Coordinate::new(40.0, -73.0).with_tag("-73.0,40.0");

        assert_eq!(coord.lng_tag(), Ok("-73.0"));
        assert_eq!(coord.lat_tag(), Ok("40.0"));
        assert_eq!(coord.tag_param(0), Ok("-73.0"));
    }

    #[test]
    fn test_setters_overwrite_fields() {
        let mut coord = Coordinate::new(40.0, -73.0);
        coord.set_lat(41.25);
        coord.set_lng(-72.5);
        coord.set_tag("-72.5,41.25");

        assert_eq!(coord.latitude, 41.25);
        assert_eq!(coord.longitude, -72.5);
        assert_eq!(coord.lat_tag(), Ok("41.25"));

        // Setters store values as given, without wrapping
        coord.set_lat(95.0);
        coord.set_tag("home");
        assert_eq!(coord.latitude, 95.0);
        assert_eq!(coord.tag.as_deref(), Some("home"));
    }

    #[test]
    fn test_missing_tag() {
        let coord = Coordinate::new(40.0, -73.0);
        assert_eq!(coord.lat_tag(), Err(CoordinateError::MissingTag));
    }

    #[test]
    fn test_malformed_tag() {
        let coord = Coordinate::new(40.0, -73.0).with_tag("home");

        assert_eq!(coord.lng_tag(), Ok("home"));
        assert_eq!(
            coord.lat_tag(),
            Err(CoordinateError::TagIndexOutOfRange {
                tag: "home".to_string(),
                index: 1,
            })
        );
    }

    #[test]
    fn test_coordinate_display() {
        let plain = Coordinate::new(40.5, -73.0);
        assert_eq!(plain.to_string(), "{\"lat\": 40.5, \"lng\": -73.0}");

        let tagged = plain.with_tag("pickup");
        assert_eq!(tagged.to_string(), "{\"lat\": 40.5, \"lng\": -73.0 Tag: pickup}");
    }

    #[test]
    fn test_route_display_and_accessors() {
        let start = Coordinate::new(1.0, 2.0);
        let end = Coordinate::new(3.0, 4.0);
        let date = NaiveDate::from_ymd_opt(2016, 4, 9).unwrap();
        let route = Route::new(start.clone(), end.clone()).with_date(date);

        assert_eq!(route.start(), &start);
        assert_eq!(route.end(), &end);
        assert_eq!(route.date(), Some(date));
        assert_eq!(
            route.to_string(),
            "{\"lat\": 1.0, \"lng\": 2.0}to{\"lat\": 3.0, \"lng\": 4.0}"
        );
    }
}
