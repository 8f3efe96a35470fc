// Model exports
pub mod domain;
pub mod person;
pub mod responses;

pub use domain::{BoundingBox, Coordinate, CoordinateError, Route, TAG_DELIMITER};
pub use person::{parse_date, DateParseError, Person, Role};
pub use responses::{DriverMatchesResponse, MatchedRider};
