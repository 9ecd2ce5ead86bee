use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("longitude must be a finite number")]
    LongitudeNotFinite,
    #[error("latitude must be a finite number")]
    LatitudeNotFinite,
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
}

/// A validated (longitude, latitude) pair in decimal degrees.
///
/// Serializes as a two-element `[longitude, latitude]` array to match the
/// GeoJSON-style payloads the catalog store exchanges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoordinateError> {
        if !longitude.is_finite() {
            return Err(CoordinateError::LongitudeNotFinite);
        }
        if !latitude.is_finite() {
            return Err(CoordinateError::LatitudeNotFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        Ok(Self { longitude, latitude })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = CoordinateError;

    fn try_from(pair: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(pair[0], pair[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coordinate: Coordinate) -> Self {
        [coordinate.longitude, coordinate.latitude]
    }
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, CoordinateError};

    #[test]
    fn accepts_coordinates_within_bounds() {
        let coordinate = Coordinate::new(78.96, 20.59).expect("valid coordinate");
        assert_eq!(coordinate.longitude(), 78.96);
        assert_eq!(coordinate.latitude(), 20.59);
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(Coordinate::new(-180.0, -90.0).is_ok());
        assert!(Coordinate::new(180.0, 90.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        let error = Coordinate::new(181.0, 0.0).expect_err("longitude out of range");
        assert_eq!(error, CoordinateError::LongitudeOutOfRange(181.0));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let error = Coordinate::new(0.0, -90.5).expect_err("latitude out of range");
        assert_eq!(error, CoordinateError::LatitudeOutOfRange(-90.5));
    }

    #[test]
    fn rejects_non_finite_components() {
        assert_eq!(
            Coordinate::new(f64::NAN, 0.0).expect_err("nan longitude"),
            CoordinateError::LongitudeNotFinite,
        );
        assert_eq!(
            Coordinate::new(0.0, f64::INFINITY).expect_err("infinite latitude"),
            CoordinateError::LatitudeNotFinite,
        );
    }

    #[test]
    fn serializes_as_longitude_latitude_pair() {
        let coordinate = Coordinate::new(78.96, 20.59).expect("valid coordinate");
        let json = serde_json::to_string(&coordinate).expect("serialize");
        assert_eq!(json, "[78.96,20.59]");
    }

    #[test]
    fn deserialization_applies_validation() {
        let error = serde_json::from_str::<Coordinate>("[200.0,10.0]");
        assert!(error.is_err());
    }
}
