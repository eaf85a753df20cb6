//! Geographic coordinate value type

use crate::{MiqatError, Result};
use serde::{Deserialize, Serialize};

/// An observer's position on Earth
///
/// Immutable value type, validated at construction. Latitude is positive
/// north, longitude positive east, elevation in meters above sea level
/// (negative values are accepted for below-sea-level locations).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
    elevation: f64,
}

impl GeoCoordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(MiqatError::InputDomain(format!(
                "latitude {} must be between -90 and 90 degrees",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(MiqatError::InputDomain(format!(
                "longitude {} must be between -180 and 180 degrees",
                longitude
            )));
        }
        if !elevation.is_finite() {
            return Err(MiqatError::InputDomain(format!(
                "elevation {} must be a finite number of meters",
                elevation
            )));
        }

        Ok(Self {
            latitude,
            longitude,
            elevation,
        })
    }

    /// Latitude in degrees, positive north.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees, positive east.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Elevation in meters above sea level.
    pub fn elevation(&self) -> f64 {
        self.elevation
    }
}
