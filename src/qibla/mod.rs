//! Qibla direction calculation
//!
//! The Qibla is the direction toward the Kaaba in Makkah, computed as the
//! great-circle initial bearing from the observer. The spherical formulation
//! wraps correctly through the antimeridian and is defined at the poles, so
//! no special-case branches are needed.

use crate::trig::{datan2, dcos, dsin};

/// Latitude of the Kaaba in degrees.
pub const KAABA_LATITUDE: f64 = 21.4225;
/// Longitude of the Kaaba in degrees.
pub const KAABA_LONGITUDE: f64 = 39.8262;

/// Great-circle initial bearing from the observer to the Kaaba, in degrees
/// clockwise from true north, rounded to two decimal places.
///
/// The result is always in [0, 360). Rounding past two decimals would be
/// false precision: half a degree is well under the accuracy of any compass
/// reading.
///
/// # Example
///
/// ```rust
/// use miqat::qibla_bearing;
///
/// // New York City
/// assert_eq!(qibla_bearing(40.7128, -74.0060), 58.48);
/// ```
pub fn qibla_bearing(latitude: f64, longitude: f64) -> f64 {
    let delta_lng = KAABA_LONGITUDE - longitude;

    let y = dsin(delta_lng) * dcos(KAABA_LATITUDE);
    let x = dcos(latitude) * dsin(KAABA_LATITUDE)
        - dsin(latitude) * dcos(KAABA_LATITUDE) * dcos(delta_lng);

    let theta = datan2(y, x);
    let bearing = (360.0 + theta).rem_euclid(360.0);

    (bearing * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(40.7128, -74.0060, 58.48)] // New York
    #[case(51.5074, -0.1278, 118.99)] // London
    #[case(35.6762, 139.6503, 293.00)] // Tokyo
    #[case(-33.8688, 151.2093, 277.50)] // Sydney
    #[case(30.0444, 31.2357, 136.14)] // Cairo
    #[case(-6.2088, 106.8456, 295.15)] // Jakarta
    fn test_reference_cities(#[case] lat: f64, #[case] lng: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(qibla_bearing(lat, lng), expected, epsilon = 0.01);
    }

    #[test]
    fn test_bearing_always_in_range() {
        for lat in [-89.0, -45.0, 0.0, 45.0, 89.0] {
            for lng in [-180.0, -90.0, 0.0, 90.0, 180.0] {
                let bearing = qibla_bearing(lat, lng);
                assert!(
                    (0.0..360.0).contains(&bearing),
                    "bearing {} at ({}, {})",
                    bearing,
                    lat,
                    lng
                );
            }
        }
    }

    #[test]
    fn test_north_of_kaaba_points_south() {
        let bearing = qibla_bearing(KAABA_LATITUDE + 0.01, KAABA_LONGITUDE);
        assert_abs_diff_eq!(bearing, 180.0, epsilon = 0.5);
    }

    #[test]
    fn test_due_west_of_kaaba_points_east() {
        // Same latitude, 90 degrees west: the great circle leaves heading
        // north of due east.
        let bearing = qibla_bearing(KAABA_LATITUDE, KAABA_LONGITUDE - 90.0);
        assert!(bearing > 0.0 && bearing < 90.0);
    }

    #[test]
    fn test_antimeridian_wraps() {
        // Crossing the +/-180 meridian must not produce a discontinuity.
        let east = qibla_bearing(0.0, 179.9);
        let west = qibla_bearing(0.0, -179.9);
        let diff = (east - west).abs();
        let diff = diff.min(360.0 - diff);
        assert!(diff < 0.5, "east {} west {}", east, west);
    }

    #[test]
    fn test_poles_are_defined() {
        assert!(qibla_bearing(90.0, 0.0).is_finite());
        assert!(qibla_bearing(-90.0, 0.0).is_finite());
    }

    #[test]
    fn test_two_decimal_rounding() {
        let bearing = qibla_bearing(40.7128, -74.0060);
        assert_eq!(bearing, (bearing * 100.0).round() / 100.0);
    }
}
