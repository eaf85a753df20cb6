//! Low-precision solar ephemeris
//!
//! Computes the Sun's apparent position for a given Julian Day using the
//! simplified formulas of the Astronomical Almanac. Accuracy is on the
//! order of two minutes of time, which is the conventional tolerance for
//! prayer time calculation; do not use these values where sub-arcsecond
//! ephemerides are required.

use crate::trig::{dasin, datan2, dcos, dsin};

/// Days-per-degree factor: the Earth rotates 360 degrees in 24 hours, so a
/// degree of hour angle is four minutes of clock time.
const MINUTES_PER_DEGREE: f64 = 4.0;

/// J2000.0 epoch as a Julian Day Number.
pub const J2000: f64 = 2_451_545.0;

/// The Sun's position parameters for one date
///
/// All angles are in degrees; the Earth-Sun distance is in astronomical
/// units. Stateless and cheap, recomputed per date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarEphemeris {
    /// Mean longitude of the Sun, corrected for aberration (L)
    pub solar_longitude: f64,
    /// Mean anomaly (g)
    pub mean_anomaly: f64,
    /// Ecliptic longitude (lambda)
    pub ecliptic_longitude: f64,
    /// Obliquity of the ecliptic (epsilon)
    pub obliquity: f64,
    /// Right ascension (alpha)
    pub right_ascension: f64,
    /// Earth-Sun distance in AU (R)
    pub earth_sun_distance: f64,
    /// Declination (delta)
    pub declination: f64,
    /// Apparent semi-diameter of the solar disc
    pub semi_diameter: f64,
}

impl SolarEphemeris {
    /// Compute the Sun's coordinates for the given Julian Day.
    pub fn from_julian_day(jd: f64) -> Self {
        // Days since J2000.0.
        let n = jd - J2000;

        let solar_longitude = (280.466 + 0.9856474 * n).rem_euclid(360.0);
        let mean_anomaly = (357.528 + 0.9856003 * n).rem_euclid(360.0);

        let ecliptic_longitude = solar_longitude
            + 1.915 * dsin(mean_anomaly)
            + 0.020 * dsin(2.0 * mean_anomaly);

        let obliquity = 23.440 - 0.000_000_4 * n;

        let right_ascension = datan2(
            dcos(obliquity) * dsin(ecliptic_longitude),
            dcos(ecliptic_longitude),
        );
        let declination = dasin(dsin(obliquity) * dsin(ecliptic_longitude));

        let earth_sun_distance =
            1.00014 - 0.01671 * dcos(mean_anomaly) - 0.00014 * dcos(2.0 * mean_anomaly);
        let semi_diameter = 0.2666 / earth_sun_distance;

        Self {
            solar_longitude,
            mean_anomaly,
            ecliptic_longitude,
            obliquity,
            right_ascension,
            earth_sun_distance,
            declination,
            semi_diameter,
        }
    }

    /// Equation of time in minutes: the offset between clock time and
    /// sundial time, `(L - alpha) * 4`.
    ///
    /// `L - alpha` is reduced into (-180, 180] before scaling so the result
    /// stays within its physical +/-17 minute range even when the arctangent
    /// wraps into a different 360-degree branch than the mean longitude.
    pub fn equation_of_time(&self) -> f64 {
        let mut difference = (self.solar_longitude - self.right_ascension).rem_euclid(360.0);
        if difference > 180.0 {
            difference -= 360.0;
        }
        difference * MINUTES_PER_DEGREE
    }
}
