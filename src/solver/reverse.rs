//! Reverse solver: observed prayer times back to method parameters
//!
//! Given observed Fajr, Maghrib, and Isha clock times at a known location,
//! recovers the twilight angles (and the Maghrib-to-Isha interval) that a
//! forward calculation would have needed to produce them. Useful for
//! identifying which convention a published timetable follows.

use crate::calendar::julian_day;
use crate::coordinates::GeoCoordinate;
use crate::solar::SolarEphemeris;
use crate::solver::{
    hour_correction, hours, hours_between, solar_noon, DEGREES_PER_HOUR,
    HIGH_LATITUDE_THRESHOLD,
};
use crate::trig::{dacos, dcos, dsin};
use crate::{MiqatError, Result};
use chrono::{DateTime, Duration, FixedOffset};
use log::{debug, warn};

/// Horizon depression matching the forward solver's sunrise geometry.
const HORIZON_DEPRESSION: f64 = 0.83333;

/// How a twilight angle was recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceMethod {
    /// Inverted hour-angle geometry
    Standard,
    /// Inverted Angle-Based Rule, used above the high-latitude threshold
    HighLatitude,
}

/// One recovered twilight angle with its plausibility assessment
#[derive(Debug, Clone)]
pub struct AngleEstimate {
    /// Degrees of solar depression below the horizon
    pub angle: f64,
    pub method: InferenceMethod,
    /// False when the angle falls outside 0 to 30 degrees
    pub valid: bool,
    pub warnings: Vec<String>,
}

/// Combined result of one reverse calculation
#[derive(Debug, Clone)]
pub struct ReverseSolution {
    pub fajr: AngleEstimate,
    pub isha: AngleEstimate,
    /// Maghrib-to-Isha gap in minutes, rounded to one decimal
    pub isha_interval_minutes: f64,
    pub solar_noon: DateTime<FixedOffset>,
    pub sunrise: DateTime<FixedOffset>,
    pub ephemeris: SolarEphemeris,
    pub high_latitude: bool,
    /// True only when both angle estimates are valid
    pub valid: bool,
    pub warnings: Vec<String>,
}

/// Inverse of [`hour_correction`]: recover the zenith angle theta from an
/// offset (in hours) between a prayer time and solar noon.
///
/// The cosine is clamped to [-1, 1] so that offsets a hair past the
/// geometric limit still resolve instead of yielding NaN.
pub(crate) fn inverse_hour_correction(
    offset_hours: f64,
    latitude: f64,
    declination: f64,
) -> Result<f64> {
    let hour_angle = offset_hours * DEGREES_PER_HOUR;
    if !(0.0..=180.0).contains(&hour_angle) {
        return Err(MiqatError::TrigDomain(format!(
            "offset {:.2}h gives hour angle {:.2} outside [0, 180]",
            offset_hours, hour_angle
        )));
    }

    let cos_theta = dcos(hour_angle) * dcos(latitude) * dcos(declination)
        + dsin(latitude) * dsin(declination);
    Ok(dacos(cos_theta.clamp(-1.0, 1.0)))
}

/// Attach validity and plausibility warnings to a raw angle.
fn classify(angle: f64, prayer: &str, typical_max: f64, method: InferenceMethod) -> AngleEstimate {
    let mut warnings = Vec::new();
    let mut valid = true;

    if method == InferenceMethod::HighLatitude {
        warnings.push(format!(
            "{} angle recovered with the Angle-Based Rule, not solar geometry",
            prayer
        ));
    }

    if !(0.0..=30.0).contains(&angle) {
        warnings.push(format!(
            "{} angle {:.2} is outside the valid range 0 to 30 degrees",
            prayer, angle
        ));
        valid = false;
    } else if !(12.0..=typical_max).contains(&angle) {
        warnings.push(format!(
            "{} angle {:.2} is outside the typical range 12 to {} degrees",
            prayer, angle, typical_max
        ));
    }

    AngleEstimate {
        angle,
        method,
        valid,
        warnings,
    }
}

/// Minutes from Maghrib to Isha, rounded to one decimal.
fn isha_interval_minutes(
    isha: &DateTime<FixedOffset>,
    maghrib: &DateTime<FixedOffset>,
) -> Result<f64> {
    if isha < maghrib {
        return Err(MiqatError::Sequence(format!(
            "Isha {} is before Maghrib {}",
            isha.format("%H:%M"),
            maghrib.format("%H:%M")
        )));
    }
    let minutes = hours_between(*isha, *maghrib) * 60.0;
    Ok((minutes * 10.0).round() / 10.0)
}

fn validate_sequence(
    fajr: &DateTime<FixedOffset>,
    sunrise: &DateTime<FixedOffset>,
    maghrib: &DateTime<FixedOffset>,
    isha: &DateTime<FixedOffset>,
) -> Result<()> {
    if !(fajr < sunrise && sunrise < maghrib && maghrib < isha) {
        return Err(MiqatError::Sequence(format!(
            "expected Fajr < sunrise < Maghrib < Isha, got {} / {} / {} / {} \
             (sunrise is computed, check the observed times)",
            fajr.format("%H:%M"),
            sunrise.format("%H:%M"),
            maghrib.format("%H:%M"),
            isha.format("%H:%M")
        )));
    }
    Ok(())
}

/// Recovers twilight angles from observed times at one location
#[derive(Debug, Clone)]
pub struct ReverseCalculator {
    location: GeoCoordinate,
}

impl ReverseCalculator {
    pub fn new(location: GeoCoordinate) -> Self {
        Self { location }
    }

    /// Recover the Fajr and Isha parameters behind three observed times.
    ///
    /// All four instants must carry the same fixed UTC offset; `instant`
    /// names the date and clock frame of the observation.
    pub fn infer(
        &self,
        instant: &DateTime<FixedOffset>,
        fajr: &DateTime<FixedOffset>,
        maghrib: &DateTime<FixedOffset>,
        isha: &DateTime<FixedOffset>,
    ) -> Result<ReverseSolution> {
        let lat = self.location.latitude();
        let high_latitude = lat.abs() > HIGH_LATITUDE_THRESHOLD;

        let jd = julian_day(instant.date_naive());
        let sun = SolarEphemeris::from_julian_day(jd);
        let noon = solar_noon(instant, self.location.longitude(), &sun);

        let horizon_theta = 90.0
            + HORIZON_DEPRESSION
            + 0.0347 * self.location.elevation().max(0.0).sqrt();
        let sunrise = noon - hours(hour_correction(horizon_theta, lat, sun.declination)?);
        debug!(
            "reverse at lat {:.2}: noon {}, sunrise {}",
            lat,
            noon.format("%H:%M:%S"),
            sunrise.format("%H:%M:%S")
        );

        validate_sequence(fajr, &sunrise, maghrib, isha)?;

        let fajr_estimate = if high_latitude {
            warn!(
                "latitude {:.2} above {} degrees: inverting the Angle-Based Rule",
                lat, HIGH_LATITUDE_THRESHOLD
            );
            let night = hours_between(sunrise + Duration::hours(24), *maghrib);
            let angle = 60.0 * hours_between(sunrise, *fajr) / night;
            classify(angle, "Fajr", 21.0, InferenceMethod::HighLatitude)
        } else {
            if fajr >= &noon {
                return Err(MiqatError::Sequence(format!(
                    "Fajr {} is not before solar noon {}",
                    fajr.format("%H:%M"),
                    noon.format("%H:%M")
                )));
            }
            let theta = inverse_hour_correction(hours_between(noon, *fajr), lat, sun.declination)?;
            classify(theta - 90.0, "Fajr", 21.0, InferenceMethod::Standard)
        };

        let isha_estimate = if high_latitude {
            let night = hours_between(sunrise + Duration::hours(24), *maghrib);
            let angle = 60.0 * hours_between(*isha, *maghrib) / night;
            classify(angle, "Isha", 20.0, InferenceMethod::HighLatitude)
        } else {
            if isha <= maghrib {
                return Err(MiqatError::Sequence(format!(
                    "Isha {} is not after Maghrib {}",
                    isha.format("%H:%M"),
                    maghrib.format("%H:%M")
                )));
            }
            let theta = inverse_hour_correction(hours_between(*isha, noon), lat, sun.declination)?;
            classify(theta - 90.0, "Isha", 20.0, InferenceMethod::Standard)
        };

        let interval = isha_interval_minutes(isha, maghrib)?;

        let mut warnings = Vec::new();
        warnings.extend(fajr_estimate.warnings.iter().cloned());
        warnings.extend(isha_estimate.warnings.iter().cloned());

        let divergence = (fajr_estimate.angle - isha_estimate.angle).abs();
        if divergence > 10.0 {
            warnings.push(format!(
                "Fajr ({:.2}) and Isha ({:.2}) angles differ by {:.2} degrees, \
                 which is unusual for a single convention",
                fajr_estimate.angle, isha_estimate.angle, divergence
            ));
        }

        let valid = fajr_estimate.valid && isha_estimate.valid;

        Ok(ReverseSolution {
            fajr: fajr_estimate,
            isha: isha_estimate,
            isha_interval_minutes: interval,
            solar_noon: noon,
            sunrise,
            ephemeris: sun,
            high_latitude,
            valid,
            warnings,
        })
    }
}

/// Convenience function mirroring [`compute_prayer_times`] for the reverse
/// direction.
///
/// [`compute_prayer_times`]: crate::solver::forward::compute_prayer_times
pub fn infer_angles(
    latitude: f64,
    longitude: f64,
    elevation: f64,
    instant: &DateTime<FixedOffset>,
    fajr: &DateTime<FixedOffset>,
    maghrib: &DateTime<FixedOffset>,
    isha: &DateTime<FixedOffset>,
) -> Result<ReverseSolution> {
    let location = GeoCoordinate::new(latitude, longitude, elevation)?;
    ReverseCalculator::new(location).infer(instant, fajr, maghrib, isha)
}
