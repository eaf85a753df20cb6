//! Prayer time solvers
//!
//! Two independent pure-function pipelines share the hour-angle primitive
//! and solar-noon calculation in this module: [`forward`] maps sun-angle
//! parameters to clock times, [`reverse`] maps observed clock times back to
//! the angles that would produce them. They are kept separate so either
//! side can be used and tested on its own.

use crate::solar::SolarEphemeris;
use crate::trig::{dcos, dsin};
use crate::{MiqatError, Result};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Timelike};

pub mod forward;
pub mod reverse;

/// Latitude beyond which the sun may never reach the Fajr/Isha twilight
/// angles, triggering the proportional Angle-Based Rule.
pub const HIGH_LATITUDE_THRESHOLD: f64 = 48.5;

/// Hour-angle degrees per hour of clock time.
const DEGREES_PER_HOUR: f64 = 15.0;

/// The six daily times for one date
///
/// All instants share the observation instant's date and UTC offset, in
/// chronological order: fajr < sunrise < dhuhr < asr < maghrib < isha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrayerTimes {
    pub fajr: DateTime<FixedOffset>,
    pub sunrise: DateTime<FixedOffset>,
    pub dhuhr: DateTime<FixedOffset>,
    pub asr: DateTime<FixedOffset>,
    pub maghrib: DateTime<FixedOffset>,
    pub isha: DateTime<FixedOffset>,
}

impl PrayerTimes {
    /// The same set rounded to the nearest minute (30 seconds rounds up).
    pub fn rounded(&self) -> PrayerTimes {
        PrayerTimes {
            fajr: round_to_minute(self.fajr),
            sunrise: round_to_minute(self.sunrise),
            dhuhr: round_to_minute(self.dhuhr),
            asr: round_to_minute(self.asr),
            maghrib: round_to_minute(self.maghrib),
            isha: round_to_minute(self.isha),
        }
    }

    /// Name/time pairs in chronological order, for display and iteration.
    pub fn entries(&self) -> [(&'static str, DateTime<FixedOffset>); 6] {
        [
            ("Fajr", self.fajr),
            ("Sunrise", self.sunrise),
            ("Dhuhr", self.dhuhr),
            ("Asr", self.asr),
            ("Maghrib", self.maghrib),
            ("Isha", self.isha),
        ]
    }
}

/// Time offset in hours from solar noon at which the sun stands `theta`
/// degrees from the zenith.
///
/// This is the shared building block for every time except Dhuhr. An
/// arc-cosine argument outside [-1, 1] means the sun never reaches `theta`
/// at this latitude and declination (polar day or night) and is reported as
/// a domain error rather than silently clamped.
pub(crate) fn hour_correction(theta: f64, latitude: f64, declination: f64) -> Result<f64> {
    let ratio = (dcos(theta) - dsin(latitude) * dsin(declination))
        / (dcos(latitude) * dcos(declination));

    if !(-1.0..=1.0).contains(&ratio) {
        return Err(MiqatError::TrigDomain(format!(
            "the sun does not reach {:.2} degrees from zenith at latitude {:.2} \
             (declination {:.2}): arc-cosine argument {:.4} is outside [-1, 1]",
            theta, latitude, declination, ratio
        )));
    }

    Ok(ratio.acos().to_degrees() / DEGREES_PER_HOUR)
}

/// Instant of solar noon on the instant's date.
///
/// Solar noon differs from clock noon by the longitude offset within the
/// timezone and by the equation of time.
pub(crate) fn solar_noon(
    instant: &DateTime<FixedOffset>,
    longitude: f64,
    sun: &SolarEphemeris,
) -> DateTime<FixedOffset> {
    let tz_hours = instant.offset().local_minus_utc() as f64 / 3600.0;
    let longitude_hours = (tz_hours * DEGREES_PER_HOUR - longitude) / DEGREES_PER_HOUR;
    let noon_hours = 12.0 + longitude_hours - sun.equation_of_time() / 60.0;

    local_midnight(instant) + hours(noon_hours)
}

/// Midnight at the start of the instant's date, in the same fixed offset.
pub(crate) fn local_midnight(instant: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let midnight = instant
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time");
    // A fixed offset maps every local time to exactly one instant.
    instant.offset().from_local_datetime(&midnight).unwrap()
}

/// A fractional number of hours as a duration, to millisecond precision.
pub(crate) fn hours(h: f64) -> Duration {
    Duration::milliseconds((h * 3_600_000.0).round() as i64)
}

/// Elapsed hours between two instants, signed.
pub(crate) fn hours_between(later: DateTime<FixedOffset>, earlier: DateTime<FixedOffset>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

/// Round to the nearest minute; 30 seconds or more rounds up.
pub(crate) fn round_to_minute(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let t = if t.second() >= 30 {
        t + Duration::minutes(1)
    } else {
        t
    };
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .expect("zeroed seconds are valid")
}
