//! Miqat: Islamic prayer time calculations
//!
//! This crate computes, for an arbitrary point on Earth and calendar date,
//! the five canonical Islamic prayer times plus sunrise, the Qibla bearing
//! toward the Kaaba, and the Gregorian/Hijri calendar correspondence. Given
//! observed prayer times it can also invert the process and recover the
//! sun-angle parameters that would produce them.
//!
//! The solar formulas are intentionally low-precision (accurate to about two
//! minutes), which is the conventional tolerance for prayer time tables.
//!
//! Every calculation is a pure, synchronous function of its explicit inputs:
//! a [`GeoCoordinate`], an observation instant anchored to a fixed UTC offset
//! (`chrono::DateTime<chrono::FixedOffset>`), and an immutable method
//! configuration. Timezone resolution is the caller's job; all outputs share
//! the input instant's offset.
//!
//! # Example
//!
//! ```rust
//! use chrono::{FixedOffset, TimeZone};
//! use miqat::{GeoCoordinate, MethodTable, PrayerCalculator, Settings};
//!
//! let nyc = GeoCoordinate::new(40.7128, -74.0060, 10.0).unwrap();
//! let calc = PrayerCalculator::new(nyc, Settings::default(), MethodTable::builtin()).unwrap();
//!
//! let est = FixedOffset::west_opt(5 * 3600).unwrap();
//! let instant = est.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
//! let result = calc.calculate(&instant).unwrap();
//!
//! println!("Fajr: {}", result.times_rounded.fajr.format("%H:%M"));
//! println!("Qibla: {:.2} degrees", result.qibla);
//! ```

use thiserror::Error;

pub mod calendar;
pub mod coordinates;
pub mod methods;
pub mod qibla;
pub mod solar;
pub mod solver;
pub mod trig;

// Re-export commonly used types
pub use calendar::{hijri_from_julian, julian_day, HijriDate};
pub use coordinates::GeoCoordinate;
pub use methods::{AsrSchool, IshaRule, Method, MethodTable, Settings};
pub use qibla::qibla_bearing;
pub use solar::SolarEphemeris;
pub use solver::forward::{compute_prayer_times, Calculation, PrayerCalculator};
pub use solver::reverse::{
    infer_angles, AngleEstimate, InferenceMethod, ReverseCalculator, ReverseSolution,
};
pub use solver::PrayerTimes;

/// Main error type for the miqat library
#[derive(Debug, Error)]
pub enum MiqatError {
    /// An input value lies outside its documented range.
    #[error("input out of range: {0}")]
    InputDomain(String),

    /// A derived quantity fell outside the mathematically valid domain,
    /// signaling an impossible combination of inputs (for example a
    /// chronologically inconsistent observed time, or a sun angle the sun
    /// never reaches at that latitude and date).
    #[error("trigonometric domain error: {0}")]
    TrigDomain(String),

    /// Observed or derived prayer times violate the required chronological
    /// ordering.
    #[error("prayer time sequence error: {0}")]
    Sequence(String),

    /// The requested calculation method key is not present in the table.
    #[error("unknown calculation method: {0}")]
    UnknownMethod(String),

    /// The settings combination is invalid (for example overriding Isha by
    /// both angle and interval).
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for miqat operations
pub type Result<T> = std::result::Result<T, MiqatError>;
