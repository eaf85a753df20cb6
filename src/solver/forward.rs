//! Forward solver: method parameters to prayer times
//!
//! Maps a location, date, and method configuration to the six daily times.
//! Dhuhr is anchored at solar noon; every other time is an hour-angle
//! offset from it. Above the high-latitude threshold, Fajr and Isha fall
//! back to the proportional Angle-Based Rule because the required twilight
//! angles may never be reached.

use crate::calendar::{hijri_from_julian, julian_day, HijriDate};
use crate::coordinates::GeoCoordinate;
use crate::methods::{IshaRule, MethodTable, ResolvedMethod, Settings};
use crate::qibla::qibla_bearing;
use crate::solar::SolarEphemeris;
use crate::solver::{
    hour_correction, hours, hours_between, solar_noon, PrayerTimes, HIGH_LATITUDE_THRESHOLD,
};
use crate::trig::{dacot, dasin, dcos, dcot, dsin};
use crate::Result;
use chrono::{DateTime, Duration, FixedOffset};
use log::{debug, warn};

/// Seconds added past solar zenith for Dhuhr, so the sun has visibly passed
/// its highest point (jurisprudential margin).
const DHUHR_ZENITH_MARGIN_S: i64 = 65;

/// Horizon depression for sunrise/sunset: 0.83333 degrees of atmospheric
/// refraction plus solar semi-diameter.
const HORIZON_DEPRESSION: f64 = 0.83333;

/// Everything the forward path produces for one date
#[derive(Debug, Clone)]
pub struct Calculation {
    /// Qibla bearing in degrees clockwise from true north
    pub qibla: f64,
    /// Julian Day Number of the date
    pub julian_day: f64,
    /// Hijri date, after the settings' day correction
    pub hijri: HijriDate,
    /// Solar ephemeris used for the times
    pub ephemeris: SolarEphemeris,
    /// Exact prayer times
    pub times: PrayerTimes,
    /// Prayer times rounded to the nearest minute
    pub times_rounded: PrayerTimes,
}

/// Forward prayer time calculator for one location
///
/// The method key is resolved against the table once at construction, so an
/// unknown key or an invalid override combination fails here rather than on
/// every call. `calculate` is a pure function of the instant.
#[derive(Debug, Clone)]
pub struct PrayerCalculator {
    location: GeoCoordinate,
    settings: Settings,
    resolved: ResolvedMethod,
}

impl PrayerCalculator {
    /// Create a calculator, resolving the settings against the method table.
    pub fn new(
        location: GeoCoordinate,
        settings: Settings,
        methods: &MethodTable,
    ) -> Result<Self> {
        let resolved = settings.resolve(methods)?;
        Ok(Self {
            location,
            settings,
            resolved,
        })
    }

    /// Compute all times for the instant's date.
    ///
    /// The instant's fixed UTC offset determines the clock frame of every
    /// output. Calling twice with the same instant yields identical results.
    pub fn calculate(&self, instant: &DateTime<FixedOffset>) -> Result<Calculation> {
        let lat = self.location.latitude();
        let lng = self.location.longitude();

        let qibla = qibla_bearing(lat, lng);

        let jd = julian_day(instant.date_naive());
        let hijri = hijri_from_julian(jd, self.settings.hijri_correction());
        let sun = SolarEphemeris::from_julian_day(jd);
        debug!(
            "jd {:.1}: declination {:.4}, equation of time {:.2} min",
            jd,
            sun.declination,
            sun.equation_of_time()
        );

        // Dhuhr anchors every other time.
        let noon = solar_noon(instant, lng, &sun);
        let dhuhr = noon + Duration::seconds(DHUHR_ZENITH_MARGIN_S);

        let horizon_offset = hour_correction(self.horizon_theta(), lat, sun.declination)?;
        let sunrise = dhuhr - hours(horizon_offset);
        let maghrib = dhuhr + hours(horizon_offset);

        let fajr = self.fajr_time(dhuhr, sunrise, maghrib, &sun)?;
        let isha = self.isha_time(dhuhr, sunrise, maghrib, &sun, hijri.is_ramadan())?;
        let asr = self.asr_time(dhuhr, &sun)?;

        let times = PrayerTimes {
            fajr,
            sunrise,
            dhuhr,
            asr,
            maghrib,
            isha,
        };

        Ok(Calculation {
            qibla,
            julian_day: jd,
            hijri,
            ephemeris: sun,
            times_rounded: times.rounded(),
            times,
        })
    }

    /// Zenith angle of the sun's upper limb at sunrise/sunset, including the
    /// elevation dip correction. The dip is only defined for positive
    /// heights; below-sea-level locations see the standard horizon.
    fn horizon_theta(&self) -> f64 {
        90.0 + HORIZON_DEPRESSION + 0.0347 * self.location.elevation().max(0.0).sqrt()
    }

    fn fajr_time(
        &self,
        dhuhr: DateTime<FixedOffset>,
        sunrise: DateTime<FixedOffset>,
        maghrib: DateTime<FixedOffset>,
        sun: &SolarEphemeris,
    ) -> Result<DateTime<FixedOffset>> {
        let lat = self.location.latitude();
        let angle = self.resolved.fajr_angle;

        if lat.abs() <= HIGH_LATITUDE_THRESHOLD {
            let offset = hour_correction(90.0 + angle, lat, sun.declination)?;
            return Ok(dhuhr - hours(offset));
        }

        warn!(
            "latitude {:.2} above {} degrees: using Angle-Based Rule for Fajr",
            lat, HIGH_LATITUDE_THRESHOLD
        );
        let night_hours = hours_between(sunrise + Duration::hours(24), maghrib);
        Ok(sunrise - hours(night_hours * angle / 60.0))
    }

    fn isha_time(
        &self,
        dhuhr: DateTime<FixedOffset>,
        sunrise: DateTime<FixedOffset>,
        maghrib: DateTime<FixedOffset>,
        sun: &SolarEphemeris,
        ramadan: bool,
    ) -> Result<DateTime<FixedOffset>> {
        let lat = self.location.latitude();

        let angle = match self.resolved.isha {
            IshaRule::FixedInterval {
                normal_minutes,
                ramadan_minutes,
            } => {
                let minutes = if ramadan { ramadan_minutes } else { normal_minutes };
                return Ok(maghrib + hours(minutes / 60.0));
            }
            IshaRule::Angle { degrees } => degrees,
        };

        if lat.abs() <= HIGH_LATITUDE_THRESHOLD {
            let offset = hour_correction(90.0 + angle, lat, sun.declination)?;
            return Ok(dhuhr + hours(offset));
        }

        warn!(
            "latitude {:.2} above {} degrees: using Angle-Based Rule for Isha",
            lat, HIGH_LATITUDE_THRESHOLD
        );
        let night_hours = hours_between(sunrise + Duration::hours(24), maghrib);
        Ok(maghrib + hours(night_hours * angle / 60.0))
    }

    /// Asr begins when an object's shadow reaches its own length (standard)
    /// or twice that (Hanafi), measured beyond the noon shadow.
    fn asr_time(
        &self,
        dhuhr: DateTime<FixedOffset>,
        sun: &SolarEphemeris,
    ) -> Result<DateTime<FixedOffset>> {
        let lat = self.location.latitude();
        let delta = sun.declination;

        // Solar altitude at noon.
        let noon_altitude = dasin(dsin(lat) * dsin(delta) + dcos(lat) * dcos(delta));

        let k = self.settings.asr_school().shadow_factor();
        let theta = (90.0 - dacot(k + dcot(noon_altitude))).abs();

        let offset = hour_correction(theta, lat, sun.declination)?;
        Ok(dhuhr + hours(offset))
    }
}

/// Convenience function for one-off calculations.
///
/// For repeated calculations at the same location, build a
/// [`PrayerCalculator`] once instead.
pub fn compute_prayer_times(
    latitude: f64,
    longitude: f64,
    elevation: f64,
    instant: &DateTime<FixedOffset>,
    settings: Settings,
    methods: &MethodTable,
) -> Result<Calculation> {
    let location = GeoCoordinate::new(latitude, longitude, elevation)?;
    PrayerCalculator::new(location, settings, methods)?.calculate(instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::AsrSchool;
    use crate::MiqatError;
    use chrono::{TimeZone, Timelike};

    fn pacific() -> FixedOffset {
        FixedOffset::west_opt(8 * 3600).unwrap()
    }

    fn new_york() -> GeoCoordinate {
        GeoCoordinate::new(40.7128, -74.0060, 10.0).unwrap()
    }

    fn jan1_2025() -> DateTime<FixedOffset> {
        pacific().with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn calculate(settings: Settings) -> Calculation {
        PrayerCalculator::new(new_york(), settings, MethodTable::builtin())
            .unwrap()
            .calculate(&jan1_2025())
            .unwrap()
    }

    #[test]
    fn test_new_york_isna_reference_times() {
        // Reference data for New York on Jan 1, 2025 (ISNA), evaluated in
        // UTC-8. The reference values are approximate, so every pin gets a
        // one-minute tolerance; Maghrib in particular is exactly 13:40:39,
        // which rounds to 13:41.
        let result = calculate(Settings::new("isna"));
        let t = result.times_rounded;

        let expected = [(2, 59), (4, 20), (9, 0), (11, 22), (13, 40), (15, 1)];
        for ((hour, minute), (name, time)) in expected.iter().zip(t.entries()) {
            let got = time.hour() as i32 * 60 + time.minute() as i32;
            let want = hour * 60 + minute;
            assert!(
                (got - want).abs() <= 1,
                "{}: expected {:02}:{:02} +/- 1 min, got {}",
                name,
                hour,
                minute,
                time.format("%H:%M")
            );
        }
    }

    #[test]
    fn test_times_are_chronologically_ordered() {
        let t = calculate(Settings::new("isna")).times;
        assert!(t.fajr < t.sunrise);
        assert!(t.sunrise < t.dhuhr);
        assert!(t.dhuhr < t.asr);
        assert!(t.asr < t.maghrib);
        assert!(t.maghrib < t.isha);
    }

    #[test]
    fn test_all_times_share_the_instant_date_and_offset() {
        let t = calculate(Settings::new("isna")).times;
        for (_, time) in t.entries() {
            assert_eq!(time.date_naive(), jan1_2025().date_naive());
            assert_eq!(*time.offset(), pacific());
        }
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let calc =
            PrayerCalculator::new(new_york(), Settings::new("isna"), MethodTable::builtin())
                .unwrap();
        let a = calc.calculate(&jan1_2025()).unwrap();
        let b = calc.calculate(&jan1_2025()).unwrap();
        assert_eq!(a.times, b.times);
        assert_eq!(a.qibla, b.qibla);
        assert_eq!(a.hijri, b.hijri);
    }

    #[test]
    fn test_mwl_widens_the_night() {
        // MWL (18/17) puts Fajr earlier and Isha later than ISNA (15/15).
        let isna = calculate(Settings::new("isna")).times;
        let mwl = calculate(Settings::new("mwl")).times;
        assert!(mwl.fajr < isna.fajr);
        assert!(mwl.isha > isna.isha);
    }

    #[test]
    fn test_hanafi_asr_is_later() {
        let standard = calculate(Settings::new("isna")).times;
        let hanafi =
            calculate(Settings::new("isna").with_asr_school(AsrSchool::Hanafi)).times;

        assert!(hanafi.asr > standard.asr);
        let diff_minutes = hours_between(hanafi.asr, standard.asr) * 60.0;
        assert!(
            (diff_minutes - 37.0).abs() < 3.0,
            "Hanafi offset was {:.1} minutes",
            diff_minutes
        );
    }

    #[test]
    fn test_dhuhr_is_65_seconds_after_solar_noon() {
        let result = calculate(Settings::new("isna"));
        let noon = solar_noon(&jan1_2025(), -74.0060, &result.ephemeris);
        assert_eq!((result.times.dhuhr - noon).num_seconds(), 65);
    }

    #[test]
    fn test_fixed_interval_isha_outside_ramadan() {
        let result = calculate(Settings::new("uqu"));
        let minutes = hours_between(result.times.isha, result.times.maghrib) * 60.0;
        assert!((minutes - 90.0).abs() < 0.01);
        assert!(!result.hijri.is_ramadan());
    }

    #[test]
    fn test_fixed_interval_isha_during_ramadan() {
        // March 15, 2025 falls in Ramadan 1446.
        let instant = pacific().with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
        let result = PrayerCalculator::new(new_york(), Settings::new("uqu"), MethodTable::builtin())
            .unwrap()
            .calculate(&instant)
            .unwrap();

        assert!(result.hijri.is_ramadan());
        let minutes = hours_between(result.times.isha, result.times.maghrib) * 60.0;
        assert!((minutes - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_isha_interval_override() {
        let settings = Settings::new("isna").with_isha_interval(95.0).unwrap();
        let result = calculate(settings);
        let minutes = hours_between(result.times.isha, result.times.maghrib) * 60.0;
        assert!((minutes - 95.0).abs() < 0.01);
    }

    #[test]
    fn test_fajr_angle_override_moves_fajr() {
        let base = calculate(Settings::new("isna")).times;
        let wider = calculate(Settings::new("isna").with_fajr_angle(18.0).unwrap()).times;
        assert!(wider.fajr < base.fajr);
    }

    #[test]
    fn test_elevation_advances_sunrise_and_delays_maghrib() {
        // London on the June solstice: 1000 m of elevation should shift
        // sunrise earlier and Maghrib later by 500-650 seconds each.
        let utc = FixedOffset::east_opt(0).unwrap();
        let instant = utc.with_ymd_and_hms(2025, 6, 21, 0, 0, 0).unwrap();
        let settings = Settings::new("isna");

        let at = |elevation: f64| {
            compute_prayer_times(
                51.5074,
                -0.1278,
                elevation,
                &instant,
                settings.clone(),
                MethodTable::builtin(),
            )
            .unwrap()
            .times
        };

        let sea = at(0.0);
        let high = at(1000.0);

        let sunrise_gain = (sea.sunrise - high.sunrise).num_seconds();
        let maghrib_gain = (high.maghrib - sea.maghrib).num_seconds();
        assert!((500..650).contains(&sunrise_gain), "sunrise gain {}", sunrise_gain);
        assert!((500..650).contains(&maghrib_gain), "maghrib gain {}", maghrib_gain);
        assert!((sunrise_gain - maghrib_gain).abs() <= 1, "shift must be symmetric");
    }

    #[test]
    fn test_high_latitude_uses_angle_based_rule() {
        // Oslo (59.91 N) in January: the sun stays above -15 degrees all
        // night is false here, but the rule applies purely on latitude.
        let utc = FixedOffset::east_opt(3600).unwrap();
        let instant = utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let result = compute_prayer_times(
            59.9139,
            10.7522,
            0.0,
            &instant,
            Settings::new("isna"),
            MethodTable::builtin(),
        )
        .unwrap();

        let t = result.times;
        assert!(t.fajr < t.sunrise && t.maghrib < t.isha);

        // Angle-Based Rule: fajr = sunrise - night * angle / 60.
        let night = hours_between(t.sunrise + Duration::hours(24), t.maghrib);
        let expected_gap = night * 15.0 / 60.0;
        let actual_gap = hours_between(t.sunrise, t.fajr);
        assert!((actual_gap - expected_gap).abs() < 1e-6);
    }

    #[test]
    fn test_polar_night_is_a_domain_error() {
        // Longyearbyen (78 N) on Jan 1: the sun never rises.
        let utc = FixedOffset::east_opt(3600).unwrap();
        let instant = utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let err = compute_prayer_times(
            78.2232,
            15.6267,
            0.0,
            &instant,
            Settings::new("isna"),
            MethodTable::builtin(),
        )
        .unwrap_err();
        assert!(matches!(err, MiqatError::TrigDomain(_)));
    }

    #[test]
    fn test_unknown_method_fails_at_construction() {
        let err = PrayerCalculator::new(new_york(), Settings::new("bogus"), MethodTable::builtin())
            .unwrap_err();
        assert!(matches!(err, MiqatError::UnknownMethod(_)));
    }

    #[test]
    fn test_qibla_and_hijri_in_result() {
        let result = calculate(Settings::new("isna"));
        assert_eq!(result.qibla, 58.48);
        assert_eq!(
            (result.hijri.day, result.hijri.month, result.hijri.year),
            (29, 6, 1446)
        );
        assert_eq!(result.julian_day, 2460676.5);
    }

    #[test]
    fn test_hijri_correction_rolls_month() {
        let result = calculate(Settings::new("isna").with_hijri_correction(1));
        assert_eq!(
            (result.hijri.day, result.hijri.month, result.hijri.year),
            (1, 7, 1446)
        );
    }
}
