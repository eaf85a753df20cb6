//! Calendar date conversion functions
//!
//! This module converts Gregorian dates to Julian Day Numbers and Julian Day
//! Numbers to Hijri (Islamic lunar calendar) dates. The Hijri conversion
//! carries an integer day correction because the official date is fixed by
//! lunar sighting, which varies by authority.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Julian Day Number of the Hijri epoch (July 16, 622 AD).
pub const HIJRI_EPOCH_JD: i64 = 1_948_440;

/// First day of the Gregorian calendar reform (1582-10-15).
///
/// Dates before this use the Julian calendar and take no century correction.
const GREGORIAN_REFORM: (i32, u32, u32) = (1582, 10, 15);

/// English and Arabic names of the twelve Hijri months, indexed by month - 1.
const HIJRI_MONTH_NAMES: [(&str, &str); 12] = [
    ("Muharram", "محرم"),
    ("Safar", "صفر"),
    ("Rabi' al-Awwal", "ربيع الأول"),
    ("Rabi' al-Thani", "ربيع الثاني"),
    ("Jumada al-Awwal", "جمادى الأولى"),
    ("Jumada al-Thani", "جمادى الثانية"),
    ("Rajab", "رجب"),
    ("Sha'ban", "شعبان"),
    ("Ramadan", "رمضان"),
    ("Shawwal", "شوال"),
    ("Dhu al-Qi'dah", "ذو القعدة"),
    ("Dhu al-Hijjah", "ذو الحجة"),
];

/// A date in the Hijri (Islamic lunar) calendar
///
/// Month lengths are always 29 or 30 days; the 30-year cycle contains
/// exactly 10631 days with leap years at fixed positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HijriDate {
    /// Day of the month, 1 to 30
    pub day: u32,
    /// Month number, 1 (Muharram) to 12 (Dhu al-Hijjah)
    pub month: u32,
    /// Hijri year (AH)
    pub year: i64,
}

impl HijriDate {
    /// English name of the month.
    pub fn month_name(&self) -> &'static str {
        HIJRI_MONTH_NAMES[(self.month - 1) as usize].0
    }

    /// Arabic name of the month.
    pub fn month_name_arabic(&self) -> &'static str {
        HIJRI_MONTH_NAMES[(self.month - 1) as usize].1
    }

    /// True when the date falls in Ramadan, the ninth month.
    pub fn is_ramadan(&self) -> bool {
        self.month == 9
    }
}

impl std::fmt::Display for HijriDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}, {} AH", self.month_name(), self.day, self.year)
    }
}

/// Century correction term for the Julian Day formula.
///
/// The October 1582 calendar reform removed the Julian calendar's surplus
/// century leap days. Dates before the reform take no correction; dates on
/// or after it take `2 - floor(y/100) + floor(floor(y/100)/4)`. The jump at
/// the reform boundary is a real discontinuity in the civil calendar and is
/// preserved exactly.
fn gregorian_correction(date: NaiveDate) -> f64 {
    let (ry, rm, rd) = GREGORIAN_REFORM;
    let reform = NaiveDate::from_ymd_opt(ry, rm, rd).expect("reform date is valid");
    if date < reform {
        return 0.0;
    }

    let century = (date.year() as f64 / 100.0).floor();
    2.0 - century + (century / 4.0).floor()
}

/// Convert a calendar date to its Julian Day Number.
///
/// The Julian Day Number is a continuous count of days since January 1,
/// 4713 BC, used as a uniform time axis for the solar formulas. The value
/// returned is for midnight at the start of the given date, so it always
/// ends in `.5`.
///
/// Consecutive calendar days differ by exactly 1.0, across month, year, and
/// calendar-reform boundaries alike.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use miqat::julian_day;
///
/// let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
/// assert_eq!(julian_day(date), 2451544.5);
/// ```
pub fn julian_day(date: NaiveDate) -> f64 {
    // January and February count as months 13 and 14 of the previous year,
    // so the formula's month term stays monotonic across the leap day.
    let (month, year) = if date.month() > 2 {
        (date.month() as f64, date.year() as f64)
    } else {
        (date.month() as f64 + 12.0, date.year() as f64 - 1.0)
    };

    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + date.day() as f64
        + gregorian_correction(date)
        - 1524.5
}

/// Convert a Julian Day Number to a Hijri date.
///
/// `day_correction` shifts the astronomical result by whole days to match a
/// particular sighting authority; values of -2 to +2 cover common practice.
///
/// The body is the classic arithmetic 30-year-cycle algorithm. Each cycle
/// holds exactly 10631 days with leap years at positions 2, 5, 7, 10, 13,
/// 16, 18, 21, 24, 26, and 29; the interleaved floor divisions below encode
/// that asymmetric distribution in closed form. The exact sequence and
/// constants are load-bearing: reordering the floors shifts results at
/// cycle boundaries, so they are kept verbatim and pinned by tests.
///
/// # Example
///
/// ```rust
/// use miqat::hijri_from_julian;
///
/// let hijri = hijri_from_julian(2451544.5, 0); // Jan 1, 2000
/// assert_eq!((hijri.day, hijri.month, hijri.year), (23, 9, 1420));
/// assert!(hijri.is_ramadan());
/// ```
pub fn hijri_from_julian(jd: f64, day_correction: i64) -> HijriDate {
    // Days since the algorithm's internal reference point, 10632 days before
    // the Hijri epoch.
    let mut l: i64 = (jd.floor() as i64) + day_correction - HIJRI_EPOCH_JD + 10632;

    // Complete 30-year cycles elapsed (10631 days each).
    let n = (l - 1).div_euclid(10631);

    // Remaining days within the current cycle, offset by one common year.
    l = l - 10631 * n + 354;

    // Year within the cycle, accounting for the leap-year distribution.
    let j = (10985 - l).div_euclid(5316) * (50 * l).div_euclid(17719)
        + l.div_euclid(5670) * (43 * l).div_euclid(15238);

    // Day of the year, as an intermediate that encodes month and day.
    l = l - (30 - j).div_euclid(15) * (17719 * j).div_euclid(50)
        - j.div_euclid(16) * (15238 * j).div_euclid(43)
        + 29;

    // 709/24 approximates the mean month length of 29.53 days.
    let month = (24 * l).div_euclid(709);
    let day = l - (709 * month).div_euclid(24);
    let year = 30 * n + j - 30;

    HijriDate {
        day: day as u32,
        month: month as u32,
        year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2000, 1, 1), 2451544.5)] // J2000 epoch (midnight)
    #[case(date(1970, 1, 1), 2440587.5)] // Unix epoch
    #[case(date(2025, 1, 1), 2460676.5)]
    #[case(date(622, 7, 16), 1948439.5)] // Hijri epoch
    fn test_julian_day_known_dates(#[case] d: NaiveDate, #[case] expected: f64) {
        assert_abs_diff_eq!(julian_day(d), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_consecutive_days_differ_by_exactly_one() {
        let mut d = date(2024, 2, 26); // spans a leap day
        let mut jd = julian_day(d);
        for _ in 0..10 {
            let next = d.succ_opt().unwrap();
            let next_jd = julian_day(next);
            assert_eq!(next_jd - jd, 1.0);
            d = next;
            jd = next_jd;
        }
    }

    #[test]
    fn test_january_and_february_shift() {
        // Jan 31 -> Feb 1 and Feb 28 -> Mar 1 both step by exactly one day,
        // exercising the month-13/14 rewrite on both sides.
        assert_eq!(julian_day(date(2025, 2, 1)) - julian_day(date(2025, 1, 31)), 1.0);
        assert_eq!(julian_day(date(2025, 3, 1)) - julian_day(date(2025, 2, 28)), 1.0);
        // Dec 31 -> Jan 1 crosses the year boundary.
        assert_eq!(julian_day(date(2025, 1, 1)) - julian_day(date(2024, 12, 31)), 1.0);
    }

    #[test]
    fn test_gregorian_reform_discontinuity() {
        // Oct 4, 1582 (Julian) was followed by Oct 15, 1582 (Gregorian); the
        // two are consecutive Julian days because the correction term jumps.
        assert_abs_diff_eq!(julian_day(date(1582, 10, 4)), 2299159.5, epsilon = 1e-9);
        assert_abs_diff_eq!(julian_day(date(1582, 10, 15)), 2299160.5, epsilon = 1e-9);
    }

    #[rstest]
    #[case(2451544.5, 0, (23, 9, 1420))] // Jan 1, 2000: 23 Ramadan 1420
    #[case(2460676.5, 0, (29, 6, 1446))] // Jan 1, 2025
    #[case(2460676.5, 1, (1, 7, 1446))] // +1 day rolls into Rajab
    #[case(1948440.0, 0, (1, 1, 1))] // Hijri epoch
    fn test_hijri_known_dates(
        #[case] jd: f64,
        #[case] correction: i64,
        #[case] expected: (u32, u32, i64),
    ) {
        let h = hijri_from_julian(jd, correction);
        assert_eq!((h.day, h.month, h.year), expected);
    }

    #[test]
    fn test_correction_advances_day_or_rolls_month() {
        // Over a long span of days, a +1 correction must advance the day by
        // one or roll to day 1 of the next month, never skipping.
        for offset in 0..400 {
            let jd = 2460676.5 + offset as f64;
            let base = hijri_from_julian(jd, 0);
            let plus = hijri_from_julian(jd, 1);
            if plus.day == 1 {
                assert!(
                    base.day == 29 || base.day == 30,
                    "rolled from day {} at jd {}",
                    base.day,
                    jd
                );
            } else {
                assert_eq!(plus.day, base.day + 1, "skipped a day at jd {}", jd);
            }
        }
    }

    #[test]
    fn test_month_lengths_are_29_or_30() {
        // Walk forward to the next day-1 so the first month counted is
        // complete rather than a partial starting mid-month.
        let mut jd = 2460000.5;
        while hijri_from_julian(jd, 0).day != 1 {
            jd += 1.0;
        }

        let mut current = hijri_from_julian(jd, 0);
        let mut length = 0;
        for offset in 1..800 {
            let next = hijri_from_julian(jd + offset as f64, 0);
            length += 1;
            if next.month != current.month {
                assert!(
                    length == 29 || length == 30,
                    "month {} of {} had {} days",
                    current.month,
                    current.year,
                    length
                );
                length = 0;
                current = next;
            }
        }
    }

    #[test]
    fn test_day_and_month_stay_in_range() {
        for offset in 0..2000 {
            let h = hijri_from_julian(2455000.5 + offset as f64, 0);
            assert!((1..=30).contains(&h.day));
            assert!((1..=12).contains(&h.month));
        }
    }

    #[test]
    fn test_month_names() {
        let ramadan = HijriDate { day: 1, month: 9, year: 1446 };
        assert_eq!(ramadan.month_name(), "Ramadan");
        assert_eq!(ramadan.month_name_arabic(), "رمضان");
        assert!(ramadan.is_ramadan());

        let muharram = HijriDate { day: 1, month: 1, year: 1446 };
        assert_eq!(muharram.month_name(), "Muharram");
        assert!(!muharram.is_ramadan());
    }

    #[test]
    fn test_display_format() {
        let h = HijriDate { day: 29, month: 6, year: 1446 };
        assert_eq!(h.to_string(), "Jumada al-Thani 29, 1446 AH");
    }
}
