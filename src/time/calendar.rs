//! Calendar arithmetic
//!
//! Conversions between proleptic calendar dates and Julian day numbers follow
//! the algorithm in the Explanatory Supplement to the Astronomical Almanac 15.11.
//! An optional cutoff selects the Julian calendar for days before it.

use crate::constants::DAY_S;

/// Calendar tuple for representing a date and time
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarTuple {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl CalendarTuple {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }
}

/// Input accepted by the calendar-based constructors on `Timescale`
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarInput {
    Tuple(i32, u32, u32, u32, u32, f64),
    CalendarTuple(CalendarTuple),
}

impl CalendarInput {
    pub fn fields(&self) -> (i32, u32, u32, u32, u32, f64) {
        match self {
            CalendarInput::Tuple(y, m, d, h, mi, s) => (*y, *m, *d, *h, *mi, *s),
            CalendarInput::CalendarTuple(cal) => (
                cal.year, cal.month, cal.day, cal.hour, cal.minute, cal.second,
            ),
        }
    }
}

impl From<(i32, u32, u32, u32, u32, f64)> for CalendarInput {
    fn from(tuple: (i32, u32, u32, u32, u32, f64)) -> Self {
        CalendarInput::Tuple(tuple.0, tuple.1, tuple.2, tuple.3, tuple.4, tuple.5)
    }
}

impl From<CalendarTuple> for CalendarInput {
    fn from(cal: CalendarTuple) -> Self {
        CalendarInput::CalendarTuple(cal)
    }
}

impl From<(i32, u32, u32)> for CalendarInput {
    fn from(date: (i32, u32, u32)) -> Self {
        CalendarInput::Tuple(date.0, date.1, date.2, 0, 0, 0.0)
    }
}

/// Normalize a month value to the range 1-12, adjusting the year as needed
fn normalize_month(year: i32, month: u32) -> (i32, u32) {
    if (1..=12).contains(&month) {
        return (year, month);
    }

    let month_0 = month as i32 - 1;
    let year_offset = month_0.div_euclid(12);
    let month_norm = month_0.rem_euclid(12);

    (year + year_offset, (month_norm + 1) as u32)
}

/// Julian day number of the calendar date, noon-based
///
/// Months outside 1-12 roll into the neighbouring years.
pub fn julian_day(year: i32, month: u32, day: u32, julian_calendar_cutoff: Option<i32>) -> i32 {
    let (year, month) = normalize_month(year, month);

    let janfeb = month <= 2;
    let g = year + 4716 - if janfeb { 1 } else { 0 };
    let f = (month + 9) % 12;
    let e = 1461 * g / 4 + day as i32 - 1402;
    let mut j = e + (153 * f as i32 + 2) / 5;

    let use_gregorian = match julian_calendar_cutoff {
        Some(cutoff) => j >= cutoff,
        None => true,
    };

    if use_gregorian {
        j += 38 - (g + 184) / 100 * 3 / 4;
    }

    j
}

/// Calendar date of a Julian day number
pub fn julian_day_to_calendar_date(jd: i32, julian_calendar_cutoff: Option<i32>) -> (i32, u32, u32) {
    let use_gregorian = match julian_calendar_cutoff {
        Some(cutoff) => jd >= cutoff,
        None => true,
    };

    let mut f = jd + 1401;
    if use_gregorian {
        f += (4 * jd + 274277) / 146097 * 3 / 4 - 38;
    }

    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;

    let day = (h % 153) / 5 + 1;
    let month = ((h / 153) + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;

    (year, month as u32, day as u32)
}

/// Split a Julian date given as `whole + fraction` into calendar fields
///
/// Keeping the two parts separate preserves sub-millisecond resolution in
/// the seconds field.
pub fn calendar_tuple(whole: f64, fraction: f64, julian_calendar_cutoff: Option<i32>) -> CalendarTuple {
    let shifted = whole + 0.5;
    let day_number = shifted.floor();
    let mut fraction = (shifted - day_number) + fraction;
    let carry = fraction.floor();
    fraction -= carry;

    let (year, month, day) =
        julian_day_to_calendar_date((day_number + carry) as i32, julian_calendar_cutoff);

    let seconds_in_day = fraction * DAY_S;
    let hour = ((seconds_in_day / 3600.0).floor() as u32).min(23);
    let minute = (((seconds_in_day - hour as f64 * 3600.0) / 60.0).floor() as u32).min(59);
    let second = seconds_in_day - hour as f64 * 3600.0 - minute as f64 * 60.0;

    CalendarTuple {
        year,
        month,
        day,
        hour,
        minute,
        second,
    }
}

/// Three-letter month abbreviations used in JPL-style renderings
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GREGORIAN_START, GREGORIAN_START_ENGLAND, J2000};
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(2000, 1, 1, 2_451_545)]
    #[case(1974, 1, 1, 2_442_049)]
    #[case(1858, 11, 17, 2_400_001)]
    #[case(1582, 10, 15, GREGORIAN_START)]
    fn test_julian_day_known_dates(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: i32,
    ) {
        assert_eq!(julian_day(year, month, day, Some(GREGORIAN_START)), expected);
    }

    #[test]
    fn test_julian_calendar_before_cutoff() {
        // 1582-10-04 (Julian) is the day before 1582-10-15 (Gregorian)
        let jd = julian_day(1582, 10, 4, Some(GREGORIAN_START));
        assert_eq!(jd, GREGORIAN_START - 1);
        assert_eq!(
            julian_day_to_calendar_date(jd, Some(GREGORIAN_START)),
            (1582, 10, 4)
        );

        // England kept the Julian calendar until 1752
        let jd = julian_day(1752, 9, 2, Some(GREGORIAN_START_ENGLAND));
        assert_eq!(jd, GREGORIAN_START_ENGLAND - 1);
    }

    #[test]
    fn test_month_overflow_rolls_year() {
        assert_eq!(julian_day(1999, 13, 1, None), julian_day(2000, 1, 1, None));
        assert_eq!(julian_day(2000, 0, 1, None), julian_day(1999, 12, 1, None));
    }

    #[test]
    fn test_round_trip_day_numbers() {
        for jd in (2_300_000..2_500_000).step_by(997) {
            let (y, m, d) = julian_day_to_calendar_date(jd, Some(GREGORIAN_START));
            assert_eq!(julian_day(y, m, d, Some(GREGORIAN_START)), jd);
        }
    }

    #[test]
    fn test_calendar_tuple_noon_epoch() {
        let cal = calendar_tuple(J2000, 0.0, None);
        assert_eq!((cal.year, cal.month, cal.day), (2000, 1, 1));
        assert_eq!((cal.hour, cal.minute), (12, 0));
        assert_abs_diff_eq!(cal.second, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_calendar_tuple_fraction_carries_into_next_day() {
        // 2451544.5 is midnight starting 2000-01-01; a fraction of 1.25 lands on 01-02 06:00
        let cal = calendar_tuple(2_451_544.5, 1.25, None);
        assert_eq!((cal.year, cal.month, cal.day), (2000, 1, 2));
        assert_eq!((cal.hour, cal.minute), (6, 0));
        assert_abs_diff_eq!(cal.second, 0.0, epsilon = 1e-6);
    }
}
