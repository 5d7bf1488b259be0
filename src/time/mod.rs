//! Time module for astronomical time calculations
//!
//! This module provides the time scales used throughout the position
//! pipeline (UTC, TAI, TT, TDB and UT1), conversions between them, and the
//! per-instant quantities that depend only on time: sidereal time, nutation
//! angles and the precession/nutation/frame-bias rotation matrices.
//!
//! A [`Time`] always holds one or more instants. Scalar constructors produce
//! a length-1 `Time`; array constructors produce one element per input. Every
//! derived quantity is computed for the whole batch on first access and then
//! cached for the lifetime of the value.

pub mod calendar;
pub mod leap_seconds;

pub use calendar::{CalendarInput, CalendarTuple};
pub use leap_seconds::LeapSecondTable;

use crate::constants::{DAY_S, GREGORIAN_START, J2000, JULIAN_CENTURY, TT_MINUS_TAI};
use crate::earthlib::sidereal_time_hours;
use crate::framelib::ICRS_TO_J2000;
use crate::nutationlib::{
    compute_nutation, earth_tilt, earth_tilt_from_series, EarthTilt, NutationModel,
    NutationSeries,
};
use crate::precessionlib::compute_precession;
use calendar::{calendar_tuple, julian_day, julian_day_to_calendar_date, MONTH_ABBREVIATIONS};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use log::{debug, warn};
use nalgebra::Matrix3;
use ndarray::{s, Array1};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::fmt;
use std::ops::{Add, Range, Sub};
use std::sync::Arc;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("timezone-naive time {0:?}; add 'Z' or an explicit UTC offset")]
    TimezoneNaive(String),

    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),

    #[error("Leap second table error: {0}")]
    LeapSecondTable(String),

    #[error("Delta T table error: {0}")]
    DeltaTTable(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// ISO 8601 timestamp with optional fractional seconds and zone designator
static ISO_8601: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(-?\d{4,})-(\d{2})-(\d{2})[T ](\d{2}):(\d{2})(?::(\d{2}(?:\.\d+)?))?\s*(Z|[+-]\d{2}(?::?\d{2})?)?$",
    )
    .expect("ISO 8601 pattern is valid")
});

/// TDB minus TT in seconds
///
/// USNO Circular 179, eq. 2.6. The argument may be either TT or TDB; the
/// difference between them does not change the result at this precision.
pub fn tdb_minus_tt(jd: f64) -> f64 {
    let t = (jd - J2000) / JULIAN_CENTURY;

    0.001657 * f64::sin(628.3076 * t + 6.2401)
        + 0.000022 * f64::sin(575.3385 * t + 4.2970)
        + 0.000014 * f64::sin(1256.6152 * t + 6.1969)
        + 0.000005 * f64::sin(606.9777 * t + 4.0212)
        + 0.000005 * f64::sin(52.9691 * t + 0.4444)
        + 0.000002 * f64::sin(21.3299 * t + 5.5431)
        + 0.000010 * t * f64::sin(628.3076 * t + 4.2490)
}

/// TDB day fraction for a TT date given as `whole + tt_fraction`
pub fn tt_to_tdb_fraction(whole: f64, tt_fraction: f64) -> f64 {
    tt_fraction + tdb_minus_tt(whole + tt_fraction) / DAY_S
}

/// TT day fraction for a TDB date given as `whole + tdb_fraction`
pub fn tdb_to_tt_fraction(whole: f64, tdb_fraction: f64) -> f64 {
    tdb_fraction - tdb_minus_tt(whole + tdb_fraction) / DAY_S
}

/// Source of Delta T (TT - UT1) in seconds
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaT {
    /// A single value applied at every date
    Fixed(f64),
    /// Linear interpolation in a table of (TT Julian date, Delta T), clamped at the ends
    Table { tt: Vec<f64>, delta_t: Vec<f64> },
}

impl DeltaT {
    /// Delta T in seconds at a TT Julian date
    pub fn at(&self, tt: f64) -> f64 {
        match self {
            DeltaT::Fixed(value) => *value,
            DeltaT::Table { tt: xs, delta_t: ys } => interpolate(tt, xs, ys),
        }
    }
}

/// Piecewise-linear interpolation, holding the end values outside the table
fn interpolate(x: f64, x_values: &[f64], y_values: &[f64]) -> f64 {
    let i = x_values.partition_point(|&v| v <= x);
    if i == 0 {
        y_values[0]
    } else if i >= x_values.len() {
        y_values[y_values.len() - 1]
    } else {
        let (x0, x1) = (x_values[i - 1], x_values[i]);
        let (y0, y1) = (y_values[i - 1], y_values[i]);
        y0 + (x - x0) / (x1 - x0) * (y1 - y0)
    }
}

/// Factory for [`Time`] values
///
/// Owns the leap-second table, the Delta T source and the nutation model
/// that every `Time` it builds will use. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Timescale {
    leap_seconds: Arc<LeapSecondTable>,
    delta_t: Arc<DeltaT>,
    nutation_model: NutationModel,
    /// Overrides `nutation_model` when set
    nutation_series: Option<Arc<NutationSeries>>,
    /// Julian day number of the first Gregorian calendar day
    julian_calendar_cutoff: Option<i32>,
}

impl Default for Timescale {
    fn default() -> Self {
        Self::new(LeapSecondTable::builtin())
    }
}

impl Timescale {
    /// Create a timescale around an explicit leap-second table
    ///
    /// Delta T defaults to zero, nutation to IAU 2000A, and dates before
    /// 1582-10-15 are read in the Julian calendar.
    pub fn new(leap_seconds: LeapSecondTable) -> Self {
        Self {
            leap_seconds: Arc::new(leap_seconds),
            delta_t: Arc::new(DeltaT::Fixed(0.0)),
            nutation_model: NutationModel::default(),
            nutation_series: None,
            julian_calendar_cutoff: Some(GREGORIAN_START),
        }
    }

    pub fn with_leap_seconds(mut self, leap_seconds: LeapSecondTable) -> Self {
        self.leap_seconds = Arc::new(leap_seconds);
        self
    }

    /// Use a constant Delta T, in seconds
    pub fn with_delta_t(mut self, seconds: f64) -> Self {
        self.delta_t = Arc::new(DeltaT::Fixed(seconds));
        self
    }

    /// Interpolate Delta T from a table of TT Julian dates and seconds
    pub fn with_delta_t_table(mut self, tt: Vec<f64>, delta_t: Vec<f64>) -> Result<Self> {
        if tt.is_empty() || tt.len() != delta_t.len() {
            return Err(TimeError::DeltaTTable(format!(
                "need matching non-empty columns, got {} dates and {} values",
                tt.len(),
                delta_t.len()
            )));
        }
        if tt.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TimeError::DeltaTTable(
                "dates must be strictly ascending".to_string(),
            ));
        }
        self.delta_t = Arc::new(DeltaT::Table { tt, delta_t });
        Ok(self)
    }

    pub fn with_nutation_model(mut self, model: NutationModel) -> Self {
        self.nutation_model = model;
        self.nutation_series = None;
        self
    }

    /// Evaluate nutation from a loaded series, such as the full IERS tables
    pub fn with_nutation_series(mut self, series: NutationSeries) -> Self {
        self.nutation_series = Some(Arc::new(series));
        self
    }

    pub fn with_julian_calendar_cutoff(mut self, cutoff: Option<i32>) -> Self {
        self.julian_calendar_cutoff = cutoff;
        self
    }

    pub fn leap_seconds(&self) -> &LeapSecondTable {
        &self.leap_seconds
    }

    pub fn nutation_model(&self) -> NutationModel {
        self.nutation_model
    }

    pub fn nutation_series(&self) -> Option<&NutationSeries> {
        self.nutation_series.as_deref()
    }

    /// Delta T in seconds at a TT Julian date
    pub fn delta_t(&self, tt: f64) -> f64 {
        self.delta_t.at(tt)
    }

    /// Calculate Julian day number from calendar date
    ///
    /// This follows the algorithm in the Explanatory Supplement to the Astronomical Almanac 15.11.
    pub fn julian_day(&self, year: i32, month: u32, day: u32) -> i32 {
        julian_day(year, month, day, self.julian_calendar_cutoff)
    }

    /// Convert Julian day number to calendar date
    pub fn julian_day_to_calendar_date(&self, jd: i32) -> (i32, u32, u32) {
        julian_day_to_calendar_date(jd, self.julian_calendar_cutoff)
    }

    fn build(&self, whole: Array1<f64>, tt_fraction: Array1<f64>, scalar: bool) -> Time {
        Time {
            ts: self.clone(),
            whole,
            tt_fraction,
            scalar,
            tdb_fraction: OnceCell::new(),
            ut1_fraction: OnceCell::new(),
            tilt: OnceCell::new(),
            gmst: OnceCell::new(),
            gast: OnceCell::new(),
            orientation: OnceCell::new(),
        }
    }

    fn split_jd(jd: f64, fraction: Option<f64>) -> (f64, f64) {
        match fraction {
            Some(f) => (jd, f),
            None => {
                let whole = jd.floor();
                (whole, jd - whole)
            }
        }
    }

    fn non_empty(values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(TimeError::OutOfRange(
                "a time array needs at least one element".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the current time
    pub fn now(&self) -> Time {
        let now = Utc::now();
        let fields = (
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second() as f64 + now.nanosecond() as f64 / 1e9,
        );
        let (whole, tt_fraction) = self.utc_to_tt(fields);
        self.build(Array1::from(vec![whole]), Array1::from(vec![tt_fraction]), true)
    }

    /// Create a time from any timezone-aware chrono datetime
    pub fn from_datetime<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> Result<Time> {
        let utc = dt.with_timezone(&Utc);
        // chrono encodes a leap second as a nanosecond count past one billion
        self.utc((
            utc.year(),
            utc.month(),
            utc.day(),
            utc.hour(),
            utc.minute(),
            utc.second() as f64 + utc.nanosecond() as f64 / 1e9,
        ))
    }

    /// Parse an ISO 8601 timestamp such as `2024-03-01T12:30:00Z`
    ///
    /// A zone designator (`Z` or a numeric UTC offset) is required; naive
    /// wall-clock strings are rejected rather than assigned a zone.
    pub fn from_iso(&self, text: &str) -> Result<Time> {
        let text = text.trim();
        let caps = ISO_8601
            .captures(text)
            .ok_or_else(|| TimeError::InvalidFormat(text.to_string()))?;

        let zone = caps
            .get(7)
            .ok_or_else(|| TimeError::TimezoneNaive(text.to_string()))?
            .as_str();

        let field = |i: usize| -> Result<&str> {
            caps.get(i)
                .map(|m| m.as_str())
                .ok_or_else(|| TimeError::InvalidFormat(text.to_string()))
        };
        let parse_err = |_| TimeError::InvalidFormat(text.to_string());

        let year: i32 = field(1)?.parse().map_err(parse_err)?;
        let month: u32 = field(2)?.parse().map_err(parse_err)?;
        let day: u32 = field(3)?.parse().map_err(parse_err)?;
        let hour: u32 = field(4)?.parse().map_err(parse_err)?;
        let minute: u32 = field(5)?.parse().map_err(parse_err)?;
        let second: f64 = match caps.get(6) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| TimeError::InvalidFormat(text.to_string()))?,
            None => 0.0,
        };

        Self::validate(year, month, day, hour, minute, second)?;

        let offset_minutes = parse_utc_offset(zone)
            .ok_or_else(|| TimeError::InvalidFormat(text.to_string()))?;
        if offset_minutes == 0 {
            return self.utc((year, month, day, hour, minute, second));
        }

        // Shift the wall clock to UTC, carrying whole days through the day number
        let minutes = (hour * 60 + minute) as i64 - offset_minutes;
        let day_shift = minutes.div_euclid(1440);
        let minutes = minutes.rem_euclid(1440);
        let day_number = self.julian_day(year, month, day) + day_shift as i32;
        let (year, month, day) = self.julian_day_to_calendar_date(day_number);

        self.utc((
            year,
            month,
            day,
            (minutes / 60) as u32,
            (minutes % 60) as u32,
            second,
        ))
    }

    fn validate(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Result<()> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(TimeError::OutOfRange(format!(
                "no calendar date {:04}-{:02}-{:02}",
                year, month, day
            )));
        }
        if hour > 23 || minute > 59 || !(0.0..61.0).contains(&second) {
            return Err(TimeError::OutOfRange(format!(
                "no clock time {:02}:{:02}:{}",
                hour, minute, second
            )));
        }
        Ok(())
    }

    /// Whole and TT-fraction parts for a UTC calendar stamp
    ///
    /// TAI-UTC is chosen by the calendar day, so a `:60` second on a leap
    /// day lands one second before the following midnight.
    fn utc_to_tt(&self, fields: (i32, u32, u32, u32, u32, f64)) -> (f64, f64) {
        let (year, month, day, hour, minute, second) = fields;
        let midnight = self.julian_day(year, month, day) as f64 - 0.5;

        if midnight < self.leap_seconds.first_boundary() {
            warn!(
                "UTC date {:04}-{:02}-{:02} precedes the leap-second table; extending its first offset",
                year, month, day
            );
        }

        let offset = self.leap_seconds.offset_for_utc(midnight);
        let tai_fraction =
            (second + offset) / DAY_S + minute as f64 / 1440.0 + hour as f64 / 24.0;

        (midnight, tai_fraction + TT_MINUS_TAI)
    }

    /// Create a time from a UTC date and time
    pub fn utc<T: Into<CalendarInput>>(&self, date: T) -> Result<Time> {
        self.utc_array(std::iter::once(date)).map(|mut t| {
            t.scalar = true;
            t
        })
    }

    /// Create an array time from a sequence of UTC dates and times
    pub fn utc_array<T, I>(&self, dates: I) -> Result<Time>
    where
        T: Into<CalendarInput>,
        I: IntoIterator<Item = T>,
    {
        let mut whole = Vec::new();
        let mut tt_fraction = Vec::new();

        for date in dates {
            let fields = date.into().fields();
            let (y, m, d, h, mi, s) = fields;
            Self::validate(y, m, d, h, mi, s)?;
            let (w, f) = self.utc_to_tt(fields);
            whole.push(w);
            tt_fraction.push(f);
        }

        Self::non_empty(&whole)?;
        Ok(self.build(Array1::from(whole), Array1::from(tt_fraction), false))
    }

    fn calendar_parts(&self, input: CalendarInput) -> (f64, f64) {
        let (year, month, day, hour, minute, second) = input.fields();
        let midnight = self.julian_day(year, month, day) as f64 - 0.5;
        let fraction = (hour as f64 + minute as f64 / 60.0 + second / 3600.0) / 24.0;
        (midnight, fraction)
    }

    /// Create a time from a TAI calendar date and time
    pub fn tai<T: Into<CalendarInput>>(&self, date: T) -> Time {
        let (whole, fraction) = self.calendar_parts(date.into());
        self.tai_jd(whole, Some(fraction))
    }

    /// Create a time from a TT calendar date and time
    pub fn tt<T: Into<CalendarInput>>(&self, date: T) -> Time {
        let (whole, fraction) = self.calendar_parts(date.into());
        self.tt_jd(whole, Some(fraction))
    }

    /// Create a time from a TAI Julian date
    pub fn tai_jd(&self, jd: f64, fraction: Option<f64>) -> Time {
        let (whole, frac) = Self::split_jd(jd, fraction);
        self.build(
            Array1::from(vec![whole]),
            Array1::from(vec![frac + TT_MINUS_TAI]),
            true,
        )
    }

    /// Create a time from a TT Julian date
    pub fn tt_jd(&self, jd: f64, fraction: Option<f64>) -> Time {
        let (whole, frac) = Self::split_jd(jd, fraction);
        self.build(Array1::from(vec![whole]), Array1::from(vec![frac]), true)
    }

    /// Create a time from a TDB Julian date
    pub fn tdb_jd(&self, jd: f64, fraction: Option<f64>) -> Time {
        let (whole, frac) = Self::split_jd(jd, fraction);
        let mut t = self.build(
            Array1::from(vec![whole]),
            Array1::from(vec![tdb_to_tt_fraction(whole, frac)]),
            true,
        );
        t.tdb_fraction = OnceCell::from(Array1::from(vec![frac]));
        t
    }

    /// Create an array time from TAI Julian dates
    pub fn tai_jd_array(&self, jds: &[f64]) -> Result<Time> {
        Self::non_empty(jds)?;
        let (whole, frac): (Vec<f64>, Vec<f64>) =
            jds.iter().map(|&jd| Self::split_jd(jd, None)).unzip();
        let tt: Vec<f64> = frac.iter().map(|f| f + TT_MINUS_TAI).collect();
        Ok(self.build(Array1::from(whole), Array1::from(tt), false))
    }

    /// Create an array time from TT Julian dates
    pub fn tt_jd_array(&self, jds: &[f64]) -> Result<Time> {
        Self::non_empty(jds)?;
        let (whole, frac): (Vec<f64>, Vec<f64>) =
            jds.iter().map(|&jd| Self::split_jd(jd, None)).unzip();
        Ok(self.build(Array1::from(whole), Array1::from(frac), false))
    }

    /// Create an array time from TDB Julian dates
    pub fn tdb_jd_array(&self, jds: &[f64]) -> Result<Time> {
        Self::non_empty(jds)?;
        let (whole, frac): (Vec<f64>, Vec<f64>) =
            jds.iter().map(|&jd| Self::split_jd(jd, None)).unzip();
        let tt: Array1<f64> = whole
            .iter()
            .zip(frac.iter())
            .map(|(&w, &f)| tdb_to_tt_fraction(w, f))
            .collect();
        let mut t = self.build(Array1::from(whole), tt, false);
        t.tdb_fraction = OnceCell::from(Array1::from(frac));
        Ok(t)
    }

    /// Create a time from a TT Julian year, such as 2000.0 for J2000.0
    pub fn j(&self, year: f64) -> Time {
        let tt = year * 365.25 + 1_721_045.0;
        self.tt_jd(tt, None)
    }

    /// Create `num` times equally spaced in TT from `t0` to `t1` inclusive
    ///
    /// Only the first element of each endpoint is used.
    pub fn linspace(&self, t0: &Time, t1: &Time, num: usize) -> Time {
        let num = num.max(1);
        let (w0, f0) = (t0.whole[0], t0.tt_fraction[0]);
        let (w1, f1) = (t1.whole[0], t1.tt_fraction[0]);
        let span = num.saturating_sub(1).max(1) as f64;

        let whole = Array1::from_elem(num, w0);
        let tt_fraction: Array1<f64> = (0..num)
            .map(|i| {
                let k = i as f64 / span;
                f0 + k * ((w1 - w0) + (f1 - f0))
            })
            .collect();

        self.build(whole, tt_fraction, false)
    }
}

/// Minutes east of UTC for a zone designator
fn parse_utc_offset(zone: &str) -> Option<i64> {
    if zone == "Z" {
        return Some(0);
    }
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits: String = zone[1..].chars().filter(|c| *c != ':').collect();
    let hours: i64 = digits.get(0..2)?.parse().ok()?;
    let minutes: i64 = match digits.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    Some(sign * (hours * 60 + minutes))
}

/// Rotation matrices for every element of a `Time`
#[derive(Debug, Clone)]
struct Orientation {
    precession: Vec<Matrix3<f64>>,
    nutation: Vec<Matrix3<f64>>,
    m: Vec<Matrix3<f64>>,
    mt: Vec<Matrix3<f64>>,
}

impl Orientation {
    fn slice(&self, range: Range<usize>) -> Self {
        Self {
            precession: self.precession[range.clone()].to_vec(),
            nutation: self.nutation[range.clone()].to_vec(),
            m: self.m[range.clone()].to_vec(),
            mt: self.mt[range].to_vec(),
        }
    }
}

fn slice_array(cell: &OnceCell<Array1<f64>>, range: &Range<usize>) -> OnceCell<Array1<f64>> {
    match cell.get() {
        Some(a) => OnceCell::from(a.slice(s![range.start..range.end]).to_owned()),
        None => OnceCell::new(),
    }
}

/// One or more instants, readable in every supported time scale
///
/// Internally each instant is a whole Julian date plus a TT day fraction.
/// Other scales and the orientation quantities are derived on first use
/// and cached.
#[derive(Debug, Clone)]
pub struct Time {
    ts: Timescale,
    whole: Array1<f64>,
    tt_fraction: Array1<f64>,
    /// Built from a single value rather than an array
    scalar: bool,
    tdb_fraction: OnceCell<Array1<f64>>,
    ut1_fraction: OnceCell<Array1<f64>>,
    tilt: OnceCell<Vec<EarthTilt>>,
    gmst: OnceCell<Array1<f64>>,
    gast: OnceCell<Array1<f64>>,
    orientation: OnceCell<Orientation>,
}

impl Time {
    /// Number of instants
    pub fn len(&self) -> usize {
        self.whole.len()
    }

    /// Always false; a `Time` holds at least one instant
    pub fn is_empty(&self) -> bool {
        self.whole.is_empty()
    }

    /// Whether this time was built from a single value
    pub fn is_scalar(&self) -> bool {
        self.scalar
    }

    pub fn timescale(&self) -> &Timescale {
        &self.ts
    }

    /// The instant at `index` as a scalar time, sharing any cached values
    pub fn get(&self, index: usize) -> Option<Time> {
        let mut t = self.slice(index..index + 1)?;
        t.scalar = true;
        Some(t)
    }

    /// A sub-array of instants, sharing any cached values
    pub fn slice(&self, range: Range<usize>) -> Option<Time> {
        if range.start >= range.end || range.end > self.len() {
            return None;
        }

        Some(Time {
            ts: self.ts.clone(),
            whole: self.whole.slice(s![range.start..range.end]).to_owned(),
            tt_fraction: self.tt_fraction.slice(s![range.start..range.end]).to_owned(),
            scalar: false,
            tdb_fraction: slice_array(&self.tdb_fraction, &range),
            ut1_fraction: slice_array(&self.ut1_fraction, &range),
            tilt: match self.tilt.get() {
                Some(v) => OnceCell::from(v[range.clone()].to_vec()),
                None => OnceCell::new(),
            },
            gmst: slice_array(&self.gmst, &range),
            gast: slice_array(&self.gast, &range),
            orientation: match self.orientation.get() {
                Some(o) => OnceCell::from(o.slice(range)),
                None => OnceCell::new(),
            },
        })
    }

    /// Iterate over the instants as scalar times
    pub fn iter(&self) -> impl Iterator<Item = Time> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Whole-day part shared by every scale
    pub fn whole(&self) -> &Array1<f64> {
        &self.whole
    }

    pub fn tt_fraction(&self) -> &Array1<f64> {
        &self.tt_fraction
    }

    pub fn tdb_fraction(&self) -> &Array1<f64> {
        self.tdb_fraction.get_or_init(|| {
            self.whole
                .iter()
                .zip(self.tt_fraction.iter())
                .map(|(&w, &f)| tt_to_tdb_fraction(w, f))
                .collect()
        })
    }

    pub fn ut1_fraction(&self) -> &Array1<f64> {
        self.ut1_fraction.get_or_init(|| {
            self.whole
                .iter()
                .zip(self.tt_fraction.iter())
                .map(|(&w, &f)| f - self.ts.delta_t(w + f) / DAY_S)
                .collect()
        })
    }

    /// TAI as Julian dates
    pub fn tai(&self) -> Array1<f64> {
        &self.whole + &self.tt_fraction - TT_MINUS_TAI
    }

    /// TT as Julian dates
    pub fn tt(&self) -> Array1<f64> {
        &self.whole + &self.tt_fraction
    }

    /// TDB as Julian dates
    pub fn tdb(&self) -> Array1<f64> {
        &self.whole + self.tdb_fraction()
    }

    /// UT1 as Julian dates
    pub fn ut1(&self) -> Array1<f64> {
        &self.whole + self.ut1_fraction()
    }

    /// UTC as Julian dates, continuous except across leap seconds
    pub fn utc_jd(&self) -> Array1<f64> {
        self.tai()
            .mapv(|tai| tai - self.ts.leap_seconds.offset_for_tai(tai).offset_s / DAY_S)
    }

    /// TT as Julian years
    pub fn j(&self) -> Array1<f64> {
        (&self.whole - 1_721_045.0 + &self.tt_fraction) / 365.25
    }

    /// Delta T (TT - UT1) in seconds
    pub fn delta_t(&self) -> Array1<f64> {
        (&self.tt_fraction - self.ut1_fraction()) * DAY_S
    }

    /// TAI - UTC in seconds
    pub fn leap_seconds(&self) -> Array1<f64> {
        self.tai()
            .mapv(|tai| self.ts.leap_seconds.offset_for_tai(tai).offset_s)
    }

    /// Obliquity, nutation angles and equation of the equinoxes per instant
    pub fn earth_tilt(&self) -> &[EarthTilt] {
        self.tilt.get_or_init(|| {
            let tdb = self.tdb();
            match self.ts.nutation_series.as_deref() {
                Some(series) => {
                    debug!(
                        "evaluating {}-term nutation series for {} instants",
                        series.longitude_terms(),
                        self.len()
                    );
                    tdb.iter()
                        .map(|&jd| earth_tilt_from_series(jd, series))
                        .collect()
                }
                None => {
                    debug!(
                        "evaluating {:?} nutation for {} instants",
                        self.ts.nutation_model,
                        self.len()
                    );
                    tdb.iter()
                        .map(|&jd| earth_tilt(jd, self.ts.nutation_model))
                        .collect()
                }
            }
        })
    }

    /// Greenwich Mean Sidereal Time in hours
    pub fn gmst(&self) -> &Array1<f64> {
        self.gmst.get_or_init(|| {
            let tdb = self.tdb();
            self.whole
                .iter()
                .zip(self.ut1_fraction().iter())
                .zip(tdb.iter())
                .map(|((&w, &f), &jd_tdb)| sidereal_time_hours(w, f, jd_tdb, None))
                .collect()
        })
    }

    /// Greenwich Apparent Sidereal Time in hours
    pub fn gast(&self) -> &Array1<f64> {
        self.gast.get_or_init(|| {
            let tdb = self.tdb();
            self.whole
                .iter()
                .zip(self.ut1_fraction().iter())
                .zip(tdb.iter())
                .zip(self.earth_tilt().iter())
                .map(|(((&w, &f), &jd_tdb), tilt)| {
                    sidereal_time_hours(w, f, jd_tdb, Some(tilt.equation_of_the_equinoxes))
                })
                .collect()
        })
    }

    fn orientation(&self) -> &Orientation {
        self.orientation.get_or_init(|| {
            debug!("computing orientation matrices for {} instants", self.len());
            let n = self.len();
            let mut orientation = Orientation {
                precession: Vec::with_capacity(n),
                nutation: Vec::with_capacity(n),
                m: Vec::with_capacity(n),
                mt: Vec::with_capacity(n),
            };

            for (&jd_tdb, tilt) in self.tdb().iter().zip(self.earth_tilt()) {
                let p = compute_precession(jd_tdb);
                let n = compute_nutation(tilt);
                let m = n * p * *ICRS_TO_J2000;
                orientation.precession.push(p);
                orientation.nutation.push(n);
                orientation.m.push(m);
                orientation.mt.push(m.transpose());
            }
            orientation
        })
    }

    /// Precession matrices (mean J2000 to mean of date)
    pub fn precession_matrix(&self) -> &[Matrix3<f64>] {
        &self.orientation().precession
    }

    /// Nutation matrices (mean of date to true of date)
    pub fn nutation_matrix(&self) -> &[Matrix3<f64>] {
        &self.orientation().nutation
    }

    /// Combined rotations N·P·B from the ICRS to the true equator and equinox of date
    pub fn m_matrix(&self) -> &[Matrix3<f64>] {
        &self.orientation().m
    }

    /// Transposes of [`Time::m_matrix`], true of date back to the ICRS
    pub fn mt_matrix(&self) -> &[Matrix3<f64>] {
        &self.orientation().mt
    }

    /// UTC calendar fields, rendering an inserted leap second as second 60
    pub fn utc_calendar(&self) -> Vec<CalendarTuple> {
        self.utc_calendar_shifted(0.0)
    }

    /// UTC calendar fields after adding `shift_s` seconds of TAI
    fn utc_calendar_shifted(&self, shift_s: f64) -> Vec<CalendarTuple> {
        let cutoff = self.ts.julian_calendar_cutoff;
        self.whole
            .iter()
            .zip(self.tt_fraction.iter())
            .map(|(&whole, &tt_fraction)| {
                let tai_fraction = tt_fraction - TT_MINUS_TAI + shift_s / DAY_S;
                let located = self.ts.leap_seconds.offset_for_tai(whole + tai_fraction);
                match located.leap_second {
                    Some(leap) => {
                        let mut cal = calendar_tuple(leap.next_midnight - 1.0, 0.0, cutoff);
                        cal.hour = 23;
                        cal.minute = 59;
                        cal.second = 60.0 + leap.elapsed_s.clamp(0.0, 0.999_999_999);
                        cal
                    }
                    None => {
                        calendar_tuple(whole, tai_fraction - located.offset_s / DAY_S, cutoff)
                    }
                }
            })
            .collect()
    }

    /// TT calendar fields
    pub fn tt_calendar(&self) -> Vec<CalendarTuple> {
        let cutoff = self.ts.julian_calendar_cutoff;
        self.whole
            .iter()
            .zip(self.tt_fraction.iter())
            .map(|(&w, &f)| calendar_tuple(w, f, cutoff))
            .collect()
    }

    /// Round to `places` decimal places of a second and split the seconds field
    fn rounded_utc(&self, places: usize) -> Vec<(CalendarTuple, u32, u64)> {
        let scale = 10f64.powi(places as i32);
        let half_unit = 0.5 / scale;
        self.utc_calendar_shifted(half_unit)
            .into_iter()
            .map(|cal| {
                let whole_seconds = cal.second.floor();
                let digits = ((cal.second - whole_seconds) * scale).floor() as u64;
                let digits = digits.min(scale as u64 - 1);
                (cal, whole_seconds as u32, digits)
            })
            .collect()
    }

    /// ISO 8601 renderings such as `2024-03-01T12:30:00.000Z`
    pub fn utc_iso(&self, places: usize) -> Vec<String> {
        self.rounded_utc(places)
            .into_iter()
            .map(|(cal, sec, digits)| {
                let date = format!(
                    "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                    cal.year, cal.month, cal.day, cal.hour, cal.minute, sec
                );
                if places > 0 {
                    format!("{}.{:0width$}Z", date, digits, width = places)
                } else {
                    format!("{}Z", date)
                }
            })
            .collect()
    }

    /// JPL HORIZONS style renderings such as `A.D. 2014-Jan-18 01:35:37.5000 UT`
    pub fn utc_jpl(&self) -> Vec<String> {
        self.rounded_utc(4)
            .into_iter()
            .map(|(cal, sec, digits)| {
                let (era, year) = if cal.year < 1 {
                    ("B.C.", 1 - cal.year)
                } else {
                    ("A.D.", cal.year)
                };
                format!(
                    "{} {:04}-{}-{:02} {:02}:{:02}:{:02}.{:04} UT",
                    era,
                    year,
                    MONTH_ABBREVIATIONS[(cal.month - 1) as usize],
                    cal.day,
                    cal.hour,
                    cal.minute,
                    sec,
                    digits
                )
            })
            .collect()
    }

    /// Add `days` of TT to every instant
    fn shifted(&self, days: f64) -> Time {
        self.ts
            .build(self.whole.clone(), &self.tt_fraction + days, self.scalar)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iso = self.utc_iso(3);
        match iso.as_slice() {
            [one] => write!(f, "<Time {}>", one),
            [first, .., last] => write!(f, "<Time {} values from {} to {}>", iso.len(), first, last),
            [] => write!(f, "<Time>"),
        }
    }
}

impl Add<f64> for &Time {
    type Output = Time;

    fn add(self, days: f64) -> Time {
        self.shifted(days)
    }
}

impl Add<f64> for Time {
    type Output = Time;

    fn add(self, days: f64) -> Time {
        self.shifted(days)
    }
}

impl Sub<f64> for &Time {
    type Output = Time;

    fn sub(self, days: f64) -> Time {
        self.shifted(-days)
    }
}

/// Differences in TT days; a length-1 operand is broadcast
impl Sub<&Time> for &Time {
    type Output = Array1<f64>;

    fn sub(self, other: &Time) -> Array1<f64> {
        let n = self.len().max(other.len());
        let at = |t: &Time, i: usize| {
            let i = i.min(t.len() - 1);
            (t.whole[i], t.tt_fraction[i])
        };
        (0..n)
            .map(|i| {
                let (w0, f0) = at(self, i);
                let (w1, f1) = at(other, i);
                (w0 - w1) + (f0 - f1)
            })
            .collect()
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.tt() == other.tt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TT_MINUS_TAI_S;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::FixedOffset;
    use rstest::rstest;

    #[test]
    fn test_time_scales() {
        let ts = Timescale::default().with_delta_t(69.0);
        let t = ts.tt_jd(J2000, None);

        assert_eq!(t.tt()[0], J2000);
        assert_relative_eq!((J2000 - t.tai()[0]) * DAY_S, TT_MINUS_TAI_S, epsilon = 1e-4);
        assert_relative_eq!(t.delta_t()[0], 69.0, epsilon = 1e-6);
        assert_relative_eq!((t.tt()[0] - t.ut1()[0]) * DAY_S, 69.0, epsilon = 1e-4);

        // TDB differs from TT by at most about 1.7 ms
        let tdb_minus_tt_s = (t.tdb_fraction()[0] - t.tt_fraction()[0]) * DAY_S;
        assert!(tdb_minus_tt_s.abs() < 0.002);
    }

    #[test]
    fn test_delta_t_defaults_to_zero() {
        let t = Timescale::default().tt_jd(2_459_000.5, None);
        assert_eq!(t.delta_t()[0], 0.0);
        assert_eq!(t.ut1()[0], t.tt()[0]);
    }

    #[test]
    fn test_delta_t_table_interpolates() {
        let ts = Timescale::default()
            .with_delta_t_table(vec![2_451_545.0, 2_451_645.0], vec![64.0, 65.0])
            .unwrap();
        assert_relative_eq!(ts.delta_t(2_451_595.0), 64.5);
        assert_eq!(ts.delta_t(2_400_000.0), 64.0);
        assert_eq!(ts.delta_t(2_500_000.0), 65.0);

        assert!(Timescale::default()
            .with_delta_t_table(vec![1.0, 0.0], vec![1.0, 2.0])
            .is_err());
    }

    #[test]
    fn test_tt_tdb_round_trip() {
        for fraction in [0.0, 0.125, 0.25, 0.375] {
            for whole in [2_415_020.0, J2000, 2_460_000.0, 2_488_069.0] {
                let tt = tdb_to_tt_fraction(whole, fraction);
                let back = tt_to_tdb_fraction(whole, tt);
                assert_abs_diff_eq!(back, fraction, epsilon = 1e-16);
            }
        }
    }

    #[test]
    fn test_tdb_constructor_keeps_exact_tdb() {
        let ts = Timescale::default();
        let t = ts.tdb_jd(2_460_000.0, Some(0.25));
        assert_eq!(t.tdb_fraction()[0], 0.25);
        assert_abs_diff_eq!(
            tt_to_tdb_fraction(t.whole()[0], t.tt_fraction()[0]),
            0.25,
            epsilon = 1e-16
        );
    }

    #[test]
    fn test_utc_j2000() {
        let ts = Timescale::default();
        let t = ts.utc((2000, 1, 1, 12, 0, 0.0)).unwrap();
        // TT - UTC was 64.184 s in 2000
        let tt_minus_j2000 = (t.whole()[0] - J2000) + t.tt_fraction()[0];
        assert_abs_diff_eq!(tt_minus_j2000 * DAY_S, 64.184, epsilon = 1e-6);
        assert_eq!(t.leap_seconds()[0], 32.0);
    }

    #[test]
    fn test_leap_second_parses_and_spans_two_seconds() {
        let ts = Timescale::default();
        let before = ts.utc((1973, 12, 31, 23, 59, 59.0)).unwrap();
        let leap = ts.utc((1973, 12, 31, 23, 59, 60.0)).unwrap();
        let after = ts.utc((1974, 1, 1, 0, 0, 0.0)).unwrap();

        assert_abs_diff_eq!((&after - &leap)[0] * DAY_S, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!((&leap - &before)[0] * DAY_S, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!((&after - &before)[0] * DAY_S, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_leap_second_renders_as_sixty() {
        let ts = Timescale::default();
        let leap = ts.utc((1973, 12, 31, 23, 59, 60.5)).unwrap();
        let cal = &leap.utc_calendar()[0];
        assert_eq!((cal.year, cal.month, cal.day), (1973, 12, 31));
        assert_eq!((cal.hour, cal.minute), (23, 59));
        assert_abs_diff_eq!(cal.second, 60.5, epsilon = 1e-3);
        assert_eq!(leap.utc_iso(1)[0], "1973-12-31T23:59:60.5Z");
    }

    #[rstest]
    #[case((2014, 1, 18, 1, 35, 37.5), "2014-01-18T01:35:37.500Z", "A.D. 2014-Jan-18 01:35:37.5000 UT")]
    #[case((1999, 12, 31, 23, 59, 59.9996), "2000-01-01T00:00:00.000Z", "A.D. 1999-Dec-31 23:59:59.9996 UT")]
    #[case((2016, 2, 29, 12, 0, 0.0), "2016-02-29T12:00:00.000Z", "A.D. 2016-Feb-29 12:00:00.0000 UT")]
    fn test_renderings(
        #[case] fields: (i32, u32, u32, u32, u32, f64),
        #[case] iso: &str,
        #[case] jpl: &str,
    ) {
        let t = Timescale::default().utc(fields).unwrap();
        assert_eq!(t.utc_iso(3)[0], iso);
        assert_eq!(t.utc_jpl()[0], jpl);
    }

    #[rstest]
    #[case((2020, 13, 1, 0, 0, 0.0))]
    #[case((2020, 1, 1, 24, 0, 0.0))]
    #[case((2020, 1, 1, 0, 60, 0.0))]
    #[case((2020, 1, 1, 0, 0, 61.0))]
    #[case((2020, 1, 1, 0, 0, -1.0))]
    fn test_out_of_range_fields_rejected(#[case] fields: (i32, u32, u32, u32, u32, f64)) {
        let err = Timescale::default().utc(fields);
        assert!(matches!(err, Err(TimeError::OutOfRange(_))));
    }

    #[test]
    fn test_iso_requires_zone() {
        let ts = Timescale::default();
        let err = ts.from_iso("2020-06-01T12:00:00");
        assert!(matches!(err, Err(TimeError::TimezoneNaive(_))));
        assert!(matches!(
            ts.from_iso("yesterday"),
            Err(TimeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_iso_offsets_match_utc() {
        let ts = Timescale::default();
        let utc = ts.utc((2020, 6, 1, 2, 30, 15.25)).unwrap();

        let z = ts.from_iso("2020-06-01T02:30:15.25Z").unwrap();
        let east = ts.from_iso("2020-06-01T08:00:15.25+05:30").unwrap();
        let west = ts.from_iso("2020-05-31T21:30:15.25-0500").unwrap();

        for t in [&z, &east, &west] {
            assert_abs_diff_eq!((t - &utc)[0], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_from_datetime_any_zone() {
        let ts = Timescale::default();
        let zone = FixedOffset::east_opt(3600).unwrap();
        let dt = zone.with_ymd_and_hms(2021, 3, 4, 13, 0, 0).unwrap();
        let t = ts.from_datetime(&dt).unwrap();
        let expected = ts.utc((2021, 3, 4, 12, 0, 0.0)).unwrap();
        assert_abs_diff_eq!((&t - &expected)[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_array_indexing_shares_cache() {
        let ts = Timescale::default();
        let t = ts
            .tt_jd_array(&[2_451_545.0, 2_455_000.5, 2_460_000.25])
            .unwrap();
        assert_eq!(t.len(), 3);
        assert!(!t.is_scalar());

        // Populate caches, then slice
        let m = t.m_matrix().to_vec();
        let gast = t.gast().clone();

        let one = t.get(1).unwrap();
        assert!(one.is_scalar());
        assert!(one.orientation.get().is_some());
        assert_eq!(one.m_matrix()[0], m[1]);
        assert_eq!(one.gast()[0], gast[1]);

        let tail = t.slice(1..3).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.tt()[1], t.tt()[2]);

        assert!(t.get(3).is_none());
        assert!(t.slice(2..2).is_none());
    }

    #[test]
    fn test_array_matches_scalar_calls() {
        let ts = Timescale::default().with_delta_t(68.0);
        let jds = [2_440_000.5, 2_451_545.0, 2_458_849.5, 2_470_000.75];
        let batch = ts.tt_jd_array(&jds).unwrap();

        for (i, &jd) in jds.iter().enumerate() {
            let single = ts.tt_jd(jd, None);
            assert_relative_eq!(batch.gast()[i], single.gast()[0], max_relative = 1e-15);
            assert_relative_eq!(batch.gmst()[i], single.gmst()[0], max_relative = 1e-15);
            assert_relative_eq!(batch.m_matrix()[i], single.m_matrix()[0], max_relative = 1e-15);
            assert_relative_eq!(batch.tdb()[i], single.tdb()[0], max_relative = 1e-15);
        }
    }

    #[test]
    fn test_orientation_matrices_are_rotations() {
        let t = Timescale::default().utc((2024, 4, 8, 18, 0, 0.0)).unwrap();
        let m = t.m_matrix()[0];
        let mt = t.mt_matrix()[0];
        assert_abs_diff_eq!(m * mt, Matrix3::identity(), epsilon = 1e-14);
        let composed = t.nutation_matrix()[0] * t.precession_matrix()[0] * *ICRS_TO_J2000;
        assert_abs_diff_eq!(composed, m, epsilon = 1e-15);
    }

    #[test]
    fn test_time_math() {
        let ts = Timescale::default();
        let t1 = ts.tt_jd(J2000, None);
        let t2 = &t1 + 1.5;
        assert_relative_eq!(t2.tt()[0], J2000 + 1.5, epsilon = 1e-10);
        assert_relative_eq!((&t2 - &t1)[0], 1.5, epsilon = 1e-15);

        let many = ts.linspace(&t1, &t2, 4);
        assert_eq!(many.len(), 4);
        let offsets = &many - &t1;
        assert_abs_diff_eq!(offsets[1], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(offsets[3], 1.5, epsilon = 1e-15);
    }

    #[test]
    fn test_julian_year() {
        let ts = Timescale::default();
        assert_eq!(ts.j(2000.0).tt()[0], J2000);
        assert_relative_eq!(ts.tt_jd(J2000 + 365.25, None).j()[0], 2001.0);
    }

    #[test]
    fn test_gregorian_cutoff_changes_calendar() {
        let proleptic = Timescale::default().with_julian_calendar_cutoff(None);
        assert_eq!(proleptic.julian_day(1582, 10, 4), GREGORIAN_START - 11);
        let ts = Timescale::default();
        assert_eq!(ts.julian_day(1582, 10, 4), GREGORIAN_START - 1);
    }

    #[test]
    fn test_nutation_series_replaces_model() {
        let stamps = [J2000, 2_460_000.5];
        let by_model = Timescale::default().tt_jd_array(&stamps).unwrap();
        let ts = Timescale::default().with_nutation_series(NutationSeries::builtin());
        assert!(ts.nutation_series().is_some());
        let by_series = ts.tt_jd_array(&stamps).unwrap();

        for (a, b) in by_model.earth_tilt().iter().zip(by_series.earth_tilt()) {
            assert_abs_diff_eq!(a.dpsi, b.dpsi, epsilon = 1e-9);
            assert_abs_diff_eq!(a.deps, b.deps, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(by_model.gast()[1], by_series.gast()[1], epsilon = 1e-12);

        let ts = ts.with_nutation_model(NutationModel::Iau2000B);
        assert!(ts.nutation_series().is_none());
    }

    #[test]
    fn test_display() {
        let ts = Timescale::default();
        let t = ts.utc((2020, 1, 1, 0, 0, 0.0)).unwrap();
        assert_eq!(t.to_string(), "<Time 2020-01-01T00:00:00.000Z>");
    }
}
