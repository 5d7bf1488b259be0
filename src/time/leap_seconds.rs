//! Leap-second table for UTC <-> TAI conversion
//!
//! The table holds the Julian dates of the UTC midnights at which TAI-UTC
//! changed, bracketed by -inf/+inf sentinels, and the offset in force from
//! each boundary up to the next. Lookups are binary searches.

use super::TimeError;
use crate::constants::DAY_S;

/// Leap seconds announced by the IERS through 2017-01-01
///
/// Format: (Julian date of the UTC midnight, TAI-UTC in seconds from then on)
const BUILTIN_LEAP_SECONDS: [(f64, i32); 28] = [
    (2_441_317.5, 10), // 1972-01-01
    (2_441_499.5, 11), // 1972-07-01
    (2_441_683.5, 12), // 1973-01-01
    (2_442_048.5, 13), // 1974-01-01
    (2_442_413.5, 14), // 1975-01-01
    (2_442_778.5, 15), // 1976-01-01
    (2_443_144.5, 16), // 1977-01-01
    (2_443_509.5, 17), // 1978-01-01
    (2_443_874.5, 18), // 1979-01-01
    (2_444_239.5, 19), // 1980-01-01
    (2_444_786.5, 20), // 1981-07-01
    (2_445_151.5, 21), // 1982-07-01
    (2_445_516.5, 22), // 1983-07-01
    (2_446_247.5, 23), // 1985-07-01
    (2_447_161.5, 24), // 1988-01-01
    (2_447_892.5, 25), // 1990-01-01
    (2_448_257.5, 26), // 1991-01-01
    (2_448_804.5, 27), // 1992-07-01
    (2_449_169.5, 28), // 1993-07-01
    (2_449_534.5, 29), // 1994-07-01
    (2_450_083.5, 30), // 1996-01-01
    (2_450_630.5, 31), // 1997-07-01
    (2_451_179.5, 32), // 1999-01-01
    (2_453_736.5, 33), // 2006-01-01
    (2_454_832.5, 34), // 2009-01-01
    (2_456_109.5, 35), // 2012-07-01
    (2_457_204.5, 36), // 2015-07-01
    (2_457_754.5, 37), // 2017-01-01
];

/// An instant that falls inside an inserted leap second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeapSecond {
    /// Julian date of the UTC midnight that follows the leap second
    pub next_midnight: f64,
    /// Seconds elapsed since 23:59:60 began
    pub elapsed_s: f64,
}

/// Where a TAI instant falls relative to the leap-second table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtcOffset {
    /// TAI-UTC in seconds in force at the instant
    pub offset_s: f64,
    pub leap_second: Option<LeapSecond>,
}

/// Ascending table of UTC leap-second boundaries
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSecondTable {
    /// UTC boundaries with -inf and +inf sentinels
    boundaries: Vec<f64>,
    /// The same boundaries expressed in TAI
    tai_boundaries: Vec<f64>,
    /// `offsets[i]` applies from `boundaries[i]` up to `boundaries[i + 1]`
    offsets: Vec<f64>,
}

impl LeapSecondTable {
    /// The table of every leap second announced through 2017
    pub fn builtin() -> Self {
        // The built-in table is ascending by construction
        Self::build(&BUILTIN_LEAP_SECONDS)
    }

    /// Build a table from caller-supplied (UTC midnight JD, TAI-UTC seconds) pairs
    ///
    /// Dates must be strictly ascending. Times before the first boundary use
    /// the first offset.
    pub fn from_pairs(pairs: &[(f64, i32)]) -> Result<Self, TimeError> {
        if pairs.is_empty() {
            return Err(TimeError::LeapSecondTable(
                "at least one boundary is required".to_string(),
            ));
        }
        if let Some(w) = pairs.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(TimeError::LeapSecondTable(format!(
                "boundaries must ascend, found {} after {}",
                w[1].0, w[0].0
            )));
        }
        if pairs.iter().any(|(jd, _)| !jd.is_finite()) {
            return Err(TimeError::LeapSecondTable(
                "boundaries must be finite".to_string(),
            ));
        }
        Ok(Self::build(pairs))
    }

    fn build(pairs: &[(f64, i32)]) -> Self {
        let mut boundaries = Vec::with_capacity(pairs.len() + 2);
        let mut tai_boundaries = Vec::with_capacity(pairs.len() + 2);
        let mut offsets = Vec::with_capacity(pairs.len() + 1);

        boundaries.push(f64::NEG_INFINITY);
        tai_boundaries.push(f64::NEG_INFINITY);
        offsets.push(pairs[0].1 as f64);

        for &(jd, offset) in pairs {
            let offset = offset as f64;
            boundaries.push(jd);
            tai_boundaries.push(jd + offset / DAY_S);
            offsets.push(offset);
        }

        boundaries.push(f64::INFINITY);
        tai_boundaries.push(f64::INFINITY);

        Self {
            boundaries,
            tai_boundaries,
            offsets,
        }
    }

    /// Number of real (non-sentinel) boundaries
    pub fn len(&self) -> usize {
        self.boundaries.len() - 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Julian date of the first boundary
    pub fn first_boundary(&self) -> f64 {
        self.boundaries[1]
    }

    /// TAI-UTC in force on the UTC day starting at midnight `utc_midnight_jd`
    pub fn offset_for_utc(&self, utc_midnight_jd: f64) -> f64 {
        let i = self.boundaries.partition_point(|&b| b <= utc_midnight_jd);
        self.offsets[i.saturating_sub(1)]
    }

    /// Locate a TAI Julian date in the table
    ///
    /// An instant inside an inserted leap second still carries the offset of
    /// the preceding interval; `leap_second` then reports how far into the
    /// extra second it is.
    pub fn offset_for_tai(&self, tai_jd: f64) -> UtcOffset {
        let i = self
            .tai_boundaries
            .partition_point(|&b| b <= tai_jd)
            .saturating_sub(1);
        let offset_s = self.offsets[i];

        let next = self.boundaries[i + 1];
        if next.is_finite() {
            let utc = tai_jd - offset_s / DAY_S;
            if utc >= next {
                return UtcOffset {
                    offset_s,
                    leap_second: Some(LeapSecond {
                        next_midnight: next,
                        elapsed_s: (utc - next) * DAY_S,
                    }),
                };
            }
        }

        UtcOffset {
            offset_s,
            leap_second: None,
        }
    }
}

impl Default for LeapSecondTable {
    fn default() -> Self {
        Self::builtin()
    }
}
