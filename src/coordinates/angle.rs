//! # Angle Representation Module
//!
//! An [`Angle`] keeps the exact value and unit it was built from (degrees,
//! radians or hours) and converts only when another unit is asked for.
//!
//! ## Unit preference
//!
//! Right ascension is conventionally read in hours and most other angles in
//! degrees. The stored unit doubles as the angle's preference: an angle built
//! from hours renders with [`Angle::hstr`], anything else with [`Angle::dstr`].
//! Asking for the other rendering is a [`SkypathError::UnitMismatch`] rather
//! than a silent conversion, since a degree value printed as hours (or the
//! reverse) is off by a factor of fifteen.
//!
//! ## Examples
//!
//! ```rust
//! use skypath::coordinates::angle::Angle;
//!
//! let ra = Angle::from_hours(5.5);
//! assert_eq!(ra.hstr(2).unwrap(), "05h 30m 00.00s");
//! assert!(ra.dstr(1).is_err());
//! assert_eq!(ra.to_degrees(), 82.5);
//! ```

use crate::errors::{Result, SkypathError};
use std::f64::consts::PI;
use std::fmt;

/// Internal representation format for angle values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleFormat {
    /// Angle stored in degrees
    Degrees(f64),
    /// Angle stored in radians
    Radians(f64),
    /// Angle stored in hours, 24 to the full turn
    Hours(f64),
}

/// An angular measurement that remembers its unit
///
/// Values are returned exactly when read back in the unit they were given
/// in. Conversions use `std::f64::consts::PI`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    angle: AngleFormat,
}

/// Finest resolution of the seconds field; an f64 angle carries no more
const MAX_SECONDS_PLACES: usize = 9;

/// Sign and integer parts of a sexagesimal value rounded to `places` decimals
///
/// Returns (negative, whole units, minutes, seconds, fractional digits).
fn sexagesimalize(value: f64, places: usize) -> (bool, u64, u64, u64, u64) {
    let negative = value < 0.0;
    let power = 10u64.pow(places.min(MAX_SECONDS_PLACES) as u32);
    let total = (value.abs() * 3600.0 * power as f64).round() as u64;

    let fraction = total % power;
    let total_seconds = total / power;
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let units = total_seconds / 3600;

    (negative && total > 0, units, minutes, seconds, fraction)
}

impl Angle {
    /// Creates an angle from a value in degrees
    pub fn from_degrees(degrees: f64) -> Self {
        Angle {
            angle: AngleFormat::Degrees(degrees),
        }
    }

    /// Creates an angle from a value in radians
    pub fn from_radians(radians: f64) -> Self {
        Angle {
            angle: AngleFormat::Radians(radians),
        }
    }

    /// Creates an angle from a value in hours
    pub fn from_hours(hours: f64) -> Self {
        Angle {
            angle: AngleFormat::Hours(hours),
        }
    }

    /// Returns the angle value in degrees
    ///
    /// Exact if the angle was built from degrees.
    pub fn to_degrees(&self) -> f64 {
        match self.angle {
            AngleFormat::Degrees(deg) => deg,
            AngleFormat::Radians(rad) => rad * (180.0 / PI),
            AngleFormat::Hours(hours) => hours * 15.0,
        }
    }

    /// Returns the angle value in radians
    ///
    /// Exact if the angle was built from radians.
    pub fn to_radians(&self) -> f64 {
        match self.angle {
            AngleFormat::Degrees(deg) => deg * (PI / 180.0),
            AngleFormat::Radians(rad) => rad,
            AngleFormat::Hours(hours) => hours * (PI / 12.0),
        }
    }

    /// Returns the angle value in hours
    ///
    /// Exact if the angle was built from hours.
    pub fn to_hours(&self) -> f64 {
        match self.angle {
            AngleFormat::Degrees(deg) => deg / 15.0,
            AngleFormat::Radians(rad) => rad * (12.0 / PI),
            AngleFormat::Hours(hours) => hours,
        }
    }

    /// Returns the internal format of this angle
    pub fn format(&self) -> AngleFormat {
        self.angle
    }

    /// Whether this angle is conventionally read in hours
    pub fn prefers_hours(&self) -> bool {
        matches!(self.angle, AngleFormat::Hours(_))
    }

    /// Hours, minutes and seconds, keeping the sign on every component
    pub fn hms(&self) -> Result<(f64, f64, f64)> {
        self.require_hours("hms")?;
        Ok(split_sexagesimal(self.to_hours()))
    }

    /// Degrees, arcminutes and arcseconds, keeping the sign on every component
    pub fn dms(&self) -> Result<(f64, f64, f64)> {
        self.require_degrees("dms")?;
        Ok(split_sexagesimal(self.to_degrees()))
    }

    /// Render as `12h 34m 56.78s`
    ///
    /// Fails with `UnitMismatch` unless the angle prefers hours. More than
    /// nine decimal places are rendered as nine.
    pub fn hstr(&self, places: usize) -> Result<String> {
        self.require_hours("hstr")?;
        let places = places.min(MAX_SECONDS_PLACES);
        let (negative, h, m, s, fraction) = sexagesimalize(self.to_hours(), places);
        let sign = if negative { "-" } else { "" };
        Ok(if places > 0 {
            format!(
                "{}{:02}h {:02}m {:02}.{:0width$}s",
                sign,
                h,
                m,
                s,
                fraction,
                width = places
            )
        } else {
            format!("{}{:02}h {:02}m {:02}s", sign, h, m, s)
        })
    }

    /// Render as `+12deg 34' 56.8"`
    ///
    /// Fails with `UnitMismatch` if the angle prefers hours. More than nine
    /// decimal places are rendered as nine.
    pub fn dstr(&self, places: usize) -> Result<String> {
        self.require_degrees("dstr")?;
        let places = places.min(MAX_SECONDS_PLACES);
        let (negative, d, m, s, fraction) = sexagesimalize(self.to_degrees(), places);
        let sign = if negative { "-" } else { "" };
        Ok(if places > 0 {
            format!(
                "{}{:02}deg {:02}' {:02}.{:0width$}\"",
                sign,
                d,
                m,
                s,
                fraction,
                width = places
            )
        } else {
            format!("{}{:02}deg {:02}' {:02}\"", sign, d, m, s)
        })
    }

    fn require_hours(&self, what: &str) -> Result<()> {
        if self.prefers_hours() {
            Ok(())
        } else {
            Err(SkypathError::UnitMismatch(format!(
                "{} needs an angle measured in hours; this one is in degrees",
                what
            )))
        }
    }

    fn require_degrees(&self, what: &str) -> Result<()> {
        if self.prefers_hours() {
            Err(SkypathError::UnitMismatch(format!(
                "{} needs an angle measured in degrees; this one is in hours",
                what
            )))
        } else {
            Ok(())
        }
    }
}

fn split_sexagesimal(value: f64) -> (f64, f64, f64) {
    let units = value.trunc();
    let minutes_total = (value - units) * 60.0;
    let minutes = minutes_total.trunc();
    let seconds = (minutes_total - minutes) * 60.0;
    (units, minutes, seconds)
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = if self.prefers_hours() {
            self.hstr(2)
        } else {
            self.dstr(1)
        };
        match rendered {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn test_exact_storage() {
        assert_eq!(Angle::from_degrees(45.0).to_degrees(), 45.0);
        assert_eq!(Angle::from_radians(PI / 4.0).to_radians(), PI / 4.0);
        assert_eq!(Angle::from_hours(3.25).to_hours(), 3.25);

        match Angle::from_hours(3.25).format() {
            AngleFormat::Hours(val) => assert_eq!(val, 3.25),
            other => panic!("Expected hours format, got {:?}", other),
        }
    }

    #[rstest]
    #[case(Angle::from_degrees(180.0))]
    #[case(Angle::from_radians(PI))]
    #[case(Angle::from_hours(12.0))]
    fn test_half_turn_in_every_unit(#[case] angle: Angle) {
        assert_abs_diff_eq!(angle.to_degrees(), 180.0, epsilon = 1e-13);
        assert_abs_diff_eq!(angle.to_radians(), PI, epsilon = 1e-15);
        assert_abs_diff_eq!(angle.to_hours(), 12.0, epsilon = 1e-14);
    }

    #[test]
    fn test_equality_follows_storage() {
        assert_eq!(Angle::from_degrees(90.0), Angle::from_degrees(90.0));
        assert_ne!(Angle::from_degrees(90.0), Angle::from_hours(6.0));
    }

    #[rstest]
    #[case(12.0 + 34.0 / 60.0 + 56.78 / 3600.0, 2, "12h 34m 56.78s")]
    #[case(0.0, 2, "00h 00m 00.00s")]
    #[case(23.999_999_99, 2, "24h 00m 00.00s")]
    #[case(5.5, 0, "05h 30m 00s")]
    #[case(-1.5, 1, "-01h 30m 00.0s")]
    fn test_hstr(#[case] hours: f64, #[case] places: usize, #[case] expected: &str) {
        assert_eq!(Angle::from_hours(hours).hstr(places).unwrap(), expected);
    }

    #[rstest]
    #[case(Angle::from_degrees(-(12.0 + 34.0 / 60.0 + 56.8 / 3600.0)), "-12deg 34' 56.8\"")]
    #[case(Angle::from_degrees(89.5), "89deg 30' 00.0\"")]
    #[case(Angle::from_radians(PI / 2.0), "90deg 00' 00.0\"")]
    fn test_dstr(#[case] angle: Angle, #[case] expected: &str) {
        assert_eq!(angle.dstr(1).unwrap(), expected);
    }

    #[test]
    fn test_excess_places_are_capped() {
        let ra = Angle::from_hours(5.5);
        assert_eq!(ra.hstr(25).unwrap(), "05h 30m 00.000000000s");
        assert_eq!(ra.hstr(25).unwrap(), ra.hstr(9).unwrap());
        assert_eq!(
            Angle::from_degrees(-0.5).dstr(64).unwrap(),
            "-00deg 30' 00.000000000\""
        );
    }

    #[test]
    fn test_unit_guards() {
        let dec = Angle::from_degrees(10.0);
        assert!(matches!(dec.hstr(2), Err(SkypathError::UnitMismatch(_))));
        assert!(matches!(dec.hms(), Err(SkypathError::UnitMismatch(_))));

        let ra = Angle::from_hours(10.0);
        assert!(matches!(ra.dstr(1), Err(SkypathError::UnitMismatch(_))));
        assert!(matches!(ra.dms(), Err(SkypathError::UnitMismatch(_))));

        // Radians read as degrees
        assert!(Angle::from_radians(1.0).dstr(1).is_ok());
    }

    #[test]
    fn test_sexagesimal_parts() {
        let (h, m, s) = Angle::from_hours(-2.5125).hms().unwrap();
        assert_eq!(h, -2.0);
        assert_abs_diff_eq!(m, -30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(s, -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_display_uses_preference() {
        assert_eq!(Angle::from_hours(1.0).to_string(), "01h 00m 00.00s");
        assert_eq!(Angle::from_degrees(1.0).to_string(), "01deg 00' 00.0\"");
    }
}
