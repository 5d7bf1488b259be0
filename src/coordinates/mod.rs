//! Spherical readouts of positions
//!
//! Positions are carried as Cartesian vectors and turned into angles only at
//! the end of the pipeline. [`RaDec`] and [`AltAz`] are the two readouts.

pub mod angle;
pub mod cartesian;

pub use angle::{Angle, AngleFormat};
pub use cartesian::{angle_between, from_polar, to_polar};

use crate::units::Distance;
use nalgebra::Vector3;

/// Right ascension, declination and distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaDec {
    /// Right ascension, preferring hours
    pub ra: Angle,
    /// Declination, preferring degrees
    pub dec: Angle,
    pub distance: Distance,
}

impl RaDec {
    /// Read an equatorial vector in AU
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        let (r, dec, ra) = to_polar(v);
        RaDec {
            ra: Angle::from_hours(ra.to_degrees() / 15.0),
            dec: Angle::from_degrees(dec.to_degrees()),
            distance: Distance::from_au(r),
        }
    }
}

/// Altitude above the horizon, azimuth east of north, and distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltAz {
    pub alt: Angle,
    pub az: Angle,
    pub distance: Distance,
}

impl AltAz {
    /// Read a vector whose components are (north, west, up), in AU
    ///
    /// Azimuth is measured from north through east, in [0°, 360°).
    pub fn from_horizon_components(north: f64, west: f64, up: f64) -> Self {
        let distance = (north * north + west * west + up * up).sqrt();
        let alt = up.atan2(north.hypot(west));
        let az = (-west).atan2(north).rem_euclid(std::f64::consts::TAU);
        AltAz {
            alt: Angle::from_degrees(alt.to_degrees()),
            az: Angle::from_degrees(az.to_degrees()),
            distance: Distance::from_au(distance),
        }
    }
}
