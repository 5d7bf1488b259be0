//! Earth satellites from an SGP4 propagator
//!
//! SGP4 reports positions in the TEME frame (true equator, mean equinox of
//! date). The propagator itself is supplied by the caller through
//! [`TemePropagator`]; this module takes its output through the Earth-fixed
//! frame and into the GCRS.
//!
//! Reference: AIAA 2006-6753 (Revisiting Spacetrack Report #3)

use crate::constants::{AU_KM, C_AUDAY, DAY_S, J2000, JULIAN_CENTURY, TAU};
use crate::errors::{Result, SkypathError};
use crate::framelib::{rot_x, rot_y, rot_z};
use crate::planetlib::Body;
use crate::positions::{Apparent, Barycentric, ObserverCenter, SkyPosition};
use crate::time::Time;
use log::debug;
use nalgebra::{Matrix3, Vector3};

/// A satellite propagator that works in the TEME frame
pub trait TemePropagator {
    /// Position (km) and velocity (km/s) at `minutes` after the element epoch
    fn propagate(&self, minutes: f64) -> Result<(Vector3<f64>, Vector3<f64>)>;
}

impl<F> TemePropagator for F
where
    F: Fn(f64) -> Result<(Vector3<f64>, Vector3<f64>)>,
{
    fn propagate(&self, minutes: f64) -> Result<(Vector3<f64>, Vector3<f64>)> {
        self(minutes)
    }
}

/// Greenwich Mean Sidereal Time (1982 formulation)
///
/// Returns the angle in radians and its rate in radians per day.
pub fn theta_gmst1982(jd_ut1: f64, fraction_ut1: f64) -> (f64, f64) {
    let t = (jd_ut1 - J2000 + fraction_ut1) / JULIAN_CENTURY;
    let g = 67310.54841 + (8640184.812866 + (0.093104 + (-6.2e-6) * t) * t) * t;
    let dg = 8640184.812866 + (0.093104 * 2.0 + (-6.2e-6 * 3.0) * t) * t;

    let theta = ((jd_ut1 % 1.0 + fraction_ut1 + (g / DAY_S) % 1.0) % 1.0) * TAU;
    let theta_dot = (1.0 + dg / (DAY_S * JULIAN_CENTURY)) * TAU;
    (theta, theta_dot)
}

/// Rotate a TEME state into the Earth-fixed frame
///
/// Velocity must be per day to match the rotation rate. Polar motion
/// `xp`, `yp` is in radians and applied only when nonzero.
pub fn teme_to_itrf(
    jd_ut1: f64,
    fraction_ut1: f64,
    r_teme: &Vector3<f64>,
    v_teme: &Vector3<f64>,
    xp: f64,
    yp: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let (theta, theta_dot) = theta_gmst1982(jd_ut1, fraction_ut1);
    let angular_velocity = Vector3::new(0.0, 0.0, -theta_dot);

    let r = rot_z(-theta);
    let r_pef = r * r_teme;
    let v_pef = r * v_teme + angular_velocity.cross(&r_pef);

    if xp == 0.0 && yp == 0.0 {
        (r_pef, v_pef)
    } else {
        let w: Matrix3<f64> = rot_x(yp) * rot_y(xp);
        (w * r_pef, w * v_pef)
    }
}

/// Earth-fixed positions into the GCRS, one per instant of `t`
pub fn itrf_to_gcrs(t: &Time, r_itrf: &[Vector3<f64>]) -> Result<Vec<Vector3<f64>>> {
    if r_itrf.len() != t.len() {
        return Err(SkypathError::ShapeMismatch {
            expected: t.len(),
            actual: r_itrf.len(),
        });
    }
    Ok(r_itrf
        .iter()
        .zip(t.gast())
        .zip(t.mt_matrix())
        .map(|((r, &gast), mt)| mt * (rot_z(gast * TAU / 24.0) * r))
        .collect())
}

/// An Earth satellite
#[derive(Debug, Clone)]
pub struct EarthSatellite<P> {
    name: Option<String>,
    propagator: P,
    epoch: Time,
}

impl<P: TemePropagator> EarthSatellite<P> {
    /// `epoch` is the instant the propagator's minutes are counted from
    pub fn new(propagator: P, epoch: Time) -> Result<Self> {
        if !epoch.is_scalar() {
            return Err(SkypathError::ShapeMismatch {
                expected: 1,
                actual: epoch.len(),
            });
        }
        Ok(Self {
            name: None,
            propagator,
            epoch,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn epoch(&self) -> &Time {
        &self.epoch
    }

    pub fn propagator(&self) -> &P {
        &self.propagator
    }

    /// TEME state in km and km/day for each instant
    fn teme(&self, t: &Time) -> Result<Vec<(Vector3<f64>, Vector3<f64>)>> {
        let epoch = self.epoch.utc_jd()[0];
        t.utc_jd()
            .iter()
            .map(|&jd| {
                let minutes = (jd - epoch) * 1440.0;
                let (r, v) = self.propagator.propagate(minutes)?;
                Ok((r, v * DAY_S))
            })
            .collect()
    }

    /// Earth-fixed positions in km
    pub fn itrf_km(&self, t: &Time) -> Result<Vec<Vector3<f64>>> {
        let whole = t.whole();
        let ut1_fraction = t.ut1_fraction();
        Ok(self
            .teme(t)?
            .iter()
            .enumerate()
            .map(|(i, (r, v))| teme_to_itrf(whole[i], ut1_fraction[i], r, v, 0.0, 0.0).0)
            .collect())
    }

    /// Geocentric GCRS positions in AU
    ///
    /// Velocities are not carried through the frame chain and are reported
    /// as zero.
    pub fn gcrs(&self, t: &Time) -> Result<(Vec<Vector3<f64>>, Vec<Vector3<f64>>)> {
        let r_itrf: Vec<Vector3<f64>> = self
            .itrf_km(t)?
            .into_iter()
            .map(|r| r / AU_KM)
            .collect();
        let position = itrf_to_gcrs(t, &r_itrf)?;
        let velocity = vec![Vector3::zeros(); position.len()];
        Ok((position, velocity))
    }

    /// Position as seen from Earth's center or from a ground site
    ///
    /// Light time is reported but not iterated; over satellite distances
    /// it is a few milliseconds.
    pub fn observe_from(&self, observer: &Barycentric) -> Result<Apparent> {
        let t = observer.t();
        let (satellite, _) = self.gcrs(t)?;

        let position: Vec<Vector3<f64>> = match observer.center() {
            ObserverCenter::Site { gcrs_position, .. } => satellite
                .iter()
                .zip(gcrs_position)
                .map(|(s, o)| s - o)
                .collect(),
            ObserverCenter::Body(Body::Earth) => satellite,
            ObserverCenter::Body(body) => {
                return Err(SkypathError::GeometryPrecondition(format!(
                    "satellites can only be observed from Earth, not {}",
                    body
                )))
            }
        };

        debug!(
            "observed satellite {} at {} instants",
            self.name().unwrap_or("(unnamed)"),
            position.len()
        );

        let light_time = position.iter().map(|p| p.norm() / C_AUDAY).collect();
        Apparent::new(position, light_time, observer.clone())
    }
}
