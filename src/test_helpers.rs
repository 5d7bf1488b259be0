//! Analytic ephemeris used by the unit tests

use crate::constants::{AU_KM, J2000, TAU};
use crate::errors::{Result, SkypathError};
use crate::planetlib::{EphemerisSource, Segment};
use nalgebra::Vector3;
use std::collections::HashMap;

/// Coplanar circular orbits: (radius km, period days, phase at J2000 rad)
#[derive(Debug, Clone)]
pub struct CircularOrbits {
    orbits: HashMap<Segment, (f64, f64, f64)>,
}

impl Default for CircularOrbits {
    fn default() -> Self {
        let au = AU_KM;
        let orbits = [
            (Segment::Sun, (0.0, 1.0, 0.0)),
            (Segment::MercuryBarycenter, (0.387_098 * au, 87.969, 4.40)),
            (Segment::VenusBarycenter, (0.723_332 * au, 224.701, 3.18)),
            (Segment::EarthMoonBarycenter, (au, 365.256_363, 1.75)),
            (Segment::GeocentricMoon, (384_400.0, 27.321_661, 0.60)),
            (Segment::MarsBarycenter, (1.523_679 * au, 686.980, 6.20)),
            (Segment::JupiterBarycenter, (5.2026 * au, 4_332.59, 0.60)),
            (Segment::SaturnBarycenter, (9.5549 * au, 10_759.22, 0.87)),
            (Segment::UranusBarycenter, (19.2184 * au, 30_688.5, 5.47)),
            (Segment::NeptuneBarycenter, (30.110_387 * au, 60_182.0, 5.31)),
            (Segment::PlutoBarycenter, (39.482 * au, 90_560.0, 4.17)),
        ];
        Self {
            orbits: orbits.into_iter().collect(),
        }
    }
}

impl CircularOrbits {
    /// Drop a segment so lookups for it fail
    pub fn without(mut self, segment: Segment) -> Self {
        self.orbits.remove(&segment);
        self
    }

    fn orbit(&self, segment: Segment) -> Result<(f64, f64, f64)> {
        self.orbits
            .get(&segment)
            .copied()
            .ok_or_else(|| SkypathError::Ephemeris(format!("no segment {:?}", segment)))
    }
}

impl EphemerisSource for CircularOrbits {
    fn position_km(&self, segment: Segment, tdb: f64) -> Result<Vector3<f64>> {
        let (radius, period, phase) = self.orbit(segment)?;
        let angle = phase + TAU * (tdb - J2000) / period;
        Ok(Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.0))
    }

    fn velocity_km_per_day(&self, segment: Segment, tdb: f64) -> Result<Vector3<f64>> {
        let (radius, period, phase) = self.orbit(segment)?;
        let rate = TAU / period;
        let angle = phase + rate * (tdb - J2000);
        Ok(Vector3::new(
            -radius * rate * angle.sin(),
            radius * rate * angle.cos(),
            0.0,
        ))
    }
}
