//! Shared fixtures for the integration tests

use nalgebra::Vector3;
use skypath::constants::{AU_KM, J2000, TAU};
use skypath::{EphemerisSource, Result, Segment, SkypathError};

/// Planets on circular orbits in the ICRS x-y plane, with the Moon's orbit
/// tilted by five degrees
#[derive(Debug, Default)]
pub struct ToySolarSystem;

impl ToySolarSystem {
    /// (radius km, period days, phase at J2000 rad, inclination rad)
    fn elements(segment: Segment) -> Result<(f64, f64, f64, f64)> {
        let au = AU_KM;
        Ok(match segment {
            Segment::Sun => (0.0, 1.0, 0.0, 0.0),
            Segment::MercuryBarycenter => (0.3871 * au, 87.969, 4.4, 0.0),
            Segment::VenusBarycenter => (0.7233 * au, 224.701, 3.2, 0.0),
            Segment::EarthMoonBarycenter => (au, 365.256_363, 1.75, 0.0),
            Segment::GeocentricMoon => (384_400.0, 27.321_661, 0.6, 5.145_f64.to_radians()),
            Segment::MarsBarycenter => (1.5237 * au, 686.98, 6.2, 0.0),
            Segment::JupiterBarycenter => (5.2026 * au, 4_332.59, 0.6, 0.0),
            Segment::SaturnBarycenter => (9.5549 * au, 10_759.22, 0.87, 0.0),
            Segment::UranusBarycenter => (19.2184 * au, 30_688.5, 5.47, 0.0),
            Segment::NeptuneBarycenter => (30.1104 * au, 60_182.0, 5.31, 0.0),
            Segment::PlutoBarycenter => {
                return Err(SkypathError::Ephemeris("Pluto is not covered".to_string()))
            }
        })
    }
}

impl EphemerisSource for ToySolarSystem {
    fn position_km(&self, segment: Segment, tdb: f64) -> Result<Vector3<f64>> {
        let (radius, period, phase, inclination) = Self::elements(segment)?;
        let angle = phase + TAU * (tdb - J2000) / period;
        let (s, c) = angle.sin_cos();
        let (si, ci) = inclination.sin_cos();
        Ok(Vector3::new(radius * c, radius * s * ci, radius * s * si))
    }

    fn velocity_km_per_day(&self, segment: Segment, tdb: f64) -> Result<Vector3<f64>> {
        let (radius, period, phase, inclination) = Self::elements(segment)?;
        let rate = TAU / period;
        let angle = phase + rate * (tdb - J2000);
        let (s, c) = angle.sin_cos();
        let (si, ci) = inclination.sin_cos();
        Ok(Vector3::new(-radius * rate * s, radius * rate * c * ci, radius * rate * c * si))
    }
}
