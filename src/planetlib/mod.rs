//! Solar system bodies and the ephemeris adapter
//!
//! The crate never reads ephemeris files itself. An [`EphemerisSource`]
//! (typically a JPL SPK reader) supplies raw segment vectors in kilometers;
//! [`Ephemeris`] turns them into barycentric AU vectors for each [`Body`].
//! Earth and the Moon are not stored directly in the usual kernels and are
//! derived from the Earth-Moon barycenter and the geocentric Moon by the
//! Earth/Moon mass ratio.

use crate::constants::{AU_KM, EARTH_MOON_MASS_RATIO};
use crate::errors::{Result, SkypathError};
use crate::positions::{Barycentric, ObserverCenter};
use crate::time::Time;
use log::debug;
use nalgebra::Vector3;
use std::fmt;
use std::sync::Arc;

/// Enum representing the major solar system bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Earth,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    /// Get the body's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Moon => "Moon",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
        }
    }

    /// Sun mass divided by the body's mass (DE405 system)
    ///
    /// Planets with moons use the mass of the whole system.
    pub fn reciprocal_mass(&self) -> f64 {
        match self {
            Body::Sun => 1.0,
            Body::Mercury => 6_023_600.0,
            Body::Venus => 408_523.71,
            Body::Earth => 332_946.050895,
            Body::Moon => 27_068_700.387534,
            Body::Mars => 3_098_708.0,
            Body::Jupiter => 1_047.3486,
            Body::Saturn => 3_497.898,
            Body::Uranus => 22_902.98,
            Body::Neptune => 19_412.24,
            Body::Pluto => 135_200_000.0,
        }
    }

    /// How this body's barycentric state is assembled from raw segments
    fn strategy(&self) -> Strategy {
        match self {
            Body::Sun => Strategy::Direct(Segment::Sun),
            Body::Mercury => Strategy::Direct(Segment::MercuryBarycenter),
            Body::Venus => Strategy::Direct(Segment::VenusBarycenter),
            Body::Earth => Strategy::Earth,
            Body::Moon => Strategy::Moon,
            Body::Mars => Strategy::Direct(Segment::MarsBarycenter),
            Body::Jupiter => Strategy::Direct(Segment::JupiterBarycenter),
            Body::Saturn => Strategy::Direct(Segment::SaturnBarycenter),
            Body::Uranus => Strategy::Direct(Segment::UranusBarycenter),
            Body::Neptune => Strategy::Direct(Segment::NeptuneBarycenter),
            Body::Pluto => Strategy::Direct(Segment::PlutoBarycenter),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw ephemeris segments, each relative to the solar system barycenter
/// except the geocentric Moon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Sun,
    MercuryBarycenter,
    VenusBarycenter,
    EarthMoonBarycenter,
    /// Moon relative to Earth's center
    GeocentricMoon,
    MarsBarycenter,
    JupiterBarycenter,
    SaturnBarycenter,
    UranusBarycenter,
    NeptuneBarycenter,
    PlutoBarycenter,
}

impl Segment {
    /// SPICE (center, target) codes
    pub fn naif_ids(&self) -> (i32, i32) {
        match self {
            Segment::Sun => (0, 10),
            Segment::MercuryBarycenter => (0, 1),
            Segment::VenusBarycenter => (0, 2),
            Segment::EarthMoonBarycenter => (0, 3),
            Segment::GeocentricMoon => (399, 301),
            Segment::MarsBarycenter => (0, 4),
            Segment::JupiterBarycenter => (0, 5),
            Segment::SaturnBarycenter => (0, 6),
            Segment::UranusBarycenter => (0, 7),
            Segment::NeptuneBarycenter => (0, 8),
            Segment::PlutoBarycenter => (0, 9),
        }
    }
}

/// Supplier of raw segment vectors
///
/// Implementations evaluate one segment at one TDB Julian date. Errors are
/// returned as [`SkypathError::Ephemeris`] and passed through unchanged.
pub trait EphemerisSource: fmt::Debug + Send + Sync {
    /// Segment position in kilometers
    fn position_km(&self, segment: Segment, tdb: f64) -> Result<Vector3<f64>>;

    /// Segment velocity in kilometers per day
    fn velocity_km_per_day(&self, segment: Segment, tdb: f64) -> Result<Vector3<f64>>;

    /// Earth mass divided by Moon mass, as used to build the kernel
    fn earth_moon_mass_ratio(&self) -> f64 {
        EARTH_MOON_MASS_RATIO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Direct(Segment),
    /// Earth-Moon barycenter minus the Moon's share of the geocentric Moon
    Earth,
    /// Earth-Moon barycenter plus Earth's share of the geocentric Moon
    Moon,
}

/// Shared handle on an ephemeris source
#[derive(Clone)]
pub struct Ephemeris {
    source: Arc<dyn EphemerisSource>,
}

impl fmt::Debug for Ephemeris {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ephemeris")
            .field("source", &self.source)
            .finish()
    }
}

impl Ephemeris {
    pub fn new<S: EphemerisSource + 'static>(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_arc(source: Arc<dyn EphemerisSource>) -> Self {
        Self { source }
    }

    /// Look up a body
    pub fn planet(&self, body: Body) -> Planet {
        Planet {
            body,
            strategy: body.strategy(),
            ephemeris: self.clone(),
        }
    }

    pub fn source(&self) -> &dyn EphemerisSource {
        self.source.as_ref()
    }
}

/// A body bound to the ephemeris that positions it
#[derive(Debug, Clone)]
pub struct Planet {
    body: Body,
    strategy: Strategy,
    ephemeris: Ephemeris,
}

impl Planet {
    pub fn body(&self) -> Body {
        self.body
    }

    pub fn ephemeris(&self) -> &Ephemeris {
        &self.ephemeris
    }

    fn segment_state(&self, segment: Segment, tdb: f64) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let source = self.ephemeris.source();
        Ok((
            source.position_km(segment, tdb)?,
            source.velocity_km_per_day(segment, tdb)?,
        ))
    }

    fn state_km(&self, tdb: f64) -> Result<(Vector3<f64>, Vector3<f64>)> {
        match self.strategy {
            Strategy::Direct(segment) => self.segment_state(segment, tdb),
            Strategy::Earth | Strategy::Moon => {
                let (emb_p, emb_v) = self.segment_state(Segment::EarthMoonBarycenter, tdb)?;
                let (moon_p, moon_v) = self.segment_state(Segment::GeocentricMoon, tdb)?;
                let emrat = self.ephemeris.source().earth_moon_mass_ratio();
                let share = if self.strategy == Strategy::Earth {
                    -1.0 / (1.0 + emrat)
                } else {
                    emrat / (1.0 + emrat)
                };
                Ok((emb_p + moon_p * share, emb_v + moon_v * share))
            }
        }
    }

    /// Barycentric positions (AU) and velocities (AU/day) at TDB Julian dates
    pub fn state_au(&self, tdb: &[f64]) -> Result<(Vec<Vector3<f64>>, Vec<Vector3<f64>>)> {
        let mut positions = Vec::with_capacity(tdb.len());
        let mut velocities = Vec::with_capacity(tdb.len());
        for &jd in tdb {
            let (p, v) = self.state_km(jd)?;
            positions.push(p / AU_KM);
            velocities.push(v / AU_KM);
        }
        Ok((positions, velocities))
    }

    /// Barycentric positions in AU at TDB Julian dates
    pub fn position_au(&self, tdb: &[f64]) -> Result<Vec<Vector3<f64>>> {
        tdb.iter()
            .map(|&jd| self.state_km(jd).map(|(p, _)| p / AU_KM))
            .collect()
    }

    /// This body as an observer at `t`
    pub fn at(&self, t: &Time) -> Result<Barycentric> {
        let tdb = t.tdb();
        let tdb = tdb
            .as_slice()
            .ok_or_else(|| SkypathError::Ephemeris("non-contiguous time array".to_string()))?;
        debug!("evaluating {} at {} instants", self.body, tdb.len());
        let (position, velocity) = self.state_au(tdb)?;
        Barycentric::new(
            t.clone(),
            position,
            velocity,
            self.ephemeris.clone(),
            ObserverCenter::Body(self.body),
        )
    }
}
