//! Positions along the observation pipeline
//!
//! An observer ([`Barycentric`]) observes a target to give an
//! [`Astrometric`] position: light-time corrected, relative to the observer,
//! in the ICRS. [`Astrometric::apparent`] then bends the light for the
//! gravity of solar system bodies and corrects for the observer's motion,
//! giving an [`Apparent`] position ready for readout.
//!
//! Every position holds one vector per element of its [`Time`].

use crate::celestial::Observable;
use crate::constants::TAU;
use crate::coordinates::{angle_between, AltAz, Angle, RaDec};
use crate::earthlib::compute_limb_angle;
use crate::errors::{Result, SkypathError};
use crate::framelib::rot_z;
use crate::planetlib::{Body, Ephemeris};
use crate::relativity::{add_aberration, add_deflection, DEFLECTORS};
use crate::time::Time;
use crate::toposlib::Topos;
use crate::units::Distance;
use log::debug;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// What an observer is centered on
#[derive(Debug, Clone)]
pub enum ObserverCenter {
    /// The center of a solar system body
    Body(Body),
    /// A site on Earth's surface, with its geocentric GCRS offset per instant
    Site {
        topos: Topos,
        gcrs_position: Vec<Vector3<f64>>,
        gcrs_velocity: Vec<Vector3<f64>>,
    },
}

/// Settings for the astrometric to apparent step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApparentOptions {
    /// How many of the standard deflecting bodies to apply, in order
    pub deflectors: usize,
    pub deflection: bool,
    pub aberration: bool,
    /// Minimum angle above Earth's limb, in degrees, for Earth's own deflection
    pub earth_limb_threshold_deg: f64,
}

impl Default for ApparentOptions {
    fn default() -> Self {
        Self {
            deflectors: 3,
            deflection: true,
            aberration: true,
            earth_limb_threshold_deg: 0.8,
        }
    }
}

impl ApparentOptions {
    /// Light-time only: no deflection and no aberration
    pub fn geometric() -> Self {
        Self {
            deflection: false,
            aberration: false,
            ..Self::default()
        }
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SkypathError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

fn tdb_vec(t: &Time) -> Vec<f64> {
    t.tdb().to_vec()
}

/// Behavior shared by every position series
pub trait SkyPosition {
    fn t(&self) -> &Time;

    /// Vectors in AU, one per instant
    fn position(&self) -> &[Vector3<f64>];

    /// Right ascension and declination
    ///
    /// With no epoch the vectors are read in the ICRS. Otherwise they are
    /// first rotated to the true equator and equinox of `epoch`, which must
    /// hold one instant or one per position.
    fn radec(&self, epoch: Option<&Time>) -> Result<Vec<RaDec>> {
        let position = self.position();
        match epoch {
            None => Ok(position.iter().map(RaDec::from_vector).collect()),
            Some(epoch) => {
                let m = epoch.m_matrix();
                if m.len() != 1 {
                    check_len(position.len(), m.len())?;
                }
                Ok(position
                    .iter()
                    .enumerate()
                    .map(|(i, p)| RaDec::from_vector(&(m[i.min(m.len() - 1)] * p)))
                    .collect())
            }
        }
    }

    /// Right ascension and declination on the true equator and equinox of date
    fn radec_of_date(&self) -> Result<Vec<RaDec>> {
        self.radec(Some(self.t()))
    }

    /// Distances from the origin of the series
    fn distance(&self) -> Vec<Distance> {
        self.position()
            .iter()
            .map(|p| Distance::from_au(p.norm()))
            .collect()
    }

    /// Angles between this series and another, element by element
    ///
    /// A length-1 series is paired with every element of the other.
    fn separation_from(&self, other: &dyn SkyPosition) -> Result<Vec<Angle>> {
        let a = self.position();
        let b = other.position();
        let n = a.len().max(b.len());
        if a.len() != 1 && b.len() != 1 {
            check_len(a.len(), b.len())?;
        }
        Ok((0..n)
            .map(|i| {
                let u = &a[i.min(a.len() - 1)];
                let v = &b[i.min(b.len() - 1)];
                Angle::from_radians(angle_between(u, v))
            })
            .collect())
    }
}

/// A position relative to the solar system barycenter, usable as an observer
#[derive(Debug, Clone)]
pub struct Barycentric {
    t: Time,
    position: Vec<Vector3<f64>>,
    velocity: Vec<Vector3<f64>>,
    ephemeris: Ephemeris,
    center: ObserverCenter,
}

impl Barycentric {
    /// Assemble an observer; every series must match the length of `t`
    pub fn new(
        t: Time,
        position: Vec<Vector3<f64>>,
        velocity: Vec<Vector3<f64>>,
        ephemeris: Ephemeris,
        center: ObserverCenter,
    ) -> Result<Self> {
        check_len(t.len(), position.len())?;
        check_len(t.len(), velocity.len())?;
        if let ObserverCenter::Site {
            gcrs_position,
            gcrs_velocity,
            ..
        } = &center
        {
            check_len(t.len(), gcrs_position.len())?;
            check_len(t.len(), gcrs_velocity.len())?;
        }

        Ok(Self {
            t,
            position,
            velocity,
            ephemeris,
            center,
        })
    }

    /// Velocities in AU/day
    pub fn velocity(&self) -> &[Vector3<f64>] {
        &self.velocity
    }

    pub fn ephemeris(&self) -> &Ephemeris {
        &self.ephemeris
    }

    pub fn center(&self) -> &ObserverCenter {
        &self.center
    }

    /// The ground site, if this observer is on Earth's surface
    pub fn topos(&self) -> Option<&Topos> {
        match &self.center {
            ObserverCenter::Site { topos, .. } => Some(topos),
            ObserverCenter::Body(_) => None,
        }
    }

    /// Site position relative to the geocenter, for ground observers
    pub fn observer_gcrs(&self) -> Option<&[Vector3<f64>]> {
        match &self.center {
            ObserverCenter::Site { gcrs_position, .. } => Some(gcrs_position),
            ObserverCenter::Body(_) => None,
        }
    }

    /// Whether this observer sits at Earth's center
    pub fn is_geocentric(&self) -> bool {
        matches!(self.center, ObserverCenter::Body(Body::Earth))
    }

    /// Observe a target from here
    pub fn observe<T: Observable + ?Sized>(&self, target: &T) -> Result<Astrometric> {
        target.observe_from(self)
    }
}

impl SkyPosition for Barycentric {
    fn t(&self) -> &Time {
        &self.t
    }

    fn position(&self) -> &[Vector3<f64>] {
        &self.position
    }
}

/// A light-time corrected position relative to an observer
#[derive(Debug, Clone)]
pub struct Astrometric {
    position: Vec<Vector3<f64>>,
    velocity: Vec<Vector3<f64>>,
    light_time: Vec<f64>,
    observer: Barycentric,
}

impl Astrometric {
    pub fn new(
        position: Vec<Vector3<f64>>,
        velocity: Vec<Vector3<f64>>,
        light_time: Vec<f64>,
        observer: Barycentric,
    ) -> Result<Self> {
        let n = observer.t.len();
        check_len(n, position.len())?;
        check_len(n, velocity.len())?;
        check_len(n, light_time.len())?;
        Ok(Self {
            position,
            velocity,
            light_time,
            observer,
        })
    }

    /// Target velocity relative to the observer, AU/day
    pub fn velocity(&self) -> &[Vector3<f64>] {
        &self.velocity
    }

    /// Light-travel time in days
    pub fn light_time(&self) -> &[f64] {
        &self.light_time
    }

    pub fn observer(&self) -> &Barycentric {
        &self.observer
    }

    /// Apparent position with the default corrections
    pub fn apparent(&self) -> Result<Apparent> {
        self.apparent_with(&ApparentOptions::default())
    }

    /// Apparent position with explicit settings
    pub fn apparent_with(&self, options: &ApparentOptions) -> Result<Apparent> {
        let observer = &self.observer;
        let mut position = self.position.clone();
        let n = position.len();

        if options.deflection {
            let include_earth: Vec<bool> = match observer.observer_gcrs() {
                None => vec![false; n],
                Some(gcrs) => position
                    .iter()
                    .zip(gcrs)
                    .map(|(p, o)| compute_limb_angle(p, o).0 >= options.earth_limb_threshold_deg)
                    .collect(),
            };

            let count = options.deflectors.min(DEFLECTORS.len());
            debug!(
                "deflecting {} positions by {} bodies (Earth for {})",
                n,
                count,
                include_earth.iter().filter(|&&b| b).count()
            );

            add_deflection(
                &mut position,
                &observer.position,
                &observer.ephemeris,
                &tdb_vec(&observer.t),
                &include_earth,
                count,
            )?;
        }

        if options.aberration {
            add_aberration(&mut position, &observer.velocity, &self.light_time);
        }

        Apparent::new(position, self.light_time.clone(), observer.clone())
    }
}

impl SkyPosition for Astrometric {
    fn t(&self) -> &Time {
        &self.observer.t
    }

    fn position(&self) -> &[Vector3<f64>] {
        &self.position
    }
}

/// An observer-relative position as it appears in the sky
#[derive(Debug, Clone)]
pub struct Apparent {
    position: Vec<Vector3<f64>>,
    light_time: Vec<f64>,
    observer: Barycentric,
}

impl Apparent {
    pub fn new(
        position: Vec<Vector3<f64>>,
        light_time: Vec<f64>,
        observer: Barycentric,
    ) -> Result<Self> {
        let n = observer.t.len();
        check_len(n, position.len())?;
        check_len(n, light_time.len())?;
        Ok(Self {
            position,
            light_time,
            observer,
        })
    }

    pub fn light_time(&self) -> &[f64] {
        &self.light_time
    }

    pub fn observer(&self) -> &Barycentric {
        &self.observer
    }

    /// Altitude and azimuth for the observer's horizon
    ///
    /// Fails unless the position was observed from a site on Earth.
    pub fn altaz(&self) -> Result<Vec<AltAz>> {
        let topos = self.observer.topos().ok_or_else(|| {
            SkypathError::GeometryPrecondition(
                "altitude and azimuth need an observer at a ground site".to_string(),
            )
        })?;

        let t = &self.observer.t;
        let m = t.m_matrix();
        let gast = t.gast();

        Ok(self
            .position
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let spin: Matrix3<f64> = rot_z(-gast[i] * TAU / 24.0);
                let local = spin * (m[i] * p);
                AltAz::from_horizon_components(
                    local.dot(topos.north()),
                    local.dot(topos.west()),
                    local.dot(topos.up()),
                )
            })
            .collect())
    }
}

impl SkyPosition for Apparent {
    fn t(&self) -> &Time {
        &self.observer.t
    }

    fn position(&self) -> &[Vector3<f64>] {
        &self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ASEC2RAD, AU_M, C_AUDAY, DEG2RAD, EARTH_RADIUS};
    use crate::test_helpers::CircularOrbits;
    use crate::time::Timescale;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    fn setup() -> (Timescale, Ephemeris) {
        (Timescale::default(), Ephemeris::new(CircularOrbits::default()))
    }

    #[test]
    fn test_default_options() {
        let options = ApparentOptions::default();
        assert_eq!(options.deflectors, 3);
        assert!(options.deflection && options.aberration);
        assert_eq!(options.earth_limb_threshold_deg, 0.8);
    }

    #[test]
    fn test_earth_deflection_follows_limb_angle() {
        let (ts, eph) = setup();
        let t = ts.tt_jd_array(&[2_460_000.5; 4]).unwrap();
        let site = Topos::new(-30.0, 70.0, 2_000.0).unwrap();
        let observer = site.at(&eph, &t).unwrap();
        let o = observer.observer_gcrs().unwrap()[0];

        // Distant targets at fixed angles above (negative: below) Earth's limb
        let above_limb_deg = [45.0, 1.0, 0.6, -10.0];
        let aprad = (EARTH_RADIUS / AU_M / o.norm()).min(1.0).asin();
        let side = o.cross(&Vector3::z()).normalize();
        let position: Vec<Vector3<f64>> = above_limb_deg
            .iter()
            .map(|&deg| {
                let zd = PI - aprad - deg * DEG2RAD;
                (o.normalize() * zd.cos() + side * zd.sin()) * 1e5
            })
            .collect();
        for (p, &deg) in position.iter().zip(&above_limb_deg) {
            assert_abs_diff_eq!(compute_limb_angle(p, &o).0, deg, epsilon = 1e-9);
        }

        let light_time = position.iter().map(|p| p.norm() / C_AUDAY).collect();
        let astrometric =
            Astrometric::new(position.clone(), vec![Vector3::zeros(); 4], light_time, observer)
                .unwrap();
        let options = ApparentOptions {
            deflectors: 0,
            aberration: false,
            ..ApparentOptions::default()
        };
        let apparent = astrometric.apparent_with(&options).unwrap();

        for ((before, after), &deg) in position.iter().zip(apparent.position()).zip(&above_limb_deg)
        {
            // Earth bends a ray by at most about 0.29 mas at the surface
            let shift_mas = angle_between(before, after) / ASEC2RAD * 1e3;
            if deg >= 0.8 {
                assert!(shift_mas > 0.05 && shift_mas < 0.3, "{} deg: {} mas", deg, shift_mas);
            } else {
                assert_eq!(before, after, "{} deg", deg);
            }
        }
    }

    #[test]
    fn test_apparent_from_the_sun_stays_finite() {
        let (ts, eph) = setup();
        let t = ts.tt_jd_array(&[2_451_545.0, 2_460_000.5]).unwrap();
        let sun = eph.planet(Body::Sun).at(&t).unwrap();
        let venus = sun.observe(&eph.planet(Body::Venus)).unwrap();

        let apparent = venus.apparent().unwrap();
        for (p, q) in apparent.position().iter().zip(venus.position()) {
            assert!(p.iter().all(|c| c.is_finite()), "{:?}", p);
            assert_relative_eq!(p.norm(), q.norm(), max_relative = 1e-9);
        }
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: ApparentOptions = serde_json::from_str(r#"{"aberration": false}"#).unwrap();
        assert!(!options.aberration);
        assert_eq!(options.deflectors, 3);

        let round: ApparentOptions =
            serde_json::from_str(&serde_json::to_string(&ApparentOptions::geometric()).unwrap())
                .unwrap();
        assert_eq!(round, ApparentOptions::geometric());
    }

    #[test]
    fn test_observer_length_checked() {
        let (ts, eph) = setup();
        let t = ts.tt_jd_array(&[2_451_545.0, 2_451_546.0]).unwrap();
        let err = Barycentric::new(
            t,
            vec![Vector3::zeros()],
            vec![Vector3::zeros()],
            eph,
            ObserverCenter::Body(Body::Earth),
        );
        assert!(matches!(
            err,
            Err(SkypathError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_light_time_matches_distance() {
        let (ts, eph) = setup();
        let t = ts.tt_jd(2_459_000.5, None);
        let earth = eph.planet(Body::Earth).at(&t).unwrap();
        let mars = earth.observe(&eph.planet(Body::Mars)).unwrap();

        let distance = mars.distance()[0].au();
        assert_abs_diff_eq!(mars.light_time()[0] * crate::constants::C_AUDAY, distance, epsilon = 1e-12);
        assert!(distance > 0.3 && distance < 2.7);
    }

    #[test]
    fn test_geometric_apparent_keeps_position() {
        let (ts, eph) = setup();
        let t = ts.tt_jd(2_459_000.5, None);
        let earth = eph.planet(Body::Earth).at(&t).unwrap();
        let astrometric = earth.observe(&eph.planet(Body::Jupiter)).unwrap();
        let apparent = astrometric.apparent_with(&ApparentOptions::geometric()).unwrap();
        assert_eq!(apparent.position(), astrometric.position());
    }

    #[test]
    fn test_apparent_shift_is_small() {
        let (ts, eph) = setup();
        let t = ts.tt_jd(2_459_000.5, None);
        let earth = eph.planet(Body::Earth).at(&t).unwrap();
        let astrometric = earth.observe(&eph.planet(Body::Saturn)).unwrap();
        let apparent = astrometric.apparent().unwrap();

        // Aberration dominates: at most about 20.5 arcseconds
        let shift = apparent.separation_from(&astrometric).unwrap()[0];
        assert!(shift.to_degrees() * 3600.0 < 21.0);
        assert!(shift.to_degrees() * 3600.0 > 0.0);
    }

    #[test]
    fn test_altaz_needs_ground_site() {
        let (ts, eph) = setup();
        let t = ts.tt_jd(2_459_000.5, None);
        let earth = eph.planet(Body::Earth).at(&t).unwrap();
        let apparent = earth.observe(&eph.planet(Body::Mars)).unwrap().apparent().unwrap();
        assert!(matches!(
            apparent.altaz(),
            Err(SkypathError::GeometryPrecondition(_))
        ));
    }

    #[test]
    fn test_separation_broadcasts_single_element() {
        let (ts, eph) = setup();
        let t = ts.tt_jd_array(&[2_459_000.5, 2_459_010.5, 2_459_020.5]).unwrap();
        let t0 = ts.tt_jd(2_459_000.5, None);

        let earth = eph.planet(Body::Earth).at(&t).unwrap();
        let earth0 = eph.planet(Body::Earth).at(&t0).unwrap();
        let sun = earth.observe(&eph.planet(Body::Sun)).unwrap();
        let sun0 = earth0.observe(&eph.planet(Body::Sun)).unwrap();

        let separation = sun.separation_from(&sun0).unwrap();
        assert_eq!(separation.len(), 3);
        assert_abs_diff_eq!(separation[0].to_radians(), 0.0, epsilon = 1e-12);
        // The Sun moves about a degree a day along the ecliptic
        assert_abs_diff_eq!(separation[1].to_degrees(), 9.86, epsilon = 0.1);
    }

    #[test]
    fn test_radec_epoch_of_date_differs_from_icrs() {
        let (ts, eph) = setup();
        let t = ts.tt_jd(2_469_807.5, None); // 2050
        let earth = eph.planet(Body::Earth).at(&t).unwrap();
        let venus = earth.observe(&eph.planet(Body::Venus)).unwrap();

        let icrs = venus.radec(None).unwrap()[0];
        let of_date = venus.radec_of_date().unwrap()[0];
        // Half a century of precession is about 0.7 degrees
        let delta = ((of_date.ra.to_degrees() - icrs.ra.to_degrees() + 180.0).rem_euclid(360.0)
            - 180.0)
            .abs();
        assert!(delta > 0.3 && delta < 1.5, "{}", delta);
        assert_relative_eq!(
            of_date.distance.au(),
            icrs.distance.au(),
            max_relative = 1e-15
        );
    }
}
