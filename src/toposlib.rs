//! Observers on Earth's surface

use crate::constants::DEG2RAD;
use crate::earthlib::terra;
use crate::errors::{Result, SkypathError};
use crate::planetlib::{Body, Ephemeris};
use crate::positions::{Barycentric, ObserverCenter, SkyPosition};
use crate::time::Time;
use nalgebra::Vector3;

/// A geodetic site on the IERS 2010 ellipsoid
///
/// The local up, north and west unit vectors are fixed to the Earth and
/// computed once here; [`Topos::at`] only has to spin the site into the
/// celestial frame for each instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Topos {
    latitude_deg: f64,
    longitude_deg: f64,
    elevation_m: f64,
    up: Vector3<f64>,
    north: Vector3<f64>,
    west: Vector3<f64>,
}

impl Topos {
    /// Create a site from geodetic latitude and east longitude in degrees
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(SkypathError::GeometryPrecondition(format!(
                "latitude {} is outside [-90, 90] degrees",
                latitude_deg
            )));
        }
        if !longitude_deg.is_finite() || !elevation_m.is_finite() {
            return Err(SkypathError::GeometryPrecondition(
                "longitude and elevation must be finite".to_string(),
            ));
        }

        let (sinlat, coslat) = (latitude_deg * DEG2RAD).sin_cos();
        let (sinlon, coslon) = (longitude_deg * DEG2RAD).sin_cos();

        Ok(Self {
            latitude_deg,
            longitude_deg,
            elevation_m,
            up: Vector3::new(coslat * coslon, coslat * sinlon, sinlat),
            north: Vector3::new(-sinlat * coslon, -sinlat * sinlon, coslat),
            west: Vector3::new(sinlon, -coslon, 0.0),
        })
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    pub fn elevation_m(&self) -> f64 {
        self.elevation_m
    }

    /// Local zenith in the Earth-fixed frame
    pub fn up(&self) -> &Vector3<f64> {
        &self.up
    }

    pub fn north(&self) -> &Vector3<f64> {
        &self.north
    }

    pub fn west(&self) -> &Vector3<f64> {
        &self.west
    }

    /// Earth-fixed position in AU
    pub fn itrf_position(&self) -> Vector3<f64> {
        terra(
            self.latitude_deg * DEG2RAD,
            self.longitude_deg * DEG2RAD,
            self.elevation_m,
            0.0,
        )
        .0
    }

    /// Site position (AU) and velocity (AU/day) relative to the geocenter, in the GCRS
    pub fn gcrs(&self, t: &Time) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
        let lat = self.latitude_deg * DEG2RAD;
        let lon = self.longitude_deg * DEG2RAD;

        t.gast()
            .iter()
            .zip(t.mt_matrix())
            .map(|(&gast, mt)| {
                let (pos, vel) = terra(lat, lon, self.elevation_m, gast);
                (mt * pos, mt * vel)
            })
            .unzip()
    }

    /// This site as an observer at `t`
    pub fn at(&self, ephemeris: &Ephemeris, t: &Time) -> Result<Barycentric> {
        let earth = ephemeris.planet(Body::Earth).at(t)?;
        let (gcrs_position, gcrs_velocity) = self.gcrs(t);

        let position = earth
            .position()
            .iter()
            .zip(&gcrs_position)
            .map(|(e, s)| e + s)
            .collect();
        let velocity = earth
            .velocity()
            .iter()
            .zip(&gcrs_velocity)
            .map(|(e, s)| e + s)
            .collect();

        Barycentric::new(
            t.clone(),
            position,
            velocity,
            ephemeris.clone(),
            ObserverCenter::Site {
                topos: self.clone(),
                gcrs_position,
                gcrs_velocity,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AU_M, EARTH_RADIUS};
    use crate::framelib::rot_z;
    use crate::test_helpers::CircularOrbits;
    use crate::time::Timescale;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(42.3583, -71.0636)]
    #[case(-33.87, 151.21)]
    #[case(90.0, 10.0)]
    fn test_local_basis_is_orthonormal(#[case] lat: f64, #[case] lon: f64) {
        let site = Topos::new(lat, lon, 0.0).unwrap();
        let (u, n, w) = (site.up(), site.north(), site.west());
        assert_abs_diff_eq!(u.norm(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(n.norm(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w.norm(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(u.dot(n), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(u.dot(w), 0.0, epsilon = 1e-15);
        // north x west = up keeps the frame right-handed
        assert_abs_diff_eq!(n.cross(w), *u, epsilon = 1e-15);
    }

    #[test]
    fn test_rejects_bad_latitude() {
        assert!(matches!(
            Topos::new(91.0, 0.0, 0.0),
            Err(SkypathError::GeometryPrecondition(_))
        ));
    }

    #[test]
    fn test_gcrs_matches_spun_itrf() {
        let ts = Timescale::default();
        let t = ts.utc((2022, 6, 21, 3, 0, 0.0)).unwrap();
        let site = Topos::new(51.4769, -0.0005, 46.0).unwrap();

        let (pos, _) = site.gcrs(&t);
        let expected = t.mt_matrix()[0]
            * rot_z(t.gast()[0] / 24.0 * std::f64::consts::TAU)
            * site.itrf_position();
        assert_abs_diff_eq!(pos[0], expected, epsilon = 1e-16);

        // Site radius is close to Earth's equatorial radius
        let radius_m = pos[0].norm() * AU_M;
        assert!((radius_m - EARTH_RADIUS).abs() < 25_000.0);
    }

    #[test]
    fn test_observer_adds_site_to_earth() {
        let ts = Timescale::default();
        let eph = Ephemeris::new(CircularOrbits::default());
        let t = ts.tt_jd_array(&[2_459_000.5, 2_459_001.5]).unwrap();
        let site = Topos::new(-30.0, 70.0, 2_000.0).unwrap();

        let earth = eph.planet(Body::Earth).at(&t).unwrap();
        let observer = site.at(&eph, &t).unwrap();
        let (gcrs, _) = site.gcrs(&t);

        for i in 0..t.len() {
            assert_abs_diff_eq!(
                observer.position()[i] - earth.position()[i],
                gcrs[i],
                epsilon = 1e-15
            );
        }
        assert!(observer.topos().is_some());
        assert!(earth.topos().is_none());
    }
}
