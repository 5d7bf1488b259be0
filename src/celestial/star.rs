//! Stars and other objects beyond the solar system

use crate::celestial::Observable;
use crate::constants::{ASEC2RAD, AU_KM, C, C_AUDAY, DAY_S, J2000};
use crate::coordinates::from_polar;
use crate::errors::Result;
use crate::positions::{Astrometric, Barycentric, SkyPosition};
use crate::relativity::light_time_difference;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Parallax substituted when none is known, placing the star one gigaparsec away
const MIN_PARALLAX_MAS: f64 = 1.0e-6;

/// Catalog astrometry for a star
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarData {
    /// Right ascension in hours at the catalog epoch
    pub ra_hours: f64,
    /// Declination in degrees at the catalog epoch
    pub dec_degrees: f64,
    /// Proper motion in right ascension times cos(dec), mas/yr
    #[serde(default)]
    pub ra_mas_per_year: f64,
    #[serde(default)]
    pub dec_mas_per_year: f64,
    #[serde(default)]
    pub parallax_mas: f64,
    /// Radial velocity, km/s, positive when receding
    #[serde(default)]
    pub radial_km_per_s: f64,
    /// Catalog epoch as a TDB Julian date
    #[serde(default = "default_epoch")]
    pub epoch: f64,
}

fn default_epoch() -> f64 {
    J2000
}

/// A star with its barycentric position and space motion
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    data: StarData,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

impl Star {
    /// Star at a fixed catalog place with no known motion or distance
    pub fn new(ra_hours: f64, dec_degrees: f64) -> Self {
        Self::from_data(StarData {
            ra_hours,
            dec_degrees,
            ra_mas_per_year: 0.0,
            dec_mas_per_year: 0.0,
            parallax_mas: 0.0,
            radial_km_per_s: 0.0,
            epoch: J2000,
        })
    }

    pub fn with_proper_motion(self, ra_mas_per_year: f64, dec_mas_per_year: f64) -> Self {
        Self::from_data(StarData {
            ra_mas_per_year,
            dec_mas_per_year,
            ..self.data
        })
    }

    pub fn with_parallax(self, parallax_mas: f64) -> Self {
        Self::from_data(StarData {
            parallax_mas,
            ..self.data
        })
    }

    pub fn with_radial_velocity(self, radial_km_per_s: f64) -> Self {
        Self::from_data(StarData {
            radial_km_per_s,
            ..self.data
        })
    }

    /// Catalog epoch as a TDB Julian date
    pub fn with_epoch(self, epoch: f64) -> Self {
        Self::from_data(StarData { epoch, ..self.data })
    }

    pub fn from_data(data: StarData) -> Self {
        let (position, velocity) = space_motion(&data);
        Self {
            data,
            position,
            velocity,
        }
    }

    pub fn data(&self) -> &StarData {
        &self.data
    }

    /// Barycentric position at the catalog epoch, AU
    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    /// Barycentric space velocity, AU/day
    pub fn velocity(&self) -> &Vector3<f64> {
        &self.velocity
    }
}

/// Position and velocity vectors from catalog astrometry
fn space_motion(data: &StarData) -> (Vector3<f64>, Vector3<f64>) {
    let parallax = if data.parallax_mas <= 0.0 {
        MIN_PARALLAX_MAS
    } else {
        data.parallax_mas
    };

    let distance = 1.0 / (parallax * 1.0e-3 * ASEC2RAD).sin();
    let ra = (data.ra_hours * 15.0).to_radians();
    let dec = data.dec_degrees.to_radians();
    let position = from_polar(distance, dec, ra);

    // Relativistic Doppler factor
    let k = 1.0 / (1.0 - data.radial_km_per_s * 1000.0 / C);

    let pmr = data.ra_mas_per_year / (parallax * 365.25) * k;
    let pmd = data.dec_mas_per_year / (parallax * 365.25) * k;
    let rvl = data.radial_km_per_s * DAY_S / AU_KM * k;

    let (sra, cra) = ra.sin_cos();
    let (sdc, cdc) = dec.sin_cos();

    let velocity = Vector3::new(
        -pmr * sra - pmd * sdc * cra + rvl * cdc * cra,
        pmr * cra - pmd * sdc * sra + rvl * cdc * sra,
        pmd * cdc + rvl * sdc,
    );

    (position, velocity)
}

impl Observable for Star {
    fn observe_from(&self, observer: &Barycentric) -> Result<Astrometric> {
        let tdb = observer.t().tdb();
        let mut position = Vec::with_capacity(tdb.len());
        let mut velocity = Vec::with_capacity(tdb.len());
        let mut light_time = Vec::with_capacity(tdb.len());

        for ((&jd, obs_p), obs_v) in tdb
            .iter()
            .zip(observer.position())
            .zip(observer.velocity())
        {
            let dt = light_time_difference(&self.position, obs_p);
            let moved = self.position + self.velocity * (jd + dt - self.data.epoch);
            let vector = moved - obs_p;
            light_time.push(vector.norm() / C_AUDAY);
            position.push(vector);
            velocity.push(self.velocity - obs_v);
        }

        Astrometric::new(position, velocity, light_time, observer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planetlib::{Body, Ephemeris};
    use crate::positions::{ApparentOptions, ObserverCenter};
    use crate::test_helpers::CircularOrbits;
    use crate::time::{Time, Timescale};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn barycenter(t: Time) -> Barycentric {
        let n = t.len();
        Barycentric::new(
            t,
            vec![Vector3::zeros(); n],
            vec![Vector3::zeros(); n],
            Ephemeris::new(CircularOrbits::default()),
            ObserverCenter::Body(Body::Sun),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_parallax_is_one_gigaparsec() {
        let star = Star::new(5.0, -20.0);
        let parsec_au = 1.0 / (1.0e-3 * ASEC2RAD).sin() * 1.0e-3;
        assert_relative_eq!(star.position().norm(), parsec_au * 1.0e9, max_relative = 1e-9);
        assert_eq!(*star.velocity(), Vector3::zeros());

        let negative = Star::new(5.0, -20.0).with_parallax(-3.0);
        assert_eq!(negative.position(), star.position());
    }

    #[test]
    fn test_distant_star_from_geocenter_keeps_catalog_place() {
        let ts = Timescale::default();
        let t = ts.from_iso("2024-05-01T00:00:00Z").unwrap();
        let earth = Ephemeris::new(CircularOrbits::default())
            .planet(Body::Earth)
            .at(&t)
            .unwrap();
        assert!(earth.is_geocentric());

        let star = Star::new(10.1395, 11.967);
        let apparent = earth
            .observe(&star)
            .unwrap()
            .apparent_with(&ApparentOptions::geometric())
            .unwrap();

        let radec = apparent.radec(None).unwrap()[0];
        assert_abs_diff_eq!(radec.ra.to_hours(), 10.1395, epsilon = 1e-10);
        assert_abs_diff_eq!(radec.dec.to_degrees(), 11.967, epsilon = 1e-10);
        let parsec_au = 1.0 / (1.0e-3 * ASEC2RAD).sin() * 1.0e-3;
        assert_relative_eq!(radec.distance.au(), parsec_au * 1.0e9, max_relative = 1e-9);
    }

    #[test]
    fn test_catalog_place_at_epoch() {
        let ts = Timescale::default();
        let star = Star::new(14.5, 38.0).with_parallax(100.0);
        let astrometric = barycenter(ts.tdb_jd(J2000, None)).observe(&star).unwrap();

        let radec = astrometric.radec(None).unwrap()[0];
        assert_abs_diff_eq!(radec.ra.to_hours(), 14.5, epsilon = 1e-12);
        assert_abs_diff_eq!(radec.dec.to_degrees(), 38.0, epsilon = 1e-12);
        // Ten parsecs
        assert_relative_eq!(radec.distance.au(), 2_062_648.06, max_relative = 1e-8);
    }

    #[test]
    fn test_proper_motion_over_a_century() {
        let ts = Timescale::default();
        let star = Star::new(6.0, 0.0)
            .with_parallax(500.0)
            .with_proper_motion(0.0, 1_000.0);
        let t = ts.tdb_jd(J2000 + 36_525.0, None);
        let radec = barycenter(t).observe(&star).unwrap().radec(None).unwrap()[0];
        assert_abs_diff_eq!(radec.dec.to_degrees() * 3600.0, 100.0, epsilon = 1e-3);
        assert_abs_diff_eq!(radec.ra.to_hours(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_receding_star_moves_away() {
        let star = Star::new(3.0, 10.0).with_parallax(50.0).with_radial_velocity(30.0);
        let radial = star.velocity().dot(&star.position().normalize()) * AU_KM / DAY_S;
        assert_relative_eq!(radial, 30.0, max_relative = 1e-3);
    }

    #[test]
    fn test_light_time_and_relative_velocity() {
        let ts = Timescale::default();
        let eph = Ephemeris::new(CircularOrbits::default());
        let t = ts.tt_jd_array(&[2_459_000.5, 2_459_100.5]).unwrap();
        let earth = eph.planet(Body::Earth).at(&t).unwrap();
        let star = Star::new(6.75, -16.7).with_parallax(379.21).with_proper_motion(-546.0, -1223.0);

        let astrometric = earth.observe(&star).unwrap();
        for i in 0..t.len() {
            let d = astrometric.position()[i].norm();
            assert_relative_eq!(astrometric.light_time()[i] * C_AUDAY, d, max_relative = 1e-14);
            assert_eq!(astrometric.velocity()[i], star.velocity() - earth.velocity()[i]);
        }
    }

    #[test]
    fn test_star_data_from_json() {
        let data: StarData =
            serde_json::from_str(r#"{"ra_hours": 2.5, "dec_degrees": 89.26, "parallax_mas": 7.54}"#)
                .unwrap();
        assert_eq!(data.epoch, J2000);
        assert_eq!(data.ra_mas_per_year, 0.0);
        let star = Star::from_data(data);
        assert_relative_eq!(star.position().norm(), 1.0 / (7.54e-3 * ASEC2RAD).sin(), max_relative = 1e-12);
    }
}
