//! Earth rotation and the geometry of points on Earth's surface

use crate::constants::{
    AU_KM, AU_M, DAY_S, DEG2RAD, EARTH_ANGVEL, EARTH_RADIUS, EARTH_RADIUS_KM,
    IERS_2010_INVERSE_EARTH_FLATTENING, J2000, JULIAN_CENTURY, RAD2DEG,
};
use nalgebra::Vector3;
use std::f64::consts::PI;

/// Earth Rotation Angle as a fraction of a full turn, in [0, 1)
///
/// The UT1 date may be split across `jd_ut1` and `fraction_ut1` to keep
/// precision; IERS Conventions 2010, eq. 5.15.
pub fn earth_rotation_angle(jd_ut1: f64, fraction_ut1: f64) -> f64 {
    let th = 0.7790572732640 + 0.00273781191135448 * (jd_ut1 - J2000 + fraction_ut1);
    wrap_unit(th.rem_euclid(1.0) + jd_ut1.rem_euclid(1.0) + fraction_ut1)
}

/// Greenwich sidereal time in hours, in [0, 24)
///
/// Mean sidereal time follows the IAU 2006 expression built on the Earth
/// Rotation Angle. Passing the equation of the equinoxes (seconds of time)
/// yields apparent sidereal time instead.
pub fn sidereal_time_hours(
    jd_ut1: f64,
    fraction_ut1: f64,
    jd_tdb: f64,
    equation_of_the_equinoxes: Option<f64>,
) -> f64 {
    let theta = earth_rotation_angle(jd_ut1, fraction_ut1);
    let t = (jd_tdb - J2000) / JULIAN_CENTURY;

    // Precession in right ascension, arcseconds
    let st = 0.014506
        + ((((-0.0000000368 * t - 0.000029956) * t - 0.00000044) * t + 1.3915817) * t
            + 4612.156534)
            * t;

    let mut hours = st / 54000.0 + theta * 24.0;
    if let Some(eq_eq) = equation_of_the_equinoxes {
        hours += eq_eq / 3600.0;
    }
    wrap(hours, 24.0)
}

fn wrap_unit(x: f64) -> f64 {
    wrap(x, 1.0)
}

/// Reduce into [0, period), absorbing the rounding case that lands exactly on `period`
fn wrap(x: f64, period: f64) -> f64 {
    let r = x.rem_euclid(period);
    if r >= period {
        0.0
    } else {
        r
    }
}

/// Position and velocity of a point on Earth's surface
///
/// Latitude and longitude are geodetic, in radians; elevation in meters;
/// `gast` is Greenwich apparent sidereal time in hours. Returns vectors in
/// AU and AU/day in the true equator and equinox of date.
pub fn terra(
    latitude: f64,
    longitude: f64,
    elevation_m: f64,
    gast: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let flattening = 1.0 / IERS_2010_INVERSE_EARTH_FLATTENING;
    let ff = (1.0 - flattening) * (1.0 - flattening);

    let (sinphi, cosphi) = latitude.sin_cos();
    let c = 1.0 / (cosphi * cosphi + sinphi * sinphi * ff).sqrt();
    let s = ff * c;

    let elevation_km = elevation_m / 1000.0;
    let ach = EARTH_RADIUS_KM * c + elevation_km;
    let ash = EARTH_RADIUS_KM * s + elevation_km;

    // Local apparent sidereal time, radians
    let stlocl = gast * 15.0 * DEG2RAD + longitude;
    let (sinst, cosst) = stlocl.sin_cos();

    let ac = ach * cosphi;
    let position_km = Vector3::new(ac * cosst, ac * sinst, ash * sinphi);
    let velocity_km_s = EARTH_ANGVEL * Vector3::new(-position_km.y, position_km.x, 0.0);

    (position_km / AU_KM, velocity_km_s / AU_KM * DAY_S)
}

/// Angle of an object above or below Earth's limb as seen by an observer
///
/// `position` is the object relative to the observer and `observer` the
/// observer relative to the geocenter, both in AU. Returns the limb angle in
/// degrees (positive above the limb) and the nadir angle as a fraction of
/// Earth's apparent radius.
pub fn compute_limb_angle(position: &Vector3<f64>, observer: &Vector3<f64>) -> (f64, f64) {
    let disobj = position.norm();
    let disobs = observer.norm();

    // Earth's apparent angular radius from the observer
    let rade = EARTH_RADIUS / AU_M;
    let aprad = (rade / disobs).min(1.0).asin();

    // Zenith distance of the limb and of the object
    let zdlim = PI - aprad;
    let coszd = (position.dot(observer) / (disobj * disobs)).clamp(-1.0, 1.0);
    let zdobj = coszd.acos();

    let limb_angle = (zdlim - zdobj) * RAD2DEG;
    let nadir_angle = (PI - zdobj) / aprad;

    (limb_angle, nadir_angle)
}
