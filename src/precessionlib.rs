//! Precession of the equator (IAU 2006)
//!
//! Uses the four-angle formulation of Capitaine et al. (2003): the angles
//! psi_A, omega_A and chi_A together with the J2000 obliquity epsilon_0.
//! The rotation R3(chi_A) R1(-omega_A) R3(-psi_A) R1(epsilon_0) is written out
//! as a single closed-form matrix.

use crate::constants::{ASEC2RAD, J2000, JULIAN_CENTURY};
use nalgebra::Matrix3;

/// Obliquity of the ecliptic at J2000.0 in arcseconds
pub const EPS0_ARCSEC: f64 = 84381.406;

/// Precession angles (psi_A, omega_A, chi_A) in arcseconds
pub fn precession_angles(jd_tdb: f64) -> (f64, f64, f64) {
    let t = (jd_tdb - J2000) / JULIAN_CENTURY;

    let psia = ((((-0.0000000951 * t + 0.000132851) * t - 0.00114045) * t - 1.0790069) * t
        + 5038.481507)
        * t;

    let omegaa = ((((0.0000003337 * t - 0.000000467) * t - 0.00772503) * t + 0.0512623) * t
        - 0.025754)
        * t
        + EPS0_ARCSEC;

    let chia = ((((-0.0000000560 * t + 0.000170663) * t - 0.00121197) * t - 2.3814292) * t
        + 10.556403)
        * t;

    (psia, omegaa, chia)
}

/// Precession matrix from the mean equator and equinox of J2000.0 to that of date
pub fn compute_precession(jd_tdb: f64) -> Matrix3<f64> {
    let (psia, omegaa, chia) = precession_angles(jd_tdb);

    let (sa, ca) = (EPS0_ARCSEC * ASEC2RAD).sin_cos();
    let (sb, cb) = (-psia * ASEC2RAD).sin_cos();
    let (sc, cc) = (-omegaa * ASEC2RAD).sin_cos();
    let (sd, cd) = (chia * ASEC2RAD).sin_cos();

    #[rustfmt::skip]
    let p = Matrix3::new(
        cd * cb - sb * sd * cc,
        cd * sb * ca + sd * cc * cb * ca - sa * sd * sc,
        cd * sb * sa + sd * cc * cb * sa + ca * sd * sc,

        -sd * cb - sb * cd * cc,
        -sd * sb * ca + cd * cc * cb * ca - sa * cd * sc,
        -sd * sb * sa + cd * cc * cb * sa + ca * cd * sc,

        sb * sc,
        -sc * cb * ca - sa * cc,
        -sc * cb * sa + cc * ca,
    );
    p
}
