//! Nutation computations
//!
//! Implements nutation in longitude (delta-psi) and obliquity (delta-epsilon)
//! after the IAU 2000A and IAU 2000B models, the mean obliquity of the
//! ecliptic, the complementary terms of the equation of the equinoxes, and the
//! nutation rotation matrix.

mod iau2000a_data;
mod series;

pub use series::{NutationSeries, NutationTerm};

use crate::constants::{ASEC2RAD, ASEC360, DEG2RAD, J2000, JULIAN_CENTURY, TAU};
use iau2000a_data::{
    LUNISOLAR_LONGITUDE, LUNISOLAR_OBLIQUITY, NALS_T, NAPL_T, PLANETARY_LONGITUDE,
    PLANETARY_OBLIQUITY,
};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Conversion factor from 0.1 microarcsecond to arcseconds
const TENTH_USEC_2_ASEC: f64 = 1e-7;

/// Fundamental argument polynomial coefficients
///
/// Each row: [constant, t^1, t^2, t^3, t^4] in arcseconds
/// From IERS Conventions (2003), Chapter 5
#[rustfmt::skip]
const FA_COEFFS: [[f64; 5]; 5] = [
    // Mean Anomaly of the Moon (l)
    [485868.249036, 1717915923.2178, 31.8792, 0.051635, -0.00024470],
    // Mean Anomaly of the Sun (l')
    [1287104.79305, 129596581.0481, -0.5532, 0.000136, -0.00001149],
    // Mean Longitude of Moon - Ascending Node (F)
    [335779.526232, 1739527262.8478, -12.7512, -0.001037, 0.00000417],
    // Mean Elongation of Moon from Sun (D)
    [1072260.70369, 1602961601.2090, -6.3706, 0.006593, -0.00003169],
    // Mean Longitude of Ascending Node of Moon (Omega)
    [450160.398036, -6962890.5431, 7.4722, 0.007702, -0.00005939],
];

/// Linear fundamental arguments used by the planetary nutation series
///
/// [constant, rate] in radians and radians per century (Souchay et al. 1999).
/// The last row is the general precession and is multiplied by t again.
const PLANETARY_FA: [[f64; 2]; 14] = [
    [2.35555598, 8328.6914269554],   // l
    [6.24006013, 628.301955],        // l'
    [1.627905234, 8433.466158131],   // F
    [5.198466741, 7771.3771468121],  // D
    [2.18243920, -33.757045],        // Omega
    [4.402608842, 2608.7903141574],  // Mercury
    [3.176146697, 1021.3285546211],  // Venus
    [1.753470314, 628.3075849991],   // Earth
    [6.203480913, 334.0612426700],   // Mars
    [0.599546497, 52.9690962641],    // Jupiter
    [0.874016757, 21.3299104960],    // Saturn
    [5.481293871, 7.4781598567],     // Uranus
    [5.321159000, 3.8127774000],     // Neptune
    [0.02438175, 0.00000538691],     // general precession
];

/// Planetary mean longitudes of IERS Conventions (2003), Mercury through Neptune
const PLANETARY_LONGITUDES_2003: [[f64; 2]; 8] = [
    [4.402608842, 2608.7903141574],
    [3.176146697, 1021.3285546211],
    [1.753470314, 628.3075849991],
    [6.203480913, 334.0612426700],
    [0.599546497, 52.9690962641],
    [0.874016757, 21.3299104960],
    [5.481293872, 7.4781598567],
    [5.311886287, 3.8133035638],
];

/// IAU 2000B fixed offsets standing in for the planetary terms, 0.1 µas
const IAU2000B_PLANETARY_DPSI: f64 = -1350.0;
const IAU2000B_PLANETARY_DEPS: f64 = 3880.0;

/// Number of luni-solar terms in the IAU 2000B truncation
const IAU2000B_TERMS: usize = 77;

/// Which series to evaluate for nutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NutationModel {
    /// Luni-solar and planetary series with polynomial arguments
    #[default]
    Iau2000A,
    /// 77 luni-solar terms with linear arguments and fixed planetary offsets
    Iau2000B,
}

impl NutationModel {
    /// Nutation angles (delta-psi, delta-epsilon) in units of 0.1 µas
    pub fn evaluate(&self, jd_tt: f64) -> (f64, f64) {
        match self {
            NutationModel::Iau2000A => iau2000a(jd_tt),
            NutationModel::Iau2000B => iau2000b(jd_tt),
        }
    }
}

/// Compute the five fundamental arguments (Delaunay variables) in radians
///
/// # Arguments
/// * `t` - TT time in Julian centuries since J2000.0
pub fn fundamental_arguments(t: f64) -> [f64; 5] {
    let mut fa = [0.0f64; 5];
    for (value, c) in fa.iter_mut().zip(FA_COEFFS.iter()) {
        let arcsec = c[0] + (c[1] + (c[2] + (c[3] + c[4] * t) * t) * t) * t;
        *value = (arcsec % ASEC360) * ASEC2RAD;
    }
    fa
}

/// The fourteen arguments of IERS Conventions (2010) Chapter 5: the Delaunay
/// variables, the mean longitudes of Mercury through Neptune and the general
/// precession in longitude, all in radians
pub fn iers_arguments(t: f64) -> [f64; 14] {
    let mut fa = [0.0f64; 14];
    fa[..5].copy_from_slice(&fundamental_arguments(t));
    for (value, c) in fa[5..13].iter_mut().zip(PLANETARY_LONGITUDES_2003.iter()) {
        *value = (c[0] + c[1] * t) % TAU;
    }
    fa[13] = (0.024381750 + 0.00000538691 * t) * t;
    fa
}

fn planetary_arguments(t: f64) -> [f64; 14] {
    let mut fa = [0.0f64; 14];
    for (value, c) in fa.iter_mut().zip(PLANETARY_FA.iter()) {
        *value = (c[0] + c[1] * t) % TAU;
    }
    fa[13] = (PLANETARY_FA[13][0] + PLANETARY_FA[13][1] * t) * t;
    fa
}

fn lunisolar_sum(fa: &[f64; 5], t: f64, terms: usize) -> (f64, f64) {
    let mut dpsi = 0.0;
    let mut deps = 0.0;

    for ((mult, lon), obl) in NALS_T
        .iter()
        .zip(LUNISOLAR_LONGITUDE.iter())
        .zip(LUNISOLAR_OBLIQUITY.iter())
        .take(terms)
    {
        let arg: f64 = mult
            .iter()
            .zip(fa.iter())
            .map(|(&m, &a)| m as f64 * a)
            .sum();
        let (sarg, carg) = arg.sin_cos();

        dpsi += (lon[0] + lon[1] * t) * sarg + lon[2] * carg;
        deps += (obl[0] + obl[1] * t) * carg + obl[2] * sarg;
    }

    (dpsi, deps)
}

/// IAU 2000A nutation angles (delta-psi, delta-epsilon) in units of 0.1 µas
///
/// Evaluates the terms compiled into the crate, which leave residuals of a
/// few tenths of a milliarcsecond against the full series. Load the IERS
/// tables with [`NutationSeries::from_iers_tables`] for the complete model.
///
/// # Arguments
/// * `jd_tt` - TT Julian date
pub fn iau2000a(jd_tt: f64) -> (f64, f64) {
    let t = (jd_tt - J2000) / JULIAN_CENTURY;

    let fa = fundamental_arguments(t);
    let (mut dpsi, mut deps) = lunisolar_sum(&fa, t, NALS_T.len());

    let pa = planetary_arguments(t);
    for ((mult, lon), obl) in NAPL_T
        .iter()
        .zip(PLANETARY_LONGITUDE.iter())
        .zip(PLANETARY_OBLIQUITY.iter())
    {
        let arg: f64 = mult
            .iter()
            .zip(pa.iter())
            .map(|(&m, &a)| m as f64 * a)
            .sum();
        let (sarg, carg) = arg.sin_cos();

        dpsi += lon[0] * sarg + lon[1] * carg;
        deps += obl[0] * sarg + obl[1] * carg;
    }

    (dpsi, deps)
}

/// IAU 2000B nutation angles (delta-psi, delta-epsilon) in units of 0.1 µas
///
/// Uses linear fundamental arguments, as the truncated model prescribes.
pub fn iau2000b(jd_tt: f64) -> (f64, f64) {
    let t = (jd_tt - J2000) / JULIAN_CENTURY;

    let mut fa = [0.0f64; 5];
    for (value, c) in fa.iter_mut().zip(FA_COEFFS.iter()) {
        *value = ((c[0] + c[1] * t) % ASEC360) * ASEC2RAD;
    }

    let (dpsi, deps) = lunisolar_sum(&fa, t, IAU2000B_TERMS);
    (
        dpsi + IAU2000B_PLANETARY_DPSI,
        deps + IAU2000B_PLANETARY_DEPS,
    )
}

/// Mean obliquity of the ecliptic in arcseconds
///
/// From Capitaine et al. (2003), Astronomy and Astrophysics 412, 567-586.
pub fn mean_obliquity(jd_tdb: f64) -> f64 {
    let t = (jd_tdb - J2000) / JULIAN_CENTURY;

    ((((-0.0000000434 * t - 0.000000576) * t + 0.00200340) * t - 0.0001831) * t - 46.836769) * t
        + 84381.406
}

/// Number of constant complementary terms
const N_EQEQ_TERMS: usize = 33;

/// Complementary terms argument multipliers over l, l', F, D, Omega,
/// Mercury through Neptune and the general precession
#[rustfmt::skip]
const KE0: [[i8; 14]; N_EQEQ_TERMS] = [
    [  0,   0,   0,   0,   1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   2,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,  -2,   3,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,  -2,   1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,  -2,   2,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,   0,   3,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,   0,   1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   3,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   1,   0,   0,   1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   1,   0,   0,  -1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,   0,   0,  -1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,   0,   0,   1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   1,   2,  -2,   3,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   1,   2,  -2,   1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   4,  -4,   4,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   1,  -1,   1,   0,  -8,  12,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,   0,   2,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,   2,   0,   3,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,   2,   0,   1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,  -2,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   1,  -2,   2,  -3,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   1,  -2,   2,  -1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   8, -13,   0,   0,   0,   0,   0,  -1],
    [  0,   0,   0,   2,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  2,   0,  -2,   0,  -1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,   0,  -2,   1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   1,   2,  -2,   2,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,   0,  -2,  -1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   4,  -2,   4,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   2,  -2,   4,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,  -2,   0,  -3,   0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,  -2,   0,  -1,   0,   0,   0,   0,   0,   0,   0,   0,   0],
];

/// Complementary terms [sine, cosine] coefficients in arcseconds
#[rustfmt::skip]
const SE0: [[f64; 2]; N_EQEQ_TERMS] = [
    [ 2640.96e-6, -0.39e-6],
    [   63.52e-6, -0.02e-6],
    [   11.75e-6,  0.01e-6],
    [   11.21e-6,  0.01e-6],
    [   -4.55e-6,  0.00e-6],
    [    2.02e-6,  0.00e-6],
    [    1.98e-6,  0.00e-6],
    [   -1.72e-6,  0.00e-6],
    [   -1.41e-6, -0.01e-6],
    [   -1.26e-6, -0.01e-6],
    [   -0.63e-6,  0.00e-6],
    [   -0.63e-6,  0.00e-6],
    [    0.46e-6,  0.00e-6],
    [    0.45e-6,  0.00e-6],
    [    0.36e-6,  0.00e-6],
    [   -0.24e-6, -0.12e-6],
    [    0.32e-6,  0.00e-6],
    [    0.28e-6,  0.00e-6],
    [    0.27e-6,  0.00e-6],
    [    0.26e-6,  0.00e-6],
    [   -0.21e-6,  0.00e-6],
    [    0.19e-6,  0.00e-6],
    [    0.18e-6,  0.00e-6],
    [   -0.10e-6,  0.05e-6],
    [    0.15e-6,  0.00e-6],
    [   -0.14e-6,  0.00e-6],
    [    0.14e-6,  0.00e-6],
    [   -0.14e-6,  0.00e-6],
    [    0.14e-6,  0.00e-6],
    [    0.13e-6,  0.00e-6],
    [   -0.11e-6,  0.00e-6],
    [    0.11e-6,  0.00e-6],
    [    0.11e-6,  0.00e-6],
];

/// The single t-multiplied complementary term: sine coefficient on Omega
const SE1_SIN: f64 = -0.87e-6;

/// Complementary terms of the equation of the equinoxes, in radians
///
/// From IERS Conventions (2010), Chapter 5, Table 5.2e.
pub fn equation_of_the_equinoxes_complementary_terms(jd_tt: f64) -> f64 {
    let t = (jd_tt - J2000) / JULIAN_CENTURY;
    let fa = iers_arguments(t);

    let mut c_terms = SE1_SIN * fa[4].sin() * t;

    for (mult, coeffs) in KE0.iter().zip(SE0.iter()) {
        let arg: f64 = mult
            .iter()
            .zip(fa.iter())
            .map(|(&m, &a)| m as f64 * a)
            .sum();
        let (sarg, carg) = arg.sin_cos();
        c_terms += coeffs[0] * sarg + coeffs[1] * carg;
    }

    c_terms * ASEC2RAD
}

/// Orientation of Earth's axis at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthTilt {
    /// Mean obliquity of the ecliptic in degrees
    pub mean_obliquity: f64,
    /// True obliquity (mean plus nutation in obliquity) in degrees
    pub true_obliquity: f64,
    /// Equation of the equinoxes in seconds of time
    pub equation_of_the_equinoxes: f64,
    /// Nutation in longitude in arcseconds
    pub dpsi: f64,
    /// Nutation in obliquity in arcseconds
    pub deps: f64,
}

/// Obliquity, nutation and equation of the equinoxes at a TDB Julian date
pub fn earth_tilt(jd_tdb: f64, model: NutationModel) -> EarthTilt {
    tilt_from_nutation(jd_tdb, model.evaluate(jd_tdb))
}

/// Like [`earth_tilt`], with nutation taken from a caller-supplied series
pub fn earth_tilt_from_series(jd_tdb: f64, series: &NutationSeries) -> EarthTilt {
    tilt_from_nutation(jd_tdb, series.evaluate(jd_tdb))
}

/// `(dp, de)` are the nutation angles in 0.1 µas
fn tilt_from_nutation(jd_tdb: f64, (dp, de): (f64, f64)) -> EarthTilt {
    let dpsi = dp * TENTH_USEC_2_ASEC;
    let deps = de * TENTH_USEC_2_ASEC;

    let c_terms = equation_of_the_equinoxes_complementary_terms(jd_tdb) / ASEC2RAD;

    let mean_ob = mean_obliquity(jd_tdb);
    let true_ob = mean_ob + deps;
    let mean_ob = mean_ob / 3600.0;
    let true_ob = true_ob / 3600.0;

    let eq_eq = (dpsi * (mean_ob * DEG2RAD).cos() + c_terms) / 15.0;

    EarthTilt {
        mean_obliquity: mean_ob,
        true_obliquity: true_ob,
        equation_of_the_equinoxes: eq_eq,
        dpsi,
        deps,
    }
}

/// Nutation rotation matrix from mean obliquity, true obliquity and delta-psi
///
/// All angles in radians. The matrix rotates mean-equator-of-date vectors
/// onto the true equator and equinox of date.
pub fn build_nutation_matrix(mean_obliquity: f64, true_obliquity: f64, psi: f64) -> Matrix3<f64> {
    let (sobm, cobm) = mean_obliquity.sin_cos();
    let (sobt, cobt) = true_obliquity.sin_cos();
    let (spsi, cpsi) = psi.sin_cos();

    #[rustfmt::skip]
    let n = Matrix3::new(
        cpsi,          -spsi * cobm,                      -spsi * sobm,
        spsi * cobt,    cpsi * cobm * cobt + sobm * sobt,  cpsi * sobm * cobt - cobm * sobt,
        spsi * sobt,    cpsi * cobm * sobt - sobm * cobt,  cpsi * sobm * sobt + cobm * cobt,
    );
    n
}

/// Nutation matrix for an already computed tilt
pub fn compute_nutation(tilt: &EarthTilt) -> Matrix3<f64> {
    build_nutation_matrix(
        tilt.mean_obliquity * DEG2RAD,
        tilt.true_obliquity * DEG2RAD,
        tilt.dpsi * ASEC2RAD,
    )
}
