//! # Cartesian ⇄ spherical conversions
//!
//! Vectors are `nalgebra::Vector3<f64>` in a right-handed frame whose x axis
//! points toward the equinox and whose z axis points toward the pole of the
//! frame in use (ICRS, true equator of date, or a local horizon basis).
//!
//! The longitude convention is `phi = atan2(-y, -x) + π`. It agrees with
//! `atan2(y, x)` reduced into [0, 2π) except that the result is produced
//! directly in that range, and a vector along -x reads as exactly π.

use nalgebra::Vector3;
use std::f64::consts::PI;

/// Convert a vector to (r, theta, phi)
///
/// `theta` is the latitude-like angle in [-π/2, π/2] and `phi` the
/// longitude-like angle in [0, 2π]. A zero vector yields all zeros.
///
/// # Examples
///
/// ```rust
/// use skypath::coordinates::cartesian::to_polar;
/// use nalgebra::Vector3;
///
/// let (r, theta, phi) = to_polar(&Vector3::new(0.0, 2.0, 0.0));
/// assert_eq!(r, 2.0);
/// assert_eq!(theta, 0.0);
/// assert!((phi - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
/// ```
pub fn to_polar(v: &Vector3<f64>) -> (f64, f64, f64) {
    let r = v.norm();
    if r == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let theta = (v.z / r).clamp(-1.0, 1.0).asin();
    let phi = f64::atan2(-v.y, -v.x) + PI;
    (r, theta, phi)
}

/// Build a vector from (r, theta, phi) as returned by [`to_polar`]
pub fn from_polar(r: f64, theta: f64, phi: f64) -> Vector3<f64> {
    let (st, ct) = theta.sin_cos();
    let (sp, cp) = phi.sin_cos();
    Vector3::new(r * ct * cp, r * ct * sp, r * st)
}

/// Angle in radians between two vectors, in [0, π]
///
/// Uses the half-angle form `2·atan2(|u−v|, |u+v|)` on the unit vectors,
/// which stays accurate for nearly parallel or anti-parallel inputs.
pub fn angle_between(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    let (nu, nv) = (u.norm(), v.norm());
    if nu == 0.0 || nv == 0.0 {
        return 0.0;
    }
    let a = u / nu;
    let b = v / nv;
    2.0 * f64::atan2((a - b).norm(), (a + b).norm())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;
    use std::f64::consts::FRAC_PI_2;

    #[rstest]
    #[case(Vector3::new(1.0, 0.0, 0.0), 0.0, 0.0)]
    #[case(Vector3::new(0.0, 1.0, 0.0), 0.0, FRAC_PI_2)]
    #[case(Vector3::new(-1.0, 0.0, 0.0), 0.0, PI)]
    #[case(Vector3::new(0.0, -1.0, 0.0), 0.0, 3.0 * FRAC_PI_2)]
    #[case(Vector3::new(0.0, 0.0, 1.0), FRAC_PI_2, 0.0)]
    #[case(Vector3::new(0.0, 0.0, -1.0), -FRAC_PI_2, 0.0)]
    fn test_axes(#[case] v: Vector3<f64>, #[case] theta: f64, #[case] phi: f64) {
        let (r, t, p) = to_polar(&v);
        assert_abs_diff_eq!(r, 1.0);
        assert_abs_diff_eq!(t, theta, epsilon = 1e-15);
        assert_abs_diff_eq!(p, phi, epsilon = 1e-15);
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(to_polar(&Vector3::zeros()), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_polar_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let v = Vector3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let (r, theta, phi) = to_polar(&v);
            assert!((0.0..=2.0 * PI).contains(&phi));
            assert_abs_diff_eq!(from_polar(r, theta, phi), v, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_angle_between() {
        let x = Vector3::x();
        let y = Vector3::y();
        assert_abs_diff_eq!(angle_between(&x, &y), FRAC_PI_2, epsilon = 1e-15);
        assert_abs_diff_eq!(angle_between(&x, &(-x * 3.0)), PI, epsilon = 1e-15);
        assert_abs_diff_eq!(angle_between(&x, &(x * 2.0)), 0.0, epsilon = 1e-15);

        // One milliarcsecond apart stays resolvable
        let tiny: f64 = 4.848_136_811e-9;
        let v = Vector3::new(tiny.cos(), tiny.sin(), 0.0);
        assert_abs_diff_eq!(angle_between(&x, &v), tiny, epsilon = 1e-20);
    }
}
