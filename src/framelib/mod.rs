//! Reference frame rotations
//!
//! Elementary rotation matrices and the constant frame bias between the ICRS
//! and the dynamical mean equator and equinox of J2000.0.

use crate::constants::ASEC2RAD;
use nalgebra::Matrix3;
use once_cell::sync::Lazy;

/// Frame bias offsets in arcseconds (IERS Conventions 2003)
const XI0: f64 = -0.0166170;
const ETA0: f64 = -0.0068192;
const DA0: f64 = -0.01460;

/// Rotation from the ICRS to the dynamical J2000 frame
///
/// Built from the three small bias angles with the diagonal carried to
/// second order.
pub static ICRS_TO_J2000: Lazy<Matrix3<f64>> = Lazy::new(|| {
    let xi0 = XI0 * ASEC2RAD;
    let eta0 = ETA0 * ASEC2RAD;
    let da0 = DA0 * ASEC2RAD;

    let yx = -da0;
    let zx = xi0;
    let xy = da0;
    let zy = eta0;
    let xz = -xi0;
    let yz = -eta0;

    let xx = 1.0 - 0.5 * (yx * yx + zx * zx);
    let yy = 1.0 - 0.5 * (yx * yx + zy * zy);
    let zz = 1.0 - 0.5 * (zy * zy + zx * zx);

    #[rustfmt::skip]
    let b = Matrix3::new(
        xx, xy, xz,
        yx, yy, yz,
        zx, zy, zz,
    );
    b
});

/// Active rotation by `theta` radians about the x axis
pub fn rot_x(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, c,   -s,
        0.0, s,   c,
    );
    m
}

/// Active rotation by `theta` radians about the y axis
pub fn rot_y(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
        c,   0.0, s,
        0.0, 1.0, 0.0,
        -s,  0.0, c,
    );
    m
}

/// Active rotation by `theta` radians about the z axis
pub fn rot_z(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
        c,   -s,  0.0,
        s,   c,   0.0,
        0.0, 0.0, 1.0,
    );
    m
}
