//! Light-travel time, gravitational deflection and aberration
//!
//! The functions here operate on series of vectors, one per instant, in AU
//! and AU/day relative to the solar system barycenter or to the observer as
//! noted.

use crate::constants::{AU_M, C, C_AUDAY, GS};
use crate::errors::{Result, SkypathError};
use crate::planetlib::{Body, Ephemeris};
use log::{trace, warn};
use nalgebra::Vector3;

/// Bodies whose deflection is applied, most massive effect first
pub const DEFLECTORS: [Body; 7] = [
    Body::Sun,
    Body::Jupiter,
    Body::Saturn,
    Body::Moon,
    Body::Venus,
    Body::Uranus,
    Body::Neptune,
];

/// Maximum passes of the light-time iteration
pub const LIGHT_TIME_ITERATIONS: usize = 10;

/// Light-time change, in days, below which the iteration has settled
pub const LIGHT_TIME_TOLERANCE: f64 = 1e-12;

/// Cosine above which a deflector and target are treated as aligned
const ALIGNED_COSINE: f64 = 0.999_999_999_99;

/// Solve for the light-travel time from a moving target to an observer
///
/// `target` returns barycentric positions and velocities at the TDB Julian
/// dates it is given. Returns the observer-relative position and velocity
/// of the target and the light time in days, one per observer element.
pub fn correct_for_light_travel_time<F>(
    observer_position: &[Vector3<f64>],
    observer_velocity: &[Vector3<f64>],
    tdb: &[f64],
    mut target: F,
) -> Result<(Vec<Vector3<f64>>, Vec<Vector3<f64>>, Vec<f64>)>
where
    F: FnMut(&[f64]) -> Result<(Vec<Vector3<f64>>, Vec<Vector3<f64>>)>,
{
    let n = observer_position.len();
    let (mut position, mut velocity) = target(tdb)?;
    check_len(n, position.len())?;

    let mut distance: Vec<f64> = relative_norms(&position, observer_position);
    let mut previous = vec![0.0; n];
    let mut max_delta = f64::INFINITY;

    for iteration in 0..LIGHT_TIME_ITERATIONS {
        let light_time: Vec<f64> = distance.iter().map(|d| d / C_AUDAY).collect();
        max_delta = light_time
            .iter()
            .zip(&previous)
            .map(|(lt, lt0)| (lt - lt0).abs())
            .fold(0.0, f64::max);

        trace!(
            "light-time pass {}: largest change {:e} days",
            iteration,
            max_delta
        );

        if max_delta < LIGHT_TIME_TOLERANCE {
            let relative_position = position
                .iter()
                .zip(observer_position)
                .map(|(p, o)| p - o)
                .collect();
            let relative_velocity = velocity
                .iter()
                .zip(observer_velocity)
                .map(|(v, o)| v - o)
                .collect();
            return Ok((relative_position, relative_velocity, light_time));
        }

        let emitted: Vec<f64> = tdb.iter().zip(&light_time).map(|(t, lt)| t - lt).collect();
        let (p, v) = target(&emitted)?;
        check_len(n, p.len())?;
        position = p;
        velocity = v;
        distance = relative_norms(&position, observer_position);
        previous = light_time;
    }

    warn!(
        "light-time iteration gave up after {} passes (change {:e} days)",
        LIGHT_TIME_ITERATIONS, max_delta
    );
    Err(SkypathError::Convergence {
        iterations: LIGHT_TIME_ITERATIONS,
        max_delta_days: max_delta,
    })
}

fn relative_norms(a: &[Vector3<f64>], b: &[Vector3<f64>]) -> Vec<f64> {
    a.iter().zip(b).map(|(p, o)| (p - o).norm()).collect()
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SkypathError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Difference in light time, in days, between an observer and the point
/// where `position` projects onto the line of sight toward `observer_position`
pub fn light_time_difference(position: &Vector3<f64>, observer_position: &Vector3<f64>) -> f64 {
    let distance = position.norm();
    let u = position / distance;
    u.dot(observer_position) / C_AUDAY
}

/// Bend `position` for the gravity of one deflector
///
/// `position` is the target relative to the observer, `observer` and
/// `deflector` are barycentric; all in AU.
pub fn deflect(
    position: &mut Vector3<f64>,
    observer: &Vector3<f64>,
    deflector: &Vector3<f64>,
    reciprocal_mass: f64,
) {
    let pq = observer + *position - deflector;
    let pe = observer - deflector;

    let pmag = position.norm();
    let qmag = pq.norm();
    let emag = pe.norm();

    // An observer at the deflector's center sees no bending
    if emag == 0.0 {
        return;
    }

    let unit = |v: Vector3<f64>, mag: f64| if mag != 0.0 { v / mag } else { v };
    let phat = unit(*position, pmag);
    let qhat = unit(pq, qmag);
    let ehat = unit(pe, emag);

    let pdotq = phat.dot(&qhat);
    let qdote = qhat.dot(&ehat);
    let edotp = ehat.dot(&phat);

    // Light arriving along the line to the deflector's center is left alone
    if edotp.abs() > ALIGNED_COSINE {
        return;
    }

    let fac1 = 2.0 * GS / (C * C * emag * AU_M * reciprocal_mass);
    let fac2 = 1.0 + qdote;

    *position += (ehat * pdotq - qhat * edotp) * (fac1 / fac2 * pmag);
}

/// Apply gravitational deflection by the first `count` of [`DEFLECTORS`]
///
/// Each deflector is positioned at the moment the incoming ray passed
/// closest to it. Earth's deflection is added to the elements whose
/// `include_earth` flag is set.
pub fn add_deflection(
    position: &mut [Vector3<f64>],
    observer: &[Vector3<f64>],
    ephemeris: &Ephemeris,
    tdb: &[f64],
    include_earth: &[bool],
    count: usize,
) -> Result<()> {
    let n = position.len();
    check_len(n, observer.len())?;
    check_len(n, tdb.len())?;
    check_len(n, include_earth.len())?;

    let light_time: Vec<f64> = position.iter().map(|p| p.norm() / C_AUDAY).collect();

    for &body in DEFLECTORS.iter().take(count) {
        let planet = ephemeris.planet(body);
        let bposition = planet.position_au(tdb)?;

        let tclose: Vec<f64> = (0..n)
            .map(|i| {
                let gpv = bposition[i] - observer[i];
                let dlt = light_time_difference(&position[i], &gpv);
                if light_time[i] < dlt {
                    tdb[i] - light_time[i]
                } else if dlt > 0.0 {
                    tdb[i] - dlt
                } else {
                    tdb[i]
                }
            })
            .collect();

        let bposition = planet.position_au(&tclose)?;
        for i in 0..n {
            deflect(&mut position[i], &observer[i], &bposition[i], body.reciprocal_mass());
        }
    }

    if include_earth.iter().any(|&b| b) {
        let earth = ephemeris.planet(Body::Earth);
        let bposition = earth.position_au(tdb)?;
        for i in (0..n).filter(|&i| include_earth[i]) {
            deflect(&mut position[i], &observer[i], &bposition[i], Body::Earth.reciprocal_mass());
        }
    }

    Ok(())
}

/// Correct positions for the observer's velocity (stellar aberration)
///
/// Uses the relativistic composition of the light direction with the
/// observer velocity. Elements where the observer is at rest are unchanged.
pub fn add_aberration(position: &mut [Vector3<f64>], velocity: &[Vector3<f64>], light_time: &[f64]) {
    for ((p, v), &lt) in position.iter_mut().zip(velocity).zip(light_time) {
        let vemag = v.norm();
        if vemag == 0.0 {
            continue;
        }

        let p1mag = lt * C_AUDAY;
        let beta = vemag / C_AUDAY;
        let cosd = p.dot(v) / (p1mag * vemag);
        let gammai = (1.0 - beta * beta).sqrt();
        let pp = beta * cosd;
        let q = (1.0 + pp / (1.0 + gammai)) * p1mag;
        let r = 1.0 + pp;

        *p = (*p * gammai + v * (q / C_AUDAY)) / r;
    }
}
