//! Physical and calendrical constants shared across the pipeline

use std::f64::consts::PI;

/// 2π, one full turn in radians
pub const TAU: f64 = 2.0 * PI;

// Lengths and speeds (IAU 2012 Resolution B2 for the AU)
pub const AU_M: f64 = 149_597_870_700.0;
pub const AU_KM: f64 = AU_M / 1_000.0;
/// Speed of light, m/s
pub const C: f64 = 299_792_458.0;
/// Speed of light, AU/day
pub const C_AUDAY: f64 = C * DAY_S / AU_M;

// Time
pub const DAY_S: f64 = 86_400.0;
/// Julian date of 2000 January 1.5 TT
pub const J2000: f64 = 2_451_545.0;
pub const JULIAN_CENTURY: f64 = 36_525.0;
/// TT − TAI, seconds
pub const TT_MINUS_TAI_S: f64 = 32.184;
/// TT − TAI, days
pub const TT_MINUS_TAI: f64 = TT_MINUS_TAI_S / DAY_S;

// Angle conversions
pub const ASEC360: f64 = 1_296_000.0;
pub const ASEC2RAD: f64 = 4.848_136_811_095_36e-6;
pub const DEG2RAD: f64 = PI / 180.0;
pub const RAD2DEG: f64 = 180.0 / PI;

/// Sun's gravitational parameter GM, m³/s²
pub const GS: f64 = 1.327_124_400_179_87e+20;

// Earth figure and rotation (IERS 2010)
/// Equatorial radius, meters
pub const EARTH_RADIUS: f64 = 6_378_136.6;
pub const EARTH_RADIUS_KM: f64 = EARTH_RADIUS / 1_000.0;
pub const IERS_2010_INVERSE_EARTH_FLATTENING: f64 = 298.25642;
/// Nominal rotation rate, rad/s
pub const EARTH_ANGVEL: f64 = 7.292_115_0e-5;

/// Earth mass over Moon mass, for sources that do not supply their own (DE405)
pub const EARTH_MOON_MASS_RATIO: f64 = 81.300_56;

// Julian day numbers of the first Gregorian day
/// 1582 October 15, as adopted in Rome
pub const GREGORIAN_START: i32 = 2_299_161;
/// 1752 September 14, as adopted in Britain
pub const GREGORIAN_START_ENGLAND: i32 = 2_361_222;
