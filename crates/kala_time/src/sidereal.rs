//! Earth Rotation Angle and Greenwich Mean Sidereal Time.
//!
//! Sources:
//! - ERA: IERS Conventions 2010, Eq. 5.15.
//! - GMST polynomial: IERS Conventions 2010, Eq. 5.32 (Capitaine et al. 2003).

use std::f64::consts::{PI, TAU};

use crate::instant::Instant;
use crate::julian::{DAYS_PER_CENTURY, J2000_MILLIS, MILLIS_PER_DAY};

/// Arcseconds to radians: 1″ = π / (180 × 3600).
pub const ARCSEC_TO_RAD: f64 = PI / (180.0 * 3600.0);

/// UT1 days since J2000.0 of a UT1 reading.
pub fn ut1_days_since_j2000(ut1: &Instant) -> f64 {
    let ms = ut1.millis() - J2000_MILLIS;
    let days = ms.div_euclid(MILLIS_PER_DAY);
    let rem = ms.rem_euclid(MILLIS_PER_DAY) as f64 + f64::from(ut1.nanos()) * 1e-6;
    days as f64 + rem / MILLIS_PER_DAY as f64
}

/// Earth Rotation Angle for `du` UT1 days since J2000.0.
///
/// θ = 2π × (0.7790572732640 + 1.00273781191135448 × Du), in `[0, 2π)`.
/// The whole-day part of `du` is split off to keep precision.
pub fn earth_rotation_angle(du: f64) -> f64 {
    let turns = du.fract() + 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * du;
    (TAU * turns).rem_euclid(TAU)
}

/// Greenwich Mean Sidereal Time in `[0, 2π)`.
///
/// `du` is UT1 days since J2000.0, `t_tt` TT Julian centuries since J2000.0.
///
/// GMST = ERA + 0.014506″ + 4612.156534″·t + 1.3915817″·t²
///        − 0.00000044″·t³ − 0.000029956″·t⁴ − 0.0000000368″·t⁵
pub fn gmst(du: f64, t_tt: f64) -> f64 {
    let era = earth_rotation_angle(du);
    let poly_arcsec = 0.014_506
        + t_tt
            * (4_612.156_534
                + t_tt
                    * (1.391_581_7
                        + t_tt * (-0.000_000_44 + t_tt * (-0.000_029_956 + t_tt * -0.000_000_036_8))));
    (era + poly_arcsec * ARCSEC_TO_RAD).rem_euclid(TAU)
}

/// GMST using UT1 for the polynomial argument as well.
pub fn gmst_ut1(du: f64) -> f64 {
    gmst(du, du / DAYS_PER_CENTURY)
}
