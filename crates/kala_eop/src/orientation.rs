//! Earth orientation at one instant and the rotations it defines.
//!
//! ```text
//! [ITRS] = W · R3(ERA) · Q · [GCRS]
//! W = R1(−y) · R2(−x) · R3(s′),   s′ = −47 µas · t
//! ```
//!
//! Source: IERS Conventions 2010, Eqs. 5.1, 5.3 and 5.13.

use std::sync::{Arc, OnceLock};

use kala_frames::{PrecessionModel, Rotation, TidalArguments};
use kala_time::sidereal::ARCSEC_TO_RAD;
use kala_time::{Instant, earth_rotation_angle, ut1_days_since_j2000};

use crate::error::EopError;
use crate::row::{PolarMotion, PrecessionCorrection};
use crate::table::EopValues;

const TIO_LOCATOR_RATE_ARCSEC: f64 = -47e-6;
const MAS_TO_RAD: f64 = ARCSEC_TO_RAD * 1e-3;

/// Immutable orientation value produced by
/// [`EarthOrientationTable::get_orientation`](crate::EarthOrientationTable::get_orientation).
#[derive(Debug)]
pub struct EarthOrientation {
    tai: Instant,
    ut1: Instant,
    tdb: Instant,
    values: EopValues,
    args: Arc<TidalArguments>,
    model: Arc<dyn PrecessionModel>,
    terrestrial_to_celestial: OnceLock<Rotation>,
}

impl EarthOrientation {
    pub(crate) fn new(
        tai: Instant,
        ut1: Instant,
        tdb: Instant,
        values: EopValues,
        args: Arc<TidalArguments>,
        model: Arc<dyn PrecessionModel>,
    ) -> Self {
        Self {
            tai,
            ut1,
            tdb,
            values,
            args,
            model,
            terrestrial_to_celestial: OnceLock::new(),
        }
    }

    pub fn tai(&self) -> Instant {
        self.tai
    }

    pub fn ut1(&self) -> Instant {
        self.ut1
    }

    pub fn tdb(&self) -> Instant {
        self.tdb
    }

    /// UT1 − TAI in seconds.
    pub fn ut1_minus_tai(&self) -> f64 {
        self.values.ut1_minus_tai
    }

    pub fn ut1_error(&self) -> f64 {
        self.values.ut1_err
    }

    /// Pole coordinates in arcseconds.
    pub fn pole(&self) -> PolarMotion {
        self.values.polar_motion
    }

    /// dX, dY in milliarcseconds.
    pub fn precession_correction(&self) -> PrecessionCorrection {
        self.values.precession_correction
    }

    pub fn is_interpolated(&self) -> bool {
        self.values.interpolated
    }

    pub fn tidal_arguments(&self) -> &Arc<TidalArguments> {
        &self.args
    }

    pub fn precession_model(&self) -> &Arc<dyn PrecessionModel> {
        &self.model
    }

    /// Earth Rotation Angle in radians.
    pub fn earth_rotation_angle(&self) -> f64 {
        self.args
            .earth_rotation_angle()
            .unwrap_or_else(|| earth_rotation_angle(ut1_days_since_j2000(&self.ut1)))
    }

    /// TIRS → ITRS.
    pub fn polar_motion(&self) -> Rotation {
        let pm = self.values.polar_motion;
        let s_prime = TIO_LOCATOR_RATE_ARCSEC * self.args.centuries() * ARCSEC_TO_RAD;
        Rotation::r1(-pm.y * ARCSEC_TO_RAD)
            * Rotation::r2(-pm.x * ARCSEC_TO_RAD)
            * Rotation::r3(s_prime)
    }

    /// CIRS → TIRS.
    pub fn earth_rotation(&self) -> Rotation {
        Rotation::r3(self.earth_rotation_angle())
    }

    /// GCRS → CIRS, with the observed pole offsets applied.
    pub fn precession(&self) -> Result<Rotation, EopError> {
        let c = self.values.precession_correction;
        Ok(self
            .model
            .rotation(&self.args, c.dx * MAS_TO_RAD, c.dy * MAS_TO_RAD)?)
    }

    /// GCRS → ITRS.
    pub fn celestial_to_terrestrial(&self) -> Result<Rotation, EopError> {
        Ok(self.polar_motion() * self.earth_rotation() * self.precession()?)
    }

    /// ITRS → GCRS, computed once.
    pub fn terrestrial_to_celestial(&self) -> Result<Rotation, EopError> {
        if let Some(r) = self.terrestrial_to_celestial.get() {
            return Ok(*r);
        }
        let r = self.celestial_to_terrestrial()?.transpose();
        Ok(*self.terrestrial_to_celestial.get_or_init(|| r))
    }
}
