//! One tabulated epoch of Earth-orientation parameters.

use kala_time::Instant;

/// Pole coordinates in arcseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PolarMotion {
    pub x: f64,
    pub y: f64,
    pub x_err: f64,
    pub y_err: f64,
}

impl PolarMotion {
    pub fn new(x: f64, y: f64, x_err: f64, y_err: f64) -> Self {
        Self { x, y, x_err, y_err }
    }
}

/// Celestial pole offsets dX, dY in milliarcseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrecessionCorrection {
    pub dx: f64,
    pub dy: f64,
    pub dx_err: f64,
    pub dy_err: f64,
}

impl PrecessionCorrection {
    pub fn new(dx: f64, dy: f64, dx_err: f64, dy_err: f64) -> Self {
        Self {
            dx,
            dy,
            dx_err,
            dy_err,
        }
    }
}

/// Measured parameters at one TAI instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthOrientationRow {
    /// Epoch of the row, read in TAI.
    pub time: Instant,
    pub polar_motion: PolarMotion,
    /// UT1 − UTC in seconds.
    pub ut1_minus_utc: f64,
    pub ut1_minus_utc_err: f64,
    pub precession_correction: PrecessionCorrection,
}

impl EarthOrientationRow {
    pub fn new(time: Instant, polar_motion: PolarMotion, ut1_minus_utc: f64, ut1_minus_utc_err: f64) -> Self {
        Self {
            time,
            polar_motion,
            ut1_minus_utc,
            ut1_minus_utc_err,
            precession_correction: PrecessionCorrection::default(),
        }
    }

    pub fn with_precession_correction(mut self, correction: PrecessionCorrection) -> Self {
        self.precession_correction = correction;
        self
    }
}
