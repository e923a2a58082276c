//! Celestial Intermediate Pole coordinates and the precession-nutation matrix.
//!
//! A [`PrecessionModel`] produces the CIP coordinates `X`, `Y` and the CIO
//! locator `s` from the fundamental arguments. The matrix taking GCRS
//! vectors to the Celestial Intermediate Reference System is
//!
//! ```text
//! R3(−s) · | 1 − aX²   −aXY      −X          |
//!          | −aXY      1 − aY²   −Y          |
//!          | X         Y         1 − a(X²+Y²) |,   a = 1 / (1 + √(1 − X² − Y²))
//! ```
//!
//! Source: IERS Conventions 2010, Eqs. 5.6 and 5.10.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::FrameError;
use crate::harmonic::PrecessionExpansion;
use crate::iers_tables;
use crate::rotation::Rotation;
use crate::tidal::TidalArguments;

/// CIP coordinates and CIO locator, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CipCoordinates {
    pub x: f64,
    pub y: f64,
    pub s: f64,
}

impl CipCoordinates {
    /// Coordinates with observed offsets `dx`, `dy` (radians) added.
    pub fn corrected(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            s: self.s,
        }
    }

    /// GCRS → CIRS rotation.
    pub fn rotation(&self) -> Rotation {
        cip_rotation(self.x, self.y, self.s)
    }
}

/// GCRS → CIRS rotation from `X`, `Y` and `s`.
pub fn cip_rotation(x: f64, y: f64, s: f64) -> Rotation {
    let r2 = x * x + y * y;
    let a = 1.0 / (1.0 + (1.0 - r2).sqrt());
    let p = Rotation::from_rows([
        [1.0 - a * x * x, -a * x * y, -x],
        [-a * x * y, 1.0 - a * y * y, -y],
        [x, y, 1.0 - a * r2],
    ]);
    Rotation::r3(-s) * p
}

/// A source of CIP coordinates.
pub trait PrecessionModel: Send + Sync + fmt::Debug {
    /// Short model name for logs.
    fn name(&self) -> &'static str;

    fn cip(&self, args: &TidalArguments) -> Result<CipCoordinates, FrameError>;

    /// GCRS → CIRS rotation with observed offsets `dx`, `dy` in radians.
    fn rotation(&self, args: &TidalArguments, dx: f64, dy: f64) -> Result<Rotation, FrameError> {
        Ok(self.cip(args)?.corrected(dx, dy).rotation())
    }
}

/// The full IAU 2006/2000A series for `X`, `Y` and `s + XY/2`.
#[derive(Debug, Clone)]
pub struct Iau2006Series {
    x: PrecessionExpansion,
    y: PrecessionExpansion,
    s_plus_xy_half: PrecessionExpansion,
}

impl Iau2006Series {
    pub fn new(
        x: PrecessionExpansion,
        y: PrecessionExpansion,
        s_plus_xy_half: PrecessionExpansion,
    ) -> Self {
        Self {
            x,
            y,
            s_plus_xy_half,
        }
    }

    /// Load IERS Conventions Tables 5.2a (X), 5.2b (Y) and 5.2d (s + XY/2).
    pub fn load(x_path: &Path, y_path: &Path, s_path: &Path) -> Result<Self, FrameError> {
        let series = Self::new(
            iers_tables::load_series(x_path)?,
            iers_tables::load_series(y_path)?,
            iers_tables::load_series(s_path)?,
        );
        debug!(
            x_terms = series.x.len(),
            y_terms = series.y.len(),
            s_terms = series.s_plus_xy_half.len(),
            "loaded IAU 2006 series"
        );
        Ok(series)
    }

    pub fn calculate_x(&self, args: &TidalArguments) -> Result<f64, FrameError> {
        self.x.evaluate(args)
    }

    pub fn calculate_y(&self, args: &TidalArguments) -> Result<f64, FrameError> {
        self.y.evaluate(args)
    }

    /// CIO locator `s` given the CIP coordinates at the same instant.
    pub fn calculate_s(&self, args: &TidalArguments, x: f64, y: f64) -> Result<f64, FrameError> {
        Ok(self.s_plus_xy_half.evaluate(args)? - x * y / 2.0)
    }
}

impl PrecessionModel for Iau2006Series {
    fn name(&self) -> &'static str {
        "iau2006-series"
    }

    fn cip(&self, args: &TidalArguments) -> Result<CipCoordinates, FrameError> {
        let x = self.calculate_x(args)?;
        let y = self.calculate_y(args)?;
        let s = self.calculate_s(args, x, y)?;
        Ok(CipCoordinates { x, y, s })
    }
}

#[cfg(test)]
mod tests {
    use kala_time::{Instant, TimeSystemId};

    use super::*;
    use crate::harmonic::HarmonicTerm;
    use crate::tidal::{ARGUMENT_COUNT, OMEGA};

    /// GCRS → CIRS as R3(−(E+s)) · R2(d) · R3(E).
    fn spherical_form(x: f64, y: f64, s: f64) -> Rotation {
        let r2 = x * x + y * y;
        let e = if r2 > 0.0 { y.atan2(x) } else { 0.0 };
        let d = (r2 / (1.0 - r2)).sqrt().atan();
        Rotation::r3(-(e + s)) * Rotation::r2(d) * Rotation::r3(e)
    }

    #[test]
    fn matrix_agrees_with_spherical_form() {
        for &(x, y, s) in &[
            (4.853_950_847e-4, 4.050_595_686e-5, -1.425_838_163e-8),
            (-2.1e-3, 7.5e-4, 3.0e-8),
            (0.0, 0.0, 1e-7),
        ] {
            let a = cip_rotation(x, y, s);
            let b = spherical_form(x, y, s);
            assert!(a.max_abs_diff(&b) < 1e-14, "({x}, {y}, {s})");
        }
    }

    #[test]
    fn rotation_is_orthonormal() {
        let r = cip_rotation(1e-3, -5e-4, 2e-8);
        assert!((r * r.transpose()).max_abs_diff(&Rotation::IDENTITY) < 1e-15);
    }

    #[test]
    fn s_removes_half_xy() {
        let poly = |c: f64| PrecessionExpansion::new(vec![c], vec![], 1.0).unwrap();
        let mut w = [0; ARGUMENT_COUNT];
        w[OMEGA] = 1;
        let y = PrecessionExpansion::new(vec![0.0], vec![vec![HarmonicTerm::new(w, 1e-4, 0.0)]], 1.0)
            .unwrap();
        let model = Iau2006Series::new(poly(2e-3), y, poly(1e-8));
        let args = TidalArguments::new(Instant::from_jd(TimeSystemId::TDB, 2_455_000.5));
        let cip = model.cip(&args).unwrap();
        assert_eq!(cip.x, 2e-3);
        assert!((cip.y - 1e-4 * args.angles()[OMEGA].sin()).abs() < 1e-18);
        assert!((cip.s - (1e-8 - cip.x * cip.y / 2.0)).abs() < 1e-22);
    }

    #[test]
    fn corrections_shift_pole() {
        let c = CipCoordinates {
            x: 1e-4,
            y: 2e-4,
            s: 0.0,
        };
        let shifted = c.corrected(1e-9, -1e-9);
        assert_eq!(shifted.x, 1e-4 + 1e-9);
        assert_eq!(shifted.y, 2e-4 - 1e-9);
    }
}
