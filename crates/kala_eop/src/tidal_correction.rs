//! Diurnal and semidiurnal ocean-tide corrections to polar motion and UT1.
//!
//! Coefficient rows follow the shape of IERS Conventions 2010 Tables 8.2
//! and 8.3:
//!
//! ```text
//! γ  l  l'  F  D  Ω  [doodson period]  x_sin x_cos  y_sin y_cos  ut1_sin ut1_cos
//! ```
//!
//! Polar-motion amplitudes are in microarcseconds and UT1 amplitudes in
//! microseconds. The argument is `γ·(GMST + π) + l·l + … + Ω·Ω`, so every
//! evaluation needs arguments built with a UT1 companion.

use std::path::Path;

use kala_frames::{DiurnalExpansion, HarmonicTerm, TidalArguments, Weights};
use kala_frames::tidal::{ARGUMENT_COUNT, D, F, GAMMA, L, L_PRIME, OMEGA};
use tracing::{debug, warn};

use crate::error::EopError;

const ROW_SLOTS: [usize; 6] = [GAMMA, L, L_PRIME, F, D, OMEGA];

/// Correction values at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TidalCorrection {
    /// Pole x offset in microarcseconds.
    pub x: f64,
    /// Pole y offset in microarcseconds.
    pub y: f64,
    /// UT1 offset in microseconds.
    pub ut1: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidalCorrectionModel {
    x: DiurnalExpansion,
    y: DiurnalExpansion,
    ut1: DiurnalExpansion,
}

impl TidalCorrectionModel {
    pub fn new(x: DiurnalExpansion, y: DiurnalExpansion, ut1: DiurnalExpansion) -> Self {
        Self { x, y, ut1 }
    }

    pub fn load(path: &Path) -> Result<Self, EopError> {
        let content = std::fs::read_to_string(path)?;
        let model = Self::parse(&content)?;
        debug!(path = %path.display(), terms = model.len(), "loaded tidal corrections");
        Ok(model)
    }

    pub fn parse(content: &str) -> Result<Self, EopError> {
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut ut1 = Vec::new();

        for (lineno, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields[0].parse::<i8>().is_err() {
                continue;
            }
            let Some((weights, amplitudes)) = parse_row(&fields) else {
                warn!(line = lineno + 1, "skipping malformed tidal correction row");
                continue;
            };
            x.push(HarmonicTerm::new(weights, amplitudes[0], amplitudes[1]));
            y.push(HarmonicTerm::new(weights, amplitudes[2], amplitudes[3]));
            ut1.push(HarmonicTerm::new(weights, amplitudes[4], amplitudes[5]));
        }

        if x.is_empty() {
            return Err(EopError::TidalParse("no coefficient rows found".into()));
        }
        Ok(Self::new(
            DiurnalExpansion::new(x),
            DiurnalExpansion::new(y),
            DiurnalExpansion::new(ut1),
        ))
    }

    /// Number of tidal constituents.
    pub fn len(&self) -> usize {
        self.x.terms().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn evaluate(&self, args: &TidalArguments) -> Result<TidalCorrection, EopError> {
        Ok(TidalCorrection {
            x: self.x.evaluate(args)?,
            y: self.y.evaluate(args)?,
            ut1: self.ut1.evaluate(args)?,
        })
    }
}

fn parse_row(fields: &[&str]) -> Option<(Weights, [f64; 6])> {
    // Six multipliers, optional Doodson number and period, six amplitudes.
    let amplitude_start = match fields.len() {
        12 => 6,
        14 => 8,
        _ => return None,
    };
    let mut weights: Weights = [0; ARGUMENT_COUNT];
    for (slot, text) in ROW_SLOTS.iter().zip(&fields[..6]) {
        weights[*slot] = text.parse().ok()?;
    }
    let mut amplitudes = [0.0; 6];
    for (a, text) in amplitudes.iter_mut().zip(&fields[amplitude_start..]) {
        *a = text.parse().ok()?;
    }
    Some((weights, amplitudes))
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use kala_frames::FrameError;
    use kala_time::{Instant, TimeSystemId};

    use super::*;

    const SAMPLE: &str = "\
# gamma l l' F D Omega  Doodson  period   x_sin  x_cos  y_sin  y_cos  ut1_sin ut1_cos
  1  -1  0  -2  -2  -2   117.655  1.2113611   -0.05   0.94  -0.94  -0.05   0.396  -0.078
  2   0  0   0   0   0   -0.03   0.00   0.00  -0.03   0.00   0.00
  this line is not data
  1   0  0   0   0   x   1.0 2.0 3.0 4.0 5.0 6.0
";

    #[test]
    fn parses_both_row_shapes() {
        let model = TidalCorrectionModel::parse(SAMPLE).unwrap();
        assert_eq!(model.len(), 2);
        let first = &model.x.terms()[0];
        assert_eq!(first.weights()[GAMMA], 1);
        assert_eq!(first.weights()[L], -1);
        assert_eq!(first.weights()[OMEGA], -2);
        assert_eq!(first.sin_amplitude(), -0.05);
        assert_eq!(model.ut1.terms()[0].cos_amplitude(), -0.078);
        assert_eq!(model.x.terms()[1].weights()[GAMMA], 2);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            TidalCorrectionModel::parse("# nothing\n"),
            Err(EopError::TidalParse(_))
        ));
    }

    #[test]
    fn needs_rotation_phase() {
        let model = TidalCorrectionModel::parse(SAMPLE).unwrap();
        let tdb = Instant::from_jd(TimeSystemId::TDB, 2_458_000.5);
        let without = TidalArguments::new(tdb);
        assert_eq!(
            model.evaluate(&without),
            Err(EopError::Frame(FrameError::MissingRotationPhase))
        );

        let with = TidalArguments::with_ut1(tdb, Instant::from_jd(TimeSystemId::TAI, 2_458_000.5));
        let c = model.evaluate(&with).unwrap();
        let gamma = with.angle(GAMMA).unwrap();
        assert!(gamma > -PI && gamma <= PI);
        let semidiurnal = 2.0 * gamma;
        assert!((c.x - (-0.03 * semidiurnal.sin() + model.x.terms()[0].evaluate(&with).unwrap())).abs() < 1e-12);
    }
}
