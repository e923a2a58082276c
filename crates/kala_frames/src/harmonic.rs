//! Harmonic terms and the two series shapes built from them.
//!
//! A [`DiurnalExpansion`] is a plain sum of phased harmonics. A
//! [`PrecessionExpansion`] is a polynomial in TDB centuries whose every
//! coefficient may carry its own harmonic series:
//!
//! ```text
//! value = scale · Σₖ tᵏ · (Pₖ + Σⱼ Sₖⱼ sin θₖⱼ + Cₖⱼ cos θₖⱼ)
//! ```

use crate::error::FrameError;
use crate::tidal::{GAMMA, TidalArguments, Weights};

/// Micro-arcseconds to radians.
pub const MICRO_ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0 * 1e6);

/// One harmonic: `S · sin(θ + φs) + C · cos(θ + φc)` with `θ = Σ wᵢ aᵢ`.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicTerm {
    weights: Weights,
    sin_amplitude: f64,
    cos_amplitude: f64,
    // (sin φ, cos φ)
    sin_phase: (f64, f64),
    cos_phase: (f64, f64),
}

impl HarmonicTerm {
    pub fn new(weights: Weights, sin_amplitude: f64, cos_amplitude: f64) -> Self {
        Self::with_phases(weights, sin_amplitude, cos_amplitude, 0.0, 0.0)
    }

    /// Term with phase offsets (radians) on the sine and cosine parts.
    pub fn with_phases(
        weights: Weights,
        sin_amplitude: f64,
        cos_amplitude: f64,
        sin_phase: f64,
        cos_phase: f64,
    ) -> Self {
        Self {
            weights,
            sin_amplitude,
            cos_amplitude,
            sin_phase: sin_phase.sin_cos(),
            cos_phase: cos_phase.sin_cos(),
        }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn sin_amplitude(&self) -> f64 {
        self.sin_amplitude
    }

    pub fn cos_amplitude(&self) -> f64 {
        self.cos_amplitude
    }

    pub fn uses_rotation_phase(&self) -> bool {
        self.weights[GAMMA] != 0
    }

    pub fn evaluate(&self, args: &TidalArguments) -> Result<f64, FrameError> {
        let (s, c) = args.weighted_sum(&self.weights)?;
        let (sps, cps) = self.sin_phase;
        let (spc, cpc) = self.cos_phase;
        Ok(self.sin_amplitude * (s * cps + c * sps) + self.cos_amplitude * (c * cpc - s * spc))
    }
}

/// Sum of phased harmonics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiurnalExpansion {
    terms: Vec<HarmonicTerm>,
}

impl DiurnalExpansion {
    pub fn new(terms: Vec<HarmonicTerm>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[HarmonicTerm] {
        &self.terms
    }

    pub fn evaluate(&self, args: &TidalArguments) -> Result<f64, FrameError> {
        self.terms.iter().map(|term| term.evaluate(args)).sum()
    }
}

/// Polynomial-times-harmonic series in TDB Julian centuries.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecessionExpansion {
    polynomial: Vec<f64>,
    terms_by_order: Vec<Vec<HarmonicTerm>>,
    scale: f64,
}

impl PrecessionExpansion {
    /// `terms_by_order[k]` multiplies `tᵏ`; it may be shorter than
    /// `polynomial` but never longer.
    pub fn new(
        polynomial: Vec<f64>,
        terms_by_order: Vec<Vec<HarmonicTerm>>,
        scale: f64,
    ) -> Result<Self, FrameError> {
        if terms_by_order.len() > polynomial.len() {
            return Err(FrameError::InvalidExpansion(format!(
                "{} harmonic orders but only {} polynomial coefficients",
                terms_by_order.len(),
                polynomial.len()
            )));
        }
        Ok(Self {
            polynomial,
            terms_by_order,
            scale,
        })
    }

    /// Construction for built-in tables whose shape is known to be valid.
    pub(crate) fn validated(
        polynomial: Vec<f64>,
        terms_by_order: Vec<Vec<HarmonicTerm>>,
        scale: f64,
    ) -> Self {
        debug_assert!(terms_by_order.len() <= polynomial.len());
        Self {
            polynomial,
            terms_by_order,
            scale,
        }
    }

    /// Expansion with amplitudes in micro-arcseconds and output in radians.
    pub fn in_micro_arcsec(
        polynomial: Vec<f64>,
        terms_by_order: Vec<Vec<HarmonicTerm>>,
    ) -> Result<Self, FrameError> {
        Self::new(polynomial, terms_by_order, MICRO_ARCSEC_TO_RAD)
    }

    pub fn polynomial(&self) -> &[f64] {
        &self.polynomial
    }

    pub fn terms_by_order(&self) -> &[Vec<HarmonicTerm>] {
        &self.terms_by_order
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Total number of harmonic terms.
    pub fn len(&self) -> usize {
        self.terms_by_order.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn evaluate(&self, args: &TidalArguments) -> Result<f64, FrameError> {
        let t = args.centuries();
        let mut acc = 0.0;
        for (order, &coefficient) in self.polynomial.iter().enumerate().rev() {
            let mut value = coefficient;
            if let Some(terms) = self.terms_by_order.get(order) {
                for term in terms {
                    value += term.evaluate(args)?;
                }
            }
            acc = acc * t + value;
        }
        Ok(acc * self.scale)
    }
}
