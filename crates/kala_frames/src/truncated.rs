//! IAU 2006 precession with the truncated IAU 2000B nutation.
//!
//! Needs no coefficient files. The bias-precession-nutation matrix is built
//! from the Fukushima-Williams angles (IAU 2006) with nutation in longitude
//! and obliquity from the 77-term IAU 2000B series; `X` and `Y` are read off
//! its bottom row. The CIO locator uses the polynomial and the leading
//! periodic terms of Table 5.2d. Agreement with the full series is at the
//! milliarcsecond level.
//!
//! Sources: IERS Conventions 2010, Eqs. 5.39-5.40 and Tables 5.2d, 5.3b;
//! McCarthy & Luzum 2003 (IAU 2000B).

use crate::error::FrameError;
use crate::harmonic::{HarmonicTerm, MICRO_ARCSEC_TO_RAD, PrecessionExpansion};
use crate::precession::{CipCoordinates, PrecessionModel};
use crate::rotation::Rotation;
use crate::tidal::{ARGUMENT_COUNT, D, F, L_PRIME, OMEGA, TidalArguments, Weights};

const ARCSEC_TO_RAD: f64 = MICRO_ARCSEC_TO_RAD * 1e6;

/// IAU 2000B lunisolar terms: multipliers of `[l, l', F, D, Ω]`, then
/// `[S, S', C, C']` in units of 0.1 µas (Δψ = (S + S't) sin θ,
/// Δε = (C + C't) cos θ).
#[rustfmt::skip]
const NUTATION_2000B: [([i8; 5], [i64; 4]); 77] = [
    ([ 0,  0,  0,  0,  1], [-172064161,    -174666,   92052331,       9086]),
    ([ 0,  0,  2, -2,  2], [ -13170906,      -1675,    5730336,      -3015]),
    ([ 0,  0,  2,  0,  2], [  -2276413,       -234,     978459,       -485]),
    ([ 0,  0,  0,  0,  2], [   2074554,        207,    -897492,        470]),
    ([ 0,  1,  0,  0,  0], [   1475877,      -3633,      73871,       -184]),
    ([ 0,  1,  2, -2,  2], [   -516821,       1226,     224386,       -677]),
    ([ 1,  0,  0,  0,  0], [    711159,         73,      -6750,          0]),
    ([ 0,  0,  2,  0,  1], [   -387298,       -367,     200728,         18]),
    ([ 1,  0,  2,  0,  2], [   -301461,        -36,     129025,        -63]),
    ([ 0, -1,  2, -2,  2], [    215829,       -494,     -95929,        299]),
    ([ 0,  0,  2, -2,  1], [    128227,        137,     -68982,         -9]),
    ([-1,  0,  2,  0,  2], [    123457,         11,     -53311,         32]),
    ([-1,  0,  0,  2,  0], [    156994,         10,      -1235,          0]),
    ([ 1,  0,  0,  0,  1], [     63110,         63,     -33228,          0]),
    ([-1,  0,  0,  0,  1], [    -57976,        -63,      31429,          0]),
    ([-1,  0,  2,  2,  2], [    -59641,        -11,      25543,        -11]),
    ([ 1,  0,  2,  0,  1], [    -51613,        -42,      26366,          0]),
    ([-2,  0,  2,  0,  1], [     45893,         50,     -24236,        -10]),
    ([ 0,  0,  0,  2,  0], [     63384,         11,      -1220,          0]),
    ([ 0,  0,  2,  2,  2], [    -38571,         -1,      16452,        -11]),
    ([ 0, -2,  2, -2,  2], [     32481,          0,     -13870,          0]),
    ([-2,  0,  0,  2,  0], [    -47722,          0,        477,          0]),
    ([ 2,  0,  2,  0,  2], [    -31046,         -1,      13238,        -11]),
    ([ 1,  0,  2, -2,  2], [     28593,          0,     -12338,         10]),
    ([-1,  0,  2,  0,  1], [     20441,         21,     -10758,          0]),
    ([ 2,  0,  0,  0,  0], [     29243,          0,       -609,          0]),
    ([ 0,  0,  2,  0,  0], [     25887,          0,       -550,          0]),
    ([ 0,  1,  0,  0,  1], [    -14053,        -25,       8551,         -2]),
    ([-1,  0,  0,  2,  1], [     15164,         10,      -8001,          0]),
    ([ 0,  2,  2, -2,  2], [    -15794,         72,       6850,        -42]),
    ([ 0,  0, -2,  2,  0], [     21783,          0,       -167,          0]),
    ([ 1,  0,  0, -2,  1], [    -12873,        -10,       6953,          0]),
    ([ 0, -1,  0,  0,  1], [    -12654,         11,       6415,          0]),
    ([-1,  0,  2,  2,  1], [    -10204,          0,       5222,          0]),
    ([ 0,  2,  0,  0,  0], [     16707,        -85,        168,         -1]),
    ([ 1,  0,  2,  2,  2], [     -7691,          0,       3268,          0]),
    ([-2,  0,  2,  0,  0], [    -11024,          0,        104,          0]),
    ([ 0,  1,  2,  0,  2], [      7566,        -21,      -3250,          0]),
    ([ 0,  0,  2,  2,  1], [     -6637,        -11,       3353,          0]),
    ([ 0, -1,  2,  0,  2], [     -7141,         21,       3070,          0]),
    ([ 0,  0,  0,  2,  1], [     -6302,        -11,       3272,          0]),
    ([ 1,  0,  2, -2,  1], [      5800,         10,      -3045,          0]),
    ([ 2,  0,  2, -2,  2], [      6443,          0,      -2768,          0]),
    ([-2,  0,  0,  2,  1], [     -5774,        -11,       3041,          0]),
    ([ 2,  0,  2,  0,  1], [     -5350,          0,       2695,          0]),
    ([ 0, -1,  2, -2,  1], [     -4752,        -11,       2719,          0]),
    ([ 0,  0,  0, -2,  1], [     -4940,        -11,       2720,          0]),
    ([-1, -1,  0,  2,  0], [      7350,          0,        -51,          0]),
    ([ 2,  0,  0, -2,  1], [     -4803,        -11,       2556,          0]),
    ([ 1,  0,  0,  2,  0], [     -7677,          0,        462,          0]),
    ([ 0,  1,  2, -2,  1], [      5417,          0,      -2520,          0]),
    ([ 1, -1,  0,  0,  0], [      6624,          0,       -468,          0]),
    ([-2,  0,  2,  0,  2], [     -5433,          0,       2334,          0]),
    ([ 3,  0,  2,  0,  2], [     -4632,          0,       1991,          0]),
    ([ 0, -1,  0,  2,  0], [      6106,          0,       -167,          0]),
    ([ 1, -1,  2,  0,  2], [     -3593,          0,       1556,          0]),
    ([ 0,  0,  0,  1,  0], [     -4766,          0,        270,          0]),
    ([-1, -1,  2,  2,  2], [     -4095,          0,       1793,          0]),
    ([-1,  0,  2,  0,  0], [      4229,          0,       -101,          0]),
    ([ 0, -1,  2,  2,  2], [     -3372,          0,       1487,          0]),
    ([ 2,  0,  0,  0,  1], [     -3353,          0,       1758,          0]),
    ([ 1,  0,  2,  0,  0], [     -3523,          0,        246,          0]),
    ([ 1,  1,  0,  0,  0], [     -3613,          0,        329,          0]),
    ([-1,  0,  2, -2,  1], [      3522,          0,      -1830,          0]),
    ([ 2,  0,  0,  0, -1], [      3312,          0,      -1730,          0]),
    ([ 0,  0, -2,  2,  1], [     -3142,          0,       1704,          0]),
    ([ 0,  1,  0,  0, -1], [     -2927,          0,       1564,          0]),
    ([ 0,  1,  2,  0,  1], [     -2887,          0,       1401,          0]),
    ([ 0, -1,  2,  0,  1], [      2451,          0,      -1200,          0]),
    ([ 2,  0, -2,  0,  0], [     -2790,          0,        410,          0]),
    ([-1,  0,  0,  2, -1], [      2145,          0,      -1154,          0]),
    ([ 0,  0,  2, -2,  0], [      2816,          0,        286,          0]),
    ([ 0,  1,  0, -2,  0], [      2700,          0,       -258,          0]),
    ([ 1,  0,  0, -1,  0], [     -2330,          0,        -37,          0]),
    ([ 0,  0,  0,  0,  2], [      2283,          0,      -1039,          0]),
    ([ 1,  0, -2,  0,  0], [     -2321,          0,        284,          0]),
    ([-1,  0,  0,  1,  1], [     -2049,          0,       1112,          0]),
];

/// Planetary offsets standing in for the omitted terms, 0.1 µas.
const DPSI_OFFSET: f64 = -1_350.0;
const DEPS_OFFSET: f64 = 3_880.0;

/// Fukushima-Williams angles, arcsec polynomials in t.
const GAMMA_BAR: [f64; 6] = [-0.052_928, 10.556_378, 0.493_204_4, -0.000_312_38, -0.000_002_788, 0.000_000_026_0];
const PHI_BAR: [f64; 6] = [84_381.412_819, -46.811_016, 0.051_126_8, 0.000_532_89, -0.000_000_440, -0.000_000_017_6];
const PSI_BAR: [f64; 6] = [-0.041_775, 5_038.481_484, 1.558_417_5, -0.000_185_22, -0.000_026_452, -0.000_000_014_8];
/// Mean obliquity of date, arcsec polynomial in t.
const EPSILON_A: [f64; 6] = [84_381.406, -46.836_769, -0.000_183_1, 0.002_003_40, -0.000_000_576, -0.000_000_043_4];

/// `s + XY/2` polynomial, µas.
const S_POLYNOMIAL: [f64; 6] = [94.0, 3_808.65, -122.68, -72_574.11, 27.98, 15.62];

/// Leading `s + XY/2` terms by power of t: multipliers of `[l', F, D, Ω]`,
/// then sine and cosine amplitudes in µas.
const S_TERMS: [&[([i8; 4], f64, f64)]; 3] = [
    &[
        ([0, 0, 0, 1], -2_640.73, 0.39),
        ([0, 0, 0, 2], -63.53, 0.02),
        ([0, 2, -2, 3], -11.75, -0.01),
        ([0, 2, -2, 1], -11.21, -0.01),
        ([0, 2, -2, 2], 4.57, 0.0),
        ([0, 2, 0, 3], -2.02, 0.0),
        ([0, 2, 0, 1], -1.98, 0.0),
        ([0, 0, 0, 3], 1.72, 0.0),
        ([1, 0, 0, 1], 1.41, 0.01),
        ([1, 0, 0, -1], 1.26, 0.01),
    ],
    &[
        ([0, 0, 0, 2], -0.07, 3.57),
        ([0, 0, 0, 1], 1.73, -0.03),
    ],
    &[
        ([0, 0, 0, 1], 743.52, -0.17),
        ([0, 2, -2, 2], 56.91, 0.06),
        ([0, 2, 0, 2], 9.84, -0.01),
        ([0, 0, 0, 2], -8.85, 0.01),
    ],
];

fn poly(c: &[f64; 6], t: f64) -> f64 {
    c[0] + t * (c[1] + t * (c[2] + t * (c[3] + t * (c[4] + t * c[5]))))
}

/// Precession-nutation model needing no external tables.
#[derive(Debug, Clone)]
pub struct Iau2006Truncated {
    dpsi: PrecessionExpansion,
    deps: PrecessionExpansion,
    s_plus_xy_half: PrecessionExpansion,
}

impl Default for Iau2006Truncated {
    fn default() -> Self {
        Self::new()
    }
}

impl Iau2006Truncated {
    pub fn new() -> Self {
        let mut dpsi = [Vec::new(), Vec::new()];
        let mut deps = [Vec::new(), Vec::new()];
        for (multipliers, [s, s_rate, c, c_rate]) in NUTATION_2000B {
            let mut w: Weights = [0; ARGUMENT_COUNT];
            w[..5].copy_from_slice(&multipliers);
            dpsi[0].push(HarmonicTerm::new(w, s as f64, 0.0));
            deps[0].push(HarmonicTerm::new(w, 0.0, c as f64));
            if s_rate != 0 {
                dpsi[1].push(HarmonicTerm::new(w, s_rate as f64, 0.0));
            }
            if c_rate != 0 {
                deps[1].push(HarmonicTerm::new(w, 0.0, c_rate as f64));
            }
        }

        let s_terms = S_TERMS
            .iter()
            .map(|terms| {
                terms
                    .iter()
                    .map(|&([lp, f, d, om], sin_amp, cos_amp)| {
                        let mut w: Weights = [0; ARGUMENT_COUNT];
                        w[L_PRIME] = lp;
                        w[F] = f;
                        w[D] = d;
                        w[OMEGA] = om;
                        HarmonicTerm::new(w, sin_amp, cos_amp)
                    })
                    .collect()
            })
            .collect();

        let tenth_micro = MICRO_ARCSEC_TO_RAD * 0.1;
        Self {
            dpsi: PrecessionExpansion::validated(vec![DPSI_OFFSET, 0.0], dpsi.into(), tenth_micro),
            deps: PrecessionExpansion::validated(vec![DEPS_OFFSET, 0.0], deps.into(), tenth_micro),
            s_plus_xy_half: PrecessionExpansion::validated(
                S_POLYNOMIAL.to_vec(),
                s_terms,
                MICRO_ARCSEC_TO_RAD,
            ),
        }
    }

    /// Nutation in longitude and obliquity, radians.
    pub fn nutation(&self, args: &TidalArguments) -> Result<(f64, f64), FrameError> {
        Ok((self.dpsi.evaluate(args)?, self.deps.evaluate(args)?))
    }

    /// Bias-precession-nutation matrix (GCRS → true equator and equinox).
    pub fn bias_precession_nutation(&self, args: &TidalArguments) -> Result<Rotation, FrameError> {
        let t = args.centuries();
        let (dpsi, deps) = self.nutation(args)?;
        let gamb = poly(&GAMMA_BAR, t) * ARCSEC_TO_RAD;
        let phib = poly(&PHI_BAR, t) * ARCSEC_TO_RAD;
        let psi = poly(&PSI_BAR, t) * ARCSEC_TO_RAD + dpsi;
        let eps = poly(&EPSILON_A, t) * ARCSEC_TO_RAD + deps;
        Ok(Rotation::r1(-eps) * Rotation::r3(-psi) * Rotation::r1(phib) * Rotation::r3(gamb))
    }
}

impl PrecessionModel for Iau2006Truncated {
    fn name(&self) -> &'static str {
        "iau2006-truncated"
    }

    fn cip(&self, args: &TidalArguments) -> Result<CipCoordinates, FrameError> {
        let npb = self.bias_precession_nutation(args)?;
        let x = npb.rows()[2][0];
        let y = npb.rows()[2][1];
        let s = self.s_plus_xy_half.evaluate(args)? - x * y / 2.0;
        Ok(CipCoordinates { x, y, s })
    }
}

#[cfg(test)]
mod tests {
    use kala_time::{Instant, TimeSystemId};

    use super::*;

    fn args_at(jd_tdb: f64) -> TidalArguments {
        TidalArguments::new(Instant::from_jd(TimeSystemId::TDB, jd_tdb))
    }

    #[test]
    fn table_is_complete() {
        assert_eq!(NUTATION_2000B.len(), 77);
        assert_eq!(NUTATION_2000B[0].0, [0, 0, 0, 0, 1]);
    }

    #[test]
    fn cip_matches_full_series_at_reference_epoch() {
        let cip = Iau2006Truncated::new().cip(&args_at(2_453_411.5)).unwrap();
        assert!((cip.x - 4.853_950_847_103_446e-4).abs() < 2e-8, "x = {}", cip.x);
        assert!((cip.y - 4.050_595_686_219_751_5e-5).abs() < 2e-8, "y = {}", cip.y);
        assert!((cip.s - -1.425_838_163_209_550_3e-8).abs() < 1e-10, "s = {}", cip.s);
    }

    #[test]
    fn nutation_amplitude() {
        let model = Iau2006Truncated::new();
        let (dpsi, deps) = model.nutation(&args_at(2_460_310.5)).unwrap();
        assert!(dpsi.abs() < 20.0 * ARCSEC_TO_RAD, "dpsi = {dpsi}");
        assert!(deps.abs() < 10.0 * ARCSEC_TO_RAD, "deps = {deps}");
    }

    #[test]
    fn pole_offset_at_j2000_is_frame_bias() {
        let cip = Iau2006Truncated::new().cip(&args_at(2_451_545.0)).unwrap();
        // Frame bias plus nutation only; no precession has accumulated.
        assert!(cip.x.abs() < 5e-5);
        assert!(cip.y.abs() < 5e-5);
    }
}
