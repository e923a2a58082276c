//! Fundamental (tidal) arguments of nutation and tidal theory.
//!
//! Fourteen angles are functions of TDB alone: the five Delaunay arguments,
//! the mean longitudes of the planets Mercury to Neptune and the general
//! precession in longitude. A fifteenth, γ = GMST + π, needs UT1 and is only
//! available when the arguments were built with a UT1 companion.
//!
//! Sources: IERS Conventions 2010, Eqs. 5.43 and 5.44.

use std::f64::consts::{PI, TAU};
use std::sync::OnceLock;

use kala_time::{Instant, gmst, sidereal, ut1_days_since_j2000};

use crate::error::FrameError;

/// Number of argument slots (14 TDB angles plus γ).
pub const ARGUMENT_COUNT: usize = 15;

pub const L: usize = 0;
pub const L_PRIME: usize = 1;
pub const F: usize = 2;
pub const D: usize = 3;
pub const OMEGA: usize = 4;
pub const L_MERCURY: usize = 5;
pub const L_VENUS: usize = 6;
pub const L_EARTH: usize = 7;
pub const L_MARS: usize = 8;
pub const L_JUPITER: usize = 9;
pub const L_SATURN: usize = 10;
pub const L_URANUS: usize = 11;
pub const L_NEPTUNE: usize = 12;
pub const P_A: usize = 13;
/// Earth-rotation phase γ = GMST + π.
pub const GAMMA: usize = 14;

/// Integer multipliers of the fifteen arguments.
pub type Weights = [i8; ARGUMENT_COUNT];

const ARCSEC_TO_RAD: f64 = sidereal::ARCSEC_TO_RAD;

#[derive(Debug)]
struct Trig {
    sin: [f64; ARGUMENT_COUNT],
    cos: [f64; ARGUMENT_COUNT],
    sin2: [f64; ARGUMENT_COUNT],
    cos2: [f64; ARGUMENT_COUNT],
}

/// The fundamental arguments at one instant, with lazily cached trigonometry.
#[derive(Debug)]
pub struct TidalArguments {
    tdb: Instant,
    ut1: Option<Instant>,
    t: f64,
    angles: [f64; ARGUMENT_COUNT],
    era: Option<f64>,
    trig: OnceLock<Trig>,
}

impl TidalArguments {
    /// Arguments from a TDB instant, without the Earth-rotation phase.
    pub fn new(tdb: Instant) -> Self {
        let t = tdb.julian_centuries();
        Self {
            tdb,
            ut1: None,
            t,
            angles: tdb_angles(t),
            era: None,
            trig: OnceLock::new(),
        }
    }

    /// Arguments from a TDB instant and the UT1 reading of the same moment.
    pub fn with_ut1(tdb: Instant, ut1: Instant) -> Self {
        let mut args = Self::new(tdb);
        let du = ut1_days_since_j2000(&ut1);
        args.era = Some(kala_time::earth_rotation_angle(du));
        args.angles[GAMMA] = reduce(gmst(du, args.t) + PI);
        args.ut1 = Some(ut1);
        args
    }

    pub fn tdb(&self) -> Instant {
        self.tdb
    }

    pub fn ut1(&self) -> Option<Instant> {
        self.ut1
    }

    /// Julian centuries of TDB since J2000.0.
    pub fn centuries(&self) -> f64 {
        self.t
    }

    /// All angles in radians, each in `(-π, π]`. The γ slot is zero without UT1.
    pub fn angles(&self) -> &[f64; ARGUMENT_COUNT] {
        &self.angles
    }

    pub fn angle(&self, index: usize) -> Result<f64, FrameError> {
        if index == GAMMA && self.ut1.is_none() {
            return Err(FrameError::MissingRotationPhase);
        }
        Ok(self.angles[index])
    }

    /// Earth Rotation Angle in `[0, 2π)`, if UT1 is known.
    pub fn earth_rotation_angle(&self) -> Option<f64> {
        self.era
    }

    pub fn has_rotation_phase(&self) -> bool {
        self.ut1.is_some()
    }

    fn trig(&self) -> &Trig {
        self.trig.get_or_init(|| {
            let mut trig = Trig {
                sin: [0.0; ARGUMENT_COUNT],
                cos: [1.0; ARGUMENT_COUNT],
                sin2: [0.0; ARGUMENT_COUNT],
                cos2: [1.0; ARGUMENT_COUNT],
            };
            for (i, a) in self.angles.iter().enumerate() {
                let (s, c) = a.sin_cos();
                trig.sin[i] = s;
                trig.cos[i] = c;
                trig.sin2[i] = 2.0 * s * c;
                trig.cos2[i] = c * c - s * s;
            }
            trig
        })
    }

    /// `(sin θ, cos θ)` of `θ = Σ wᵢ aᵢ`, built by angle addition from the
    /// cached single and double angles.
    pub fn weighted_sum(&self, weights: &Weights) -> Result<(f64, f64), FrameError> {
        if weights[GAMMA] != 0 && self.ut1.is_none() {
            return Err(FrameError::MissingRotationPhase);
        }
        let trig = self.trig();
        let (mut s, mut c) = (0.0, 1.0);
        for (i, &w) in weights.iter().enumerate() {
            if w == 0 {
                continue;
            }
            let sign = f64::from(w.signum());
            let n = w.unsigned_abs();
            for _ in 0..n / 2 {
                (s, c) = add(s, c, sign * trig.sin2[i], trig.cos2[i]);
            }
            if n % 2 == 1 {
                (s, c) = add(s, c, sign * trig.sin[i], trig.cos[i]);
            }
        }
        Ok((s, c))
    }
}

fn add(s: f64, c: f64, sa: f64, ca: f64) -> (f64, f64) {
    (s * ca + c * sa, c * ca - s * sa)
}

/// Reduce an angle into `(-π, π]`.
pub fn reduce(angle: f64) -> f64 {
    let r = angle.rem_euclid(TAU);
    if r > PI { r - TAU } else { r }
}

fn arcsec_poly(c: [f64; 5], t: f64) -> f64 {
    let arcsec = c[0] + t * (c[1] + t * (c[2] + t * (c[3] + t * c[4])));
    reduce((arcsec % 1_296_000.0) * ARCSEC_TO_RAD)
}

fn tdb_angles(t: f64) -> [f64; ARGUMENT_COUNT] {
    let mut a = [0.0; ARGUMENT_COUNT];
    a[L] = arcsec_poly([485_868.249_036, 1_717_915_923.217_8, 31.879_2, 0.051_635, -0.000_244_70], t);
    a[L_PRIME] = arcsec_poly([1_287_104.793_05, 129_596_581.048_1, -0.553_2, 0.000_136, -0.000_011_49], t);
    a[F] = arcsec_poly([335_779.526_232, 1_739_527_262.847_8, -12.751_2, -0.001_037, 0.000_004_17], t);
    a[D] = arcsec_poly([1_072_260.703_69, 1_602_961_601.209_0, -6.370_6, 0.006_593, -0.000_031_69], t);
    a[OMEGA] = arcsec_poly([450_160.398_036, -6_962_890.543_1, 7.472_2, 0.007_702, -0.000_059_39], t);
    a[L_MERCURY] = reduce(4.402_608_842 + 2_608.790_314_157_4 * t);
    a[L_VENUS] = reduce(3.176_146_697 + 1_021.328_554_621_1 * t);
    a[L_EARTH] = reduce(1.753_470_314 + 628.307_584_999_1 * t);
    a[L_MARS] = reduce(6.203_480_913 + 334.061_242_670_0 * t);
    a[L_JUPITER] = reduce(0.599_546_497 + 52.969_096_264_1 * t);
    a[L_SATURN] = reduce(0.874_016_757 + 21.329_910_496_0 * t);
    a[L_URANUS] = reduce(5.481_293_872 + 7.478_159_856_7 * t);
    a[L_NEPTUNE] = reduce(5.311_886_287 + 3.813_303_563_8 * t);
    a[P_A] = reduce(0.024_381_750 * t + 0.000_005_386_91 * t * t);
    a
}
