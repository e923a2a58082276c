//! Terrestrial and barycentric dynamical time.
//!
//! TT runs a fixed 32.184 s ahead of TAI. TDB differs from TT by a small
//! periodic term driven by the Earth's orbital mean anomaly:
//!
//! ```text
//! TDB − TT = K · sin(E),   E = M + EB · sin(M),   M = M0 + M1 · t
//! ```
//!
//! where `t` is TT seconds past J2000.0. The default constants are the ones
//! published with the NAIF leapseconds kernel (DELTET/K, DELTET/EB,
//! DELTET/M), giving about 30 µs accuracy.

use crate::instant::Instant;
use crate::julian::J2000_MILLIS;

/// TT − TAI in milliseconds.
pub const TT_MINUS_TAI_MS: i64 = 32_184;

/// TAI − GPS in milliseconds.
pub const TAI_MINUS_GPS_MS: i64 = 19_000;

/// Coefficients of the periodic TDB − TT model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TdbModel {
    /// Amplitude in seconds.
    pub k: f64,
    /// Orbital eccentricity used in the Kepler step.
    pub eb: f64,
    /// Mean anomaly at J2000.0 in radians.
    pub m0: f64,
    /// Mean anomaly rate in rad/s.
    pub m1: f64,
}

impl Default for TdbModel {
    fn default() -> Self {
        Self {
            k: 1.657e-3,
            eb: 1.671e-2,
            m0: 6.239_996,
            m1: 1.990_968_71e-7,
        }
    }
}

impl TdbModel {
    /// TDB − TT in seconds at `t` TT seconds past J2000.0.
    pub fn tdb_minus_tt(&self, t: f64) -> f64 {
        let m = self.m0 + self.m1 * t;
        let e = m + self.eb * m.sin();
        self.k * e.sin()
    }

    /// TDB reading of a TT instant.
    pub fn tt_to_tdb(&self, tt: &Instant) -> Instant {
        tt.incremented(self.tdb_minus_tt(seconds_past_j2000(tt)))
    }

    /// TT reading of a TDB instant.
    ///
    /// The correction is evaluated at TT; three fixed-point steps bring the
    /// residual far below a nanosecond.
    pub fn tdb_to_tt(&self, tdb: &Instant) -> Instant {
        let t_tdb = seconds_past_j2000(tdb);
        let mut correction = 0.0;
        for _ in 0..3 {
            correction = self.tdb_minus_tt(t_tdb - correction);
        }
        tdb.incremented(-correction)
    }
}

/// Seconds past J2000.0 of a reading, in its own system.
pub fn seconds_past_j2000(instant: &Instant) -> f64 {
    (instant.millis() - J2000_MILLIS) as f64 * 1e-3 + f64::from(instant.nanos()) * 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::TimeSystemId;

    #[test]
    fn amplitude_is_bounded() {
        let model = TdbModel::default();
        for day in (-36_525..36_525).step_by(97) {
            let d = model.tdb_minus_tt(f64::from(day) * 86_400.0);
            assert!(d.abs() <= 1.7e-3, "day {day}: {d}");
        }
    }

    #[test]
    fn inverse_recovers_tt() {
        let model = TdbModel::default();
        let tt = Instant::new(TimeSystemId::TT, 1_107_993_600_000, 123_456).unwrap();
        let back = model.tdb_to_tt(&model.tt_to_tdb(&tt));
        assert_eq!(back.millis(), tt.millis());
        assert!((i64::from(back.nanos()) - i64::from(tt.nanos())).abs() <= 1);
    }

    #[test]
    fn correction_at_j2000() {
        let model = TdbModel::default();
        let m: f64 = 6.239_996;
        let expected = 1.657e-3 * (m + 1.671e-2 * m.sin()).sin();
        assert!((model.tdb_minus_tt(0.0) - expected).abs() < 1e-18);
    }
}
