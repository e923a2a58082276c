//! Interpolating table of measured Earth-orientation parameters.
//!
//! Rows are held in strictly increasing TAI order. Inside the table every
//! value is interpolated with a four-point Lagrange polynomial over the rows
//! `[i−1, i, i+1, i+2]` around the bracketing row `i`, shifted to stay
//! inside the table; tabulated errors propagate as `√Σ wₖ² eₖ²`. UT1 is
//! carried as UT1 − TAI, which is continuous across leap seconds.
//!
//! Outside the table nothing is extrapolated: the nearest edge row is held
//! and UT1 is the civil reading of the query plus that row's UT1 − UTC.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kala_frames::{PrecessionModel, TidalArguments};
use kala_time::{
    Instant, LeapSecondTable, MILLIS_PER_DAY, SystemKey, TT_MINUS_TAI_MS, TdbModel, TimeError,
    TimeGraph, TimeSystemId, TimeSystemKind,
};
use tracing::trace;

use crate::error::EopError;
use crate::orientation::EarthOrientation;
use crate::row::{EarthOrientationRow, PolarMotion, PrecessionCorrection};
use crate::tidal_correction::TidalCorrectionModel;

const WINDOW: usize = 4;

/// Parameters at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EopValues {
    /// Pole coordinates in arcseconds.
    pub polar_motion: PolarMotion,
    /// UT1 − TAI in seconds.
    pub ut1_minus_tai: f64,
    pub ut1_err: f64,
    /// dX, dY in milliarcseconds.
    pub precession_correction: PrecessionCorrection,
    /// `false` when the query fell outside the table and an edge row was held.
    pub interpolated: bool,
}

#[derive(Debug, Clone, Copy)]
struct Knot {
    row: EarthOrientationRow,
    ut1_minus_tai: f64,
}

#[derive(Debug)]
pub struct EarthOrientationTable {
    leap: Arc<LeapSecondTable>,
    precession: Arc<dyn PrecessionModel>,
    tidal: Option<TidalCorrectionModel>,
    knots: Vec<Knot>,
    cursor: AtomicUsize,
}

impl EarthOrientationTable {
    pub fn new(leap: Arc<LeapSecondTable>, precession: Arc<dyn PrecessionModel>) -> Self {
        Self {
            leap,
            precession,
            tidal: None,
            knots: Vec::new(),
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn from_rows(
        leap: Arc<LeapSecondTable>,
        precession: Arc<dyn PrecessionModel>,
        rows: impl IntoIterator<Item = EarthOrientationRow>,
    ) -> Result<Self, EopError> {
        let mut table = Self::new(leap, precession);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Apply diurnal tidal corrections to every lookup.
    pub fn with_tidal_corrections(mut self, model: TidalCorrectionModel) -> Self {
        self.tidal = Some(model);
        self
    }

    /// Append a row. Its time must be TAI and strictly after the last row.
    pub fn push_row(&mut self, row: EarthOrientationRow) -> Result<(), EopError> {
        check_tai(&row.time)?;
        if let Some(last) = self.knots.last() {
            if key(&row.time) <= key(&last.row.time) {
                return Err(TimeError::OutOfOrder {
                    what: "Earth-orientation row",
                    previous: describe(&last.row.time),
                    offered: describe(&row.time),
                }
                .into());
            }
        }
        let ut1_minus_tai = row.ut1_minus_utc - self.leap.tai_minus_utc_at_atomic(row.time.millis());
        self.knots.push(Knot { row, ut1_minus_tai });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &EarthOrientationRow> {
        self.knots.iter().map(|k| &k.row)
    }

    /// First and last tabulated TAI instants.
    pub fn span(&self) -> Option<(Instant, Instant)> {
        Some((self.knots.first()?.row.time, self.knots.last()?.row.time))
    }

    pub fn leap_table(&self) -> &Arc<LeapSecondTable> {
        &self.leap
    }

    pub fn precession_model(&self) -> &Arc<dyn PrecessionModel> {
        &self.precession
    }

    pub fn tidal_corrections(&self) -> Option<&TidalCorrectionModel> {
        self.tidal.as_ref()
    }

    /// Key of the rotational system this table defines in a [`TimeGraph`].
    pub fn system_key(&self) -> SystemKey {
        SystemKey {
            kind: TimeSystemKind::Rotational,
            identity: (self as *const Self).cast::<()>() as usize,
        }
    }

    /// Tabulated parameters at a TAI instant, without tidal corrections.
    pub fn values(&self, tai: &Instant) -> Result<EopValues, EopError> {
        check_tai(tai)?;
        let (Some(first), Some(last)) = (self.knots.first(), self.knots.last()) else {
            return Err(EopError::EmptyTable);
        };
        if key(tai) < key(&first.row.time) {
            return Ok(self.held(first, tai));
        }
        if key(tai) > key(&last.row.time) {
            return Ok(self.held(last, tai));
        }

        let n = self.knots.len();
        let i = self.locate(tai);
        let start = i.saturating_sub(1).min(n.saturating_sub(WINDOW));
        let window = &self.knots[start..(start + WINDOW).min(n)];

        let mut offsets = [0.0; WINDOW];
        for (offset, knot) in offsets.iter_mut().zip(window) {
            *offset = days_between(&knot.row.time, tai);
        }
        let weights = lagrange_weights(&offsets[..window.len()]);

        let value = |f: fn(&Knot) -> f64| -> f64 {
            window.iter().zip(&weights).map(|(k, w)| w * f(k)).sum()
        };
        let error = |f: fn(&Knot) -> f64| -> f64 {
            window
                .iter()
                .zip(&weights)
                .map(|(k, w)| (w * f(k)).powi(2))
                .sum::<f64>()
                .sqrt()
        };

        Ok(EopValues {
            polar_motion: PolarMotion::new(
                value(|k| k.row.polar_motion.x),
                value(|k| k.row.polar_motion.y),
                error(|k| k.row.polar_motion.x_err),
                error(|k| k.row.polar_motion.y_err),
            ),
            ut1_minus_tai: value(|k| k.ut1_minus_tai),
            ut1_err: error(|k| k.row.ut1_minus_utc_err),
            precession_correction: PrecessionCorrection::new(
                value(|k| k.row.precession_correction.dx),
                value(|k| k.row.precession_correction.dy),
                error(|k| k.row.precession_correction.dx_err),
                error(|k| k.row.precession_correction.dy_err),
            ),
            interpolated: true,
        })
    }

    /// UT1 − TAI in seconds at a TAI instant, tidal corrections included.
    ///
    /// `tdb` supplies the dynamical time for the tidal arguments.
    pub fn ut1_minus_tai(&self, tai: &Instant, tdb: &TdbModel) -> Result<f64, EopError> {
        if self.tidal.is_none() {
            return Ok(self.values(tai)?.ut1_minus_tai);
        }
        let tdb = tdb.tt_to_tdb(&tai.plus_millis(TT_MINUS_TAI_MS));
        let (values, _, _) = self.resolve(tai, tdb, tai.system())?;
        Ok(values.ut1_minus_tai)
    }

    /// Full orientation at a TAI instant.
    ///
    /// The table must have been registered in `graph` with
    /// [`register_ut1`](crate::register_ut1).
    pub fn get_orientation(
        &self,
        tai: &Instant,
        graph: &TimeGraph,
    ) -> Result<EarthOrientation, EopError> {
        check_tai(tai)?;
        let ut1_system = graph
            .system_for_key(self.system_key())
            .ok_or(EopError::NotRegistered)?;
        let tdb = graph.convert(tai, TimeSystemId::TDB)?;
        let (values, ut1, args) = self.resolve(tai, tdb, ut1_system)?;
        Ok(EarthOrientation::new(
            *tai,
            ut1,
            tdb,
            values,
            Arc::new(args),
            Arc::clone(&self.precession),
        ))
    }

    /// Values with tidal corrections applied, the UT1 reading tagged
    /// `ut1_system`, and the arguments built from both.
    fn resolve(
        &self,
        tai: &Instant,
        tdb: Instant,
        ut1_system: TimeSystemId,
    ) -> Result<(EopValues, Instant, TidalArguments), EopError> {
        let mut values = self.values(tai)?;
        let reading = Instant::new(ut1_system, tai.millis(), tai.nanos())?;
        let mut ut1 = reading.incremented(values.ut1_minus_tai);
        let mut args = TidalArguments::with_ut1(tdb, ut1);
        if let Some(tidal) = &self.tidal {
            let correction = tidal.evaluate(&args)?;
            values.polar_motion.x += correction.x * 1e-6;
            values.polar_motion.y += correction.y * 1e-6;
            values.ut1_minus_tai += correction.ut1 * 1e-6;
            ut1 = reading.incremented(values.ut1_minus_tai);
            args = TidalArguments::with_ut1(tdb, ut1);
        }
        Ok((values, ut1, args))
    }

    fn held(&self, edge: &Knot, tai: &Instant) -> EopValues {
        trace!(tai_ms = tai.millis(), edge_ms = edge.row.time.millis(), "off-table lookup");
        EopValues {
            polar_motion: edge.row.polar_motion,
            ut1_minus_tai: edge.row.ut1_minus_utc
                - self.leap.tai_minus_utc_at_atomic(tai.millis()),
            ut1_err: edge.row.ut1_minus_utc_err,
            precession_correction: edge.row.precession_correction,
            interpolated: false,
        }
    }

    /// Row `i` with `tᵢ ≤ q < tᵢ₊₁`, walking from the cached cursor.
    /// The query must lie inside the table.
    fn locate(&self, q: &Instant) -> usize {
        let n = self.knots.len();
        let q = key(q);
        let mut i = self.cursor.load(Ordering::Relaxed).min(n - 1);
        while i > 0 && key(&self.knots[i].row.time) > q {
            i -= 1;
        }
        while i + 1 < n && key(&self.knots[i + 1].row.time) <= q {
            i += 1;
        }
        self.cursor.store(i, Ordering::Relaxed);
        i
    }
}

fn check_tai(instant: &Instant) -> Result<(), EopError> {
    if instant.system() == TimeSystemId::TAI {
        Ok(())
    } else {
        Err(EopError::WrongTimeSystem {
            expected: TimeSystemId::TAI,
            got: instant.system(),
        })
    }
}

fn key(instant: &Instant) -> (i64, u32) {
    (instant.millis(), instant.nanos())
}

fn describe(instant: &Instant) -> String {
    format!("TAI {:.6} MJD", instant.modified_julian_date())
}

fn days_between(a: &Instant, b: &Instant) -> f64 {
    let ms = (a.millis() - b.millis()) as f64;
    let ns = f64::from(a.nanos()) - f64::from(b.nanos());
    (ms + ns * 1e-6) / MILLIS_PER_DAY as f64
}

/// Lagrange basis weights at zero for nodes at `offsets`.
fn lagrange_weights(offsets: &[f64]) -> [f64; WINDOW] {
    let mut weights = [0.0; WINDOW];
    for (k, w) in weights.iter_mut().enumerate().take(offsets.len()) {
        *w = offsets
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != k)
            .map(|(_, &xj)| -xj / (offsets[k] - xj))
            .product();
    }
    weights
}
