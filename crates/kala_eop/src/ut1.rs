//! UT1 as a rotational time system in a [`TimeGraph`].
//!
//! One UT1 system exists per orientation table. TAI → UT1 adds the table's
//! UT1 − TAI; UT1 → TAI solves `tai + Δ(tai) = ut1` by fixed-point
//! iteration, which converges immediately because Δ drifts by milliseconds
//! per day.

use std::sync::Arc;

use kala_time::{EdgeOwner, Instant, SystemKey, TimeError, TimeGraph, TimeSystemId, TimeSystemKind};
use tracing::debug;

use crate::error::EopError;
use crate::table::EarthOrientationTable;

const UT1_TO_TAI_ITERATIONS: usize = 3;

/// Register (or look up) the UT1 system defined by `table`.
pub fn register_ut1(
    graph: &mut TimeGraph,
    table: &Arc<EarthOrientationTable>,
) -> Result<TimeSystemId, EopError> {
    let key = SystemKey::of(TimeSystemKind::Rotational, table);
    let (ut1, created) = graph.find_or_add_system(key, "Universal Time", "UT1");
    if !created {
        return Ok(ut1);
    }

    let tdb = graph.tdb_model();
    let forward = Arc::clone(table);
    graph.add_edge(EdgeOwner::Target, TimeSystemId::TAI, ut1, 1, move |tai: &Instant| {
        let offset = forward
            .ut1_minus_tai(tai, &tdb)
            .map_err(|e| time_error(e, TimeSystemId::TAI, ut1))?;
        Ok(tai.incremented(offset))
    })?;

    let backward = Arc::clone(table);
    graph.add_edge(EdgeOwner::Source, ut1, TimeSystemId::TAI, 1, move |reading: &Instant| {
        let start = Instant::new(TimeSystemId::TAI, reading.millis(), reading.nanos())?;
        let mut tai = start;
        for _ in 0..UT1_TO_TAI_ITERATIONS {
            let offset = backward
                .ut1_minus_tai(&tai, &tdb)
                .map_err(|e| time_error(e, ut1, TimeSystemId::TAI))?;
            tai = start.incremented(-offset);
        }
        Ok(tai)
    })?;

    debug!(system = %ut1, rows = table.len(), "registered UT1 time system");
    Ok(ut1)
}

fn time_error(error: EopError, from: TimeSystemId, to: TimeSystemId) -> TimeError {
    match error {
        EopError::Time(e) => e,
        other => {
            debug!(error = %other, "UT1 conversion failed");
            TimeError::NoConversion {
                from: from.to_string(),
                to: to.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use kala_frames::Iau2006Truncated;
    use kala_time::{LeapSecondTable, MILLIS_PER_DAY, TimeConfig};

    use super::*;
    use crate::row::{EarthOrientationRow, PolarMotion};

    const BASE: i64 = 1_600_000_000_000;

    fn setup() -> (TimeGraph, Arc<EarthOrientationTable>, TimeSystemId) {
        let leap = Arc::new(LeapSecondTable::iers());
        let rows = (0..6).map(|d| {
            EarthOrientationRow::new(
                Instant::from_millis(TimeSystemId::TAI, BASE + d * MILLIS_PER_DAY),
                PolarMotion::new(0.2, 0.3, 0.0, 0.0),
                -0.2 - 0.001 * d as f64,
                1e-5,
            )
        });
        let table = Arc::new(
            EarthOrientationTable::from_rows(Arc::clone(&leap), Arc::new(Iau2006Truncated::new()), rows)
                .unwrap(),
        );
        let mut graph = TimeGraph::with_leap_table(TimeConfig::default(), leap);
        let ut1 = register_ut1(&mut graph, &table).unwrap();
        (graph, table, ut1)
    }

    #[test]
    fn registration_is_idempotent() {
        let (mut graph, table, ut1) = setup();
        assert_eq!(register_ut1(&mut graph, &table).unwrap(), ut1);
        assert_eq!(graph.find_by_abbreviation("UT1"), Some(ut1));
    }

    #[test]
    fn tai_ut1_round_trip() {
        let (graph, _, ut1) = setup();
        let tai = Instant::from_millis(TimeSystemId::TAI, BASE + MILLIS_PER_DAY + 12_345_678);
        let reading = graph.convert(&tai, ut1).unwrap();
        assert_eq!(reading.system(), ut1);
        let expected = -0.2 - 0.001 * (1.0 + 12_345_678.0 / MILLIS_PER_DAY as f64) - 37.0;
        assert_abs_diff_eq!(reading.raw_seconds_after(&Instant::new(ut1, tai.millis(), 0).unwrap()).unwrap(), expected, epsilon = 1e-9);

        let back = graph.convert(&reading, TimeSystemId::TAI).unwrap();
        assert_abs_diff_eq!(back.raw_seconds_after(&tai).unwrap(), 0.0, epsilon = 2e-9);
    }

    #[test]
    fn utc_to_ut1_goes_through_tai() {
        let (graph, _, ut1) = setup();
        let utc = Instant::from_millis(TimeSystemId::UTC, BASE + 2 * MILLIS_PER_DAY);
        let reading = graph.convert(&utc, ut1).unwrap();
        let dut1 = reading.raw_seconds_after(&Instant::new(ut1, utc.millis(), 0).unwrap()).unwrap();
        assert_abs_diff_eq!(dut1, -0.202, epsilon = 1e-6);
    }
}
