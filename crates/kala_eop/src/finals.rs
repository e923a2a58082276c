//! IERS `finals2000A` bulletin parser.
//!
//! Fixed-width columns used (1-indexed):
//! - 8-15: MJD of 0h UTC
//! - 19-27 / 28-36: PM-x and its error (arcsec), Bulletin A
//! - 38-46 / 47-55: PM-y and its error (arcsec), Bulletin A
//! - 59-68 / 69-78: UT1−UTC and its error (s), Bulletin A
//! - 98-106 / 107-115: dX and its error (mas), Bulletin A
//! - 117-125 / 126-134: dY and its error (mas), Bulletin A
//! - 135-144, 145-154: PM-x, PM-y, Bulletin B
//! - 155-165: UT1−UTC, Bulletin B
//! - 166-175, 176-185: dX, dY, Bulletin B
//!
//! Bulletin B (final) values are preferred when present; errors always come
//! from the Bulletin A columns. Rows without UT1−UTC (the blank tail of
//! predictions) are skipped.
//!
//! Data file: <https://datacenter.iers.org/> or <https://maia.usno.navy.mil/ser7/>.

use std::ops::Range;
use std::path::Path;

use kala_time::{Instant, LeapSecondTable, TimeSystemId};
use tracing::{debug, trace, warn};

use crate::error::EopError;
use crate::row::{EarthOrientationRow, PolarMotion, PrecessionCorrection};
use crate::table::EarthOrientationTable;

const MJD: Range<usize> = 7..15;
const PM_X: Range<usize> = 18..27;
const PM_X_ERR: Range<usize> = 27..36;
const PM_Y: Range<usize> = 37..46;
const PM_Y_ERR: Range<usize> = 46..55;
const DUT1: Range<usize> = 58..68;
const DUT1_ERR: Range<usize> = 68..78;
const DX: Range<usize> = 97..106;
const DX_ERR: Range<usize> = 106..115;
const DY: Range<usize> = 116..125;
const DY_ERR: Range<usize> = 125..134;
const B_PM_X: Range<usize> = 134..144;
const B_PM_Y: Range<usize> = 144..154;
const B_DUT1: Range<usize> = 154..165;
const B_DX: Range<usize> = 165..175;
const B_DY: Range<usize> = 175..185;

/// Parse bulletin content into rows stamped in TAI.
///
/// `leap` maps each row's 0h UTC epoch onto TAI.
pub fn parse_finals(content: &str, leap: &LeapSecondTable) -> Result<Vec<EarthOrientationRow>, EopError> {
    let mut rows = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let Some(mjd) = column(line, MJD) else {
            if !line.trim().is_empty() {
                warn!(line = lineno + 1, "skipping bulletin line without MJD");
            }
            continue;
        };
        let Some(dut1_a) = column(line, DUT1) else {
            trace!(mjd, "bulletin row has no UT1−UTC");
            continue;
        };
        let (Some(x_a), Some(y_a)) = (column(line, PM_X), column(line, PM_Y)) else {
            warn!(line = lineno + 1, mjd, "skipping bulletin row without polar motion");
            continue;
        };

        let utc = Instant::from_mjd(TimeSystemId::UTC, mjd);
        let atomic = leap.to_atomic(&utc)?;
        let time = Instant::new(TimeSystemId::TAI, atomic.millis(), atomic.nanos())?;

        let polar_motion = PolarMotion::new(
            column(line, B_PM_X).unwrap_or(x_a),
            column(line, B_PM_Y).unwrap_or(y_a),
            column(line, PM_X_ERR).unwrap_or(0.0),
            column(line, PM_Y_ERR).unwrap_or(0.0),
        );
        let correction = PrecessionCorrection::new(
            column(line, B_DX).or_else(|| column(line, DX)).unwrap_or(0.0),
            column(line, B_DY).or_else(|| column(line, DY)).unwrap_or(0.0),
            column(line, DX_ERR).unwrap_or(0.0),
            column(line, DY_ERR).unwrap_or(0.0),
        );
        rows.push(
            EarthOrientationRow::new(
                time,
                polar_motion,
                column(line, B_DUT1).unwrap_or(dut1_a),
                column(line, DUT1_ERR).unwrap_or(0.0),
            )
            .with_precession_correction(correction),
        );
    }

    if rows.is_empty() {
        return Err(EopError::BulletinParse("no rows with UT1−UTC found".into()));
    }
    Ok(rows)
}

fn column(line: &str, range: Range<usize>) -> Option<f64> {
    let text = line.get(range.start..range.end.min(line.len()))?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse().ok()
}

impl EarthOrientationTable {
    /// Append every row of a `finals2000A` file.
    pub fn load_finals(&mut self, path: &Path) -> Result<usize, EopError> {
        let content = std::fs::read_to_string(path)?;
        let added = self.extend_from_finals(&content)?;
        debug!(path = %path.display(), rows = added, "loaded finals bulletin");
        Ok(added)
    }

    /// Append every row of `finals2000A` content; returns the number added.
    pub fn extend_from_finals(&mut self, content: &str) -> Result<usize, EopError> {
        let rows = parse_finals(content, self.leap_table())?;
        let added = rows.len();
        for row in rows {
            self.push_row(row)?;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use kala_frames::Iau2006Truncated;

    use super::*;

    fn put(line: &mut [u8], range: Range<usize>, text: &str) {
        let width = range.len();
        let padded = format!("{text:>width$}");
        line[range].copy_from_slice(padded.as_bytes());
    }

    struct Fields {
        mjd: f64,
        x: f64,
        y: f64,
        dut1: f64,
        bulletin_b: Option<(f64, f64, f64)>,
    }

    fn line(f: &Fields) -> String {
        let mut line = vec![b' '; if f.bulletin_b.is_some() { 185 } else { 134 }];
        put(&mut line, MJD, &format!("{:.2}", f.mjd));
        line[16] = b'I';
        put(&mut line, PM_X, &format!("{:.6}", f.x));
        put(&mut line, PM_X_ERR, "0.000020");
        put(&mut line, PM_Y, &format!("{:.6}", f.y));
        put(&mut line, PM_Y_ERR, "0.000030");
        line[57] = b'I';
        put(&mut line, DUT1, &format!("{:.7}", f.dut1));
        put(&mut line, DUT1_ERR, "0.0000100");
        put(&mut line, DX, "0.123");
        put(&mut line, DX_ERR, "0.045");
        put(&mut line, DY, "-0.210");
        put(&mut line, DY_ERR, "0.046");
        if let Some((bx, by, bdut1)) = f.bulletin_b {
            put(&mut line, B_PM_X, &format!("{bx:.6}"));
            put(&mut line, B_PM_Y, &format!("{by:.6}"));
            put(&mut line, B_DUT1, &format!("{bdut1:.7}"));
            put(&mut line, B_DX, "0.100");
            put(&mut line, B_DY, "-0.200");
        }
        String::from_utf8(line).unwrap_or_default()
    }

    fn sample() -> String {
        let mut text = [
            line(&Fields { mjd: 57_203.0, x: 0.1, y: 0.4, dut1: -0.3, bulletin_b: Some((0.11, 0.41, -0.31)) }),
            line(&Fields { mjd: 57_204.0, x: 0.2, y: 0.5, dut1: 0.7, bulletin_b: None }),
        ]
        .join("\n");
        // prediction tail: MJD only
        text.push_str("\n15 7 3 57206.00\n");
        text
    }

    #[test]
    fn prefers_bulletin_b() {
        let rows = parse_finals(&sample(), &LeapSecondTable::iers()).unwrap();
        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.polar_motion.x, 0.11);
        assert_eq!(first.polar_motion.x_err, 0.00002);
        assert_eq!(first.ut1_minus_utc, -0.31);
        assert_eq!(first.precession_correction.dx, 0.1);
        assert_eq!(first.precession_correction.dy_err, 0.046);

        let second = &rows[1];
        assert_eq!(second.polar_motion.y, 0.5);
        assert_eq!(second.precession_correction.dy, -0.21);
    }

    #[test]
    fn rows_are_stamped_in_tai() {
        // MJD 57203 is 2015-06-30, MJD 57204 the day after the leap second.
        let rows = parse_finals(&sample(), &LeapSecondTable::iers()).unwrap();
        assert_eq!(rows[0].time.system(), TimeSystemId::TAI);
        assert_eq!(rows[0].time.millis(), (57_203 - 40_587) * 86_400_000 + 35_000);
        assert_eq!(rows[1].time.millis(), (57_204 - 40_587) * 86_400_000 + 36_000);
    }

    #[test]
    fn loads_into_table() {
        let leap = Arc::new(LeapSecondTable::iers());
        let mut table = EarthOrientationTable::new(leap, Arc::new(Iau2006Truncated::new()));
        assert_eq!(table.extend_from_finals(&sample()).unwrap(), 2);
        let (start, _) = table.span().unwrap();
        let v = table.values(&start).unwrap();
        assert_abs_diff_eq!(v.ut1_minus_tai, -0.31 - 35.0, epsilon = 1e-12);
    }

    #[test]
    fn no_rows_is_an_error() {
        let err = parse_finals("15 7 3 57206.00\n", &LeapSecondTable::iers()).unwrap_err();
        assert!(matches!(err, EopError::BulletinParse(_)));
    }
}
