//! Parser for the USNO `tai-utc.dat` leap-second list.
//!
//! Each line reads
//!
//! ```text
//!  1972 JAN  1 =JD 2441317.5  TAI-UTC=  10.0       S + (MJD - 41317.) X 0.0      S
//! ```
//!
//! Lines dated before 1972 describe the rubber-second era and are ignored.
//! The first 1972 line must carry an offset of 10 s; every later change of
//! the offset must be exactly one second up or down.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::TimeError;
use crate::julian::{MILLIS_PER_DAY, days_from_civil, month_from_abbrev};
use crate::leap::{BASE_OFFSET_MS, LeapEpoch, LeapSecondTable};

const FIRST_YEAR: i32 = 1972;

impl LeapSecondTable {
    /// Load a leap-second list from disk.
    pub fn load(path: &Path) -> Result<Self, TimeError> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse(&content)?;
        debug!(path = %path.display(), events = table.len(), "loaded leap-second list");
        Ok(table)
    }

    /// Parse a leap-second list from its text content.
    pub fn parse(content: &str) -> Result<Self, TimeError> {
        let mut table = Self::new();
        let mut last_offset_ms: Option<i64> = None;

        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some((year, month, day, offset_s)) = parse_line(line) else {
                warn!(line = lineno + 1, "skipping malformed leap-second line");
                continue;
            };
            if year < FIRST_YEAR {
                continue;
            }
            let offset_ms = (offset_s * 1e3).round() as i64;

            let Some(previous) = last_offset_ms else {
                if offset_ms != BASE_OFFSET_MS {
                    return Err(TimeError::LeapParse(format!(
                        "line {}: first entry from {FIRST_YEAR} must be 10 s, got {offset_s} s",
                        lineno + 1
                    )));
                }
                last_offset_ms = Some(offset_ms);
                continue;
            };

            let step = offset_ms - previous;
            let positive = match step {
                0 => continue,
                1_000 => true,
                -1_000 => false,
                _ => {
                    return Err(TimeError::LeapParse(format!(
                        "line {}: offset changes by {} s, expected ±1 s",
                        lineno + 1,
                        step as f64 / 1e3
                    )));
                }
            };
            let millis = days_from_civil(year, month, day) * MILLIS_PER_DAY;
            table.add_leap_second(LeapEpoch::Civil { millis, nanos: 0 }, positive)?;
            last_offset_ms = Some(offset_ms);
        }

        if last_offset_ms.is_none() {
            return Err(TimeError::LeapParse(format!(
                "no entries dated {FIRST_YEAR} or later"
            )));
        }
        Ok(table)
    }
}

fn parse_line(line: &str) -> Option<(i32, u32, u32, f64)> {
    let mut fields = line.split_whitespace();
    let year: i32 = fields.next()?.parse().ok()?;
    let month = month_from_abbrev(fields.next()?)?;
    let day: u32 = fields.next()?.parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }
    let offset = line.split_once("TAI-UTC=")?.1.split_whitespace().next()?;
    Some((year, month, day, offset.parse().ok()?))
}
