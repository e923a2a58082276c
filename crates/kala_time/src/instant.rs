//! Millisecond-plus-remainder instants tagged with their time system.

use std::cmp::Ordering;

use crate::error::TimeError;
use crate::graph::TimeGraph;
use crate::julian;
use crate::system::TimeSystemId;

const NANOS_PER_MILLI: i64 = 1_000_000;

/// An instant: whole milliseconds since 1970-01-01T00:00:00 in `system`,
/// plus a sub-millisecond remainder in nanoseconds.
///
/// The value is a plain `(system, count)` pair. Anything that needs a
/// different system goes through a [`TimeGraph`]. Two instants of the same
/// system compare by count; instants of different systems are only
/// comparable through [`Instant::compare`].
///
/// In civil systems `leap_second` marks a reading inside an inserted second.
/// Such a reading repeats the civil count of the second before it and sorts
/// after every unflagged reading of that second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instant {
    millis: i64,
    nanos: u32,
    leap_second: bool,
    pub(crate) system: TimeSystemId,
}

impl Instant {
    /// Create an instant; `nanos` must be below one millisecond.
    pub fn new(system: TimeSystemId, millis: i64, nanos: u32) -> Result<Self, TimeError> {
        if i64::from(nanos) >= NANOS_PER_MILLI {
            return Err(TimeError::InvalidNanos(nanos));
        }
        Ok(Self {
            millis,
            nanos,
            leap_second: false,
            system,
        })
    }

    /// Create an instant at a whole millisecond.
    pub const fn from_millis(system: TimeSystemId, millis: i64) -> Self {
        Self {
            millis,
            nanos: 0,
            leap_second: false,
            system,
        }
    }

    /// Assemble an instant from parts already known to be valid.
    pub(crate) const fn from_parts(
        system: TimeSystemId,
        millis: i64,
        nanos: u32,
        leap_second: bool,
    ) -> Self {
        Self {
            millis,
            nanos,
            leap_second,
            system,
        }
    }

    /// Create an instant from a Julian Date read in `system`.
    pub fn from_jd(system: TimeSystemId, jd: f64) -> Self {
        let (millis, nanos) = julian::jd_to_millis(jd);
        Self {
            millis,
            nanos,
            leap_second: false,
            system,
        }
    }

    /// Create an instant from a Modified Julian Date read in `system`.
    pub fn from_mjd(system: TimeSystemId, mjd: f64) -> Self {
        let (millis, nanos) = julian::mjd_to_millis(mjd);
        Self {
            millis,
            nanos,
            leap_second: false,
            system,
        }
    }

    /// Mark (or unmark) this civil reading as lying inside an inserted second.
    pub fn with_leap_second(mut self, leap_second: bool) -> Self {
        self.leap_second = leap_second;
        self
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    pub fn system(&self) -> TimeSystemId {
        self.system
    }

    pub fn is_leap_second(&self) -> bool {
        self.leap_second
    }

    /// Whether the count sits exactly on a whole second.
    pub fn is_whole_second(&self) -> bool {
        self.nanos == 0 && self.millis.rem_euclid(1000) == 0
    }

    /// Replace the count. Clears the leap-second flag.
    pub fn set_time(&mut self, millis: i64, nanos: u32) -> Result<(), TimeError> {
        if i64::from(nanos) >= NANOS_PER_MILLI {
            return Err(TimeError::InvalidNanos(nanos));
        }
        self.millis = millis;
        self.nanos = nanos;
        self.leap_second = false;
        Ok(())
    }

    /// Advance by `seconds` (negative moves backward). Clears the leap-second flag.
    ///
    /// The seconds are split into whole milliseconds (truncated toward zero)
    /// and a nanosecond remainder rounded to the nearest nanosecond. The split
    /// is odd-symmetric, so `increment(s)` followed by `increment(-s)` restores
    /// the original count exactly.
    pub fn increment(&mut self, seconds: f64) {
        let total_ms = seconds * 1000.0;
        let whole_ms = total_ms.trunc();
        let frac_ns = ((total_ms - whole_ms) * 1e6).round() as i64;

        let nanos = i64::from(self.nanos) + frac_ns;
        self.millis += whole_ms as i64 + nanos.div_euclid(NANOS_PER_MILLI);
        self.nanos = nanos.rem_euclid(NANOS_PER_MILLI) as u32;
        self.leap_second = false;
    }

    /// Copy advanced by `seconds`.
    pub fn incremented(mut self, seconds: f64) -> Self {
        self.increment(seconds);
        self
    }

    /// Copy advanced by whole milliseconds.
    pub fn plus_millis(mut self, millis: i64) -> Self {
        self.millis += millis;
        self.leap_second = false;
        self
    }

    /// Order two readings of the same system without conversion.
    ///
    /// Returns `None` when the systems differ.
    pub fn raw_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.system != other.system {
            return None;
        }
        Some(self.order_key().cmp(&other.order_key()))
    }

    fn order_key(&self) -> (i64, bool, i64, u32) {
        (
            self.millis.div_euclid(1000),
            self.leap_second,
            self.millis.rem_euclid(1000),
            self.nanos,
        )
    }

    /// Count difference in seconds between two readings of the same system.
    ///
    /// Returns `None` when the systems differ. In civil systems the result is
    /// a difference of civil readings; leap seconds are not counted.
    pub fn raw_seconds_after(&self, other: &Self) -> Option<f64> {
        if self.system != other.system {
            return None;
        }
        let dms = (self.millis - other.millis) as f64;
        let dns = f64::from(self.nanos) - f64::from(other.nanos);
        Some(dms * 1e-3 + dns * 1e-9)
    }

    /// Reading of this instant in another system.
    pub fn convert_to(&self, system: TimeSystemId, graph: &TimeGraph) -> Result<Self, TimeError> {
        graph.convert(self, system)
    }

    /// Seconds from `other` to `self`, measured in `self`'s system.
    ///
    /// `other` is converted into `self`'s system; if that fails, `self` is
    /// converted into `other`'s system instead.
    pub fn seconds_after(&self, other: &Self, graph: &TimeGraph) -> Result<f64, TimeError> {
        let (a, b) = self.common_pair(other, graph)?;
        Ok(a.raw_seconds_after(&b).unwrap_or_default())
    }

    /// Order two instants, converting as in [`Instant::seconds_after`].
    pub fn compare(&self, other: &Self, graph: &TimeGraph) -> Result<Ordering, TimeError> {
        let (a, b) = self.common_pair(other, graph)?;
        Ok(a.raw_cmp(&b).unwrap_or(Ordering::Equal))
    }

    fn common_pair(&self, other: &Self, graph: &TimeGraph) -> Result<(Self, Self), TimeError> {
        if self.system == other.system {
            return Ok((*self, *other));
        }
        match graph.convert(other, self.system) {
            Ok(converted) => Ok((*self, converted)),
            Err(first) => match graph.convert(self, other.system) {
                Ok(converted) => Ok((converted, *other)),
                Err(_) => Err(first),
            },
        }
    }

    /// Julian Date of this reading in its own system.
    pub fn julian_date(&self) -> f64 {
        julian::millis_to_jd(self.millis, self.nanos)
    }

    /// Modified Julian Date of this reading in its own system.
    pub fn modified_julian_date(&self) -> f64 {
        julian::millis_to_mjd(self.millis, self.nanos)
    }

    /// Julian centuries since J2000.0 of this reading in its own system.
    pub fn julian_centuries(&self) -> f64 {
        julian::julian_centuries(self.millis, self.nanos)
    }
}
