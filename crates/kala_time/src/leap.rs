//! Leap-second bookkeeping between an atomic scale and its civil companion.
//!
//! Each event is stored twice: as the civil count of the first second after
//! the change, and as the atomic count of that same moment. Atomic minus
//! civil is `10 s + 1 s × (positive − negative)` events so far.
//!
//! A positive event inserts a second: the civil reading of the inserted
//! second repeats the count of the second before the event and carries the
//! instant's leap-second flag. A negative event removes the second before it;
//! civil readings inside that second do not exist.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::TimeError;
use crate::instant::Instant;
use crate::julian::{MILLIS_PER_DAY, days_from_civil};

/// Atomic minus civil before the first cataloged event, in milliseconds.
pub const BASE_OFFSET_MS: i64 = 10_000;

const SECOND_MS: i64 = 1_000;

/// Effective dates of every positive leap second to date (civil midnight
/// following the inserted second).
const IERS_POSITIVE: [(i32, u32, u32); 27] = [
    (1972, 7, 1),
    (1973, 1, 1),
    (1974, 1, 1),
    (1975, 1, 1),
    (1976, 1, 1),
    (1977, 1, 1),
    (1978, 1, 1),
    (1979, 1, 1),
    (1980, 1, 1),
    (1981, 7, 1),
    (1982, 7, 1),
    (1983, 7, 1),
    (1985, 7, 1),
    (1988, 1, 1),
    (1990, 1, 1),
    (1991, 1, 1),
    (1992, 7, 1),
    (1993, 7, 1),
    (1994, 7, 1),
    (1996, 1, 1),
    (1997, 7, 1),
    (1999, 1, 1),
    (2006, 1, 1),
    (2009, 1, 1),
    (2012, 7, 1),
    (2015, 7, 1),
    (2017, 1, 1),
];

/// Where a new leap event is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeapEpoch {
    /// Civil count of the first second after the change.
    Civil { millis: i64, nanos: u32 },
    /// Atomic count of the same moment.
    Atomic { millis: i64, nanos: u32 },
}

/// One cataloged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeapEvent {
    pub civil_millis: i64,
    pub atomic_millis: i64,
    pub positive: bool,
}

/// Chronological leap-second events with cached lookup cursors.
#[derive(Debug, Default)]
pub struct LeapSecondTable {
    pos_civil: Vec<i64>,
    pos_atomic: Vec<i64>,
    neg_civil: Vec<i64>,
    neg_atomic: Vec<i64>,
    cursors: [AtomicUsize; 4],
}

const POS_CIVIL: usize = 0;
const POS_ATOMIC: usize = 1;
const NEG_CIVIL: usize = 2;
const NEG_ATOMIC: usize = 3;

impl LeapSecondTable {
    /// Empty table: atomic minus civil is a constant 10 s.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every positive leap second from 1972-07-01 through 2017-01-01.
    pub fn iers() -> Self {
        let mut table = Self::new();
        table.pos_civil = IERS_POSITIVE
            .iter()
            .map(|&(y, m, d)| days_from_civil(y, m, d) * MILLIS_PER_DAY)
            .collect();
        table.rebuild_atomic();
        table
    }

    /// Append an event. `epoch` must be a whole second strictly later than
    /// the previous event of the same sign.
    pub fn add_leap_second(&mut self, epoch: LeapEpoch, positive: bool) -> Result<(), TimeError> {
        let (millis, nanos) = match epoch {
            LeapEpoch::Civil { millis, nanos } | LeapEpoch::Atomic { millis, nanos } => {
                (millis, nanos)
            }
        };
        if nanos != 0 || millis.rem_euclid(SECOND_MS) != 0 {
            return Err(TimeError::LeapNotWholeSecond(format!("{millis} ms + {nanos} ns")));
        }

        let (same_civil, same_atomic) = if positive {
            (&self.pos_civil, &self.pos_atomic)
        } else {
            (&self.neg_civil, &self.neg_atomic)
        };
        let previous = match epoch {
            LeapEpoch::Civil { .. } => same_civil.last(),
            LeapEpoch::Atomic { .. } => same_atomic.last(),
        };
        if let Some(&previous) = previous {
            if millis <= previous {
                return Err(TimeError::OutOfOrder {
                    what: "leap second",
                    previous: format!("{previous} ms"),
                    offered: format!("{millis} ms"),
                });
            }
        }

        let civil = match epoch {
            LeapEpoch::Civil { .. } => millis,
            LeapEpoch::Atomic { .. } => {
                let before = self.pos_atomic.partition_point(|&a| a < millis) as i64
                    - self.neg_atomic.partition_point(|&a| a < millis) as i64;
                let after = if positive { before + 1 } else { before - 1 };
                millis - (BASE_OFFSET_MS + SECOND_MS * after)
            }
        };
        if positive {
            self.pos_civil.push(civil);
        } else {
            self.neg_civil.push(civil);
        }
        self.rebuild_atomic();
        Ok(())
    }

    fn rebuild_atomic(&mut self) {
        self.pos_atomic.clear();
        self.neg_atomic.clear();
        let (mut p, mut n, mut net) = (0, 0, 0_i64);
        while p < self.pos_civil.len() || n < self.neg_civil.len() {
            let take_positive = match (self.pos_civil.get(p), self.neg_civil.get(n)) {
                (Some(a), Some(b)) => a <= b,
                (Some(_), None) => true,
                _ => false,
            };
            if take_positive {
                net += 1;
                self.pos_atomic
                    .push(self.pos_civil[p] + BASE_OFFSET_MS + SECOND_MS * net);
                p += 1;
            } else {
                net -= 1;
                self.neg_atomic
                    .push(self.neg_civil[n] + BASE_OFFSET_MS + SECOND_MS * net);
                n += 1;
            }
        }
        for cursor in &mut self.cursors {
            *cursor.get_mut() = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.pos_civil.len() + self.neg_civil.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every event in chronological order.
    pub fn events(&self) -> Vec<LeapEvent> {
        let mut events: Vec<LeapEvent> = self
            .pos_civil
            .iter()
            .zip(&self.pos_atomic)
            .map(|(&c, &a)| LeapEvent {
                civil_millis: c,
                atomic_millis: a,
                positive: true,
            })
            .chain(
                self.neg_civil
                    .iter()
                    .zip(&self.neg_atomic)
                    .map(|(&c, &a)| LeapEvent {
                        civil_millis: c,
                        atomic_millis: a,
                        positive: false,
                    }),
            )
            .collect();
        events.sort_by_key(|e| e.atomic_millis);
        events
    }

    fn count(&self, which: usize, t: i64) -> usize {
        let list = match which {
            POS_CIVIL => &self.pos_civil,
            POS_ATOMIC => &self.pos_atomic,
            NEG_CIVIL => &self.neg_civil,
            _ => &self.neg_atomic,
        };
        let cursor = &self.cursors[which];
        let mut n = cursor.load(Ordering::Relaxed).min(list.len());
        while n < list.len() && list[n] <= t {
            n += 1;
        }
        while n > 0 && list[n - 1] > t {
            n -= 1;
        }
        cursor.store(n, Ordering::Relaxed);
        n
    }

    /// Positive events whose civil epoch is on or before `millis`.
    pub fn positive_on_or_before_civil(&self, millis: i64) -> usize {
        self.count(POS_CIVIL, millis)
    }

    /// Positive events whose atomic epoch is on or before `millis`.
    pub fn positive_on_or_before_atomic(&self, millis: i64) -> usize {
        self.count(POS_ATOMIC, millis)
    }

    /// Negative events whose civil epoch is on or before `millis`.
    pub fn negative_on_or_before_civil(&self, millis: i64) -> usize {
        self.count(NEG_CIVIL, millis)
    }

    /// Negative events whose atomic epoch is on or before `millis`.
    pub fn negative_on_or_before_atomic(&self, millis: i64) -> usize {
        self.count(NEG_ATOMIC, millis)
    }

    fn offset(pos: usize, neg: usize) -> i64 {
        BASE_OFFSET_MS + SECOND_MS * (pos as i64 - neg as i64)
    }

    /// Atomic minus civil in seconds at an atomic count.
    pub fn tai_minus_utc_at_atomic(&self, millis: i64) -> f64 {
        let off = Self::offset(
            self.positive_on_or_before_atomic(millis),
            self.negative_on_or_before_atomic(millis),
        );
        off as f64 / 1e3
    }

    /// Atomic minus civil in seconds at an (unflagged) civil count.
    pub fn tai_minus_utc_at_civil(&self, millis: i64) -> f64 {
        let off = Self::offset(
            self.positive_on_or_before_civil(millis),
            self.negative_on_or_before_civil(millis),
        );
        off as f64 / 1e3
    }

    /// Civil reading of an atomic instant. Readings inside an inserted second
    /// come back flagged. The system tag is left unchanged.
    pub fn to_civil(&self, atomic: &Instant) -> Instant {
        let a = atomic.millis();
        let pos = self.positive_on_or_before_atomic(a);
        let neg = self.negative_on_or_before_atomic(a);
        let off = Self::offset(pos, neg);

        let inside_inserted = self
            .pos_atomic
            .get(pos)
            .is_some_and(|&next| a >= next - SECOND_MS);
        if inside_inserted {
            Instant::from_parts(atomic.system(), a - off - SECOND_MS, atomic.nanos(), true)
        } else {
            Instant::from_parts(atomic.system(), a - off, atomic.nanos(), false)
        }
    }

    /// Atomic reading of a civil instant, validating it first.
    pub fn to_atomic(&self, civil: &Instant) -> Result<Instant, TimeError> {
        let t = civil.millis();
        let pos = self.positive_on_or_before_civil(t);
        let neg = self.negative_on_or_before_civil(t);
        let off = Self::offset(pos, neg);

        if civil.is_leap_second() {
            let second_end = t.div_euclid(SECOND_MS) * SECOND_MS + SECOND_MS;
            if self.pos_civil.get(pos) != Some(&second_end) {
                return Err(TimeError::InvalidCivilTime(format!(
                    "{t} ms is flagged as a leap second but no leap second ends at {second_end} ms"
                )));
            }
            return Ok(Instant::from_parts(
                civil.system(),
                t + off + SECOND_MS,
                civil.nanos(),
                false,
            ));
        }

        if let Some(&skip_end) = self.neg_civil.get(neg) {
            if t >= skip_end - SECOND_MS {
                return Err(TimeError::InvalidCivilTime(format!(
                    "{t} ms falls in the second removed before {skip_end} ms"
                )));
            }
        }
        Ok(Instant::from_parts(civil.system(), t + off, civil.nanos(), false))
    }

    /// Whether a civil reading exists under this table.
    pub fn is_valid_civil(&self, civil: &Instant) -> bool {
        self.to_atomic(civil).is_ok()
    }
}
