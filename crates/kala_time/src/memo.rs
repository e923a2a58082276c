//! An instant that remembers its readings in other systems.

use std::cmp::Ordering;
use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::TimeError;
use crate::graph::TimeGraph;
use crate::instant::Instant;
use crate::system::TimeSystemId;

/// Source instant plus every reading materialised from it so far.
///
/// Comparisons prefer a system both sides already hold (lowest id first),
/// then TAI, then any system either side holds.
#[derive(Debug)]
pub struct MemoInstant {
    source: Instant,
    readings: Mutex<HashMap<TimeSystemId, Instant>>,
}

impl MemoInstant {
    pub fn new(source: Instant) -> Self {
        Self {
            source,
            readings: Mutex::new(HashMap::from([(source.system(), source)])),
        }
    }

    pub fn source(&self) -> Instant {
        self.source
    }

    /// Reading in `system`, converting from the source on first request.
    pub fn get(&self, system: TimeSystemId, graph: &TimeGraph) -> Result<Instant, TimeError> {
        if let Some(hit) = self.readings.lock().get(&system) {
            trace!(%system, "memoised reading hit");
            return Ok(*hit);
        }
        let reading = graph.convert(&self.source, system)?;
        self.readings.lock().entry(system).or_insert(reading);
        Ok(reading)
    }

    /// Systems with a materialised reading, in id order.
    pub fn cached_systems(&self) -> Vec<TimeSystemId> {
        let mut systems: Vec<_> = self.readings.lock().keys().copied().collect();
        systems.sort();
        systems
    }

    /// Order two memoised instants.
    pub fn compare(&self, other: &Self, graph: &TimeGraph) -> Result<Ordering, TimeError> {
        let mine = self.cached_systems();
        let theirs = other.cached_systems();

        if let Some(shared) = mine.iter().find(|s| theirs.contains(s)) {
            return self.compare_in(other, *shared, graph);
        }
        let mut first_error = match self.compare_in(other, TimeSystemId::TAI, graph) {
            Ok(order) => return Ok(order),
            Err(e) => e,
        };

        let mut candidates: Vec<_> = mine.into_iter().chain(theirs).collect();
        candidates.sort();
        candidates.dedup();
        for system in candidates {
            match self.compare_in(other, system, graph) {
                Ok(order) => return Ok(order),
                Err(e) => first_error = e,
            }
        }
        Err(first_error)
    }

    /// Whether both denote the same moment.
    pub fn same_moment(&self, other: &Self, graph: &TimeGraph) -> Result<bool, TimeError> {
        Ok(self.compare(other, graph)? == Ordering::Equal)
    }

    fn compare_in(
        &self,
        other: &Self,
        system: TimeSystemId,
        graph: &TimeGraph,
    ) -> Result<Ordering, TimeError> {
        let a = self.get(system, graph)?;
        let b = other.get(system, graph)?;
        Ok(a.raw_cmp(&b).unwrap_or(Ordering::Equal))
    }
}

impl Clone for MemoInstant {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            readings: Mutex::new(self.readings.lock().clone()),
        }
    }
}

impl From<Instant> for MemoInstant {
    fn from(source: Instant) -> Self {
        Self::new(source)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::leap::LeapSecondTable;
    use crate::standard::TimeConfig;

    fn graph() -> TimeGraph {
        TimeGraph::with_leap_table(TimeConfig::default(), Arc::new(LeapSecondTable::iers()))
    }

    #[test]
    fn materialises_once() {
        let g = graph();
        let m = MemoInstant::new(Instant::from_millis(TimeSystemId::UTC, 1_600_000_000_000));
        assert_eq!(m.cached_systems(), vec![TimeSystemId::UTC]);
        let tai = m.get(TimeSystemId::TAI, &g).unwrap();
        assert_eq!(tai.millis(), 1_600_000_037_000);
        assert_eq!(m.cached_systems(), vec![TimeSystemId::TAI, TimeSystemId::UTC]);
    }

    #[test]
    fn compares_across_systems() {
        let g = graph();
        let a = MemoInstant::new(Instant::from_millis(TimeSystemId::UTC, 1_600_000_000_000));
        let b = MemoInstant::new(Instant::from_millis(TimeSystemId::TT, 1_600_000_069_184));
        assert!(a.same_moment(&b, &g).unwrap());

        let later = MemoInstant::new(Instant::from_millis(TimeSystemId::GPS, 1_600_000_018_001));
        assert_eq!(a.compare(&later, &g).unwrap(), Ordering::Less);
        assert_eq!(later.compare(&a, &g).unwrap(), Ordering::Greater);
    }

    #[test]
    fn compare_with_itself() {
        let g = graph();
        let a = MemoInstant::new(Instant::from_millis(TimeSystemId::TDB, 0));
        assert!(a.same_moment(&a, &g).unwrap());
    }
}
