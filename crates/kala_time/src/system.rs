//! Time-system identities, conversion edges and composed conversions.

use std::fmt;
use std::sync::Arc;

use crate::error::TimeError;
use crate::instant::Instant;

/// Opaque identity of a time system registered in a [`TimeGraph`](crate::TimeGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSystemId(pub(crate) u32);

impl TimeSystemId {
    /// International Atomic Time.
    pub const TAI: Self = Self(0);
    /// Terrestrial Time.
    pub const TT: Self = Self(1);
    /// Barycentric Dynamical Time.
    pub const TDB: Self = Self(2);
    /// GPS system time.
    pub const GPS: Self = Self(3);
    /// Coordinated Universal Time under the graph's default leap table.
    pub const UTC: Self = Self(4);

    /// Raw index, stable for the lifetime of the graph.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TimeSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Physical family a time system belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSystemKind {
    /// Uniform atomic time (TAI, GPS).
    Atomic,
    /// Atomic time stepped by leap seconds (UTC).
    Civil,
    /// Time argument of solar-system dynamics (TT, TDB).
    Dynamical,
    /// Time tied to the Earth rotation angle (UT1).
    Rotational,
}

/// Descriptive data of a registered time system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSystemInfo {
    pub id: TimeSystemId,
    pub name: String,
    pub abbreviation: String,
    pub kind: TimeSystemKind,
}

/// Conversion function carried by an edge.
///
/// The returned instant's system is overwritten with the edge target, so
/// implementations only need to produce the right count.
pub type ConvertFn = dyn Fn(&Instant) -> Result<Instant, TimeError> + Send + Sync;

/// A primitive, directed conversion between two time systems.
pub struct ConversionEdge {
    pub(crate) from: TimeSystemId,
    pub(crate) to: TimeSystemId,
    pub(crate) cost: usize,
    pub(crate) apply: Arc<ConvertFn>,
}

impl ConversionEdge {
    pub fn from(&self) -> TimeSystemId {
        self.from
    }

    pub fn to(&self) -> TimeSystemId {
        self.to
    }

    pub fn cost(&self) -> usize {
        self.cost
    }

    fn convert(&self, instant: &Instant) -> Result<Instant, TimeError> {
        let mut out = (self.apply)(instant)?;
        out.system = self.to;
        Ok(out)
    }
}

impl fmt::Debug for ConversionEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionEdge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

/// A resolved conversion: a single edge or a chain of them.
#[derive(Debug, Clone)]
pub enum Conversion {
    /// Source and target are the same system.
    Identity(TimeSystemId),
    /// One primitive edge.
    Direct(Arc<ConversionEdge>),
    /// `first` followed by `second`.
    Composite {
        first: Arc<Conversion>,
        second: Arc<Conversion>,
        cost: usize,
        hops: usize,
    },
}

impl Conversion {
    /// Chain two conversions; `first.to()` must equal `second.from()`.
    pub(crate) fn compose(first: Arc<Conversion>, second: Arc<Conversion>) -> Self {
        debug_assert_eq!(first.to(), second.from());
        let cost = first.cost() + second.cost();
        let hops = first.hops() + second.hops();
        Self::Composite {
            first,
            second,
            cost,
            hops,
        }
    }

    pub fn from(&self) -> TimeSystemId {
        match self {
            Self::Identity(id) => *id,
            Self::Direct(edge) => edge.from,
            Self::Composite { first, .. } => first.from(),
        }
    }

    pub fn to(&self) -> TimeSystemId {
        match self {
            Self::Identity(id) => *id,
            Self::Direct(edge) => edge.to,
            Self::Composite { second, .. } => second.to(),
        }
    }

    /// Summed edge cost; zero for the identity.
    pub fn cost(&self) -> usize {
        match self {
            Self::Identity(_) => 0,
            Self::Direct(edge) => edge.cost,
            Self::Composite { cost, .. } => *cost,
        }
    }

    /// Number of primitive edges.
    pub fn hops(&self) -> usize {
        match self {
            Self::Identity(_) => 0,
            Self::Direct(_) => 1,
            Self::Composite { hops, .. } => *hops,
        }
    }

    /// Ordering key used to pick between candidate paths.
    pub(crate) fn rank(&self) -> (usize, usize) {
        (self.cost(), self.hops())
    }

    /// Systems visited, source first.
    pub fn path(&self) -> Vec<TimeSystemId> {
        let mut out = vec![self.from()];
        self.push_targets(&mut out);
        out
    }

    fn push_targets(&self, out: &mut Vec<TimeSystemId>) {
        match self {
            Self::Identity(_) => {}
            Self::Direct(edge) => out.push(edge.to),
            Self::Composite { first, second, .. } => {
                first.push_targets(out);
                second.push_targets(out);
            }
        }
    }

    /// Apply the conversion to an instant of the source system.
    pub fn apply(&self, instant: &Instant) -> Result<Instant, TimeError> {
        match self {
            Self::Identity(_) => Ok(*instant),
            Self::Direct(edge) => edge.convert(instant),
            Self::Composite { first, second, .. } => second.apply(&first.apply(instant)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: u32, to: u32, cost: usize, shift_ms: i64) -> Arc<Conversion> {
        let apply: Arc<ConvertFn> = Arc::new(move |i: &Instant| {
            let mut out = *i;
            out.set_time(i.millis() + shift_ms, i.nanos())?;
            Ok(out)
        });
        Arc::new(Conversion::Direct(Arc::new(ConversionEdge {
            from: TimeSystemId(from),
            to: TimeSystemId(to),
            cost,
            apply,
        })))
    }

    #[test]
    fn composite_sums_cost_and_hops() {
        let c = Conversion::compose(edge(0, 1, 2, 10), edge(1, 2, 3, 5));
        assert_eq!(c.cost(), 5);
        assert_eq!(c.hops(), 2);
        assert_eq!(c.from(), TimeSystemId(0));
        assert_eq!(c.to(), TimeSystemId(2));
        assert_eq!(
            c.path(),
            vec![TimeSystemId(0), TimeSystemId(1), TimeSystemId(2)]
        );
    }

    #[test]
    fn composite_applies_in_order_and_stamps_target() {
        let c = Conversion::compose(edge(0, 1, 1, 10), edge(1, 2, 1, 5));
        let start = Instant::new(TimeSystemId(0), 100, 0).unwrap();
        let out = c.apply(&start).unwrap();
        assert_eq!(out.millis(), 115);
        assert_eq!(out.system(), TimeSystemId(2));
    }

    #[test]
    fn identity_is_free() {
        let c = Conversion::Identity(TimeSystemId::TAI);
        assert_eq!(c.cost(), 0);
        assert_eq!(c.hops(), 0);
        assert_eq!(c.path(), vec![TimeSystemId::TAI]);
    }
}
