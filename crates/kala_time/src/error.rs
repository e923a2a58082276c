//! Error types for time-system conversions and leap-second bookkeeping.

use thiserror::Error;

use crate::system::TimeSystemId;

/// Errors from instant arithmetic, graph conversion, or leap-second handling.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimeError {
    /// The graph search exhausted every candidate path.
    #[error("no conversion from {from} to {to}")]
    NoConversion { from: String, to: String },
    /// A civil reading that does not exist under the configured leap table.
    #[error("invalid civil time: {0}")]
    InvalidCivilTime(String),
    /// Civil/atomic conversion attempted before a leap table was configured.
    #[error("no leap-second table configured for {0}")]
    MissingLeapTable(String),
    /// Insertion that would break chronological order.
    #[error("{what} out of chronological order: {offered} does not follow {previous}")]
    OutOfOrder {
        what: &'static str,
        previous: String,
        offered: String,
    },
    /// Leap event not aligned to a whole second.
    #[error("leap second must fall on a whole second, got {0}")]
    LeapNotWholeSecond(String),
    /// Sub-millisecond remainder outside `0..1_000_000`.
    #[error("nanosecond remainder {0} must be below 1_000_000")]
    InvalidNanos(u32),
    /// A time-system id not known to this graph.
    #[error("unknown time system {0:?}")]
    UnknownSystem(TimeSystemId),
    /// Leap-second list parsing failed.
    #[error("leap-second list parse error: {0}")]
    LeapParse(String),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TimeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
