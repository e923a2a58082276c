//! Error type for Earth-orientation lookups and bulletin parsing.

use kala_frames::FrameError;
use kala_time::{TimeError, TimeSystemId};
use thiserror::Error;

/// Errors from the orientation table, its parsers or the rotations it feeds.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EopError {
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Lookup on a table with no rows.
    #[error("Earth-orientation table has no rows")]
    EmptyTable,
    /// An instant read in the wrong time system.
    #[error("expected an instant in {expected}, got {got}")]
    WrongTimeSystem {
        expected: TimeSystemId,
        got: TimeSystemId,
    },
    /// The table has no UT1 system in the graph it was queried with.
    #[error("no UT1 system registered for this Earth-orientation table")]
    NotRegistered,
    /// IERS bulletin parsing failed.
    #[error("bulletin parse error: {0}")]
    BulletinParse(String),
    /// Tidal-correction coefficient parsing failed.
    #[error("tidal correction parse error: {0}")]
    TidalParse(String),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for EopError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
