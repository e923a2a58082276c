//! Error types for frame and precession computations.

use thiserror::Error;

/// Errors from fundamental arguments, harmonic series or coefficient tables.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FrameError {
    /// A term uses the Earth-rotation phase but the arguments were built
    /// without a UT1 companion.
    #[error("Earth-rotation phase requested but no UT1 instant was supplied")]
    MissingRotationPhase,
    /// Expansion shape is inconsistent.
    #[error("invalid expansion: {0}")]
    InvalidExpansion(String),
    /// Coefficient table parsing failed.
    #[error("coefficient table parse error: {0}")]
    TableParse(String),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FrameError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
