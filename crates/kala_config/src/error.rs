//! Error type for configuration loading and assembly.

use kala_eop::EopError;
use kala_frames::FrameError;
use kala_time::TimeError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("I/O error: {0}")]
    Io(String),
    /// Settings that parse but cannot be assembled.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Eop(#[from] EopError),
    #[error("no default assembly installed")]
    NoDefault,
    #[error("a default assembly is already installed")]
    DefaultAlreadyInstalled,
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
