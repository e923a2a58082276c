//! Configuration for the time and Earth-orientation stack.
//!
//! [`KalaConfig`] is read from TOML; [`Assembly::from_config`] builds the
//! time graph, leap table, precession model and orientation table it
//! describes. One assembly may be installed as the process-wide default
//! with [`install_default`].

pub mod assembly;
pub mod config;
pub mod error;

pub use assembly::{Assembly, default_assembly, install_default};
pub use config::{EopSection, KalaConfig, ModelKind, PrecessionSection, TdbSection, TimeSection};
pub use error::ConfigError;
