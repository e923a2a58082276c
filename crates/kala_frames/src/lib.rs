//! Fundamental arguments, harmonic series and the IAU 2006 precession-nutation
//! models used to orient the Earth in the celestial frame.
//!
//! - [`TidalArguments`]: the fourteen TDB angles plus the Earth-rotation phase
//! - [`HarmonicTerm`], [`DiurnalExpansion`], [`PrecessionExpansion`]
//! - [`PrecessionModel`] with the full [`Iau2006Series`] (IERS tables) and the
//!   table-free [`Iau2006Truncated`]
//! - [`PrecessionCache`]: an opt-in time-bucketed approximation layer
//! - [`Rotation`]: passive 3×3 rotation matrices

pub mod cache;
pub mod error;
pub mod harmonic;
pub mod iers_tables;
pub mod precession;
pub mod rotation;
pub mod tidal;
pub mod truncated;

pub use cache::PrecessionCache;
pub use error::FrameError;
pub use harmonic::{DiurnalExpansion, HarmonicTerm, MICRO_ARCSEC_TO_RAD, PrecessionExpansion};
pub use iers_tables::{load_series, parse_series};
pub use precession::{CipCoordinates, Iau2006Series, PrecessionModel, cip_rotation};
pub use rotation::Rotation;
pub use tidal::{ARGUMENT_COUNT, GAMMA, TidalArguments, Weights};
pub use truncated::Iau2006Truncated;
