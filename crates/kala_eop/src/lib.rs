//! Earth-orientation parameters and the rotation between the terrestrial
//! and celestial frames.
//!
//! - [`EarthOrientationTable`]: measured rows interpolated with four-point
//!   Lagrange polynomials, optionally corrected for ocean tides
//! - [`EarthOrientation`]: the value produced for one instant, with polar
//!   motion, Earth rotation and precession-nutation rotations
//! - [`register_ut1`]: UT1 as a rotational system of a [`kala_time::TimeGraph`]
//! - [`parse_finals`]: the IERS `finals2000A` bulletin

pub mod error;
pub mod finals;
pub mod orientation;
pub mod row;
pub mod table;
pub mod tidal_correction;
pub mod ut1;

pub use error::EopError;
pub use finals::parse_finals;
pub use orientation::EarthOrientation;
pub use row::{EarthOrientationRow, PolarMotion, PrecessionCorrection};
pub use table::{EarthOrientationTable, EopValues};
pub use tidal_correction::{TidalCorrection, TidalCorrectionModel};
pub use ut1::register_ut1;
