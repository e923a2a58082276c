//! Time systems, conversions between them, and leap-second bookkeeping.
//!
//! This crate provides:
//! - [`Instant`]: a millisecond count plus nanosecond remainder tagged with
//!   the time system it is read in
//! - [`TimeGraph`]: registered time systems, their primitive conversions and
//!   a memoised path search that composes conversions
//! - the built-in systems TAI, TT, TDB, GPS and UTC
//! - [`LeapSecondTable`]: atomic/civil conversion and civil-time validation,
//!   loadable from the USNO `tai-utc.dat` list
//! - Earth Rotation Angle and GMST
//! - [`MemoInstant`]: an instant that keeps its converted readings

pub mod dynamical;
pub mod error;
pub mod graph;
pub mod instant;
pub mod julian;
pub mod leap;
pub mod leap_file;
pub mod memo;
pub mod sidereal;
pub mod standard;
pub mod system;

pub use dynamical::{TAI_MINUS_GPS_MS, TT_MINUS_TAI_MS, TdbModel, seconds_past_j2000};
pub use error::TimeError;
pub use graph::{DEFAULT_SEARCH_DEPTH, EdgeOwner, SystemKey, TimeGraph};
pub use instant::Instant;
pub use julian::{J2000_JD, J2000_MILLIS, MILLIS_PER_DAY, SECONDS_PER_DAY};
pub use leap::{LeapEpoch, LeapEvent, LeapSecondTable};
pub use memo::MemoInstant;
pub use sidereal::{earth_rotation_angle, gmst, ut1_days_since_j2000};
pub use standard::TimeConfig;
pub use system::{Conversion, ConversionEdge, ConvertFn, TimeSystemId, TimeSystemInfo, TimeSystemKind};
