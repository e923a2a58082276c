//! The built-in time systems and their conversions.
//!
//! | id | system | edges |
//! |----|--------|-------|
//! | 0  | TAI    | → TT |
//! | 1  | TT     | → TAI, → TDB |
//! | 2  | TDB    | → TT |
//! | 3  | GPS    | → TAI; TAI → GPS declared by GPS |
//! | 4  | UTC    | → TAI; TAI → UTC declared by UTC |
//!
//! Further civil systems (one per distinct leap table) are added with
//! [`TimeGraph::register_civil`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::dynamical::{TAI_MINUS_GPS_MS, TT_MINUS_TAI_MS, TdbModel};
use crate::error::TimeError;
use crate::graph::{DEFAULT_SEARCH_DEPTH, EdgeOwner, SystemKey, TimeGraph};
use crate::instant::Instant;
use crate::leap::LeapSecondTable;
use crate::system::{TimeSystemId, TimeSystemKind};

type LeapCell = Arc<OnceLock<Arc<LeapSecondTable>>>;

/// Options of the built-in graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeConfig {
    /// Recursion limit of the path search.
    pub search_depth: usize,
    /// TDB − TT model.
    pub tdb: TdbModel,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            search_depth: DEFAULT_SEARCH_DEPTH,
            tdb: TdbModel::default(),
        }
    }
}

/// State the built-in systems share with the graph.
#[derive(Debug, Default)]
pub(crate) struct StandardParts {
    pub(crate) tdb: TdbModel,
    pub(crate) civil: HashMap<TimeSystemId, LeapCell>,
}

impl TimeGraph {
    /// Graph with TAI, TT, TDB, GPS and UTC registered under their fixed ids.
    ///
    /// UTC conversions fail with [`TimeError::MissingLeapTable`] until a table
    /// is installed with [`TimeGraph::set_leap_table`].
    pub fn new(config: TimeConfig) -> Self {
        let mut graph = Self::empty(
            config.search_depth,
            StandardParts {
                tdb: config.tdb,
                civil: HashMap::new(),
            },
        );

        let tai = graph.add_system("International Atomic Time", "TAI", TimeSystemKind::Atomic);
        let tt = graph.add_system("Terrestrial Time", "TT", TimeSystemKind::Dynamical);
        let tdb = graph.add_system("Barycentric Dynamical Time", "TDB", TimeSystemKind::Dynamical);
        let gps = graph.add_system("GPS Time", "GPS", TimeSystemKind::Atomic);
        debug_assert_eq!(
            [tai, tt, tdb, gps],
            [
                TimeSystemId::TAI,
                TimeSystemId::TT,
                TimeSystemId::TDB,
                TimeSystemId::GPS
            ]
        );

        graph.push_edge(EdgeOwner::Source, tai, tt, 1, shift(TT_MINUS_TAI_MS));
        graph.push_edge(EdgeOwner::Source, tt, tai, 1, shift(-TT_MINUS_TAI_MS));

        let model = config.tdb;
        graph.push_edge(
            EdgeOwner::Source,
            tt,
            tdb,
            1,
            Arc::new(move |i: &Instant| Ok(model.tt_to_tdb(i))),
        );
        graph.push_edge(
            EdgeOwner::Source,
            tdb,
            tt,
            1,
            Arc::new(move |i: &Instant| Ok(model.tdb_to_tt(i))),
        );

        graph.push_edge(EdgeOwner::Source, gps, tai, 1, shift(TAI_MINUS_GPS_MS));
        graph.push_edge(EdgeOwner::Target, tai, gps, 1, shift(-TAI_MINUS_GPS_MS));

        let cell: LeapCell = Arc::new(OnceLock::new());
        let key = SystemKey::of(TimeSystemKind::Civil, &cell);
        let (utc, _) = graph.find_or_add_system(key, "Coordinated Universal Time", "UTC");
        debug_assert_eq!(utc, TimeSystemId::UTC);
        graph.add_civil_edges(utc, cell);
        graph
    }

    /// Built-in graph with the default leap table already installed.
    pub fn with_leap_table(config: TimeConfig, table: Arc<LeapSecondTable>) -> Self {
        let graph = Self::new(config);
        graph.set_leap_table(table);
        graph
    }

    /// Install the leap table behind [`TimeSystemId::UTC`].
    ///
    /// Returns `false` when a table was already installed; the first one stays.
    pub fn set_leap_table(&self, table: Arc<LeapSecondTable>) -> bool {
        let installed = self
            .extras
            .civil
            .get(&TimeSystemId::UTC)
            .is_some_and(|cell| cell.set(table).is_ok());
        if installed {
            debug!("installed default leap-second table");
        }
        installed
    }

    /// Register a civil system for `table`, or return the one already
    /// registered for it.
    pub fn register_civil(&mut self, table: Arc<LeapSecondTable>, abbreviation: &str) -> TimeSystemId {
        let key = SystemKey::of(TimeSystemKind::Civil, &table);
        let (id, created) = self.find_or_add_system(
            key,
            format!("Civil time ({abbreviation})"),
            abbreviation,
        );
        if created {
            let cell: LeapCell = Arc::new(OnceLock::new());
            let _ = cell.set(table);
            self.add_civil_edges(id, cell);
            debug!(system = %id, abbreviation, "registered civil time system");
        }
        id
    }

    fn add_civil_edges(&mut self, civil: TimeSystemId, cell: LeapCell) {
        let to_atomic = Arc::clone(&cell);
        self.push_edge(
            EdgeOwner::Source,
            civil,
            TimeSystemId::TAI,
            1,
            Arc::new(move |i: &Instant| {
                let table = to_atomic
                    .get()
                    .ok_or_else(|| TimeError::MissingLeapTable(civil.to_string()))?;
                table.to_atomic(i)
            }),
        );
        let to_civil = Arc::clone(&cell);
        self.push_edge(
            EdgeOwner::Target,
            TimeSystemId::TAI,
            civil,
            1,
            Arc::new(move |i: &Instant| {
                let table = to_civil
                    .get()
                    .ok_or_else(|| TimeError::MissingLeapTable(civil.to_string()))?;
                Ok(table.to_civil(i))
            }),
        );
        self.extras.civil.insert(civil, cell);
    }

    /// Leap table behind a civil system.
    pub fn leap_table(&self, civil: TimeSystemId) -> Result<Arc<LeapSecondTable>, TimeError> {
        self.extras
            .civil
            .get(&civil)
            .and_then(|cell| cell.get())
            .cloned()
            .ok_or_else(|| TimeError::MissingLeapTable(civil.to_string()))
    }

    /// TDB − TT model used by the built-in TT/TDB edges.
    pub fn tdb_model(&self) -> TdbModel {
        self.extras.tdb
    }
}

impl Default for TimeGraph {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

fn shift(ms: i64) -> Arc<crate::system::ConvertFn> {
    Arc::new(move |i: &Instant| {
        let mut out = *i;
        out.set_time(i.millis() + ms, i.nanos())?;
        Ok(out)
    })
}
