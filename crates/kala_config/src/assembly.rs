//! Building the runtime objects a configuration describes.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use kala_eop::{EarthOrientation, EarthOrientationTable, TidalCorrectionModel, register_ut1};
use kala_frames::{Iau2006Series, Iau2006Truncated, PrecessionCache, PrecessionModel};
use kala_time::{Instant, LeapSecondTable, TimeGraph, TimeSystemId};
use tracing::{debug, info};

use crate::config::{KalaConfig, ModelKind};
use crate::error::ConfigError;

static DEFAULT: OnceLock<Arc<Assembly>> = OnceLock::new();

/// Time graph, leap table, precession model and (optionally) an
/// Earth-orientation table with its UT1 system, wired together.
pub struct Assembly {
    graph: TimeGraph,
    leap: Arc<LeapSecondTable>,
    precession: Arc<dyn PrecessionModel>,
    orientation: Option<(Arc<EarthOrientationTable>, TimeSystemId)>,
}

impl Assembly {
    pub fn from_config(config: &KalaConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let leap = Arc::new(match &config.time.leap_seconds {
            Some(path) => LeapSecondTable::load(path)?,
            None => LeapSecondTable::iers(),
        });
        let mut graph = TimeGraph::with_leap_table(config.time_config(), Arc::clone(&leap));
        let precession = build_model(config)?;

        let orientation = match &config.eop.finals {
            Some(finals) => {
                let mut table = EarthOrientationTable::new(Arc::clone(&leap), Arc::clone(&precession));
                table.load_finals(finals)?;
                if let Some(path) = &config.eop.tidal_corrections {
                    table = table.with_tidal_corrections(TidalCorrectionModel::load(path)?);
                }
                let table = Arc::new(table);
                let ut1 = register_ut1(&mut graph, &table)?;
                Some((table, ut1))
            }
            None => None,
        };

        info!(
            leap_seconds = leap.len(),
            precession = precession.name(),
            eop_rows = orientation.as_ref().map_or(0, |(t, _)| t.len()),
            "assembled time and orientation stack"
        );
        Ok(Self {
            graph,
            leap,
            precession,
            orientation,
        })
    }

    /// Load a TOML file and assemble it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_config(&KalaConfig::load(path)?)
    }

    pub fn graph(&self) -> &TimeGraph {
        &self.graph
    }

    pub fn leap_table(&self) -> &Arc<LeapSecondTable> {
        &self.leap
    }

    pub fn precession_model(&self) -> &Arc<dyn PrecessionModel> {
        &self.precession
    }

    pub fn orientation_table(&self) -> Option<&Arc<EarthOrientationTable>> {
        self.orientation.as_ref().map(|(table, _)| table)
    }

    /// The UT1 system, when an orientation table is configured.
    pub fn ut1(&self) -> Option<TimeSystemId> {
        self.orientation.as_ref().map(|(_, id)| *id)
    }

    /// Reading of `instant` in `system`.
    pub fn convert(&self, instant: &Instant, system: TimeSystemId) -> Result<Instant, ConfigError> {
        Ok(self.graph.convert(instant, system)?)
    }

    /// Orientation at an instant of any system the graph can take to TAI.
    pub fn orientation(&self, instant: &Instant) -> Result<EarthOrientation, ConfigError> {
        let Some((table, _)) = &self.orientation else {
            return Err(ConfigError::Invalid("no Earth-orientation bulletin configured".into()));
        };
        let tai = self.graph.convert(instant, TimeSystemId::TAI)?;
        Ok(table.get_orientation(&tai, &self.graph)?)
    }
}

fn build_model(config: &KalaConfig) -> Result<Arc<dyn PrecessionModel>, ConfigError> {
    let p = &config.precession;
    let model: Arc<dyn PrecessionModel> = match p.model {
        ModelKind::Truncated => Arc::new(Iau2006Truncated::new()),
        ModelKind::Series => {
            let (Some(x), Some(y), Some(s)) = (&p.x_table, &p.y_table, &p.s_table) else {
                return Err(ConfigError::Invalid("series model needs x, y and s tables".into()));
            };
            Arc::new(Iau2006Series::load(x, y, s)?)
        }
    };
    Ok(match p.cache_bucket_seconds {
        Some(bucket) => {
            debug!(bucket, capacity = p.cache_capacity, "precession cache enabled");
            Arc::new(PrecessionCache::new(model, bucket, p.cache_capacity))
        }
        None => model,
    })
}

/// Install the process-wide default assembly. Only the first call succeeds.
pub fn install_default(assembly: Assembly) -> Result<Arc<Assembly>, ConfigError> {
    let assembly = Arc::new(assembly);
    DEFAULT
        .set(Arc::clone(&assembly))
        .map_err(|_| ConfigError::DefaultAlreadyInstalled)?;
    debug!("installed default assembly");
    Ok(assembly)
}

/// The process-wide default assembly.
pub fn default_assembly() -> Result<Arc<Assembly>, ConfigError> {
    DEFAULT.get().cloned().ok_or(ConfigError::NoDefault)
}

#[cfg(test)]
mod tests {
    use kala_time::MILLIS_PER_DAY;

    use super::*;

    #[test]
    fn default_config_assembles_without_files() {
        let assembly = Assembly::from_config(&KalaConfig::default()).unwrap();
        assert_eq!(assembly.precession_model().name(), "iau2006-truncated");
        assert_eq!(assembly.leap_table().len(), 27);
        assert!(assembly.ut1().is_none());

        // 2020-09-13, TAI − UTC = 37 s
        let utc = Instant::from_millis(TimeSystemId::UTC, 18_518 * MILLIS_PER_DAY);
        let tai = assembly.convert(&utc, TimeSystemId::TAI).unwrap();
        assert_eq!(tai.millis() - utc.millis(), 37_000);
        assert!(matches!(assembly.orientation(&tai), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn cache_wraps_the_model() {
        let config = KalaConfig::parse("[precession]\ncache_bucket_seconds = 60\n").unwrap();
        let assembly = Assembly::from_config(&config).unwrap();
        assert_eq!(assembly.precession_model().name(), "bucketed-cache");
    }

    #[test]
    fn missing_files_are_io_errors() {
        let config = KalaConfig::parse("[time]\nleap_seconds = \"/nonexistent/tai-utc.dat\"\n").unwrap();
        assert!(matches!(
            Assembly::from_config(&config),
            Err(ConfigError::Time(kala_time::TimeError::Io(_)))
        ));
    }
}
