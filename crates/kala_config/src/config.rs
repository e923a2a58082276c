//! TOML configuration for the time graph, the Earth-orientation table and
//! the precession model.
//!
//! Every section and field is optional. Relative paths are resolved against
//! the directory holding the configuration file.

use std::path::{Path, PathBuf};

use kala_frames::cache::DEFAULT_CAPACITY;
use kala_time::{DEFAULT_SEARCH_DEPTH, TdbModel, TimeConfig};
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Top-level configuration.
///
/// ```toml
/// [time]
/// leap_seconds = "data/tai-utc.dat"
/// search_depth = 4
///
/// [eop]
/// finals = "data/finals2000A.all"
///
/// [precession]
/// model = "series"
/// x_table = "data/tab5.2a.txt"
/// y_table = "data/tab5.2b.txt"
/// s_table = "data/tab5.2d.txt"
/// cache_bucket_seconds = 3600
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KalaConfig {
    #[serde(default)]
    pub time: TimeSection,
    #[serde(default)]
    pub eop: EopSection,
    #[serde(default)]
    pub precession: PrecessionSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeSection {
    /// USNO `tai-utc.dat` list; the built-in catalogue when absent.
    #[serde(default)]
    pub leap_seconds: Option<PathBuf>,
    #[serde(default = "default_search_depth")]
    pub search_depth: usize,
    #[serde(default)]
    pub tdb: TdbSection,
}

impl Default for TimeSection {
    fn default() -> Self {
        Self {
            leap_seconds: None,
            search_depth: default_search_depth(),
            tdb: TdbSection::default(),
        }
    }
}

fn default_search_depth() -> usize {
    DEFAULT_SEARCH_DEPTH
}

/// Coefficients of the TDB − TT model; unset fields keep the standard values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TdbSection {
    pub k: f64,
    pub eb: f64,
    pub m0: f64,
    pub m1: f64,
}

impl Default for TdbSection {
    fn default() -> Self {
        let model = TdbModel::default();
        Self {
            k: model.k,
            eb: model.eb,
            m0: model.m0,
            m1: model.m1,
        }
    }
}

impl From<TdbSection> for TdbModel {
    fn from(s: TdbSection) -> Self {
        Self {
            k: s.k,
            eb: s.eb,
            m0: s.m0,
            m1: s.m1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EopSection {
    /// IERS `finals2000A` bulletin.
    #[serde(default)]
    pub finals: Option<PathBuf>,
    /// Ocean-tide correction coefficients.
    #[serde(default)]
    pub tidal_corrections: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Full IAU 2006/2000A series from the IERS tables.
    Series,
    /// Built-in truncated model, no files needed.
    #[default]
    Truncated,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrecessionSection {
    #[serde(default)]
    pub model: ModelKind,
    #[serde(default)]
    pub x_table: Option<PathBuf>,
    #[serde(default)]
    pub y_table: Option<PathBuf>,
    #[serde(default)]
    pub s_table: Option<PathBuf>,
    /// Enables the bucketed precession cache.
    #[serde(default)]
    pub cache_bucket_seconds: Option<u32>,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for PrecessionSection {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            x_table: None,
            y_table: None,
            s_table: None,
            cache_bucket_seconds: None,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl KalaConfig {
    /// Read a TOML file. Relative paths inside it resolve against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        if let Some(dir) = path.parent() {
            config.resolve_relative_to(dir);
        }
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse TOML content and validate it.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time.search_depth == 0 {
            return Err(ConfigError::Invalid("time.search_depth must be at least 1".into()));
        }
        let tdb = &self.time.tdb;
        if ![tdb.k, tdb.eb, tdb.m0, tdb.m1].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid("time.tdb coefficients must be finite".into()));
        }
        let p = &self.precession;
        if p.model == ModelKind::Series {
            for (name, table) in [("x_table", &p.x_table), ("y_table", &p.y_table), ("s_table", &p.s_table)] {
                if table.is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "precession.{name} is required for the series model"
                    )));
                }
            }
        }
        if p.cache_bucket_seconds == Some(0) {
            return Err(ConfigError::Invalid("precession.cache_bucket_seconds must be positive".into()));
        }
        if p.cache_capacity == 0 {
            return Err(ConfigError::Invalid("precession.cache_capacity must be positive".into()));
        }
        if self.eop.tidal_corrections.is_some() && self.eop.finals.is_none() {
            return Err(ConfigError::Invalid("eop.tidal_corrections needs eop.finals".into()));
        }
        Ok(())
    }

    /// Options for the time-system graph.
    pub fn time_config(&self) -> TimeConfig {
        TimeConfig {
            search_depth: self.time.search_depth,
            tdb: self.time.tdb.into(),
        }
    }

    fn resolve_relative_to(&mut self, dir: &Path) {
        let paths = [
            &mut self.time.leap_seconds,
            &mut self.eop.finals,
            &mut self.eop.tidal_corrections,
            &mut self.precession.x_table,
            &mut self.precession.y_table,
            &mut self.precession.s_table,
        ];
        for path in paths.into_iter().flatten() {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = KalaConfig::parse("").unwrap();
        assert_eq!(config, KalaConfig::default());
        assert_eq!(config.time.search_depth, DEFAULT_SEARCH_DEPTH);
        assert_eq!(config.precession.model, ModelKind::Truncated);
        assert_eq!(TdbModel::from(config.time.tdb), TdbModel::default());
    }

    #[test]
    fn partial_tdb_keeps_other_coefficients() {
        let config = KalaConfig::parse("[time.tdb]\nk = 1.6e-3\n").unwrap();
        assert_eq!(config.time.tdb.k, 1.6e-3);
        assert_eq!(config.time.tdb.eb, TdbModel::default().eb);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(KalaConfig::parse("[time]\nleap = 1\n"), Err(ConfigError::Toml(_))));
        assert!(matches!(KalaConfig::parse("[extra]\n"), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn series_needs_all_tables() {
        let text = "[precession]\nmodel = \"series\"\nx_table = \"a\"\ny_table = \"b\"\n";
        assert!(matches!(KalaConfig::parse(text), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn model_names_are_lowercase() {
        assert!(matches!(
            KalaConfig::parse("[precession]\nmodel = \"Series\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn rejects_degenerate_values() {
        assert!(matches!(KalaConfig::parse("[time]\nsearch_depth = 0\n"), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            KalaConfig::parse("[precession]\ncache_bucket_seconds = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            KalaConfig::parse("[eop]\ntidal_corrections = \"t.txt\"\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn relative_paths_follow_the_file() {
        let mut config = KalaConfig::parse("[eop]\nfinals = \"finals.all\"\n").unwrap();
        config.resolve_relative_to(Path::new("/etc/kala"));
        assert_eq!(config.eop.finals.as_deref(), Some(Path::new("/etc/kala/finals.all")));
    }
}
