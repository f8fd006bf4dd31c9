//! TOML configuration.
//!
//! ```toml
//! database = "catches.db"
//! port = 8080
//!
//! [stats]
//! season_start = "06-15"
//! season_end = "08-31"
//! week_length = 7
//! period_days = 7
//! top_n = 3
//! ```
//!
//! Every key is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{CatchLogError, Result};
use crate::season::Season;
use crate::service::StatsSettings;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite file; `None` keeps everything in memory.
    pub database: Option<PathBuf>,
    pub port: u16,
    pub stats: StatsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: None,
            port: DEFAULT_PORT,
            stats: StatsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    pub season_start: String,
    pub season_end: String,
    pub week_length: usize,
    pub period_days: u32,
    pub top_n: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        let defaults = StatsSettings::default();
        StatsConfig {
            season_start: defaults.season.start.to_string(),
            season_end: defaults.season.end.to_string(),
            week_length: defaults.week_length,
            period_days: defaults.period_days,
            top_n: defaults.top_n,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_toml_str(&std::fs::read_to_string(p)?),
            None => Ok(Config::default()),
        }
    }

    pub fn stats_settings(&self) -> Result<StatsSettings> {
        let s = &self.stats;
        if s.week_length == 0 {
            return Err(CatchLogError::InvalidSetting {
                key: "week_length",
                message: "must be at least 1".into(),
            });
        }
        Ok(StatsSettings {
            season: Season::parse(&s.season_start, &s.season_end)?,
            week_length: s.week_length,
            period_days: s.period_days.max(1),
            top_n: s.top_n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::DayKey;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.stats_settings().unwrap(), StatsSettings::default());
    }

    #[test]
    fn test_partial_stats_section() {
        let cfg = Config::from_toml_str(
            r#"
            database = "catches.db"
            [stats]
            season_start = "05-01"
            top_n = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.as_deref(), Some(Path::new("catches.db")));
        let settings = cfg.stats_settings().unwrap();
        assert_eq!(settings.season.start, DayKey::new(5, 1).unwrap());
        assert_eq!(settings.season.end, DayKey::new(8, 31).unwrap());
        assert_eq!(settings.top_n, 5);
        assert_eq!(settings.week_length, 7);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            Config::from_toml_str("colour = \"blue\""),
            Err(CatchLogError::Config(_))
        ));
    }

    #[test]
    fn test_zero_week_length_rejected() {
        let cfg = Config::from_toml_str("[stats]\nweek_length = 0").unwrap();
        let err = cfg.stats_settings().unwrap_err();
        assert!(matches!(err, CatchLogError::InvalidSetting { key: "week_length", .. }));
        assert!(err.to_string().contains("week_length"));
    }

    #[test]
    fn test_reversed_season_rejected() {
        let cfg = Config::from_toml_str("[stats]\nseason_start = \"09-01\"\nseason_end = \"06-01\"").unwrap();
        assert!(matches!(cfg.stats_settings(), Err(CatchLogError::InvalidSeason(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catch-log.toml");
        std::fs::write(&path, "port = 9000").unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn test_load_none_is_default() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
