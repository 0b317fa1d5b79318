//! Analytics configuration
//!
//! Stored as TOML in `<config_dir>/flipledger/config.toml`. Missing or
//! unreadable files fall back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::CoreError;
use crate::milestones::Metric;
use crate::trips::TripOptions;

const CONFIG_FILE: &str = "config.toml";

/// Trip clustering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripConfig {
    /// Gap tolerance for the trip history view
    pub all_trips_gap_days: i64,
    /// Gap tolerance for the latest-trip view
    pub latest_trip_gap_days: i64,
    /// Trip history lookback; 0 disables it
    pub lookback_months: u32,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            all_trips_gap_days: TripOptions::ALL_TRIPS_GAP_DAYS,
            latest_trip_gap_days: 3,
            lookback_months: TripOptions::DEFAULT_LOOKBACK_MONTHS,
        }
    }
}

/// Milestone tracking settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneConfig {
    pub metrics: Vec<Metric>,
}

impl Default for MilestoneConfig {
    fn default() -> Self {
        Self {
            metrics: Metric::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub trips: TripConfig,
    pub milestones: MilestoneConfig,
}

impl AnalyticsConfig {
    /// `<config_dir>/flipledger/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flipledger").join(CONFIG_FILE))
    }

    /// Load from `path`, returning defaults on any I/O, parse or validation error
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(CoreError::FileNotFound { .. }) => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using default analytics config");
                Self::default()
            }
        }
    }

    /// Load from the default location, or defaults
    pub fn load_default() -> Self {
        Self::default_path()
            .map(|path| Self::load(&path))
            .unwrap_or_default()
    }

    pub fn try_load(path: &Path) -> Result<Self, CoreError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::from_read(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.trips.all_trips_gap_days < 0 || self.trips.latest_trip_gap_days < 0 {
            return Err(CoreError::InvalidConfig {
                message: "trip gap tolerance must not be negative".to_string(),
            });
        }
        if self.milestones.metrics.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "at least one milestone metric must be tracked".to_string(),
            });
        }
        Ok(())
    }

    /// Persist to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).map_err(|source| CoreError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Options for the trip history view
    pub fn all_trip_options(&self) -> TripOptions {
        TripOptions {
            gap_tolerance_days: self.trips.all_trips_gap_days,
            lookback_months: (self.trips.lookback_months > 0).then_some(self.trips.lookback_months),
        }
    }

    /// Options for the latest-trip view
    pub fn latest_trip_options(&self) -> TripOptions {
        TripOptions::latest_trip(self.trips.latest_trip_gap_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_trip_presets() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.all_trip_options(), TripOptions::all_trips());
        assert_eq!(config.latest_trip_options(), TripOptions::latest_trip(3));
        assert_eq!(config.milestones.metrics.len(), 5);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AnalyticsConfig::load(&dir.path().join("nope.toml"));
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[trips]\nlatest_trip_gap_days = 5\n").unwrap();

        let config = AnalyticsConfig::try_load(&path).unwrap();
        assert_eq!(config.trips.latest_trip_gap_days, 5);
        assert_eq!(config.trips.all_trips_gap_days, 1);
        assert_eq!(config.milestones, MilestoneConfig::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[trips\nbroken").unwrap();
        assert!(matches!(
            AnalyticsConfig::try_load(&path),
            Err(CoreError::TomlParse { .. })
        ));
        assert_eq!(AnalyticsConfig::load(&path), AnalyticsConfig::default());

        std::fs::write(&path, "[milestones]\nmetrics = []\n").unwrap();
        assert!(matches!(
            AnalyticsConfig::try_load(&path),
            Err(CoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AnalyticsConfig::default();
        config.trips.lookback_months = 0;
        config.milestones.metrics = vec![Metric::Sold, Metric::Sales];
        config.save(&path).unwrap();

        let loaded = AnalyticsConfig::load(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.all_trip_options().lookback_months, None);
    }

    #[test]
    fn test_save_to_directory_is_write_error() {
        let dir = TempDir::new().unwrap();

        let err = AnalyticsConfig::default().save(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileWrite { .. })
        ));
    }
}
