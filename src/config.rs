//! Engine tunables and persisted application settings.
//!
//! Settings live in `settings.json` under the platform config directory
//! (resolved with `directories`). A missing file means defaults; a broken
//! one is reported as a [`ConfigError`] so the host can warn and carry on.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::rows::DEFAULT_MAX_ROWS;
use crate::engine::slots::DEFAULT_SEARCH_HORIZON;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no config directory available on this platform")]
    NoConfigDir,
}

/// Bounds used by the row packer, the slot finder and the interaction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rows scanned per lane before the packer falls back to the overflow row.
    pub max_rows: usize,
    /// Candidate ranges tried by the slot finder.
    pub slot_search_horizon: usize,
    /// How long clicks are swallowed after a drop or resize release.
    pub click_suppression_ms: u64,
    /// A gesture with no pointer activity for this long is forced idle.
    pub stuck_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            slot_search_horizon: DEFAULT_SEARCH_HORIZON,
            click_suppression_ms: 150,
            stuck_timeout_ms: 5_000,
        }
    }
}

impl EngineConfig {
    pub fn click_suppression(&self) -> Duration {
        Duration::from_millis(self.click_suppression_ms)
    }

    pub fn stuck_timeout(&self) -> Duration {
        Duration::from_millis(self.stuck_timeout_ms)
    }
}

/// Everything the desktop host persists between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    /// Initial zoom of the timeline.
    pub pixels_per_day: f32,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            pixels_per_day: 24.0,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// `<config dir>/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "FactoryTimeline")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Load from the default location.
    ///
    /// # Errors
    ///
    /// See [`Settings::load_from`]. A platform without a config dir yields
    /// defaults, not an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; a missing file gives defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file exists but cannot be read,
    /// [`ConfigError::Parse`] if it is not valid settings JSON.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&text)
    }

    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed JSON.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write to the default location.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigDir`] or any error from [`Settings::save_to`].
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write pretty JSON to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Write`] on I/O failure.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, json).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_bounds() {
        let settings = Settings::default();
        assert_eq!(settings.engine.max_rows, 100);
        assert_eq!(settings.engine.slot_search_horizon, 365);
        assert_eq!(settings.engine.click_suppression(), Duration::from_millis(150));
        assert_eq!(settings.engine.stuck_timeout(), Duration::from_secs(5));
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let settings = Settings::parse(r#"{"engine": {"max_rows": 8}, "pixels_per_day": 30.0}"#).unwrap();
        assert_eq!(settings.engine.max_rows, 8);
        assert_eq!(settings.engine.slot_search_horizon, 365);
        assert!((settings.pixels_per_day - 30.0).abs() < f32::EPSILON);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Settings::parse("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let mut settings = Settings::default();
        settings.engine.stuck_timeout_ms = 2_000;
        settings.log_filter = "factory_timeline=debug".to_string();

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }
}
