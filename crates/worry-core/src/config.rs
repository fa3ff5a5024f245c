//! Configuration for the worry journal
//!
//! Timing and retention parameters shared by the store, the editor's
//! autosave and the shell's notifications.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Key the store document lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "worryJournal.store";

/// Longest accepted retention window: ten years.
pub const MAX_RETENTION_HOURS: u32 = 24 * 365 * 10;

/// Longest accepted autosave delay or toast duration: one hour.
pub const MAX_DELAY_MS: u64 = 60 * 60 * 1000;

/// Journal-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Backend key holding the store document
    pub storage_key: String,
    /// Quiet interval after the last keystroke before an autosave fires
    pub autosave_delay_ms: u64,
    /// Content-less records older than this are swept at startup
    pub retention_hours: u32,
    /// Titles longer than this are cut in the index
    pub title_limit: usize,
    /// How long a toast stays on screen
    pub toast_duration_ms: u64,
    /// Where file-backed storage lives (platform data dir when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave_delay_ms: 400,
            retention_hours: 24,
            title_limit: 100,
            toast_duration_ms: 3000,
            data_dir: None,
        }
    }
}

impl JournalConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from a file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Clamped to [`MAX_DELAY_MS`] so an unvalidated value cannot overflow.
    pub fn autosave_delay(&self) -> TimeDelta {
        delay(self.autosave_delay_ms)
    }

    /// Clamped to [`MAX_RETENTION_HOURS`].
    pub fn retention(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.retention_hours.min(MAX_RETENTION_HOURS)))
    }

    /// Clamped to [`MAX_DELAY_MS`].
    pub fn toast_duration(&self) -> TimeDelta {
        delay(self.toast_duration_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::MissingField("storage_key".to_string()));
        }

        if self.autosave_delay_ms == 0 || self.autosave_delay_ms > MAX_DELAY_MS {
            return Err(ConfigError::OutOfRange(format!(
                "autosave_delay_ms must be between 1 and {MAX_DELAY_MS}"
            )));
        }

        if self.retention_hours == 0 || self.retention_hours > MAX_RETENTION_HOURS {
            return Err(ConfigError::OutOfRange(format!(
                "retention_hours must be between 1 and {MAX_RETENTION_HOURS}"
            )));
        }

        if self.toast_duration_ms == 0 || self.toast_duration_ms > MAX_DELAY_MS {
            return Err(ConfigError::OutOfRange(format!(
                "toast_duration_ms must be between 1 and {MAX_DELAY_MS}"
            )));
        }

        if self.title_limit == 0 {
            return Err(ConfigError::OutOfRange(
                "title_limit must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn delay(ms: u64) -> TimeDelta {
    // Bounded by MAX_DELAY_MS, so the cast cannot wrap.
    TimeDelta::milliseconds(ms.min(MAX_DELAY_MS) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JournalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.autosave_delay(), TimeDelta::milliseconds(400));
        assert_eq!(config.retention(), TimeDelta::hours(24));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = JournalConfig::from_toml("autosave_delay_ms = 250\n").unwrap();
        assert_eq!(config.autosave_delay_ms, 250);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.title_limit, 100);
    }

    #[test]
    fn test_toml_serialization() {
        let config = JournalConfig::default();
        let toml = config.to_toml().unwrap();
        let parsed = JournalConfig::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = JournalConfig::default();
        config.autosave_delay_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        let mut config = JournalConfig::default();
        config.storage_key = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));

        let mut config = JournalConfig::default();
        config.retention_hours = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        let mut config = JournalConfig::default();
        config.autosave_delay_ms = u64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        let mut config = JournalConfig::default();
        config.toast_duration_ms = MAX_DELAY_MS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        let mut config = JournalConfig::default();
        config.toast_duration_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));
    }

    #[test]
    fn test_limits_are_accepted() {
        let config = JournalConfig {
            retention_hours: MAX_RETENTION_HOURS,
            autosave_delay_ms: MAX_DELAY_MS,
            toast_duration_ms: MAX_DELAY_MS,
            ..JournalConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unvalidated_durations_are_clamped() {
        let config = JournalConfig {
            retention_hours: u32::MAX,
            autosave_delay_ms: u64::MAX,
            toast_duration_ms: u64::MAX,
            ..JournalConfig::default()
        };
        assert_eq!(config.retention(), TimeDelta::hours(i64::from(MAX_RETENTION_HOURS)));
        assert_eq!(config.autosave_delay(), TimeDelta::milliseconds(MAX_DELAY_MS as i64));
        assert_eq!(config.toast_duration(), TimeDelta::milliseconds(MAX_DELAY_MS as i64));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, JournalConfig::default());
    }

    #[test]
    fn test_bad_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "retention_hours = \"soon\"").unwrap();
        assert!(matches!(
            JournalConfig::load_or_default(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
