//! TOML-based reminder settings.
//!
//! Stores:
//! - The daily notification time (`HH:MM`, 24-hour)
//! - The reminder frequency
//!
//! Settings are stored at `<data dir>/settings.toml`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::periodicity::Periodicity;

const SETTINGS_FILE: &str = "settings.toml";
const TIME_FORMAT: &str = "%H:%M";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Time of day the reminder fires, `HH:MM`.
    #[serde(default = "default_notification_time")]
    pub notification_time: String,
    #[serde(default = "default_reminder_frequency")]
    pub reminder_frequency: Periodicity,
}

fn default_notification_time() -> String {
    "08:00".into()
}
fn default_reminder_frequency() -> Periodicity {
    Periodicity::Daily
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_time: default_notification_time(),
            reminder_frequency: default_reminder_frequency(),
        }
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| ConfigError::InvalidValue {
        key: "notification_time".into(),
        message: format!(
            "invalid time format '{value}', use 24-hour HH:MM (e.g. 08:00 or 18:30)"
        ),
    })
}

impl Settings {
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join(SETTINGS_FILE))
    }

    /// Load from the data directory, writing defaults if the file is missing.
    ///
    /// A file that exists but cannot be parsed yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the default
    /// settings cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Settings>(&content) {
                Ok(settings) => Ok(settings),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
                    Ok(Self::default())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            Self::default()
        })
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Notification time as a clock time.
    pub fn notification_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_time(&self.notification_time)
    }

    /// Set the notification time after validating it as 24-hour `HH:MM`.
    pub fn set_notification_time(&mut self, value: &str) -> Result<(), ConfigError> {
        let time = parse_time(value)?;
        self.notification_time = time.format(TIME_FORMAT).to_string();
        Ok(())
    }

    pub fn set_reminder_frequency(&mut self, value: &str) -> Result<(), ConfigError> {
        self.reminder_frequency =
            value
                .parse::<Periodicity>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "reminder_frequency".into(),
                    message: e.to_string(),
                })?;
        Ok(())
    }

    /// Get a settings value as a string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "notification_time" => Some(self.notification_time.clone()),
            "reminder_frequency" => Some(self.reminder_frequency.to_string()),
            _ => None,
        }
    }

    /// Set a settings value by key, validating it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "notification_time" => self.set_notification_time(value),
            "reminder_frequency" => self.set_reminder_frequency(value),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }
}
