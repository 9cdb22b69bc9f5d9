mod settings;
pub mod database;
pub mod migrations;

pub use database::{format_timestamp, CompletionOutcome, Database, Habit, TIMESTAMP_FORMAT};
pub use settings::Settings;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding the habit database, settings, and PID file.
///
/// `HABITRACK_DATA_DIR` overrides the location. Otherwise this is
/// `~/.config/habitrack[-dev]/`; set `HABITRACK_ENV=dev` to use the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HABITRACK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HABITRACK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("habitrack-dev")
            } else {
                base_dir.join("habitrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
