// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::datetime::{TimeFormat, WeekStart};
use crate::error::{CalendarError, CalendarResult};
use crate::history::SEARCH_HISTORY_KEY;
use crate::store::DEFAULT_STORAGE_KEY;

/// The name of the application, used for default directories.
pub const APP_NAME: &str = "gridcal";

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "GRIDCAL_CONFIG";

/// Configuration for the calendar.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the stored event collection.
    pub storage_dir: Option<PathBuf>,

    /// Name of the slot holding the event collection.
    pub storage_key: String,

    /// First day of the displayed week.
    pub week_start: WeekStart,

    /// Clock used to display times of day.
    pub time_format: TimeFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            week_start: WeekStart::default(),
            time_format: TimeFormat::default(),
        }
    }
}

impl Config {
    /// Reads a TOML config file.
    #[tracing::instrument]
    pub fn from_file(path: &Path) -> CalendarResult<Self> {
        std::fs::read_to_string(path)
            .map_err(|e| {
                CalendarError::Config(format!(
                    "Failed to read config file at {}: {e}",
                    path.display()
                ))
            })?
            .parse()
    }

    /// Loads the config from `path`, then `$GRIDCAL_CONFIG`, then
    /// `<config dir>/gridcal/config.toml`.
    ///
    /// Only the last location is optional: when it does not exist the
    /// defaults are used.
    #[tracing::instrument]
    pub fn load(path: Option<PathBuf>) -> CalendarResult<Self> {
        if let Some(path) = path {
            return Self::from_file(&path);
        }
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&env_path));
        }

        let path = get_config_dir()?.join(APP_NAME).join("config.toml");
        if path.exists() {
            Self::from_file(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Normalize the configuration.
    pub fn normalize(&mut self) -> CalendarResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(CalendarError::Config("Storage key must not be empty".into()));
        }
        if self.storage_key == SEARCH_HISTORY_KEY {
            return Err(CalendarError::Config(format!(
                "Storage key {SEARCH_HISTORY_KEY:?} is reserved for the search history"
            )));
        }

        match &self.storage_dir {
            Some(a) => {
                self.storage_dir = Some(expand_path(a).map_err(|e| {
                    CalendarError::Config(format!("Failed to expand storage directory path: {e}"))
                })?)
            }

            None => match get_state_dir() {
                Ok(a) => self.storage_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        };

        Ok(())
    }
}

impl FromStr for Config {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> CalendarResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path
        .to_str()
        .ok_or_else(|| CalendarError::Config("Invalid path".into()))?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle state directories
    let state_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_STATE_HOME/", "${XDG_STATE_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in state_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_state_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> CalendarResult<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| CalendarError::Config("User-specific home directory not found".into()))
}

fn get_config_dir() -> CalendarResult<PathBuf> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir
        .ok_or_else(|| CalendarError::Config("User-specific config directory not found".into()))
}

fn get_state_dir() -> CalendarResult<PathBuf> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_dir();
    state_dir
        .ok_or_else(|| CalendarError::Config("User-specific state directory not found".into()))
}
