//! Application settings.
//!
//! Optional defaults for the command line, read from a JSON file. Flags given
//! on the command line always win over these values.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default connection timeout in seconds.
    pub timeout_secs: f64,
    /// Default bound on in-flight connection attempts.
    pub concurrency: usize,
    /// Grab banners unless told otherwise.
    pub grab_banner: bool,
    /// Write JSON reports here instead of printing to the console.
    pub output_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 1.0,
            concurrency: 500,
            grab_banner: false,
            output_dir: None,
        }
    }
}

impl AppSettings {
    /// Location of the settings file in the platform config directory
    /// (`~/.config/tcprecon/settings.json` on Linux).
    pub fn default_path() -> ConfigResult<PathBuf> {
        let project = ProjectDirs::from("com", "tcprecon", "tcprecon")
            .ok_or(ConfigError::DirectoryNotFound)?;
        Ok(project.config_dir().join("settings.json"))
    }

    /// Load settings from `explicit` if given, otherwise from the default
    /// location when that file exists, otherwise use built-in defaults.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Ok(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}
