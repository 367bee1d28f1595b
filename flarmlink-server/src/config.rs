//! Settings file location and loading.
//!
//! Settings live in `traffic.json` under the platform config directory,
//! e.g. `~/.config/flarmlink/traffic.json` on Linux, unless a path is given
//! on the command line. A missing default file means default settings; a
//! missing explicit file is an error.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use flarmlink_core::TrafficSettings;
use log::{debug, info};

use crate::error::HostError;

const SETTINGS_FILE: &str = "traffic.json";

pub fn get_project_dirs() -> Result<ProjectDirs, HostError> {
    ProjectDirs::from("org", "flarmlink", "flarmlink").ok_or(HostError::NoHomeDirectory)
}

/// Where settings are read from when no path is given
pub fn default_settings_path() -> Result<PathBuf, HostError> {
    let mut path = get_project_dirs()?.config_dir().to_owned();
    path.push(SETTINGS_FILE);
    Ok(path)
}

/// Read settings from a JSON file
pub fn read_settings(path: &Path) -> Result<TrafficSettings, HostError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| HostError::Settings {
        path: path.to_owned(),
        source,
    })
}

/// Load settings from `path`, or from the default location if it exists
pub fn load_settings(path: Option<&Path>) -> Result<TrafficSettings, HostError> {
    if let Some(path) = path {
        info!("Loading settings from {}", path.display());
        return read_settings(path);
    }

    let path = match default_settings_path() {
        Ok(path) => path,
        Err(e) => {
            debug!("{}, using default settings", e);
            return Ok(TrafficSettings::default());
        }
    };
    if path.exists() {
        info!("Loading settings from {}", path.display());
        read_settings(&path)
    } else {
        debug!("No settings at {}, using defaults", path.display());
        Ok(TrafficSettings::default())
    }
}
