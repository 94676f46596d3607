//! Persistent settings for paperless-upload.
//!
//! Only the server endpoint is stored. The API key is never read from or
//! written to disk; it comes from `--api-key` or `PAPERLESS_API_KEY`.
//!
//! The default location is `$XDG_CONFIG_HOME/paperless-upload/config.json`
//! on Linux (see [`directories::ProjectDirs`] for other platforms).

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt, fs, io,
    path::{Path, PathBuf},
};

const CONFIG_FILE_NAME: &str = "config.json";
const APPLICATION: &str = "paperless-upload";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the Paperless server.
    pub endpoint: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    /// No home directory to put the config file in
    NoLocation,
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoLocation => {
                write!(f, "Could not determine configuration location")
            }
            ConfigError::Io(err) => write!(f, "Config file I/O: {err}"),
            ConfigError::Json(err) => write!(f, "Malformed config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Json(err) => Some(err),
            ConfigError::NoLocation => None,
        }
    }
}

/// Platform default config file path, if a home directory is known.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load from `path`, or the platform default when `None`.
    ///
    /// A missing file yields the default config. An unreadable or malformed
    /// one is logged and also yields the default.
    pub fn load(path: Option<&Path>) -> Config {
        let Some(path) = path.map(Path::to_path_buf).or_else(default_path)
        else {
            return Config::default();
        };

        match Config::read(&path) {
            Ok(Some(config)) => {
                debug!("Config loaded from: {}", path.display());
                config
            }
            Ok(None) => Config::default(),
            Err(err) => {
                warn!("Ignoring config at {}: {err}", path.display());
                Config::default()
            }
        }
    }

    /// Read the config at `path`; `Ok(None)` if it doesn't exist.
    pub fn read(path: &Path) -> Result<Option<Config>, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(None)
            }
            Err(err) => return Err(ConfigError::Io(err)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(ConfigError::Json)
    }

    /// Write to `path`, or the platform default when `None`, creating parent
    /// directories as needed.
    pub fn save(&self, path: Option<&Path>) -> Result<(), ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(default_path)
            .ok_or(ConfigError::NoLocation)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let contents =
            serde_json::to_string_pretty(self).map_err(ConfigError::Json)?;
        fs::write(&path, contents).map_err(ConfigError::Io)?;

        info!("Config saved to: {}", path.display());
        Ok(())
    }
}
