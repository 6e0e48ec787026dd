use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to write preferences to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Returns the path to the data directory for dvc-lsp.
/// Uses $XDG_DATA_HOME/dvc-lsp if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/dvc-lsp,
/// or ./dvc-lsp if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the persisted user preferences.
pub fn preferences_path() -> PathBuf {
    data_dir().join("preferences.json")
}

/// Returns the name of the log file inside the data directory.
pub fn log_file_name() -> &'static str {
    "dvc-lsp.log"
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join(log_file_name())
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("dvc-lsp")
}

/// Settings sent by the editor as `initializationOptions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Interpreter of the environment DVC is installed into
    pub python_bin_path: Option<PathBuf>,
    /// Direct path to the dvc executable, takes precedence over the interpreter
    pub cli_path: Option<PathBuf>,
    /// Run `dvc --version` after initialization and warn on incompatibility
    pub check_cli_version: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            python_bin_path: None,
            cli_path: None,
            check_cli_version: true,
        }
    }
}

impl ServerSettings {
    /// Reads settings out of `initializationOptions`, falling back to defaults
    /// when the options are missing or do not match the expected shape.
    pub fn from_initialization_options(options: Option<serde_json::Value>) -> Self {
        let Some(options) = options else {
            return Self::default();
        };

        serde_json::from_value(options)
            .inspect_err(|e| warn!("Ignoring invalid initializationOptions: {}", e))
            .unwrap_or_default()
    }
}

/// User choices that outlive a single editor session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub do_not_warn_cli_version: bool,
}

impl Preferences {
    /// Loads preferences from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };

        serde_json::from_str(&contents)
            .inspect_err(|e| warn!("Ignoring invalid preferences file {:?}: {}", path, e))
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
