use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bitcoin::Network;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default value for `network` in [`SignerConfig`].
const DEFAULT_NETWORK: Network = Network::Bitcoin;

fn default_network() -> Network {
    DEFAULT_NETWORK
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ReviewConfig {
    /// Approve every valid transaction without prompting. Defaults to false.
    #[serde(default)]
    pub auto_approve: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignerConfig {
    /// Network used when rendering wallet addresses.
    #[serde(default = "default_network")]
    pub network: Network,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub review: ReviewConfig,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            logging: LoggingConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

/// Loads the config at `path`, or the defaults when no file exists there.
pub fn load(path: &Path) -> Result<SignerConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(SignerConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
