// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Service configuration: TOML file, then `BLOCKFS_*` environment
//! overrides, then command-line flags applied by the binary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use blockfs::{FsConfig, FsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default listen address of the TCP service.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:5050";

/// Environment variable overriding [`SrvConfig::listen`].
pub const ENV_LISTEN: &str = "BLOCKFS_LISTEN";
/// Environment variable overriding [`SrvConfig::state_path`].
pub const ENV_STATE: &str = "BLOCKFS_STATE";
/// Environment variable overriding the block size.
pub const ENV_BLOCK_SIZE: &str = "BLOCKFS_BLOCK_SIZE";
/// Environment variable overriding the block count.
pub const ENV_BLOCK_COUNT: &str = "BLOCKFS_BLOCK_COUNT";

/// Errors produced while assembling the service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The TOML document failed to parse.
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// An environment override failed to parse.
    #[error("invalid {key} value '{value}'")]
    InvalidEnv { key: &'static str, value: String },
    /// The block geometry is unusable.
    #[error(transparent)]
    Geometry(#[from] FsError),
}

/// Settings of the blockfs TCP service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrvConfig {
    /// Socket address to bind; port 0 picks a free port.
    pub listen: String,
    /// Snapshot file loaded at start and rewritten after every mutation.
    pub state_path: Option<PathBuf>,
    /// Block pool geometry.
    pub fs: FsConfig,
}

impl Default for SrvConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_owned(),
            state_path: None,
            fs: FsConfig::default(),
        }
    }
}

fn env_value<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidEnv {
                    key,
                    value: trimmed.to_owned(),
                })
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(raw)) => Err(ConfigError::InvalidEnv {
            key,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

impl SrvConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `BLOCKFS_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(listen) = env_value::<String>(ENV_LISTEN)? {
            self.listen = listen;
        }
        if let Some(state) = env_value::<PathBuf>(ENV_STATE)? {
            self.state_path = Some(state);
        }
        if let Some(size) = env_value::<usize>(ENV_BLOCK_SIZE)? {
            self.fs.block_size = size;
        }
        if let Some(count) = env_value::<usize>(ENV_BLOCK_COUNT)? {
            self.fs.block_count = count;
        }
        Ok(())
    }

    /// Reject geometries that cannot store anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fs.validate()?;
        Ok(())
    }
}
