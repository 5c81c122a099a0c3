//! User configuration for stegkit.
//!
//! Stored in `~/.stegkit/config.toml`. Every field is optional; a missing
//! file yields the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::frame::FrameFormat;
use crate::stego::ImageOutputFormat;

/// Default number of encryptions tried before giving up on a sentinel-free
/// ciphertext.
pub const DEFAULT_MAX_ENCRYPT_ATTEMPTS: usize = 64;

/// Errors that can occur when reading or writing the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Settings read from `config.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StegoConfig {
    /// How payloads are delimited inside the carrier.
    pub framing: FrameFormat,

    /// Output format for images written to a path without extension.
    pub image_format: ImageOutputFormat,

    /// Sentinel-collision retries in the encoder.
    pub max_encrypt_attempts: usize,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            framing: FrameFormat::default(),
            image_format: ImageOutputFormat::default(),
            max_encrypt_attempts: DEFAULT_MAX_ENCRYPT_ATTEMPTS,
        }
    }
}

impl StegoConfig {
    /// Load the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the configuration from `path`, falling back to defaults when the
    /// file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: StegoConfig = toml::from_str(&content)?;
        log::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Save the configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join("config.toml"))
    }
}

/// Get the stegkit configuration directory (`~/.stegkit`).
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".stegkit"))
        .ok_or(ConfigError::NoConfigDir)
}
