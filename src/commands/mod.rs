//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.
//! Argument groups shared by several commands live here.

mod capacity;
mod decode;
mod encode;
mod fingerprint;
mod keygen;

pub use capacity::CapacityCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use fingerprint::FingerprintCommand;
pub use keygen::KeygenCommand;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stegkit::crypto::SymmetricKey;
use stegkit::{AnyCarrier, CarrierKind, FrameFormat, StegoConfig, StegoError};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Where the secret key comes from.
#[derive(Args, Debug, Default)]
pub struct KeyArgs {
    /// Secret key in base64 (as printed by `keygen`)
    #[arg(short, long, conflicts_with = "key_file")]
    pub key: Option<String>,

    /// Path to a key file written by `keygen -o`
    #[arg(long)]
    pub key_file: Option<PathBuf>,
}

impl KeyArgs {
    /// Loads the key, if one was given.
    pub fn load(&self) -> Result<Option<SymmetricKey>> {
        if let Some(encoded) = &self.key {
            let key = SymmetricKey::from_base64(encoded)
                .map_err(StegoError::from)
                .context("Invalid --key value")?;
            return Ok(Some(key));
        }

        if let Some(path) = &self.key_file {
            let key = SymmetricKey::load_from_file(path)
                .map_err(StegoError::from)
                .with_context(|| format!("Failed to load key from {}", path.display()))?;
            return Ok(Some(key));
        }

        Ok(None)
    }

    /// Loads the key, failing when none was given.
    pub fn require(&self) -> Result<SymmetricKey> {
        self.load()?
            .ok_or_else(|| anyhow::anyhow!("A key is required: pass --key or --key-file"))
    }
}

/// Carrier file selection shared by encode, decode and capacity.
#[derive(Args, Debug)]
pub struct CarrierArgs {
    /// Path to the carrier file (.txt, .wav, .png, .bmp, ...)
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Carrier type, detected from the file extension when omitted
    #[arg(long)]
    pub kind: Option<CarrierKind>,

    /// Payload framing: sentinel or length-prefixed (default from config)
    #[arg(long)]
    pub framing: Option<FrameFormat>,
}

impl CarrierArgs {
    /// Loads the carrier file.
    pub fn load(&self) -> Result<AnyCarrier> {
        let carrier = AnyCarrier::from_file(&self.carrier, self.kind)
            .with_context(|| format!("Failed to read carrier from {}", self.carrier.display()))?;
        log::info!("Loaded {} from {}", carrier.describe(), self.carrier.display());
        Ok(carrier)
    }

    /// The framing to use, with the command line taking precedence.
    pub fn framing(&self, config: &StegoConfig) -> FrameFormat {
        self.framing.unwrap_or(config.framing)
    }
}

/// Loads `~/.stegkit/config.toml`, or the defaults when it doesn't exist.
pub fn load_config() -> Result<StegoConfig> {
    StegoConfig::load().context("Failed to load ~/.stegkit/config.toml")
}
