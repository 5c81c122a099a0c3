//! Decode command - recover a hidden message from a carrier.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stegkit::{decode_with_config, DecoderConfig, StegoError};

use super::{load_config, CarrierArgs, CommandExecutor, KeyArgs};

/// Extract and decrypt the message hidden in a carrier.
///
/// Fails with a distinct error when the carrier holds no message, when the
/// key is wrong, and when the carrier was damaged.
///
/// Use -o/--output to write raw bytes to a file (required for binary data).
/// Without -o, the message is printed as text.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    #[command(flatten)]
    pub carrier: CarrierArgs,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Output file for the decoded bytes
    /// If not specified, prints the decoded text to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let config = load_config()?;
        let key = self.key.require()?;
        let carrier = self.carrier.load()?;

        let decoder_config = DecoderConfig {
            framing: self.carrier.framing(&config),
        };

        let message = decode_with_config(&carrier, &key, &decoder_config)
            .context("Failed to decode message")?;

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, &message)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Decoded {} bytes to {}", message.len(), output_path.display());
        } else {
            let text = String::from_utf8(message)
                .map_err(StegoError::from)
                .context("Message is binary, use -o to write it to a file")?;
            println!("{}", text);
        }

        Ok(())
    }
}
