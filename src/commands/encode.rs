//! Encode command - hide an encrypted message in a carrier.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stegkit::crypto::{format_fingerprint, SymmetricKey};
use stegkit::{encode_with_config, Carrier, EncoderConfig};

use super::{load_config, CarrierArgs, CommandExecutor, KeyArgs};

/// Encrypt a message and hide it in a text, WAV or image carrier.
///
/// Text carriers get invisible zero-width characters appended. Audio and
/// image carriers have the least significant bit of each byte replaced; the
/// result must be kept in a lossless format (WAV, PNG, BMP).
///
/// Without --key or --key-file a new key is generated and printed.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    #[command(flatten)]
    pub carrier: CarrierArgs,

    /// Where to write the stego carrier
    #[arg(short, long)]
    pub output: PathBuf,

    /// Text message to hide (read from stdin when neither this nor --message-file is given)
    #[arg(short, long, conflicts_with = "message_file")]
    pub message: Option<String>,

    /// File whose raw bytes are hidden instead of a text message
    #[arg(long)]
    pub message_file: Option<PathBuf>,

    #[command(flatten)]
    pub key: KeyArgs,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        let config = load_config()?;
        let carrier = self.carrier.load()?;
        let message = self.read_message()?;

        let key = match self.key.load()? {
            Some(key) => key,
            None => {
                let key = SymmetricKey::generate();
                eprintln!("No key given, generated a new one:");
                println!("{}", key.to_base64());
                eprintln!("Fingerprint: {}", format_fingerprint(&key.fingerprint()));
                eprintln!();
                key
            }
        };

        let encoder_config = EncoderConfig {
            framing: self.carrier.framing(&config),
            ..EncoderConfig::from(&config)
        };

        let encoded = encode_with_config(&carrier, &message, &key, &encoder_config)
            .context("Failed to encode message")?;

        encoded
            .carrier
            .save(&self.output, config.image_format)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        match encoded.carrier.capacity_bits() {
            Some(capacity) => eprintln!(
                "Hid {} bytes in {} ({} of {} bits used)",
                message.len(),
                self.output.display(),
                encoded.bits_used,
                capacity
            ),
            None => eprintln!(
                "Hid {} bytes in {} ({} zero-width characters)",
                message.len(),
                self.output.display(),
                encoded.bits_used
            ),
        }

        Ok(())
    }
}

impl EncodeCommand {
    fn read_message(&self) -> Result<Vec<u8>> {
        if let Some(message) = &self.message {
            return Ok(message.as_bytes().to_vec());
        }

        if let Some(path) = &self.message_file {
            return std::fs::read(path)
                .with_context(|| format!("Failed to read message from {}", path.display()));
        }

        eprintln!("Reading message from stdin (Ctrl+D to finish):");
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read message from stdin")?;
        Ok(buffer)
    }
}
