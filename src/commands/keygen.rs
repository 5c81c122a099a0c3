//! Key generation command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use stegkit::crypto::{format_fingerprint, SymmetricKey};

use super::CommandExecutor;

/// Generate a new secret key.
///
/// The key is printed in base64. Share it with the recipient over a separate
/// channel; anyone holding it can read the hidden messages.
#[derive(Args, Debug)]
pub struct KeygenCommand {
    /// Also write the key to this file (PEM, mode 0600)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

impl CommandExecutor for KeygenCommand {
    fn execute(&self) -> Result<()> {
        let key = SymmetricKey::generate();

        if let Some(path) = &self.output {
            if path.exists() && !self.force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            key.save_to_file(path)
                .with_context(|| format!("Failed to save key to {}", path.display()))?;
            eprintln!("Key written to {}", path.display());
        }

        println!("{}", key.to_base64());
        eprintln!();
        eprintln!("Fingerprint: {}", format_fingerprint(&key.fingerprint()));
        eprintln!();
        eprintln!("Keep this key secret. Share it with the recipient over a separate channel.");

        Ok(())
    }
}
