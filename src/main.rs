//! Stegkit - Hide encrypted messages in text, audio and images
//!
//! A CLI tool for authenticated steganography.

mod commands;

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;

use commands::{
    CapacityCommand, CommandExecutor, DecodeCommand, EncodeCommand, FingerprintCommand,
    KeygenCommand,
};
use stegkit::{ErrorKind, StegoError};

/// Stegkit - Hide encrypted messages in text, audio and images
///
/// Messages are encrypted with a shared secret key before being hidden, so
/// only holders of the key can read them.
#[derive(Parser)]
#[command(name = "stegkit")]
#[command(version)]
#[command(about = "Hide encrypted messages in text, WAV audio and PNG/BMP images")]
#[command(long_about = None)]
struct Cli {
    /// Show debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new secret key
    Keygen(KeygenCommand),

    /// Show a key's fingerprint for out-of-band verification
    Fingerprint(FingerprintCommand),

    /// Encrypt a message and hide it in a carrier
    Encode(EncodeCommand),

    /// Extract and decrypt a hidden message
    Decode(DecodeCommand),

    /// Show how much a carrier can hold
    Capacity(CapacityCommand),
}

impl Commands {
    fn executor(&self) -> &dyn CommandExecutor {
        match self {
            Commands::Keygen(cmd) => cmd,
            Commands::Fingerprint(cmd) => cmd,
            Commands::Encode(cmd) => cmd,
            Commands::Decode(cmd) => cmd,
            Commands::Capacity(cmd) => cmd,
        }
    }
}

fn init_logger(verbose: bool) {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(LevelFilter::Warn);

    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.init();
}

/// Process exit status for each failure class.
fn exit_code(kind: Option<ErrorKind>) -> u8 {
    match kind {
        Some(ErrorKind::CapacityExceeded) => 3,
        Some(ErrorKind::SentinelNotFound) => 4,
        Some(ErrorKind::Authentication) => 5,
        Some(ErrorKind::MalformedBitstream | ErrorKind::Truncated | ErrorKind::PayloadTooShort) => 6,
        Some(ErrorKind::UnsupportedFormat) => 7,
        Some(ErrorKind::InvalidKey) => 8,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command.executor().execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<StegoError>())
                .map(StegoError::kind);

            eprintln!("Error: {:#}", err);
            if let Some(kind) = kind {
                eprintln!("Hint: {}", kind.hint());
            }

            ExitCode::from(exit_code(kind))
        }
    }
}
