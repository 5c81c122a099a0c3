//! # Stegkit - Hide encrypted messages in text, audio and images
//!
//! Stegkit encrypts a message with a shared secret key and hides the
//! resulting ciphertext inside an innocuous carrier:
//! - **Text**: invisible zero-width Unicode marks appended to the text
//! - **Audio**: the least significant bit of every PCM byte of a WAV file
//! - **Image**: the least significant bit of every RGB channel byte
//!
//! ## Pipeline
//!
//! ```text
//! message -> encrypt (ChaCha20-Poly1305) -> frame (bits + end marker) -> embed
//! carrier -> extract -> unframe -> decrypt (authenticated) -> message
//! ```
//!
//! Decoding distinguishes a carrier with no hidden message
//! ([`ErrorKind::SentinelNotFound`]) from a wrong key or tampered artifact
//! ([`ErrorKind::Authentication`]).
//!
//! ## Example Usage
//!
//! ```rust
//! use stegkit::crypto::SymmetricKey;
//! use stegkit::stego::TextCarrier;
//! use stegkit::{decode_to_string, encode};
//!
//! let key = SymmetricKey::generate();
//!
//! let stego = encode(&TextCarrier::new("Hello"), "Hi", &key).unwrap();
//! assert_eq!(stego.visible_text(), "Hello");
//!
//! let message = decode_to_string(&stego, &key).unwrap();
//! assert_eq!(message, "Hi");
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: Keys and authenticated encryption
//! - [`frame`]: Bit framing (end marker or length header)
//! - [`stego`]: Text, audio and image carriers
//! - [`encoder`]: Message encoding
//! - [`decoder`]: Message decoding
//! - [`config`]: User configuration file

pub mod config;
pub mod crypto;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod stego;

// Re-export commonly used types at the crate root
pub use config::{ConfigError, StegoConfig};
pub use crypto::SymmetricKey;
pub use decoder::{decode, decode_to_string, decode_with_config, DecoderConfig};
pub use encoder::{capacity_bytes, encode, encode_with_config, EncodedCarrier, EncoderConfig};
pub use error::{ErrorKind, StegoError};
pub use frame::FrameFormat;
pub use stego::{
    AnyCarrier, AudioCarrier, CapacityExceeded, Carrier, CarrierKind, ImageCarrier,
    ImageOutputFormat, TextCarrier, WavParams,
};
