//! Cryptographic operations for stegkit.
//!
//! This module provides:
//! - Symmetric key generation, fingerprinting and key files
//! - Authenticated encryption (ChaCha20Poly1305)

pub mod keys;
pub mod symmetric;

pub use keys::{format_fingerprint, KeyError, SymmetricKey, KEY_SIZE};
pub use symmetric::{decrypt, encrypt, CipherError, NONCE_SIZE, PAYLOAD_OVERHEAD, TAG_SIZE};
