//! Authenticated symmetric encryption of the hidden message.
//!
//! ChaCha20-Poly1305 with a fresh random 96-bit nonce per call.
//! Payload layout: nonce (12 bytes) || ciphertext || tag (16 bytes).

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use super::keys::SymmetricKey;

/// Nonce size for ChaCha20Poly1305.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Bytes added to every message by [`encrypt`].
pub const PAYLOAD_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Errors that can occur during symmetric encryption.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// The tag did not verify: wrong key, or the payload was altered.
    #[error("Authentication failed: wrong key or corrupted payload")]
    Authentication,

    #[error("Encrypted payload too short: {len} bytes, need at least 28")]
    PayloadTooShort { len: usize },
}

/// Encrypts a message under `key`.
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, CipherError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

    // Prepend nonce to ciphertext
    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypts and authenticates a payload produced by [`encrypt`].
pub fn decrypt(payload: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, CipherError> {
    if payload.len() < PAYLOAD_OVERHEAD {
        return Err(CipherError::PayloadTooShort { len: payload.len() });
    }

    let (nonce_bytes, ciphertext) = payload.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|_| CipherError::Authentication)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CipherError::Authentication)
}
