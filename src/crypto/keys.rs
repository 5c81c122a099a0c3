//! Symmetric key generation and serialization.
//!
//! A key is 32 random bytes drawn from the operating system RNG. It travels
//! between sender and recipient out of band, either as a base64 string or as a
//! small PEM-style key file.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a symmetric key in bytes (ChaCha20-Poly1305).
pub const KEY_SIZE: usize = 32;

/// PEM header for stegkit key files.
const KEY_HEADER: &str = "-----BEGIN STEGKIT SYMMETRIC KEY-----";
const KEY_FOOTER: &str = "-----END STEGKIT SYMMETRIC KEY-----";

/// Errors that can occur during key operations.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid PEM format: {0}")]
    InvalidPemFormat(String),

    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A secret key shared by the encoder and the decoder of one session.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose the key in debug output
        f.debug_struct("SymmetricKey")
            .field("fingerprint", &self.short_fingerprint())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl SymmetricKey {
    /// Generates a new random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Builds a key from a slice, checking its length.
    pub fn from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; KEY_SIZE] = slice.try_into().map_err(|_| KeyError::InvalidKeyLength {
            expected: KEY_SIZE,
            got: slice.len(),
        })?;
        Ok(Self { bytes })
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Encodes the key as standard base64 (44 characters).
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }

    /// Parses a key from its base64 form. Surrounding whitespace is ignored.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let mut decoded = BASE64.decode(encoded.trim())?;
        let key = Self::from_slice(&decoded);
        decoded.zeroize();
        key
    }

    /// Encodes the key in PEM-style armour.
    pub fn to_pem(&self) -> String {
        format!("{}\n{}\n{}\n", KEY_HEADER, self.to_base64(), KEY_FOOTER)
    }

    /// Decodes a key from PEM-style armour.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let content = extract_pem_content(pem, KEY_HEADER, KEY_FOOTER)?;
        Self::from_base64(content)
    }

    /// SHA-256 of the key bytes.
    ///
    /// Both parties can compare fingerprints over a voice call to confirm they
    /// hold the same key without reading the key itself aloud.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.bytes);
        hasher.finalize().into()
    }

    /// First 8 bytes of the fingerprint as lowercase hex.
    pub fn short_fingerprint(&self) -> String {
        self.fingerprint()[..8]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Saves the key to a PEM file readable only by the owner.
    pub fn save_to_file(&self, path: &Path) -> Result<(), KeyError> {
        fs::write(path, self.to_pem())?;

        // Set restrictive permissions on the key file (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Loads a key file.
    ///
    /// Accepts either the PEM form written by [`SymmetricKey::save_to_file`] or
    /// a file holding nothing but the base64 key.
    pub fn load_from_file(path: &Path) -> Result<Self, KeyError> {
        let content = fs::read_to_string(path)?;
        if content.contains(KEY_HEADER) {
            Self::from_pem(&content)
        } else {
            Self::from_base64(&content)
        }
    }
}

/// Formats a fingerprint as colon-separated hex groups of two bytes.
pub fn format_fingerprint(hash: &[u8; 32]) -> String {
    hash.chunks(2)
        .map(|pair| pair.iter().map(|b| format!("{:02X}", b)).collect::<String>())
        .collect::<Vec<_>>()
        .join(":")
}

/// Extracts the base64 content from a PEM string.
fn extract_pem_content<'a>(pem: &'a str, header: &str, footer: &str) -> Result<&'a str, KeyError> {
    let start = pem
        .find(header)
        .ok_or_else(|| KeyError::InvalidPemFormat("Missing header".to_string()))?
        + header.len();

    let end = pem
        .find(footer)
        .ok_or_else(|| KeyError::InvalidPemFormat("Missing footer".to_string()))?;

    if start >= end {
        return Err(KeyError::InvalidPemFormat(
            "Header must come before footer".to_string(),
        ));
    }

    Ok(pem[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_key_generation() {
        let k1 = SymmetricKey::generate();
        let k2 = SymmetricKey::generate();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_base64_roundtrip() {
        let key = SymmetricKey::generate();
        let encoded = key.to_base64();
        assert_eq!(encoded.len(), 44);

        let decoded = SymmetricKey::from_base64(&format!("  {}\n", encoded)).unwrap();
        assert_eq!(key.as_bytes(), decoded.as_bytes());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let short = BASE64.encode([7u8; 16]);
        let result = SymmetricKey::from_base64(&short);

        assert!(matches!(
            result,
            Err(KeyError::InvalidKeyLength { expected: 32, got: 16 })
        ));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let result = SymmetricKey::from_base64("not base64 at all!");
        assert!(matches!(result, Err(KeyError::Base64Error(_))));
    }

    #[test]
    fn test_pem_headers() {
        let key = SymmetricKey::generate();
        let pem = key.to_pem();

        assert!(pem.starts_with("-----BEGIN STEGKIT SYMMETRIC KEY-----"));
        assert!(pem.trim_end().ends_with("-----END STEGKIT SYMMETRIC KEY-----"));

        let decoded = SymmetricKey::from_pem(&pem).unwrap();
        assert_eq!(key.as_bytes(), decoded.as_bytes());
    }

    #[test]
    fn test_pem_missing_footer() {
        let key = SymmetricKey::generate();
        let pem = format!("{}\n{}\n", KEY_HEADER, key.to_base64());

        assert!(matches!(
            SymmetricKey::from_pem(&pem),
            Err(KeyError::InvalidPemFormat(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.key");

        let key = SymmetricKey::generate();
        key.save_to_file(&path).unwrap();

        let loaded = SymmetricKey::load_from_file(&path).unwrap();
        assert_eq!(key.as_bytes(), loaded.as_bytes());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_load_bare_base64_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.key");

        let key = SymmetricKey::generate();
        fs::write(&path, format!("{}\n", key.to_base64())).unwrap();

        let loaded = SymmetricKey::load_from_file(&path).unwrap();
        assert_eq!(key.as_bytes(), loaded.as_bytes());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let key = SymmetricKey::from_bytes([42u8; KEY_SIZE]);
        assert_eq!(key.fingerprint(), key.clone().fingerprint());
        assert_eq!(key.short_fingerprint().len(), 16);

        let other = SymmetricKey::from_bytes([43u8; KEY_SIZE]);
        assert_ne!(key.fingerprint(), other.fingerprint());
    }

    #[test]
    fn test_format_fingerprint() {
        let formatted = format_fingerprint(&[0xAB; 32]);
        assert_eq!(formatted.split(':').count(), 16);
        assert!(formatted.starts_with("ABAB:ABAB"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = SymmetricKey::from_bytes([1u8; KEY_SIZE]);
        let debug = format!("{:?}", key);

        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&key.to_base64()));
    }
}
