//! Crate-level error type.

use thiserror::Error;

use crate::crypto::{CipherError, KeyError};
use crate::frame::FrameError;
use crate::stego::{AudioStegoError, CapacityExceeded, ImageStegoError};

/// Errors returned by [`crate::encode`], [`crate::decode`] and carrier loading.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error(transparent)]
    Capacity(#[from] CapacityExceeded),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Audio(#[from] AudioStegoError),

    #[error(transparent)]
    Image(#[from] ImageStegoError),

    #[error("Decoded message is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Could not produce a ciphertext free of the end marker after {attempts} attempts")]
    FramingCollision { attempts: usize },

    #[error("Cannot detect carrier type of '{0}', specify it explicitly")]
    UnknownCarrierKind(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`StegoError`].
///
/// The first four need different corrective action from the user: a larger
/// carrier, a different carrier, a different key, or an intact artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CapacityExceeded,
    SentinelNotFound,
    Authentication,
    MalformedBitstream,
    Truncated,
    PayloadTooShort,
    FramingCollision,
    InvalidKey,
    InvalidUtf8,
    UnsupportedFormat,
    Io,
}

impl ErrorKind {
    /// Stable short name.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::CapacityExceeded => "capacity-exceeded",
            ErrorKind::SentinelNotFound => "sentinel-not-found",
            ErrorKind::Authentication => "authentication",
            ErrorKind::MalformedBitstream => "malformed-bitstream",
            ErrorKind::Truncated => "truncated",
            ErrorKind::PayloadTooShort => "payload-too-short",
            ErrorKind::FramingCollision => "framing-collision",
            ErrorKind::InvalidKey => "invalid-key",
            ErrorKind::InvalidUtf8 => "invalid-utf8",
            ErrorKind::UnsupportedFormat => "unsupported-format",
            ErrorKind::Io => "io",
        }
    }

    /// What the user can do about it.
    pub fn hint(self) -> &'static str {
        match self {
            ErrorKind::CapacityExceeded => "use a larger carrier or a shorter message",
            ErrorKind::SentinelNotFound => {
                "this carrier holds no hidden message for this scheme; check you picked the stego file, not the original"
            }
            ErrorKind::Authentication => "the key is wrong or the carrier was modified after encoding",
            ErrorKind::MalformedBitstream | ErrorKind::Truncated | ErrorKind::PayloadTooShort => {
                "the carrier is corrupted or truncated; use the file exactly as it was produced"
            }
            ErrorKind::FramingCollision => "retry the encode",
            ErrorKind::InvalidKey => "pass the 44-character base64 key or a key file",
            ErrorKind::InvalidUtf8 => "the message is binary; write it to a file instead",
            ErrorKind::UnsupportedFormat => "convert the carrier to WAV (PCM) or PNG/BMP first",
            ErrorKind::Io => "check the file paths and permissions",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StegoError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StegoError::Capacity(_)
            | StegoError::Frame(FrameError::PayloadTooLarge { .. }) => ErrorKind::CapacityExceeded,
            StegoError::Frame(FrameError::SentinelNotFound) => ErrorKind::SentinelNotFound,
            StegoError::Frame(FrameError::MalformedBitstream { .. }) => ErrorKind::MalformedBitstream,
            StegoError::Frame(FrameError::Truncated { .. }) => ErrorKind::Truncated,
            StegoError::Cipher(CipherError::Authentication) => ErrorKind::Authentication,
            StegoError::Cipher(CipherError::PayloadTooShort { .. }) => ErrorKind::PayloadTooShort,
            StegoError::Cipher(CipherError::EncryptionFailed(_)) => ErrorKind::InvalidKey,
            StegoError::Key(KeyError::IoError(_)) => ErrorKind::Io,
            StegoError::Key(_) => ErrorKind::InvalidKey,
            StegoError::Audio(AudioStegoError::UnsupportedFormat(_))
            | StegoError::Image(ImageStegoError::UnsupportedFormat(_))
            | StegoError::UnknownCarrierKind(_) => ErrorKind::UnsupportedFormat,
            StegoError::Audio(AudioStegoError::InvalidPcm(_))
            | StegoError::Image(ImageStegoError::InvalidDimensions { .. }) => {
                ErrorKind::UnsupportedFormat
            }
            StegoError::Audio(_) | StegoError::Image(_) | StegoError::Io(_) => ErrorKind::Io,
            StegoError::InvalidUtf8(_) => ErrorKind::InvalidUtf8,
            StegoError::FramingCollision { .. } => ErrorKind::FramingCollision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let capacity: StegoError = CapacityExceeded {
            needed: 10,
            capacity: 5,
        }
        .into();
        let sentinel: StegoError = FrameError::SentinelNotFound.into();
        let auth: StegoError = CipherError::Authentication.into();
        let malformed: StegoError = FrameError::MalformedBitstream { bits: 3 }.into();

        assert_eq!(capacity.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(sentinel.kind(), ErrorKind::SentinelNotFound);
        assert_eq!(auth.kind(), ErrorKind::Authentication);
        assert_eq!(malformed.kind(), ErrorKind::MalformedBitstream);
    }

    #[test]
    fn test_messages_pass_through() {
        let err: StegoError = FrameError::SentinelNotFound.into();
        assert!(err.to_string().contains("End marker not found"));

        let err: StegoError = CapacityExceeded {
            needed: 301,
            capacity: 300,
        }
        .into();
        assert!(err.to_string().contains("need 301 bits"));
    }

    #[test]
    fn test_oversized_payload_is_a_capacity_error() {
        let err: StegoError = FrameError::PayloadTooLarge {
            len: 1 << 33,
            max: u32::MAX as usize,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    }

    #[test]
    fn test_key_errors_are_not_relabelled() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "shared.key");
        let err: StegoError = KeyError::IoError(io).into();
        assert_eq!(err.to_string(), "IO error: shared.key");
        assert_eq!(err.kind(), ErrorKind::Io);

        let err: StegoError = KeyError::InvalidKeyLength {
            expected: 32,
            got: 16,
        }
        .into();
        assert_eq!(err.to_string(), "Invalid key length: expected 32, got 16");
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::Authentication.to_string(), "authentication");
        assert!(!ErrorKind::SentinelNotFound.hint().is_empty());
    }
}
