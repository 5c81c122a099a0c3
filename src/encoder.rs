//! Message encoding.
//!
//! This module orchestrates the encoding process:
//! 1. Check the framed payload will fit in the carrier
//! 2. Encrypt the message (nonce || ciphertext || tag)
//! 3. Re-encrypt with a fresh nonce if the ciphertext contains the end marker
//! 4. Frame the payload into bits
//! 5. Embed the bits into a copy of the carrier

use crate::config::{StegoConfig, DEFAULT_MAX_ENCRYPT_ATTEMPTS};
use crate::crypto::{encrypt, CipherError, SymmetricKey, PAYLOAD_OVERHEAD};
use crate::error::StegoError;
use crate::frame::{contains_sentinel, FrameFormat};
use crate::stego::{CapacityExceeded, Carrier};

/// Configuration for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// How the payload is delimited inside the carrier.
    pub framing: FrameFormat,
    /// Encryptions tried before giving up on a sentinel-free ciphertext.
    pub max_encrypt_attempts: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            framing: FrameFormat::default(),
            max_encrypt_attempts: DEFAULT_MAX_ENCRYPT_ATTEMPTS,
        }
    }
}

impl From<&StegoConfig> for EncoderConfig {
    fn from(config: &StegoConfig) -> Self {
        Self {
            framing: config.framing,
            max_encrypt_attempts: config.max_encrypt_attempts,
        }
    }
}

/// Result of encoding a message.
#[derive(Debug, Clone)]
pub struct EncodedCarrier<C> {
    /// The stego artifact.
    pub carrier: C,
    /// Size of the encrypted payload in bytes.
    pub payload_len: usize,
    /// Number of carrier bits written, framing included.
    pub bits_used: usize,
    /// Encryptions performed (more than one only after a marker collision).
    pub attempts: usize,
}

/// Encrypts `message` with `key` and hides it in a copy of `carrier`.
///
/// The input carrier is never modified.
///
/// # Errors
/// `Capacity` when the framed payload does not fit; nothing is written.
pub fn encode<C, M>(carrier: &C, message: M, key: &SymmetricKey) -> Result<C, StegoError>
where
    C: Carrier,
    M: AsRef<[u8]>,
{
    encode_with_config(carrier, message, key, &EncoderConfig::default()).map(|e| e.carrier)
}

/// Encodes a message with custom configuration.
pub fn encode_with_config<C, M>(
    carrier: &C,
    message: M,
    key: &SymmetricKey,
    config: &EncoderConfig,
) -> Result<EncodedCarrier<C>, StegoError>
where
    C: Carrier,
    M: AsRef<[u8]>,
{
    let message = message.as_ref();
    let payload_len = message.len() + PAYLOAD_OVERHEAD;
    config.framing.check_payload_len(payload_len)?;
    let needed = config.framing.framed_bits(payload_len);

    // Fail before spending any work on encryption
    if let Some(capacity) = carrier.capacity_bits() {
        log::debug!(
            "{} carrier: {} bits needed, {} available",
            carrier.kind(),
            needed,
            capacity
        );
        if needed > capacity {
            return Err(CapacityExceeded { needed, capacity }.into());
        }
    }

    let (payload, attempts) =
        encrypt_avoiding_marker(config.framing, config.max_encrypt_attempts, || {
            encrypt(message, key)
        })?;

    let bits = config.framing.frame(&payload)?;
    let stego = carrier.embed_bits(&bits)?;

    log::debug!(
        "Encoded {} byte message as {} byte payload in {} bits",
        message.len(),
        payload.len(),
        bits.len()
    );

    Ok(EncodedCarrier {
        carrier: stego,
        payload_len: payload.len(),
        bits_used: bits.len(),
        attempts,
    })
}

/// Calls `encrypt` until its output can be framed unambiguously.
///
/// With sentinel framing a ciphertext containing the end marker would be cut
/// short on decode, so it is discarded and `encrypt` is called again (each call
/// draws a fresh nonce). Returns the payload and the number of calls made.
fn encrypt_avoiding_marker<F>(
    framing: FrameFormat,
    max_attempts: usize,
    mut encrypt: F,
) -> Result<(Vec<u8>, usize), StegoError>
where
    F: FnMut() -> Result<Vec<u8>, CipherError>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let payload = encrypt()?;

        if framing != FrameFormat::Sentinel || !contains_sentinel(&payload) {
            return Ok((payload, attempts));
        }

        log::debug!("Ciphertext contains the end marker (attempt {}), re-encrypting", attempts);
        if attempts >= max_attempts {
            return Err(StegoError::FramingCollision { attempts });
        }
    }
}

/// Largest plaintext, in bytes, that fits in `carrier` with `framing`.
///
/// Accounts for the nonce, the tag and the framing overhead. Returns `None`
/// for carriers with unbounded capacity.
pub fn capacity_bytes<C: Carrier>(carrier: &C, framing: FrameFormat) -> Option<usize> {
    carrier
        .capacity_bits()
        .map(|bits| framing.max_payload_len(bits).saturating_sub(PAYLOAD_OVERHEAD))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::{ImageCarrier, TextCarrier};

    #[test]
    fn test_text_mark_count() {
        let key = SymmetricKey::generate();
        let stego = encode(&TextCarrier::new("Hello"), "Hi", &key).unwrap();

        // 8 * (12 + 2 + 16) + 16
        assert_eq!(stego.mark_count(), 256);
        assert_eq!(stego.visible_text(), "Hello");
    }

    #[test]
    fn test_encode_reports_sizes() {
        let key = SymmetricKey::generate();
        let config = EncoderConfig {
            framing: FrameFormat::LengthPrefixed,
            ..EncoderConfig::default()
        };

        let encoded =
            encode_with_config(&TextCarrier::new(""), b"abc", &key, &config).unwrap();

        assert_eq!(encoded.payload_len, 31);
        assert_eq!(encoded.bits_used, 32 + 31 * 8);
        assert_eq!(encoded.attempts, 1);
        assert_eq!(encoded.carrier.mark_count(), encoded.bits_used);
    }

    #[test]
    fn test_capacity_checked_before_encrypting() {
        let key = SymmetricKey::generate();
        // 4x4x3 = 48 bits, far below the 240 bits an empty message needs
        let image = ImageCarrier::from_rgb(4, 4, vec![7u8; 48]).unwrap();

        let err = encode(&image, "", &key).unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity(CapacityExceeded {
                needed: 240,
                capacity: 48
            })
        ));
    }

    #[test]
    fn test_capacity_bytes() {
        // 20x20x3 = 1200 bits -> (1200 - 16) / 8 = 148 bytes -> 120 plaintext
        let image = ImageCarrier::from_rgb(20, 20, vec![0u8; 1200]).unwrap();
        assert_eq!(capacity_bytes(&image, FrameFormat::Sentinel), Some(120));
        // (1200 - 32) / 8 = 146 -> 118
        assert_eq!(capacity_bytes(&image, FrameFormat::LengthPrefixed), Some(118));

        let tiny = ImageCarrier::from_rgb(1, 1, vec![0u8; 3]).unwrap();
        assert_eq!(capacity_bytes(&tiny, FrameFormat::Sentinel), Some(0));

        assert_eq!(capacity_bytes(&TextCarrier::new("x"), FrameFormat::Sentinel), None);
    }

    #[test]
    fn test_capacity_bytes_is_exact() {
        let key = SymmetricKey::generate();
        let image = ImageCarrier::from_rgb(20, 20, vec![0u8; 1200]).unwrap();
        let max = capacity_bytes(&image, FrameFormat::Sentinel).unwrap();

        assert!(encode(&image, vec![b'a'; max], &key).is_ok());
        assert!(matches!(
            encode(&image, vec![b'a'; max + 1], &key),
            Err(StegoError::Capacity(_))
        ));
    }

    /// 0xFF 0xFE is the end marker itself.
    const COLLIDING: [u8; 4] = [0x12, 0xFF, 0xFE, 0x34];

    #[test]
    fn test_collision_triggers_reencryption() {
        let mut calls = 0;
        let (payload, attempts) = encrypt_avoiding_marker(FrameFormat::Sentinel, 64, || {
            calls += 1;
            Ok(if calls < 3 { COLLIDING.to_vec() } else { vec![0x00; 4] })
        })
        .unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(payload, vec![0x00; 4]);
    }

    #[test]
    fn test_persistent_collision_gives_up() {
        let mut calls = 0;
        let result = encrypt_avoiding_marker(FrameFormat::Sentinel, 5, || {
            calls += 1;
            Ok(COLLIDING.to_vec())
        });

        assert!(matches!(result, Err(StegoError::FramingCollision { attempts: 5 })));
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_zero_attempts_still_encrypts_once() {
        let result = encrypt_avoiding_marker(FrameFormat::Sentinel, 0, || Ok(COLLIDING.to_vec()));
        assert!(matches!(result, Err(StegoError::FramingCollision { attempts: 1 })));
    }

    #[test]
    fn test_length_prefixed_accepts_marker_bytes() {
        let (payload, attempts) =
            encrypt_avoiding_marker(FrameFormat::LengthPrefixed, 64, || Ok(COLLIDING.to_vec()))
                .unwrap();

        assert_eq!(attempts, 1);
        assert_eq!(payload, COLLIDING.to_vec());
    }

    #[test]
    fn test_cipher_error_is_not_retried() {
        let mut calls = 0;
        let result = encrypt_avoiding_marker(FrameFormat::Sentinel, 64, || {
            calls += 1;
            Err(CipherError::EncryptionFailed("boom".to_string()))
        });

        assert!(matches!(result, Err(StegoError::Cipher(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_ciphertext_never_contains_marker() {
        let key = SymmetricKey::generate();
        for _ in 0..200 {
            let encoded = encode_with_config(
                &TextCarrier::new(""),
                b"x",
                &key,
                &EncoderConfig::default(),
            )
            .unwrap();
            let bits = encoded.carrier.extract_bits();
            assert_eq!(
                crate::frame::find_sentinel(&bits),
                Some(encoded.bits_used - crate::frame::SENTINEL_BITS)
            );
        }
    }
}
