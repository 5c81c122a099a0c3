//! Message decoding.
//!
//! This module orchestrates the decoding process:
//! 1. Read the carrier's whole bit channel
//! 2. Unframe the payload (end marker or length header)
//! 3. Decrypt and authenticate it
//!
//! Every failure is terminal. A carrier without a hidden message, a wrong key
//! and a damaged artifact each give a distinct error.

use crate::crypto::{decrypt, SymmetricKey};
use crate::error::StegoError;
use crate::frame::FrameFormat;
use crate::stego::Carrier;

/// Configuration for the decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// How the payload was delimited when it was embedded.
    pub framing: FrameFormat,
}

impl From<&crate::config::StegoConfig> for DecoderConfig {
    fn from(config: &crate::config::StegoConfig) -> Self {
        Self {
            framing: config.framing,
        }
    }
}

/// Recovers the message hidden in `carrier`.
///
/// # Errors
/// - `SentinelNotFound` when the carrier holds no framed payload
/// - `MalformedBitstream` when the payload is not a whole number of bytes
/// - `Authentication` when the key is wrong or the payload was altered
pub fn decode<C: Carrier>(carrier: &C, key: &SymmetricKey) -> Result<Vec<u8>, StegoError> {
    decode_with_config(carrier, key, &DecoderConfig::default())
}

/// Decodes a message with custom configuration.
pub fn decode_with_config<C: Carrier>(
    carrier: &C,
    key: &SymmetricKey,
    config: &DecoderConfig,
) -> Result<Vec<u8>, StegoError> {
    let bits = carrier.extract_bits();
    log::debug!("Read {} bits from {} carrier", bits.len(), carrier.kind());

    let payload = config.framing.unframe(&bits)?;
    log::debug!("Unframed {} byte payload", payload.len());

    let message = decrypt(&payload, key)?;
    Ok(message)
}

/// Like [`decode`], but requires the message to be UTF-8 text.
pub fn decode_to_string<C: Carrier>(carrier: &C, key: &SymmetricKey) -> Result<String, StegoError> {
    Ok(String::from_utf8(decode(carrier, key)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::error::ErrorKind;
    use crate::stego::{AudioCarrier, TextCarrier, WavParams};

    #[test]
    fn test_hello_hi_scenario() {
        let key = SymmetricKey::generate();
        let stego = encode(&TextCarrier::new("Hello"), "Hi", &key).unwrap();

        assert_eq!(decode_to_string(&stego, &key).unwrap(), "Hi");

        let wrong = SymmetricKey::generate();
        let err = decode(&stego, &wrong).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = decode(&TextCarrier::new("Hello"), &key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SentinelNotFound);
    }

    #[test]
    fn test_marks_not_whole_bytes() {
        // Three bits, then the end marker
        let mut text = String::from("x\u{200B}\u{200C}\u{200B}");
        text.extend(std::iter::repeat('\u{200B}').take(15));
        text.push('\u{200C}');

        let err = decode(&TextCarrier::new(text), &SymmetricKey::generate()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedBitstream);
    }

    #[test]
    fn test_short_payload() {
        // One byte before the marker cannot hold a nonce and tag
        let mut text = String::new();
        text.extend(std::iter::repeat('\u{200C}').take(8));
        text.extend(std::iter::repeat('\u{200B}').take(15));
        text.push('\u{200C}');

        let err = decode(&TextCarrier::new(text), &SymmetricKey::generate()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PayloadTooShort);
    }

    #[test]
    fn test_framing_must_match() {
        let key = SymmetricKey::generate();
        let params = WavParams {
            channels: 1,
            sample_width: 2,
            frame_rate: 8000,
        };
        let audio = AudioCarrier::from_pcm(vec![0u8; 4000], params).unwrap();
        let stego = encode(&audio, "framed", &key).unwrap();

        let config = DecoderConfig {
            framing: FrameFormat::LengthPrefixed,
        };
        assert!(decode_with_config(&stego, &key, &config).is_err());
        assert_eq!(decode(&stego, &key).unwrap(), b"framed");
    }

    #[test]
    fn test_binary_message_is_not_a_string() {
        let key = SymmetricKey::generate();
        let stego = encode(&TextCarrier::new(""), [0xFFu8, 0xFE, 0x00], &key).unwrap();

        assert_eq!(decode(&stego, &key).unwrap(), vec![0xFF, 0xFE, 0x00]);
        let err = decode_to_string(&stego, &key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUtf8);
    }
}
