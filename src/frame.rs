//! Bit framing of the encrypted payload.
//!
//! Carriers transport a flat sequence of bits. Two framings are supported:
//!
//! - [`FrameFormat::Sentinel`] (default): payload bits MSB-first followed by
//!   the 16-bit end marker `1111111111111110`.
//! - [`FrameFormat::LengthPrefixed`]: a 32-bit big-endian byte count followed
//!   by the payload bits. Immune to sentinel collisions, not compatible with
//!   sentinel-framed carriers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// End-of-payload marker for sentinel framing.
pub const SENTINEL: [bool; 16] = [
    true, true, true, true, true, true, true, true, //
    true, true, true, true, true, true, true, false,
];

/// Bits in the sentinel.
pub const SENTINEL_BITS: usize = SENTINEL.len();

/// Bits in the length header of length-prefixed framing.
pub const LENGTH_HEADER_BITS: usize = 32;

/// Errors that can occur while parsing a framed bit sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("End marker not found: not a stego carrier, or it was truncated")]
    SentinelNotFound,

    #[error("Malformed bitstream: {bits} bits before the end marker is not a whole number of bytes")]
    MalformedBitstream { bits: usize },

    #[error("Bitstream truncated: need {needed} bits, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Payload of {len} bytes exceeds the {max} byte limit of the length header")]
    PayloadTooLarge { len: usize, max: usize },
}

/// How a payload is delimited inside the carrier's bit channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameFormat {
    /// Payload followed by the 16-bit end marker.
    #[default]
    Sentinel,
    /// 32-bit big-endian byte count, then the payload.
    LengthPrefixed,
}

impl FrameFormat {
    /// Number of bits a payload of `payload_len` bytes occupies once framed.
    pub fn framed_bits(self, payload_len: usize) -> usize {
        match self {
            FrameFormat::Sentinel => payload_len * 8 + SENTINEL_BITS,
            FrameFormat::LengthPrefixed => LENGTH_HEADER_BITS + payload_len * 8,
        }
    }

    /// Largest payload (in bytes) that fits in `capacity_bits`.
    pub fn max_payload_len(self, capacity_bits: usize) -> usize {
        let overhead = match self {
            FrameFormat::Sentinel => SENTINEL_BITS,
            FrameFormat::LengthPrefixed => LENGTH_HEADER_BITS,
        };
        capacity_bits.saturating_sub(overhead) / 8
    }

    /// Checks that a payload of `len` bytes can be represented.
    ///
    /// Sentinel framing has no limit; the length header holds at most
    /// `u32::MAX`.
    pub fn check_payload_len(self, len: usize) -> Result<(), FrameError> {
        match self {
            FrameFormat::Sentinel => Ok(()),
            FrameFormat::LengthPrefixed => header_len(len).map(|_| ()),
        }
    }

    /// Frames `payload` into bits.
    pub fn frame(self, payload: &[u8]) -> Result<Vec<bool>, FrameError> {
        match self {
            FrameFormat::Sentinel => Ok(to_bits(payload)),
            FrameFormat::LengthPrefixed => to_bits_length_prefixed(payload),
        }
    }

    /// Recovers the payload from a carrier's bit channel.
    pub fn unframe(self, bits: &[bool]) -> Result<Vec<u8>, FrameError> {
        match self {
            FrameFormat::Sentinel => from_bits(bits),
            FrameFormat::LengthPrefixed => from_bits_length_prefixed(bits),
        }
    }
}

impl std::str::FromStr for FrameFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sentinel" => Ok(FrameFormat::Sentinel),
            "length-prefixed" | "length" => Ok(FrameFormat::LengthPrefixed),
            other => Err(format!(
                "unknown framing '{}', expected 'sentinel' or 'length-prefixed'",
                other
            )),
        }
    }
}

/// Expands bytes into bits, most significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    push_byte_bits(&mut bits, bytes);
    bits
}

/// Packs bits into bytes, 8 at a time, most significant bit first.
///
/// `bits.len()` must be a multiple of 8; callers check this.
fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |byte, &bit| (byte << 1) | bit as u8))
        .collect()
}

fn push_byte_bits(bits: &mut Vec<bool>, bytes: &[u8]) {
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
}

/// Frames a payload with the sentinel: `8 * len + 16` bits.
pub fn to_bits(payload: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(payload.len() * 8 + SENTINEL_BITS);
    push_byte_bits(&mut bits, payload);
    bits.extend_from_slice(&SENTINEL);
    bits
}

/// Returns the payload preceding the first occurrence of the sentinel.
///
/// The sentinel is searched at every bit offset, not only on byte boundaries.
pub fn from_bits(bits: &[bool]) -> Result<Vec<u8>, FrameError> {
    let end = find_sentinel(bits).ok_or(FrameError::SentinelNotFound)?;

    if end % 8 != 0 {
        return Err(FrameError::MalformedBitstream { bits: end });
    }

    Ok(bits_to_bytes(&bits[..end]))
}

/// Index of the first bit of the first sentinel occurrence.
pub fn find_sentinel(bits: &[bool]) -> Option<usize> {
    bits.windows(SENTINEL_BITS).position(|w| w == SENTINEL)
}

/// Whether the framed bits of `payload` would hit the sentinel early.
///
/// A sentinel-framed payload decodes correctly only when its own bits do not
/// contain the marker. Because the marker ends in a `0` preceded by fifteen
/// `1`s, no window straddling the payload/marker boundary can match, so only
/// the payload itself needs checking.
pub fn contains_sentinel(payload: &[u8]) -> bool {
    find_sentinel(&bytes_to_bits(payload)).is_some()
}

fn header_len(len: usize) -> Result<u32, FrameError> {
    u32::try_from(len).map_err(|_| FrameError::PayloadTooLarge {
        len,
        max: u32::MAX as usize,
    })
}

/// Frames a payload behind a 32-bit big-endian length header.
pub fn to_bits_length_prefixed(payload: &[u8]) -> Result<Vec<bool>, FrameError> {
    let len = header_len(payload.len())?;
    let mut bits = Vec::with_capacity(LENGTH_HEADER_BITS + payload.len() * 8);
    push_byte_bits(&mut bits, &len.to_be_bytes());
    push_byte_bits(&mut bits, payload);
    Ok(bits)
}

/// Reads a length-prefixed payload; trailing bits are ignored.
pub fn from_bits_length_prefixed(bits: &[bool]) -> Result<Vec<u8>, FrameError> {
    if bits.len() < LENGTH_HEADER_BITS {
        return Err(FrameError::Truncated {
            needed: LENGTH_HEADER_BITS,
            available: bits.len(),
        });
    }

    let header = bits_to_bytes(&bits[..LENGTH_HEADER_BITS]);
    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;

    // Sanity check before any allocation
    let needed = len
        .checked_mul(8)
        .and_then(|b| b.checked_add(LENGTH_HEADER_BITS))
        .unwrap_or(usize::MAX);
    if needed > bits.len() {
        return Err(FrameError::Truncated {
            needed,
            available: bits.len(),
        });
    }

    Ok(bits_to_bytes(&bits[LENGTH_HEADER_BITS..needed]))
}
