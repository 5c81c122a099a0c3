//! Least-significant-bit channel over a flat byte buffer.
//!
//! One payload bit per byte: bit `i` replaces the low bit of byte `i`, the
//! other seven bits are left alone. Audio frames and image channels both
//! reduce to this after flattening.

use super::CapacityExceeded;

/// Writes `bits` into the low bits of `bytes`, front to back.
///
/// Capacity is checked before the first write, so on error `bytes` is left
/// untouched.
pub fn embed_into(bytes: &mut [u8], bits: &[bool]) -> Result<(), CapacityExceeded> {
    if bits.len() > bytes.len() {
        return Err(CapacityExceeded {
            needed: bits.len(),
            capacity: bytes.len(),
        });
    }

    for (byte, &bit) in bytes.iter_mut().zip(bits) {
        // Clear LSB and set new bit
        *byte = (*byte & 0xFE) | bit as u8;
    }

    Ok(())
}

/// Reads the low bit of every byte, in order.
pub fn extract(bytes: &[u8]) -> Vec<bool> {
    bytes.iter().map(|byte| byte & 1 == 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_sets_only_low_bits() {
        let mut bytes = vec![0b1010_1010, 0b0101_0101, 0xFF, 0x00, 0x7E];
        let original = bytes.clone();

        embed_into(&mut bytes, &[true, false, false, true]).unwrap();

        assert_eq!(bytes, vec![0b1010_1011, 0b0101_0100, 0xFE, 0x01, 0x7E]);
        for (a, b) in bytes.iter().zip(&original) {
            assert_eq!(a & 0xFE, b & 0xFE);
        }
    }

    #[test]
    fn test_extract_reads_every_byte() {
        assert_eq!(
            extract(&[0x01, 0x02, 0x03, 0xFE]),
            vec![true, false, true, false]
        );
        assert!(extract(&[]).is_empty());
    }

    #[test]
    fn test_exact_capacity() {
        let mut bytes = vec![0u8; 8];
        let bits = vec![true; 8];

        embed_into(&mut bytes, &bits).unwrap();
        assert_eq!(extract(&bytes), bits);
    }

    #[test]
    fn test_over_capacity_leaves_buffer_untouched() {
        let mut bytes = vec![0x10u8; 8];
        let result = embed_into(&mut bytes, &[true; 9]);

        assert_eq!(
            result,
            Err(CapacityExceeded {
                needed: 9,
                capacity: 8
            })
        );
        assert_eq!(bytes, vec![0x10u8; 8]);
    }
}
