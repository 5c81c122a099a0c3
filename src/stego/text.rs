//! Zero-width steganography for plain text.
//!
//! Each payload bit becomes one invisible code point appended after the
//! visible text: U+200B ZERO WIDTH SPACE for `1`, U+200C ZERO WIDTH NON-JOINER
//! for `0`. Rendering, word counts and copy/paste of the visible part are
//! unaffected. Capacity is unbounded.

use std::fs;
use std::path::Path;

use super::{CapacityExceeded, Carrier, CarrierKind};

/// Mark for a `1` bit.
pub const ZERO_WIDTH_ONE: char = '\u{200B}';

/// Mark for a `0` bit.
pub const ZERO_WIDTH_ZERO: char = '\u{200C}';

fn is_mark(c: char) -> bool {
    c == ZERO_WIDTH_ONE || c == ZERO_WIDTH_ZERO
}

/// A text carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCarrier {
    text: String,
}

impl TextCarrier {
    /// Wraps a string.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reads a UTF-8 text file. The content is kept byte for byte, including
    /// trailing newlines.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(fs::read_to_string(path)?))
    }

    /// Writes the text, marks included, to a file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, &self.text)
    }

    /// The full text, marks included.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the carrier and returns the full text.
    pub fn into_string(self) -> String {
        self.text
    }

    /// The text with every zero-width mark removed.
    pub fn visible_text(&self) -> String {
        self.text.chars().filter(|&c| !is_mark(c)).collect()
    }

    /// Number of zero-width marks in the text.
    pub fn mark_count(&self) -> usize {
        self.text.chars().filter(|&c| is_mark(c)).count()
    }
}

impl Carrier for TextCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Text
    }

    fn capacity_bits(&self) -> Option<usize> {
        None
    }

    fn embed_bits(&self, bits: &[bool]) -> Result<Self, CapacityExceeded> {
        // Old marks would be read back in front of the new payload
        let existing = self.mark_count();
        let mut text = if existing > 0 {
            log::warn!(
                "Base text already holds {} zero-width marks; removing them before embedding",
                existing
            );
            self.visible_text()
        } else {
            self.text.clone()
        };

        // ZWSP and ZWNJ are both 3 bytes in UTF-8
        text.reserve(bits.len() * 3);
        text.extend(
            bits.iter()
                .map(|&bit| if bit { ZERO_WIDTH_ONE } else { ZERO_WIDTH_ZERO }),
        );

        log::debug!("Appended {} zero-width marks", bits.len());
        Ok(Self { text })
    }

    fn extract_bits(&self) -> Vec<bool> {
        self.text
            .chars()
            .filter(|&c| is_mark(c))
            .map(|c| c == ZERO_WIDTH_ONE)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_appends_one_mark_per_bit() {
        let carrier = TextCarrier::new("Hello");
        let stego = carrier.embed_bits(&[true, false, false, true]).unwrap();

        assert_eq!(stego.as_str(), "Hello\u{200B}\u{200C}\u{200C}\u{200B}");
        assert_eq!(stego.mark_count(), 4);
        // Source is untouched
        assert_eq!(carrier.as_str(), "Hello");
    }

    #[test]
    fn test_extract_ignores_visible_text() {
        let text = TextCarrier::new("a\u{200B}b c\u{200C}\u{200C}\nd\u{200B}");
        assert_eq!(text.extract_bits(), vec![true, false, false, true]);
    }

    #[test]
    fn test_visible_text_invariance() {
        let base = "Dear team,\nthe meeting moved to 3pm. ñandú 🎉\n";
        let bits: Vec<bool> = (0..100).map(|i| i % 3 == 0).collect();

        let stego = TextCarrier::new(base).embed_bits(&bits).unwrap();

        assert_eq!(stego.visible_text(), base);
        assert_eq!(stego.extract_bits(), bits);
    }

    #[test]
    fn test_plain_text_has_no_bits() {
        assert!(TextCarrier::new("Hello").extract_bits().is_empty());
        assert!(TextCarrier::new("").extract_bits().is_empty());
    }

    #[test]
    fn test_unbounded_capacity() {
        let carrier = TextCarrier::new("");
        assert_eq!(carrier.capacity_bits(), None);

        let bits = vec![true; 10_000];
        let stego = carrier.embed_bits(&bits).unwrap();
        assert_eq!(stego.extract_bits().len(), 10_000);
    }

    #[test]
    fn test_existing_marks_are_replaced() {
        let used = TextCarrier::new("Hi").embed_bits(&[true, true, true]).unwrap();
        let reused = used.embed_bits(&[false]).unwrap();

        assert_eq!(reused.as_str(), "Hi\u{200C}");
        assert_eq!(reused.extract_bits(), vec![false]);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.txt");

        let stego = TextCarrier::new("line one\nline two\n")
            .embed_bits(&[false, true])
            .unwrap();
        stego.save(&path).unwrap();

        let loaded = TextCarrier::from_file(&path).unwrap();
        assert_eq!(loaded, stego);
    }
}
