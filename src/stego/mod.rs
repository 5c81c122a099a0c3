//! Carriers that transport a hidden bit sequence.
//!
//! Supports:
//! - Text: zero-width Unicode marks appended to the visible text
//! - Audio: LSB of every PCM frame byte (WAV)
//! - Image: LSB of every RGB channel byte (PNG, BMP)
//!
//! Every carrier implements [`Carrier`], so framing and encryption are written
//! once in [`crate::encoder`] and [`crate::decoder`].

pub mod audio;
pub mod image;
pub mod lsb;
pub mod text;

pub use self::audio::{AudioCarrier, AudioStegoError, WavParams};
pub use self::image::{ImageCarrier, ImageOutputFormat, ImageStegoError};
pub use self::text::{TextCarrier, ZERO_WIDTH_ONE, ZERO_WIDTH_ZERO};

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::error::StegoError;

/// The bit sequence does not fit in the carrier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Carrier too small: need {needed} bits, have capacity for {capacity}")]
pub struct CapacityExceeded {
    /// Bits required by the framed payload.
    pub needed: usize,
    /// Bits the carrier can hold.
    pub capacity: usize,
}

/// A medium that can hide bits.
///
/// Embedding never modifies `self`; it returns a new carrier of the same type
/// and shape. Embedding and extraction are deterministic.
pub trait Carrier: Sized {
    /// Which kind of carrier this is.
    fn kind(&self) -> CarrierKind;

    /// Number of bits the carrier can hold, or `None` when unbounded.
    fn capacity_bits(&self) -> Option<usize>;

    /// Returns a copy of the carrier with `bits` written into it.
    ///
    /// Fails without writing anything when `bits` exceeds the capacity.
    fn embed_bits(&self, bits: &[bool]) -> Result<Self, CapacityExceeded>;

    /// Reads the carrier's whole bit channel.
    fn extract_bits(&self) -> Vec<bool>;
}

/// The three carrier families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Text,
    Audio,
    Image,
}

impl CarrierKind {
    /// Guesses the carrier kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" | "md" | "text" | "csv" | "json" | "xml" | "html" | "htm" => Some(Self::Text),
            "wav" | "wave" => Some(Self::Audio),
            "png" | "bmp" | "jpg" | "jpeg" | "gif" => Some(Self::Image),
            _ => None,
        }
    }
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CarrierKind::Text => "text",
            CarrierKind::Audio => "audio",
            CarrierKind::Image => "image",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for CarrierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(CarrierKind::Text),
            "audio" | "wav" => Ok(CarrierKind::Audio),
            "image" | "img" => Ok(CarrierKind::Image),
            other => Err(format!(
                "unknown carrier kind '{}', expected text, audio or image",
                other
            )),
        }
    }
}

/// Any of the supported carriers, chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyCarrier {
    Text(TextCarrier),
    Audio(AudioCarrier),
    Image(ImageCarrier),
}

impl AnyCarrier {
    /// Loads a carrier file.
    ///
    /// The kind is taken from `kind` when given, otherwise detected from the
    /// file extension.
    pub fn from_file(path: &Path, kind: Option<CarrierKind>) -> Result<Self, StegoError> {
        let kind = kind
            .or_else(|| CarrierKind::from_path(path))
            .ok_or_else(|| StegoError::UnknownCarrierKind(path.display().to_string()))?;

        log::debug!("Loading {} carrier from {}", kind, path.display());

        let carrier = match kind {
            CarrierKind::Text => AnyCarrier::Text(TextCarrier::from_file(path)?),
            CarrierKind::Audio => AnyCarrier::Audio(AudioCarrier::from_file(path)?),
            CarrierKind::Image => AnyCarrier::Image(ImageCarrier::from_file(path)?),
        };
        Ok(carrier)
    }

    /// Writes the carrier to `path` in its native container.
    ///
    /// Images use `default_image_format` when the path has no recognised
    /// extension.
    pub fn save(&self, path: &Path, default_image_format: ImageOutputFormat) -> Result<(), StegoError> {
        match self {
            AnyCarrier::Text(c) => c.save(path)?,
            AnyCarrier::Audio(c) => c.save(path)?,
            AnyCarrier::Image(c) => c.save_or(path, default_image_format)?,
        }
        Ok(())
    }

    /// Short human-readable description, e.g. `image 640x480`.
    pub fn describe(&self) -> String {
        match self {
            AnyCarrier::Text(c) => format!("text ({} chars)", c.visible_text().chars().count()),
            AnyCarrier::Audio(c) => {
                let p = c.params();
                format!(
                    "audio ({} ch, {}-bit, {} Hz, {:.1}s)",
                    p.channels,
                    p.sample_width * 8,
                    p.frame_rate,
                    c.duration_secs()
                )
            }
            AnyCarrier::Image(c) => format!("image {}x{}", c.width(), c.height()),
        }
    }
}

impl Carrier for AnyCarrier {
    fn kind(&self) -> CarrierKind {
        match self {
            AnyCarrier::Text(c) => c.kind(),
            AnyCarrier::Audio(c) => c.kind(),
            AnyCarrier::Image(c) => c.kind(),
        }
    }

    fn capacity_bits(&self) -> Option<usize> {
        match self {
            AnyCarrier::Text(c) => c.capacity_bits(),
            AnyCarrier::Audio(c) => c.capacity_bits(),
            AnyCarrier::Image(c) => c.capacity_bits(),
        }
    }

    fn embed_bits(&self, bits: &[bool]) -> Result<Self, CapacityExceeded> {
        Ok(match self {
            AnyCarrier::Text(c) => AnyCarrier::Text(c.embed_bits(bits)?),
            AnyCarrier::Audio(c) => AnyCarrier::Audio(c.embed_bits(bits)?),
            AnyCarrier::Image(c) => AnyCarrier::Image(c.embed_bits(bits)?),
        })
    }

    fn extract_bits(&self) -> Vec<bool> {
        match self {
            AnyCarrier::Text(c) => c.extract_bits(),
            AnyCarrier::Audio(c) => c.extract_bits(),
            AnyCarrier::Image(c) => c.extract_bits(),
        }
    }
}

impl From<TextCarrier> for AnyCarrier {
    fn from(c: TextCarrier) -> Self {
        AnyCarrier::Text(c)
    }
}

impl From<AudioCarrier> for AnyCarrier {
    fn from(c: AudioCarrier) -> Self {
        AnyCarrier::Audio(c)
    }
}

impl From<ImageCarrier> for AnyCarrier {
    fn from(c: ImageCarrier) -> Self {
        AnyCarrier::Image(c)
    }
}
