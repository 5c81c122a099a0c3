//! LSB (Least Significant Bit) steganography for images.
//!
//! Hides bits in the least significant bit of every colour channel byte.
//! The pixel matrix is flattened row-major, channel-minor (R, G, B of the
//! first pixel, then the next pixel), one bit per byte.
//!
//! Inputs of any format the `image` crate can decode are normalised to 8-bit
//! RGB (alpha dropped, palettes expanded). Output is written losslessly as
//! PNG or BMP only: re-encoding as JPEG would destroy the hidden bits.

use image::{DynamicImage, ImageError, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use super::{lsb, CapacityExceeded, Carrier, CarrierKind};

/// Colour channels per pixel.
const CHANNELS: usize = 3;

/// Errors that can occur during image steganography.
#[derive(Error, Debug)]
pub enum ImageStegoError {
    #[error("Image load error: {0}")]
    ImageLoadError(String),

    #[error("Image save error: {0}")]
    ImageSaveError(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Pixel buffer of {len} bytes does not match {width}x{height} RGB")]
    InvalidDimensions { width: u32, height: u32, len: usize },
}

/// Lossless formats a stego image may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOutputFormat {
    #[default]
    Png,
    Bmp,
}

impl ImageOutputFormat {
    fn to_image_format(self) -> ImageFormat {
        match self {
            ImageOutputFormat::Png => ImageFormat::Png,
            ImageOutputFormat::Bmp => ImageFormat::Bmp,
        }
    }

    /// Picks the output format for `path` from its extension.
    ///
    /// Returns `Ok(None)` when the path has no extension, and an error for
    /// lossy or unknown extensions.
    pub fn from_path(path: &Path) -> Result<Option<Self>, ImageStegoError> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Ok(None);
        };

        match ext.to_lowercase().as_str() {
            "png" => Ok(Some(ImageOutputFormat::Png)),
            "bmp" => Ok(Some(ImageOutputFormat::Bmp)),
            other => Err(ImageStegoError::UnsupportedFormat(format!(
                "'.{}' is not a lossless output format, use .png or .bmp",
                other
            ))),
        }
    }
}

impl std::str::FromStr for ImageOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ImageOutputFormat::Png),
            "bmp" => Ok(ImageOutputFormat::Bmp),
            other => Err(format!("unsupported image format '{}', use png or bmp", other)),
        }
    }
}

/// Image carrier: an 8-bit RGB pixel matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCarrier {
    image: RgbImage,
}

impl ImageCarrier {
    /// Wraps an already decoded `width x height x 3` RGB buffer.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageStegoError> {
        let len = pixels.len();
        let invalid = ImageStegoError::InvalidDimensions { width, height, len };

        // from_raw accepts oversized buffers, so check the exact size here
        if len != width as usize * height as usize * CHANNELS {
            return Err(invalid);
        }

        let image = RgbImage::from_raw(width, height, pixels).ok_or(invalid)?;
        Ok(Self { image })
    }

    /// Creates a new ImageCarrier from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageStegoError> {
        let image = image::open(path).map_err(load_error)?;
        Ok(Self::from_image(image))
    }

    /// Creates a new ImageCarrier from encoded image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageStegoError> {
        let image = image::load_from_memory(bytes).map_err(load_error)?;
        Ok(Self::from_image(image))
    }

    /// Creates a new ImageCarrier from a DynamicImage, converting it to RGB8.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The flattened pixel bytes, row-major, channel-minor.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Returns a reference to the underlying image.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Consumes self and returns the underlying image.
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Saves the image, choosing PNG or BMP from the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ImageStegoError> {
        self.save_or(path, ImageOutputFormat::default())
    }

    /// Saves the image, falling back to `default` when the path has no
    /// extension.
    pub fn save_or<P: AsRef<Path>>(
        &self,
        path: P,
        default: ImageOutputFormat,
    ) -> Result<(), ImageStegoError> {
        let path = path.as_ref();
        let format = ImageOutputFormat::from_path(path)?.unwrap_or(default);

        self.image
            .save_with_format(path, format.to_image_format())
            .map_err(|e| ImageStegoError::ImageSaveError(e.to_string()))
    }

    /// Returns the image encoded in the given lossless format.
    pub fn to_bytes(&self, format: ImageOutputFormat) -> Result<Vec<u8>, ImageStegoError> {
        let mut cursor = Cursor::new(Vec::new());
        self.image
            .write_to(&mut cursor, format.to_image_format())
            .map_err(|e| ImageStegoError::ImageSaveError(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Returns the image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ImageStegoError> {
        self.to_bytes(ImageOutputFormat::Png)
    }
}

/// Keeps "format not compiled in" apart from "file unreadable".
fn load_error(err: ImageError) -> ImageStegoError {
    match err {
        ImageError::Unsupported(e) => ImageStegoError::UnsupportedFormat(e.to_string()),
        other => ImageStegoError::ImageLoadError(other.to_string()),
    }
}

impl Carrier for ImageCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Image
    }

    /// width * height * 3 bits.
    fn capacity_bits(&self) -> Option<usize> {
        Some(self.image.width() as usize * self.image.height() as usize * CHANNELS)
    }

    fn embed_bits(&self, bits: &[bool]) -> Result<Self, CapacityExceeded> {
        let mut image = self.image.clone();
        lsb::embed_into(&mut image, bits)?;

        log::debug!(
            "Embedded {} bits into {}x{} image",
            bits.len(),
            image.width(),
            image.height()
        );

        Ok(Self { image })
    }

    fn extract_bits(&self) -> Vec<bool> {
        lsb::extract(self.image.as_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba, RgbaImage};

    fn create_test_image(width: u32, height: u32) -> ImageCarrier {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        ImageCarrier::from_image(DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn test_capacity() {
        let image = create_test_image(100, 100);
        // 100x100 = 10000 pixels, 3 channels, 1 bit each
        assert_eq!(image.capacity_bits(), Some(30000));
    }

    #[test]
    fn test_flatten_order() {
        // 2x1 image: pixel (0,0) then (1,0), channels R, G, B
        let image = ImageCarrier::from_rgb(2, 1, vec![0, 0, 0, 0, 0, 0]).unwrap();
        let stego = image
            .embed_bits(&[true, false, false, false, false, true])
            .unwrap();

        assert_eq!(stego.image().get_pixel(0, 0), &Rgb([1, 0, 0]));
        assert_eq!(stego.image().get_pixel(1, 0), &Rgb([0, 0, 1]));
    }

    #[test]
    fn test_embed_and_extract() {
        let image = create_test_image(40, 30);
        let bits: Vec<bool> = (0..1000).map(|i| i % 7 == 3).collect();

        let stego = image.embed_bits(&bits).unwrap();

        assert_eq!(stego.width(), 40);
        assert_eq!(stego.height(), 30);
        assert_eq!(&stego.extract_bits()[..1000], bits.as_slice());

        for (a, b) in image.pixels().iter().zip(stego.pixels()) {
            assert_eq!(a & 0xFE, b & 0xFE);
        }
        // Bytes past the payload are untouched
        assert_eq!(&image.pixels()[1000..], &stego.pixels()[1000..]);
    }

    #[test]
    fn test_capacity_boundary() {
        let image = create_test_image(10, 10);
        let before = image.clone();

        assert!(image.embed_bits(&vec![true; 300]).is_ok());

        let result = image.embed_bits(&vec![true; 301]);
        assert_eq!(
            result,
            Err(CapacityExceeded {
                needed: 301,
                capacity: 300
            })
        );
        assert_eq!(image, before);
    }

    #[test]
    fn test_from_rgb_rejects_wrong_length() {
        let result = ImageCarrier::from_rgb(4, 4, vec![0u8; 47]);
        assert!(matches!(
            result,
            Err(ImageStegoError::InvalidDimensions { width: 4, height: 4, len: 47 })
        ));
    }

    #[test]
    fn test_alpha_is_dropped() {
        let rgba: RgbaImage = ImageBuffer::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        let image = ImageCarrier::from_image(DynamicImage::ImageRgba8(rgba));

        assert_eq!(image.capacity_bits(), Some(18));
        assert_eq!(&image.pixels()[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_png_roundtrip() {
        let image = create_test_image(100, 100);
        let bits = vec![true, true, false, true];

        let stego = image.embed_bits(&bits).unwrap();

        // Convert to PNG bytes and back
        let png_bytes = stego.to_png_bytes().unwrap();
        let loaded = ImageCarrier::from_bytes(&png_bytes).unwrap();

        assert_eq!(loaded, stego);
    }

    #[test]
    fn test_bmp_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stego.bmp");

        let stego = create_test_image(16, 9).embed_bits(&[false; 20]).unwrap();
        stego.save(&path).unwrap();

        let loaded = ImageCarrier::from_file(&path).unwrap();
        assert_eq!(loaded, stego);
    }

    #[test]
    fn test_lossy_output_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let image = create_test_image(4, 4);

        let result = image.save(dir.path().join("out.jpg"));
        assert!(matches!(result, Err(ImageStegoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_tiff_input_unsupported() {
        // Little-endian TIFF magic; the tiff decoder is not built in
        let bytes = b"II*\x00\x08\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        let result = ImageCarrier::from_bytes(bytes);
        assert!(matches!(result, Err(ImageStegoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_extensionless_output_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let image = create_test_image(4, 4);

        image.save_or(&path, ImageOutputFormat::Bmp).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"BM");
    }
}
