//! LSB steganography for audio files.
//!
//! Hides bits in the least significant bit of every byte of the PCM data, in
//! the order the bytes are stored in the WAV data chunk. Capacity is one bit
//! per byte, so a 16-bit sample carries two payload bits.
//!
//! Supports uncompressed integer PCM WAV with 8, 16, 24 or 32 bits per sample.
//! Compressed inputs must be transcoded to PCM first and handed over with
//! [`AudioCarrier::from_pcm`].

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use thiserror::Error;

use super::{lsb, CapacityExceeded, Carrier, CarrierKind};

/// Errors that can occur during audio steganography.
#[derive(Error, Debug)]
pub enum AudioStegoError {
    #[error("Audio load error: {0}")]
    AudioLoadError(String),

    #[error("Audio save error: {0}")]
    AudioSaveError(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid PCM buffer: {0}")]
    InvalidPcm(String),
}

/// Format parameters of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavParams {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Bytes per sample (1 to 4).
    pub sample_width: u16,
    /// Frames per second.
    pub frame_rate: u32,
}

impl WavParams {
    /// Bytes in one frame (one sample for every channel).
    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.sample_width as usize
    }

    fn to_spec(self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.frame_rate,
            bits_per_sample: self.sample_width * 8,
            sample_format: SampleFormat::Int,
        }
    }

    fn from_spec(spec: &WavSpec) -> Result<Self, AudioStegoError> {
        if spec.sample_format != SampleFormat::Int {
            return Err(AudioStegoError::UnsupportedFormat(
                "Only integer PCM WAV is supported, got floating point samples".to_string(),
            ));
        }

        if spec.bits_per_sample % 8 != 0 || !(8..=32).contains(&spec.bits_per_sample) {
            return Err(AudioStegoError::UnsupportedFormat(format!(
                "Only 8, 16, 24 or 32-bit PCM is supported, got {} bits",
                spec.bits_per_sample
            )));
        }

        Ok(Self {
            channels: spec.channels,
            sample_width: spec.bits_per_sample / 8,
            frame_rate: spec.sample_rate,
        })
    }
}

/// Audio carrier: raw PCM frame bytes plus their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCarrier {
    params: WavParams,
    /// Little-endian sample bytes as stored in the data chunk.
    frames: Vec<u8>,
}

impl AudioCarrier {
    /// Wraps already decoded PCM frames.
    ///
    /// `frames` holds little-endian samples, interleaved by channel, with
    /// 8-bit samples unsigned and wider samples two's complement.
    pub fn from_pcm(frames: Vec<u8>, params: WavParams) -> Result<Self, AudioStegoError> {
        if params.channels == 0 {
            return Err(AudioStegoError::InvalidPcm("channel count is zero".to_string()));
        }

        if !(1..=4).contains(&params.sample_width) {
            return Err(AudioStegoError::UnsupportedFormat(format!(
                "sample width must be 1 to 4 bytes, got {}",
                params.sample_width
            )));
        }

        if frames.len() % params.frame_size() != 0 {
            return Err(AudioStegoError::InvalidPcm(format!(
                "{} bytes is not a whole number of {}-byte frames",
                frames.len(),
                params.frame_size()
            )));
        }

        Ok(Self { params, frames })
    }

    /// Creates a new AudioCarrier from a WAV file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AudioStegoError> {
        let reader =
            WavReader::open(path).map_err(load_error)?;

        Self::from_reader(reader)
    }

    /// Creates a new AudioCarrier from WAV bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AudioStegoError> {
        let cursor = Cursor::new(bytes);
        let reader =
            WavReader::new(cursor).map_err(load_error)?;

        Self::from_reader(reader)
    }

    /// Creates AudioCarrier from a WavReader.
    fn from_reader<R: Read + Seek>(reader: WavReader<R>) -> Result<Self, AudioStegoError> {
        let params = WavParams::from_spec(&reader.spec())?;
        let width = params.sample_width as usize;

        let mut frames = Vec::with_capacity(reader.len() as usize * width);
        for sample in reader.into_samples::<i32>() {
            let sample = sample.map_err(load_error)?;
            push_sample_bytes(&mut frames, sample, width);
        }

        Self::from_pcm(frames, params)
    }

    /// Returns the raw frame bytes.
    pub fn frames(&self) -> &[u8] {
        &self.frames
    }

    /// Consumes the carrier and returns frames and format.
    pub fn into_parts(self) -> (Vec<u8>, WavParams) {
        (self.frames, self.params)
    }

    /// Returns the audio format.
    pub fn params(&self) -> WavParams {
        self.params
    }

    /// Returns the number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len() / self.params.frame_size()
    }

    /// Returns the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.params.frame_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.params.frame_rate as f64
    }

    /// Saves the audio to a WAV file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AudioStegoError> {
        let writer = WavWriter::create(path, self.params.to_spec())
            .map_err(|e| AudioStegoError::AudioSaveError(e.to_string()))?;

        self.write_samples(writer)
    }

    /// Returns the audio as WAV bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, AudioStegoError> {
        let mut bytes = Vec::new();
        {
            let cursor = Cursor::new(&mut bytes);
            let writer = WavWriter::new(cursor, self.params.to_spec())
                .map_err(|e| AudioStegoError::AudioSaveError(e.to_string()))?;

            self.write_samples(writer)?;
        }
        Ok(bytes)
    }

    fn write_samples<W: std::io::Write + Seek>(
        &self,
        mut writer: WavWriter<W>,
    ) -> Result<(), AudioStegoError> {
        let width = self.params.sample_width as usize;

        for chunk in self.frames.chunks_exact(width) {
            writer
                .write_sample(sample_from_bytes(chunk))
                .map_err(|e| AudioStegoError::AudioSaveError(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| AudioStegoError::AudioSaveError(e.to_string()))
    }
}

impl Carrier for AudioCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Audio
    }

    /// One bit per frame byte.
    fn capacity_bits(&self) -> Option<usize> {
        Some(self.frames.len())
    }

    fn embed_bits(&self, bits: &[bool]) -> Result<Self, CapacityExceeded> {
        let mut frames = self.frames.clone();
        lsb::embed_into(&mut frames, bits)?;

        log::debug!(
            "Embedded {} bits into {} frame bytes",
            bits.len(),
            frames.len()
        );

        Ok(Self {
            params: self.params,
            frames,
        })
    }

    fn extract_bits(&self) -> Vec<bool> {
        lsb::extract(&self.frames)
    }
}

/// Keeps "not PCM" apart from "not a readable WAV".
fn load_error(err: hound::Error) -> AudioStegoError {
    match err {
        hound::Error::Unsupported => AudioStegoError::UnsupportedFormat(
            "WAV encoding is not integer PCM (ADPCM or another codec)".to_string(),
        ),
        other => AudioStegoError::AudioLoadError(other.to_string()),
    }
}

/// Appends the on-disk little-endian bytes of one sample.
///
/// hound hands out 8-bit samples re-centred around zero; WAV stores them
/// unsigned.
fn push_sample_bytes(out: &mut Vec<u8>, sample: i32, width: usize) {
    if width == 1 {
        out.push((sample + 128) as u8);
    } else {
        out.extend_from_slice(&sample.to_le_bytes()[..width]);
    }
}

/// Inverse of [`push_sample_bytes`] for one sample's bytes.
fn sample_from_bytes(bytes: &[u8]) -> i32 {
    match bytes.len() {
        1 => bytes[0] as i32 - 128,
        2 => i16::from_le_bytes([bytes[0], bytes[1]]) as i32,
        3 => {
            // Sign-extend from 24 bits
            let raw = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]);
            (raw << 8) >> 8
        }
        _ => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

#[cfg(test)]
fn create_test_audio(sample_count: usize) -> AudioCarrier {
    let params = WavParams {
        channels: 1,
        sample_width: 2,
        frame_rate: 44100,
    };

    // Generate a simple sine wave
    let mut frames = Vec::with_capacity(sample_count * 2);
    for i in 0..sample_count {
        let t = i as f64 / 44100.0;
        let sample = (f64::sin(2.0 * std::f64::consts::PI * 440.0 * t) * 16000.0) as i16;
        frames.extend_from_slice(&sample.to_le_bytes());
    }

    AudioCarrier::from_pcm(frames, params).unwrap()
}
