//! WAV container encoding for raw speech PCM.
//!
//! The speech service returns headerless 16-bit little-endian PCM. Wrapping it
//! in a canonical 44-byte RIFF/WAVE header makes it playable by any decoder.

use crate::defaults::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE, WAV_HEADER_LEN};
use crate::error::{LessonError, Result};
use std::io::Cursor;

/// Linear PCM format code in the `fmt ` sub-chunk.
const PCM_FORMAT_TAG: u16 = 1;

/// Size of the `fmt ` sub-chunk body for linear PCM.
const FMT_CHUNK_LEN: u32 = 16;

/// Bytes of header counted by the RIFF size field besides the payload.
const RIFF_OVERHEAD: u32 = 36;

/// Sample layout of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Format produced by the speech service: 24kHz, mono, 16-bit.
    pub const SPEECH: WavFormat = WavFormat {
        sample_rate: SAMPLE_RATE,
        channels: CHANNELS,
        bits_per_sample: BITS_PER_SAMPLE,
    };

    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Bytes per sample frame (all channels).
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(LessonError::InvalidAudioFormat {
                message: "sample rate must be positive".to_string(),
            });
        }
        if self.channels == 0 {
            return Err(LessonError::InvalidAudioFormat {
                message: "channel count must be positive".to_string(),
            });
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(LessonError::InvalidAudioFormat {
                message: format!(
                    "bits per sample must be a positive multiple of 8, got {}",
                    self.bits_per_sample
                ),
            });
        }
        // byte_rate and block_align must fit their header fields
        let block_align = u32::from(self.channels) * u32::from(self.bits_per_sample / 8);
        if block_align > u32::from(u16::MAX)
            || self.sample_rate.checked_mul(block_align).is_none()
        {
            return Err(LessonError::InvalidAudioFormat {
                message: "format exceeds WAV header limits".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for WavFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

/// Wrap raw PCM bytes in a WAV container.
///
/// Output is exactly `44 + pcm.len()` bytes: the RIFF descriptor, a 16-byte
/// `fmt ` chunk and a `data` chunk holding `pcm` verbatim. All integer fields
/// are little-endian. A payload that ends mid-frame is rejected as
/// [`LessonError::InvalidAudioFormat`].
pub fn encode(pcm: &[u8], format: WavFormat) -> Result<Vec<u8>> {
    format.validate()?;

    let block_align = usize::from(format.block_align());
    if pcm.len() % block_align != 0 {
        return Err(LessonError::InvalidAudioFormat {
            message: format!(
                "PCM payload of {} bytes is not a whole number of {}-byte frames",
                pcm.len(),
                block_align
            ),
        });
    }

    let data_len = u32::try_from(pcm.len())
        .ok()
        .filter(|len| len.checked_add(RIFF_OVERHEAD).is_some())
        .ok_or_else(|| LessonError::InvalidAudioFormat {
            message: format!("PCM payload of {} bytes is too large for WAV", pcm.len()),
        })?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());

    // RIFF descriptor
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(RIFF_OVERHEAD + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&format.byte_rate().to_le_bytes());
    out.extend_from_slice(&format.block_align().to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data sub-chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);

    debug_assert_eq!(out.len(), WAV_HEADER_LEN + pcm.len());
    Ok(out)
}

/// Playback length of `pcm_len` bytes of audio in `format`, in seconds.
pub fn duration_secs(pcm_len: usize, format: WavFormat) -> f64 {
    let byte_rate = format.byte_rate();
    if byte_rate == 0 {
        return 0.0;
    }
    pcm_len as f64 / f64::from(byte_rate)
}

/// Header fields of a parsed WAV container.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub format: WavFormat,
    /// Length of the `data` chunk in bytes.
    pub data_len: usize,
    pub duration_secs: f64,
}

/// Parse a WAV container's header with a general-purpose reader.
pub fn probe(container: &[u8]) -> Result<WavInfo> {
    let reader = hound::WavReader::new(Cursor::new(container)).map_err(|e| {
        LessonError::InvalidAudioFormat {
            message: format!("Failed to parse WAV container: {}", e),
        }
    })?;

    let spec = reader.spec();
    let format = WavFormat::new(spec.sample_rate, spec.channels, spec.bits_per_sample);
    // hound counts individual samples across all channels
    let data_len = reader.len() as usize * usize::from(spec.bits_per_sample / 8);

    Ok(WavInfo {
        format,
        data_len,
        duration_secs: duration_secs(data_len, format),
    })
}
