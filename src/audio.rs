//! Interleaved `f32` audio buffers.

use crate::foundation::error::{BakeError, BakeResult};

/// Channel layout and sample rate of an audio stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AudioInfo {
    /// Interleaved channel count.
    pub channels: u16,
    /// Samples per second, per channel.
    pub sample_rate: u32,
}

impl AudioInfo {
    /// Create an audio description.
    pub const fn new(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    /// `true` when both channel count and sample rate are non-zero.
    pub fn is_valid(&self) -> bool {
        self.channels > 0 && self.sample_rate > 0
    }
}

/// A block of interleaved `f32` samples.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    info: AudioInfo,
    data: Vec<f32>,
}

impl AudioBuffer {
    /// Wrap interleaved samples; the length must be a multiple of the channel count.
    pub fn new(info: AudioInfo, data: Vec<f32>) -> BakeResult<Self> {
        if !info.is_valid() {
            return Err(BakeError::validation(
                "audio buffer needs non-zero channels and sample rate",
            ));
        }
        if !data.len().is_multiple_of(usize::from(info.channels)) {
            return Err(BakeError::validation(format!(
                "audio buffer of {} values is not a multiple of {} channels",
                data.len(),
                info.channels
            )));
        }
        Ok(Self { info, data })
    }

    /// `sample_count` frames of silence.
    pub fn silence(info: AudioInfo, sample_count: usize) -> Self {
        Self {
            data: vec![0.0; sample_count * usize::from(info.channels.max(1))],
            info,
        }
    }

    /// Stream description.
    pub fn info(&self) -> AudioInfo {
        self.info
    }

    /// Number of sample frames (one value per channel each).
    pub fn sample_count(&self) -> usize {
        self.data.len() / usize::from(self.info.channels.max(1))
    }

    /// Interleaved samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Keep at most the first `sample_count` sample frames.
    pub fn truncated(&self, sample_count: usize) -> Self {
        let n = sample_count.min(self.sample_count()) * usize::from(self.info.channels.max(1));
        Self {
            info: self.info,
            data: self.data[..n].to_vec(),
        }
    }

    /// Little-endian `f32` bytes, as consumed by raw PCM encoders.
    pub fn to_f32le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for &sample in &self.data {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }
}

#[cfg(test)]
#[path = "../tests/unit/audio.rs"]
mod tests;
