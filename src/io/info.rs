use std::collections::BTreeMap;

use crate::audio::AudioInfo;
use crate::foundation::core::ImageInfo;
use crate::foundation::time::{RationalTime, TimeRange};

/// Stream description of a media source or destination.
#[derive(Clone, Debug, PartialEq)]
pub struct IoInfo {
    /// Video layers; the first layer is the one exported.
    pub video: Vec<ImageInfo>,
    /// Time span of the video at its frame rate.
    pub video_time: TimeRange,
    /// Audio stream, if any.
    pub audio: Option<AudioInfo>,
    /// Time span of the audio at its sample rate.
    pub audio_time: TimeRange,
    /// Free-form metadata (e.g. `timecode`).
    pub tags: BTreeMap<String, String>,
}

impl Default for IoInfo {
    fn default() -> Self {
        let zero = RationalTime::new(0.0, 1.0);
        Self {
            video: Vec::new(),
            video_time: TimeRange::new(zero, zero),
            audio: None,
            audio_time: TimeRange::new(zero, zero),
            tags: BTreeMap::new(),
        }
    }
}

impl IoInfo {
    /// `true` when at least one video layer is present.
    pub fn has_video(&self) -> bool {
        !self.video.is_empty()
    }

    /// `true` when a valid audio stream is present.
    pub fn has_audio(&self) -> bool {
        self.audio.is_some_and(|a| a.is_valid())
    }
}
