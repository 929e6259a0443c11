use std::collections::BTreeMap;
use std::str::FromStr;

/// Well-known option keys understood by the built-in plugins.
pub mod keys {
    /// Codec profile label (see [`crate::io::Profile`]).
    pub const FFMPEG_WRITE_PROFILE: &str = "FFmpeg/WriteProfile";
    /// Audio codec label (see [`crate::io::AudioCodec`]).
    pub const FFMPEG_AUDIO_CODEC: &str = "FFmpeg/AudioCodec";
    /// Output pixel format name, e.g. `YUV_420P`.
    pub const FFMPEG_PIXEL_FORMAT: &str = "FFmpeg/PixelFormat";
    /// `1` to prefer a hardware encoder.
    pub const FFMPEG_HARDWARE_ENCODE: &str = "FFmpeg/HardwareEncode";
    /// Encoder preset file.
    pub const FFMPEG_PRESET_FILE: &str = "FFmpeg/PresetFile";
    /// Encoder thread count.
    pub const FFMPEG_THREAD_COUNT: &str = "FFmpeg/ThreadCount";
    /// Playback speed for sequences.
    pub const FFMPEG_SPEED: &str = "FFmpeg/Speed";
    /// Color range override.
    pub const FFMPEG_COLOR_RANGE: &str = "FFmpeg/ColorRange";
    /// Color space override.
    pub const FFMPEG_COLOR_SPACE: &str = "FFmpeg/ColorSpace";
    /// Color primaries override.
    pub const FFMPEG_COLOR_PRIMARIES: &str = "FFmpeg/ColorPrimaries";
    /// Transfer characteristics override.
    pub const FFMPEG_COLOR_TRC: &str = "FFmpeg/ColorTRC";
    /// EXR compression label.
    pub const EXR_COMPRESSION: &str = "OpenEXR/Compression";
    /// EXR ZIP compression level.
    pub const EXR_ZIP_LEVEL: &str = "OpenEXR/ZipCompressionLevel";
    /// EXR DWA compression level.
    pub const EXR_DWA_LEVEL: &str = "OpenEXR/DWACompressionLevel";
    /// EXR pixel type label.
    pub const EXR_PIXEL_TYPE: &str = "OpenEXR/PixelType";
    /// EXR playback speed.
    pub const EXR_SPEED: &str = "OpenEXR/Speed";
    /// Start timecode, `HH:MM:SS:FF`.
    pub const TIMECODE: &str = "timecode";
}

/// String-keyed writer options, handed unchanged to the selected plugin.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IoOptions(BTreeMap<String, String>);

impl IoOptions {
    /// Empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parsed value of `key`; `None` when missing or unparsable.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// `true` when `key` is set to `1` or `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1" | "true" | "True"))
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no option is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
