use std::path::PathBuf;

use crate::foundation::core::PixelType;
use crate::io::{AudioCodec, IoOptions, Profile, keys};

/// Output resolution relative to the render size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Same size as the source.
    #[default]
    Full,
    /// Half width and height.
    Half,
    /// Quarter width and height.
    Quarter,
}

impl Resolution {
    /// Integer divisor applied to each dimension.
    pub fn divisor(self) -> u32 {
        match self {
            Self::Full => 1,
            Self::Half => 2,
            Self::Quarter => 4,
        }
    }

    /// View zoom matching this resolution.
    pub fn zoom(self) -> f64 {
        1.0 / f64::from(self.divisor())
    }
}

/// User-facing save settings; fixed for the duration of one export.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Capture the annotated viewport instead of rendering decoded frames.
    pub annotations: bool,
    /// Render and write video (audio-only export when `false`).
    pub save_video: bool,
    /// Draw the video under burned-in annotations.
    pub show_video: bool,
    /// Output scale.
    pub resolution: Resolution,
    /// Video codec profile.
    pub profile: Profile,
    /// Audio codec.
    pub audio_codec: AudioCodec,
    /// Encoder pixel format, e.g. `YUV_420P`.
    pub pixel_format: String,
    /// Prefer a hardware encoder.
    pub hardware_encode: bool,
    /// Encoder preset file.
    pub preset: Option<PathBuf>,
    /// Pass the color fields below to the encoder.
    pub color_override: bool,
    /// Color range, e.g. `tv`.
    pub color_range: String,
    /// Color space, e.g. `bt709`.
    pub color_space: String,
    /// Color primaries.
    pub color_primaries: String,
    /// Transfer characteristics.
    pub color_trc: String,
    /// EXR compression label.
    pub exr_compression: String,
    /// EXR ZIP compression level.
    pub zip_compression_level: u32,
    /// EXR DWA compression level.
    pub dwa_compression_level: f32,
    /// EXR pixel type used for non-annotated exports.
    pub exr_pixel_type: PixelType,
    /// Keep the frame-numbered name of a single saved frame.
    pub no_rename: bool,
    /// Encoder threads, `0` for automatic.
    pub thread_count: u32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            annotations: false,
            save_video: true,
            show_video: true,
            resolution: Resolution::Full,
            profile: Profile::default(),
            audio_codec: AudioCodec::default(),
            pixel_format: "YUV_420P".to_owned(),
            hardware_encode: false,
            preset: None,
            color_override: false,
            color_range: "tv".to_owned(),
            color_space: "bt709".to_owned(),
            color_primaries: "bt709".to_owned(),
            color_trc: "bt709".to_owned(),
            exr_compression: "ZIP".to_owned(),
            zip_compression_level: 4,
            dwa_compression_level: 45.0,
            exr_pixel_type: PixelType::RgbaF16,
            no_rename: false,
            thread_count: 0,
        }
    }
}

impl SaveOptions {
    /// Writer options derived from these settings.
    pub fn io_options(&self) -> IoOptions {
        let mut options = IoOptions::new();
        options.set(keys::FFMPEG_WRITE_PROFILE, self.profile.label());
        options.set(keys::FFMPEG_AUDIO_CODEC, self.audio_codec.label());
        options.set(keys::FFMPEG_THREAD_COUNT, self.thread_count);
        if let Some(preset) = &self.preset {
            options.set(keys::FFMPEG_PRESET_FILE, preset.display());
        }
        options.set(keys::FFMPEG_PIXEL_FORMAT, &self.pixel_format);
        options.set(keys::FFMPEG_HARDWARE_ENCODE, u8::from(self.hardware_encode));
        if self.color_override {
            options.set(keys::FFMPEG_COLOR_RANGE, &self.color_range);
            options.set(keys::FFMPEG_COLOR_SPACE, &self.color_space);
            options.set(keys::FFMPEG_COLOR_PRIMARIES, &self.color_primaries);
            options.set(keys::FFMPEG_COLOR_TRC, &self.color_trc);
        }
        options.set(keys::EXR_COMPRESSION, &self.exr_compression);
        options.set(keys::EXR_ZIP_LEVEL, self.zip_compression_level);
        options.set(keys::EXR_DWA_LEVEL, self.dwa_compression_level);
        options
    }
}

/// What to export and where.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportRequest {
    /// Requested output path; the extension may be corrected for the profile.
    pub path: PathBuf,
    /// Save settings.
    #[serde(default)]
    pub options: SaveOptions,
}

impl ExportRequest {
    /// Request with default options.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: SaveOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: SaveOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/request.rs"]
mod tests;
