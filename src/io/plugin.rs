use std::sync::Arc;

use crate::audio::AudioBuffer;
use crate::foundation::core::{Image, ImageInfo};
use crate::foundation::error::BakeResult;
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::info::IoInfo;
use crate::io::options::IoOptions;
use crate::io::path::MediaPath;

/// What a plugin produces for a given extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileType {
    /// One numbered image file per frame.
    Sequence,
    /// A single container holding video and optionally audio.
    Movie,
    /// A single audio-only container.
    Audio,
}

/// An open, append-only output stream.
///
/// Ordering contract: `write_video` is called with strictly increasing times. Dropping a writer
/// without calling [`Writer::finish`] must still close the stream; whatever was written stays on
/// disk.
pub trait Writer: Send {
    /// Append one frame at `time`.
    fn write_video(&mut self, time: RationalTime, image: &Image) -> BakeResult<()>;
    /// Append audio samples covering `range`.
    fn write_audio(&mut self, range: TimeRange, audio: &AudioBuffer) -> BakeResult<()>;
    /// Flush and close the stream.
    fn finish(self: Box<Self>) -> BakeResult<()>;
}

/// A factory for [`Writer`]s of one family of formats.
pub trait WriterPlugin: Send + Sync {
    /// Human-readable plugin name, used in logs.
    fn name(&self) -> &str;

    /// Lowercase extensions (with leading dot) this plugin writes.
    fn extensions(&self) -> &[(&'static str, FileType)];

    /// File type produced for `extension` (lowercase, with leading dot).
    fn file_type(&self, extension: &str) -> Option<FileType> {
        self.extensions()
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, ty)| *ty)
    }

    /// The closest image description this plugin can write, or `None` if it has no preference
    /// for `info`'s pixel type.
    fn write_info(&self, info: &ImageInfo, options: &IoOptions) -> Option<ImageInfo>;

    /// Open a writer for `path`.
    fn write(
        &self,
        path: &MediaPath,
        info: &IoInfo,
        options: &IoOptions,
    ) -> BakeResult<Box<dyn Writer>>;
}

/// Ordered collection of writer plugins; the first plugin claiming an extension wins.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn WriterPlugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name().to_owned()))
            .finish()
    }
}

impl PluginRegistry {
    /// Registry with no plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in PNG sequence and FFmpeg plugins.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::io::png::PngPlugin::new()));
        registry.register(Arc::new(crate::io::ffmpeg::FfmpegPlugin::new()));
        registry
    }

    /// Append a plugin.
    pub fn register(&mut self, plugin: Arc<dyn WriterPlugin>) {
        self.plugins.push(plugin);
    }

    /// Registered plugins in lookup order.
    pub fn plugins(&self) -> &[Arc<dyn WriterPlugin>] {
        &self.plugins
    }

    /// Plugin claiming `path`'s extension.
    pub fn plugin_for(&self, path: &MediaPath) -> Option<Arc<dyn WriterPlugin>> {
        let ext = path.extension_lower();
        self.plugins
            .iter()
            .find(|p| p.file_type(&ext).is_some())
            .cloned()
    }

    /// File type produced for `path`, if any plugin claims it.
    pub fn file_type(&self, path: &MediaPath) -> Option<FileType> {
        let ext = path.extension_lower();
        self.plugins.iter().find_map(|p| p.file_type(&ext))
    }

    /// `true` when `path` is written as a single movie container.
    pub fn is_movie(&self, path: &MediaPath) -> bool {
        self.file_type(path) == Some(FileType::Movie)
    }

    /// `true` when `path` is an audio-only container.
    pub fn is_audio(&self, path: &MediaPath) -> bool {
        self.file_type(path) == Some(FileType::Audio)
    }

    /// `true` when `path` is written as a numbered image sequence.
    pub fn is_sequence(&self, path: &MediaPath) -> bool {
        self.file_type(path) == Some(FileType::Sequence)
    }
}
