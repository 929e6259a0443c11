use std::sync::{Arc, Mutex, MutexGuard};

use crate::audio::AudioBuffer;
use crate::foundation::core::{Image, ImageInfo, PixelType};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::info::IoInfo;
use crate::io::options::IoOptions;
use crate::io::path::MediaPath;
use crate::io::plugin::{FileType, Writer, WriterPlugin};

/// Everything a [`MemoryPlugin`] writer received.
#[derive(Clone, Debug, Default)]
pub struct MemoryLog {
    /// Paths opened, with the stream description and options passed to `write`.
    pub opened: Vec<(String, IoInfo, IoOptions)>,
    /// Frames in write order.
    pub video: Vec<(RationalTime, Image)>,
    /// Audio blocks in write order, as (range, sample count).
    pub audio: Vec<(TimeRange, usize)>,
    /// Number of writers closed through [`Writer::finish`].
    pub finished: usize,
    /// Number of writers dropped without `finish`.
    pub dropped: usize,
}

impl MemoryLog {
    /// Total audio sample frames received.
    pub fn audio_samples(&self) -> usize {
        self.audio.iter().map(|(_, n)| n).sum()
    }

    /// Times of the written frames.
    pub fn video_times(&self) -> Vec<RationalTime> {
        self.video.iter().map(|(t, _)| *t).collect()
    }
}

/// Writer plugin that records into memory instead of touching the filesystem.
///
/// Used by tests and for dry runs of the export loop.
#[derive(Debug)]
pub struct MemoryPlugin {
    extensions: Vec<(&'static str, FileType)>,
    accepts: Option<Vec<PixelType>>,
    fail_open: bool,
    fail_video_at: Option<usize>,
    log: Arc<Mutex<MemoryLog>>,
}

impl MemoryPlugin {
    /// Plugin claiming `extensions`, accepting every pixel type.
    pub fn new(extensions: &[(&'static str, FileType)]) -> Self {
        Self {
            extensions: extensions.to_vec(),
            accepts: None,
            fail_open: false,
            fail_video_at: None,
            log: Arc::new(Mutex::new(MemoryLog::default())),
        }
    }

    /// Only accept `pixel_types`; `write_info` reports no preference for anything else.
    pub fn accepting(mut self, pixel_types: &[PixelType]) -> Self {
        self.accepts = Some(pixel_types.to_vec());
        self
    }

    /// Make `write` fail.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make the `n`th (zero-based) `write_video` call fail.
    pub fn failing_video_at(mut self, n: usize) -> Self {
        self.fail_video_at = Some(n);
        self
    }

    /// Shared handle to the recorded log.
    pub fn log(&self) -> Arc<Mutex<MemoryLog>> {
        Arc::clone(&self.log)
    }

    /// Copy of the recorded log.
    pub fn snapshot(&self) -> MemoryLog {
        lock(&self.log).clone()
    }
}

fn lock(log: &Mutex<MemoryLog>) -> MutexGuard<'_, MemoryLog> {
    log.lock().unwrap_or_else(|e| e.into_inner())
}

impl WriterPlugin for MemoryPlugin {
    fn name(&self) -> &str {
        "memory"
    }

    fn extensions(&self) -> &[(&'static str, FileType)] {
        &self.extensions
    }

    fn write_info(&self, info: &ImageInfo, _options: &IoOptions) -> Option<ImageInfo> {
        match &self.accepts {
            Some(list) if !list.contains(&info.pixel_type) => None,
            _ => Some(ImageInfo::new(info.size, info.pixel_type)),
        }
    }

    fn write(
        &self,
        path: &MediaPath,
        info: &IoInfo,
        options: &IoOptions,
    ) -> BakeResult<Box<dyn Writer>> {
        if self.fail_open {
            return Err(BakeError::writer_open(format!("{path}: refused by memory plugin")));
        }
        lock(&self.log)
            .opened
            .push((path.to_string(), info.clone(), options.clone()));
        Ok(Box::new(MemoryWriter {
            log: Arc::clone(&self.log),
            fail_video_at: self.fail_video_at,
            video_calls: 0,
            finished: false,
        }))
    }
}

struct MemoryWriter {
    log: Arc<Mutex<MemoryLog>>,
    fail_video_at: Option<usize>,
    video_calls: usize,
    finished: bool,
}

impl Writer for MemoryWriter {
    fn write_video(&mut self, time: RationalTime, image: &Image) -> BakeResult<()> {
        let call = self.video_calls;
        self.video_calls += 1;
        if self.fail_video_at == Some(call) {
            return Err(BakeError::writer(format!("injected failure at frame {time}")));
        }
        lock(&self.log).video.push((time, image.clone()));
        Ok(())
    }

    fn write_audio(&mut self, range: TimeRange, audio: &AudioBuffer) -> BakeResult<()> {
        lock(&self.log).audio.push((range, audio.sample_count()));
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> BakeResult<()> {
        self.finished = true;
        lock(&self.log).finished += 1;
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        if !self.finished {
            lock(&self.log).dropped += 1;
        }
    }
}
