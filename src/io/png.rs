use std::path::PathBuf;

use image::{ExtendedColorType, ImageFormat};

use crate::audio::AudioBuffer;
use crate::foundation::core::{Endian, Image, ImageInfo, PixelType};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::time::{RationalTime, TimeRange};
use crate::io::info::IoInfo;
use crate::io::options::IoOptions;
use crate::io::path::MediaPath;
use crate::io::plugin::{FileType, Writer, WriterPlugin};

const EXTENSIONS: &[(&str, FileType)] = &[(".png", FileType::Sequence)];

/// PNG image-sequence writer, one numbered file per frame.
#[derive(Debug, Default)]
pub struct PngPlugin;

impl PngPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self
    }
}

fn color_type(pixel_type: PixelType) -> Option<ExtendedColorType> {
    Some(match pixel_type {
        PixelType::LU8 => ExtendedColorType::L8,
        PixelType::LaU8 => ExtendedColorType::La8,
        PixelType::RgbU8 => ExtendedColorType::Rgb8,
        PixelType::RgbaU8 => ExtendedColorType::Rgba8,
        PixelType::LU16 => ExtendedColorType::L16,
        PixelType::LaU16 => ExtendedColorType::La16,
        PixelType::RgbU16 => ExtendedColorType::Rgb16,
        PixelType::RgbaU16 => ExtendedColorType::Rgba16,
        _ => return None,
    })
}

impl WriterPlugin for PngPlugin {
    fn name(&self) -> &str {
        "png"
    }

    fn extensions(&self) -> &[(&'static str, FileType)] {
        EXTENSIONS
    }

    fn write_info(&self, info: &ImageInfo, _options: &IoOptions) -> Option<ImageInfo> {
        color_type(info.pixel_type).map(|_| ImageInfo::new(info.size, info.pixel_type))
    }

    fn write(
        &self,
        path: &MediaPath,
        info: &IoInfo,
        _options: &IoOptions,
    ) -> BakeResult<Box<dyn Writer>> {
        let image_info = *info
            .video
            .first()
            .ok_or_else(|| BakeError::writer_open(format!("{path}: no video to write")))?;
        let color = color_type(image_info.pixel_type).ok_or_else(|| {
            BakeError::writer_open(format!(
                "{path}: png cannot store {}",
                image_info.pixel_type
            ))
        })?;
        crate::io::ffmpeg::ensure_parent_dir(&path.to_path_buf())
            .map_err(|e| BakeError::writer_open(format!("{path}: {e}")))?;
        Ok(Box::new(PngSequenceWriter {
            path: path.clone(),
            info: image_info,
            color,
            last_time: None,
            written: Vec::new(),
        }))
    }
}

/// Writes each frame to `path.frame_path(frame)`.
struct PngSequenceWriter {
    path: MediaPath,
    info: ImageInfo,
    color: ExtendedColorType,
    last_time: Option<RationalTime>,
    written: Vec<PathBuf>,
}

impl Writer for PngSequenceWriter {
    fn write_video(&mut self, time: RationalTime, image: &Image) -> BakeResult<()> {
        if let Some(last) = self.last_time
            && time <= last
        {
            return Err(BakeError::writer(format!(
                "png sequence received out-of-order frame {time} after {last}"
            )));
        }
        if image.size() != self.info.size || image.pixel_type() != self.info.pixel_type {
            return Err(BakeError::writer(format!(
                "frame is {}, writer expects {}",
                image.info(),
                self.info
            )));
        }

        let bytes = tight_native_rows(image)?;
        let out = self.path.frame_path(time.to_frames());
        image::save_buffer_with_format(
            &out,
            &bytes,
            self.info.size.w,
            self.info.size.h,
            self.color,
            ImageFormat::Png,
        )
        .map_err(|e| BakeError::writer(format!("failed to write '{}': {e}", out.display())))?;

        tracing::trace!(path = %out.display(), "wrote png frame");
        self.last_time = Some(time);
        self.written.push(out);
        Ok(())
    }

    fn write_audio(&mut self, _range: TimeRange, _audio: &AudioBuffer) -> BakeResult<()> {
        Ok(())
    }

    fn finish(self: Box<Self>) -> BakeResult<()> {
        tracing::debug!(frames = self.written.len(), path = %self.path, "png sequence finished");
        Ok(())
    }
}

/// Strip row padding and convert 16-bit data to native byte order.
fn tight_native_rows(image: &Image) -> BakeResult<Vec<u8>> {
    let info = image.info();
    let mut out = crate::io::tight_rows(image)?;

    let two_byte = info.pixel_type.component().map(|c| c.byte_size()) == Some(2);
    if two_byte && info.layout.endian != Endian::native() {
        for pair in out.chunks_exact_mut(2) {
            pair.swap(0, 1);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/io/png.rs"]
mod tests;
