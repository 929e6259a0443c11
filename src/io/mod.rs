//! Output paths, writer options, writer plugins and the plugin registry.

pub mod ffmpeg;
pub mod info;
pub mod memory;
pub mod options;
pub mod path;
pub mod plugin;
pub mod png;
pub mod profile;

pub use ffmpeg::{FfmpegPlugin, is_ffmpeg_on_path};
pub use info::IoInfo;
pub use memory::{MemoryLog, MemoryPlugin};
pub use options::{IoOptions, keys};
pub use path::MediaPath;
pub use plugin::{FileType, PluginRegistry, Writer, WriterPlugin};
pub use png::PngPlugin;
pub use profile::{AudioCodec, Profile};

use crate::foundation::core::Image;
use crate::foundation::error::{BakeError, BakeResult};

/// Image bytes with any row alignment padding removed.
pub(crate) fn tight_rows(image: &Image) -> BakeResult<Vec<u8>> {
    let info = image.info();
    let (bpp, row_bytes) = info
        .pixel_type
        .bytes_per_pixel()
        .zip(info.row_bytes())
        .ok_or_else(|| BakeError::invalid_pixel_format(info.pixel_type.to_string()))?;
    let tight = info.size.w as usize * bpp;
    if tight == row_bytes {
        return Ok(image.data().to_vec());
    }

    let mut out = Vec::with_capacity(tight * info.size.h as usize);
    for row in image.data().chunks_exact(row_bytes).take(info.size.h as usize) {
        out.extend_from_slice(&row[..tight]);
    }
    Ok(out)
}
