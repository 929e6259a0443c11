use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::{ImageInfo, PixelType};
use crate::foundation::error::{BakeError, BakeResult};
use crate::io::{
    FileType, IoInfo, IoOptions, MediaPath, PluginRegistry, Profile, Writer, WriterPlugin,
};

/// The plugin and final path an export writes through.
#[derive(Clone)]
pub struct Destination {
    /// Output path after extension correction.
    pub path: MediaPath,
    /// Plugin claiming the path's extension.
    pub plugin: Arc<dyn WriterPlugin>,
    /// What the plugin produces for this extension.
    pub file_type: FileType,
    /// `true` when the extension was changed for the profile.
    pub corrected: bool,
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Destination")
            .field("path", &self.path.to_string())
            .field("plugin", &self.plugin.name())
            .field("file_type", &self.file_type)
            .field("corrected", &self.corrected)
            .finish()
    }
}

impl Destination {
    /// Lowercase extension of the final path.
    pub fn extension(&self) -> String {
        self.path.extension_lower()
    }
}

/// Output pixel description agreed with the plugin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Negotiated {
    /// Description of every image handed to the writer.
    pub info: ImageInfo,
    /// Storage type of the offscreen render target.
    pub buffer_color_type: PixelType,
    /// `true` when `info.pixel_type` differs from the requested type.
    pub substituted: bool,
}

/// Pick the writer plugin for `requested`, correcting the extension for `profile`.
///
/// `source` is the path being played; writing over it is refused.
pub fn select_writer(
    registry: &PluginRegistry,
    requested: &Path,
    source: &Path,
    profile: Profile,
) -> BakeResult<Destination> {
    let original = MediaPath::parse(requested);
    if requested == source {
        return Err(BakeError::writer_open(format!(
            "{}: saving over same file being played",
            requested.display()
        )));
    }

    let mut path = original.clone();
    let mut corrected = false;
    if registry.is_movie(&original)
        && let Some(extension) = profile.corrected_extension(original.extension())
    {
        tracing::warn!(
            profile = %profile,
            from = %original.extension(),
            to = extension,
            "{}, changing the extension",
            profile.extension_hint()
        );
        path = original.with_extension(extension);
        corrected = true;
    }

    if corrected {
        let target = path.to_path_buf();
        if target.exists() {
            return Err(BakeError::writer_open(format!(
                "new file {} already exists, cannot overwrite it",
                target.display()
            )));
        }
        if target == source {
            return Err(BakeError::writer_open(format!(
                "{}: saving over same file being played",
                target.display()
            )));
        }
    }

    let plugin = registry.plugin_for(&path).ok_or_else(|| {
        BakeError::unsupported_format(format!("{path}: no writer plugin for this extension"))
    })?;
    let file_type = plugin
        .file_type(&path.extension_lower())
        .ok_or_else(|| BakeError::unsupported_format(path.to_string()))?;

    tracing::debug!(path = %path, plugin = plugin.name(), ?file_type, "selected writer");
    Ok(Destination {
        path,
        plugin,
        file_type,
        corrected,
    })
}

/// Agree on the output pixel type with the destination plugin.
///
/// Plugins without a preference get `RGB_U8`. `.hdr` always writes `RGB_F32`; `.exr` without
/// annotations writes `exr_pixel_type`.
pub fn negotiate(
    destination: &Destination,
    requested: ImageInfo,
    annotations: bool,
    exr_pixel_type: PixelType,
    options: &IoOptions,
) -> Negotiated {
    let extension = destination.extension();
    let is_exr = extension == ".exr";
    let is_hdr = extension == ".hdr";

    let mut buffer_color_type = PixelType::RgbaF32;
    let mut info = match destination.plugin.write_info(&requested, options) {
        Some(info) => info,
        None => {
            buffer_color_type = if is_exr {
                PixelType::RgbF32
            } else {
                PixelType::RgbU8
            };
            tracing::info!(
                requested = %requested.pixel_type,
                "writer plugin did not get output info, defaulting to {buffer_color_type}"
            );
            ImageInfo::new(requested.size, PixelType::RgbU8)
        }
    };

    if is_exr && !annotations {
        info.pixel_type = exr_pixel_type;
    }
    if is_hdr {
        info.pixel_type = PixelType::RgbF32;
        buffer_color_type = PixelType::RgbF32;
    }

    let substituted = info.pixel_type != requested.pixel_type;
    if substituted {
        tracing::info!(
            requested = %requested.pixel_type,
            negotiated = %info.pixel_type,
            "output pixel type substituted"
        );
    }
    Negotiated {
        info,
        buffer_color_type,
        substituted,
    }
}

/// Open the destination stream.
pub fn open(
    destination: &Destination,
    info: &IoInfo,
    options: &IoOptions,
) -> BakeResult<Box<dyn Writer>> {
    destination
        .plugin
        .write(&destination.path, info, options)
        .map_err(|err| match err {
            BakeError::WriterOpen(_) => err,
            other => BakeError::writer_open(format!("{}: {other}", destination.path)),
        })
}

#[cfg(test)]
#[path = "../../tests/unit/export/writer.rs"]
mod tests;
