use std::sync::Arc;

use crate::foundation::core::{ComponentType, Image, PixelType, Size};
use crate::foundation::error::BakeResult;
use crate::foundation::locale::NumericLocale;
use crate::render::canvas::Rgba;
use crate::render::offscreen::{OffscreenBinding, OffscreenBuffer};

/// Channel arrangement of a pixel transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferFormat {
    /// One channel.
    Red,
    /// Two channels (luminance + alpha).
    Rg,
    /// Three channels.
    Rgb,
    /// Four channels.
    Rgba,
}

/// Transfer format and component type used to read pixels back into `pixel_type`.
///
/// Packed and planar types have no direct transfer and return `None`.
pub fn read_pixels_format(pixel_type: PixelType) -> Option<(TransferFormat, ComponentType)> {
    let component = pixel_type.component()?;
    let format = match pixel_type.channel_count() {
        1 => TransferFormat::Red,
        2 => TransferFormat::Rg,
        3 => TransferFormat::Rgb,
        _ => TransferFormat::Rgba,
    };
    Some((format, component))
}

/// Per-draw settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawOptions {
    /// Color the target is cleared to before drawing.
    pub background: Rgba,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            background: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Renderer owning offscreen targets and pixel readback.
///
/// Callers wrap `draw_video` in a [`crate::foundation::locale::NumericLocaleGuard`] built from
/// [`RenderBackend::numeric_locale`].
pub trait RenderBackend {
    /// Allocate an offscreen target of `size` storing `color_type`.
    fn create_offscreen(&mut self, size: Size, color_type: PixelType) -> BakeResult<OffscreenBuffer>;

    /// Draw `frame` into the bound target, scaled to fill it.
    fn draw_video(
        &mut self,
        target: &mut OffscreenBinding<'_>,
        frame: &Image,
        options: &DrawOptions,
    ) -> BakeResult<()>;

    /// Read `buffer` back into `out`, converting to `out`'s pixel type.
    fn read_pixels(&mut self, buffer: &OffscreenBuffer, out: &mut Image) -> BakeResult<()>;

    /// Numeric locale the renderer is sensitive to.
    fn numeric_locale(&self) -> Arc<dyn NumericLocale>;
}
