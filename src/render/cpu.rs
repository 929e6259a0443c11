use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::foundation::core::{ComponentType, Image, PixelType, Size};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::locale::{NumericLocale, SharedLocale};
use crate::render::backend::{DrawOptions, RenderBackend, read_pixels_format};
use crate::render::convert::{decode_rgba, encode_rgba};
use crate::render::offscreen::{OffscreenBinding, OffscreenBuffer};

/// Options for the CPU backend.
#[derive(Clone, Copy, Debug)]
pub struct CpuBackendOpts {
    /// Largest width or height an offscreen buffer may have.
    pub max_texture_size: u32,
    /// When `false`, the backend behaves as if no render context exists.
    pub available: bool,
}

impl Default for CpuBackendOpts {
    fn default() -> Self {
        Self {
            max_texture_size: 16384,
            available: true,
        }
    }
}

/// Counters collected by a [`CpuBackend`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuBackendStats {
    /// Offscreen buffers allocated.
    pub buffers_created: u64,
    /// `draw_video` calls.
    pub draws: u64,
    /// `read_pixels` calls.
    pub reads: u64,
    /// Numeric locale observed during the last draw.
    pub last_draw_locale: Option<String>,
}

/// Render backend keeping offscreen buffers in host memory.
pub struct CpuBackend {
    opts: CpuBackendOpts,
    locale: Arc<dyn NumericLocale>,
    live: Arc<AtomicUsize>,
    next_id: u64,
    stats: CpuBackendStats,
}

impl CpuBackend {
    /// Create a backend with its own numeric locale slot.
    pub fn new(opts: CpuBackendOpts) -> Self {
        Self::with_locale(opts, Arc::new(SharedLocale::default()))
    }

    /// Create a backend sharing `locale` with the caller.
    pub fn with_locale(opts: CpuBackendOpts, locale: Arc<dyn NumericLocale>) -> Self {
        Self {
            opts,
            locale,
            live: Arc::new(AtomicUsize::new(0)),
            next_id: 1,
            stats: CpuBackendStats::default(),
        }
    }

    /// Offscreen buffers created by this backend and not yet dropped.
    pub fn live_buffers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Shared handle to the live-buffer counter.
    pub fn live_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }

    /// Counters.
    pub fn stats(&self) -> &CpuBackendStats {
        &self.stats
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new(CpuBackendOpts::default())
    }
}

impl RenderBackend for CpuBackend {
    fn create_offscreen(&mut self, size: Size, color_type: PixelType) -> BakeResult<OffscreenBuffer> {
        if !self.opts.available {
            return Err(BakeError::resource_allocation("no render context available"));
        }
        if size.is_degenerate() {
            return Err(BakeError::resource_allocation(format!(
                "cannot allocate a {size} offscreen buffer"
            )));
        }
        if size.w > self.opts.max_texture_size || size.h > self.opts.max_texture_size {
            return Err(BakeError::resource_allocation(format!(
                "{size} exceeds the maximum texture size {}",
                self.opts.max_texture_size
            )));
        }
        if read_pixels_format(color_type).is_none() {
            return Err(BakeError::invalid_pixel_format(format!(
                "{color_type} cannot back an offscreen buffer"
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.stats.buffers_created += 1;
        tracing::debug!(id, %size, %color_type, "offscreen buffer created");
        Ok(OffscreenBuffer::new(id, size, color_type, &self.live))
    }

    fn draw_video(
        &mut self,
        target: &mut OffscreenBinding<'_>,
        frame: &Image,
        options: &DrawOptions,
    ) -> BakeResult<()> {
        self.stats.draws += 1;
        self.stats.last_draw_locale = Some(self.locale.numeric());

        let pixels = decode_rgba(frame)?;
        let color_type = target.color_type();
        let canvas = target.canvas_mut();
        canvas.clear(options.background);
        canvas.draw_stretched(&pixels, frame.size());
        match color_type.component() {
            Some(ComponentType::U8) => canvas.quantize(255.0),
            Some(ComponentType::U16) => canvas.quantize(65535.0),
            _ => {}
        }
        Ok(())
    }

    fn read_pixels(&mut self, buffer: &OffscreenBuffer, out: &mut Image) -> BakeResult<()> {
        let pixel_type = out.pixel_type();
        if read_pixels_format(pixel_type).is_none() {
            return Err(BakeError::invalid_pixel_format(format!(
                "no transfer format for {pixel_type}"
            )));
        }
        if out.size() != buffer.size() {
            return Err(BakeError::invalid_pixel_format(format!(
                "readback image is {}, buffer is {}",
                out.size(),
                buffer.size()
            )));
        }
        self.stats.reads += 1;
        encode_rgba(buffer.canvas().pixels(), out)
    }

    fn numeric_locale(&self) -> Arc<dyn NumericLocale> {
        Arc::clone(&self.locale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
