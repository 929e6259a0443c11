use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::foundation::core::{PixelType, Size};
use crate::foundation::error::{BakeError, BakeResult};
use crate::render::canvas::RgbaCanvas;

/// Decrements a backend's live-buffer counter when dropped.
#[derive(Debug)]
struct BufferLease(Arc<AtomicUsize>);

impl BufferLease {
    fn acquire(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(live))
    }
}

impl Drop for BufferLease {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Render-backend-owned pixel storage sized to the output resolution.
///
/// Released when dropped; a backend can report how many buffers are still alive.
#[derive(Debug)]
pub struct OffscreenBuffer {
    id: u64,
    color_type: PixelType,
    canvas: RgbaCanvas,
    bound: bool,
    _lease: BufferLease,
}

impl OffscreenBuffer {
    pub(crate) fn new(
        id: u64,
        size: Size,
        color_type: PixelType,
        live: &Arc<AtomicUsize>,
    ) -> Self {
        Self {
            id,
            color_type,
            canvas: RgbaCanvas::new(size),
            bound: false,
            _lease: BufferLease::acquire(live),
        }
    }

    /// Backend-assigned identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Dimensions.
    pub fn size(&self) -> Size {
        self.canvas.size()
    }

    /// Internal storage type.
    pub fn color_type(&self) -> PixelType {
        self.color_type
    }

    /// `true` while an [`OffscreenBinding`] is active.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Current contents.
    pub fn canvas(&self) -> &RgbaCanvas {
        &self.canvas
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut RgbaCanvas {
        &mut self.canvas
    }
}

/// Scoped binding of an [`OffscreenBuffer`] as the current render target.
///
/// Binding fails if the buffer is already bound; dropping the binding unbinds it.
#[derive(Debug)]
pub struct OffscreenBinding<'a> {
    buffer: &'a mut OffscreenBuffer,
}

impl<'a> OffscreenBinding<'a> {
    /// Bind `buffer` for drawing.
    pub fn bind(buffer: &'a mut OffscreenBuffer) -> BakeResult<Self> {
        if buffer.bound {
            return Err(BakeError::render(format!(
                "offscreen buffer {} is already bound",
                buffer.id
            )));
        }
        buffer.bound = true;
        Ok(Self { buffer })
    }
}

impl Deref for OffscreenBinding<'_> {
    type Target = OffscreenBuffer;

    fn deref(&self) -> &OffscreenBuffer {
        self.buffer
    }
}

impl DerefMut for OffscreenBinding<'_> {
    fn deref_mut(&mut self) -> &mut OffscreenBuffer {
        self.buffer
    }
}

impl Drop for OffscreenBinding<'_> {
    fn drop(&mut self) {
        self.buffer.bound = false;
    }
}
