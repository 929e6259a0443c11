//! Movie and frame export: range resolution, writer selection, the frame stepper and its guards.

pub mod guard;
pub mod progress;
pub mod range;
pub mod request;
pub mod single_frame;
pub mod stepper;
pub mod writer;

pub use guard::{PlayerGuard, ViewGuard};
pub use progress::{CancelToken, LogProgress, Progress, SaveKind, TokenProgress};
pub use range::{ResolvedRange, Step, resolve};
pub use request::{ExportRequest, Resolution, SaveOptions};
pub use single_frame::{FrameSummary, save_multiple_frames, save_single_frame};
pub use stepper::{
    ExportState, ExportSummary, FrameCursor, FrameStepper, export_movie, start_timecode,
};
pub use writer::{Destination, Negotiated, negotiate, select_writer};

use crate::io::PluginRegistry;
use crate::player::TimelinePlayer;
use crate::render::RenderBackend;
use crate::viewport::Viewport;

/// Collaborators an export borrows for its whole duration.
pub struct ExportContext<'a> {
    /// Timeline being exported.
    pub player: &'a mut dyn TimelinePlayer,
    /// Renderer for the offscreen path.
    pub backend: &'a mut dyn RenderBackend,
    /// Available writer plugins.
    pub registry: &'a PluginRegistry,
    /// Interactive view, required when burning in annotations.
    pub viewport: Option<&'a mut dyn Viewport>,
    /// Progress and cancellation.
    pub progress: &'a mut dyn Progress,
}

impl<'a> ExportContext<'a> {
    /// Context without a viewport.
    pub fn new(
        player: &'a mut dyn TimelinePlayer,
        backend: &'a mut dyn RenderBackend,
        registry: &'a PluginRegistry,
        progress: &'a mut dyn Progress,
    ) -> Self {
        Self {
            player,
            backend,
            registry,
            viewport: None,
            progress,
        }
    }

    /// Attach the interactive view.
    pub fn with_viewport(mut self, viewport: &'a mut dyn Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }
}
