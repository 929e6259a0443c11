#![forbid(unsafe_code)]
//! Frame-accurate movie and image-sequence export.
//!
//! An export walks a timeline player's in/out range one frame (or, for audio-only sources, one
//! second) at a time, renders each frame offscreen or captures it from an annotated view, and
//! streams video and audio into a writer plugin chosen by the output extension.

mod foundation;

pub mod annotation;
pub mod audio;
pub mod config;
pub mod export;
pub mod io;
pub mod player;
pub mod render;
pub mod viewport;

pub use audio::{AudioBuffer, AudioInfo};
pub use export::{
    CancelToken, ExportContext, ExportRequest, ExportState, ExportSummary, FrameSummary,
    LogProgress, Progress, Resolution, SaveOptions, TokenProgress, export_movie,
    save_multiple_frames, save_single_frame,
};
pub use foundation::core::{
    Affine, ComponentType, Endian, Image, ImageInfo, ImageLayout, PixelType, Point, Rect, Size,
};
pub use foundation::error::{BakeError, BakeResult};
pub use foundation::locale::{C_LOCALE, NumericLocale, NumericLocaleGuard, SharedLocale};
pub use foundation::time::{RationalTime, TimeRange};
pub use io::{FileType, IoInfo, IoOptions, PluginRegistry, Writer, WriterPlugin};
pub use player::{TestPatternPlayer, TimelinePlayer};
pub use render::{CpuBackend, RenderBackend};
pub use viewport::{SoftwareViewport, Viewport};
