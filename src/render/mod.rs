//! Offscreen render targets, pixel conversion and the CPU render backend.

pub mod backend;
pub mod canvas;
pub mod convert;
pub mod cpu;
pub mod offscreen;

pub use backend::{DrawOptions, RenderBackend, TransferFormat, read_pixels_format};
pub use canvas::{Rgba, RgbaCanvas};
pub use cpu::{CpuBackend, CpuBackendOpts, CpuBackendStats};
pub use offscreen::{OffscreenBinding, OffscreenBuffer};
