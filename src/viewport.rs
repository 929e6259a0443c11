//! On-screen view surface used when annotations are burned into an export.

use std::collections::BTreeMap;

use kurbo::{Affine, Point, Vec2};

use crate::annotation::{AnnotationSet, rasterize};
use crate::foundation::core::{Image, Size};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::time::RationalTime;
use crate::render::canvas::{Rgba, RgbaCanvas};
use crate::render::convert::{decode_rgba, encode_rgba};

const HUD_HEIGHT: u32 = 12;
const HUD_COLOR: Rgba = [0.1, 0.1, 0.1, 0.8];

/// User-visible view settings that an export temporarily overrides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    /// Chrome-free presentation mode.
    pub presentation: bool,
    /// Heads-up display overlay.
    pub hud: bool,
    /// Fit the image to the viewport.
    pub frame_view: bool,
    /// Draw the video layer (annotations only when `false`).
    pub show_video: bool,
    /// Zoom factor used when `frame_view` is off.
    pub zoom: f64,
    /// Offset of the image center from the viewport center, in viewport pixels.
    pub pan: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            presentation: false,
            hud: true,
            frame_view: true,
            show_video: true,
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

/// The view an export captures annotated frames from.
pub trait Viewport {
    /// Current view settings.
    fn view_state(&self) -> ViewState;

    /// Replace the view settings.
    fn set_view_state(&mut self, state: ViewState);

    /// Size the view renders the current image at; zero when unknown.
    fn render_size(&self) -> Size;

    /// Viewport size in physical pixels.
    fn viewport_size(&self) -> Size;

    /// Physical pixels per logical unit (display scaling).
    fn pixels_per_unit(&self) -> f64;

    /// Image rotation in degrees.
    fn rotation(&self) -> f64;

    /// Set a fixed zoom; disables frame view.
    fn set_zoom(&mut self, zoom: f64);

    /// Center the image in the viewport.
    fn center_view(&mut self);

    /// Fit the image to the viewport.
    fn frame_view(&mut self);

    /// Redraw the view for `time`; `frame` is the decoded image, `None` to keep the last one.
    fn redraw(&mut self, time: RationalTime, frame: Option<&Image>) -> BakeResult<()>;

    /// Copy the displayed pixels at `(x, y)` into `out`, sized by `out`.
    fn capture(&mut self, x: u32, y: u32, out: &mut Image) -> BakeResult<()>;

    /// Metadata tags attached to captured images.
    fn tags(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Output size and capture origin for an annotated export.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnotationLayout {
    /// Size of every captured frame.
    pub output_size: Size,
    /// Capture origin, x.
    pub x: u32,
    /// Capture origin, y.
    pub y: u32,
    /// Fixed zoom to apply, `None` to frame the view instead.
    pub zoom: Option<f64>,
    /// `true` when the render size did not fit and the output was shrunk.
    pub scaled: bool,
}

/// Lay out an annotated capture of `render_size` inside a viewport of `viewport_size` physical
/// pixels.
///
/// `zoom` is the resolution factor (1, ½ or ¼). When the logical viewport is smaller than the
/// render size the output is fitted preserving aspect ratio.
pub fn annotation_layout(
    render_size: Size,
    viewport_size: Size,
    pixels_per_unit: f64,
    zoom: f64,
) -> AnnotationLayout {
    let ppu = if pixels_per_unit > 0.0 { pixels_per_unit } else { 1.0 };
    let viewport = Size::new(
        (f64::from(viewport_size.w) / ppu) as u32,
        (f64::from(viewport_size.h) / ppu) as u32,
    );

    let (output_size, zoom, scaled) = if viewport.contains(render_size) {
        (render_size, Some(zoom), false)
    } else {
        let image_aspect = render_size.aspect();
        let viewport_aspect = viewport.aspect();
        let fitted = if image_aspect > viewport_aspect {
            Size::new(viewport.w, (f64::from(viewport.w) / image_aspect) as u32)
        } else {
            Size::new((f64::from(viewport.h) * image_aspect) as u32, viewport.h)
        };
        (fitted, None, true)
    };

    AnnotationLayout {
        output_size,
        x: viewport.w.saturating_sub(output_size.w) / 2,
        y: viewport.h.saturating_sub(output_size.h) / 2,
        zoom,
        scaled,
    }
}

struct Frame {
    size: Size,
    pixels: Vec<Rgba>,
}

/// CPU viewport: draws the frame and its annotations into a host-memory canvas.
///
/// The canvas has the logical viewport size (`viewport_size / pixels_per_unit`).
pub struct SoftwareViewport {
    state: ViewState,
    viewport_size: Size,
    pixels_per_unit: f64,
    rotation: f64,
    render_size: Size,
    annotations: AnnotationSet,
    tags: BTreeMap<String, String>,
    canvas: RgbaCanvas,
    frame: Option<Frame>,
    redraws: usize,
}

impl SoftwareViewport {
    /// Viewport of `viewport_size` physical pixels at one pixel per unit.
    pub fn new(viewport_size: Size) -> Self {
        Self {
            state: ViewState::default(),
            viewport_size,
            pixels_per_unit: 1.0,
            rotation: 0.0,
            render_size: Size::default(),
            annotations: AnnotationSet::new(),
            tags: BTreeMap::new(),
            canvas: RgbaCanvas::new(viewport_size),
            frame: None,
            redraws: 0,
        }
    }

    /// Display scaling.
    pub fn with_pixels_per_unit(mut self, ppu: f64) -> Self {
        self.pixels_per_unit = if ppu > 0.0 { ppu } else { 1.0 };
        self.canvas = RgbaCanvas::new(self.logical_size());
        self
    }

    /// Image rotation in degrees.
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Size the view reports as its render size.
    pub fn with_render_size(mut self, size: Size) -> Self {
        self.render_size = size;
        self
    }

    /// Annotations drawn over the frame.
    pub fn with_annotations(mut self, annotations: AnnotationSet) -> Self {
        self.annotations = annotations;
        self
    }

    /// Tags attached to captures.
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Initial view settings.
    pub fn with_view_state(mut self, state: ViewState) -> Self {
        self.state = state;
        self
    }

    /// Number of redraws so far.
    pub fn redraws(&self) -> usize {
        self.redraws
    }

    /// The displayed pixels.
    pub fn canvas(&self) -> &RgbaCanvas {
        &self.canvas
    }

    fn logical_size(&self) -> Size {
        Size::new(
            (f64::from(self.viewport_size.w) / self.pixels_per_unit) as u32,
            (f64::from(self.viewport_size.h) / self.pixels_per_unit) as u32,
        )
    }

    /// Image space to canvas space.
    fn image_transform(&self, image: Size) -> Affine {
        let canvas = self.canvas.size();
        let rotated = if self.is_quarter_turn() {
            image.transposed()
        } else {
            image
        };
        let scale = if self.state.frame_view {
            (f64::from(canvas.w) / f64::from(rotated.w.max(1)))
                .min(f64::from(canvas.h) / f64::from(rotated.h.max(1)))
        } else {
            self.state.zoom
        };
        let center = Vec2::new(f64::from(canvas.w) / 2.0, f64::from(canvas.h) / 2.0);
        Affine::translate(center + self.state.pan)
            * Affine::scale(scale)
            * Affine::rotate(self.rotation.to_radians())
            * Affine::translate((-f64::from(image.w) / 2.0, -f64::from(image.h) / 2.0))
    }

    fn is_quarter_turn(&self) -> bool {
        (self.rotation.abs() % 180.0 - 90.0).abs() < f64::EPSILON
    }

    fn draw_frame(&mut self, frame_size: Size, pixels: &[Rgba], transform: Affine) {
        let inverse = transform.inverse();
        let size = self.canvas.size();
        for y in 0..size.h {
            for x in 0..size.w {
                let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if p.x < 0.0 || p.y < 0.0 {
                    continue;
                }
                let (sx, sy) = (p.x as u32, p.y as u32);
                if sx < frame_size.w && sy < frame_size.h {
                    let src = pixels[sy as usize * frame_size.w as usize + sx as usize];
                    self.canvas.blend_over(x, y, src, 1.0);
                }
            }
        }
    }
}

impl Viewport for SoftwareViewport {
    fn view_state(&self) -> ViewState {
        self.state
    }

    fn set_view_state(&mut self, state: ViewState) {
        self.state = state;
    }

    fn render_size(&self) -> Size {
        self.render_size
    }

    fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.state.zoom = zoom;
        self.state.frame_view = false;
    }

    fn center_view(&mut self) {
        self.state.pan = Vec2::ZERO;
    }

    fn frame_view(&mut self) {
        self.state.frame_view = true;
        self.state.pan = Vec2::ZERO;
    }

    fn redraw(&mut self, time: RationalTime, frame: Option<&Image>) -> BakeResult<()> {
        if let Some(image) = frame {
            self.frame = Some(Frame {
                size: image.size(),
                pixels: decode_rgba(image)?,
            });
        }
        self.redraws += 1;
        self.canvas.clear([0.0, 0.0, 0.0, 1.0]);

        let frame = self.frame.take();
        let image_size = match &frame {
            Some(frame) => frame.size,
            None if !self.render_size.is_degenerate() => self.render_size,
            None => self.canvas.size(),
        };
        let transform = self.image_transform(image_size);
        if let Some(frame) = &frame
            && self.state.show_video
        {
            self.draw_frame(frame.size, &frame.pixels, transform);
        }
        let skipped = rasterize(self.annotations.shapes_at(time), transform, &mut self.canvas);
        if skipped > 0 {
            tracing::debug!(%time, skipped, "annotations missing from the burn-in");
        }
        self.frame = frame;

        if self.state.hud {
            let w = self.canvas.size().w;
            for y in 0..HUD_HEIGHT.min(self.canvas.size().h) {
                for x in 0..w {
                    self.canvas.blend_over(x, y, HUD_COLOR, 1.0);
                }
            }
        }
        Ok(())
    }

    fn capture(&mut self, x: u32, y: u32, out: &mut Image) -> BakeResult<()> {
        if self.redraws == 0 {
            return Err(BakeError::render("viewport captured before its first redraw"));
        }
        let region = self.canvas.read_region(x, y, out.size());
        encode_rgba(region.pixels(), out)
    }

    fn tags(&self) -> BTreeMap<String, String> {
        self.tags.clone()
    }
}

#[cfg(test)]
#[path = "../tests/unit/viewport.rs"]
mod tests;
