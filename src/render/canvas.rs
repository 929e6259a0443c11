use crate::foundation::core::Size;

/// Straight-alpha RGBA pixel.
pub type Rgba = [f32; 4];

/// Host-memory RGBA `f32` raster, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbaCanvas {
    size: Size,
    pixels: Vec<Rgba>,
}

impl RgbaCanvas {
    /// Transparent black canvas of `size`.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![[0.0; 4]; size.pixel_count()],
        }
    }

    /// Wrap existing pixels; `pixels.len()` must equal `size.pixel_count()`.
    pub fn from_pixels(size: Size, pixels: Vec<Rgba>) -> Option<Self> {
        (pixels.len() == size.pixel_count()).then_some(Self { size, pixels })
    }

    /// Dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Fill with `color`.
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Pixel at `(x, y)`, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.size.w && y < self.size.h)
            .then(|| self.pixels[y as usize * self.size.w as usize + x as usize])
    }

    /// Composite `color` over the pixel at `(x, y)` with extra `coverage` in `0..=1`.
    pub fn blend_over(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        if x >= self.size.w || y >= self.size.h {
            return;
        }
        let idx = y as usize * self.size.w as usize + x as usize;
        let dst = self.pixels[idx];
        let sa = (color[3] * coverage).clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let da = dst[3];
        let out_a = sa + da * (1.0 - sa);
        let mut out = [0.0, 0.0, 0.0, out_a];
        if out_a > 0.0 {
            for c in 0..3 {
                out[c] = (color[c] * sa + dst[c] * da * (1.0 - sa)) / out_a;
            }
        }
        self.pixels[idx] = out;
    }

    /// Draw `src` (of `src_size`) stretched over the whole canvas, nearest-neighbour sampled.
    pub fn draw_stretched(&mut self, src: &[Rgba], src_size: Size) {
        if src_size.is_degenerate() || self.size.is_degenerate() {
            return;
        }
        let (dw, dh) = (self.size.w as usize, self.size.h as usize);
        let (sw, sh) = (src_size.w as usize, src_size.h as usize);
        for y in 0..dh {
            let sy = (y * sh / dh).min(sh - 1);
            for x in 0..dw {
                let sx = (x * sw / dw).min(sw - 1);
                let s = src[sy * sw + sx];
                let idx = y * dw + x;
                if s[3] >= 1.0 {
                    self.pixels[idx] = s;
                } else {
                    self.blend_over(x as u32, y as u32, s, 1.0);
                }
            }
        }
    }

    /// Copy the `size` region starting at `(x, y)`; pixels outside the canvas read as
    /// transparent black.
    pub fn read_region(&self, x: u32, y: u32, size: Size) -> RgbaCanvas {
        let mut out = RgbaCanvas::new(size);
        for row in 0..size.h {
            for col in 0..size.w {
                if let Some(p) = self.pixel(x + col, y + row) {
                    out.pixels[row as usize * size.w as usize + col as usize] = p;
                }
            }
        }
        out
    }

    /// Round every channel to `levels` steps, emulating an integer-backed buffer.
    pub fn quantize(&mut self, levels: f32) {
        for p in &mut self.pixels {
            for c in p.iter_mut() {
                *c = (c.clamp(0.0, 1.0) * levels).round() / levels;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
