//! Annotation shapes and their CPU rasterizer.

use kurbo::{Affine, Line, ParamCurveNearest, Point, Rect};

use crate::foundation::time::RationalTime;
use crate::render::canvas::{Rgba, RgbaCanvas};

/// A drawn annotation primitive, in source-image pixel coordinates.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Freehand pen stroke.
    Stroke {
        points: Vec<Point>,
        color: Rgba,
        width: f64,
    },
    /// Straight arrow from `from` to `to`.
    Arrow {
        from: Point,
        to: Point,
        color: Rgba,
        width: f64,
    },
    /// Axis-aligned rectangle.
    Rectangle {
        rect: Rect,
        color: Rgba,
        width: f64,
        #[serde(default)]
        filled: bool,
    },
    /// Circle.
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
        width: f64,
        #[serde(default)]
        filled: bool,
    },
    /// Text label; carried through but not rasterized.
    Text {
        origin: Point,
        text: String,
        color: Rgba,
        size: f64,
    },
    /// Free-form note attached to the frame; never drawn.
    Note { text: String },
}

impl Shape {
    /// `true` for shapes the rasterizer draws.
    pub fn is_drawable(&self) -> bool {
        !matches!(self, Shape::Text { .. } | Shape::Note { .. })
    }
}

/// Shapes drawn on one frame, or on every frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    /// Frame the annotation belongs to.
    pub time: RationalTime,
    /// Show on every frame.
    #[serde(default)]
    pub all_frames: bool,
    /// Shapes in paint order.
    pub shapes: Vec<Shape>,
}

/// All annotations of a timeline.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
}

impl AnnotationSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an annotation.
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// `true` when no annotation exists.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// All annotations.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Shapes visible at `time`, in paint order.
    pub fn shapes_at(&self, time: RationalTime) -> impl Iterator<Item = &Shape> {
        self.annotations
            .iter()
            .filter(move |a| a.all_frames || a.time == time)
            .flat_map(|a| a.shapes.iter())
    }
}

/// Paint `shapes` into `canvas` through `transform` (image space to canvas pixels).
///
/// Returns the number of shapes skipped because they have no raster form.
pub fn rasterize<'a>(
    shapes: impl IntoIterator<Item = &'a Shape>,
    transform: Affine,
    canvas: &mut RgbaCanvas,
) -> usize {
    let scale = transform.determinant().abs().sqrt();
    let mut skipped = 0;
    for shape in shapes {
        match shape {
            Shape::Stroke {
                points,
                color,
                width,
            } => {
                let pts: Vec<Point> = points.iter().map(|p| transform * *p).collect();
                let segments: Vec<Line> = if pts.len() == 1 {
                    vec![Line::new(pts[0], pts[0])]
                } else {
                    pts.windows(2).map(|w| Line::new(w[0], w[1])).collect()
                };
                stroke_segments(canvas, &segments, *color, width * scale);
            }
            Shape::Arrow {
                from,
                to,
                color,
                width,
            } => {
                let width = width * scale;
                let segments = arrow_segments(transform * *from, transform * *to, width);
                stroke_segments(canvas, &segments, *color, width);
            }
            Shape::Rectangle {
                rect,
                color,
                width,
                filled,
            } => {
                let corners = [
                    transform * Point::new(rect.x0, rect.y0),
                    transform * Point::new(rect.x1, rect.y0),
                    transform * Point::new(rect.x1, rect.y1),
                    transform * Point::new(rect.x0, rect.y1),
                ];
                if *filled {
                    let bounds = corners
                        .iter()
                        .skip(1)
                        .fold(Rect::from_points(corners[0], corners[0]), |r, p| {
                            r.union_pt(*p)
                        });
                    fill(canvas, bounds, *color, |p| bounds.contains(p));
                }
                let edges: Vec<Line> = (0..4)
                    .map(|i| Line::new(corners[i], corners[(i + 1) % 4]))
                    .collect();
                stroke_segments(canvas, &edges, *color, width * scale);
            }
            Shape::Circle {
                center,
                radius,
                color,
                width,
                filled,
            } => {
                let c = transform * *center;
                let r = radius * scale;
                let half = (width * scale) / 2.0;
                let bounds =
                    Rect::new(c.x - r, c.y - r, c.x + r, c.y + r).inflate(half + 1.0, half + 1.0);
                for_each_pixel(canvas, bounds, |canvas, x, y, p| {
                    let d = p.distance(c);
                    let coverage = if *filled {
                        (r + 0.5 - d).clamp(0.0, 1.0)
                    } else {
                        (half + 0.5 - (d - r).abs()).clamp(0.0, 1.0)
                    };
                    if coverage > 0.0 {
                        canvas.blend_over(x, y, *color, coverage as f32);
                    }
                });
            }
            Shape::Text { text, .. } => {
                skipped += 1;
                tracing::debug!(text = %text, "skipping text annotation, not rasterized");
            }
            Shape::Note { text } => {
                skipped += 1;
                tracing::debug!(text = %text, "skipping note annotation, not rasterized");
            }
        }
    }
    skipped
}

fn arrow_segments(from: Point, to: Point, width: f64) -> Vec<Line> {
    let shaft = Line::new(from, to);
    let dir = to - from;
    let len = dir.hypot();
    if len <= f64::EPSILON {
        return vec![shaft];
    }
    let head = (len * 0.25).min(width.max(1.0) * 6.0);
    let (ux, uy) = (dir.x / len, dir.y / len);
    let (sin, cos) = std::f64::consts::FRAC_PI_6.sin_cos();
    let wing = |s: f64| {
        let rx = ux * cos - uy * s;
        let ry = ux * s + uy * cos;
        Line::new(to, Point::new(to.x - rx * head, to.y - ry * head))
    };
    vec![shaft, wing(sin), wing(-sin)]
}

fn stroke_segments(canvas: &mut RgbaCanvas, segments: &[Line], color: Rgba, width: f64) {
    let Some(first) = segments.first() else {
        return;
    };
    let half = width.max(1.0) / 2.0;
    let bounds = segments
        .iter()
        .fold(Rect::from_points(first.p0, first.p1), |r, l| {
            r.union_pt(l.p0).union_pt(l.p1)
        })
        .inflate(half + 1.0, half + 1.0);
    for_each_pixel(canvas, bounds, |canvas, x, y, p| {
        let d = segments
            .iter()
            .map(|l| l.nearest(p, 1e-6).distance_sq)
            .fold(f64::INFINITY, f64::min)
            .sqrt();
        let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
        if coverage > 0.0 {
            canvas.blend_over(x, y, color, coverage as f32);
        }
    });
}

fn fill(canvas: &mut RgbaCanvas, bounds: Rect, color: Rgba, inside: impl Fn(Point) -> bool) {
    for_each_pixel(canvas, bounds, |canvas, x, y, p| {
        if inside(p) {
            canvas.blend_over(x, y, color, 1.0);
        }
    });
}

/// Visit pixel centers inside `bounds`, clipped to the canvas.
fn for_each_pixel(
    canvas: &mut RgbaCanvas,
    bounds: Rect,
    mut f: impl FnMut(&mut RgbaCanvas, u32, u32, Point),
) {
    let size = canvas.size();
    let clip = |v: f64, max: u32| v.floor().clamp(0.0, f64::from(max)) as u32;
    let (x0, x1) = (clip(bounds.x0, size.w), clip(bounds.x1.ceil(), size.w));
    let (y0, y1) = (clip(bounds.y0, size.h), clip(bounds.y1.ceil(), size.h));
    for y in y0..y1 {
        for x in x0..x1 {
            f(canvas, x, y, Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5));
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/annotation.rs"]
mod tests;
