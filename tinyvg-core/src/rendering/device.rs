//! Device trait for rendering backend abstraction.
//!
//! The rendering context turns scene commands into device calls; the device
//! decides what a fill or a stroke means. [`Canvas`](super::raster::Canvas)
//! rasterizes them, [`RecordingDevice`] only writes them down.

use super::graphics_state::FillRule;
use super::path::Path;
use crate::core::color::Color;
use crate::core::error::TvgResult;
use crate::core::geometry::Point;

/// Paint for drawing operations, with colors already resolved from the
/// color table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Solid color
    Solid(Color),
    /// Color varies along the line from `start` to `end`
    LinearGradient {
        start: Point,
        end: Point,
        color_0: Color,
        color_1: Color,
    },
    /// Color varies with the distance from `center`
    RadialGradient {
        center: Point,
        radius: f32,
        color_0: Color,
        color_1: Color,
    },
}

impl Paint {
    /// Color of this paint at `p`, in scene units.
    ///
    /// Gradient parameters are clamped to `[0, 1]`. Degenerate gradients
    /// (zero length or zero radius) paint `color_0`.
    pub fn color_at(&self, p: Point) -> Color {
        match *self {
            Paint::Solid(color) => color,
            Paint::LinearGradient {
                start,
                end,
                color_0,
                color_1,
            } => {
                let dx = end.x - start.x;
                let dy = end.y - start.y;
                let len2 = dx * dx + dy * dy;
                if len2 < 1e-12 {
                    return color_0;
                }
                let t = ((p.x - start.x) * dx + (p.y - start.y) * dy) / len2;
                color_0.lerp(&color_1, t)
            }
            Paint::RadialGradient {
                center,
                radius,
                color_0,
                color_1,
            } => {
                if radius < 1e-6 {
                    return color_0;
                }
                color_0.lerp(&color_1, center.distance(p) / radius)
            }
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Color::BLACK)
    }
}

/// A device that can render TinyVG drawing operations.
pub trait Device {
    /// Fill the interior of `path`.
    fn fill_path(&mut self, path: &Path, rule: FillRule, paint: &Paint) -> TvgResult<()>;

    /// Stroke `path` with round caps and joins. Widths come from the path.
    fn stroke_path(&mut self, path: &Path, paint: &Paint) -> TvgResult<()>;

    /// Canvas size in scene units.
    fn canvas_bounds(&self) -> (f32, f32);
}

/// A device that records drawing operations as strings.
///
/// Useful for testing how scene commands are translated into fills and
/// strokes without looking at pixels.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    width: f32,
    height: f32,
    /// Recorded operations for testing
    operations: Vec<String>,
}

impl RecordingDevice {
    pub fn new(width: f32, height: f32) -> Self {
        RecordingDevice {
            width,
            height,
            operations: Vec::new(),
        }
    }

    /// Get the recorded operations.
    pub fn operations(&self) -> &[String] {
        &self.operations
    }
}

fn paint_name(paint: &Paint) -> &'static str {
    match paint {
        Paint::Solid(_) => "solid",
        Paint::LinearGradient { .. } => "linear",
        Paint::RadialGradient { .. } => "radial",
    }
}

impl Device for RecordingDevice {
    fn fill_path(&mut self, path: &Path, rule: FillRule, paint: &Paint) -> TvgResult<()> {
        self.operations
            .push(format!("fill({:?}, {}) {}", rule, paint_name(paint), path));
        Ok(())
    }

    fn stroke_path(&mut self, path: &Path, paint: &Paint) -> TvgResult<()> {
        self.operations.push(format!(
            "stroke({}, {}) {}",
            path.line_width(),
            paint_name(paint),
            path
        ));
        Ok(())
    }

    fn canvas_bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}
