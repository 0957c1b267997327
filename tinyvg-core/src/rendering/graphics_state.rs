//! Rendering state shared by the rasterizer and its device.

use crate::core::geometry::Point;

/// Fill rule for path filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Nonzero winding number rule
    NonZero,
    /// Even-odd rule; every TinyVG fill uses this one
    #[default]
    EvenOdd,
}

/// Affine transformation `[a b c d e f]`:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Transform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Transform {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Transform a point.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Largest factor by which this transform can stretch a length.
    pub fn max_scale(&self) -> f32 {
        let sx = (self.a * self.a + self.b * self.b).sqrt();
        let sy = (self.c * self.c + self.d * self.d).sqrt();
        sx.max(sy)
    }

    /// Inverse transform, `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Transform> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Transform {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

/// State the rasterizer needs to map scene geometry onto samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsState {
    /// Scene units to sub-sample units.
    pub transform: Transform,
    /// Maximum deviation of flattened curves, in sub-sample units.
    pub tolerance: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        GraphicsState {
            transform: Transform::identity(),
            tolerance: 0.25,
        }
    }
}

impl GraphicsState {
    /// Flattening tolerance expressed in scene units.
    pub fn scene_tolerance(&self) -> f32 {
        let scale = self.transform.max_scale();
        if scale > 0.0 {
            self.tolerance / scale
        } else {
            self.tolerance
        }
    }
}
