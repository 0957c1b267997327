//! Device paths and their flattening.
//!
//! The rendering context records TinyVG geometry as a [`Path`]: a list of
//! drawing operations, each tagged with the stroke width in effect when it
//! was recorded. [`Path::flatten`] turns that list into polygon
//! [`Contour`]s for the rasterizer, which lets a stroke change width in the
//! middle of a sub-path.

use std::f32::consts::PI;
use std::fmt;

use smallvec::SmallVec;

use crate::core::geometry::Point;

/// Deepest curve subdivision.
const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Upper bound on segments used for one arc or circle.
const MAX_ARC_SEGMENTS: usize = 1024;

/// One recorded drawing operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    Move(Point),
    Line(Point),
    /// Control point, end point.
    Quad(Point, Point),
    /// Two control points, end point.
    Cubic(Point, Point, Point),
    /// Elliptical arc in SVG endpoint form; `rotation` is in degrees.
    Arc {
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

impl fmt::Display for PathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathOp::Move(to) => write!(f, "M {} {}", to.x, to.y),
            PathOp::Line(to) => write!(f, "L {} {}", to.x, to.y),
            PathOp::Quad(c, to) => write!(f, "Q {} {} {} {}", c.x, c.y, to.x, to.y),
            PathOp::Cubic(c0, c1, to) => write!(
                f,
                "C {} {} {} {} {} {}",
                c0.x,
                c0.y,
                c1.x,
                c1.y,
                to.x,
                to.y
            ),
            PathOp::Arc {
                radius_x,
                radius_y,
                rotation,
                large_arc,
                sweep,
                to,
            } => write!(
                f,
                "A {} {} {} {} {} {} {}",
                radius_x,
                radius_y,
                rotation,
                u8::from(large_arc),
                u8::from(sweep),
                to.x,
                to.y
            ),
            PathOp::Close => f.write_str("Z"),
        }
    }
}

/// A flattened sub-path.
///
/// `widths[i]` is the stroke width of the edge that starts at `points[i]`.
/// Open contours have one width less than points; closed contours have one
/// per point, the last belonging to the closing edge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub points: SmallVec<[Point; 16]>,
    pub widths: SmallVec<[f32; 16]>,
    pub closed: bool,
}

impl Contour {
    fn start(point: Point) -> Self {
        let mut contour = Contour::default();
        contour.points.push(point);
        contour
    }

    fn push(&mut self, point: Point, width: f32) {
        self.points.push(point);
        self.widths.push(width);
    }

    /// Edges as `(from, to, width)`, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point, f32)> + '_ {
        let n = self.points.len();
        let edge_count = if self.closed { n } else { n.saturating_sub(1) };
        (0..edge_count).map(move |i| {
            let width = self.widths.get(i).copied().unwrap_or(0.0);
            (self.points[i], self.points[(i + 1) % n], width)
        })
    }
}

/// Geometry handed to a [`Device`](super::device::Device).
///
/// Drawing before the first `move_to` starts a sub-path at the first point
/// the operation names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    ops: Vec<(PathOp, f32)>,
    width: f32,
    cursor: Option<Point>,
    origin: Point,
    open: bool,
}

impl Path {
    pub fn new() -> Self {
        Path::default()
    }

    fn record(&mut self, op: PathOp, to: Point) {
        self.ops.push((op, self.width));
        self.cursor = Some(to);
        self.open = true;
    }

    /// Starts a sub-path at `at` when nothing has been drawn yet. Returns
    /// whether it did.
    fn begin(&mut self, at: Point) -> bool {
        if self.cursor.is_some() {
            return false;
        }
        self.move_to(at);
        true
    }

    /// Stroke width recorded with the operations that follow.
    pub fn set_line_width(&mut self, width: f32) {
        self.width = width;
    }

    pub fn line_width(&self) -> f32 {
        self.width
    }

    pub fn move_to(&mut self, to: Point) {
        self.ops.push((PathOp::Move(to), self.width));
        self.cursor = Some(to);
        self.origin = to;
        self.open = false;
    }

    pub fn line_to(&mut self, to: Point) {
        if !self.begin(to) {
            self.record(PathOp::Line(to), to);
        }
    }

    pub fn quad_to(&mut self, control: Point, to: Point) {
        self.begin(control);
        self.record(PathOp::Quad(control, to), to);
    }

    pub fn curve_to(&mut self, control_0: Point, control_1: Point, to: Point) {
        self.begin(control_0);
        self.record(PathOp::Cubic(control_0, control_1, to), to);
    }

    /// Elliptical arc to `to`. `sweep` follows the SVG convention: set means
    /// the arc runs in the direction of increasing angle (clockwise on a
    /// y-down canvas).
    pub fn arc_to(
        &mut self,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        to: Point,
    ) {
        if self.begin(to) {
            return;
        }
        let op = PathOp::Arc {
            radius_x,
            radius_y,
            rotation,
            large_arc,
            sweep,
            to,
        };
        self.record(op, to);
    }

    /// Closed axis-aligned rectangle; negative sizes extend left or up.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.polyline(
            &[
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
            ],
            true,
        );
    }

    /// Sub-path through `points`, closed back to the first one if `close`.
    pub fn polyline(&mut self, points: &[Point], close: bool) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.move_to(*first);
        for p in rest {
            self.line_to(*p);
        }
        if close {
            self.close_path();
        }
    }

    /// Joins the cursor back to the sub-path start. A sub-path without any
    /// drawn segment stays as it is.
    pub fn close_path(&mut self) {
        if !self.open {
            return;
        }
        self.ops.push((PathOp::Close, self.width));
        self.cursor = Some(self.origin);
        self.open = false;
    }

    /// Recorded operations with their stroke widths.
    pub fn ops(&self) -> &[(PathOp, f32)] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// `(min_x, min_y, max_x, max_y)` over every point the path names.
    ///
    /// Bézier control points count, so the box may be loose. Arcs are
    /// bounded through their flattened points.
    pub fn bounding_box(&self) -> Option<(f32, f32, f32, f32)> {
        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        let mut grow = |p: Point| {
            bounds = Some(match bounds {
                None => (p.x, p.y, p.x, p.y),
                Some((x0, y0, x1, y1)) => {
                    (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y))
                }
            });
        };

        let mut has_arc = false;
        for &(op, _) in &self.ops {
            match op {
                PathOp::Move(p) | PathOp::Line(p) => grow(p),
                PathOp::Quad(c, p) => {
                    grow(c);
                    grow(p);
                }
                PathOp::Cubic(c0, c1, p) => {
                    grow(c0);
                    grow(c1);
                    grow(p);
                }
                PathOp::Arc { to, .. } => {
                    grow(to);
                    has_arc = true;
                }
                PathOp::Close => {}
            }
        }
        if has_arc {
            for contour in self.flatten(0.25) {
                contour.points.iter().copied().for_each(&mut grow);
            }
        }
        bounds
    }

    /// Flattens the path into polygonal contours.
    ///
    /// `tolerance` is the largest allowed distance between a curve and its
    /// approximation, in the path's own units.
    pub fn flatten(&self, tolerance: f32) -> Vec<Contour> {
        let tolerance = tolerance.max(1e-4);
        let mut contours = Vec::new();
        let mut contour: Option<Contour> = None;
        let mut origin = Point::default();

        for &(op, width) in &self.ops {
            if let PathOp::Move(p) = op {
                contours.extend(contour.take());
                origin = p;
                contour = Some(Contour::start(p));
                continue;
            }

            // Drawing after a close continues from the sub-path start.
            let current = contour.get_or_insert_with(|| Contour::start(origin));
            let from = current.points.last().copied().unwrap_or(origin);
            let mut emit = |q: Point| current.push(q, width);

            match op {
                PathOp::Move(_) => {}
                PathOp::Line(p) => emit(p),
                PathOp::Quad(c, p) => {
                    // Degree elevation keeps a single subdivision routine.
                    let c0 = lerp(from, c, 2.0 / 3.0);
                    let c1 = lerp(p, c, 2.0 / 3.0);
                    flatten_cubic(from, c0, c1, p, tolerance, 0, &mut emit);
                }
                PathOp::Cubic(c0, c1, p) => {
                    flatten_cubic(from, c0, c1, p, tolerance, 0, &mut emit);
                }
                PathOp::Arc {
                    radius_x,
                    radius_y,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                } => flatten_arc(
                    from,
                    radius_x,
                    radius_y,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                    tolerance,
                    &mut emit,
                ),
                PathOp::Close => {
                    current.closed = true;
                    current.widths.push(width);
                    contours.extend(contour.take());
                }
            }
        }
        contours.extend(contour);
        contours
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for (op, _) in &self.ops {
            write!(f, "{}{}", separator, op)?;
            separator = " ";
        }
        Ok(())
    }
}

fn lerp(a: Point, b: Point, t: f32) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

fn mid(a: Point, b: Point) -> Point {
    lerp(a, b, 0.5)
}

/// Distance from `p` to the line through `a` and `b`.
fn line_distance(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-6 {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

/// De Casteljau subdivision until both control points lie within
/// `tolerance` of the chord. Emits every point after `p0`.
fn flatten_cubic(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    tolerance: f32,
    depth: u32,
    out: &mut dyn FnMut(Point),
) {
    let flat = line_distance(p1, p0, p3) <= tolerance && line_distance(p2, p0, p3) <= tolerance;
    if flat || depth >= MAX_SUBDIVISION_DEPTH {
        out(p3);
        return;
    }

    let p01 = mid(p0, p1);
    let p12 = mid(p1, p2);
    let p23 = mid(p2, p3);
    let p012 = mid(p01, p12);
    let p123 = mid(p12, p23);
    let split = mid(p012, p123);

    flatten_cubic(p0, p01, p012, split, tolerance, depth + 1, out);
    flatten_cubic(split, p123, p23, p3, tolerance, depth + 1, out);
}

/// Number of chords needed to keep a circular arc of `radius` spanning
/// `sweep` radians within `tolerance`.
pub(crate) fn arc_segments(radius: f32, sweep: f32, tolerance: f32) -> usize {
    if radius <= tolerance {
        return ((sweep.abs() / (PI * 0.5)).ceil() as usize).clamp(1, 4);
    }
    let step = 2.0 * (1.0 - tolerance / radius).clamp(-1.0, 1.0).acos();
    if step <= 0.0 || !step.is_finite() {
        return MAX_ARC_SEGMENTS;
    }
    ((sweep.abs() / step).ceil() as usize).clamp(1, MAX_ARC_SEGMENTS)
}

/// Signed angle from `u` to `v`.
fn angle(ux: f32, uy: f32, vx: f32, vy: f32) -> f32 {
    let dot = ux * vx + uy * vy;
    let len = ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt();
    let a = (dot / len.max(1e-10)).clamp(-1.0, 1.0).acos();
    if ux * vy - uy * vx < 0.0 { -a } else { a }
}

/// Endpoint-to-center arc conversion (SVG 1.1, appendix F.6.5), then
/// uniform stepping in angle. Emits every point after `from`.
#[allow(clippy::too_many_arguments)]
fn flatten_arc(
    from: Point,
    radius_x: f32,
    radius_y: f32,
    rotation: f32,
    large_arc: bool,
    sweep: bool,
    to: Point,
    tolerance: f32,
    out: &mut dyn FnMut(Point),
) {
    if (from.x - to.x).abs() < 1e-6 && (from.y - to.y).abs() < 1e-6 {
        return;
    }
    let mut rx = radius_x.abs();
    let mut ry = radius_y.abs();
    if rx < 1e-6 || ry < 1e-6 {
        out(to);
        return;
    }

    let phi = rotation.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (from.x - to.x) * 0.5;
    let dy2 = (from.y - to.y) * 0.5;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Radii too small to reach the endpoint are scaled up.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }
    let rx2 = rx * rx;
    let ry2 = ry * ry;

    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let sq = if den < 1e-10 {
        0.0
    } else {
        (num / den).max(0.0).sqrt()
    };
    let cxp = sign * sq * rx * y1p / ry;
    let cyp = -sign * sq * ry * x1p / rx;

    let cx = cos_phi * cxp - sin_phi * cyp + (from.x + to.x) * 0.5;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.y + to.y) * 0.5;

    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;

    let theta1 = angle(1.0, 0.0, ux, uy);
    let mut d_theta = angle(ux, uy, vx, vy);
    if !sweep && d_theta > 0.0 {
        d_theta -= 2.0 * PI;
    } else if sweep && d_theta < 0.0 {
        d_theta += 2.0 * PI;
    }

    let n = arc_segments(rx.max(ry), d_theta, tolerance);
    let dt = d_theta / n as f32;
    for i in 1..n {
        let theta = theta1 + dt * i as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        out(Point::new(
            cos_phi * rx * cos_t - sin_phi * ry * sin_t + cx,
            sin_phi * rx * cos_t + cos_phi * ry * sin_t + cy,
        ));
    }
    // Land exactly on the target.
    out(to);
}

/// Polygon approximating a circle, counter-clockwise in y-down space.
pub(crate) fn circle_polygon(center: Point, radius: f32, tolerance: f32) -> SmallVec<[Point; 32]> {
    let n = arc_segments(radius, 2.0 * PI, tolerance).max(8);
    (0..n)
        .map(|i| {
            let theta = 2.0 * PI * i as f32 / n as f32;
            let (sin_t, cos_t) = theta.sin_cos();
            Point::new(center.x + radius * cos_t, center.y + radius * sin_t)
        })
        .collect()
}
