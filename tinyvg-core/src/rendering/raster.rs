//! Supersampled scanline rasterizer.
//!
//! The canvas holds one premultiplied f32 RGBA value per sub-sample. Every
//! fill or stroke first builds a coverage mask with a scanline test at
//! sub-sample centers, then composites the paint once through that mask.

use smallvec::SmallVec;

use super::device::{Device, Paint};
use super::graphics_state::{FillRule, GraphicsState, Transform};
use super::path::{Contour, Path, circle_polygon};
use crate::core::error::{TvgError, TvgResult};
use crate::core::geometry::Point;

/// Edge lengths below this are treated as points when stroking.
const MIN_EDGE_LENGTH: f32 = 1e-6;

/// Reserves room for `len` items, mapping failure to `OutOfMemory`.
pub(crate) fn try_alloc<T: Clone>(len: usize, value: T, what: &str) -> TvgResult<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|e| TvgError::out_of_memory(format!("{} ({} items): {}", what, len, e)))?;
    buffer.resize(len, value);
    Ok(buffer)
}

/// Inclusive-exclusive sample rectangle touched by the current mask.
#[derive(Debug, Clone, Copy)]
struct Dirty {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

/// A supersampled drawing surface.
pub struct Canvas {
    /// Size in sub-samples
    width: usize,
    height: usize,
    /// Canvas size in scene units
    scene_width: f32,
    scene_height: f32,
    state: GraphicsState,
    /// Sub-sample to scene units
    inverse: Transform,
    /// Premultiplied RGBA per sub-sample
    samples: Vec<[f32; 4]>,
    /// Coverage of the shape being drawn
    mask: Vec<bool>,
    dirty: Option<Dirty>,
}

impl Canvas {
    /// Creates a transparent canvas of `width` x `height` sub-samples.
    ///
    /// `state.transform` maps scene units onto sub-samples.
    pub fn new(
        width: usize,
        height: usize,
        scene_size: (f32, f32),
        state: GraphicsState,
    ) -> TvgResult<Canvas> {
        let count = width
            .checked_mul(height)
            .ok_or_else(|| TvgError::out_of_memory("sample count overflows"))?;
        let inverse = state
            .transform
            .invert()
            .ok_or_else(|| TvgError::invalid("canvas transform is not invertible"))?;
        let samples = try_alloc(count, [0.0f32; 4], "sample buffer")?;
        let mask = try_alloc(count, false, "coverage mask")?;
        Ok(Canvas {
            width,
            height,
            scene_width: scene_size.0,
            scene_height: scene_size.1,
            state,
            inverse,
            samples,
            mask,
            dirty: None,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Premultiplied value of one sub-sample.
    pub fn sample(&self, x: usize, y: usize) -> Option<[f32; 4]> {
        if x < self.width && y < self.height {
            Some(self.samples[y * self.width + x])
        } else {
            None
        }
    }

    /// Averages `factor` x `factor` blocks of sub-samples into straight
    /// RGBA8 pixels.
    pub fn downsample(&self, factor: usize) -> TvgResult<Vec<u8>> {
        let factor = factor.max(1);
        let out_width = self.width / factor;
        let out_height = self.height / factor;
        let len = out_width
            .checked_mul(out_height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| TvgError::out_of_memory("pixel buffer size overflows"))?;
        let mut pixels = try_alloc(len, 0u8, "pixel buffer")?;
        let weight = 1.0 / (factor * factor) as f32;

        for py in 0..out_height {
            for px in 0..out_width {
                let mut sum = [0.0f32; 4];
                for sy in py * factor..(py + 1) * factor {
                    let row = sy * self.width;
                    for sx in px * factor..(px + 1) * factor {
                        let s = &self.samples[row + sx];
                        for (acc, v) in sum.iter_mut().zip(s) {
                            *acc += v;
                        }
                    }
                }
                let alpha = sum[3] * weight;
                let offset = (py * out_width + px) * 4;
                if alpha > 0.0 {
                    for c in 0..3 {
                        pixels[offset + c] = to_u8(sum[c] * weight / alpha);
                    }
                }
                pixels[offset + 3] = to_u8(alpha);
            }
        }
        Ok(pixels)
    }

    fn to_samples(&self, contours: &[Contour]) -> Vec<SmallVec<[Point; 16]>> {
        contours
            .iter()
            .map(|c| c.points.iter().map(|p| self.state.transform.apply(*p)).collect())
            .collect()
    }

    /// Marks every sample whose center lies inside `polygons` under `rule`.
    fn cover<P: AsRef<[Point]>>(&mut self, polygons: &[P], rule: FillRule) {
        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for p in polygons.iter().flat_map(|poly| poly.as_ref()) {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        if min_y > max_y {
            return;
        }

        let first_row = (min_y - 0.5).ceil().max(0.0) as usize;
        let last_row = ((max_y - 0.5).floor().min(self.height as f32 - 1.0)).max(-1.0);
        if last_row < 0.0 {
            return;
        }
        let last_row = last_row as usize;

        let mut crossings: SmallVec<[(f32, i32); 16]> = SmallVec::new();
        for row in first_row..=last_row {
            let yc = row as f32 + 0.5;
            crossings.clear();
            for poly in polygons {
                let poly = poly.as_ref();
                let n = poly.len();
                if n < 3 {
                    continue;
                }
                for i in 0..n {
                    let a = poly[i];
                    let b = poly[(i + 1) % n];
                    if a.y == b.y {
                        continue;
                    }
                    let (lo, hi, winding) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
                    if yc < lo.y || yc >= hi.y {
                        continue;
                    }
                    let t = (yc - lo.y) / (hi.y - lo.y);
                    crossings.push((lo.x + (hi.x - lo.x) * t, winding));
                }
            }
            if crossings.len() < 2 {
                continue;
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                let inside = match rule {
                    FillRule::EvenOdd => winding % 2 != 0,
                    FillRule::NonZero => winding != 0,
                };
                if inside {
                    self.mark_span(row, pair[0].0, pair[1].0);
                }
            }
        }
    }

    /// Marks samples of `row` whose centers lie in `[x0, x1)`.
    fn mark_span(&mut self, row: usize, x0: f32, x1: f32) {
        let start = (x0 - 0.5).ceil().max(0.0);
        let end = (x1 - 0.5).ceil().min(self.width as f32);
        if end <= start {
            return;
        }
        let (start, end) = (start as usize, end as usize);
        let base = row * self.width;
        self.mask[base + start..base + end].fill(true);

        let dirty = self.dirty.get_or_insert(Dirty {
            x0: start,
            y0: row,
            x1: end,
            y1: row + 1,
        });
        dirty.x0 = dirty.x0.min(start);
        dirty.x1 = dirty.x1.max(end);
        dirty.y0 = dirty.y0.min(row);
        dirty.y1 = dirty.y1.max(row + 1);
    }

    /// Source-over blends `paint` into every masked sample, then clears
    /// the mask.
    fn composite(&mut self, paint: &Paint) {
        let Some(dirty) = self.dirty.take() else {
            return;
        };
        let solid = match paint {
            Paint::Solid(color) => Some(color.premultiplied()),
            _ => None,
        };

        for y in dirty.y0..dirty.y1 {
            let row = y * self.width;
            for x in dirty.x0..dirty.x1 {
                let index = row + x;
                if !self.mask[index] {
                    continue;
                }
                self.mask[index] = false;

                let src = match solid {
                    Some(src) => src,
                    None => {
                        let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                        paint.color_at(self.inverse.apply(center)).premultiplied()
                    }
                };
                let dst = &mut self.samples[index];
                let keep = 1.0 - src[3];
                for c in 0..4 {
                    dst[c] = src[c] + dst[c] * keep;
                }
            }
        }
    }

    /// Convex pieces whose union is the stroke of `contours`: one quad per
    /// edge plus a disc at every vertex for round joins and caps.
    fn stroke_pieces(&self, contours: &[Contour]) -> Vec<SmallVec<[Point; 32]>> {
        let tolerance = self.state.scene_tolerance();
        let mut pieces = Vec::new();

        for contour in contours {
            let n = contour.points.len();
            let mut vertex_radius: SmallVec<[f32; 16]> = SmallVec::from_elem(0.0, n);

            for (i, (a, b, width)) in contour.edges().enumerate() {
                let half = width * 0.5;
                if half <= 0.0 {
                    continue;
                }
                vertex_radius[i] = vertex_radius[i].max(half);
                let j = (i + 1) % n;
                vertex_radius[j] = vertex_radius[j].max(half);

                let dx = b.x - a.x;
                let dy = b.y - a.y;
                let len = (dx * dx + dy * dy).sqrt();
                if len < MIN_EDGE_LENGTH {
                    continue;
                }
                let nx = -dy / len * half;
                let ny = dx / len * half;
                let mut quad = SmallVec::new();
                quad.push(Point::new(a.x + nx, a.y + ny));
                quad.push(Point::new(b.x + nx, b.y + ny));
                quad.push(Point::new(b.x - nx, b.y - ny));
                quad.push(Point::new(a.x - nx, a.y - ny));
                pieces.push(quad);
            }

            for (p, &radius) in contour.points.iter().zip(&vertex_radius) {
                if radius > 0.0 {
                    pieces.push(circle_polygon(*p, radius, tolerance));
                }
            }
        }
        pieces
    }

    fn is_outside(&self, path: &Path, margin: f32) -> bool {
        match path.bounding_box() {
            Some((min_x, min_y, max_x, max_y)) => {
                max_x + margin < 0.0
                    || max_y + margin < 0.0
                    || min_x - margin > self.scene_width
                    || min_y - margin > self.scene_height
            }
            None => true,
        }
    }
}

impl Device for Canvas {
    fn fill_path(&mut self, path: &Path, rule: FillRule, paint: &Paint) -> TvgResult<()> {
        if self.is_outside(path, 0.0) {
            return Ok(());
        }
        let contours = path.flatten(self.state.scene_tolerance());
        let polygons = self.to_samples(&contours);
        self.cover(&polygons, rule);
        self.composite(paint);
        Ok(())
    }

    fn stroke_path(&mut self, path: &Path, paint: &Paint) -> TvgResult<()> {
        let contours = path.flatten(self.state.scene_tolerance());
        let max_width = contours
            .iter()
            .flat_map(|c| c.widths.iter().copied())
            .fold(0.0f32, f32::max);
        if max_width <= 0.0 || self.is_outside(path, max_width) {
            return Ok(());
        }

        let transform = self.state.transform;
        let pieces: Vec<SmallVec<[Point; 32]>> = self
            .stroke_pieces(&contours)
            .into_iter()
            .map(|piece| piece.into_iter().map(|p| transform.apply(p)).collect())
            .collect();
        // Every piece is convex, so nonzero marks its interior whatever its
        // orientation, and marking into one mask takes their union.
        for piece in &pieces {
            self.cover(std::slice::from_ref(piece), FillRule::NonZero);
        }
        self.composite(paint);
        Ok(())
    }

    fn canvas_bounds(&self) -> (f32, f32) {
        (self.scene_width, self.scene_height)
    }
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
