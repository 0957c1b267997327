//! Rendering context for walking a scene.
//!
//! The context resolves styles against the color table, converts TinyVG
//! geometry into device paths and forwards every command to the device in
//! painter's order.

use super::device::{Device, Paint};
use super::graphics_state::FillRule;
use super::path::Path;
use crate::core::error::TvgResult;
use crate::core::geometry::{Point, Rect};
use crate::core::scene::{self, Command, Scene, Segment, Style};

/// Coordinates the translation of scene commands into device operations.
pub struct RenderingContext<D: Device> {
    /// The device for rendering
    device: D,
}

impl<D: Device> RenderingContext<D> {
    pub fn new(device: D) -> Self {
        RenderingContext { device }
    }

    /// Get the device.
    pub fn device(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    /// Draw every command of `scene`, stopping at the first error.
    pub fn render_scene(&mut self, scene: &Scene) -> TvgResult<()> {
        for command in &scene.commands {
            self.render_command(scene, command)?;
        }
        Ok(())
    }

    /// Draw one command.
    ///
    /// Rectangles and separate lines are painted one item at a time, so
    /// overlapping items blend with each other like separate elements.
    pub fn render_command(&mut self, scene: &Scene, command: &Command) -> TvgResult<()> {
        match command {
            Command::FillPolygon { fill, points } => {
                let paint = resolve_paint(scene, fill)?;
                self.fill(&polygon_path(points, 0.0), &paint)
            }
            Command::FillRectangles { fill, rectangles } => {
                let paint = resolve_paint(scene, fill)?;
                for rect in rectangles {
                    self.fill(&rect_path(rect, 0.0), &paint)?;
                }
                Ok(())
            }
            Command::FillPath { fill, path } => {
                let paint = resolve_paint(scene, fill)?;
                self.fill(&convert_path(path, 0.0), &paint)
            }
            Command::DrawLines {
                line,
                line_width,
                lines,
            } => {
                let paint = resolve_paint(scene, line)?;
                for segment in lines {
                    let mut path = Path::new();
                    path.set_line_width(*line_width);
                    path.move_to(segment.start);
                    path.line_to(segment.end);
                    self.device.stroke_path(&path, &paint)?;
                }
                Ok(())
            }
            Command::DrawLineLoop {
                line,
                line_width,
                points,
            } => {
                let paint = resolve_paint(scene, line)?;
                self.device
                    .stroke_path(&polygon_path(points, *line_width), &paint)
            }
            Command::DrawLineStrip {
                line,
                line_width,
                points,
            } => {
                let paint = resolve_paint(scene, line)?;
                let mut path = Path::new();
                path.set_line_width(*line_width);
                path.polyline(points, false);
                self.device.stroke_path(&path, &paint)
            }
            Command::DrawLinePath {
                line,
                line_width,
                path,
            } => {
                let paint = resolve_paint(scene, line)?;
                self.device
                    .stroke_path(&convert_path(path, *line_width), &paint)
            }
            Command::OutlineFillPolygon {
                fill,
                line,
                line_width,
                points,
            } => {
                let path = polygon_path(points, *line_width);
                self.fill_and_stroke(scene, fill, line, &path)
            }
            Command::OutlineFillRectangles {
                fill,
                line,
                line_width,
                rectangles,
            } => {
                for rect in rectangles {
                    let path = rect_path(rect, *line_width);
                    self.fill_and_stroke(scene, fill, line, &path)?;
                }
                Ok(())
            }
            Command::OutlineFillPath {
                fill,
                line,
                line_width,
                path,
            } => {
                let path = convert_path(path, *line_width);
                self.fill_and_stroke(scene, fill, line, &path)
            }
        }
    }

    fn fill(&mut self, path: &Path, paint: &Paint) -> TvgResult<()> {
        self.device.fill_path(path, FillRule::EvenOdd, paint)
    }

    fn fill_and_stroke(
        &mut self,
        scene: &Scene,
        fill: &Style,
        line: &Style,
        path: &Path,
    ) -> TvgResult<()> {
        let fill_paint = resolve_paint(scene, fill)?;
        let line_paint = resolve_paint(scene, line)?;
        self.fill(path, &fill_paint)?;
        self.device.stroke_path(path, &line_paint)
    }
}

/// Resolves a style's color indices. Unknown indices are `InvalidData`.
pub fn resolve_paint(scene: &Scene, style: &Style) -> TvgResult<Paint> {
    Ok(match *style {
        Style::FlatColor { color } => Paint::Solid(scene.color(color)?),
        Style::LinearGradient {
            point_0,
            point_1,
            color_0,
            color_1,
        } => Paint::LinearGradient {
            start: point_0,
            end: point_1,
            color_0: scene.color(color_0)?,
            color_1: scene.color(color_1)?,
        },
        Style::RadialGradient {
            center,
            edge,
            color_0,
            color_1,
        } => Paint::RadialGradient {
            center,
            radius: center.distance(edge),
            color_0: scene.color(color_0)?,
            color_1: scene.color(color_1)?,
        },
    })
}

fn polygon_path(points: &[Point], line_width: f32) -> Path {
    let mut path = Path::new();
    path.set_line_width(line_width);
    path.polyline(points, true);
    path
}

fn rect_path(rect: &Rect, line_width: f32) -> Path {
    let mut path = Path::new();
    path.set_line_width(line_width);
    path.rect(rect.x, rect.y, rect.width, rect.height);
    path
}

/// Converts a TinyVG path into a device path.
///
/// TinyVG's arc sweep flag runs opposite to the SVG convention used by
/// [`Path::arc_to`], so it is inverted here.
pub fn convert_path(source: &scene::Path, line_width: f32) -> Path {
    let mut path = Path::new();
    path.set_line_width(line_width);

    for subpath in &source.subpaths {
        path.move_to(subpath.start);
        let mut current = subpath.start;
        for instruction in &subpath.instructions {
            if let Some(width) = instruction.line_width {
                path.set_line_width(width);
            }
            let segment = instruction.segment;
            match segment {
                Segment::Line { to } => path.line_to(to),
                Segment::HorizontalLine { .. } | Segment::VerticalLine { .. } => {
                    path.line_to(segment.end_point(current, subpath.start))
                }
                Segment::CubicBezier {
                    control_0,
                    control_1,
                    to,
                } => path.curve_to(control_0, control_1, to),
                Segment::QuadraticBezier { control, to } => path.quad_to(control, to),
                Segment::ArcCircle {
                    large_arc,
                    sweep,
                    radius,
                    to,
                } => path.arc_to(radius, radius, 0.0, large_arc, !sweep, to),
                Segment::ArcEllipse {
                    large_arc,
                    sweep,
                    radius_x,
                    radius_y,
                    rotation,
                    to,
                } => path.arc_to(radius_x, radius_y, rotation, large_arc, !sweep, to),
                Segment::ClosePath => path.close_path(),
            }
            current = segment.end_point(current, subpath.start);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Color;
    use crate::core::geometry::Line;
    use crate::core::header::{ColorEncoding, CoordinateRange, Header};
    use crate::core::scene::{PathInstruction, SubPath};
    use crate::rendering::device::RecordingDevice;

    fn scene(commands: Vec<Command>) -> Scene {
        Scene::new(
            Header {
                version: 1,
                scale: 0,
                color_encoding: ColorEncoding::Rgba8888,
                coordinate_range: CoordinateRange::Default,
                width: 16,
                height: 16,
            },
            vec![Color::BLACK, Color::WHITE],
            commands,
        )
    }

    fn record(scene: &Scene) -> Vec<String> {
        let mut context = RenderingContext::new(RecordingDevice::new(16.0, 16.0));
        context.render_scene(scene).unwrap();
        context.into_device().operations().to_vec()
    }

    #[test]
    fn test_fill_rectangles_one_fill_per_item() {
        let s = scene(vec![Command::FillRectangles {
            fill: Style::FlatColor { color: 0 },
            rectangles: vec![Rect::new(0.0, 0.0, 2.0, 2.0), Rect::new(4.0, 4.0, 1.0, 1.0)],
        }]);
        let ops = record(&s);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], "fill(EvenOdd, solid) M 0 0 L 2 0 L 2 2 L 0 2 Z");
    }

    #[test]
    fn test_outline_fill_fills_then_strokes() {
        let s = scene(vec![Command::OutlineFillPolygon {
            fill: Style::FlatColor { color: 0 },
            line: Style::FlatColor { color: 1 },
            line_width: 2.0,
            points: vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.0)],
        }]);
        let ops = record(&s);
        assert!(ops[0].starts_with("fill(EvenOdd, solid)"));
        assert!(ops[1].starts_with("stroke(2, solid)"));
        assert!(ops[1].ends_with("Z"));
    }

    #[test]
    fn test_draw_lines_and_strip() {
        let s = scene(vec![
            Command::DrawLines {
                line: Style::FlatColor { color: 0 },
                line_width: 1.0,
                lines: vec![Line::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))],
            },
            Command::DrawLineStrip {
                line: Style::FlatColor { color: 0 },
                line_width: 1.0,
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)],
            },
        ]);
        let ops = record(&s);
        assert_eq!(ops[0], "stroke(1, solid) M 0 0 L 1 1");
        assert_eq!(ops[1], "stroke(1, solid) M 0 0 L 1 1 L 2 0");
    }

    #[test]
    fn test_convert_path_inverts_sweep() {
        let source = scene::Path::new(vec![SubPath {
            start: Point::new(0.0, 0.0),
            instructions: vec![
                PathInstruction::new(Segment::HorizontalLine { x: 5.0 }),
                PathInstruction::new(Segment::ArcCircle {
                    large_arc: false,
                    sweep: true,
                    radius: 2.0,
                    to: Point::new(5.0, 4.0),
                }),
                PathInstruction::new(Segment::VerticalLine { y: 8.0 }),
            ],
        }]);
        let path = convert_path(&source, 1.0);
        assert_eq!(path.to_string(), "M 0 0 L 5 0 A 2 2 0 0 0 5 4 L 5 8");
    }

    #[test]
    fn test_bad_color_index_is_invalid_data() {
        let s = scene(vec![Command::FillPolygon {
            fill: Style::FlatColor { color: 2 },
            points: vec![Point::new(0.0, 0.0)],
        }]);
        let mut context = RenderingContext::new(RecordingDevice::new(16.0, 16.0));
        let err = context.render_scene(&s).unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_radial_paint_radius() {
        let s = scene(vec![]);
        let style = Style::RadialGradient {
            center: Point::new(0.0, 0.0),
            edge: Point::new(3.0, 4.0),
            color_0: 0,
            color_1: 1,
        };
        match resolve_paint(&s, &style).unwrap() {
            Paint::RadialGradient { radius, .. } => assert_eq!(radius, 5.0),
            other => panic!("unexpected paint {:?}", other),
        }
    }
}
