//! TinyVG text representation ("tvgt").
//!
//! An S-expression form of the binary format, one command per block:
//!
//! ```text
//! (tvg 1
//!   (24 24 1/4 u8888 reduced)
//!   (
//!     (0.161 0.678 1.000 1.000)
//!   )
//!   (
//!     (
//!       fill_path
//!       (flat 0)
//!       ( ... )
//!     )
//!   )
//! )
//! ```

use super::sink::{Sink, write_chunk};
use crate::core::error::TvgResult;
use crate::core::geometry::Point;
use crate::core::scene::{Command, Path, Scene, Segment, Style};

/// Writes `scene` in text form into `sink`, one line per chunk.
pub fn render_tvgt<S: Sink + ?Sized>(scene: &Scene, sink: &mut S) -> TvgResult<()> {
    let header = &scene.header;
    write_line(sink, 0, "(tvg 1")?;
    write_line(
        sink,
        1,
        &format!(
            "({} {} 1/{} {} {})",
            header.width,
            header.height,
            2f64.powi(i32::from(header.scale)),
            header.color_encoding.name(),
            header.coordinate_range.name()
        ),
    )?;

    write_line(sink, 1, "(")?;
    for color in &scene.colors {
        write_line(
            sink,
            2,
            &format!("({:.3} {:.3} {:.3} {:.3})", color.r, color.g, color.b, color.a),
        )?;
    }
    write_line(sink, 1, ")")?;

    write_line(sink, 1, "(")?;
    for command in &scene.commands {
        write_command(sink, command)?;
    }
    write_line(sink, 1, ")")?;
    write_line(sink, 0, ")")
}

fn write_line<S: Sink + ?Sized>(sink: &mut S, depth: usize, text: &str) -> TvgResult<()> {
    let mut line = "  ".repeat(depth);
    line.push_str(text);
    line.push('\n');
    write_chunk(sink, line.as_bytes())
}

fn point(p: Point) -> String {
    format!("({} {})", p.x, p.y)
}

fn style(style: &Style) -> String {
    match *style {
        Style::FlatColor { color } => format!("(flat {})", color),
        Style::LinearGradient {
            point_0,
            point_1,
            color_0,
            color_1,
        } => format!(
            "(linear {} {} {} {})",
            point(point_0),
            point(point_1),
            color_0,
            color_1
        ),
        Style::RadialGradient {
            center,
            edge,
            color_0,
            color_1,
        } => format!(
            "(radial {} {} {} {})",
            point(center),
            point(edge),
            color_0,
            color_1
        ),
    }
}

fn write_command<S: Sink + ?Sized>(sink: &mut S, command: &Command) -> TvgResult<()> {
    write_line(sink, 2, "(")?;
    write_line(sink, 3, command.name())?;
    if let Some(fill) = command.fill_style() {
        write_line(sink, 3, &style(fill))?;
    }
    if let Some(line) = command.line_style() {
        write_line(sink, 3, &style(line))?;
    }
    if let Some(width) = command.line_width() {
        write_line(sink, 3, &width.to_string())?;
    }

    write_line(sink, 3, "(")?;
    match command {
        Command::FillPolygon { points, .. }
        | Command::DrawLineLoop { points, .. }
        | Command::DrawLineStrip { points, .. }
        | Command::OutlineFillPolygon { points, .. } => {
            for p in points {
                write_line(sink, 4, &point(*p))?;
            }
        }
        Command::FillRectangles { rectangles, .. }
        | Command::OutlineFillRectangles { rectangles, .. } => {
            for r in rectangles {
                write_line(
                    sink,
                    4,
                    &format!("({} {} {} {})", r.x, r.y, r.width, r.height),
                )?;
            }
        }
        Command::DrawLines { lines, .. } => {
            for l in lines {
                write_line(sink, 4, &format!("({} {})", point(l.start), point(l.end)))?;
            }
        }
        Command::FillPath { path, .. }
        | Command::DrawLinePath { path, .. }
        | Command::OutlineFillPath { path, .. } => write_path(sink, path)?,
    }
    write_line(sink, 3, ")")?;
    write_line(sink, 2, ")")
}

fn write_path<S: Sink + ?Sized>(sink: &mut S, path: &Path) -> TvgResult<()> {
    for subpath in &path.subpaths {
        write_line(sink, 4, &point(subpath.start))?;
        write_line(sink, 4, "(")?;
        for instruction in &subpath.instructions {
            let width = match instruction.line_width {
                Some(w) => w.to_string(),
                None => "-".to_string(),
            };
            let text = match instruction.segment {
                Segment::Line { to } => format!("line {} {} {}", width, to.x, to.y),
                Segment::HorizontalLine { x } => format!("horiz {} {}", width, x),
                Segment::VerticalLine { y } => format!("vert {} {}", width, y),
                Segment::CubicBezier {
                    control_0,
                    control_1,
                    to,
                } => format!(
                    "bezier {} {} {} {}",
                    width,
                    point(control_0),
                    point(control_1),
                    point(to)
                ),
                Segment::ArcCircle {
                    large_arc,
                    sweep,
                    radius,
                    to,
                } => format!(
                    "arc_circle {} {} {} {} {}",
                    width,
                    radius,
                    large_arc,
                    sweep,
                    point(to)
                ),
                Segment::ArcEllipse {
                    large_arc,
                    sweep,
                    radius_x,
                    radius_y,
                    rotation,
                    to,
                } => format!(
                    "arc_ellipse {} {} {} {} {} {} {}",
                    width,
                    radius_x,
                    radius_y,
                    rotation,
                    large_arc,
                    sweep,
                    point(to)
                ),
                Segment::ClosePath => format!("close {}", width),
                Segment::QuadraticBezier { control, to } => format!(
                    "quadratic_bezier {} {} {}",
                    width,
                    point(control),
                    point(to)
                ),
            };
            write_line(sink, 5, &format!("({})", text))?;
        }
        write_line(sink, 4, ")")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Color;
    use crate::core::header::{ColorEncoding, CoordinateRange, Header};
    use crate::core::scene::{PathInstruction, SubPath};

    fn scene(commands: Vec<Command>) -> Scene {
        Scene::new(
            Header {
                version: 1,
                scale: 2,
                color_encoding: ColorEncoding::Rgba8888,
                coordinate_range: CoordinateRange::Reduced,
                width: 24,
                height: 24,
            },
            vec![Color::from_rgba8(255, 0, 0, 255)],
            commands,
        )
    }

    fn tvgt(scene: &Scene) -> String {
        let mut out = Vec::new();
        render_tvgt(scene, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header_and_colors() {
        let text = tvgt(&scene(vec![]));
        assert_eq!(
            text,
            "(tvg 1\n  (24 24 1/4 u8888 reduced)\n  (\n    (1.000 0.000 0.000 1.000)\n  )\n  (\n  )\n)\n"
        );
    }

    #[test]
    fn test_path_command() {
        let path = Path::new(vec![SubPath {
            start: Point::new(1.0, 2.0),
            instructions: vec![
                PathInstruction::with_line_width(Segment::Line { to: Point::new(3.0, 4.0) }, 0.5),
                PathInstruction::new(Segment::ClosePath),
            ],
        }]);
        let text = tvgt(&scene(vec![Command::DrawLinePath {
            line: Style::FlatColor { color: 0 },
            line_width: 1.5,
            path,
        }]));
        assert!(text.contains("      draw_line_path\n      (flat 0)\n      1.5\n"));
        assert!(text.contains("          (line 0.5 3 4)\n"));
        assert!(text.contains("          (close -)\n"));
    }

    #[test]
    fn test_outline_fill_lists_both_styles() {
        let text = tvgt(&scene(vec![Command::OutlineFillPolygon {
            fill: Style::FlatColor { color: 0 },
            line: Style::LinearGradient {
                point_0: Point::new(0.0, 0.0),
                point_1: Point::new(1.0, 0.0),
                color_0: 0,
                color_1: 0,
            },
            line_width: 1.0,
            points: vec![Point::new(0.0, 0.0)],
        }]));
        assert!(text.contains("(flat 0)\n      (linear (0 0) (1 0) 0 0)\n      1\n"));
    }
}
