//! SVG emitter.
//!
//! Every command item becomes one SVG element. Gradient definitions are
//! written in a `<defs>` block just before the first element that uses
//! them and referenced by id afterwards.

use rustc_hash::FxHashMap;

use super::sink::{Sink, write_chunk};
use crate::core::color::Color;
use crate::core::error::TvgResult;
use crate::core::geometry::{Point, Rect};
use crate::core::scene::{Command, Path, Scene, Segment, Style};

/// Width written for zero-width strokes, which SVG viewers would drop.
const MIN_STROKE_WIDTH: f32 = 0.001;

/// Options for [`render_svg_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgOptions {
    /// Maximum fractional digits of emitted numbers.
    pub precision: usize,
    /// Emit `width` and `height` attributes next to the `viewBox`.
    pub include_size: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        SvgOptions {
            precision: 3,
            include_size: true,
        }
    }
}

/// Writes `scene` as an SVG document into `sink`.
pub fn render_svg<S: Sink + ?Sized>(scene: &Scene, sink: &mut S) -> TvgResult<()> {
    render_svg_with_options(scene, sink, &SvgOptions::default())
}

pub fn render_svg_with_options<S: Sink + ?Sized>(
    scene: &Scene,
    sink: &mut S,
    options: &SvgOptions,
) -> TvgResult<()> {
    let mut emitter = SvgEmitter {
        scene,
        sink,
        precision: options.precision,
        gradients: FxHashMap::default(),
    };
    emitter.prolog(options)?;
    for command in &scene.commands {
        emitter.command(command)?;
    }
    emitter.emit("</svg>\n")?;
    log::debug!(
        "emitted SVG for {} command(s), {} gradient(s)",
        scene.commands.len(),
        emitter.gradients.len()
    );
    Ok(())
}

fn positive_extent(start: f32, size: f32) -> (f32, f32) {
    if size < 0.0 {
        (start + size, -size)
    } else {
        (start, size)
    }
}

/// Formats `value` with at most `precision` fractional digits, without
/// trailing zeros and never as `-0`.
pub(crate) fn format_number(value: f32, precision: usize) -> String {
    let mut text = format!("{:.*}", precision, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

struct SvgEmitter<'a, S: Sink + ?Sized> {
    scene: &'a Scene,
    sink: &'a mut S,
    precision: usize,
    /// Gradient body -> element id
    gradients: FxHashMap<String, String>,
}

impl<S: Sink + ?Sized> SvgEmitter<'_, S> {
    fn emit(&mut self, text: &str) -> TvgResult<()> {
        write_chunk(&mut *self.sink, text.as_bytes())
    }

    fn num(&self, value: f32) -> String {
        format_number(value, self.precision)
    }

    fn point(&self, p: Point) -> String {
        format!("{} {}", self.num(p.x), self.num(p.y))
    }

    fn prolog(&mut self, options: &SvgOptions) -> TvgResult<()> {
        let width = self.scene.width();
        let height = self.scene.height();
        let mut text = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\"");
        if options.include_size {
            text.push_str(&format!(" width=\"{}\" height=\"{}\"", width, height));
        }
        text.push_str(&format!(" viewBox=\"0 0 {} {}\">\n", width, height));
        self.emit(&text)
    }

    /// Returns the attribute value for `style`, first emitting a gradient
    /// definition if this is its first use.
    fn paint(&mut self, style: &Style) -> TvgResult<String> {
        let (tag, geometry, color_0, color_1) = match *style {
            Style::FlatColor { color } => {
                let c = self.scene.color(color)?;
                return Ok(hex_color(&c));
            }
            Style::LinearGradient {
                point_0,
                point_1,
                color_0,
                color_1,
            } => (
                "linearGradient",
                format!(
                    "x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"",
                    self.num(point_0.x),
                    self.num(point_0.y),
                    self.num(point_1.x),
                    self.num(point_1.y)
                ),
                color_0,
                color_1,
            ),
            Style::RadialGradient {
                center,
                edge,
                color_0,
                color_1,
            } => (
                "radialGradient",
                format!(
                    "cx=\"{}\" cy=\"{}\" r=\"{}\"",
                    self.num(center.x),
                    self.num(center.y),
                    self.num(center.distance(edge))
                ),
                color_0,
                color_1,
            ),
        };

        let c0 = self.scene.color(color_0)?;
        let c1 = self.scene.color(color_1)?;
        let body = format!(
            "<{tag} ID gradientUnits=\"userSpaceOnUse\" {geometry}>{}{}</{tag}>",
            self.stop(0, &c0),
            self.stop(1, &c1),
        );
        if let Some(id) = self.gradients.get(&body) {
            return Ok(format!("url(#{})", id));
        }

        let id = format!("g{}", self.gradients.len());
        let definition = body.replacen("ID", &format!("id=\"{}\"", id), 1);
        self.emit(&format!("<defs>{}</defs>\n", definition))?;
        self.gradients.insert(body, id.clone());
        Ok(format!("url(#{})", id))
    }

    fn stop(&self, offset: u8, color: &Color) -> String {
        let mut text = format!("<stop offset=\"{}\" stop-color=\"{}\"", offset, hex_color(color));
        if color.a < 1.0 {
            text.push_str(&format!(" stop-opacity=\"{}\"", self.num(color.a.max(0.0))));
        }
        text.push_str("/>");
        text
    }

    fn fill_attrs(&mut self, style: &Style) -> TvgResult<String> {
        let paint = self.paint(style)?;
        let mut attrs = format!(" fill=\"{}\" fill-rule=\"evenodd\"", paint);
        if let Some(opacity) = self.flat_opacity(style)? {
            attrs.push_str(&format!(" fill-opacity=\"{}\"", opacity));
        }
        Ok(attrs)
    }

    fn stroke_attrs(&mut self, style: &Style, width: f32) -> TvgResult<String> {
        let paint = self.paint(style)?;
        let width = if width == 0.0 { MIN_STROKE_WIDTH } else { width };
        let mut attrs = format!(
            " stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"",
            paint,
            self.num(width)
        );
        if let Some(opacity) = self.flat_opacity(style)? {
            attrs.push_str(&format!(" stroke-opacity=\"{}\"", opacity));
        }
        Ok(attrs)
    }

    /// Opacity attribute value for translucent flat colors.
    fn flat_opacity(&self, style: &Style) -> TvgResult<Option<String>> {
        if let Style::FlatColor { color } = *style {
            let c = self.scene.color(color)?;
            if c.a < 1.0 {
                return Ok(Some(self.num(c.a.max(0.0))));
            }
        }
        Ok(None)
    }

    fn points(&self, points: &[Point]) -> String {
        points
            .iter()
            .map(|p| format!("{},{}", self.num(p.x), self.num(p.y)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `<rect>` rejects negative sizes, so the rectangle is flipped onto
    /// its positive extent first.
    fn rect(&self, rect: &Rect, attrs: &str) -> String {
        let (x, width) = positive_extent(rect.x, rect.width);
        let (y, height) = positive_extent(rect.y, rect.height);
        format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}/>\n",
            self.num(x),
            self.num(y),
            self.num(width),
            self.num(height),
            attrs
        )
    }

    fn path_data(&self, path: &Path) -> String {
        let mut d = String::new();
        for subpath in &path.subpaths {
            if !d.is_empty() {
                d.push(' ');
            }
            d.push_str(&format!("M{}", self.point(subpath.start)));
            for instruction in &subpath.instructions {
                d.push(' ');
                let part = match instruction.segment {
                    Segment::Line { to } => format!("L{}", self.point(to)),
                    Segment::HorizontalLine { x } => format!("H{}", self.num(x)),
                    Segment::VerticalLine { y } => format!("V{}", self.num(y)),
                    Segment::CubicBezier {
                        control_0,
                        control_1,
                        to,
                    } => format!(
                        "C{} {} {}",
                        self.point(control_0),
                        self.point(control_1),
                        self.point(to)
                    ),
                    Segment::ArcCircle {
                        large_arc,
                        sweep,
                        radius,
                        to,
                    } => format!(
                        "A{} {} 0 {} {} {}",
                        self.num(radius),
                        self.num(radius),
                        u8::from(large_arc),
                        u8::from(!sweep),
                        self.point(to)
                    ),
                    Segment::ArcEllipse {
                        large_arc,
                        sweep,
                        radius_x,
                        radius_y,
                        rotation,
                        to,
                    } => format!(
                        "A{} {} {} {} {} {}",
                        self.num(radius_x),
                        self.num(radius_y),
                        self.num(rotation),
                        u8::from(large_arc),
                        u8::from(!sweep),
                        self.point(to)
                    ),
                    Segment::ClosePath => "Z".to_string(),
                    Segment::QuadraticBezier { control, to } => {
                        format!("Q{} {}", self.point(control), self.point(to))
                    }
                };
                d.push_str(&part);
            }
        }
        d
    }

    fn command(&mut self, command: &Command) -> TvgResult<()> {
        match command {
            Command::FillPolygon { fill, points } => {
                let attrs = self.fill_attrs(fill)?;
                let text = format!("<polygon{} points=\"{}\"/>\n", attrs, self.points(points));
                self.emit(&text)
            }
            Command::FillRectangles { fill, rectangles } => {
                let attrs = self.fill_attrs(fill)?;
                for rect in rectangles {
                    let text = self.rect(rect, &attrs);
                    self.emit(&text)?;
                }
                Ok(())
            }
            Command::FillPath { fill, path } => {
                let attrs = self.fill_attrs(fill)?;
                let text = format!("<path{} d=\"{}\"/>\n", attrs, self.path_data(path));
                self.emit(&text)
            }
            Command::DrawLines {
                line,
                line_width,
                lines,
            } => {
                let attrs = self.stroke_attrs(line, *line_width)?;
                for segment in lines {
                    let text = format!(
                        "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" fill=\"none\"{}/>\n",
                        self.num(segment.start.x),
                        self.num(segment.start.y),
                        self.num(segment.end.x),
                        self.num(segment.end.y),
                        attrs
                    );
                    self.emit(&text)?;
                }
                Ok(())
            }
            Command::DrawLineLoop {
                line,
                line_width,
                points,
            } => {
                let attrs = self.stroke_attrs(line, *line_width)?;
                let text = format!(
                    "<polygon fill=\"none\"{} points=\"{}\"/>\n",
                    attrs,
                    self.points(points)
                );
                self.emit(&text)
            }
            Command::DrawLineStrip {
                line,
                line_width,
                points,
            } => {
                let attrs = self.stroke_attrs(line, *line_width)?;
                let text = format!(
                    "<polyline fill=\"none\"{} points=\"{}\"/>\n",
                    attrs,
                    self.points(points)
                );
                self.emit(&text)
            }
            Command::DrawLinePath {
                line,
                line_width,
                path,
            } => {
                let attrs = self.stroke_attrs(line, *line_width)?;
                let text = format!(
                    "<path fill=\"none\"{} d=\"{}\"/>\n",
                    attrs,
                    self.path_data(path)
                );
                self.emit(&text)
            }
            Command::OutlineFillPolygon {
                fill,
                line,
                line_width,
                points,
            } => {
                let attrs = self.fill_attrs(fill)? + &self.stroke_attrs(line, *line_width)?;
                let text = format!("<polygon{} points=\"{}\"/>\n", attrs, self.points(points));
                self.emit(&text)
            }
            Command::OutlineFillRectangles {
                fill,
                line,
                line_width,
                rectangles,
            } => {
                let attrs = self.fill_attrs(fill)? + &self.stroke_attrs(line, *line_width)?;
                for rect in rectangles {
                    let text = self.rect(rect, &attrs);
                    self.emit(&text)?;
                }
                Ok(())
            }
            Command::OutlineFillPath {
                fill,
                line,
                line_width,
                path,
            } => {
                let attrs = self.fill_attrs(fill)? + &self.stroke_attrs(line, *line_width)?;
                let text = format!("<path{} d=\"{}\"/>\n", attrs, self.path_data(path));
                self.emit(&text)
            }
        }
    }
}

fn hex_color(color: &Color) -> String {
    let [r, g, b, _] = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Line;
    use crate::core::header::{ColorEncoding, CoordinateRange, Header};
    use crate::core::scene::{PathInstruction, SubPath};

    fn scene(colors: Vec<Color>, commands: Vec<Command>) -> Scene {
        Scene::new(
            Header {
                version: 1,
                scale: 0,
                color_encoding: ColorEncoding::Rgba8888,
                coordinate_range: CoordinateRange::Default,
                width: 24,
                height: 16,
            },
            colors,
            commands,
        )
    }

    fn svg(scene: &Scene) -> String {
        let mut out = Vec::new();
        render_svg(scene, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0, 3), "1");
        assert_eq!(format_number(0.5, 3), "0.5");
        assert_eq!(format_number(1.23456, 3), "1.235");
        assert_eq!(format_number(-0.0001, 3), "0");
        assert_eq!(format_number(-2.5, 3), "-2.5");
        assert_eq!(format_number(10.0, 0), "10");
    }

    #[test]
    fn test_empty_document() {
        let text = svg(&scene(vec![], vec![]));
        assert_eq!(
            text,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"24\" height=\"16\" viewBox=\"0 0 24 16\">\n</svg>\n"
        );
    }

    #[test]
    fn test_without_size() {
        let mut out = Vec::new();
        let options = SvgOptions {
            include_size: false,
            ..SvgOptions::default()
        };
        render_svg_with_options(&scene(vec![], vec![]), &mut out, &options).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox="));
    }

    #[test]
    fn test_flat_fill_with_opacity() {
        let s = scene(
            vec![Color::from_rgba8(0x29, 0xAD, 0xFF, 0x80)],
            vec![Command::FillPolygon {
                fill: Style::FlatColor { color: 0 },
                points: vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.5)],
            }],
        );
        let text = svg(&s);
        assert!(text.contains(
            "<polygon fill=\"#29adff\" fill-rule=\"evenodd\" fill-opacity=\"0.502\" points=\"0,0 4,0 0,4.5\"/>"
        ));
    }

    #[test]
    fn test_translucent_stroke_and_stops() {
        let half = Color::from_rgba8(0, 0, 0, 0x80);
        let s = scene(
            vec![half, Color::WHITE],
            vec![
                Command::DrawLines {
                    line: Style::FlatColor { color: 0 },
                    line_width: 1.0,
                    lines: vec![Line::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0))],
                },
                Command::FillRectangles {
                    fill: Style::LinearGradient {
                        point_0: Point::new(0.0, 0.0),
                        point_1: Point::new(4.0, 0.0),
                        color_0: 0,
                        color_1: 1,
                    },
                    rectangles: vec![Rect::new(4.0, 2.0, -4.0, -2.0)],
                },
            ],
        );
        let text = svg(&s);
        assert!(text.contains(" stroke-opacity=\"0.502\""));
        assert!(text.contains("<stop offset=\"0\" stop-color=\"#000000\" stop-opacity=\"0.502\"/>"));
        assert!(text.contains("<stop offset=\"1\" stop-color=\"#ffffff\"/>"));
        assert!(text.contains("<rect x=\"0\" y=\"0\" width=\"4\" height=\"2\""));
    }

    #[test]
    fn test_gradient_defined_once() {
        let style = Style::LinearGradient {
            point_0: Point::new(0.0, 0.0),
            point_1: Point::new(10.0, 0.0),
            color_0: 0,
            color_1: 1,
        };
        let s = scene(
            vec![Color::BLACK, Color::WHITE],
            vec![
                Command::FillRectangles {
                    fill: style,
                    rectangles: vec![Rect::new(0.0, 0.0, 1.0, 1.0)],
                },
                Command::FillRectangles {
                    fill: style,
                    rectangles: vec![Rect::new(2.0, 0.0, 1.0, 1.0)],
                },
            ],
        );
        let text = svg(&s);
        assert_eq!(text.matches("<linearGradient").count(), 1);
        assert_eq!(text.matches("url(#g0)").count(), 2);
        assert!(text.contains("gradientUnits=\"userSpaceOnUse\""));
        // The definition precedes its first use.
        assert!(text.find("<defs>").unwrap() < text.find("<rect").unwrap());
    }

    #[test]
    fn test_radial_gradient_radius() {
        let s = scene(
            vec![Color::BLACK, Color::WHITE],
            vec![Command::FillRectangles {
                fill: Style::RadialGradient {
                    center: Point::new(1.0, 1.0),
                    edge: Point::new(4.0, 5.0),
                    color_0: 0,
                    color_1: 1,
                },
                rectangles: vec![Rect::new(0.0, 0.0, 1.0, 1.0)],
            }],
        );
        assert!(svg(&s).contains("cx=\"1\" cy=\"1\" r=\"5\""));
    }

    #[test]
    fn test_lines_zero_width() {
        let s = scene(
            vec![Color::BLACK],
            vec![Command::DrawLines {
                line: Style::FlatColor { color: 0 },
                line_width: 0.0,
                lines: vec![Line::new(Point::new(0.0, 0.0), Point::new(5.0, 5.0))],
            }],
        );
        let text = svg(&s);
        assert!(text.contains("<line x1=\"0\" y1=\"0\" x2=\"5\" y2=\"5\" fill=\"none\""));
        assert!(text.contains("stroke-width=\"0.001\""));
        assert!(text.contains("stroke-linecap=\"round\""));
    }

    #[test]
    fn test_path_data_inverts_sweep() {
        let path = Path::new(vec![SubPath {
            start: Point::new(1.0, 1.0),
            instructions: vec![
                PathInstruction::new(Segment::ArcCircle {
                    large_arc: true,
                    sweep: true,
                    radius: 2.0,
                    to: Point::new(5.0, 1.0),
                }),
                PathInstruction::new(Segment::QuadraticBezier {
                    control: Point::new(6.0, 2.0),
                    to: Point::new(7.0, 1.0),
                }),
                PathInstruction::new(Segment::ClosePath),
            ],
        }]);
        let s = scene(
            vec![Color::BLACK],
            vec![Command::FillPath {
                fill: Style::FlatColor { color: 0 },
                path,
            }],
        );
        assert!(svg(&s).contains("d=\"M1 1 A2 2 0 1 0 5 1 Q6 2 7 1 Z\""));
    }

    #[test]
    fn test_strip_and_loop_elements() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let s = scene(
            vec![Color::BLACK],
            vec![
                Command::DrawLineStrip {
                    line: Style::FlatColor { color: 0 },
                    line_width: 1.0,
                    points: points.clone(),
                },
                Command::DrawLineLoop {
                    line: Style::FlatColor { color: 0 },
                    line_width: 1.0,
                    points,
                },
            ],
        );
        let text = svg(&s);
        assert!(text.contains("<polyline fill=\"none\""));
        assert!(text.contains("<polygon fill=\"none\""));
    }
}
