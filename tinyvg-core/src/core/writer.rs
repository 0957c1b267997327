//! Binary TinyVG encoder.
//!
//! Serializes a [`Scene`] in canonical form: minimal VarUInts and every
//! coordinate quantized as `round(value * 2^scale)`. Files produced here
//! decode and re-encode to the same bytes.

use super::color::Color;
use super::error::{TvgError, TvgResult};
use super::geometry::{Line, Point, Rect};
use super::header::{ColorEncoding, MAGIC, VERSION};
use super::scene::{Command, Path, PathInstruction, Scene, Segment, Style, tag};

/// Largest item count an outline-fill command can hold.
const MAX_OUTLINE_FILL_ITEMS: usize = 64;

/// Encodes `scene` into a new buffer.
pub fn encode(scene: &Scene) -> TvgResult<Vec<u8>> {
    scene.validate()?;
    let mut writer = TvgWriter {
        scene,
        buffer: Vec::new(),
    };
    writer.write_header()?;
    writer.write_color_table()?;
    for command in &scene.commands {
        writer.write_command(command)?;
    }
    writer.buffer.push(tag::END_OF_DOCUMENT);
    log::debug!(
        "encoded {} command(s) into {} bytes",
        scene.commands.len(),
        writer.buffer.len()
    );
    Ok(writer.buffer)
}

struct TvgWriter<'a> {
    scene: &'a Scene,
    buffer: Vec<u8>,
}

impl TvgWriter<'_> {
    fn write_header(&mut self) -> TvgResult<()> {
        let header = &self.scene.header;
        if header.scale > 15 {
            return Err(TvgError::invalid(format!("scale {} exceeds 15", header.scale)));
        }
        if header.color_encoding == ColorEncoding::Custom {
            return Err(TvgError::unsupported("custom color encoding"));
        }
        self.buffer.extend_from_slice(&MAGIC);
        self.buffer.push(VERSION);
        self.buffer.push(header.flags());
        self.write_size(header.width)?;
        self.write_size(header.height)
    }

    fn write_size(&mut self, value: u32) -> TvgResult<()> {
        let range = self.scene.header.coordinate_range;
        if value > range.max_size() {
            return Err(TvgError::invalid(format!(
                "size {} does not fit the {} coordinate range",
                value,
                range.name()
            )));
        }
        match range.unit_size() {
            1 => self.buffer.push(value as u8),
            2 => self.buffer.extend_from_slice(&(value as u16).to_le_bytes()),
            _ => self.buffer.extend_from_slice(&value.to_le_bytes()),
        }
        Ok(())
    }

    fn write_var_uint(&mut self, mut value: u32) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return;
            }
            self.buffer.push(byte | 0x80);
        }
    }

    /// Writes `count - 1` for a non-empty item list.
    fn write_count(&mut self, count: usize, what: &str) -> TvgResult<()> {
        if count == 0 {
            return Err(TvgError::invalid(format!("{} list is empty", what)));
        }
        let stored = u32::try_from(count - 1)
            .map_err(|_| TvgError::invalid(format!("too many {} items", what)))?;
        self.write_var_uint(stored);
        Ok(())
    }

    fn write_unit(&mut self, value: f32) -> TvgResult<()> {
        let header = &self.scene.header;
        let range = header.coordinate_range;
        let raw = (f64::from(value) * 2f64.powi(i32::from(header.scale))).round();
        let (min, max) = range.unit_bounds();
        if !raw.is_finite() || raw < min as f64 || raw > max as f64 {
            return Err(TvgError::invalid(format!(
                "value {} does not fit the {} coordinate range",
                value,
                range.name()
            )));
        }
        let raw = raw as i64;
        match range.unit_size() {
            1 => self.buffer.push(raw as i8 as u8),
            2 => self.buffer.extend_from_slice(&(raw as i16).to_le_bytes()),
            _ => self.buffer.extend_from_slice(&(raw as i32).to_le_bytes()),
        }
        Ok(())
    }

    fn write_point(&mut self, point: Point) -> TvgResult<()> {
        self.write_unit(point.x)?;
        self.write_unit(point.y)
    }

    fn write_color_table(&mut self) -> TvgResult<()> {
        let colors = &self.scene.colors;
        let count = u32::try_from(colors.len())
            .map_err(|_| TvgError::invalid("color table too large"))?;
        self.write_var_uint(count);
        for color in colors {
            self.write_color(color);
        }
        Ok(())
    }

    fn write_color(&mut self, color: &Color) {
        match self.scene.header.color_encoding {
            ColorEncoding::Rgba8888 => self.buffer.extend_from_slice(&color.to_rgba8()),
            ColorEncoding::Rgb565 => self
                .buffer
                .extend_from_slice(&color.to_rgb565().to_le_bytes()),
            ColorEncoding::RgbaF32 | ColorEncoding::Custom => {
                for channel in [color.r, color.g, color.b, color.a] {
                    self.buffer.extend_from_slice(&channel.to_le_bytes());
                }
            }
        }
    }

    fn write_style(&mut self, style: &Style) -> TvgResult<()> {
        match *style {
            Style::FlatColor { color } => self.write_var_uint(color),
            Style::LinearGradient {
                point_0: first,
                point_1: second,
                color_0,
                color_1,
            }
            | Style::RadialGradient {
                center: first,
                edge: second,
                color_0,
                color_1,
            } => {
                self.write_point(first)?;
                self.write_point(second)?;
                self.write_var_uint(color_0);
                self.write_var_uint(color_1);
            }
        }
        Ok(())
    }

    fn write_command_byte(&mut self, command: &Command, primary: &Style) {
        self.buffer
            .push(command.tag() | ((primary.kind() as u8) << 6));
    }

    fn write_command(&mut self, command: &Command) -> TvgResult<()> {
        match command {
            Command::FillPolygon { fill, points } => {
                self.write_command_byte(command, fill);
                self.write_count(points.len(), "polygon")?;
                self.write_style(fill)?;
                self.write_points(points)
            }
            Command::FillRectangles { fill, rectangles } => {
                self.write_command_byte(command, fill);
                self.write_count(rectangles.len(), "rectangle")?;
                self.write_style(fill)?;
                self.write_rects(rectangles)
            }
            Command::FillPath { fill, path } => {
                self.write_command_byte(command, fill);
                self.write_count(path.subpaths.len(), "path")?;
                self.write_style(fill)?;
                self.write_path(path)
            }
            Command::DrawLines {
                line,
                line_width,
                lines,
            } => {
                self.write_command_byte(command, line);
                self.write_count(lines.len(), "line")?;
                self.write_style(line)?;
                self.write_unit(*line_width)?;
                self.write_lines(lines)
            }
            Command::DrawLineLoop {
                line,
                line_width,
                points,
            }
            | Command::DrawLineStrip {
                line,
                line_width,
                points,
            } => {
                self.write_command_byte(command, line);
                self.write_count(points.len(), "line strip")?;
                self.write_style(line)?;
                self.write_unit(*line_width)?;
                self.write_points(points)
            }
            Command::DrawLinePath {
                line,
                line_width,
                path,
            } => {
                self.write_command_byte(command, line);
                self.write_count(path.subpaths.len(), "path")?;
                self.write_style(line)?;
                self.write_unit(*line_width)?;
                self.write_path(path)
            }
            Command::OutlineFillPolygon {
                fill,
                line,
                line_width,
                points,
            } => {
                self.write_outline_fill_prefix(command, fill, line, *line_width, points.len())?;
                self.write_points(points)
            }
            Command::OutlineFillRectangles {
                fill,
                line,
                line_width,
                rectangles,
            } => {
                self.write_outline_fill_prefix(
                    command,
                    fill,
                    line,
                    *line_width,
                    rectangles.len(),
                )?;
                self.write_rects(rectangles)
            }
            Command::OutlineFillPath {
                fill,
                line,
                line_width,
                path,
            } => {
                self.write_outline_fill_prefix(
                    command,
                    fill,
                    line,
                    *line_width,
                    path.subpaths.len(),
                )?;
                self.write_path(path)
            }
        }
    }

    fn write_outline_fill_prefix(
        &mut self,
        command: &Command,
        fill: &Style,
        line: &Style,
        line_width: f32,
        count: usize,
    ) -> TvgResult<()> {
        if count == 0 || count > MAX_OUTLINE_FILL_ITEMS {
            return Err(TvgError::invalid(format!(
                "{} needs 1 to {} items, got {}",
                command.name(),
                MAX_OUTLINE_FILL_ITEMS,
                count
            )));
        }
        self.write_command_byte(command, fill);
        self.buffer
            .push((count - 1) as u8 | ((line.kind() as u8) << 6));
        self.write_style(fill)?;
        self.write_style(line)?;
        self.write_unit(line_width)
    }

    fn write_points(&mut self, points: &[Point]) -> TvgResult<()> {
        for point in points {
            self.write_point(*point)?;
        }
        Ok(())
    }

    fn write_rects(&mut self, rectangles: &[Rect]) -> TvgResult<()> {
        for rect in rectangles {
            self.write_unit(rect.x)?;
            self.write_unit(rect.y)?;
            self.write_unit(rect.width)?;
            self.write_unit(rect.height)?;
        }
        Ok(())
    }

    fn write_lines(&mut self, lines: &[Line]) -> TvgResult<()> {
        for line in lines {
            self.write_point(line.start)?;
            self.write_point(line.end)?;
        }
        Ok(())
    }

    fn write_path(&mut self, path: &Path) -> TvgResult<()> {
        for subpath in &path.subpaths {
            self.write_count(subpath.instructions.len(), "sub-path")?;
        }
        for subpath in &path.subpaths {
            self.write_point(subpath.start)?;
            for instruction in &subpath.instructions {
                self.write_instruction(instruction)?;
            }
        }
        Ok(())
    }

    fn write_instruction(&mut self, instruction: &PathInstruction) -> TvgResult<()> {
        let segment = &instruction.segment;
        let width_flag = if instruction.line_width.is_some() { 0x10 } else { 0 };
        self.buffer.push(segment.tag() | width_flag);
        if let Some(width) = instruction.line_width {
            self.write_unit(width)?;
        }

        match *segment {
            Segment::Line { to } => self.write_point(to),
            Segment::HorizontalLine { x } => self.write_unit(x),
            Segment::VerticalLine { y } => self.write_unit(y),
            Segment::CubicBezier {
                control_0,
                control_1,
                to,
            } => {
                self.write_point(control_0)?;
                self.write_point(control_1)?;
                self.write_point(to)
            }
            Segment::ArcCircle {
                large_arc,
                sweep,
                radius,
                to,
            } => {
                self.buffer.push(arc_flags(large_arc, sweep));
                self.write_unit(radius)?;
                self.write_point(to)
            }
            Segment::ArcEllipse {
                large_arc,
                sweep,
                radius_x,
                radius_y,
                rotation,
                to,
            } => {
                self.buffer.push(arc_flags(large_arc, sweep));
                self.write_unit(radius_x)?;
                self.write_unit(radius_y)?;
                self.write_unit(rotation)?;
                self.write_point(to)
            }
            Segment::ClosePath => Ok(()),
            Segment::QuadraticBezier { control, to } => {
                self.write_point(control)?;
                self.write_point(to)
            }
        }
    }
}

fn arc_flags(large_arc: bool, sweep: bool) -> u8 {
    u8::from(large_arc) | (u8::from(sweep) << 1)
}
