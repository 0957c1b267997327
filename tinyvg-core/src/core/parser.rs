//! Binary TinyVG decoder.
//!
//! The parser walks the input once, front to back, and builds a [`Scene`].
//! Every length read from the file is checked against the bytes that are
//! still left before anything is allocated for it.

use super::color::Color;
use super::error::{TvgError, TvgResult};
use super::geometry::{Line, Point, Rect};
use super::header::{ColorEncoding, CoordinateRange, Header};
use super::scene::{
    Command, Path, PathInstruction, Scene, Segment, Style, StyleKind, SubPath, segment_tag, tag,
};
use super::stream::Stream;

/// Resource limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Largest color table accepted.
    pub max_colors: usize,
    /// Largest number of commands accepted, end marker excluded.
    pub max_commands: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_colors: 65_536,
            max_commands: 1 << 20,
        }
    }
}

/// Decodes a complete TinyVG document with default limits.
pub fn parse(bytes: &[u8]) -> TvgResult<Scene> {
    parse_with_options(bytes, &ParseOptions::default())
}

/// Decodes a complete TinyVG document.
pub fn parse_with_options(bytes: &[u8], options: &ParseOptions) -> TvgResult<Scene> {
    let mut stream = Stream::new(bytes);
    let header = Header::parse(&mut stream)?;
    log::debug!(
        "TinyVG header: {}x{} scale={} encoding={:?} range={:?}",
        header.width,
        header.height,
        header.scale,
        header.color_encoding,
        header.coordinate_range
    );

    let mut parser = Parser {
        stream,
        header,
        options: *options,
        color_count: 0,
    };
    let colors = parser.parse_color_table()?;
    parser.color_count = colors.len();
    let commands = parser.parse_commands()?;

    if !parser.stream.is_at_end() {
        log::debug!(
            "ignoring {} trailing byte(s) after end of document",
            parser.stream.remaining()
        );
    }

    Ok(Scene::new(header, colors, commands))
}

/// Decoder state for the body of a document.
struct Parser<'a> {
    stream: Stream<'a>,
    header: Header,
    options: ParseOptions,
    color_count: usize,
}

impl<'a> Parser<'a> {
    fn range(&self) -> CoordinateRange {
        self.header.coordinate_range
    }

    fn unit_size(&self) -> usize {
        self.range().unit_size()
    }

    /// Reads a `count - 1` VarUInt and returns the count.
    fn read_count(&mut self) -> TvgResult<usize> {
        let raw = self.stream.get_var_uint()?;
        (raw as usize)
            .checked_add(1)
            .ok_or_else(|| TvgError::invalid(format!("element count {} overflows", raw)))
    }

    fn read_unit(&mut self) -> TvgResult<f32> {
        let raw = self.range().read_unit(&mut self.stream)?;
        Ok(raw as f32 * self.header.unit_scale())
    }

    fn read_point(&mut self) -> TvgResult<Point> {
        let x = self.read_unit()?;
        let y = self.read_unit()?;
        Ok(Point::new(x, y))
    }

    fn read_rect(&mut self) -> TvgResult<Rect> {
        let x = self.read_unit()?;
        let y = self.read_unit()?;
        let width = self.read_unit()?;
        let height = self.read_unit()?;
        Ok(Rect::new(x, y, width, height))
    }

    fn read_color_index(&mut self) -> TvgResult<u32> {
        let index = self.stream.get_var_uint()?;
        if index as usize >= self.color_count {
            return Err(TvgError::invalid(format!(
                "color index {} out of range (table has {} colors)",
                index, self.color_count
            )));
        }
        Ok(index)
    }

    fn parse_color_table(&mut self) -> TvgResult<Vec<Color>> {
        let encoding = self.header.color_encoding;
        if encoding == ColorEncoding::Custom {
            return Err(TvgError::unsupported("custom color encoding"));
        }

        let count = self.stream.get_var_uint()? as usize;
        if count > self.options.max_colors {
            return Err(TvgError::invalid(format!(
                "color table has {} entries, limit is {}",
                count, self.options.max_colors
            )));
        }
        self.stream
            .ensure_available(count, encoding.color_size(), "color")?;

        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            let color = match encoding {
                ColorEncoding::Rgba8888 => {
                    let bytes = self.stream.get_bytes(4)?;
                    Color::from_rgba8(bytes[0], bytes[1], bytes[2], bytes[3])
                }
                ColorEncoding::Rgb565 => Color::from_rgb565(self.stream.get_u16_le()?),
                ColorEncoding::RgbaF32 => {
                    let r = self.stream.get_f32_le()?;
                    let g = self.stream.get_f32_le()?;
                    let b = self.stream.get_f32_le()?;
                    let a = self.stream.get_f32_le()?;
                    Color::new(r, g, b, a)
                }
                ColorEncoding::Custom => {
                    return Err(TvgError::unsupported("custom color encoding"));
                }
            };
            colors.push(color);
        }
        log::debug!("color table: {} colors", colors.len());
        Ok(colors)
    }

    fn parse_commands(&mut self) -> TvgResult<Vec<Command>> {
        let mut commands = Vec::new();
        loop {
            let offset = self.stream.pos();
            let byte = self.stream.get_byte().map_err(|_| {
                TvgError::invalid(format!(
                    "missing end of document marker at offset {}",
                    offset
                ))
            })?;
            let command_tag = byte & 0x3F;
            if command_tag == tag::END_OF_DOCUMENT {
                log::debug!("end of document after {} command(s)", commands.len());
                return Ok(commands);
            }
            if commands.len() >= self.options.max_commands {
                return Err(TvgError::invalid(format!(
                    "more than {} commands",
                    self.options.max_commands
                )));
            }
            let command = self.parse_command(command_tag, byte >> 6)?;
            log::trace!("command {} at offset {}", command.name(), offset);
            commands.push(command);
        }
    }

    fn parse_command(&mut self, command_tag: u8, style_bits: u8) -> TvgResult<Command> {
        if command_tag > tag::OUTLINE_FILL_PATH {
            return Err(TvgError::unsupported(format!(
                "command tag {}",
                command_tag
            )));
        }
        let primary = StyleKind::from_bits(style_bits)?;

        match command_tag {
            tag::FILL_POLYGON => {
                let count = self.read_count()?;
                let fill = self.parse_style(primary)?;
                let points = self.parse_points(count)?;
                Ok(Command::FillPolygon { fill, points })
            }
            tag::FILL_RECTANGLES => {
                let count = self.read_count()?;
                let fill = self.parse_style(primary)?;
                let rectangles = self.parse_rects(count)?;
                Ok(Command::FillRectangles { fill, rectangles })
            }
            tag::FILL_PATH => {
                let count = self.read_count()?;
                let fill = self.parse_style(primary)?;
                let path = self.parse_path(count)?;
                Ok(Command::FillPath { fill, path })
            }
            tag::DRAW_LINES => {
                let count = self.read_count()?;
                let line = self.parse_style(primary)?;
                let line_width = self.read_unit()?;
                let lines = self.parse_lines(count)?;
                Ok(Command::DrawLines {
                    line,
                    line_width,
                    lines,
                })
            }
            tag::DRAW_LINE_LOOP => {
                let count = self.read_count()?;
                let line = self.parse_style(primary)?;
                let line_width = self.read_unit()?;
                let points = self.parse_points(count)?;
                Ok(Command::DrawLineLoop {
                    line,
                    line_width,
                    points,
                })
            }
            tag::DRAW_LINE_STRIP => {
                let count = self.read_count()?;
                let line = self.parse_style(primary)?;
                let line_width = self.read_unit()?;
                let points = self.parse_points(count)?;
                Ok(Command::DrawLineStrip {
                    line,
                    line_width,
                    points,
                })
            }
            tag::DRAW_LINE_PATH => {
                let count = self.read_count()?;
                let line = self.parse_style(primary)?;
                let line_width = self.read_unit()?;
                let path = self.parse_path(count)?;
                Ok(Command::DrawLinePath {
                    line,
                    line_width,
                    path,
                })
            }
            _ => self.parse_outline_fill(command_tag, primary),
        }
    }

    /// Outline-fill commands pack the item count and the line style kind
    /// into one byte.
    fn parse_outline_fill(&mut self, command_tag: u8, fill_kind: StyleKind) -> TvgResult<Command> {
        let packed = self.stream.get_byte()?;
        let count = usize::from(packed & 0x3F) + 1;
        let line_kind = StyleKind::from_bits(packed >> 6)?;

        let fill = self.parse_style(fill_kind)?;
        let line = self.parse_style(line_kind)?;
        let line_width = self.read_unit()?;

        match command_tag {
            tag::OUTLINE_FILL_POLYGON => Ok(Command::OutlineFillPolygon {
                fill,
                line,
                line_width,
                points: self.parse_points(count)?,
            }),
            tag::OUTLINE_FILL_RECTANGLES => Ok(Command::OutlineFillRectangles {
                fill,
                line,
                line_width,
                rectangles: self.parse_rects(count)?,
            }),
            _ => Ok(Command::OutlineFillPath {
                fill,
                line,
                line_width,
                path: self.parse_path(count)?,
            }),
        }
    }

    fn parse_style(&mut self, kind: StyleKind) -> TvgResult<Style> {
        match kind {
            StyleKind::Flat => Ok(Style::FlatColor {
                color: self.read_color_index()?,
            }),
            StyleKind::Linear => {
                let point_0 = self.read_point()?;
                let point_1 = self.read_point()?;
                let color_0 = self.read_color_index()?;
                let color_1 = self.read_color_index()?;
                Ok(Style::LinearGradient {
                    point_0,
                    point_1,
                    color_0,
                    color_1,
                })
            }
            StyleKind::Radial => {
                let center = self.read_point()?;
                let edge = self.read_point()?;
                let color_0 = self.read_color_index()?;
                let color_1 = self.read_color_index()?;
                Ok(Style::RadialGradient {
                    center,
                    edge,
                    color_0,
                    color_1,
                })
            }
        }
    }

    fn parse_points(&mut self, count: usize) -> TvgResult<Vec<Point>> {
        self.stream
            .ensure_available(count, 2 * self.unit_size(), "point")?;
        (0..count).map(|_| self.read_point()).collect()
    }

    fn parse_rects(&mut self, count: usize) -> TvgResult<Vec<Rect>> {
        self.stream
            .ensure_available(count, 4 * self.unit_size(), "rectangle")?;
        (0..count).map(|_| self.read_rect()).collect()
    }

    fn parse_lines(&mut self, count: usize) -> TvgResult<Vec<Line>> {
        self.stream
            .ensure_available(count, 4 * self.unit_size(), "line")?;
        (0..count)
            .map(|_| {
                let start = self.read_point()?;
                let end = self.read_point()?;
                Ok(Line::new(start, end))
            })
            .collect()
    }

    /// Reads `subpath_count` instruction counts, then every sub-path.
    fn parse_path(&mut self, subpath_count: usize) -> TvgResult<Path> {
        // One VarUInt byte per count, then at least a start point and one
        // instruction byte per sub-path.
        self.stream.ensure_available(
            subpath_count,
            1 + 2 * self.unit_size() + 1,
            "sub-path",
        )?;

        let mut lengths = Vec::with_capacity(subpath_count);
        for _ in 0..subpath_count {
            lengths.push(self.read_count()?);
        }

        let mut subpaths = Vec::with_capacity(subpath_count);
        for length in lengths {
            let start = self.read_point()?;
            self.stream.ensure_available(length, 1, "path instruction")?;
            let mut instructions = Vec::with_capacity(length);
            for _ in 0..length {
                instructions.push(self.parse_instruction()?);
            }
            subpaths.push(SubPath {
                start,
                instructions,
            });
        }
        Ok(Path::new(subpaths))
    }

    fn parse_instruction(&mut self) -> TvgResult<PathInstruction> {
        let byte = self.stream.get_byte()?;
        let line_width = if byte & 0x10 != 0 {
            Some(self.read_unit()?)
        } else {
            None
        };

        let segment = match byte & 0x07 {
            segment_tag::LINE => Segment::Line {
                to: self.read_point()?,
            },
            segment_tag::HORIZONTAL_LINE => Segment::HorizontalLine {
                x: self.read_unit()?,
            },
            segment_tag::VERTICAL_LINE => Segment::VerticalLine {
                y: self.read_unit()?,
            },
            segment_tag::CUBIC_BEZIER => Segment::CubicBezier {
                control_0: self.read_point()?,
                control_1: self.read_point()?,
                to: self.read_point()?,
            },
            segment_tag::ARC_CIRCLE => {
                let flags = self.stream.get_byte()?;
                Segment::ArcCircle {
                    large_arc: flags & 0x01 != 0,
                    sweep: flags & 0x02 != 0,
                    radius: self.read_unit()?,
                    to: self.read_point()?,
                }
            }
            segment_tag::ARC_ELLIPSE => {
                let flags = self.stream.get_byte()?;
                Segment::ArcEllipse {
                    large_arc: flags & 0x01 != 0,
                    sweep: flags & 0x02 != 0,
                    radius_x: self.read_unit()?,
                    radius_y: self.read_unit()?,
                    rotation: self.read_unit()?,
                    to: self.read_point()?,
                }
            }
            segment_tag::CLOSE_PATH => Segment::ClosePath,
            _ => Segment::QuadraticBezier {
                control: self.read_point()?,
                to: self.read_point()?,
            },
        };

        Ok(PathInstruction {
            line_width,
            segment,
        })
    }
}
