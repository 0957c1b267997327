//! Decoded TinyVG document.
//!
//! A [`Scene`] is the output of the parser and the shared, read-only input of
//! every renderer. Commands are kept in file order and are painted in that
//! order.

use super::color::Color;
use super::error::{TvgError, TvgResult};
use super::geometry::{Line, Point, Rect};
use super::header::Header;

/// Command tags as stored in bits 0..5 of a command byte.
pub(crate) mod tag {
    pub const END_OF_DOCUMENT: u8 = 0;
    pub const FILL_POLYGON: u8 = 1;
    pub const FILL_RECTANGLES: u8 = 2;
    pub const FILL_PATH: u8 = 3;
    pub const DRAW_LINES: u8 = 4;
    pub const DRAW_LINE_LOOP: u8 = 5;
    pub const DRAW_LINE_STRIP: u8 = 6;
    pub const DRAW_LINE_PATH: u8 = 7;
    pub const OUTLINE_FILL_POLYGON: u8 = 8;
    pub const OUTLINE_FILL_RECTANGLES: u8 = 9;
    pub const OUTLINE_FILL_PATH: u8 = 10;
}

/// Path instruction tags as stored in bits 0..2 of an instruction byte.
pub(crate) mod segment_tag {
    pub const LINE: u8 = 0;
    pub const HORIZONTAL_LINE: u8 = 1;
    pub const VERTICAL_LINE: u8 = 2;
    pub const CUBIC_BEZIER: u8 = 3;
    pub const ARC_CIRCLE: u8 = 4;
    pub const ARC_ELLIPSE: u8 = 5;
    pub const CLOSE_PATH: u8 = 6;
    pub const QUADRATIC_BEZIER: u8 = 7;
}

/// Style kind as stored in the top two bits of a command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Flat = 0,
    Linear = 1,
    Radial = 2,
}

impl StyleKind {
    pub(crate) fn from_bits(bits: u8) -> TvgResult<Self> {
        match bits & 0x03 {
            0 => Ok(StyleKind::Flat),
            1 => Ok(StyleKind::Linear),
            2 => Ok(StyleKind::Radial),
            other => Err(TvgError::unsupported(format!("style kind {}", other))),
        }
    }
}

/// Fill or stroke paint. Colors are indices into the scene's color table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Style {
    FlatColor {
        color: u32,
    },
    LinearGradient {
        point_0: Point,
        point_1: Point,
        color_0: u32,
        color_1: u32,
    },
    /// The radius is the distance from `center` to `edge`.
    RadialGradient {
        center: Point,
        edge: Point,
        color_0: u32,
        color_1: u32,
    },
}

impl Style {
    pub fn kind(&self) -> StyleKind {
        match self {
            Style::FlatColor { .. } => StyleKind::Flat,
            Style::LinearGradient { .. } => StyleKind::Linear,
            Style::RadialGradient { .. } => StyleKind::Radial,
        }
    }

    /// Color table indices referenced by this style.
    pub fn color_indices(&self) -> impl Iterator<Item = u32> {
        let (first, second) = match *self {
            Style::FlatColor { color } => (color, None),
            Style::LinearGradient {
                color_0, color_1, ..
            }
            | Style::RadialGradient {
                color_0, color_1, ..
            } => (color_0, Some(color_1)),
        };
        std::iter::once(first).chain(second)
    }

    /// Radius of a radial gradient, `None` for other styles.
    pub fn radius(&self) -> Option<f32> {
        match self {
            Style::RadialGradient { center, edge, .. } => Some(center.distance(*edge)),
            _ => None,
        }
    }
}

/// One drawing step of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        to: Point,
    },
    HorizontalLine {
        x: f32,
    },
    VerticalLine {
        y: f32,
    },
    CubicBezier {
        control_0: Point,
        control_1: Point,
        to: Point,
    },
    ArcCircle {
        large_arc: bool,
        sweep: bool,
        radius: f32,
        to: Point,
    },
    /// `rotation` is in degrees.
    ArcEllipse {
        large_arc: bool,
        sweep: bool,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        to: Point,
    },
    ClosePath,
    QuadraticBezier {
        control: Point,
        to: Point,
    },
}

impl Segment {
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Segment::Line { .. } => segment_tag::LINE,
            Segment::HorizontalLine { .. } => segment_tag::HORIZONTAL_LINE,
            Segment::VerticalLine { .. } => segment_tag::VERTICAL_LINE,
            Segment::CubicBezier { .. } => segment_tag::CUBIC_BEZIER,
            Segment::ArcCircle { .. } => segment_tag::ARC_CIRCLE,
            Segment::ArcEllipse { .. } => segment_tag::ARC_ELLIPSE,
            Segment::ClosePath => segment_tag::CLOSE_PATH,
            Segment::QuadraticBezier { .. } => segment_tag::QUADRATIC_BEZIER,
        }
    }

    /// Where the current point is after this segment.
    pub fn end_point(&self, current: Point, subpath_start: Point) -> Point {
        match *self {
            Segment::Line { to }
            | Segment::CubicBezier { to, .. }
            | Segment::ArcCircle { to, .. }
            | Segment::ArcEllipse { to, .. }
            | Segment::QuadraticBezier { to, .. } => to,
            Segment::HorizontalLine { x } => Point::new(x, current.y),
            Segment::VerticalLine { y } => Point::new(current.x, y),
            Segment::ClosePath => subpath_start,
        }
    }
}

/// A segment plus an optional line width change that takes effect from
/// this segment on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathInstruction {
    pub line_width: Option<f32>,
    pub segment: Segment,
}

impl PathInstruction {
    pub const fn new(segment: Segment) -> Self {
        PathInstruction {
            line_width: None,
            segment,
        }
    }

    pub const fn with_line_width(segment: Segment, line_width: f32) -> Self {
        PathInstruction {
            line_width: Some(line_width),
            segment,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    pub start: Point,
    pub instructions: Vec<PathInstruction>,
}

/// A path made of one or more sub-paths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub subpaths: Vec<SubPath>,
}

impl Path {
    pub fn new(subpaths: Vec<SubPath>) -> Self {
        Path { subpaths }
    }

    pub fn instruction_count(&self) -> usize {
        self.subpaths.iter().map(|s| s.instructions.len()).sum()
    }
}

/// A single drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FillPolygon {
        fill: Style,
        points: Vec<Point>,
    },
    FillRectangles {
        fill: Style,
        rectangles: Vec<Rect>,
    },
    FillPath {
        fill: Style,
        path: Path,
    },
    DrawLines {
        line: Style,
        line_width: f32,
        lines: Vec<Line>,
    },
    DrawLineLoop {
        line: Style,
        line_width: f32,
        points: Vec<Point>,
    },
    DrawLineStrip {
        line: Style,
        line_width: f32,
        points: Vec<Point>,
    },
    DrawLinePath {
        line: Style,
        line_width: f32,
        path: Path,
    },
    OutlineFillPolygon {
        fill: Style,
        line: Style,
        line_width: f32,
        points: Vec<Point>,
    },
    OutlineFillRectangles {
        fill: Style,
        line: Style,
        line_width: f32,
        rectangles: Vec<Rect>,
    },
    OutlineFillPath {
        fill: Style,
        line: Style,
        line_width: f32,
        path: Path,
    },
}

impl Command {
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Command::FillPolygon { .. } => tag::FILL_POLYGON,
            Command::FillRectangles { .. } => tag::FILL_RECTANGLES,
            Command::FillPath { .. } => tag::FILL_PATH,
            Command::DrawLines { .. } => tag::DRAW_LINES,
            Command::DrawLineLoop { .. } => tag::DRAW_LINE_LOOP,
            Command::DrawLineStrip { .. } => tag::DRAW_LINE_STRIP,
            Command::DrawLinePath { .. } => tag::DRAW_LINE_PATH,
            Command::OutlineFillPolygon { .. } => tag::OUTLINE_FILL_POLYGON,
            Command::OutlineFillRectangles { .. } => tag::OUTLINE_FILL_RECTANGLES,
            Command::OutlineFillPath { .. } => tag::OUTLINE_FILL_PATH,
        }
    }

    /// Snake-case command name, as used by the text representation.
    pub fn name(&self) -> &'static str {
        match self {
            Command::FillPolygon { .. } => "fill_polygon",
            Command::FillRectangles { .. } => "fill_rectangles",
            Command::FillPath { .. } => "fill_path",
            Command::DrawLines { .. } => "draw_lines",
            Command::DrawLineLoop { .. } => "draw_line_loop",
            Command::DrawLineStrip { .. } => "draw_line_strip",
            Command::DrawLinePath { .. } => "draw_line_path",
            Command::OutlineFillPolygon { .. } => "outline_fill_polygon",
            Command::OutlineFillRectangles { .. } => "outline_fill_rectangles",
            Command::OutlineFillPath { .. } => "outline_fill_path",
        }
    }

    pub fn fill_style(&self) -> Option<&Style> {
        match self {
            Command::FillPolygon { fill, .. }
            | Command::FillRectangles { fill, .. }
            | Command::FillPath { fill, .. }
            | Command::OutlineFillPolygon { fill, .. }
            | Command::OutlineFillRectangles { fill, .. }
            | Command::OutlineFillPath { fill, .. } => Some(fill),
            _ => None,
        }
    }

    pub fn line_style(&self) -> Option<&Style> {
        match self {
            Command::DrawLines { line, .. }
            | Command::DrawLineLoop { line, .. }
            | Command::DrawLineStrip { line, .. }
            | Command::DrawLinePath { line, .. }
            | Command::OutlineFillPolygon { line, .. }
            | Command::OutlineFillRectangles { line, .. }
            | Command::OutlineFillPath { line, .. } => Some(line),
            _ => None,
        }
    }

    /// Stroke width for commands that draw outlines.
    pub fn line_width(&self) -> Option<f32> {
        match *self {
            Command::DrawLines { line_width, .. }
            | Command::DrawLineLoop { line_width, .. }
            | Command::DrawLineStrip { line_width, .. }
            | Command::DrawLinePath { line_width, .. }
            | Command::OutlineFillPolygon { line_width, .. }
            | Command::OutlineFillRectangles { line_width, .. }
            | Command::OutlineFillPath { line_width, .. } => Some(line_width),
            _ => None,
        }
    }
}

/// A fully decoded TinyVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub header: Header,
    pub colors: Vec<Color>,
    pub commands: Vec<Command>,
}

impl Scene {
    pub fn new(header: Header, colors: Vec<Color>, commands: Vec<Command>) -> Self {
        Scene {
            header,
            colors,
            commands,
        }
    }

    /// Canvas width in canvas units.
    pub fn width(&self) -> u32 {
        self.header.width
    }

    /// Canvas height in canvas units.
    pub fn height(&self) -> u32 {
        self.header.height
    }

    /// Looks up a color table entry.
    pub fn color(&self, index: u32) -> TvgResult<Color> {
        self.colors.get(index as usize).copied().ok_or_else(|| {
            TvgError::invalid(format!(
                "color index {} out of range (table has {} colors)",
                index,
                self.colors.len()
            ))
        })
    }

    /// Checks that every style references an existing color.
    pub fn validate(&self) -> TvgResult<()> {
        for command in &self.commands {
            for style in command.fill_style().into_iter().chain(command.line_style()) {
                for index in style.color_indices() {
                    self.color(index)?;
                }
            }
        }
        Ok(())
    }
}
