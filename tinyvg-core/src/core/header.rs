//! TinyVG file header.
//!
//! ```text
//! magic   u8[2]  0x72 0x56
//! version u8     1
//! flags   u8     scale:4 | color_encoding:2 | coordinate_range:2
//! width   Size   (u8 / u16 / u32 depending on the coordinate range)
//! height  Size
//! ```

use super::error::{TvgError, TvgResult};
use super::stream::Stream;

/// File magic.
pub const MAGIC: [u8; 2] = [0x72, 0x56];

/// The only format version this crate understands.
pub const VERSION: u8 = 1;

/// How the color table is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorEncoding {
    /// Four bytes per color, one per channel.
    Rgba8888 = 0,
    /// One little-endian u16 per color, no alpha.
    Rgb565 = 1,
    /// Four little-endian f32 per color.
    RgbaF32 = 2,
    /// Application-defined; recognized but not decodable.
    Custom = 3,
}

impl ColorEncoding {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ColorEncoding::Rgba8888,
            1 => ColorEncoding::Rgb565,
            2 => ColorEncoding::RgbaF32,
            _ => ColorEncoding::Custom,
        }
    }

    /// Encoded size of one color in bytes.
    pub fn color_size(&self) -> usize {
        match self {
            ColorEncoding::Rgba8888 => 4,
            ColorEncoding::Rgb565 => 2,
            ColorEncoding::RgbaF32 => 16,
            ColorEncoding::Custom => 0,
        }
    }

    /// Name used by the text representation.
    pub fn name(&self) -> &'static str {
        match self {
            ColorEncoding::Rgba8888 => "u8888",
            ColorEncoding::Rgb565 => "u565",
            ColorEncoding::RgbaF32 => "f32",
            ColorEncoding::Custom => "custom",
        }
    }
}

/// Width of every coordinate and size value in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateRange {
    /// Each unit takes up 16 bit.
    Default = 0,
    /// Each unit takes up 8 bit.
    Reduced = 1,
    /// Each unit takes up 32 bit.
    Enhanced = 2,
}

impl CoordinateRange {
    fn from_bits(bits: u8) -> TvgResult<Self> {
        match bits & 0x03 {
            0 => Ok(CoordinateRange::Default),
            1 => Ok(CoordinateRange::Reduced),
            2 => Ok(CoordinateRange::Enhanced),
            other => Err(TvgError::unsupported(format!(
                "coordinate range {}",
                other
            ))),
        }
    }

    /// Encoded size of one unit in bytes.
    pub fn unit_size(&self) -> usize {
        match self {
            CoordinateRange::Default => 2,
            CoordinateRange::Reduced => 1,
            CoordinateRange::Enhanced => 4,
        }
    }

    /// Inclusive range of raw signed unit values.
    pub fn unit_bounds(&self) -> (i64, i64) {
        match self {
            CoordinateRange::Default => (i64::from(i16::MIN), i64::from(i16::MAX)),
            CoordinateRange::Reduced => (i64::from(i8::MIN), i64::from(i8::MAX)),
            CoordinateRange::Enhanced => (i64::from(i32::MIN), i64::from(i32::MAX)),
        }
    }

    /// Largest canvas size that can be stored.
    pub fn max_size(&self) -> u32 {
        match self {
            CoordinateRange::Default => u32::from(u16::MAX),
            CoordinateRange::Reduced => u32::from(u8::MAX),
            CoordinateRange::Enhanced => u32::MAX,
        }
    }

    /// Canvas size for a stored size value.
    pub fn canvas_size(&self, stored: u32) -> u32 {
        if stored == 0 { self.max_size() } else { stored }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CoordinateRange::Default => "default",
            CoordinateRange::Reduced => "reduced",
            CoordinateRange::Enhanced => "enhanced",
        }
    }

    /// Reads one raw signed unit.
    pub(crate) fn read_unit(&self, stream: &mut Stream<'_>) -> TvgResult<i32> {
        match self {
            CoordinateRange::Default => Ok(i32::from(stream.get_i16_le()?)),
            CoordinateRange::Reduced => Ok(i32::from(stream.get_i8()?)),
            CoordinateRange::Enhanced => stream.get_i32_le(),
        }
    }

    /// Reads one unsigned size value (canvas width or height).
    pub(crate) fn read_size(&self, stream: &mut Stream<'_>) -> TvgResult<u32> {
        match self {
            CoordinateRange::Default => Ok(u32::from(stream.get_u16_le()?)),
            CoordinateRange::Reduced => Ok(u32::from(stream.get_byte()?)),
            CoordinateRange::Enhanced => stream.get_u32_le(),
        }
    }
}

/// Decoded file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub version: u8,
    /// Coordinates are divided by `2^scale` to get canvas units.
    pub scale: u8,
    pub color_encoding: ColorEncoding,
    pub coordinate_range: CoordinateRange,
    pub width: u32,
    pub height: u32,
}

impl Header {
    /// Factor that turns raw fixed-point units into canvas units.
    pub fn unit_scale(&self) -> f32 {
        0.5f32.powi(i32::from(self.scale))
    }

    /// Packed flags byte as stored in the file.
    pub fn flags(&self) -> u8 {
        (self.scale & 0x0F)
            | ((self.color_encoding as u8) << 4)
            | ((self.coordinate_range as u8) << 6)
    }

    /// Decodes a header from the start of `stream`.
    pub fn parse(stream: &mut Stream<'_>) -> TvgResult<Header> {
        let magic = stream.get_bytes(2)?;
        if magic != MAGIC {
            return Err(TvgError::invalid(format!(
                "bad magic {:02X} {:02X}",
                magic[0], magic[1]
            )));
        }

        let version = stream.get_byte()?;
        if version != VERSION {
            return Err(TvgError::invalid(format!("unknown version {}", version)));
        }

        let flags = stream.get_byte()?;
        let scale = flags & 0x0F;
        let color_encoding = ColorEncoding::from_bits(flags >> 4);
        let coordinate_range = CoordinateRange::from_bits(flags >> 6)?;

        // A stored size of 0 stands for the largest size of the range.
        let width = coordinate_range.canvas_size(coordinate_range.read_size(stream)?);
        let height = coordinate_range.canvas_size(coordinate_range.read_size(stream)?);

        Ok(Header {
            version,
            scale,
            color_encoding,
            coordinate_range,
            width,
            height,
        })
    }
}

/// Decodes only the header of a TinyVG buffer.
///
/// Useful for learning the canvas size without decoding the whole document.
pub fn probe_header(bytes: &[u8]) -> TvgResult<Header> {
    Header::parse(&mut Stream::new(bytes))
}
