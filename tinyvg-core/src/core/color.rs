//! Colors of the TinyVG color table.
//!
//! Colors are kept as straight (non-premultiplied) sRGB components in
//! `[0, 1]`, whatever encoding the file used.

/// A straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Create a color from u8 values (0-255).
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Decode a packed RGB565 value: red in bits 0..4, green in 5..10,
    /// blue in 11..15. Always opaque.
    pub fn from_rgb565(packed: u16) -> Self {
        let r = packed & 0x1F;
        let g = (packed >> 5) & 0x3F;
        let b = (packed >> 11) & 0x1F;
        Color::new(
            f32::from(r) / 31.0,
            f32::from(g) / 63.0,
            f32::from(b) / 31.0,
            1.0,
        )
    }

    /// Pack into RGB565, dropping alpha.
    pub fn to_rgb565(&self) -> u16 {
        let r = quantize(self.r, 31);
        let g = quantize(self.g, 63);
        let b = quantize(self.b, 31);
        r | (g << 5) | (b << 11)
    }

    /// Get RGBA components as u8 values, rounding to nearest.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            quantize(self.r, 255) as u8,
            quantize(self.g, 255) as u8,
            quantize(self.b, 255) as u8,
            quantize(self.a, 255) as u8,
        ]
    }

    /// Linear interpolation in straight RGBA; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Premultiplied components, each channel clamped to `[0, 1]` first.
    pub fn premultiplied(&self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            self.r.clamp(0.0, 1.0) * a,
            self.g.clamp(0.0, 1.0) * a,
            self.b.clamp(0.0, 1.0) * a,
            a,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

fn quantize(value: f32, max: u16) -> u16 {
    (value.clamp(0.0, 1.0) * f32::from(max)).round() as u16
}
