//! Bitmap rendering entry points.

use super::context::RenderingContext;
use super::graphics_state::{GraphicsState, Transform};
use super::raster::Canvas;
use crate::core::error::{TvgError, TvgResult};
use crate::core::scene::Scene;

/// Supersampling level used by the rasterizer.
///
/// The raw codes are the stable interop values; they are not the sample
/// counts (`X25` is code 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AntiAlias {
    /// One sample per pixel.
    None,
    /// 2x2 samples.
    X4,
    /// 3x3 samples.
    #[default]
    X9,
    /// 4x4 samples.
    X16,
    /// 5x5 samples.
    X25,
    /// 7x7 samples.
    X49,
    /// 8x8 samples.
    X64,
}

impl AntiAlias {
    /// Every level, lowest quality first.
    pub const ALL: [AntiAlias; 7] = [
        AntiAlias::None,
        AntiAlias::X4,
        AntiAlias::X9,
        AntiAlias::X16,
        AntiAlias::X25,
        AntiAlias::X49,
        AntiAlias::X64,
    ];

    /// Samples per pixel along each axis.
    pub fn factor(&self) -> usize {
        match self {
            AntiAlias::None => 1,
            AntiAlias::X4 => 2,
            AntiAlias::X9 => 3,
            AntiAlias::X16 => 4,
            AntiAlias::X25 => 5,
            AntiAlias::X49 => 7,
            AntiAlias::X64 => 8,
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            AntiAlias::None => 1,
            AntiAlias::X4 => 2,
            AntiAlias::X9 => 3,
            AntiAlias::X16 => 4,
            AntiAlias::X25 => 6,
            AntiAlias::X49 => 7,
            AntiAlias::X64 => 8,
        }
    }

    /// Maps an interop code back to a level.
    pub fn from_raw(raw: u8) -> TvgResult<AntiAlias> {
        AntiAlias::ALL
            .into_iter()
            .find(|level| level.raw() == raw)
            .ok_or_else(|| TvgError::unsupported(format!("anti-alias code {}", raw)))
    }
}

/// Options for [`render_bitmap_with_options`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub anti_alias: AntiAlias,
    /// Output width in pixels; 0 derives it from the canvas.
    pub width: u32,
    /// Output height in pixels; 0 derives it from the canvas.
    pub height: u32,
    /// Maximum curve flattening error in sub-samples.
    pub tolerance: f32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        RasterOptions {
            anti_alias: AntiAlias::default(),
            width: 0,
            height: 0,
            tolerance: 0.25,
        }
    }
}

impl RasterOptions {
    pub fn anti_alias(mut self, anti_alias: AntiAlias) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// A rendered image: row-major straight-alpha RGBA8, `4 * width * height`
/// bytes, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(self.pixels.get(offset..offset + 4)?);
        Some(rgba)
    }
}

/// Releases a bitmap. Dropping it has the same effect.
pub fn free_bitmap(bitmap: Bitmap) {
    drop(bitmap);
}

/// Renders `scene` into a new bitmap.
///
/// With `width` and `height` both 0 the canvas size is used; with one of
/// them 0 it is derived from the other by the canvas aspect ratio.
pub fn render_bitmap(
    scene: &Scene,
    anti_alias: AntiAlias,
    width: u32,
    height: u32,
) -> TvgResult<Bitmap> {
    render_bitmap_with_options(
        scene,
        &RasterOptions::default()
            .anti_alias(anti_alias)
            .size(width, height),
    )
}

pub fn render_bitmap_with_options(scene: &Scene, options: &RasterOptions) -> TvgResult<Bitmap> {
    let (width, height) = output_size(scene, options.width, options.height)?;
    let factor = options.anti_alias.factor();
    let sample_width = (width as usize)
        .checked_mul(factor)
        .ok_or_else(|| TvgError::out_of_memory("sample width overflows"))?;
    let sample_height = (height as usize)
        .checked_mul(factor)
        .ok_or_else(|| TvgError::out_of_memory("sample height overflows"))?;

    let scene_width = scene.width() as f32;
    let scene_height = scene.height() as f32;
    let state = GraphicsState {
        transform: Transform::scale(
            sample_width as f32 / scene_width,
            sample_height as f32 / scene_height,
        ),
        tolerance: options.tolerance,
    };
    log::debug!(
        "rasterizing {}x{} canvas into {}x{} pixels ({}x{} samples)",
        scene.width(),
        scene.height(),
        width,
        height,
        sample_width,
        sample_height
    );

    let canvas = Canvas::new(sample_width, sample_height, (scene_width, scene_height), state)?;
    let mut context = RenderingContext::new(canvas);
    context.render_scene(scene)?;
    let pixels = context.into_device().downsample(factor)?;

    Ok(Bitmap {
        width,
        height,
        pixels,
    })
}

/// Output size for a requested `(width, height)`.
pub(crate) fn output_size(scene: &Scene, width: u32, height: u32) -> TvgResult<(u32, u32)> {
    let (canvas_width, canvas_height) = (scene.width(), scene.height());
    if canvas_width == 0 || canvas_height == 0 {
        return Err(TvgError::invalid(format!(
            "cannot rasterize a {}x{} canvas",
            canvas_width, canvas_height
        )));
    }

    let derive = |given: u32, num: u32, den: u32| -> u32 {
        let value = (f64::from(given) * f64::from(num) / f64::from(den)).round();
        value.clamp(1.0, f64::from(u32::MAX)) as u32
    };

    Ok(match (width, height) {
        (0, 0) => (canvas_width, canvas_height),
        (w, 0) => (w, derive(w, canvas_height, canvas_width)),
        (0, h) => (derive(h, canvas_width, canvas_height), h),
        (w, h) => (w, h),
    })
}
