//! Rendering layer.
//!
//! A scene is walked by [`RenderingContext`], which hands device paths to a
//! [`Device`]. The bitmap renderer drives the supersampling [`Canvas`];
//! the SVG and text renderers stream chunks into a [`Sink`].

pub mod bitmap;
pub mod context;
pub mod device;
pub mod graphics_state;
pub mod path;
pub mod raster;
pub mod sink;
pub mod svg;
pub mod tvgt;

pub use bitmap::{
    AntiAlias, Bitmap, RasterOptions, free_bitmap, render_bitmap, render_bitmap_with_options,
};
pub use context::{RenderingContext, convert_path, resolve_paint};
pub use device::{Device, Paint, RecordingDevice};
pub use graphics_state::{FillRule, GraphicsState, Transform};
pub use path::{Contour, Path, PathOp};
pub use raster::Canvas;
pub use sink::{Sink, WriteSink};
pub use svg::{SvgOptions, render_svg, render_svg_with_options};
pub use tvgt::render_tvgt;
