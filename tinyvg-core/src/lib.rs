//! # tinyvg-core: TinyVG decoding and rendering
//!
//! TinyVG is a compact binary vector graphics format. This crate decodes it
//! into an immutable [`Scene`] and renders scenes three ways:
//!
//! - **SVG**: a standalone SVG 1.1 document streamed into a [`Sink`]
//! - **Text**: the S-expression "tvgt" form, also streamed into a [`Sink`]
//! - **Bitmap**: straight-alpha RGBA8 pixels from a supersampling rasterizer
//!
//! ## Quick Start
//!
//! ```no_run
//! use tinyvg_core::{AntiAlias, parse, render_bitmap, render_svg};
//!
//! let bytes = std::fs::read("icon.tvg")?;
//! let scene = parse(&bytes)?;
//! println!("{}x{} canvas", scene.width(), scene.height());
//!
//! let mut svg = Vec::new();
//! render_svg(&scene, &mut svg)?;
//!
//! let bitmap = render_bitmap(&scene, AntiAlias::X16, 64, 0)?;
//! assert_eq!(bitmap.pixels.len(), 4 * 64 * bitmap.height as usize);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Layers
//!
//! 1. **Core**: byte stream, header, parser and the scene model
//! 2. **Rendering**: device abstraction, path flattening, rasterizer and
//!    the text emitters
//!
//! Every fallible operation returns [`TvgResult`]; [`TvgError::code`] maps an
//! error onto the stable numeric [`ErrorCode`].

pub mod core;
pub mod rendering;

pub use core::{
    Color, ColorEncoding, Command, CoordinateRange, ErrorCode, Header, Line, ParseOptions, Path,
    PathInstruction, Point, Rect, Scene, Segment, Stream, Style, StyleKind, SubPath, TvgError,
    TvgResult, encode, parse, parse_with_options, probe_header,
};

pub use rendering::{
    AntiAlias, Bitmap, RasterOptions, Sink, SvgOptions, WriteSink, free_bitmap, render_bitmap,
    render_bitmap_with_options, render_svg, render_svg_with_options, render_tvgt,
};
