pub mod color;
pub mod error;
pub mod geometry;
pub mod header;
pub mod parser;
pub mod scene;
pub mod stream;
pub mod writer;

pub use color::Color;
pub use error::{ErrorCode, TvgError, TvgResult};
pub use geometry::{Line, Point, Rect};
pub use header::{ColorEncoding, CoordinateRange, Header, probe_header};
pub use parser::{ParseOptions, parse, parse_with_options};
pub use scene::{Command, Path, PathInstruction, Scene, Segment, Style, StyleKind, SubPath};
pub use stream::Stream;
pub use writer::encode;
