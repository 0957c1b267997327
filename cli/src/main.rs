//! `tvg-render`: converts TinyVG files to SVG, TGA and the text form.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tinyvg_core::{
    AntiAlias, Bitmap, RasterOptions, Scene, TvgResult, WriteSink, parse, render_bitmap_with_options,
    render_svg, render_tvgt,
};

mod tga;

#[derive(Debug, Parser)]
#[command(name = "tvg-render", version, about = "Render TinyVG files")]
struct Args {
    /// Input TinyVG file
    input: PathBuf,

    /// Write an SVG document
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,

    /// Write a rasterized TGA image
    #[arg(long, value_name = "FILE")]
    tga: Option<PathBuf>,

    /// Write the text representation
    #[arg(long, value_name = "FILE")]
    tvgt: Option<PathBuf>,

    /// Supersampling level for --tga
    #[arg(long, value_enum, default_value_t = Quality::X9)]
    anti_alias: Quality,

    /// Output width in pixels (0 derives it from the height or canvas)
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Output height in pixels (0 derives it from the width or canvas)
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Print header and command summary
    #[arg(long)]
    info: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Quality {
    None,
    X4,
    X9,
    X16,
    X25,
    X49,
    X64,
}

impl From<Quality> for AntiAlias {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::None => AntiAlias::None,
            Quality::X4 => AntiAlias::X4,
            Quality::X9 => AntiAlias::X9,
            Quality::X16 => AntiAlias::X16,
            Quality::X25 => AntiAlias::X25,
            Quality::X49 => AntiAlias::X49,
            Quality::X64 => AntiAlias::X64,
        }
    }
}

/// A simple stderr logger.
static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("Error: {}", err);
        process::exit(err.code() as i32);
    }
}

fn run(args: &Args) -> TvgResult<()> {
    let bytes = fs::read(&args.input)?;
    let scene = parse(&bytes)?;
    log::debug!("{}: {} bytes", args.input.display(), bytes.len());

    if args.info {
        print!("{}", describe(&scene));
    }
    if let Some(path) = &args.svg {
        write_text(path, |sink| render_svg(&scene, sink))?;
    }
    if let Some(path) = &args.tvgt {
        write_text(path, |sink| render_tvgt(&scene, sink))?;
    }
    if let Some(path) = &args.tga {
        let options = RasterOptions::default()
            .anti_alias(args.anti_alias.into())
            .size(args.width, args.height);
        let bitmap = render_bitmap_with_options(&scene, &options)?;
        write_image(File::create(path)?, &bitmap)?;
        log::debug!(
            "wrote {}x{} image to {}",
            bitmap.width,
            bitmap.height,
            path.display()
        );
    }
    Ok(())
}

fn write_text<F>(path: &Path, render: F) -> TvgResult<()>
where
    F: FnOnce(&mut WriteSink<BufWriter<File>>) -> TvgResult<()>,
{
    let mut sink = WriteSink::new(BufWriter::new(File::create(path)?));
    render(&mut sink)?;
    sink.into_inner()
        .into_inner()
        .map_err(|e| e.into_error())?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

/// Writes `bitmap` as TGA, surfacing errors from the final flush.
fn write_image<W: Write>(out: W, bitmap: &Bitmap) -> TvgResult<()> {
    let mut out = BufWriter::new(out);
    tga::write_tga(&mut out, bitmap)?;
    out.into_inner().map_err(|e| e.into_error())?;
    Ok(())
}

/// Human-readable summary for `--info`.
fn describe(scene: &Scene) -> String {
    let header = &scene.header;
    let mut text = format!(
        "canvas: {}x{}\nscale: 1/{}\ncolor encoding: {}\ncoordinate range: {}\ncolors: {}\ncommands: {}\n",
        header.width,
        header.height,
        2f64.powi(i32::from(header.scale)),
        header.color_encoding.name(),
        header.coordinate_range.name(),
        scene.colors.len(),
        scene.commands.len()
    );
    for command in &scene.commands {
        text.push_str("  ");
        text.push_str(command.name());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const SQUARE: [u8; 18] = [
        0x72, 0x56, 0x01, 0x40, 8, 8, 1, 255, 0, 0, 255, 0x02, 0x00, 0x00, 0, 0, 8, 8,
    ];

    fn square() -> Vec<u8> {
        let mut bytes = SQUARE.to_vec();
        bytes.push(0x00);
        bytes
    }

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "tvg-render",
            "in.tvg",
            "--tga",
            "out.tga",
            "--anti-alias",
            "x25",
            "--width",
            "64",
            "-vv",
        ]);
        assert_eq!(args.input, PathBuf::from("in.tvg"));
        assert_eq!(AntiAlias::from(args.anti_alias), AntiAlias::X25);
        assert_eq!(args.width, 64);
        assert_eq!(args.height, 0);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("square.tvg");
        fs::write(&input, square()).unwrap();

        let out = |name: &str| dir.path().join(name).to_string_lossy().into_owned();

        let args = Args::parse_from([
            "tvg-render".to_string(),
            input.to_string_lossy().into_owned(),
            "--svg".to_string(),
            out("out.svg"),
            "--tvgt".to_string(),
            out("out.tvgt"),
            "--tga".to_string(),
            out("out.tga"),
        ]);
        run(&args).unwrap();

        let svg = fs::read_to_string(dir.path().join("out.svg")).unwrap();
        assert!(svg.contains("viewBox=\"0 0 8 8\""));
        let tvgt = fs::read_to_string(dir.path().join("out.tvgt")).unwrap();
        assert!(tvgt.starts_with("(tvg 1"));
        let tga = fs::read(dir.path().join("out.tga")).unwrap();
        assert_eq!(tga.len(), 24 + 4 * 8 * 8);
        assert_eq!(&tga[24..28], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_run_reports_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("truncated.tvg");
        fs::write(&input, &SQUARE[..10]).unwrap();
        let args = Args::parse_from(["tvg-render".to_string(), input.to_string_lossy().into_owned()]);
        let err = run(&args).unwrap_err();
        assert_eq!(err.code() as i32, 3);
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_image_reports_flush_errors() {
        let scene = parse(&square()).unwrap();
        let bitmap = render_bitmap_with_options(&scene, &RasterOptions::default()).unwrap();
        let err = write_image(FullDisk, &bitmap).unwrap_err();
        assert_eq!(err.code() as i32, 2);

        let mut file = tempfile::tempfile().unwrap();
        write_image(&mut file, &bitmap).unwrap();
        assert_eq!(file.metadata().unwrap().len(), 24 + 4 * 8 * 8);
    }

    #[test]
    fn test_describe() {
        let scene = parse(&square()).unwrap();
        let text = describe(&scene);
        assert!(text.starts_with("canvas: 8x8\nscale: 1/1\n"));
        assert!(text.ends_with("  fill_rectangles\n"));
    }
}
