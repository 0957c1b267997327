//! TinyVG Rendering Example
//!
//! Renders a TinyVG file to an SVG document and reports how much of the
//! rasterized bitmap is covered.
//!
//! Usage:
//!     cargo run --example render -- input.tvg output.svg [size]
//!
//! Example:
//!     cargo run --example render -- shield.tvg shield.svg 64

use std::env;
use std::fs::File;
use std::io::BufWriter;

use tinyvg_core::{AntiAlias, WriteSink, parse, render_bitmap, render_svg};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <input.tvg> <output.svg> [size]", args[0]);
        eprintln!("Example: {} shield.tvg shield.svg 64", args[0]);
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  input.tvg   - Path to input TinyVG file");
        eprintln!("  output.svg  - Path to output SVG file");
        eprintln!("  size        - Bitmap width for the coverage report (default: canvas width)");
        std::process::exit(1);
    }

    let size: u32 = match args.get(3) {
        Some(arg) => arg.parse()?,
        None => 0,
    };

    let bytes = std::fs::read(&args[1])?;
    let scene = parse(&bytes)?;
    println!(
        "{}: {}x{} canvas, {} colors, {} commands",
        args[1],
        scene.width(),
        scene.height(),
        scene.colors.len(),
        scene.commands.len()
    );

    let mut sink = WriteSink::new(BufWriter::new(File::create(&args[2])?));
    render_svg(&scene, &mut sink)?;
    sink.into_inner().into_inner()?;
    println!("Wrote {}", args[2]);

    let bitmap = render_bitmap(&scene, AntiAlias::X16, size, 0)?;
    let covered = bitmap.pixels.chunks_exact(4).filter(|px| px[3] > 0).count();
    println!(
        "{}x{} bitmap: {} of {} pixels covered",
        bitmap.width,
        bitmap.height,
        covered,
        bitmap.width as usize * bitmap.height as usize
    );

    Ok(())
}
