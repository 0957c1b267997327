//! Uncompressed 32-bit TGA output.

use std::io::Write;

use tinyvg_core::{Bitmap, TvgError, TvgResult};

const IMAGE_ID: &[u8; 6] = b"TinyVG";

/// Writes `bitmap` as a top-left origin BGRA TGA image.
pub fn write_tga<W: Write>(out: &mut W, bitmap: &Bitmap) -> TvgResult<()> {
    let width = u16::try_from(bitmap.width)
        .map_err(|_| TvgError::unsupported(format!("TGA width {}", bitmap.width)))?;
    let height = u16::try_from(bitmap.height)
        .map_err(|_| TvgError::unsupported(format!("TGA height {}", bitmap.height)))?;

    let mut header = Vec::with_capacity(18 + IMAGE_ID.len());
    header.push(IMAGE_ID.len() as u8);
    header.push(0); // no color map
    header.push(2); // uncompressed true-color
    header.extend_from_slice(&[0; 5]); // color map fields
    header.extend_from_slice(&[0; 4]); // origin
    header.extend_from_slice(&width.to_le_bytes());
    header.extend_from_slice(&height.to_le_bytes());
    header.push(32);
    header.push(8 | 0x20); // 8 alpha bits, top-left origin
    header.extend_from_slice(IMAGE_ID);
    out.write_all(&header)?;

    let mut pixels = bitmap.pixels.clone();
    for pixel in pixels.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
    out.write_all(&pixels)?;
    Ok(())
}
