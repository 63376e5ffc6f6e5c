//! PNG encoding for RGB rasters.
//!
//! Writes 8-bit truecolor images (color type 2) with no alpha channel and no
//! ancillary chunks, so identical pixels always encode to identical bytes.

use std::io::Write;

use crate::error::{RenderError, RenderResult};
use crate::gradient::RgbRaster;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode a rendered raster as PNG.
pub fn encode_raster(raster: &RgbRaster) -> RenderResult<Vec<u8>> {
    create_png_rgb(raster.pixels(), raster.width(), raster.height())
}

/// Create a PNG image from RGB pixel data (color type 2).
///
/// # Arguments
/// - `pixels`: RGB pixel data (3 bytes per pixel)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png_rgb(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    if pixels.len() != width * height * 3 {
        return Err(RenderError::ShapeMismatch {
            width,
            height,
            len: pixels.len(),
        });
    }
    if width == 0 || height == 0 {
        return Err(RenderError::Encode(format!(
            "image must have non-zero dimensions, got {}x{}",
            width, height
        )));
    }
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(RenderError::Encode(format!(
                "{}x{} exceeds PNG dimension limits",
                width, height
            )))
        }
    };

    let mut png = Vec::new();

    png.extend_from_slice(&PNG_SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&w.to_be_bytes());
    ihdr_data.extend_from_slice(&h.to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(2); // color type (RGB)
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // IDAT chunk (image data)
    let idat_data = deflate_idat_rgb(pixels, width, height)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Deflate RGB image data for IDAT chunk.
fn deflate_idat_rgb(pixels: &[u8], width: usize, height: usize) -> std::io::Result<Vec<u8>> {
    let stride = width * 3;

    // Add filter byte (0 = no filter) to each scanline
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in pixels.chunks_exact(stride) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_header() {
        let png = create_png_rgb(&[255, 0, 0, 0, 0, 255], 2, 1).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &2u32.to_be_bytes());
        assert_eq!(&png[20..24], &1u32.to_be_bytes());
        assert_eq!(png[24], 8);
        assert_eq!(png[25], 2);
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(matches!(
            create_png_rgb(&[0; 10], 2, 2),
            Err(RenderError::ShapeMismatch { len: 10, .. })
        ));
    }

    #[test]
    fn test_zero_dimensions() {
        assert!(matches!(create_png_rgb(&[], 0, 4), Err(RenderError::Encode(_))));
    }

    #[test]
    fn test_deterministic() {
        let pixels: Vec<u8> = (0..300).map(|i| (i * 7 % 256) as u8).collect();
        assert_eq!(
            create_png_rgb(&pixels, 10, 10).unwrap(),
            create_png_rgb(&pixels, 10, 10).unwrap()
        );
    }
}
