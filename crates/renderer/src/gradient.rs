//! Mapping of scalar fields to RGB rasters.

use rayon::prelude::*;

use pyramid_common::ScalarField;

use crate::colorscale::{ColorScale, Rgb};
use crate::normalize::Normalizer;

/// Minimum number of cells before rows are colored in parallel.
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// An RGB raster, 3 bytes per pixel in row-major order.
///
/// Raster row 0 is field row 0; there is no vertical flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbRaster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbRaster {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw interleaved RGB bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Color at (row, col), or `None` outside the raster.
    pub fn pixel(&self, row: usize, col: usize) -> Option<Rgb> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let i = (row * self.width + col) * 3;
        Some(Rgb::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
        ))
    }
}

/// Color every cell of `field` through `normalizer` and `scale`.
///
/// Same field, normalizer and scale always give the same bytes.
pub fn render_field(field: &ScalarField, normalizer: &Normalizer, scale: &ColorScale) -> RgbRaster {
    let (width, height) = (field.width(), field.height());
    let mut pixels = vec![0u8; width * height * 3];

    if width == 0 || height == 0 {
        return RgbRaster {
            width,
            height,
            pixels,
        };
    }

    let color_row = |(row, out): (usize, &mut [u8])| {
        let values = &field.data()[row * width..(row + 1) * width];
        for (px, &v) in out.chunks_exact_mut(3).zip(values) {
            px.copy_from_slice(&scale.map(normalizer.normalize(v)).to_array());
        }
    };

    if width * height >= PARALLEL_THRESHOLD {
        pixels
            .par_chunks_mut(width * 3)
            .enumerate()
            .for_each(color_row);
    } else {
        pixels.chunks_mut(width * 3).enumerate().for_each(color_row);
    }

    RgbRaster {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorscale::builtin;
    use crate::normalize::{Normalization, ValueRange};

    #[test]
    fn test_pixel_bounds() {
        let field = ScalarField::filled(3, 2, 0.0);
        let scale = builtin("gray").unwrap();
        let raster = render_field(&field, &Normalizer::new(ValueRange::unit()), scale);
        assert_eq!(raster.pixels().len(), 18);
        assert!(raster.pixel(1, 2).is_some());
        assert!(raster.pixel(2, 0).is_none());
        assert!(raster.pixel(0, 3).is_none());
    }

    #[test]
    fn test_row_zero_is_top() {
        let field = ScalarField::new(vec![0.0, 0.0, 1.0, 1.0], 2, 2).unwrap();
        let scale = builtin("gray").unwrap();
        let n = Normalization::Identity.normalizer_for(&field);
        let raster = render_field(&field, &n, scale);
        assert_eq!(raster.pixel(0, 0), Some(Rgb::new(0, 0, 0)));
        assert_eq!(raster.pixel(1, 1), Some(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        // 100x100 crosses the parallel threshold; compare against per-cell mapping
        let data: Vec<f64> = (0..10_000).map(|i| (i % 257) as f64 / 256.0).collect();
        let field = ScalarField::new(data.clone(), 100, 100).unwrap();
        let scale = builtin("magma").unwrap();
        let n = Normalization::Identity.normalizer_for(&field);
        let raster = render_field(&field, &n, scale);

        let expected: Vec<u8> = data
            .iter()
            .flat_map(|&v| scale.map(n.normalize(v)).to_array())
            .collect();
        assert_eq!(raster.pixels(), expected.as_slice());
    }

    #[test]
    fn test_empty_field() {
        let field = ScalarField::filled(0, 0, 0.0);
        let scale = builtin("gray").unwrap();
        let raster = render_field(&field, &Normalizer::new(ValueRange::unit()), scale);
        assert!(raster.pixels().is_empty());
    }
}
