//! In-memory scalar fields read from pyramid tiles.

use crate::error::{PyramidError, PyramidResult};

/// A 2-D scalar field stored in row-major order.
///
/// Missing values are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl ScalarField {
    /// Create a field, checking that `data.len() == width * height`.
    pub fn new(data: Vec<f64>, width: usize, height: usize) -> PyramidResult<Self> {
        if data.len() != width * height {
            return Err(PyramidError::ShapeMismatch {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a field where every cell has the same value.
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Shape as (height, width), matching array conventions.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at (row, col), or None when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, so empty-width fields yield no rows
        self.data.chunks_exact(self.width.max(1)).take(self.height)
    }

    /// Minimum and maximum over finite values.
    ///
    /// Returns None when the field has no finite values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }
}
