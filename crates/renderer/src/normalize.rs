//! Normalization of raw heights into the [0, 1] domain of a color scale.
//!
//! Height tiles carry no guaranteed value range, so every render goes through
//! an explicit policy:
//! - `Identity`: values are already normalized
//! - `PerTile`: min-max over the tile being rendered
//! - `Fixed`: a range shared by every tile (global pre-pass or supplied)
//!
//! `PerTile` makes each tile use the full color range on its own, which shows
//! seams between neighbouring tiles of a pyramid. `Fixed` does not.

use serde::{Deserialize, Serialize};

use pyramid_common::ScalarField;

/// An inclusive range of scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The [0, 1] range.
    pub fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Range over the finite values of a field.
    pub fn of_field(field: &ScalarField) -> Option<Self> {
        field.value_range().map(|(min, max)| Self::new(min, max))
    }

    /// Smallest range covering both.
    pub fn union(self, other: Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// True when the range cannot be used to spread values (max <= min).
    pub fn is_degenerate(&self) -> bool {
        !(self.max > self.min)
    }
}

/// Normalization policy applied to a single tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    Identity,
    PerTile,
    Fixed(ValueRange),
}

impl Normalization {
    /// Resolve the policy against a field.
    ///
    /// A per-tile range over a field without finite values falls back to [0, 1].
    pub fn normalizer_for(&self, field: &ScalarField) -> Normalizer {
        match self {
            Normalization::Identity => Normalizer::new(ValueRange::unit()),
            Normalization::PerTile => {
                Normalizer::new(ValueRange::of_field(field).unwrap_or_else(ValueRange::unit))
            }
            Normalization::Fixed(range) => Normalizer::new(*range),
        }
    }
}

/// Linear map from a value range onto [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    range: ValueRange,
    span: f64,
}

impl Normalizer {
    pub fn new(range: ValueRange) -> Self {
        let span = if range.is_degenerate() {
            0.0
        } else {
            range.max - range.min
        };
        Self { range, span }
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    /// Normalize a value. NaN stays NaN; a degenerate range yields 0.0.
    ///
    /// The result is not clamped; the color scale clamps out-of-range values
    /// to its endpoints.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        if self.span == 0.0 {
            return 0.0;
        }
        if self.span.is_finite() {
            (value - self.range.min) / self.span
        } else {
            // max - min overflowed; halving keeps both terms finite
            let (min, max) = (self.range.min * 0.5, self.range.max * 0.5);
            (value * 0.5 - min) / (max - min)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passes_through() {
        let field = ScalarField::filled(2, 2, 0.25);
        let n = Normalization::Identity.normalizer_for(&field);
        assert_eq!(n.normalize(0.25), 0.25);
        assert_eq!(n.normalize(1.5), 1.5);
    }

    #[test]
    fn test_per_tile_spans_field() {
        let field = ScalarField::new(vec![-2.0, 0.0, 2.0, f64::NAN], 2, 2).unwrap();
        let n = Normalization::PerTile.normalizer_for(&field);
        assert_eq!(n.normalize(-2.0), 0.0);
        assert_eq!(n.normalize(0.0), 0.5);
        assert_eq!(n.normalize(2.0), 1.0);
        assert!(n.normalize(f64::NAN).is_nan());
    }

    #[test]
    fn test_per_tile_constant_field_is_zero() {
        let field = ScalarField::filled(4, 4, 17.0);
        let n = Normalization::PerTile.normalizer_for(&field);
        assert_eq!(n.normalize(17.0), 0.0);
    }

    #[test]
    fn test_per_tile_all_missing_uses_unit_range() {
        let field = ScalarField::filled(2, 2, f64::NAN);
        let n = Normalization::PerTile.normalizer_for(&field);
        assert_eq!(n.range(), ValueRange::unit());
    }

    #[test]
    fn test_fixed_ignores_field() {
        let field = ScalarField::filled(2, 2, 5.0);
        let n = Normalization::Fixed(ValueRange::new(0.0, 10.0)).normalizer_for(&field);
        assert_eq!(n.normalize(5.0), 0.5);
    }

    #[test]
    fn test_range_wider_than_f64_span() {
        let n = Normalizer::new(ValueRange::new(-f64::MAX, f64::MAX));
        assert_eq!(n.normalize(f64::MAX), 1.0);
        assert_eq!(n.normalize(-f64::MAX), 0.0);
        assert_eq!(n.normalize(0.0), 0.5);

        let n = Normalizer::new(ValueRange::new(-f64::MAX, f64::MAX / 2.0));
        assert_eq!(n.normalize(f64::MAX / 2.0), 1.0);
        assert!(n.normalize(1.0e300).is_finite());
    }

    #[test]
    fn test_union_and_degenerate() {
        let r = ValueRange::new(1.0, 2.0).union(ValueRange::new(-1.0, 1.5));
        assert_eq!(r, ValueRange::new(-1.0, 2.0));
        assert!(ValueRange::new(3.0, 3.0).is_degenerate());
        assert!(ValueRange::new(3.0, 1.0).is_degenerate());
        assert!(ValueRange::new(f64::NAN, 1.0).is_degenerate());
        assert!(!r.is_degenerate());
    }
}
