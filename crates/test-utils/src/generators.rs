//! Height-field generators for creating synthetic tile data.
//!
//! These generators create predictable, verifiable patterns that can be used
//! across the test suite. All values are row-major `Vec<f64>`.

/// Creates a field where each value is its flat index divided by the last
/// index, so values run from exactly 0.0 (top-left) to exactly 1.0
/// (bottom-right).
///
/// # Example
///
/// ```
/// use test_utils::ramp_field;
///
/// let field = ramp_field(3, 2);
/// assert_eq!(field.len(), 6);
/// assert_eq!(field[0], 0.0);
/// assert_eq!(field[5], 1.0);
/// ```
pub fn ramp_field(width: usize, height: usize) -> Vec<f64> {
    let n = width * height;
    let last = n.saturating_sub(1).max(1) as f64;
    (0..n).map(|i| i as f64 / last).collect()
}

/// Creates a field filled with a constant value.
pub fn constant_field(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates a rough surface of heights in millimetres.
///
/// A sum of a few sinusoids with deterministic phases, offset by `seed` so
/// neighbouring tiles differ. Values stay roughly within ±3.
pub fn synthetic_surface(width: usize, height: usize, seed: u32) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    let phase = simple_hash(seed, seed.wrapping_add(1), seed) as f64 / u32::MAX as f64;
    for row in 0..height {
        for col in 0..width {
            let x = col as f64 / width.max(1) as f64 * std::f64::consts::TAU;
            let y = row as f64 / height.max(1) as f64 * std::f64::consts::TAU;
            let h = (x + phase * 3.0).sin()
                + 0.5 * (2.0 * y - phase).cos()
                + 0.25 * (3.0 * (x + y)).sin()
                + seed as f64 * 0.1;
            data.push(h);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        let field = ramp_field(4, 4);
        assert_eq!(field[0], 0.0);
        assert_eq!(field[15], 1.0);
        assert!(field.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ramp_single_cell() {
        assert_eq!(ramp_field(1, 1), vec![0.0]);
    }

    #[test]
    fn test_synthetic_surface_deterministic() {
        assert_eq!(synthetic_surface(8, 8, 3), synthetic_surface(8, 8, 3));
        assert_ne!(synthetic_surface(8, 8, 3), synthetic_surface(8, 8, 4));
    }
}
