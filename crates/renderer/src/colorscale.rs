//! Named color scales.
//!
//! A color scale maps a normalized value in [0, 1] to an RGB color. Scales are
//! defined by color stops and materialized once into a 256-entry lookup table,
//! so mapping a value is an index computation: `floor(t * 256)` clamped to
//! `[0, 255]`. The first and last stops are reproduced exactly at t = 0 and
//! t = 1.
//!
//! The built-in registry holds perceptually ordered sequential scales and is
//! initialized on first use.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::error;

use crate::error::{RenderError, RenderResult};
use crate::style::hex_to_rgb;

/// Number of entries in a color scale lookup table.
pub const LUT_SIZE: usize = 256;

/// Color value in RGB format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color used for missing (NaN) values.
    pub const BAD: Rgb = Rgb::new(0, 0, 0);

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A color at a position in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub fn new(position: f64, color: Rgb) -> Self {
        Self { position, color }
    }
}

/// A named color scale backed by a lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    name: String,
    lut: Vec<Rgb>,
}

impl ColorScale {
    /// Build a scale from color stops.
    ///
    /// Stops must be sorted by position, the first at 0.0 and the last at 1.0.
    pub fn from_stops(name: &str, stops: &[ColorStop]) -> RenderResult<Self> {
        let invalid = |reason: &str| RenderError::InvalidColorScale {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if stops.len() < 2 {
            return Err(invalid("at least two stops are required"));
        }
        if stops.iter().any(|s| !s.position.is_finite()) {
            return Err(invalid("stop positions must be finite"));
        }
        if stops.windows(2).any(|w| w[1].position < w[0].position) {
            return Err(invalid("stops must be sorted by position"));
        }
        if stops[0].position != 0.0 || stops[stops.len() - 1].position != 1.0 {
            return Err(invalid("stops must span exactly 0.0 to 1.0"));
        }

        let lut = (0..LUT_SIZE)
            .map(|i| color_at(stops, i as f64 / (LUT_SIZE - 1) as f64))
            .collect();

        Ok(Self {
            name: name.to_string(),
            lut,
        })
    }

    /// Build a scale from a complete lookup table of [`LUT_SIZE`] colors.
    ///
    /// Tables exported from another tool are reproduced exactly.
    pub fn from_lut(name: &str, lut: &[Rgb]) -> RenderResult<Self> {
        if lut.len() != LUT_SIZE {
            return Err(RenderError::InvalidColorScale {
                name: name.to_string(),
                reason: format!("lookup table needs {} colors, got {}", LUT_SIZE, lut.len()),
            });
        }
        Ok(Self {
            name: name.to_string(),
            lut: lut.to_vec(),
        })
    }

    /// Build a scale from evenly spaced hex colors.
    pub fn from_hex(name: &str, colors: &[&str]) -> RenderResult<Self> {
        let last = colors.len().saturating_sub(1).max(1) as f64;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, hex)| {
                let (r, g, b) =
                    hex_to_rgb(hex).ok_or_else(|| RenderError::InvalidColor(hex.to_string()))?;
                Ok(ColorStop::new(i as f64 / last, Rgb::new(r, g, b)))
            })
            .collect::<RenderResult<Vec<_>>>()?;
        Self::from_stops(name, &stops)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lut(&self) -> &[Rgb] {
        &self.lut
    }

    /// Colors at t = 0.0 and t = 1.0.
    pub fn endpoints(&self) -> (Rgb, Rgb) {
        (self.lut[0], self.lut[LUT_SIZE - 1])
    }

    /// Map a normalized value to a color.
    ///
    /// Values below 0 take the first color, values at or above 1 take the
    /// last color, NaN takes [`Rgb::BAD`].
    #[inline]
    pub fn map(&self, t: f64) -> Rgb {
        if t.is_nan() {
            return Rgb::BAD;
        }
        self.lut[lut_index(t)]
    }
}

/// Lookup table index for a normalized value (floor after multiply).
#[inline]
pub fn lut_index(t: f64) -> usize {
    if t <= 0.0 {
        return 0;
    }
    ((t * LUT_SIZE as f64).floor() as usize).min(LUT_SIZE - 1)
}

/// Linear interpolation between the stops surrounding `t`, truncated to u8.
fn color_at(stops: &[ColorStop], t: f64) -> Rgb {
    let upper = stops
        .iter()
        .position(|s| s.position >= t)
        .unwrap_or(stops.len() - 1)
        .max(1);
    let (a, b) = (stops[upper - 1], stops[upper]);

    let span = b.position - a.position;
    if span <= 0.0 {
        return b.color;
    }
    let f = ((t - a.position) / span).clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| (x as f64 * (1.0 - f) + y as f64 * f).clamp(0.0, 255.0) as u8;

    Rgb::new(
        lerp(a.color.r, b.color.r),
        lerp(a.color.g, b.color.g),
        lerp(a.color.b, b.color.b),
    )
}

// ============================================================================
// Built-in scales
// ============================================================================

const VIRIDIS: [&str; 10] = [
    "#440154", "#482878", "#3E4A89", "#31688E", "#26828E", "#1F9E89", "#35B779", "#6DCD59",
    "#B4DE2C", "#FDE725",
];

const INFERNO: [&str; 10] = [
    "#000004", "#1B0C41", "#4A0C6B", "#781C6D", "#A52C60", "#CF4446", "#ED6925", "#FB9B06",
    "#F7D13D", "#FCFFA4",
];

const MAGMA: [&str; 10] = [
    "#000004", "#180F3E", "#451077", "#721F81", "#9F2F7F", "#CD4071", "#F1605D", "#FD9567",
    "#FEC98D", "#FCFDBF",
];

const PLASMA: [&str; 10] = [
    "#0D0887", "#47039F", "#7301A8", "#9C179E", "#BD3786", "#D8576B", "#ED7953", "#FA9E3B",
    "#FDC926", "#F0F921",
];

const CIVIDIS: [&str; 10] = [
    "#00204D", "#00336F", "#39486B", "#575C6D", "#707173", "#8A8779", "#A69D75", "#C4B56C",
    "#E4CF5B", "#FFEA46",
];

const GRAY: [&str; 2] = ["#000000", "#FFFFFF"];

static BUILTIN: Lazy<HashMap<&'static str, ColorScale>> = Lazy::new(|| {
    let defs: [(&'static str, &[&str]); 6] = [
        ("viridis", &VIRIDIS),
        ("inferno", &INFERNO),
        ("magma", &MAGMA),
        ("plasma", &PLASMA),
        ("cividis", &CIVIDIS),
        ("gray", &GRAY),
    ];

    defs.into_iter()
        .filter_map(|(name, colors)| match ColorScale::from_hex(name, colors) {
            Ok(scale) => Some((name, scale)),
            Err(e) => {
                error!(scale = name, error = %e, "Invalid built-in color scale");
                None
            }
        })
        .collect()
});

/// Names of the built-in color scales, sorted.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTIN.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Look up a built-in color scale by name (case-insensitive).
pub fn builtin(name: &str) -> RenderResult<&'static ColorScale> {
    BUILTIN
        .get(name.to_ascii_lowercase().as_str())
        .ok_or_else(|| RenderError::UnknownColorScale {
            name: name.to_string(),
            available: builtin_names().into_iter().map(String::from).collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lut_index_floor_after_multiply() {
        assert_eq!(lut_index(0.0), 0);
        assert_eq!(lut_index(-3.0), 0);
        assert_eq!(lut_index(0.5), 128);
        assert_eq!(lut_index(0.00390625), 1); // exactly 1/256
        assert_eq!(lut_index(0.0039), 0);
        assert_eq!(lut_index(1.0), 255);
        assert_eq!(lut_index(42.0), 255);
        assert_eq!(lut_index(f64::INFINITY), 255);
    }

    #[test]
    fn test_two_stop_scale() {
        let scale = ColorScale::from_hex("ramp", &["#000000", "#FF0000"]).unwrap();
        assert_eq!(scale.lut().len(), LUT_SIZE);
        assert_eq!(scale.endpoints(), (Rgb::new(0, 0, 0), Rgb::new(255, 0, 0)));
        // Entry i of a 0..255 ramp is i itself
        assert_eq!(scale.lut()[100], Rgb::new(100, 0, 0));
    }

    #[test]
    fn test_map_nan_is_bad_color() {
        let scale = builtin("viridis").unwrap();
        assert_eq!(scale.map(f64::NAN), Rgb::BAD);
    }

    #[test]
    fn test_builtin_endpoints_exact() {
        let inferno = builtin("inferno").unwrap();
        assert_eq!(inferno.map(0.0), Rgb::new(0, 0, 4));
        assert_eq!(inferno.map(1.0), Rgb::new(252, 255, 164));

        let viridis = builtin("viridis").unwrap();
        assert_eq!(viridis.map(0.0), Rgb::new(68, 1, 84));
        assert_eq!(viridis.map(1.0), Rgb::new(253, 231, 37));
    }

    #[test]
    fn test_builtin_case_insensitive() {
        assert_eq!(builtin("Inferno").unwrap().name(), "inferno");
    }

    #[test]
    fn test_unknown_builtin_lists_names() {
        match builtin("jet") {
            Err(RenderError::UnknownColorScale { available, .. }) => {
                assert!(available.contains(&"viridis".to_string()));
                assert_eq!(available.len(), 6);
            }
            other => panic!("expected UnknownColorScale, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unsorted_stops() {
        let stops = [
            ColorStop::new(0.0, Rgb::new(0, 0, 0)),
            ColorStop::new(0.8, Rgb::new(1, 1, 1)),
            ColorStop::new(0.4, Rgb::new(2, 2, 2)),
            ColorStop::new(1.0, Rgb::new(3, 3, 3)),
        ];
        assert!(ColorScale::from_stops("bad", &stops).is_err());
    }

    #[test]
    fn test_from_lut_is_exact() {
        let lut: Vec<Rgb> = (0..LUT_SIZE)
            .map(|i| Rgb::new(i as u8, (255 - i) as u8, 7))
            .collect();
        let scale = ColorScale::from_lut("table", &lut).unwrap();
        assert_eq!(scale.lut(), lut.as_slice());
        assert_eq!(scale.map(0.5), Rgb::new(128, 127, 7));

        assert!(ColorScale::from_lut("short", &lut[..255]).is_err());
    }

    #[test]
    fn test_rejects_partial_span() {
        let stops = [
            ColorStop::new(0.1, Rgb::new(0, 0, 0)),
            ColorStop::new(1.0, Rgb::new(1, 1, 1)),
        ];
        assert!(ColorScale::from_stops("bad", &stops).is_err());
    }
}
