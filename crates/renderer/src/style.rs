//! Custom color scales loaded from JSON style files.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "styles": {
//!     "terrain": {
//!       "name": "Terrain",
//!       "stops": [
//!         {"value": -100, "color": "#1B4F72", "label": "trough"},
//!         {"value": 0,    "color": "#F4D03F"},
//!         {"value": 250,  "color": "#FFFFFF", "label": "peak"}
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Stop values are only used for ordering and spacing: they are rescaled so
//! the lowest stop sits at 0.0 and the highest at 1.0.
//!
//! A style may instead carry `"lut"`: exactly 256 hex colors, used as the
//! lookup table without interpolation. This reproduces tables exported from
//! other plotting tools byte for byte.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::colorscale::{ColorScale, ColorStop, Rgb};
use crate::error::{RenderError, RenderResult};

/// Style configuration loaded from JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    pub version: String,
    pub styles: HashMap<String, StyleDefinition>,
}

/// A single style definition
///
/// Either `stops` to interpolate, or a full `lut` of 256 hex colors used
/// as-is.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stops: Vec<StyleStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lut: Option<Vec<String>>,
}

/// Color stop for gradient
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleStop {
    pub value: f64,
    pub color: String,
    pub label: Option<String>,
}

impl StyleConfig {
    /// Load style configuration from JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Load style configuration from file
    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RenderError::StyleFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| RenderError::StyleFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get a specific style definition
    pub fn get_style(&self, name: &str) -> Option<&StyleDefinition> {
        self.styles.get(name)
    }

    /// Build the color scale for a named style.
    pub fn color_scale(&self, name: &str) -> RenderResult<ColorScale> {
        self.get_style(name)
            .ok_or_else(|| RenderError::StyleNotFound(name.to_string()))?
            .to_color_scale(name)
    }
}

impl StyleDefinition {
    /// Convert the definition into a color scale named `key`.
    pub fn to_color_scale(&self, key: &str) -> RenderResult<ColorScale> {
        if let Some(lut) = &self.lut {
            let colors = lut
                .iter()
                .map(|hex| {
                    hex_to_rgb(hex)
                        .map(|(r, g, b)| Rgb::new(r, g, b))
                        .ok_or_else(|| RenderError::InvalidColor(hex.clone()))
                })
                .collect::<RenderResult<Vec<_>>>()?;
            return ColorScale::from_lut(key, &colors);
        }

        let mut stops = self.stops.clone();
        stops.sort_by(|a, b| a.value.total_cmp(&b.value));

        let (first, last) = match (stops.first(), stops.last()) {
            (Some(first), Some(last)) if stops.len() >= 2 => (first.value, last.value),
            _ => {
                return Err(RenderError::InvalidColorScale {
                    name: key.to_string(),
                    reason: "at least two stops are required".to_string(),
                })
            }
        };
        let span = last - first;
        if !span.is_finite() || span <= 0.0 {
            return Err(RenderError::InvalidColorScale {
                name: key.to_string(),
                reason: format!("stop values must span a positive range, got {first}..{last}"),
            });
        }

        let color_stops = stops
            .iter()
            .enumerate()
            .map(|(i, stop)| {
                let (r, g, b) = hex_to_rgb(&stop.color)
                    .ok_or_else(|| RenderError::InvalidColor(stop.color.clone()))?;
                // Pin the ends so the endpoints are reproduced exactly
                let position = if i == 0 {
                    0.0
                } else if i == stops.len() - 1 {
                    1.0
                } else {
                    (stop.value - first) / span
                };
                Ok(ColorStop::new(position, Rgb::new(r, g, b)))
            })
            .collect::<RenderResult<Vec<_>>>()?;

        ColorScale::from_stops(key, &color_stops)
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
