//! Colorized rendering of scalar height tiles.
//!
//! - Named color scales (built-in sequential maps or JSON style files)
//! - Normalization of raw heights into [0, 1]
//! - Field to RGB raster mapping
//! - Lossless RGB PNG encoding

pub mod colorscale;
pub mod error;
pub mod gradient;
pub mod normalize;
pub mod png;
pub mod style;

pub use colorscale::{ColorScale, ColorStop, Rgb};
pub use error::{RenderError, RenderResult};
pub use gradient::{render_field, RgbRaster};
pub use normalize::{Normalization, Normalizer, ValueRange};
