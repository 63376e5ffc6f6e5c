//! Tile colorization pipeline.
//!
//! Reads the scalar `heights` variable of every tile in a pyramid, maps it
//! through a color scale and writes an RGB PNG next to the source tile:
//!
//! ```text
//! <root>/9/0_1.nc  ->  <root>/9/0_1.png
//! ```
//!
//! [`TileColorizer`] handles one tile; [`BatchRunner`] runs many tiles on a
//! worker pool, resolves `global` normalization with a pre-pass over all
//! tiles and collects a [`BatchReport`].

pub mod batch;
pub mod colorize;
pub mod config;
pub mod error;
pub mod reader;

pub use batch::{BatchReport, BatchRunner, TileOutcome, TileStatus};
pub use colorize::TileColorizer;
pub use config::{ColorizeConfig, NormalizationPolicy};
pub use error::{ColorizeError, Result};
pub use reader::{FieldReader, NetCdfFieldReader};
