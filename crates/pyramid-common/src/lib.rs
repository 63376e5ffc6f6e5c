//! Common types and utilities shared by the tile colorizer and tile server.

pub mod error;
pub mod field;
pub mod pyramid;
pub mod tile;

pub use error::{PyramidError, PyramidResult};
pub use field::ScalarField;
pub use pyramid::{discover_tiles, ScanOptions, DEFAULT_SOURCE_EXTENSION};
pub use tile::{output_path, TileAddress};
