//! Tile addressing for deep-zoom pyramids.
//!
//! Pyramids are laid out as `<root>/<level>/<row>_<column>.<ext>`. The address
//! of a tile is carried entirely by its path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A tile coordinate (level/row/column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileAddress {
    /// Zoom level (directory name)
    pub level: u32,
    /// Row index (first filename component)
    pub row: u32,
    /// Column index (second filename component)
    pub column: u32,
}

impl TileAddress {
    pub fn new(level: u32, row: u32, column: u32) -> Self {
        Self { level, row, column }
    }

    /// Parse a tile address from a path of the form `.../<level>/<row>_<column>.<ext>`.
    ///
    /// Returns None if the path does not follow the pyramid naming convention.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let (row, column) = stem.split_once('_')?;
        let level = path.parent()?.file_name()?.to_str()?;

        Some(Self {
            level: level.parse().ok()?,
            row: row.parse().ok()?,
            column: column.parse().ok()?,
        })
    }

    /// Relative path of this tile below a pyramid root.
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        PathBuf::from(self.level.to_string())
            .join(format!("{}_{}.{}", self.row, self.column, extension))
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}_{}", self.level, self.row, self.column)
    }
}

/// Derive the rendered image path for a source tile.
///
/// Only the extension changes; the image lands in the same directory as its
/// source.
pub fn output_path(source: &Path, image_extension: &str) -> PathBuf {
    source.with_extension(image_extension.trim_start_matches('.'))
}
