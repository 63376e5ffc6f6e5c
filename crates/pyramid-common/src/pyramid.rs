//! Discovery of tiles in a pyramid directory tree.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{PyramidError, PyramidResult};
use crate::tile::TileAddress;

/// Extension of source tiles written by the pyramid producer.
pub const DEFAULT_SOURCE_EXTENSION: &str = "nc";

/// Options controlling which files a pyramid scan returns.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Source file extension, without the leading dot
    pub extension: String,
    /// Restrict the scan to these zoom levels (all levels when empty)
    pub levels: Vec<u32>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            levels: Vec::new(),
        }
    }
}

impl ScanOptions {
    fn accepts(&self, path: &Path) -> Option<TileAddress> {
        let ext = path.extension()?.to_str()?;
        if !ext.eq_ignore_ascii_case(self.extension.trim_start_matches('.')) {
            return None;
        }
        let address = TileAddress::from_path(path)?;
        if !self.levels.is_empty() && !self.levels.contains(&address.level) {
            return None;
        }
        Some(address)
    }
}

/// Find every tile below `root` that matches the pyramid naming convention.
///
/// Files that do not look like `<level>/<row>_<column>.<ext>` are skipped.
/// The result is sorted by (level, row, column) so repeated scans are stable.
pub fn discover_tiles(root: &Path, options: &ScanOptions) -> PyramidResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PyramidError::InvalidRoot(root.to_path_buf()));
    }

    let mut tiles = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| PyramidError::Scan {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        match options.accepts(entry.path()) {
            Some(address) => tiles.push((address, entry.into_path())),
            None => debug!(path = %entry.path().display(), "Skipping non-tile file"),
        }
    }

    tiles.sort();
    Ok(tiles.into_iter().map(|(_, path)| path).collect())
}
