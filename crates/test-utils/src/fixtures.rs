//! NetCDF tile fixtures and on-disk pyramids.
//!
//! Tiles are written through the `netcdf` crate with dimensions `(y, x)` and
//! a single data variable, the same shape the pyramid producer emits.

use std::fs;
use std::path::{Path, PathBuf};

use pyramid_common::TileAddress;

/// Variable name used by the pyramid producer.
pub const HEIGHTS: &str = "heights";

/// Common tile coordinate sets.
pub mod coords {
    /// The four tiles of level 9 in the synthetic square example.
    pub const LEVEL_9_QUAD: [(u32, u32); 4] = [(0, 0), (0, 1), (1, 0), (1, 1)];
}

fn create_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create tile directory");
    }
}

/// Write a `f64` tile with the given variable name.
pub fn write_tile_with_variable(
    path: &Path,
    variable: &str,
    values: &[f64],
    width: usize,
    height: usize,
) {
    assert_eq!(values.len(), width * height, "fixture shape mismatch");
    create_parent(path);

    let mut file = netcdf::create(path).expect("Failed to create NetCDF fixture");
    file.add_dimension("y", height).expect("add y dimension");
    file.add_dimension("x", width).expect("add x dimension");
    let mut var = file
        .add_variable::<f64>(variable, &["y", "x"])
        .expect("add variable");
    var.put_values(values, ..).expect("write values");
}

/// Write a `heights` tile of `f64` values.
pub fn write_height_tile(path: &Path, values: &[f64], width: usize, height: usize) {
    write_tile_with_variable(path, HEIGHTS, values, width, height);
}

/// Write a `heights` tile packed as `i16` with CF scale/offset attributes.
///
/// Raw values equal to `fill` are marked missing via `_FillValue`.
pub fn write_packed_tile(
    path: &Path,
    raw: &[i16],
    width: usize,
    height: usize,
    scale_factor: f64,
    add_offset: f64,
    fill: i16,
) {
    assert_eq!(raw.len(), width * height, "fixture shape mismatch");
    create_parent(path);

    let mut file = netcdf::create(path).expect("Failed to create NetCDF fixture");
    file.add_dimension("y", height).expect("add y dimension");
    file.add_dimension("x", width).expect("add x dimension");
    let mut var = file
        .add_variable::<i16>(HEIGHTS, &["y", "x"])
        .expect("add variable");
    // _FillValue must be defined before any data is written
    var.put_attribute("_FillValue", fill).expect("fill attribute");
    var.put_attribute("scale_factor", scale_factor)
        .expect("scale attribute");
    var.put_attribute("add_offset", add_offset)
        .expect("offset attribute");
    var.put_values(raw, ..).expect("write values");
}

/// Write a `heights` tile with a leading length-1 time dimension.
pub fn write_timestep_tile(path: &Path, values: &[f64], width: usize, height: usize) {
    assert_eq!(values.len(), width * height, "fixture shape mismatch");
    create_parent(path);

    let mut file = netcdf::create(path).expect("Failed to create NetCDF fixture");
    file.add_dimension("time", 1).expect("add time dimension");
    file.add_dimension("y", height).expect("add y dimension");
    file.add_dimension("x", width).expect("add x dimension");
    let mut var = file
        .add_variable::<f64>(HEIGHTS, &["time", "y", "x"])
        .expect("add variable");
    var.put_values(values, ..).expect("write values");
}

/// Write bytes that are not a NetCDF file at the given tile path.
pub fn write_corrupt_tile(path: &Path) {
    create_parent(path);
    fs::write(path, b"definitely not netcdf").expect("Failed to write corrupt tile");
}

/// Build one pyramid level of `heights` tiles below `root`.
///
/// `values` is called with each tile address and must return `width * height`
/// values. Returns the tile paths in the order of `coords`.
pub fn build_pyramid<F>(
    root: &Path,
    level: u32,
    coords: &[(u32, u32)],
    width: usize,
    height: usize,
    mut values: F,
) -> Vec<PathBuf>
where
    F: FnMut(TileAddress) -> Vec<f64>,
{
    coords
        .iter()
        .map(|&(row, column)| {
            let address = TileAddress::new(level, row, column);
            let path = root.join(address.relative_path("nc"));
            write_height_tile(&path, &values(address), width, height);
            path
        })
        .collect()
}
