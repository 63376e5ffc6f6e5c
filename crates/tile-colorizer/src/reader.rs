//! Source tile readers.

use std::path::Path;

use pyramid_common::ScalarField;

use crate::error::{ColorizeError, Result};

/// Loads the scalar field of a source tile.
///
/// Implementations are shared across worker threads.
pub trait FieldReader: Send + Sync {
    fn read_field(&self, path: &Path, variable: &str) -> Result<ScalarField>;
}

/// Reads NetCDF tiles through the native netcdf library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfFieldReader;

impl NetCdfFieldReader {
    pub fn new() -> Self {
        netcdf_parser::silence_hdf5_errors();
        Self
    }
}

impl FieldReader for NetCdfFieldReader {
    fn read_field(&self, path: &Path, variable: &str) -> Result<ScalarField> {
        netcdf_parser::read_field(path, variable).map_err(|e| ColorizeError::from_netcdf(path, e))
    }
}
