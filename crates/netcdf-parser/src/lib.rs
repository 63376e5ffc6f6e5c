//! NetCDF reader for height-field pyramid tiles.
//!
//! Each pyramid tile is a small NetCDF file holding one 2-D variable
//! (`heights` by convention). This crate opens the file through the native
//! `netcdf` library and hands back a [`ScalarField`] of `f64` values no matter
//! how the variable is stored on disk.
//!
//! # Packed data
//!
//! Variables stored as reduced-precision integers are unpacked with the CF
//! `scale_factor` / `add_offset` attributes, and cells equal to `_FillValue`
//! or `missing_value` become NaN.

pub mod error;
pub mod native;

pub use error::{NetCdfError, NetCdfResult};
pub use native::{list_variables, read_field, silence_hdf5_errors, DEFAULT_VARIABLE};
pub use pyramid_common::ScalarField;
