//! Native NetCDF parsing using the netcdf library.
//!
//! The netcdf library wraps libnetcdf/HDF5 and performs numeric type
//! conversion itself, so every variable is read as `f64` regardless of the
//! on-disk type (byte, short, int, float, double).

use std::path::Path;
use std::sync::Once;

use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use pyramid_common::ScalarField;

/// Variable holding the surface heights in pyramid tiles.
pub const DEFAULT_VARIABLE: &str = "heights";

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g. when a corrupt tile fails to
/// open). It only needs to be called once per process, but is safe to call
/// multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

fn open(path: &Path) -> NetCdfResult<netcdf::File> {
    silence_hdf5_errors();

    if !path.is_file() {
        return Err(NetCdfError::Unreadable {
            path: path.to_path_buf(),
            reason: "no such file".to_string(),
        });
    }

    netcdf::open(path).map_err(|e| NetCdfError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// List the names of all variables in a NetCDF file.
pub fn list_variables<P: AsRef<Path>>(path: P) -> NetCdfResult<Vec<String>> {
    let file = open(path.as_ref())?;
    Ok(file.variables().map(|v| v.name()).collect())
}

/// Read a named 2-D variable as a scalar field.
///
/// Leading dimensions of length 1 (e.g. a single time step) are squeezed away.
/// Anything that is not 2-D after squeezing is rejected.
pub fn read_field<P: AsRef<Path>>(path: P, variable: &str) -> NetCdfResult<ScalarField> {
    let path = path.as_ref();
    let file = open(path)?;

    let var = match file.variable(variable) {
        Some(var) => var,
        None => {
            return Err(NetCdfError::MissingVariable {
                path: path.to_path_buf(),
                variable: variable.to_string(),
                available: file.variables().map(|v| v.name()).collect(),
            })
        }
    };

    let mut dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    while dims.len() > 2 && dims[0] == 1 {
        dims.remove(0);
    }
    let (height, width) = match dims.as_slice() {
        [height, width] => (*height, *width),
        other => {
            return Err(NetCdfError::InvalidFormat(format!(
                "variable '{}' in {} has shape {:?}, expected 2 dimensions",
                variable,
                path.display(),
                other
            )))
        }
    };

    // Read all extents; libnetcdf widens the stored type to f64
    let raw: Vec<f64> = var.get_values(..).map_err(|e| NetCdfError::Unreadable {
        path: path.to_path_buf(),
        reason: format!("failed to read '{}': {}", variable, e),
    })?;

    let scale_factor = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);
    let fill_value = get_f64_attr(&var, "_FillValue");
    let missing_value = get_f64_attr(&var, "missing_value");

    debug!(
        path = %path.display(),
        variable = %variable,
        width,
        height,
        scale_factor,
        add_offset,
        "Read NetCDF variable"
    );

    let data: Vec<f64> = raw
        .into_iter()
        .map(|val| {
            if Some(val) == fill_value || Some(val) == missing_value {
                f64::NAN
            } else {
                val * scale_factor + add_offset
            }
        })
        .collect();

    ScalarField::new(data, width, height).map_err(|e| NetCdfError::InvalidFormat(e.to_string()))
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get an attribute widened to f64.
fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}
