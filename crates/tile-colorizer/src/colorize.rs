//! Single-tile colorization.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use pyramid_common::{output_path, ScalarField};
use renderer::png::encode_raster;
use renderer::{render_field, ColorScale, Normalization};

use crate::config::ColorizeConfig;
use crate::error::{ColorizeError, Result};
use crate::reader::{FieldReader, NetCdfFieldReader};

/// Turns source tiles into PNG images next to them.
pub struct TileColorizer<R = NetCdfFieldReader> {
    reader: R,
    scale: ColorScale,
    variable: String,
    image_extension: String,
}

impl TileColorizer<NetCdfFieldReader> {
    /// Colorizer reading NetCDF tiles, with the scale resolved from `config`.
    pub fn from_config(config: &ColorizeConfig) -> Result<Self> {
        Self::with_reader(NetCdfFieldReader::new(), config)
    }
}

impl<R: FieldReader> TileColorizer<R> {
    pub fn with_reader(reader: R, config: &ColorizeConfig) -> Result<Self> {
        config.validate()?;
        let scale = config.resolve_color_scale()?;
        Ok(Self {
            reader,
            scale,
            variable: config.variable.clone(),
            image_extension: config.image_extension().to_string(),
        })
    }

    pub fn color_scale(&self) -> &ColorScale {
        &self.scale
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub(crate) fn reader(&self) -> &R {
        &self.reader
    }

    /// Where the image for `source` is written.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        output_path(source, &self.image_extension)
    }

    /// Load the source field.
    pub fn read(&self, source: &Path) -> Result<ScalarField> {
        self.reader.read_field(source, &self.variable)
    }

    /// Render `source` and write the PNG beside it.
    ///
    /// Returns the absolute path of the written image. An existing image is
    /// replaced atomically.
    pub fn colorize_tile(&self, source: &Path, normalization: &Normalization) -> Result<PathBuf> {
        let target = self.output_path(source);
        if self.is_own_output(source, &target) {
            return Err(ColorizeError::OverwritesSource {
                path: source.to_path_buf(),
            });
        }

        let field = self.read(source)?;
        let png = self.encode(&field, normalization)?;
        write_atomic(&target, &png)?;

        let absolute = fs::canonicalize(&target).unwrap_or(target);
        info!(
            source = %source.display(),
            output = %absolute.display(),
            width = field.width(),
            height = field.height(),
            "Wrote colorized tile"
        );
        Ok(absolute)
    }

    /// True when writing `target` would replace `source` itself.
    fn is_own_output(&self, source: &Path, target: &Path) -> bool {
        let same_extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.image_extension));
        same_extension || source == target
    }

    /// Render a field to PNG bytes without touching the filesystem.
    pub fn encode(&self, field: &ScalarField, normalization: &Normalization) -> Result<Vec<u8>> {
        let normalizer = normalization.normalizer_for(field);
        let raster = render_field(field, &normalizer, &self.scale);
        Ok(encode_raster(&raster)?)
    }
}

/// Write through a temporary file in the target directory, then rename.
fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let write_failure = |source: std::io::Error| ColorizeError::WriteFailure {
        path: target.to_path_buf(),
        source,
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".colorize-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_failure)?;
    tmp.write_all(bytes).map_err(write_failure)?;
    // Temporary files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(write_failure)?;
    }
    tmp.as_file().sync_all().map_err(write_failure)?;
    tmp.persist(target).map_err(|e| write_failure(e.error))?;

    debug!(path = %target.display(), bytes = bytes.len(), "Persisted image");
    Ok(())
}
