//! Batch colorization of many tiles.
//!
//! Tiles run on a dedicated rayon pool. Failures are collected into the
//! report instead of aborting the batch, unless fail-fast is set, in which
//! case tiles not yet started once a failure is seen are marked skipped.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use renderer::{Normalization, ValueRange};

use crate::colorize::TileColorizer;
use crate::config::{ColorizeConfig, NormalizationPolicy};
use crate::error::{ColorizeError, Result};
use crate::reader::{FieldReader, NetCdfFieldReader};

/// Final state of one tile in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileStatus {
    Converted,
    Failed,
    Skipped,
}

/// Outcome for a single source tile.
#[derive(Debug, Clone, Serialize)]
pub struct TileOutcome {
    pub source: PathBuf,
    pub status: TileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TileOutcome {
    fn converted(source: &Path, output: PathBuf) -> Self {
        Self {
            source: source.to_path_buf(),
            status: TileStatus::Converted,
            output: Some(output),
            error_kind: None,
            message: None,
        }
    }

    fn failed(source: &Path, error: &ColorizeError) -> Self {
        Self {
            source: source.to_path_buf(),
            status: TileStatus::Failed,
            output: None,
            error_kind: Some(error.kind()),
            message: Some(error.to_string()),
        }
    }

    fn skipped(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            status: TileStatus::Skipped,
            output: None,
            error_kind: None,
            message: None,
        }
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub color_scale: String,
    pub normalization: String,
    /// Range used by `global` and `fixed` normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ValueRange>,
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub tiles: Vec<TileOutcome>,
}

impl BatchReport {
    /// True when every tile was converted.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TileOutcome> {
        self.tiles
            .iter()
            .filter(|t| t.status == TileStatus::Failed)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs a colorizer over many tiles in parallel.
pub struct BatchRunner<R = NetCdfFieldReader> {
    colorizer: TileColorizer<R>,
    policy: NormalizationPolicy,
    pool: rayon::ThreadPool,
    fail_fast: bool,
}

impl BatchRunner<NetCdfFieldReader> {
    pub fn from_config(config: &ColorizeConfig) -> Result<Self> {
        Self::with_reader(NetCdfFieldReader::new(), config)
    }
}

impl<R: FieldReader> BatchRunner<R> {
    pub fn with_reader(reader: R, config: &ColorizeConfig) -> Result<Self> {
        let colorizer = TileColorizer::with_reader(reader, config)?;
        let workers = config.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("colorize-{}", i))
            .build()
            .map_err(|e| ColorizeError::WorkerPool(e.to_string()))?;

        debug!(workers, "Created colorize worker pool");

        Ok(Self {
            colorizer,
            policy: config.normalization,
            pool,
            fail_fast: config.fail_fast,
        })
    }

    pub fn colorizer(&self) -> &TileColorizer<R> {
        &self.colorizer
    }

    /// Colorize every source tile and report per-tile outcomes.
    ///
    /// Duplicate paths are processed once; the report follows input order.
    pub fn run(&self, sources: &[PathBuf]) -> BatchReport {
        let started_at = Utc::now();
        let sources = dedupe(sources);

        let (normalization, range) = self.resolve_normalization(&sources);

        info!(
            tiles = sources.len(),
            color_scale = %self.colorizer.color_scale().name(),
            normalization = %self.policy,
            range = ?range,
            fail_fast = self.fail_fast,
            "Starting colorize batch"
        );

        let halted = AtomicBool::new(false);
        let tiles: Vec<TileOutcome> = self.pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    if self.fail_fast && halted.load(Ordering::Acquire) {
                        return TileOutcome::skipped(source);
                    }
                    match self.colorizer.colorize_tile(source, &normalization) {
                        Ok(output) => TileOutcome::converted(source, output),
                        Err(e) => {
                            warn!(
                                source = %source.display(),
                                kind = e.kind(),
                                error = %e,
                                "Failed to colorize tile"
                            );
                            halted.store(true, Ordering::Release);
                            TileOutcome::failed(source, &e)
                        }
                    }
                })
                .collect()
        });

        let count = |status| tiles.iter().filter(|t| t.status == status).count();
        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            color_scale: self.colorizer.color_scale().name().to_string(),
            normalization: self.policy.name().to_string(),
            range,
            converted: count(TileStatus::Converted),
            failed: count(TileStatus::Failed),
            skipped: count(TileStatus::Skipped),
            tiles,
        };

        info!(
            converted = report.converted,
            failed = report.failed,
            skipped = report.skipped,
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Colorize batch finished"
        );

        report
    }

    /// Turn the configured policy into the normalization applied to each tile.
    fn resolve_normalization(&self, sources: &[PathBuf]) -> (Normalization, Option<ValueRange>) {
        match self.policy {
            NormalizationPolicy::Identity => (Normalization::Identity, None),
            NormalizationPolicy::PerTile => (Normalization::PerTile, None),
            NormalizationPolicy::Fixed { min, max } => {
                let range = ValueRange::new(min, max);
                (Normalization::Fixed(range), Some(range))
            }
            NormalizationPolicy::Global => {
                let range = self.global_range(sources).unwrap_or_else(|| {
                    warn!("No finite values in any tile, normalizing over [0, 1]");
                    ValueRange::unit()
                });
                (Normalization::Fixed(range), Some(range))
            }
        }
    }

    /// Min-max over the finite values of every readable tile.
    ///
    /// Unreadable tiles are left out here; they fail again, and are
    /// reported, when the batch itself runs.
    pub fn global_range(&self, sources: &[PathBuf]) -> Option<ValueRange> {
        let range = self.pool.install(|| {
            sources
                .par_iter()
                .filter_map(|source| {
                    let reader = self.colorizer.reader();
                    match reader.read_field(source, self.colorizer.variable()) {
                        Ok(field) => ValueRange::of_field(&field),
                        Err(e) => {
                            debug!(
                                source = %source.display(),
                                error = %e,
                                "Skipping tile in range pre-pass"
                            );
                            None
                        }
                    }
                })
                .reduce_with(ValueRange::union)
        });

        if let Some(range) = range {
            info!(min = range.min, max = range.max, "Computed global value range");
        }
        range
    }
}

/// Drop repeated paths, keeping the first occurrence.
fn dedupe(sources: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(sources.len());
    sources
        .iter()
        .filter(|&path| {
            let first = seen.insert(path);
            if !first {
                debug!(path = %path.display(), "Ignoring duplicate tile path");
            }
            first
        })
        .cloned()
        .collect()
}
