//! Height tile colorizer.
//!
//! Renders every NetCDF height tile of a deep-zoom pyramid (or an explicit
//! list of tiles) into an RGB PNG written next to its source.
//!
//! ```text
//! colorize --root /data/pyramid --level 9 --normalization global --color-scale inferno
//! colorize /data/pyramid/9/0_0.nc /data/pyramid/9/0_1.nc --normalization per-tile
//! ```
//!
//! Exits 0 when every tile was converted and 1 otherwise.

mod config_loader;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config_loader::{load_config, FileConfig};
use pyramid_common::{discover_tiles, ScanOptions};
use tile_colorizer::{BatchReport, BatchRunner, ColorizeConfig, NormalizationPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "colorize")]
#[command(about = "Colorize NetCDF height tiles into PNG images")]
struct Args {
    /// Tile files to colorize
    #[arg(value_name = "TILE")]
    tiles: Vec<PathBuf>,

    /// Pyramid root to scan for tiles (<root>/<level>/<row>_<column>.<ext>)
    #[arg(long, env = "COLORIZE_ROOT")]
    root: Option<PathBuf>,

    /// Only scan these levels (repeatable or comma separated)
    #[arg(long = "level", env = "COLORIZE_LEVELS", value_delimiter = ',')]
    levels: Vec<u32>,

    /// Extension of source tiles when scanning
    #[arg(long, env = "COLORIZE_SOURCE_EXTENSION")]
    source_extension: Option<String>,

    /// Variable holding the heights
    #[arg(long, env = "COLORIZE_VARIABLE")]
    variable: Option<String>,

    /// Color scale name (built-in, or a style in --style-file)
    #[arg(short = 's', long, env = "COLORIZE_COLOR_SCALE")]
    color_scale: Option<String>,

    /// JSON style file with custom color scales
    #[arg(long, env = "COLORIZE_STYLE_FILE")]
    style_file: Option<PathBuf>,

    /// Normalization: identity, per-tile, global or fixed:<min>:<max>
    #[arg(short, long, env = "COLORIZE_NORMALIZATION")]
    normalization: Option<NormalizationPolicy>,

    /// Extension of written images
    #[arg(long, env = "COLORIZE_IMAGE_EXTENSION")]
    image_extension: Option<String>,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short, long, env = "COLORIZE_WORKERS")]
    workers: Option<usize>,

    /// Stop starting new tiles after the first failure
    #[arg(long, env = "COLORIZE_FAIL_FAST")]
    fail_fast: bool,

    /// Write the batch report as JSON to this file
    #[arg(long, env = "COLORIZE_REPORT")]
    report: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "COLORIZE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "COLORIZE_LOG_LEVEL")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "json", env = "COLORIZE_LOG_FORMAT")]
    log_format: LogFormat,
}

/// Inputs and settings after merging the config file and the command line.
#[derive(Debug)]
struct Plan {
    config: ColorizeConfig,
    tiles: Vec<PathBuf>,
    root: Option<PathBuf>,
    scan: ScanOptions,
    report: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);

    match run(args) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Colorize failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn run(args: Args) -> Result<BatchReport> {
    let file = match &args.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let Plan {
        config,
        mut tiles,
        root,
        scan,
        report: report_path,
    } = merge(args, file)?;

    if let Some(root) = &root {
        let found = discover_tiles(root, &scan)
            .with_context(|| format!("Failed to scan pyramid at {}", root.display()))?;
        info!(
            root = %root.display(),
            levels = ?scan.levels,
            tiles = found.len(),
            "Scanned pyramid"
        );
        tiles.extend(found);
    }
    if tiles.is_empty() {
        warn!("No tiles to colorize");
    }

    let runner = BatchRunner::from_config(&config).context("Invalid colorize configuration")?;
    let report = runner.run(&tiles);

    if let Some(path) = &report_path {
        let json = report.to_json_pretty().context("Failed to serialize report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Wrote batch report");
    }

    Ok(report)
}

/// Combine command-line arguments with the config file; the command line wins.
fn merge(args: Args, file: FileConfig) -> Result<Plan> {
    let Some(normalization) = args.normalization.or(file.normalization) else {
        bail!(
            "A normalization policy is required: --normalization identity|per-tile|global|fixed:<min>:<max>"
        );
    };

    let mut config = ColorizeConfig::new(normalization);
    if let Some(variable) = args.variable.or_else(|| file.variable.clone()) {
        config.variable = variable;
    }
    if let Some(scale) = args.color_scale.or_else(|| file.color_scale.clone()) {
        config.color_scale = scale;
    }
    config.style_file = args.style_file.or_else(|| file.style_file());
    if let Some(ext) = args.image_extension.or_else(|| file.image_extension.clone()) {
        config.image_extension = ext;
    }
    config.workers = args.workers.or(file.workers);
    config.fail_fast = args.fail_fast || file.fail_fast.unwrap_or(false);

    let tiles = if args.tiles.is_empty() {
        file.tiles()
    } else {
        args.tiles
    };
    let root = args.root.or_else(|| file.root());
    if tiles.is_empty() && root.is_none() {
        bail!("No input: pass tile paths or --root");
    }

    let mut scan = ScanOptions::default();
    if let Some(ext) = args.source_extension.or_else(|| file.source_extension.clone()) {
        config.source_extension = ext.clone();
        scan.extension = ext;
    }
    scan.levels = if args.levels.is_empty() {
        file.levels.clone().unwrap_or_default()
    } else {
        args.levels
    };

    Ok(Plan {
        config,
        tiles,
        root,
        scan,
        report: args.report.or_else(|| file.report()),
    })
}
