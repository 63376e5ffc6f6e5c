//! Tile server binary.
//!
//! Serves a directory over HTTP with `Access-Control-Allow-Origin: *` on
//! every response.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use tile_server::config::{DEFAULT_IDLE_TIMEOUT, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT};
use tile_server::{build_router, canonical_root, serve_connections, ServerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

/// CORS tile server
#[derive(Parser, Debug)]
#[command(name = "tile-server")]
#[command(about = "Serve a tile directory with Access-Control-Allow-Origin: * on every response")]
struct Args {
    /// Directory to serve
    #[arg(short, long, default_value = ".", env = "TILE_SERVER_ROOT")]
    root: PathBuf,

    /// Address to bind
    #[arg(short, long, default_value = "0.0.0.0", env = "TILE_SERVER_BIND")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "TILE_SERVER_PORT")]
    port: u16,

    /// Seconds a connection may stay idle before request headers arrive
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT.as_secs(), env = "TILE_SERVER_IDLE_TIMEOUT")]
    idle_timeout_secs: u64,

    /// Seconds allowed for handling a single request
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(), env = "TILE_SERVER_REQUEST_TIMEOUT")]
    request_timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info", env = "TILE_SERVER_LOG_LEVEL")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "json", env = "TILE_SERVER_LOG_FORMAT")]
    log_format: LogFormat,

    /// Number of worker threads
    #[arg(long, env = "TILE_SERVER_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            root: self.root.clone(),
            bind: self.bind,
            port: self.port,
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }
    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args.server_config()))
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let root = canonical_root(&config.root).context("Invalid root directory")?;
    let app = build_router(root.clone(), config.request_timeout);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        root = %root.display(),
        addr = %addr,
        idle_timeout_secs = config.idle_timeout.as_secs(),
        request_timeout_secs = config.request_timeout.as_secs(),
        "Tile server listening"
    );

    serve_connections(listener, app, config.idle_timeout, shutdown_signal())
        .await
        .context("Server failed")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
}
