//! CORS tile server.
//!
//! A static-file server for pyramid tile directories that adds
//! `Access-Control-Allow-Origin: *` to every response, so a deep-zoom viewer
//! hosted on any origin can fetch tiles from it.

pub mod config;
pub mod error;
pub mod listing;
pub mod paths;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServeError, ServeResult};
pub use paths::canonical_root;
pub use server::{build_router, serve_connections};
