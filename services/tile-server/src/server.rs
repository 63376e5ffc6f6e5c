//! Router and connection handling.
//!
//! Every response leaves through a layer that sets
//! `Access-Control-Allow-Origin: *`. It wraps all other layers, so the header
//! is present on files, listings, redirects, errors, method rejections and
//! request timeouts alike.

use axum::{
    body::Body,
    extract::{Path as UrlPath, Request, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, LOCATION},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::{
    services::ServeFile, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use crate::error::{ServeError, ServeResult};
use crate::listing::render_listing;
use crate::paths::{resolve, Resolved};

const INDEX_FILE: &str = "index.html";

#[derive(Debug)]
struct ServerState {
    root: PathBuf,
}

/// Build the router serving `root`, which must already be canonical.
pub fn build_router(root: PathBuf, request_timeout: Duration) -> Router {
    let state = Arc::new(ServerState { root });

    Router::new()
        .route("/", get(serve_root))
        .route("/*path", get(serve_path))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
}

async fn serve_root(State(state): State<Arc<ServerState>>, request: Request) -> Response {
    respond(&state, "", request).await
}

async fn serve_path(
    State(state): State<Arc<ServerState>>,
    UrlPath(path): UrlPath<String>,
    request: Request,
) -> Response {
    respond(&state, &path, request).await
}

async fn respond(state: &ServerState, path: &str, request: Request) -> Response {
    match serve(state, path, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn serve(state: &ServerState, path: &str, request: Request) -> ServeResult<Response> {
    match resolve(&state.root, path)? {
        Resolved::File(file) => Ok(serve_file(file, request).await),
        Resolved::Directory(dir) => {
            let uri_path = request.uri().path().to_string();
            if !uri_path.ends_with('/') {
                return redirect_to_slash(&uri_path, request.uri().query());
            }

            let index = dir.join(INDEX_FILE);
            if index.is_file() {
                return Ok(serve_file(index, request).await);
            }

            let html = render_listing(&dir, &uri_path)?;
            Ok((
                StatusCode::OK,
                [(CONTENT_TYPE, "text/html; charset=utf-8")],
                html,
            )
                .into_response())
        }
    }
}

/// Serve a file; content type, ranges and conditional requests are handled
/// by `ServeFile`.
async fn serve_file(file: PathBuf, request: Request) -> Response {
    match ServeFile::new(file).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

fn redirect_to_slash(uri_path: &str, query: Option<&str>) -> ServeResult<Response> {
    let location = match query {
        Some(query) => format!("{}/?{}", uri_path, query),
        None => format!("{}/", uri_path),
    };
    let location = HeaderValue::try_from(location).map_err(|e| {
        ServeError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    Ok((StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response())
}

/// Accept connections until `shutdown` resolves, one task per connection.
///
/// Connections that do not deliver request headers within `idle_timeout`
/// are closed.
pub async fn serve_connections<F>(
    listener: TcpListener,
    app: Router,
    idle_timeout: Duration,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let (stream, remote) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("Shutting down tile server");
                return Ok(());
            }
        };

        let service = TowerToHyperService::new(app.clone());
        tokio::spawn(async move {
            let result = http1::Builder::new()
                .timer(TokioTimer::new())
                .header_read_timeout(idle_timeout)
                .serve_connection(TokioIo::new(stream), service)
                .await;
            if let Err(e) = result {
                debug!(remote = %remote, error = %e, "Connection closed with error");
            }
        });
    }
}
