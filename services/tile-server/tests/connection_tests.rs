//! End-to-end tests over real TCP connections.

use std::fs;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use tile_server::{build_router, canonical_root, serve_connections};

const IDLE_TIMEOUT: Duration = Duration::from_millis(300);

struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
    _dir: TempDir,
}

async fn start_server() -> RunningServer {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("9")).unwrap();
    fs::write(dir.path().join("9").join("0_0.png"), b"tile").unwrap();

    let root = canonical_root(dir.path()).unwrap();
    let app = build_router(root, Duration::from_secs(5));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve_connections(listener, app, IDLE_TIMEOUT, async move {
        let _ = rx.await;
    }));

    RunningServer {
        addr,
        shutdown,
        handle,
        _dir: dir,
    }
}

async fn stop(server: RunningServer) {
    server.shutdown.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_get_over_tcp_carries_cors_header() {
    let server = start_server().await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /9/0_0.png HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .unwrap()
        .unwrap();

    let response = String::from_utf8_lossy(&raw).to_ascii_lowercase();
    assert!(response.starts_with("http/1.1 200"), "{response}");
    assert!(response.contains("access-control-allow-origin: *"), "{response}");
    assert!(response.ends_with("tile"));

    stop(server).await;
}

#[tokio::test]
async fn test_silent_client_is_disconnected() {
    let server = start_server().await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let started = Instant::now();
    let mut raw = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("connection was not closed by the idle timeout");

    // A clean close or a reset, with at most a 408 written before it
    if read.is_ok() && !raw.is_empty() {
        assert!(raw.starts_with(b"HTTP/1.1 408"), "{:?}", String::from_utf8_lossy(&raw));
    }
    assert!(started.elapsed() >= IDLE_TIMEOUT - Duration::from_millis(50));

    stop(server).await;
}

#[tokio::test]
async fn test_shutdown_stops_accept_loop() {
    let server = start_server().await;
    let addr = server.addr;
    stop(server).await;

    // The listener was dropped with the loop
    assert!(TcpStream::connect(addr).await.is_err());
}
