//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use annoying_client::config::Config;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A running mock target.
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Requests whose headers were fully received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

/// Start a mock backend that answers every request with 200 and `response`.
pub async fn start_mock_backend(response: &'static str) -> MockBackend {
    start_programmable_backend(move |_path| async move { (200, response.to_string()) }).await
}

/// Start a programmable mock backend. `f` receives the request path and
/// returns the status and body to send.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let paths = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let (hits_task, paths_task) = (hits.clone(), paths.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let hits = hits_task.clone();
                    let paths = paths_task.clone();
                    tokio::spawn(async move {
                        serve_one(socket, f, hits, paths).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, hits, paths }
}

async fn serve_one<F, Fut>(
    mut socket: TcpStream,
    f: Arc<F>,
    hits: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
) where
    F: Fn(String) -> Fut,
    Fut: Future<Output = (u16, String)>,
{
    let Some(path) = read_request_path(&mut socket).await else {
        return;
    };
    hits.fetch_add(1, Ordering::SeqCst);
    paths.lock().unwrap().push(path.clone());

    let (status, body) = f(path).await;
    let status_line = match status {
        200 => "200 OK".to_string(),
        204 => "204 No Content".to_string(),
        404 => "404 Not Found".to_string(),
        500 => "500 Internal Server Error".to_string(),
        503 => "503 Service Unavailable".to_string(),
        other => format!("{} Status", other),
    };
    write_response(&mut socket, &status_line, &body).await;
}

async fn write_response(socket: &mut TcpStream, status_line: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Read until the end of the request head and return the request path.
async fn read_request_path(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
}

/// A configuration pointed at `backend` that favours `/` only.
pub fn config_for(backend: &MockBackend) -> Config {
    Config {
        base_url: backend.base_url(),
        parallel: 1,
        interval: 100,
        index_pct: 100,
        index: "/".to_string(),
        other_uris: Vec::new(),
        ..Config::default()
    }
}

/// Poll `cond` every 20ms until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}
