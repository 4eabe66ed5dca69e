//! Servers and setup shared by the integration suites.
#![allow(dead_code)]

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Repository `config/` directory.
pub fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config")
}

/// Binds a listener on a random port and runs `serve` on it from a
/// dedicated thread with its own runtime.
fn spawn_on_random_port<F, Fut>(serve: F) -> String
where
    F: FnOnce(tokio::net::TcpListener) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()>,
{
    init_tracing();
    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            serve(listener).await;
        });
    });

    format!("http://{addr}")
}

/// Starts the fake catalog API and returns its base URL.
pub fn spawn_fake_api() -> String {
    spawn_on_random_port(|listener| async move {
        fake_api::run(listener).await.unwrap();
    })
}

/// Starts a server that accepts every connection and closes it without
/// answering. Returns its base URL and the number of accepted connections.
pub fn spawn_dropping_server() -> (String, Arc<AtomicUsize>) {
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    let url = spawn_on_random_port(move |listener| async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });
    (url, accepted)
}

/// Starts a server that answers every connection with a 200 whose body is
/// cut short of its `Content-Length`, then closes the socket.
pub fn spawn_truncating_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    spawn_on_random_port(|listener| async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;
                let head = "HTTP/1.1 200 OK\r\n\
                            content-type: application/json\r\n\
                            content-length: 100\r\n\r\n";
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(br#"{"id":1,"ti"#).await;
                let _ = socket.shutdown().await;
            });
        }
    })
}

/// Starts a server whose every route answers 404 and counts hits.
pub fn spawn_counting_not_found() -> (String, Arc<AtomicUsize>) {
    use axum::{http::StatusCode, Router};

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let url = spawn_on_random_port(move |listener| async move {
        let app = Router::new().fallback(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::NOT_FOUND
            }
        });
        axum::serve(listener, app).await.unwrap();
    });
    (url, hits)
}

/// A base URL on which nothing is listening.
pub fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
