//! In-process stand-in for the Nomad event stream endpoint.
//!
//! Speaks just enough HTTP/1.1 for reqwest: reads the request head, then
//! writes a close-delimited response. Each accepted connection consumes the
//! next scripted [`Reply`]; once the script runs out, connections get an
//! empty stream that stays open.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the fake server does with one connection.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with the given body chunks, written with a short pause between
    /// them. `hold_open` keeps the connection open afterwards until the
    /// client goes away.
    Stream {
        chunks: Vec<String>,
        hold_open: bool,
    },
    /// An empty response with the given status.
    Status(u16),
}

impl Reply {
    pub fn stream(chunks: Vec<String>) -> Self {
        Self::Stream {
            chunks,
            hold_open: true,
        }
    }

    pub fn closing(chunks: Vec<String>) -> Self {
        Self::Stream {
            chunks,
            hold_open: false,
        }
    }
}

/// Request head as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request target, e.g. `/v1/event/stream?topic=Job`.
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub struct FakeNomad {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnects: Arc<AtomicUsize>,
    server: JoinHandle<()>,
}

impl FakeNomad {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let disconnects = Arc::new(AtomicUsize::new(0));
        let replies = Arc::new(Mutex::new(VecDeque::from(replies)));

        let server = {
            let requests = Arc::clone(&requests);
            let disconnects = Arc::clone(&disconnects);
            tokio::spawn(async move {
                loop {
                    let Ok((socket, _)) = listener.accept().await else {
                        return;
                    };
                    let reply = replies
                        .lock()
                        .unwrap()
                        .pop_front()
                        .unwrap_or_else(|| Reply::stream(Vec::new()));
                    let requests = Arc::clone(&requests);
                    let disconnects = Arc::clone(&disconnects);
                    tokio::spawn(async move {
                        serve(socket, reply, requests).await;
                        disconnects.fetch_add(1, Ordering::SeqCst);
                    });
                }
            })
        };

        Self {
            addr,
            requests,
            disconnects,
            server,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Connections that have ended, from either side.
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` requests arrived.
    pub async fn wait_for_requests(&self, count: usize) -> Vec<RecordedRequest> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let requests = self.requests();
                if requests.len() >= count {
                    return requests;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("expected requests to arrive")
    }
}

impl Drop for FakeNomad {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn serve(mut socket: TcpStream, reply: Reply, requests: Arc<Mutex<Vec<RecordedRequest>>>) {
    let Some(request) = read_head(&mut socket).await else {
        return;
    };
    requests.lock().unwrap().push(request);

    match reply {
        Reply::Status(code) => {
            let head = format!(
                "HTTP/1.1 {code} Scripted\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
            let _ = socket.write_all(head.as_bytes()).await;
        }
        Reply::Stream { chunks, hold_open } => {
            let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n";
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for chunk in chunks {
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            if hold_open {
                // Returns once the client closes its side.
                let mut buf = [0u8; 64];
                while matches!(socket.read(&mut buf).await, Ok(n) if n > 0) {}
            }
        }
    }
    let _ = socket.shutdown().await;
}

async fn read_head(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buf[..n]);
    }

    let text = String::from_utf8_lossy(&raw);
    let mut lines = text.split("\r\n");
    let target = lines.next()?.split_whitespace().nth(1)?.to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    Some(RecordedRequest { target, headers })
}
