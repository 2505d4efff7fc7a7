//! Local HTTP stub answering from a fixed queue of responses

use super::mocks::lock;
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serves one queued `(status, body)` per connection; 404 once the queue is empty
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(responses: Vec<(u16, &str)>) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let mut queue: VecDeque<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let Some(request_line) = read_request(&mut stream).await else {
                    continue;
                };
                lock(&seen).push(request_line);

                let (status, body) = queue.pop_front().unwrap_or((404, String::new()));
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Ok(Self { addr, requests })
    }

    /// Base URL such as `http://127.0.0.1:40123`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request lines received so far, e.g. `POST /messages/send HTTP/1.1`
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let body_len = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + 4 + body_len {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    head.lines().next().map(str::to_string)
}
