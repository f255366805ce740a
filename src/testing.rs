//! Test doubles shared by the unit tests.

use crate::domain::traits::ChatProvider;
use crate::infrastructure::rpc::{ApiTransport, RpcClient, RpcError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Records everything sent to the room.
#[derive(Clone)]
pub struct FakeChat {
    room: String,
    sent: Arc<Mutex<Vec<String>>>,
}

impl FakeChat {
    pub fn new(room: &str) -> Self {
        Self {
            room: room.to_string(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatProvider for FakeChat {
    async fn send_message(&self, content: &str) -> Result<String, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(content.to_string());
        Ok(format!("$event{}", sent.len()))
    }

    async fn send_notification(&self, content: &str) -> Result<(), String> {
        self.sent.lock().unwrap().push(content.to_string());
        Ok(())
    }

    fn room_id(&self) -> String {
        self.room.clone()
    }
}

/// Answers every exchange with the same canned outcome.
#[derive(Clone)]
pub struct FakeTransport {
    reply: Result<String, RpcError>,
    delay: Option<Duration>,
    envelopes: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    pub fn replying(body: &str) -> Self {
        Self {
            reply: Ok(body.to_string()),
            delay: None,
            envelopes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: RpcError) -> Self {
        Self {
            reply: Err(error),
            delay: None,
            envelopes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn envelopes(&self) -> Vec<String> {
        self.envelopes.lock().unwrap().clone()
    }

    pub fn client(&self) -> RpcClient {
        RpcClient::new(Arc::new(self.clone()))
    }
}

#[async_trait]
impl ApiTransport for FakeTransport {
    async fn exchange(&self, envelope: &str) -> Result<String, RpcError> {
        self.envelopes.lock().unwrap().push(envelope.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

/// Serves a single HTTP request on localhost with `body` as a 200 response.
/// Returns the endpoint URL and a handle resolving to the raw request text.
pub async fn serve_once(body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/api.php", listener.local_addr().unwrap());
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            if request_complete(&raw) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&raw).to_string()
    });

    (url, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}
