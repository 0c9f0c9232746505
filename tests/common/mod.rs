//! Raw HTTP/1.1 client helpers for integration tests.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use sprig::Config;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Loopback, OS-assigned port, short timeouts.
pub fn local_config() -> Config {
    Config {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        shutdown_grace_ms: 1_000,
        ..Config::default()
    }
}

/// A parsed reply: status code and body text.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

/// Writes `parts` one after another, pausing between them so they arrive as
/// separate reads, then reads until the server closes the connection.
pub async fn exchange(addr: SocketAddr, parts: &[&[u8]]) -> Reply {
    tokio::time::timeout(Duration::from_secs(5), async {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
            stream.write_all(part).await.unwrap();
            stream.flush().await.unwrap();
        }

        let mut raw = Vec::new();
        // A reset after the reply has been read is fine.
        let _ = stream.read_to_end(&mut raw).await;
        parse(&raw)
    })
    .await
    .expect("server did not answer in time")
}

/// Sends a bodiless request with `Connection: close`.
pub async fn request(addr: SocketAddr, method: &str, path: &str) -> Reply {
    let head = format!("{method} {path} HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n");
    exchange(addr, &[head.as_bytes()]).await
}

/// Sends a request with a `Content-Length` body.
pub async fn request_with_body(addr: SocketAddr, method: &str, path: &str, body: &str) -> Reply {
    let raw = format!(
        "{method} {path} HTTP/1.1\r\nHost: test\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    exchange(addr, &[raw.as_bytes()]).await
}

fn parse(raw: &[u8]) -> Reply {
    let text = String::from_utf8_lossy(raw);
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((&text, ""));
    let status = head
        .split(' ')
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or_else(|| panic!("malformed reply: {text:?}"));
    Reply { status, body: body.to_owned() }
}
