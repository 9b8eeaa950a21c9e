//! Shared mock origin servers for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// First request line and headers of one received request.
#[allow(dead_code)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl ReceivedRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<ReceivedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    Some(ReceivedRequest {
        method,
        path,
        headers,
    })
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        302 => "302 Found",
        303 => "303 See Other",
        307 => "307 Temporary Redirect",
        404 => "404 Not Found",
        _ => "200 OK",
    }
}

async fn write_response(
    socket: &mut TcpStream,
    status: u16,
    extra_headers: &[(String, String)],
    body: &str,
) {
    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status_line(status),
        body.len()
    );
    for (name, value) in extra_headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    response.push_str(body);

    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Origin that answers `/hop/N` with a relative redirect to `/hop/N+1`
/// until `hops` is reached, then 200 "done".
#[allow(dead_code)]
pub async fn start_redirect_backend(hops: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let n: usize = request
                            .path
                            .strip_prefix("/hop/")
                            .and_then(|s| s.parse().ok())
                            .unwrap_or(0);

                        if n < hops {
                            let location =
                                vec![("Location".to_string(), format!("/hop/{}", n + 1))];
                            write_response(&mut socket, 302, &location, "").await;
                        } else {
                            write_response(&mut socket, 200, &[], "done").await;
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Origin that sets a session cookie on every response and records the
/// Cookie header of each request it receives, in arrival order.
#[allow(dead_code)]
pub async fn start_cookie_backend() -> (SocketAddr, Arc<Mutex<Vec<Option<String>>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let seen = Arc::clone(&seen_clone);
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        seen.lock()
                            .unwrap()
                            .push(request.header("cookie").map(str::to_string));

                        let headers =
                            vec![("Set-Cookie".to_string(), "sid=abc123; Path=/".to_string())];
                        write_response(&mut socket, 200, &headers, r#"{"ok":true}"#).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}
