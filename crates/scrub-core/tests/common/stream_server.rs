//! Minimal HTTP/1.1 server with scripted routes for integration tests.
//!
//! Each route answers GET and HEAD with a fixed status, optional
//! Content-Type and Location, and either a fixed body or an endless one that
//! imitates a live stream. Every response closes the connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: Option<String>,
    pub location: Option<String>,
    pub body: Vec<u8>,
    /// Stream body chunks until the client hangs up.
    pub endless: bool,
    /// Answer this many requests with 503 before behaving normally.
    pub transient_failures: usize,
}

impl Route {
    pub fn new(status: u16, content_type: &str) -> Self {
        Self {
            status,
            content_type: Some(content_type.to_string()),
            location: None,
            body: b"#EXTM3U\n".to_vec(),
            endless: false,
            transient_failures: 0,
        }
    }

    pub fn without_content_type(status: u16) -> Self {
        Self {
            content_type: None,
            ..Self::new(status, "")
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            location: Some(to.to_string()),
            ..Self::new(302, "text/html")
        }
    }

    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn flaky(mut self, failures: usize) -> Self {
        self.transient_failures = failures;
        self
    }
}

struct RouteState {
    route: Route,
    hits: AtomicUsize,
}

/// Starts a server in a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Unknown paths get 404.
pub fn start(routes: Vec<(&str, Route)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, RouteState>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, route)| {
                (
                    path.to_string(),
                    RouteState {
                        route,
                        hits: AtomicUsize::new(0),
                    },
                )
            })
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, RouteState>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path) = parse_request_line(request);
    let is_head = method.eq_ignore_ascii_case("HEAD");

    let state = match routes.get(path) {
        Some(s) => s,
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Type: text/html\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    };
    let route = &state.route;

    if state.hits.fetch_add(1, Ordering::SeqCst) < route.transient_failures {
        let _ = stream.write_all(
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }

    let mut head = format!("HTTP/1.1 {} {}\r\n", route.status, reason(route.status));
    if let Some(ct) = &route.content_type {
        head.push_str(&format!("Content-Type: {}\r\n", ct));
    }
    if let Some(loc) = &route.location {
        head.push_str(&format!("Location: {}\r\n", loc));
    }
    if !route.endless {
        head.push_str(&format!("Content-Length: {}\r\n", route.body.len()));
    }
    head.push_str("Connection: close\r\n\r\n");
    if stream.write_all(head.as_bytes()).is_err() || is_head {
        return;
    }

    if route.endless {
        let chunk = [0x47u8; 188 * 7];
        for _ in 0..200 {
            if stream.write_all(&chunk).is_err() {
                return;
            }
            thread::sleep(Duration::from_millis(25));
        }
    } else {
        let _ = stream.write_all(&route.body);
    }
}

/// Returns (method, path without query) from the request line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/");
    (method, path)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
