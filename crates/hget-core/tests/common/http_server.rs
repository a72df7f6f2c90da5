//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of resources: plain files (HEAD and Range GET capable)
//! and module pages answering `terraform-get=1` with an `X-Terraform-Get`
//! header and/or an HTML document. Anything else is 404. Every request line
//! is logged so tests can assert on what was asked.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If false, omit `Accept-Ranges: bytes` header even if ranges work.
    pub advertise_ranges: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            support_ranges: true,
            advertise_ranges: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Resource {
    File(Vec<u8>),
    /// Discovery page. `{base}` in either field is replaced by the server's base URL.
    Module {
        header: Option<String>,
        html: String,
    },
}

/// One logged request: method, request target and the Range header if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logged {
    pub method: String,
    pub target: String,
    pub range: Option<String>,
}

pub struct TestServer {
    listener: TcpListener,
    base: String,
    opts: ServerOptions,
    log: Arc<Mutex<Vec<Logged>>>,
}

impl TestServer {
    pub fn bind(opts: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        Self {
            listener,
            base: format!("http://127.0.0.1:{}/", port),
            opts,
            log: Arc::default(),
        }
    }

    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Serves `routes` (path without leading slash -> resource) in a background
    /// thread until the process exits. Returns the request log.
    pub fn serve(self, routes: Vec<(&str, Resource)>) -> Arc<Mutex<Vec<Logged>>> {
        let routes: HashMap<String, Resource> = routes
            .into_iter()
            .map(|(p, r)| (format!("/{}", p.trim_start_matches('/')), r))
            .collect();
        let routes = Arc::new(routes);
        let base = Arc::new(self.base);
        let log = Arc::clone(&self.log);
        let opts = self.opts;
        let listener = self.listener;
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let base = Arc::clone(&base);
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, &routes, &base, opts, &log));
            }
        });
        self.log
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Resource>,
    base: &str,
    opts: ServerOptions,
    log: &Mutex<Vec<Logged>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let req = parse_request(request);
    log.lock().unwrap().push(req.clone());

    let (path, query) = req.target.split_once('?').unwrap_or((&req.target, ""));
    let response = match routes.get(path) {
        Some(Resource::File(body)) => file_response(&req, body, opts),
        Some(Resource::Module { header, html })
            if req.method == "GET" && query.split('&').any(|p| p == "terraform-get=1") =>
        {
            let mut extra = String::from("Content-Type: text/html; charset=utf-8\r\n");
            if let Some(h) = header {
                extra.push_str(&format!("X-Terraform-Get: {}\r\n", h.replace("{base}", base)));
            }
            reply("200 OK", &extra, html.replace("{base}", base).as_bytes())
        }
        _ => reply("404 Not Found", "", b""),
    };
    let _ = stream.write_all(&response);
}

fn file_response(req: &Logged, body: &[u8], opts: ServerOptions) -> Vec<u8> {
    let total = body.len() as u64;
    let accept_ranges = if opts.advertise_ranges && opts.support_ranges {
        "Accept-Ranges: bytes\r\n"
    } else {
        ""
    };

    if req.method == "HEAD" {
        if !opts.head_allowed {
            return reply("405 Method Not Allowed", "", b"");
        }
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            total, accept_ranges
        );
        return head.into_bytes();
    }
    if req.method != "GET" {
        return reply("405 Method Not Allowed", "", b"");
    }

    let range = req.range.as_deref().and_then(parse_range).filter(|_| opts.support_ranges);
    match range {
        Some((start, end_incl)) => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl {
                let extra = format!("Content-Range: bytes */{}\r\n", total);
                return reply("416 Range Not Satisfiable", &extra, b"");
            }
            let slice = &body[start as usize..=end_incl as usize];
            let extra = format!(
                "Content-Range: bytes {}-{}/{}\r\n{}",
                start, end_incl, total, accept_ranges
            );
            reply("206 Partial Content", &extra, slice)
        }
        None => reply("200 OK", accept_ranges, body),
    }
}

fn reply(status: &str, extra_headers: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        status,
        body.len(),
        extra_headers
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

fn parse_request(request: &str) -> Logged {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_string();
    let target = first.next().unwrap_or("").to_string();
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = Some(value.trim().to_string());
            }
        }
    }
    Logged {
        method,
        target,
        range,
    }
}

/// `bytes=X-Y` or `bytes=X-` as (start, end_inclusive).
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let ranges = value.strip_prefix("bytes=")?;
    let (a, b) = ranges.split_once('-')?;
    let start = a.trim().parse().ok()?;
    let end = if b.trim().is_empty() {
        u64::MAX
    } else {
        b.trim().parse().ok()?
    };
    Some((start, end))
}
