//! JSON HTTP API over a bare tokio `TcpListener`.
//!
//! Every connection carries one request and is closed after the response.
//! Routing is a plain function of the parsed [`Request`] so it can be
//! exercised without sockets.

use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::error::{CatchLogError, Result};
use crate::import::parse_records;
use crate::service::CatchService;
use crate::store::CatchStore;

const MAX_HEADERS: usize = 32;
/// Upper bound on one request, headers plus body.
const MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Query helpers
// ---------------------------------------------------------------------------

/// Percent-decoding for URL paths and query values. Multi-byte UTF-8
/// sequences (`%C3%98` → `Ø`) are reassembled before decoding.
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = &bytes[i + 1..i + 3];
                if hex.iter().all(u8::is_ascii_hexdigit) {
                    let h = std::str::from_utf8(hex).unwrap_or("00");
                    out.push(u8::from_str_radix(h, 16).unwrap_or(0));
                    i += 2;
                } else {
                    out.push(b'%');
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse query string into key-value pairs.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let val = parts.next().unwrap_or("");
            Some((url_decode(key), url_decode(val)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn get(target: &str) -> Self {
        Request::new("GET", target, Vec::new())
    }

    pub fn new(method: &str, target: &str, body: Vec<u8>) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, q),
            None => (target, ""),
        };
        Request {
            method: method.to_string(),
            path: path.to_string(),
            query: parse_query(query),
            body,
        }
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CatchLogError::BadRequest(format!("missing query parameter `{}`", key)))
    }
}

/// Outcome of scanning a buffer for a complete request.
#[derive(Debug, PartialEq)]
pub enum Parsed {
    /// Headers or body still incomplete.
    Partial,
    Complete(Request),
}

/// Parse a raw HTTP/1.1 request. The body is taken from `Content-Length`.
pub fn parse_request(buf: &[u8]) -> Result<Parsed> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    let header_len = match req
        .parse(buf)
        .map_err(|e| CatchLogError::BadRequest(e.to_string()))?
    {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial => return Ok(Parsed::Partial),
    };

    let content_length = req
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-length"))
        .map(|h| {
            std::str::from_utf8(h.value)
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .ok_or_else(|| CatchLogError::BadRequest("invalid Content-Length".into()))
        })
        .transpose()?
        .unwrap_or(0);

    // Bounds header_len + content_length below.
    if content_length > MAX_REQUEST_BYTES.saturating_sub(header_len) {
        return Err(CatchLogError::PayloadTooLarge(MAX_REQUEST_BYTES));
    }

    if buf.len() < header_len + content_length {
        return Ok(Parsed::Partial);
    }

    let method = req.method.unwrap_or("GET");
    let target = req.path.unwrap_or("/");
    Ok(Parsed::Complete(Request::new(
        method,
        target,
        buf[header_len..header_len + content_length].to_vec(),
    )))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Response { status, body },
            Err(e) => Response::error(500, &e.to_string()),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Response {
            status,
            body: json!({ "error": message }).to_string(),
        }
    }

    fn from_result<T: Serialize>(status: u16, result: Result<T>) -> Self {
        match result {
            Ok(value) => Response::json(status, &value),
            Err(e) => {
                if e.status_code() >= 500 {
                    warn!(error = %e, "request failed");
                }
                Response::error(e.status_code(), &e.to_string())
            }
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            201 => "Created",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            413 => "Payload Too Large",
            _ => "Internal Server Error",
        }
    }

    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nAccess-Control-Allow-Origin: *\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.body.len(),
            self.body
        )
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

pub fn route<S: CatchStore>(req: &Request, service: &CatchService<S>) -> Response {
    let method = req.method.as_str();
    match (method, req.path.as_str()) {
        ("GET", "/health") => Response::json(200, &json!({ "status": "ok" })),

        ("GET", "/api/data") => match req.query.get("name") {
            Some(name) => Response::from_result(200, service.find_by_name(name)),
            None => Response::from_result(200, service.find_all()),
        },
        ("POST", "/api/data") => {
            let saved = parse_records(Cursor::new(&req.body)).and_then(|records| service.save_all(&records));
            Response::from_result(201, saved)
        }

        ("GET", "/api/fish") => Response::from_result(200, service.store().find_all_fish()),
        ("POST", "/api/fish/convert") => Response::from_result(
            200,
            service
                .convert_data_to_fish()
                .map(|converted| json!({ "converted": converted })),
        ),

        ("GET", "/api/best-weeks") => Response::from_result(
            200,
            req.require("species").and_then(|s| service.best_weeks_by_year(s)),
        ),
        ("GET", "/api/best-weeks/all-time") => Response::from_result(
            200,
            req.require("species").and_then(|s| service.best_weeks_all_time(s)),
        ),
        ("GET", "/api/best-weeks/rolling") => Response::from_result(
            200,
            req.require("species").and_then(|s| service.best_rolling_periods(s)),
        ),
        ("GET", "/api/yearly") => Response::from_result(
            200,
            req.require("species").and_then(|s| service.yearly_summaries(s)),
        ),

        ("GET", path) if path.starts_with("/api/anglers/") => {
            let name = url_decode(&path["/api/anglers/".len()..]);
            if name.is_empty() {
                return Response::error(404, "not found");
            }
            Response::from_result(
                200,
                req.require("species")
                    .and_then(|s| service.find_by_name_and_species(&name, s)),
            )
        }

        (_, "/health" | "/api/data" | "/api/fish" | "/api/fish/convert" | "/api/best-weeks"
        | "/api/best-weeks/all-time" | "/api/best-weeks/rolling" | "/api/yearly") => {
            Response::error(405, "method not allowed")
        }
        (_, path) if path.len() > "/api/anglers/".len() && path.starts_with("/api/anglers/") => {
            Response::error(405, "method not allowed")
        }
        _ => Response::error(404, "not found"),
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Bind `127.0.0.1:port` and serve until the process is stopped.
pub async fn serve<S: CatchStore + 'static>(port: u16, service: Arc<CatchService<S>>) -> Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    serve_on(listener, service).await
}

/// Serve on an already-bound listener.
pub async fn serve_on<S: CatchStore + 'static>(
    listener: TcpListener,
    service: Arc<CatchService<S>>,
) -> Result<()> {
    info!(addr = %listener.local_addr()?, "catch-log API listening");

    loop {
        let (stream, addr) = listener.accept().await?;
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, service).await {
                warn!(%addr, error = %e, "connection error");
            }
        });
    }
}

async fn read_request(stream: &mut TcpStream) -> Result<Option<Request>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > MAX_REQUEST_BYTES {
            return Err(CatchLogError::PayloadTooLarge(MAX_REQUEST_BYTES));
        }
        if let Parsed::Complete(req) = parse_request(&buf)? {
            return Ok(Some(req));
        }
    }
}

async fn handle_connection<S: CatchStore + 'static>(
    mut stream: TcpStream,
    service: Arc<CatchService<S>>,
) -> Result<()> {
    let response = match read_request(&mut stream).await {
        Ok(Some(req)) => {
            debug!(method = %req.method, path = %req.path, "request");
            // Store access is blocking (sqlite); keep it off the async workers.
            tokio::task::spawn_blocking(move || route(&req, &service))
                .await
                .unwrap_or_else(|e| Response::error(500, &e.to_string()))
        }
        Ok(None) => return Ok(()),
        Err(e) => Response::error(e.status_code(), &e.to_string()),
    };

    stream.write_all(response.to_http().as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
