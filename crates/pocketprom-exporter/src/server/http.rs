//! Minimal HTTP/1.1 framing for the scrape endpoint.
//!
//! Only the request line is interpreted; headers are read to drain the
//! socket and then discarded. Responses always carry `Content-Length` and
//! `Connection: close`.

use bytes::{BufMut, Bytes, BytesMut};

use pocketprom_core::exposition::CONTENT_TYPE;

/// The single route this server answers.
pub const METRICS_PATH: &str = "/metrics";

/// Parsed request line. Missing parts are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub version: &'a str,
}

/// Parse the first line of `request` as `METHOD SP TARGET [SP VERSION]`.
pub fn parse_request_line(request: &str) -> RequestLine<'_> {
    let first = request.split(['\r', '\n']).next().unwrap_or_default();
    let mut parts = first.splitn(3, ' ');
    RequestLine {
        method: parts.next().unwrap_or_default(),
        target: parts.next().unwrap_or_default(),
        version: parts.next().unwrap_or_default(),
    }
}

/// Whether `line` ends the header block.
pub fn is_header_terminator(line: &[u8]) -> bool {
    line == b"\r\n" || line == b"\n"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    MethodNotAllowed,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
        }
    }

    pub fn status_line(self) -> &'static str {
        match self {
            Status::Ok => "200 OK",
            Status::NotFound => "404 Not Found",
            Status::MethodNotAllowed => "405 Method Not Allowed",
        }
    }
}

/// What the router decided for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Serve the exposition; `with_body` is false for HEAD.
    Metrics { with_body: bool },
    NotFound,
    MethodNotAllowed,
}

pub fn route(line: &RequestLine<'_>) -> Route {
    let with_body = match line.method {
        "GET" => true,
        "HEAD" => false,
        _ => return Route::MethodNotAllowed,
    };
    if line.target != METRICS_PATH {
        return Route::NotFound;
    }
    Route::Metrics { with_body }
}

#[derive(Debug)]
pub struct Response {
    pub status: Status,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Bytes,
}

impl Response {
    pub fn metrics(body: String) -> Self {
        Self {
            status: Status::Ok,
            headers: vec![("Content-Type", CONTENT_TYPE), ("Cache-Control", "no-cache")],
            body: Bytes::from(body),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            headers: Vec::new(),
            body: Bytes::from_static(b"Not Found"),
        }
    }

    pub fn method_not_allowed() -> Self {
        Self {
            status: Status::MethodNotAllowed,
            headers: vec![("Allow", "GET")],
            body: Bytes::from_static(b"Method Not Allowed"),
        }
    }

    /// Status line, headers, blank line, body.
    pub fn encode(&self) -> Bytes {
        let length = self.body.len().to_string();
        let mut out = BytesMut::with_capacity(128 + self.body.len());
        put_line(&mut out, &["HTTP/1.1 ", self.status.status_line()]);
        for &(k, v) in &self.headers {
            put_line(&mut out, &[k, ": ", v]);
        }
        put_line(&mut out, &["Content-Length: ", length.as_str()]);
        put_line(&mut out, &["Connection: close"]);
        out.put_slice(b"\r\n");
        out.put_slice(&self.body);
        out.freeze()
    }
}

fn put_line(out: &mut BytesMut, parts: &[&str]) {
    for p in parts {
        out.put_slice(p.as_bytes());
    }
    out.put_slice(b"\r\n");
}
