//! Non-blocking exposition server driven by the host's tick loop.
//!
//! The listening socket never blocks: each [`ExpositionServer::tick`] accepts
//! until the OS reports `WouldBlock`, so the work per tick is bounded by the
//! connections that arrived since the previous tick.
//!
//! Accepted connections are handled synchronously in blocking mode (read
//! headers, respond, close). A client that stalls mid-request would stall the
//! host tick with it; `read_timeout` is a deadline for the whole header
//! block, counted from accept. With no timeout configured the server waits
//! for the client indefinitely.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};

use pocketprom_core::error::{PocketPromError, Result};

use super::http::{self, Response, Route};

/// Header bytes accepted per request before the connection is dropped.
pub const MAX_REQUEST_BYTES: u64 = 8 * 1024;

/// Produces the current exposition text. Called at most once per GET.
pub type Renderer = Box<dyn Fn() -> String + Send>;

/// Bind parameters, usually taken from the `exporter` config section.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub address: String,
    pub port: u16,
    pub backlog: u32,
    pub read_timeout: Option<Duration>,
}

enum State {
    Listening(TcpListener),
    /// Bind failed; terminal for this instance. Holds the reason.
    Failed(String),
    Closed,
}

pub struct ExpositionServer {
    state: State,
    renderer: Renderer,
    read_timeout: Option<Duration>,
}

impl ExpositionServer {
    /// Bind and listen. Never fails: on error the server is left in the
    /// failed state and [`is_ready`](Self::is_ready) stays false.
    pub fn bind(opts: &ServerOptions, renderer: Renderer) -> Self {
        let endpoint = format!("tcp://{}:{}", opts.address, opts.port);
        let state = match listen(opts) {
            Ok(listener) => State::Listening(listener),
            Err(e) => {
                tracing::error!(
                    %endpoint,
                    error = %e,
                    kind = e.kind().as_str(),
                    "failed to start metrics HTTP server"
                );
                State::Failed(e.to_string())
            }
        };
        Self { state, renderer, read_timeout: opts.read_timeout }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Listening(_))
    }

    /// Why binding failed, if it did.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            State::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            State::Listening(l) => l.local_addr().ok(),
            _ => None,
        }
    }

    /// Drain pending connections. Returns how many were answered.
    pub fn tick(&mut self) -> usize {
        let State::Listening(listener) = &self.state else {
            return 0;
        };

        let mut answered = 0;
        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    if serve(stream, peer, self.read_timeout, &self.renderer) {
                        answered += 1;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // Per-connection accept failures (e.g. ECONNABORTED, EMFILE): retry next tick.
                    tracing::debug!(error = %e, "accept failed");
                    break;
                }
            }
        }
        answered
    }

    /// Close the listening socket. Idempotent.
    pub fn shutdown(&mut self) {
        if matches!(self.state, State::Listening(_)) {
            tracing::debug!("metrics HTTP server closed");
        }
        self.state = State::Closed;
    }
}

fn listen(opts: &ServerOptions) -> Result<TcpListener> {
    let endpoint = format!("{}:{}", opts.address, opts.port);
    let bind_err = |source: io::Error| PocketPromError::Bind {
        endpoint: endpoint.clone(),
        source,
    };

    let addr = (opts.address.as_str(), opts.port)
        .to_socket_addrs()
        .map_err(bind_err)?
        .next()
        .ok_or_else(|| {
            bind_err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "address resolved to nothing",
            ))
        })?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(bind_err)?;
    socket.set_reuse_address(true).map_err(bind_err)?;
    socket.bind(&addr.into()).map_err(bind_err)?;
    let backlog = i32::try_from(opts.backlog).unwrap_or(i32::MAX);
    socket.listen(backlog).map_err(bind_err)?;
    socket.set_nonblocking(true).map_err(bind_err)?;
    Ok(socket.into())
}

/// Handle one accepted connection to completion. Returns true if a response
/// was written.
fn serve(
    stream: TcpStream,
    peer: SocketAddr,
    read_timeout: Option<Duration>,
    renderer: &Renderer,
) -> bool {
    let answered = match respond(&stream, read_timeout, renderer) {
        Ok(Some(status)) => {
            tracing::debug!(%peer, status, "scrape answered");
            true
        }
        Ok(None) => {
            tracing::debug!(%peer, "client sent no request");
            false
        }
        Err(e) => {
            tracing::debug!(%peer, error = %e, "scrape connection dropped");
            false
        }
    };
    let _ = stream.shutdown(Shutdown::Both);
    answered
}

fn respond(
    stream: &TcpStream,
    read_timeout: Option<Duration>,
    renderer: &Renderer,
) -> io::Result<Option<u16>> {
    stream.set_nonblocking(false)?;
    stream.set_write_timeout(read_timeout)?;

    // One deadline for the whole header block, not per read.
    let deadline = read_timeout.map(|t| Instant::now() + t);
    let Some(request) = read_request(DeadlineReader { stream, deadline })? else {
        return Ok(None);
    };

    let line = http::parse_request_line(&request);
    let response = match http::route(&line) {
        Route::MethodNotAllowed => Response::method_not_allowed(),
        Route::NotFound => Response::not_found(),
        Route::Metrics { with_body: true } => Response::metrics(renderer()),
        Route::Metrics { with_body: false } => Response::metrics(String::new()),
    };

    let mut writer = stream;
    writer.write_all(&response.encode())?;
    writer.flush()?;
    Ok(Some(response.status.code()))
}

/// Read up to and including the blank line that ends the headers, or until
/// EOF. `Ok(None)` means the client sent nothing at all.
fn read_request(source: DeadlineReader<'_>) -> io::Result<Option<String>> {
    let mut reader = BufReader::new(source.take(MAX_REQUEST_BYTES));
    let mut request = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            if reader.get_ref().limit() == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "request headers too large",
                ));
            }
            break;
        }
        request.extend_from_slice(&line);
        if http::is_header_terminator(&line) {
            break;
        }
    }

    if request.is_empty() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&request).into_owned()))
}

/// Blocking reads that share one absolute deadline. Each read waits only for
/// the time left, so a client trickling bytes cannot extend the wait.
struct DeadlineReader<'a> {
    stream: &'a TcpStream,
    deadline: Option<Instant>,
}

impl Read for DeadlineReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut stream = self.stream;
        let Some(deadline) = self.deadline else {
            stream.set_read_timeout(None)?;
            return stream.read(buf);
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "request read deadline passed"));
        }
        stream.set_read_timeout(Some(remaining))?;
        stream.read(buf)
    }
}
