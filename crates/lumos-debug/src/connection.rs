//! Per-connection protocol handling.
//!
//! One connection carries exactly one request and one response. The handler
//! reads until a complete JSON object parses, dispatches it, writes the
//! response, and closes the socket. Socket I/O is bounded by the configured
//! timeout and the request size cap; a client that violates either gets an
//! error response where one can still be written, and is dropped.

use std::net::SocketAddr;
use std::time::Duration;

use lumos_repl_core::{DebugRequest, DebugResponse, Session};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::dispatch::dispatch;

const READ_CHUNK: usize = 4096;

/// Per-connection bounds, taken from the debug config at accept time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConnectionLimits {
    pub max_request_bytes: usize,
    pub io_timeout: Duration,
}

/// Serve one connection to completion. Never returns an error: failures are
/// logged and, where the socket still works, reported to the client as an
/// error response.
pub(crate) async fn handle(
    mut stream: TcpStream,
    peer: SocketAddr,
    session: Session,
    limits: ConnectionLimits,
) {
    let request = match read_request(&mut stream, peer, limits).await {
        Ok(Some(request)) => request,
        Ok(None) => return,
        Err(response) => {
            write_response(&mut stream, peer, &response, limits.io_timeout).await;
            return;
        }
    };

    let response = dispatch(&request, &session);
    write_response(&mut stream, peer, &response, limits.io_timeout).await;
}

/// Read until the buffer parses as one JSON request.
///
/// `Ok(None)` means the client connected and went away without sending
/// anything; `Err` carries the error response to send back.
async fn read_request(
    stream: &mut TcpStream,
    peer: SocketAddr,
    limits: ConnectionLimits,
) -> Result<Option<DebugRequest>, DebugResponse> {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match timeout(limits.io_timeout, stream.read(&mut chunk)).await {
            Ok(Ok(n)) => n,
            Ok(Err(err)) => {
                debug!(%peer, error = %err, "read failed");
                return Ok(None);
            }
            Err(_) => {
                warn!(%peer, "client stalled; dropping connection");
                return Err(DebugResponse::error("request read timed out"));
            }
        };

        if n == 0 {
            if buf.trim_ascii().is_empty() {
                // Probe connection: connect-and-close, nothing to answer.
                return Ok(None);
            }
            return Err(DebugResponse::error("incomplete JSON request"));
        }

        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > limits.max_request_bytes {
            warn!(%peer, bytes = buf.len(), "request exceeds size cap");
            return Err(DebugResponse::error(format!(
                "request exceeds {} bytes",
                limits.max_request_bytes
            )));
        }

        match serde_json::from_slice::<DebugRequest>(buf.trim_ascii()) {
            Ok(request) => return Ok(Some(request)),
            Err(err) if err.is_eof() => continue,
            Err(err) => {
                debug!(%peer, error = %err, "malformed request");
                return Err(DebugResponse::error(format!("invalid JSON request: {err}")));
            }
        }
    }
}

async fn write_response(
    stream: &mut TcpStream,
    peer: SocketAddr,
    response: &DebugResponse,
    io_timeout: Duration,
) {
    let body = match serde_json::to_vec(response) {
        Ok(body) => body,
        Err(err) => {
            warn!(%peer, error = %err, "failed to serialize response");
            return;
        }
    };

    match timeout(io_timeout, stream.write_all(&body)).await {
        Ok(Ok(())) => {
            let _ = stream.shutdown().await;
        }
        Ok(Err(err)) => debug!(%peer, error = %err, "failed to write response"),
        Err(_) => warn!(%peer, "client stalled during response write"),
    }
}
