//! Synchronous client for the debug control protocol.
//!
//! A thin blocking interface for test scripts and external tooling. Each
//! call opens a fresh connection to the loopback debug port, writes one
//! JSON request, half-closes the write side, reads the single JSON response
//! to EOF, and parses it. The protocol is stateless at the connection
//! level, so there is nothing to keep open between calls.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use anyhow::Context;
use tracing::trace;

use crate::protocol::{DebugRequest, DebugResponse};

/// Blocking debug-protocol client.
#[derive(Debug, Clone)]
pub struct DebugClient {
    addr: SocketAddr,
    timeout: Duration,
}

impl DebugClient {
    /// Client for the loopback debug server on `port`, 5 second timeout.
    pub fn new(port: u16) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], port)),
            timeout: Duration::from_secs(5),
        }
    }

    /// Override the connect/read/write timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send one request and return the parsed response.
    ///
    /// # Errors
    ///
    /// Returns an error when the server is unreachable, a socket operation
    /// times out, or the response is not a well-formed [`DebugResponse`].
    /// A `status: error` response is NOT an `Err`; callers inspect
    /// [`DebugResponse::status`].
    pub fn send(&self, request: &DebugRequest) -> anyhow::Result<DebugResponse> {
        trace!(command = %request.command, addr = %self.addr, "sending debug request");
        let mut stream = TcpStream::connect_timeout(&self.addr, self.timeout)
            .with_context(|| format!("Failed to connect to debug server at {}", self.addr))?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        let body = serde_json::to_vec(request).context("Failed to serialize request")?;
        stream
            .write_all(&body)
            .context("Failed to write request")?;
        // Half-close so the server sees EOF even if it reads past the object.
        stream.shutdown(Shutdown::Write)?;

        let mut buf = Vec::new();
        stream
            .read_to_end(&mut buf)
            .context("Failed to read response")?;

        serde_json::from_slice(&buf).context("Failed to parse response")
    }

    /// `ping`: liveness check, no session side effects.
    pub fn ping(&self) -> anyhow::Result<DebugResponse> {
        self.send(&DebugRequest::new("ping"))
    }

    /// `execute`: run code in the shared session.
    pub fn execute(&self, code: &str) -> anyhow::Result<DebugResponse> {
        self.send(&DebugRequest::execute(code))
    }

    /// `get_variables`: list current bindings.
    pub fn get_variables(&self) -> anyhow::Result<DebugResponse> {
        self.send(&DebugRequest::new("get_variables"))
    }

    /// `set_input`: replace the pending-input buffer.
    pub fn set_input(&self, text: &str) -> anyhow::Result<DebugResponse> {
        self.send(&DebugRequest::set_input(text))
    }

    /// `get_input`: read the pending-input buffer.
    pub fn get_input(&self) -> anyhow::Result<DebugResponse> {
        self.send(&DebugRequest::new("get_input"))
    }

    /// `get_output`: read the output transcript.
    pub fn get_output(&self) -> anyhow::Result<DebugResponse> {
        self.send(&DebugRequest::new("get_output"))
    }

    /// `clear_output`: reset the transcript to the bare prompt.
    pub fn clear_output(&self) -> anyhow::Result<DebugResponse> {
        self.send(&DebugRequest::new("clear_output"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_targets_loopback() {
        let client = DebugClient::new(8081);
        assert_eq!(client.addr.to_string(), "127.0.0.1:8081");
    }

    #[test]
    fn send_fails_fast_when_no_server() {
        // Port 1 on loopback is essentially never listening.
        let client = DebugClient::new(1).with_timeout(Duration::from_millis(200));
        assert!(client.ping().is_err());
    }
}
