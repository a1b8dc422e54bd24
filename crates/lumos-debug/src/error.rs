//! Error types for the debug server.

use thiserror::Error;

/// Errors surfaced by [`crate::server::DebugServer`].
///
/// Only `Bind` is fatal to the process (reported at startup). Connection
/// handler failures are logged and never escape the handler task: clients
/// always receive a `status: error` response where one can still be sent.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The debug port could not be bound.
    #[error("failed to bind debug port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },

    /// Listener-level I/O failure.
    #[error("debug server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
