//! Debug session server for the Lumos REPL.
//!
//! Serves the debug control protocol over loopback TCP: each connection
//! carries exactly one JSON command and receives exactly one JSON response
//! (see [`lumos_repl_core::protocol`]). The server shares a single
//! [`lumos_repl_core::Session`] with the host application and coordinates
//! graceful shutdown with it through a [`ShutdownCoordinator`].

mod connection;
pub mod dispatch;
pub mod error;
pub mod server;
pub mod shutdown;

pub use error::ServerError;
pub use server::DebugServer;
pub use shutdown::{Lifecycle, ShutdownCoordinator};
