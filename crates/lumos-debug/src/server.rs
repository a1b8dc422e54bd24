//! The debug server accept loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use lumos_repl_core::{DebugConfig, Session};
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::connection::{self, ConnectionLimits};
use crate::error::ServerError;
use crate::shutdown::ShutdownCoordinator;

/// Serves the debug control protocol on loopback TCP.
///
/// Bind, then `run` until the [`ShutdownCoordinator`] starts draining. The
/// listener only ever binds `127.0.0.1`; there is no way to expose it on
/// another interface.
pub struct DebugServer {
    listener: TcpListener,
    session: Session,
    limits: ConnectionLimits,
    shutdown_grace: Duration,
    coordinator: Arc<ShutdownCoordinator>,
}

impl DebugServer {
    /// Bind the loopback listener. Fails fast when the port is taken so the
    /// operator sees the conflict at startup rather than a dead endpoint.
    pub async fn bind(
        config: &DebugConfig,
        session: Session,
        coordinator: Arc<ShutdownCoordinator>,
    ) -> Result<Self, ServerError> {
        let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                port: config.port,
                source,
            })?;
        info!(addr = %listener.local_addr()?, "debug server listening");

        Ok(Self {
            listener,
            session,
            limits: ConnectionLimits {
                max_request_bytes: config.max_request_bytes,
                io_timeout: config.io_timeout(),
            },
            shutdown_grace: config.shutdown_grace(),
            coordinator,
        })
    }

    /// The bound address. With `port = 0` in the config this is where the
    /// OS actually put the listener.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until draining begins, then wait out in-flight
    /// handlers up to the grace period (or a forced stop).
    pub async fn run(self) -> Result<(), ServerError> {
        let cancel = self.coordinator.cancel_token();
        let force = self.coordinator.force_token();
        let tracker = TaskTracker::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracker.spawn(connection::handle(
                            stream,
                            peer,
                            self.session.clone(),
                            self.limits,
                        ));
                    }
                    Err(err) => {
                        // Transient accept failures (EMFILE and friends)
                        // must not kill the loop.
                        warn!(error = %err, "accept failed");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
            }
        }

        // Stop accepting before draining.
        drop(self.listener);
        tracker.close();

        tokio::select! {
            _ = tracker.wait() => {
                info!("all debug connections drained");
            }
            _ = tokio::time::sleep(self.shutdown_grace) => {
                warn!(
                    remaining = tracker.len(),
                    "shutdown grace period expired; abandoning connections"
                );
            }
            _ = force.cancelled() => {
                warn!(
                    remaining = tracker.len(),
                    "forced shutdown; abandoning connections"
                );
            }
        }

        self.coordinator.mark_stopped();
        info!("debug server shutdown complete");
        Ok(())
    }
}
