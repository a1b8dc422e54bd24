//! Shutdown coordination.
//!
//! The coordinator owns the `Running → ShuttingDown → Stopped` lifecycle
//! and the cancellation tokens the accept loop selects on. Termination
//! signals (SIGINT/SIGTERM) are funnelled into [`ShutdownCoordinator::request_shutdown`];
//! a first request begins draining, a second escalates to a forced stop.
//!
//! While an input-capturing context in the host owns keyboard focus, the
//! host sets the suppression flag and interrupts are consumed instead of
//! starting a shutdown. The coordinator knows nothing about the UI beyond
//! this flag.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Lifecycle states of the debug server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Accepting connections.
    Running,
    /// Draining: no new connections, in-flight handlers finishing.
    ShuttingDown,
    /// Fully stopped; session resources released.
    Stopped,
}

const RUNNING: u8 = 0;
const SHUTTING_DOWN: u8 = 1;
const STOPPED: u8 = 2;

/// Coordinates graceful shutdown between signal handlers, the host
/// application, and the accept loop. Shared via `Arc`.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    state: AtomicU8,
    suppress: AtomicBool,
    cancel: CancellationToken,
    force: CancellationToken,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
            suppress: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            force: CancellationToken::new(),
        }
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => Lifecycle::Running,
            SHUTTING_DOWN => Lifecycle::ShuttingDown,
            _ => Lifecycle::Stopped,
        }
    }

    /// Set by the host while an input-capturing context owns focus; a
    /// suppressed interrupt is consumed instead of starting a shutdown.
    pub fn set_interrupt_suppressed(&self, suppressed: bool) {
        self.suppress.store(suppressed, Ordering::SeqCst);
    }

    pub fn interrupt_suppressed(&self) -> bool {
        self.suppress.load(Ordering::SeqCst)
    }

    /// Handle a termination request. Returns `false` when the request was
    /// consumed by the suppression flag; otherwise the first request starts
    /// draining and any further request forces immediate teardown.
    pub fn request_shutdown(&self) -> bool {
        if self.lifecycle() == Lifecycle::Running && self.interrupt_suppressed() {
            return false;
        }
        match self.state.compare_exchange(
            RUNNING,
            SHUTTING_DOWN,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                info!("Shutdown requested; draining debug connections");
                self.cancel.cancel();
            }
            Err(STOPPED) => {}
            Err(_) => {
                info!("Second shutdown request; forcing immediate teardown");
                self.force_shutdown();
            }
        }
        true
    }

    /// Skip the grace period and tear down immediately.
    pub fn force_shutdown(&self) {
        self.force.cancel();
        self.cancel.cancel();
    }

    /// Token cancelled when draining begins.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Token cancelled when a forced stop is requested.
    pub fn force_token(&self) -> CancellationToken {
        self.force.clone()
    }

    /// Recorded by the server once the listener is closed and handlers are
    /// drained (or abandoned).
    pub(crate) fn mark_stopped(&self) {
        self.state.store(STOPPED, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let coordinator = ShutdownCoordinator::new();
        assert_eq!(coordinator.lifecycle(), Lifecycle::Running);
        assert!(!coordinator.interrupt_suppressed());
        assert!(!coordinator.cancel_token().is_cancelled());
    }

    #[test]
    fn first_request_starts_draining() {
        let coordinator = ShutdownCoordinator::new();
        assert!(coordinator.request_shutdown());
        assert_eq!(coordinator.lifecycle(), Lifecycle::ShuttingDown);
        assert!(coordinator.cancel_token().is_cancelled());
        assert!(!coordinator.force_token().is_cancelled());
    }

    #[test]
    fn second_request_forces() {
        let coordinator = ShutdownCoordinator::new();
        assert!(coordinator.request_shutdown());
        assert!(coordinator.request_shutdown());
        assert!(coordinator.force_token().is_cancelled());
    }

    #[test]
    fn suppressed_interrupt_is_consumed() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.set_interrupt_suppressed(true);
        assert!(!coordinator.request_shutdown());
        assert_eq!(coordinator.lifecycle(), Lifecycle::Running);
        assert!(!coordinator.cancel_token().is_cancelled());

        coordinator.set_interrupt_suppressed(false);
        assert!(coordinator.request_shutdown());
        assert_eq!(coordinator.lifecycle(), Lifecycle::ShuttingDown);
    }

    #[test]
    fn suppression_does_not_block_escalation() {
        let coordinator = ShutdownCoordinator::new();
        assert!(coordinator.request_shutdown());
        // Focus changes mid-drain must not swallow the forcing request.
        coordinator.set_interrupt_suppressed(true);
        assert!(coordinator.request_shutdown());
        assert!(coordinator.force_token().is_cancelled());
    }

    #[test]
    fn mark_stopped_is_terminal() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.request_shutdown();
        coordinator.mark_stopped();
        assert_eq!(coordinator.lifecycle(), Lifecycle::Stopped);
        assert!(coordinator.request_shutdown());
        assert_eq!(coordinator.lifecycle(), Lifecycle::Stopped);
    }
}
