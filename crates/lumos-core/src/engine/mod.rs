//! Execution-engine seam.
//!
//! The session delegates ordinary code (anything that is not a meta-command)
//! to an [`ExecutionEngine`]. The engine reads and mutates the variable
//! bindings and returns the textual output it captured, or an [`EngineError`]
//! describing the failure. Engines are synchronous: the session holds its
//! lock across the call, so two concurrent `execute` commands serialize
//! strictly and never interleave.
//!
//! The shipping implementation is [`ScratchEngine`], a minimal statement
//! interpreter used by the headless host binary and by tests. Hosts that
//! embed a full interpreter implement this trait and hand the session a box.

mod scratch;

pub use scratch::ScratchEngine;

use thiserror::Error;

use crate::session::Bindings;

/// Errors reported by an execution engine while running submitted code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The code could not be parsed.
    #[error("SyntaxError: {message}")]
    Syntax { message: String },

    /// A referenced name has no binding.
    #[error("NameError: name '{name}' is not defined")]
    Name { name: String },

    /// The code parsed but failed during evaluation.
    #[error("Error: {message}")]
    Eval { message: String },
}

/// Runs code against the session's variable bindings.
///
/// Implementations may mutate `bindings` freely; the session snapshots the
/// bindings before the call and restores them if the engine returns an
/// error, so a failed call never leaves partially-applied assignments.
pub trait ExecutionEngine: Send {
    /// Execute `code`, returning the captured textual output.
    fn execute(&mut self, code: &str, bindings: &mut Bindings) -> Result<String, EngineError>;
}
