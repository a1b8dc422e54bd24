//! Shared REPL session state.
//!
//! A [`Session`] is the single shared mutable object for the process's
//! lifetime: variable bindings, the pending-input buffer, the output
//! transcript, and the command history. It is read and mutated from both
//! the host application's own loop and the debug server's connection
//! handlers, so every operation goes through one coarse mutex. Callers
//! never see a raw reference to the inner state, and no reader can observe
//! a half-applied update.
//!
//! `execute` classifies meta-commands before touching the engine and holds
//! the lock across the engine call, so concurrent `execute` commands from
//! different connections serialize strictly.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::engine::{EngineError, ExecutionEngine};
use crate::meta::MetaCommand;

/// The REPL prompt marker. An empty transcript renders as the bare prompt.
pub const PROMPT: &str = ">>> ";

/// A single variable binding: the serialized representation of its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    /// Type name (e.g. `"int"`, `"str"`).
    pub type_name: String,
    /// Repr form, as a bare expression would echo it (strings quoted).
    pub repr: String,
    /// Print form (strings unquoted).
    pub display: String,
}

/// Insertion-ordered name → [`Binding`] map.
///
/// Display order is deterministic: first assignment fixes a name's position,
/// re-assignment updates in place. The expected binding count is small, so
/// lookups walk the vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<(String, Binding)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any existing binding in place.
    pub fn set(&mut self, name: &str, binding: Binding) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = binding;
        } else {
            self.entries.push((name.to_string(), binding));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, b)| b)
    }

    pub fn remove(&mut self, name: &str) -> Option<Binding> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(n, b)| (n.as_str(), b))
    }

    /// One `"name: type"` summary per binding, in insertion order; the repr
    /// is appended when short enough to read in a listing.
    pub fn summaries(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(name, binding)| {
                if binding.repr.len() < 50 {
                    format!("{name}: {} = {}", binding.type_name, binding.repr)
                } else {
                    format!("{name}: {}", binding.type_name)
                }
            })
            .collect()
    }
}

struct SessionInner {
    bindings: Bindings,
    input: String,
    output: String,
    history: Vec<String>,
    engine: Box<dyn ExecutionEngine>,
}

/// Shared handle to the session; clones refer to the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    /// Create the session with the engine that will run submitted code.
    pub fn new(engine: Box<dyn ExecutionEngine>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                bindings: Bindings::new(),
                input: String::new(),
                output: PROMPT.to_string(),
                history: Vec::new(),
                engine,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        // A panic mid-operation cannot leave the state torn (every mutation
        // completes before the guard drops), so recover from poisoning.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute command text: meta-commands mutate the session directly,
    /// anything else goes to the engine. Returns the result text for the
    /// caller's response; engine output is also appended to the transcript.
    pub fn execute(&self, code: &str) -> Result<String, EngineError> {
        let mut inner = self.lock();
        inner.push_history(code);
        match MetaCommand::classify(code) {
            Some(MetaCommand::ClearOutput) => {
                debug!("clearing output transcript");
                inner.output = PROMPT.to_string();
                // The result is the now-empty transcript itself; no
                // confirmation text is appended.
                Ok(inner.output.clone())
            }
            Some(MetaCommand::ClearVars) => {
                debug!(count = inner.bindings.len(), "clearing variable bindings");
                inner.bindings.clear();
                // Silent: output and input are untouched.
                Ok(String::new())
            }
            None => inner.run_engine(code),
        }
    }

    /// Variable summaries in insertion order, `"name: type = repr"` style.
    pub fn variable_summaries(&self) -> Vec<String> {
        self.lock().bindings.summaries()
    }

    /// Replace the pending-input buffer.
    pub fn set_input(&self, text: &str) {
        self.lock().input = text.to_string();
    }

    /// The current pending-input buffer, byte-exact.
    pub fn input(&self) -> String {
        self.lock().input.clone()
    }

    /// The current output transcript.
    pub fn output(&self) -> String {
        self.lock().output.clone()
    }

    /// Reset the transcript to the bare prompt. Bindings, input, and
    /// history are untouched.
    pub fn clear_output(&self) {
        self.lock().output = PROMPT.to_string();
    }

    /// Drop all variable bindings. Transcript, input, and history are
    /// untouched. Same effect as the `clear vars` meta-command, minus the
    /// history entry.
    pub fn clear_variables(&self) {
        self.lock().bindings.clear();
    }

    /// Every executed command text, oldest first. Meta-commands are
    /// recorded like ordinary code; `clear` never truncates this.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }
}

impl SessionInner {
    fn push_history(&mut self, code: &str) {
        if !code.is_empty() && self.history.last().map(String::as_str) != Some(code) {
            self.history.push(code.to_string());
        }
    }

    fn run_engine(&mut self, code: &str) -> Result<String, EngineError> {
        let snapshot = self.bindings.clone();
        match self.engine.execute(code, &mut self.bindings) {
            Ok(captured) => {
                self.append_transcript(code, &captured);
                Ok(captured)
            }
            Err(err) => {
                // Rollback: a failed execution never leaves partially
                // applied bindings.
                self.bindings = snapshot;
                self.append_transcript(code, &err.to_string());
                Err(err)
            }
        }
    }

    /// Echo the command and its output into the transcript, ending on a
    /// fresh prompt. The transcript always ends with [`PROMPT`].
    fn append_transcript(&mut self, code: &str, captured: &str) {
        let mut lines = code.lines().map(str::trim).filter(|l| !l.is_empty());
        if let Some(first) = lines.next() {
            self.output.push_str(first);
            self.output.push('\n');
        }
        for line in lines {
            self.output.push_str(PROMPT);
            self.output.push_str(line);
            self.output.push('\n');
        }
        if !captured.is_empty() {
            self.output.push_str(captured);
            if !captured.ends_with('\n') {
                self.output.push('\n');
            }
        }
        self.output.push_str(PROMPT);
    }
}
