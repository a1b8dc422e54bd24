//! Core types for the Lumos REPL debug control protocol.
//!
//! A running Lumos host embeds a single shared REPL [`session::Session`]
//! (variable bindings, pending input, output transcript, command history)
//! and exposes it over a small TCP debug protocol served by the
//! `lumos-repl-debug` crate. This crate provides everything both sides
//! share:
//!
//! - [`protocol`]: the JSON request/response wire types
//! - [`session`]: the shared session state and its synchronization
//! - [`meta`]: classification of meta-commands (`clear`, `clear vars`)
//! - [`engine`]: the execution-engine seam and the built-in scratch engine
//! - [`config`]: TOML configuration for the debug server
//! - [`client`]: a synchronous client for the debug protocol

pub mod client;
pub mod config;
pub mod engine;
pub mod meta;
pub mod protocol;
pub mod session;

pub use client::DebugClient;
pub use config::{Config, ConfigOverrides, DebugConfig};
pub use engine::{EngineError, ExecutionEngine, ScratchEngine};
pub use meta::MetaCommand;
pub use protocol::{DebugRequest, DebugResponse, Status};
pub use session::{Binding, Bindings, Session, PROMPT};
