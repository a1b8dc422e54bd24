//! Wire types for the debug control protocol.
//!
//! The protocol is one JSON object per direction per connection: the client
//! connects, writes a single [`DebugRequest`], and the server writes a single
//! [`DebugResponse`] before closing the socket. There is no framing beyond
//! the connection itself.
//!
//! ```json
//! // Request
//! {"command":"execute","code":"x = 42"}
//! // Response
//! {"status":"success","result":""}
//! ```
//!
//! Field names are verb-stable: `execute` always carries `code`, `set_input`
//! always carries `text`. Unknown extra fields in a request are ignored.

use serde::{Deserialize, Serialize};

/// Default TCP port for the debug control protocol (loopback only).
pub const DEFAULT_DEBUG_PORT: u16 = 8081;

/// A single command sent from a debug client to the session server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugRequest {
    /// Verb selecting the operation (e.g. `"execute"`, `"get_variables"`).
    pub command: String,
    /// Code text; required by the `execute` verb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Input text; required by the `set_input` verb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DebugRequest {
    /// Build a request with no verb-specific fields.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            code: None,
            text: None,
        }
    }

    /// Build an `execute` request for the given code text.
    pub fn execute(code: impl Into<String>) -> Self {
        Self {
            command: "execute".to_string(),
            code: Some(code.into()),
            text: None,
        }
    }

    /// Build a `set_input` request for the given input text.
    pub fn set_input(text: impl Into<String>) -> Self {
        Self {
            command: "set_input".to_string(),
            code: None,
            text: Some(text.into()),
        }
    }
}

/// Response status discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The command completed.
    Success,
    /// The command failed; `message` carries the reason.
    Error,
}

/// A single reply sent from the session server back to a debug client.
///
/// Exactly one response per request, never batched, never partial. Payload
/// fields are verb-specific and omitted when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugResponse {
    /// `success` or `error`.
    pub status: Status,
    /// Captured execution output (`execute` verb).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Variable summaries, one `"name: type"` string per binding
    /// (`get_variables` verb).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<String>>,
    /// Current pending-input buffer (`get_input` verb).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Current output transcript (`get_output` verb).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Human-readable detail: the error reason, or `"pong"` for `ping`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DebugResponse {
    fn bare(status: Status) -> Self {
        Self {
            status,
            result: None,
            variables: None,
            input: None,
            output: None,
            message: None,
        }
    }

    /// A success response with no payload.
    pub fn success() -> Self {
        Self::bare(Status::Success)
    }

    /// A success response carrying an informational message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::bare(Status::Success)
        }
    }

    /// A success response carrying execution output.
    pub fn with_result(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            ..Self::bare(Status::Success)
        }
    }

    /// A success response carrying variable summaries.
    pub fn with_variables(variables: Vec<String>) -> Self {
        Self {
            variables: Some(variables),
            ..Self::bare(Status::Success)
        }
    }

    /// A success response carrying the pending-input buffer.
    pub fn with_input(input: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            ..Self::bare(Status::Success)
        }
    }

    /// A success response carrying the output transcript.
    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::bare(Status::Success)
        }
    }

    /// An error response with the given reason.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::bare(Status::Error)
        }
    }

    /// Returns `true` if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
