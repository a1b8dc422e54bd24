//! Command dispatch.
//!
//! Maps a parsed [`DebugRequest`] to its session operation and builds the
//! one [`DebugResponse`] the connection handler writes back. Required
//! fields are validated before the session is touched, so a malformed
//! command never mutates state. Dispatch is synchronous: the response is
//! not produced until the handler (including any engine call) completes,
//! and the session mutex serializes concurrent `execute`s.

use lumos_repl_core::{DebugRequest, DebugResponse, Session};
use tracing::debug;

/// Dispatch one command against the shared session.
pub fn dispatch(request: &DebugRequest, session: &Session) -> DebugResponse {
    debug!(command = %request.command, "dispatching debug command");

    match request.command.as_str() {
        "ping" => DebugResponse::with_message("pong"),
        "execute" => {
            let Some(code) = request.code.as_deref() else {
                return DebugResponse::error("missing required field: code");
            };
            match session.execute(code) {
                Ok(result) => DebugResponse::with_result(result),
                Err(err) => DebugResponse::error(err.to_string()),
            }
        }
        "get_variables" => DebugResponse::with_variables(session.variable_summaries()),
        "set_input" => {
            let Some(text) = request.text.as_deref() else {
                return DebugResponse::error("missing required field: text");
            };
            session.set_input(text);
            DebugResponse::success()
        }
        "get_input" => DebugResponse::with_input(session.input()),
        "get_output" => DebugResponse::with_output(session.output()),
        "clear_output" => {
            session.clear_output();
            DebugResponse::success()
        }
        other => DebugResponse::error(format!("unknown command: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumos_repl_core::{ScratchEngine, Status, PROMPT};

    fn scratch_session() -> Session {
        Session::new(Box::new(ScratchEngine::new()))
    }

    #[test]
    fn ping_acknowledges_without_touching_session() {
        let session = scratch_session();
        let response = dispatch(&DebugRequest::new("ping"), &session);
        assert!(response.is_success());
        assert_eq!(response.message.as_deref(), Some("pong"));
        assert_eq!(session.output(), PROMPT);
        assert!(session.history().is_empty());
    }

    #[test]
    fn execute_returns_captured_output() {
        let session = scratch_session();
        let response = dispatch(&DebugRequest::execute("print('hi')"), &session);
        assert!(response.is_success());
        assert_eq!(response.result.as_deref(), Some("hi"));
    }

    #[test]
    fn execute_without_code_is_a_validation_error() {
        let session = scratch_session();
        let before_vars = session.variable_summaries();
        let before_output = session.output();

        let response = dispatch(&DebugRequest::new("execute"), &session);
        assert_eq!(response.status, Status::Error);
        assert!(response.message.unwrap().contains("code"));
        assert_eq!(session.variable_summaries(), before_vars);
        assert_eq!(session.output(), before_output);
    }

    #[test]
    fn execute_engine_failure_surfaces_message() {
        let session = scratch_session();
        let response = dispatch(&DebugRequest::execute("missing"), &session);
        assert_eq!(response.status, Status::Error);
        assert!(response.message.unwrap().contains("NameError"));
    }

    #[test]
    fn set_input_without_text_is_a_validation_error() {
        let session = scratch_session();
        let response = dispatch(&DebugRequest::new("set_input"), &session);
        assert_eq!(response.status, Status::Error);
        assert!(response.message.unwrap().contains("text"));
        assert_eq!(session.input(), "");
    }

    #[test]
    fn input_round_trip_through_dispatch() {
        let session = scratch_session();
        let text = "import math\nmath.pi";
        assert!(dispatch(&DebugRequest::set_input(text), &session).is_success());
        let response = dispatch(&DebugRequest::new("get_input"), &session);
        assert_eq!(response.input.as_deref(), Some(text));
    }

    #[test]
    fn get_variables_lists_summaries() {
        let session = scratch_session();
        dispatch(&DebugRequest::execute("x = 42"), &session);
        let response = dispatch(&DebugRequest::new("get_variables"), &session);
        assert_eq!(response.variables.unwrap(), vec!["x: int = 42"]);
    }

    #[test]
    fn clear_output_resets_transcript() {
        let session = scratch_session();
        dispatch(&DebugRequest::execute("print('noise')"), &session);
        assert!(dispatch(&DebugRequest::new("clear_output"), &session).is_success());
        let response = dispatch(&DebugRequest::new("get_output"), &session);
        assert_eq!(response.output.as_deref(), Some(PROMPT));
    }

    #[test]
    fn unknown_verb_names_itself() {
        let session = scratch_session();
        let before_output = session.output();
        let response = dispatch(&DebugRequest::new("bogus"), &session);
        assert_eq!(response.status, Status::Error);
        assert!(response.message.unwrap().contains("bogus"));
        assert_eq!(session.output(), before_output);
    }
}
