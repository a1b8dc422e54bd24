//! Meta-command classification.
//!
//! Two textual commands are recognized before code reaches the execution
//! engine: `clear` (reset the output transcript) and `clear vars` (drop all
//! variable bindings). Matching is performed on the trimmed, case-folded
//! command text, so `"  CLEAR  "` and `"Clear  Vars"` are meta-commands while
//! `"print('clear')"` is ordinary code. The engine never sees a meta-command.

/// A recognized meta-command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    /// `clear`: empty the output transcript; bindings and input untouched.
    ClearOutput,
    /// `clear vars`: drop all variable bindings; transcript and input untouched.
    ClearVars,
}

impl MetaCommand {
    /// Classify command text, returning `None` for ordinary code.
    pub fn classify(code: &str) -> Option<MetaCommand> {
        let folded = code.trim().to_lowercase();
        if folded == "clear" {
            return Some(MetaCommand::ClearOutput);
        }
        // Tolerate any whitespace run between the two words.
        let mut words = folded.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("clear"), Some("vars"), None) => Some(MetaCommand::ClearVars),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_is_case_insensitive() {
        for code in ["clear", "CLEAR", "Clear", "  clear  ", "\tclear\n"] {
            assert_eq!(
                MetaCommand::classify(code),
                Some(MetaCommand::ClearOutput),
                "{code:?} should classify as ClearOutput"
            );
        }
    }

    #[test]
    fn clear_vars_tolerates_internal_whitespace() {
        for code in [
            "clear vars",
            "CLEAR VARS",
            "Clear Vars",
            "  clear   vars  ",
            "clear\tvars",
        ] {
            assert_eq!(
                MetaCommand::classify(code),
                Some(MetaCommand::ClearVars),
                "{code:?} should classify as ClearVars"
            );
        }
    }

    #[test]
    fn ordinary_code_is_not_classified() {
        for code in [
            "clearvars",
            "clear variables",
            "clear vars now",
            "print('clear')",
            "clear()",
            "x = 'clear vars'",
            "",
            "   ",
        ] {
            assert_eq!(MetaCommand::classify(code), None, "{code:?} should pass through");
        }
    }
}
