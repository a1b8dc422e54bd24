//! Built-in scratch engine.
//!
//! A deliberately small statement interpreter so the headless host binary
//! and the test suite have a working engine without embedding a full
//! interpreter. Supported statements (separated by newlines or `;`):
//!
//! - `name = <literal>`: bind a literal (int, float, bool, string, int list)
//! - `name = other_name`: copy an existing binding
//! - `print(a, b, ...)`: print literals and bound names, space-separated
//! - `del name`: remove a binding
//! - a bare name or literal: echo its repr, REPL style
//!
//! Anything else is a syntax error; referencing an unbound name is a name
//! error. Reprs follow the original REPL's conventions: strings quote with
//! `'`, booleans render as `True`/`False`, lists as `[1, 2, 3]`.

use super::{EngineError, ExecutionEngine};
use crate::session::{Binding, Bindings};

/// Minimal built-in execution engine.
#[derive(Debug, Default)]
pub struct ScratchEngine {
    _private: (),
}

impl ScratchEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionEngine for ScratchEngine {
    fn execute(&mut self, code: &str, bindings: &mut Bindings) -> Result<String, EngineError> {
        let mut lines = Vec::new();
        for raw in code.lines().flat_map(split_statements) {
            let stmt = raw.trim();
            if stmt.is_empty() {
                continue;
            }
            if let Some(line) = run_statement(stmt, bindings)? {
                lines.push(line);
            }
        }
        Ok(lines.join("\n"))
    }
}

/// Execute one statement; `Some` is a line of captured output.
fn run_statement(stmt: &str, bindings: &mut Bindings) -> Result<Option<String>, EngineError> {
    if let Some(args) = stmt.strip_prefix("print(").and_then(|s| s.strip_suffix(')')) {
        let mut parts = Vec::new();
        for arg in split_args(args) {
            let arg = arg.trim();
            if arg.is_empty() {
                continue;
            }
            parts.push(eval_display(arg, bindings)?);
        }
        return Ok(Some(parts.join(" ")));
    }

    if let Some(name) = stmt.strip_prefix("del ") {
        let name = name.trim();
        if bindings.remove(name).is_none() {
            return Err(EngineError::Name {
                name: name.to_string(),
            });
        }
        return Ok(None);
    }

    if let Some((lhs, rhs)) = split_assignment(stmt) {
        let name = lhs.trim();
        if !is_identifier(name) {
            return Err(EngineError::Syntax {
                message: format!("cannot assign to '{name}'"),
            });
        }
        let binding = eval_binding(rhs.trim(), bindings)?;
        bindings.set(name, binding);
        return Ok(None);
    }

    // Bare expression: echo its repr.
    if is_identifier(stmt) {
        let binding = bindings.get(stmt).ok_or_else(|| EngineError::Name {
            name: stmt.to_string(),
        })?;
        return Ok(Some(binding.repr.clone()));
    }
    if let Some(value) = Value::parse_literal(stmt) {
        return Ok(Some(value.repr()));
    }

    Err(EngineError::Syntax {
        message: format!("invalid statement: {stmt}"),
    })
}

/// Evaluate an expression to a fresh binding (literal or name copy).
fn eval_binding(expr: &str, bindings: &Bindings) -> Result<Binding, EngineError> {
    if let Some(value) = Value::parse_literal(expr) {
        return Ok(value.into_binding());
    }
    if is_identifier(expr) {
        return bindings.get(expr).cloned().ok_or_else(|| EngineError::Name {
            name: expr.to_string(),
        });
    }
    Err(EngineError::Syntax {
        message: format!("unsupported expression: {expr}"),
    })
}

/// Evaluate an expression to its print form (strings unquoted).
fn eval_display(expr: &str, bindings: &Bindings) -> Result<String, EngineError> {
    if let Some(value) = Value::parse_literal(expr) {
        return Ok(value.display());
    }
    if is_identifier(expr) {
        return bindings
            .get(expr)
            .map(|b| b.display.clone())
            .ok_or_else(|| EngineError::Name {
                name: expr.to_string(),
            });
    }
    Err(EngineError::Syntax {
        message: format!("unsupported expression: {expr}"),
    })
}

/// A literal value the scratch engine understands.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    IntList(Vec<i64>),
}

impl Value {
    fn parse_literal(text: &str) -> Option<Value> {
        let text = text.trim();
        match text {
            "True" => return Some(Value::Bool(true)),
            "False" => return Some(Value::Bool(false)),
            _ => {}
        }
        if let Ok(n) = text.parse::<i64>() {
            return Some(Value::Int(n));
        }
        if text.contains('.') {
            if let Ok(f) = text.parse::<f64>() {
                return Some(Value::Float(f));
            }
        }
        if text.len() >= 2 {
            for quote in ['\'', '"'] {
                if text.starts_with(quote)
                    && text.ends_with(quote)
                    && !text[1..text.len() - 1].contains(quote)
                {
                    return Some(Value::Str(text[1..text.len() - 1].to_string()));
                }
            }
        }
        if let Some(inner) = text.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let inner = inner.trim();
            if inner.is_empty() {
                return Some(Value::IntList(Vec::new()));
            }
            let mut items = Vec::new();
            for item in inner.split(',') {
                items.push(item.trim().parse::<i64>().ok()?);
            }
            return Some(Value::IntList(items));
        }
        None
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::IntList(_) => "list",
        }
    }

    /// REPL repr: what a bare expression echoes.
    fn repr(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Str(s) => format!("'{s}'"),
            Value::IntList(items) => {
                let inner: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }

    /// Print form: like repr, except strings print without quotes.
    fn display(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.repr(),
        }
    }

    fn into_binding(self) -> Binding {
        Binding {
            type_name: self.type_name().to_string(),
            repr: self.repr(),
            display: self.display(),
        }
    }
}

/// Split a line into `;`-separated statements, respecting string quotes.
fn split_statements(line: &str) -> Vec<String> {
    split_on(line, ';')
}

/// Split print arguments on `,`, respecting string quotes and brackets.
fn split_args(args: &str) -> Vec<String> {
    split_on(args, ',')
}

fn split_on(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for ch in text.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '[' | '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ']' | ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                c if c == separator && depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            },
        }
    }
    parts.push(current);
    parts
}

/// Find a top-level single `=` (not `==`), outside quotes and brackets.
fn split_assignment(stmt: &str) -> Option<(&str, &str)> {
    let bytes = stmt.as_bytes();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'[' | b'(' => depth += 1,
                b']' | b')' => depth = depth.saturating_sub(1),
                b'=' if depth == 0 => {
                    let double = i + 1 < bytes.len() && bytes[i + 1] == b'=';
                    let preceded = i > 0 && matches!(bytes[i - 1], b'=' | b'!' | b'<' | b'>');
                    if double || preceded {
                        i += if double { 2 } else { 1 };
                        continue;
                    }
                    return Some((&stmt[..i], &stmt[i + 1..]));
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut ScratchEngine, bindings: &mut Bindings, code: &str) -> String {
        engine.execute(code, bindings).unwrap()
    }

    #[test]
    fn assigns_literals() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "x = 42");
        run(&mut engine, &mut bindings, "y = 'hello'");
        run(&mut engine, &mut bindings, "z = [1, 2, 3]");
        assert_eq!(bindings.get("x").unwrap().repr, "42");
        assert_eq!(bindings.get("y").unwrap().repr, "'hello'");
        assert_eq!(bindings.get("z").unwrap().repr, "[1, 2, 3]");
        assert_eq!(bindings.get("z").unwrap().type_name, "list");
    }

    #[test]
    fn semicolons_separate_statements() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "x = 42; y = 'hello'; z = [1, 2, 3]");
        assert_eq!(bindings.len(), 3);
    }

    #[test]
    fn semicolon_inside_string_is_preserved() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "s = 'a;b'");
        assert_eq!(bindings.get("s").unwrap().repr, "'a;b'");
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn print_joins_arguments() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "x = 42");
        let out = run(&mut engine, &mut bindings, "print('x is', x)");
        assert_eq!(out, "x is 42");
    }

    #[test]
    fn print_lines_joined_by_newline() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        let out = run(
            &mut engine,
            &mut bindings,
            "print('Line 1'); print('Line 2'); print('Line 3')",
        );
        assert_eq!(out, "Line 1\nLine 2\nLine 3");
    }

    #[test]
    fn bare_name_echoes_repr() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "y = 'hello'");
        assert_eq!(run(&mut engine, &mut bindings, "y"), "'hello'");
    }

    #[test]
    fn reassignment_overwrites() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "x = 1");
        run(&mut engine, &mut bindings, "x = 2");
        assert_eq!(bindings.get("x").unwrap().repr, "2");
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn del_removes_binding() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "x = 1");
        run(&mut engine, &mut bindings, "del x");
        assert!(bindings.get("x").is_none());
    }

    #[test]
    fn unbound_name_is_name_error() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        let err = engine.execute("missing", &mut bindings).unwrap_err();
        assert_eq!(
            err,
            EngineError::Name {
                name: "missing".to_string()
            }
        );
        assert_eq!(err.to_string(), "NameError: name 'missing' is not defined");
    }

    #[test]
    fn garbage_is_syntax_error() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        let err = engine.execute("import math", &mut bindings).unwrap_err();
        assert!(matches!(err, EngineError::Syntax { .. }));
    }

    #[test]
    fn bool_and_float_reprs() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "t = True; f = 2.5; g = 3.0");
        assert_eq!(bindings.get("t").unwrap().repr, "True");
        assert_eq!(bindings.get("f").unwrap().repr, "2.5");
        assert_eq!(bindings.get("g").unwrap().repr, "3.0");
    }

    #[test]
    fn name_copy_assignment() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        run(&mut engine, &mut bindings, "x = 42; y = x");
        assert_eq!(bindings.get("y").unwrap().repr, "42");
    }

    #[test]
    fn comparison_is_not_assignment() {
        let mut engine = ScratchEngine::new();
        let mut bindings = Bindings::new();
        let err = engine.execute("x == 1", &mut bindings).unwrap_err();
        assert!(matches!(err, EngineError::Syntax { .. }));
        assert!(bindings.is_empty());
    }
}
