//! Rhai toolchain binding
//!
//! Implements [`Toolchain`] on top of a [`rhai::Engine`], including the small
//! snippet lexer used to find where embedded code ends and a template
//! delimiter begins. The lexer only has to group text that could swallow a
//! delimiter (strings, comments, identifiers, numbers); it never interprets
//! the code.

use rhai::{Dynamic, Engine, Scope, AST};

use crate::format::format_value;
use crate::toolchain::{InvokeError, SnippetDiagnostic, Toolchain};

/// The stock toolchain: compiles and runs template units as rhai scripts.
pub struct RhaiToolchain {
    engine: Engine,
}

impl RhaiToolchain {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        // Conversion helpers the synthesized unit calls for content blocks.
        engine.register_fn("__str", |value: Dynamic| value.to_string());
        engine.register_fn("__str", |value: Dynamic, format: &str| {
            format_value(&value, format)
        });
        Self { engine }
    }

    /// The underlying engine, for registering additional functions or types
    /// that templates may call.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

impl Default for RhaiToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolchain for RhaiToolchain {
    type Unit = AST;

    fn lex_until(&self, text: &str, from: usize, stops: &[&str]) -> Option<usize> {
        let mut at = from;
        loop {
            let after = at + whitespace_len(&text[at..]);
            let rest = &text[after..];
            if rest.is_empty() || stops.iter().any(|stop| rest.starts_with(stop)) {
                at = after;
                break;
            }
            at = after + snippet_token_len(rest);
        }
        if at > from {
            Some(at - from)
        } else {
            None
        }
    }

    fn check_expression(&self, code: &str) -> Vec<SnippetDiagnostic> {
        match self.engine.compile_expression(code) {
            Ok(_) => Vec::new(),
            Err(e) => vec![parse_diagnostic(e)],
        }
    }

    fn check_statements(&self, body: &str) -> Vec<SnippetDiagnostic> {
        match self.engine.compile(body) {
            Ok(_) => Vec::new(),
            Err(e) => vec![parse_diagnostic(e)],
        }
    }

    fn compile(&self, source: &str) -> Result<AST, Vec<SnippetDiagnostic>> {
        self.engine.compile(source).map_err(|e| vec![parse_diagnostic(e)])
    }

    fn invoke(&self, unit: &AST, args: &[(String, Dynamic)]) -> Result<String, InvokeError> {
        let mut scope = Scope::new();
        for (name, value) in args {
            scope.push_dynamic(name.clone(), value.clone());
        }
        self.engine
            .eval_ast_with_scope::<String>(&mut scope, unit)
            .map_err(|e| {
                let position = e.position();
                InvokeError {
                    message: e.to_string(),
                    line: position.line(),
                    column: position.position(),
                    cause: e,
                }
            })
    }
}

fn parse_diagnostic(e: rhai::ParseError) -> SnippetDiagnostic {
    SnippetDiagnostic {
        message: e.0.to_string(),
        line: e.1.line().unwrap_or(1),
        column: e.1.position().unwrap_or(1),
    }
}

/// Escape one character for a double-quoted rhai string literal.
///
/// Returns `None` for characters that are embedded verbatim. Raw line
/// terminators (including NEL and the Unicode separators) are escaped so a
/// literal always stays on one source line.
pub(crate) fn escape_string_char(c: char) -> Option<String> {
    match c {
        '"' => Some("\\\"".into()),
        '\\' => Some("\\\\".into()),
        '\n' => Some("\\n".into()),
        '\r' => Some("\\r".into()),
        '\t' => Some("\\t".into()),
        c if (c as u32) < 0x20
            || c == '\u{7f}'
            || c == '\u{85}'
            || c == '\u{2028}'
            || c == '\u{2029}' =>
        {
            Some(format!("\\u{:04x}", c as u32))
        }
        _ => None,
    }
}

/// Escape a whole string for a double-quoted rhai string literal.
pub(crate) fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match escape_string_char(c) {
            Some(escaped) => out.push_str(&escaped),
            None => out.push(c),
        }
    }
    out
}

fn whitespace_len(rest: &str) -> usize {
    rest.char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(rest.len())
}

/// Length in bytes of the snippet token starting at the head of `rest`.
///
/// Total: every position yields a token, single characters as a fallback,
/// so operators and punctuation need no dedicated rules.
fn snippet_token_len(rest: &str) -> usize {
    let first = match rest.chars().next() {
        Some(c) => c,
        None => return 0,
    };
    if rest.starts_with("//") {
        return line_comment_len(rest);
    }
    if rest.starts_with("/*") {
        return block_comment_len(rest);
    }
    match first {
        '"' | '\'' => quoted_len(rest, first),
        '`' => backtick_len(rest),
        c if c.is_ascii_digit() => number_len(rest),
        c if c.is_alphabetic() || c == '_' => ident_len(rest),
        c => c.len_utf8(),
    }
}

/// A `"…"` or `'…'` literal with backslash escapes; unterminated literals
/// run to the end of input.
fn quoted_len(rest: &str, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == quote {
            return i + c.len_utf8();
        }
    }
    rest.len()
}

/// A backtick string; `${…}` interpolations nest braces and may hold
/// quoted strings of their own.
fn backtick_len(rest: &str) -> usize {
    let mut i = 1;
    while i < rest.len() {
        let tail = &rest[i..];
        if tail.starts_with('`') {
            return i + 1;
        }
        if tail.starts_with("${") {
            i += 2;
            let mut depth = 1;
            while i < rest.len() && depth > 0 {
                let inner = &rest[i..];
                if inner.starts_with('{') {
                    depth += 1;
                    i += 1;
                } else if inner.starts_with('}') {
                    depth -= 1;
                    i += 1;
                } else if inner.starts_with('"') || inner.starts_with('\'') {
                    i += quoted_len(inner, inner.chars().next().unwrap_or('"'));
                } else {
                    i += inner.chars().next().map(char::len_utf8).unwrap_or(1);
                }
            }
            continue;
        }
        i += tail.chars().next().map(char::len_utf8).unwrap_or(1);
    }
    rest.len()
}

fn line_comment_len(rest: &str) -> usize {
    rest.find('\n').unwrap_or(rest.len())
}

/// `/* … */` comments nest, like rhai's lexer treats them.
fn block_comment_len(rest: &str) -> usize {
    let mut depth = 1;
    let mut i = 2;
    while i < rest.len() && depth > 0 {
        let tail = &rest[i..];
        if tail.starts_with("/*") {
            depth += 1;
            i += 2;
        } else if tail.starts_with("*/") {
            depth -= 1;
            i += 2;
        } else {
            i += tail.chars().next().map(char::len_utf8).unwrap_or(1);
        }
    }
    i.min(rest.len())
}

fn ident_len(rest: &str) -> usize {
    rest.char_indices()
        .find(|(_, c)| !c.is_alphanumeric() && *c != '_')
        .map(|(i, _)| i)
        .unwrap_or(rest.len())
}

/// A numeric literal. A `.` only joins the number when a digit follows, so
/// range expressions like `0..3` split correctly.
fn number_len(rest: &str) -> usize {
    let b = rest.as_bytes();
    let mut i = 0;
    let prefixed = rest.len() >= 2
        && b[0] == b'0'
        && matches!(b[1], b'x' | b'X' | b'o' | b'O' | b'b' | b'B');
    if prefixed {
        i = 2;
        while i < b.len() && (b[i].is_ascii_alphanumeric() || b[i] == b'_') {
            i += 1;
        }
        return i;
    }
    while i < b.len() && (b[i].is_ascii_digit() || b[i] == b'_') {
        i += 1;
    }
    if i < b.len() && b[i] == b'.' && b.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
        while i < b.len() && (b[i].is_ascii_digit() || b[i] == b'_') {
            i += 1;
        }
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        if j < b.len() && b[j].is_ascii_digit() {
            i = j;
            while i < b.len() && (b[i].is_ascii_digit() || b[i] == b'_') {
                i += 1;
            }
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str, from: usize, stops: &[&str]) -> Option<usize> {
        RhaiToolchain::new().lex_until(text, from, stops)
    }

    #[test]
    fn test_lex_until_stops_at_delimiter() {
        assert_eq!(lex("{{ value }}", 2, &["}}", ":"]), Some(7));
    }

    #[test]
    fn test_lex_until_keeps_delimiter_inside_string() {
        // The `}}` inside the quotes is part of the string token.
        let text = r#"{{ "}}" }}"#;
        assert_eq!(lex(text, 2, &["}}", ":"]), Some(6));
        assert_eq!(&text[2..8], r#" "}}" "#);
    }

    #[test]
    fn test_lex_until_keeps_delimiter_inside_char_literal() {
        assert_eq!(lex("{% '%' %}", 2, &["%}"]), Some(5));
    }

    #[test]
    fn test_lex_until_handles_escaped_quote() {
        let text = r#"{{ "a\"}}" }}"#;
        assert_eq!(lex(text, 2, &["}}", ":"]), Some(9));
    }

    #[test]
    fn test_lex_until_none_when_no_code() {
        assert_eq!(lex("{{}}", 2, &["}}", ":"]), None);
    }

    #[test]
    fn test_lex_until_whitespace_only_counts() {
        assert_eq!(lex("{{ }}", 2, &["}}", ":"]), Some(1));
    }

    #[test]
    fn test_lex_until_runs_to_end_of_input() {
        assert_eq!(lex("{{ 1 + 2", 2, &["}}", ":"]), Some(6));
    }

    #[test]
    fn test_lex_until_nested_block_comment() {
        let text = "{% /* a /* }} */ b */ %}";
        assert_eq!(lex(text, 2, &["%}"]), Some(20));
    }

    #[test]
    fn test_lex_until_line_comment_hides_delimiter_until_newline() {
        let text = "{% // %}\n%}";
        assert_eq!(lex(text, 2, &["%}"]), Some(7));
    }

    #[test]
    fn test_number_does_not_swallow_range() {
        assert_eq!(number_len("0..3"), 1);
        assert_eq!(number_len("12.5e3 "), 6);
        assert_eq!(number_len("0x2a)"), 4);
    }

    #[test]
    fn test_backtick_interpolation_nests() {
        let text = "`a${ {let b = 1; b} }c`";
        assert_eq!(backtick_len(text), text.len());
    }

    #[test]
    fn test_check_expression_accepts_expression() {
        assert!(RhaiToolchain::new().check_expression(" 1 + 2 ").is_empty());
    }

    #[test]
    fn test_check_expression_rejects_statement() {
        let diags = RhaiToolchain::new().check_expression(" let x = 1 ");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 1);
    }

    #[test]
    fn test_check_statements_accepts_sequence() {
        assert!(RhaiToolchain::new()
            .check_statements("let x = 1;\nx += 1;\n")
            .is_empty());
    }

    #[test]
    fn test_check_statements_rejects_unbalanced() {
        assert!(!RhaiToolchain::new().check_statements("}").is_empty());
    }

    #[test]
    fn test_invoke_pushes_arguments() {
        let toolchain = RhaiToolchain::new();
        let unit = toolchain.compile("let __out = \"\";\n__out += __str(x);\n__out\n");
        let unit = unit.expect("compiles");
        let out = toolchain
            .invoke(&unit, &[("x".into(), Dynamic::from(42_i64))])
            .expect("runs");
        assert_eq!(out, "42");
    }

    #[test]
    fn test_invoke_reports_position() {
        let toolchain = RhaiToolchain::new();
        let unit = toolchain.compile("let a = 1;\nmissing_fn(a)\n").expect("compiles");
        let err = toolchain.invoke(&unit, &[]).unwrap_err();
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_escape_string_covers_control_and_separator_chars() {
        assert_eq!(escape_string("a\"b"), "a\\\"b");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
        assert_eq!(escape_string("a\nb\tc"), "a\\nb\\tc");
        assert_eq!(escape_string("a\u{0}b"), "a\\u0000b");
        assert_eq!(escape_string("a\u{2028}b"), "a\\u2028b");
        assert_eq!(escape_string("départ 😀"), "départ 😀");
    }
}
