//! Region scanners used by the tokenizer
//!
//! A scanner inspects the template at one position and either produces a
//! token or declines. Which scanners run, and in which order, depends on the
//! tokenizer state.

use crate::token::{Token, TokenKind};
use crate::toolchain::Toolchain;

#[derive(Debug, Clone)]
pub(crate) enum Scanner {
    /// Matches an exact delimiter string.
    Delimiter { text: String, kind: TokenKind },
    /// Consumes text up to (not including) the nearest stop delimiter, or
    /// the end of input. Declines on an empty match.
    Literal {
        stops: Vec<String>,
        kind: TokenKind,
        trim: bool,
    },
    /// Consumes an embedded-code span bounded by stop delimiters, using the
    /// toolchain's lexer so delimiters inside string literals or comments
    /// don't end the span.
    Snippet { stops: Vec<String> },
}

impl Scanner {
    pub fn delimiter(text: &str, kind: TokenKind) -> Self {
        Self::Delimiter {
            text: text.to_owned(),
            kind,
        }
    }

    pub fn literal(stops: Vec<String>, kind: TokenKind, trim: bool) -> Self {
        Self::Literal { stops, kind, trim }
    }

    pub fn snippet(stops: Vec<String>) -> Self {
        Self::Snippet { stops }
    }

    pub fn scan<T: Toolchain>(&self, toolchain: &T, template: &str, at: usize) -> Option<Token> {
        match self {
            Self::Delimiter { text, kind } => {
                if template[at..].starts_with(text.as_str()) {
                    Some(Token::new(*kind, text.clone(), at, text.len()))
                } else {
                    None
                }
            }
            Self::Literal { stops, kind, trim } => {
                let rest = &template[at..];
                let end = stops
                    .iter()
                    .filter_map(|stop| rest.find(stop.as_str()))
                    .min()
                    .unwrap_or(rest.len());
                if end == 0 {
                    return None;
                }
                let raw = &rest[..end];
                let value = if *trim { raw.trim() } else { raw };
                Some(Token::new(*kind, value, at, end))
            }
            Self::Snippet { stops } => {
                let stops: Vec<&str> = stops.iter().map(String::as_str).collect();
                let len = toolchain.lex_until(template, at, &stops)?;
                Some(Token::new(
                    TokenKind::EmbeddedSnippet,
                    &template[at..at + len],
                    at,
                    len,
                ))
            }
        }
    }
}
