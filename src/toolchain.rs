//! Embedded-language toolchain interface
//!
//! The engine never parses snippet code itself; everything it needs from the
//! embedded language goes through this trait. [`RhaiToolchain`] is the stock
//! implementation; tests substitute their own to pin diagnostic behavior.
//!
//! [`RhaiToolchain`]: crate::RhaiToolchain

use rhai::Dynamic;

/// A problem reported by the toolchain, located in the text that was handed
/// to the call (one-based line and column, columns counting characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDiagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// A failure raised while a compiled unit was executing.
#[derive(Debug)]
pub struct InvokeError {
    pub message: String,
    /// One-based position in the unit source, when the toolchain reports one.
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub cause: Box<dyn std::error::Error + Send + Sync>,
}

/// Everything the engine asks of the embedded language.
pub trait Toolchain {
    /// A compiled, invocable unit.
    type Unit;

    /// Consume whole snippet tokens in `text` starting at byte offset `from`
    /// until one of `stops` (or the end of input) appears at a token
    /// boundary, optionally preceded by whitespace. Whitespace before the
    /// stop is consumed; the stop itself is not.
    ///
    /// Returns the number of bytes consumed, or `None` when no snippet text
    /// precedes the stop.
    fn lex_until(&self, text: &str, from: usize, stops: &[&str]) -> Option<usize>;

    /// Check that `code` parses as a single expression.
    fn check_expression(&self, code: &str) -> Vec<SnippetDiagnostic>;

    /// Check that `body` parses as a self-contained statement sequence.
    fn check_statements(&self, body: &str) -> Vec<SnippetDiagnostic>;

    /// Compile a complete unit.
    fn compile(&self, source: &str) -> Result<Self::Unit, Vec<SnippetDiagnostic>>;

    /// Run a compiled unit with the given named arguments and return its
    /// rendered text.
    fn invoke(&self, unit: &Self::Unit, args: &[(String, Dynamic)]) -> Result<String, InvokeError>;
}
