//! Tokens produced by the template tokenizer

/// What a consumed region of template text means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TokenKind {
    /// Plain text copied to the output.
    Literal,
    /// A span of embedded-language code inside a block.
    EmbeddedSnippet,
    /// A custom block identifier, trimmed of surrounding whitespace.
    Identifier,
    LeftContentDelimiter,
    RightContentDelimiter,
    ContentFormatDelimiter,
    LeftStatementDelimiter,
    RightStatementDelimiter,
    LeftCommentDelimiter,
    RightCommentDelimiter,
    LeftCustomBlockDelimiter,
    RightCustomBlockDelimiter,
    CustomBlockIdentifierDelimiter,
}

/// One token: its kind, its (possibly transformed) value, and the raw
/// region of template text it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Token value; equals the consumed text except where the scanner
    /// transforms it (identifiers are trimmed).
    pub value: String,
    /// Byte offset of the consumed region in the template.
    pub start: usize,
    /// Byte length of the consumed region; can exceed `value.len()`.
    pub len: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, start: usize, len: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
            len,
        }
    }

    /// The raw consumed text, untransformed.
    pub fn raw<'t>(&self, template: &'t str) -> &'t str {
        &template[self.start..self.start + self.len]
    }
}
