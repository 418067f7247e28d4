//! Template tokenizer
//!
//! A state machine over [`Scanner`]s: each state carries an ordered list of
//! `(scanner, next state)` rules and the first scanner that matches wins.
//! Deactivated block kinds simply contribute no rules, so their delimiters
//! fall through to the literal catch-all and render as plain text.

use tracing::trace;

use crate::config::TemplateConfig;
use crate::error::SyntaxError;
use crate::location::location_at;
use crate::scan::Scanner;
use crate::token::{Token, TokenKind};
use crate::toolchain::Toolchain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Literal,
    Content,
    ContentFormat,
    Statement,
    Comment,
    CustomBlockIdentifier,
    CustomBlockContent,
}

pub(crate) struct Tokenizer<'t, T: Toolchain> {
    toolchain: &'t T,
    literal: Vec<(Scanner, State)>,
    content: Vec<(Scanner, State)>,
    content_format: Vec<(Scanner, State)>,
    statement: Vec<(Scanner, State)>,
    comment: Vec<(Scanner, State)>,
    custom_identifier: Vec<(Scanner, State)>,
    custom_content: Vec<(Scanner, State)>,
}

impl<'t, T: Toolchain> Tokenizer<'t, T> {
    pub fn new(config: &TemplateConfig, custom_blocks_active: bool, toolchain: &'t T) -> Self {
        let mut literal = Vec::new();
        let mut literal_stops = Vec::new();

        if config.evaluate_content_blocks {
            literal.push((
                Scanner::delimiter(&config.left_content_delimiter, TokenKind::LeftContentDelimiter),
                State::Content,
            ));
            literal_stops.push(config.left_content_delimiter.clone());
        }
        if config.evaluate_statement_blocks {
            literal.push((
                Scanner::delimiter(
                    &config.left_statement_delimiter,
                    TokenKind::LeftStatementDelimiter,
                ),
                State::Statement,
            ));
            literal_stops.push(config.left_statement_delimiter.clone());
        }
        if config.remove_comment_blocks {
            literal.push((
                Scanner::delimiter(&config.left_comment_delimiter, TokenKind::LeftCommentDelimiter),
                State::Comment,
            ));
            literal_stops.push(config.left_comment_delimiter.clone());
        }
        if custom_blocks_active {
            literal.push((
                Scanner::delimiter(
                    &config.left_custom_block_delimiter,
                    TokenKind::LeftCustomBlockDelimiter,
                ),
                State::CustomBlockIdentifier,
            ));
            literal_stops.push(config.left_custom_block_delimiter.clone());
        }
        literal.push((
            Scanner::literal(literal_stops, TokenKind::Literal, false),
            State::Literal,
        ));

        let content = vec![
            (
                Scanner::delimiter(
                    &config.content_format_delimiter,
                    TokenKind::ContentFormatDelimiter,
                ),
                State::ContentFormat,
            ),
            (
                Scanner::delimiter(
                    &config.right_content_delimiter,
                    TokenKind::RightContentDelimiter,
                ),
                State::Literal,
            ),
            (
                Scanner::snippet(vec![
                    config.content_format_delimiter.clone(),
                    config.right_content_delimiter.clone(),
                ]),
                State::Content,
            ),
        ];

        let content_format = vec![
            (
                Scanner::delimiter(
                    &config.right_content_delimiter,
                    TokenKind::RightContentDelimiter,
                ),
                State::Literal,
            ),
            (
                Scanner::literal(
                    vec![config.right_content_delimiter.clone()],
                    TokenKind::Literal,
                    false,
                ),
                State::ContentFormat,
            ),
        ];

        let statement = vec![
            (
                Scanner::delimiter(
                    &config.right_statement_delimiter,
                    TokenKind::RightStatementDelimiter,
                ),
                State::Literal,
            ),
            (
                Scanner::snippet(vec![config.right_statement_delimiter.clone()]),
                State::Statement,
            ),
        ];

        let comment = vec![
            (
                Scanner::delimiter(
                    &config.right_comment_delimiter,
                    TokenKind::RightCommentDelimiter,
                ),
                State::Literal,
            ),
            (
                Scanner::literal(
                    vec![config.right_comment_delimiter.clone()],
                    TokenKind::Literal,
                    false,
                ),
                State::Comment,
            ),
        ];

        let custom_identifier = vec![
            (
                Scanner::delimiter(
                    &config.custom_block_identifier_delimiter,
                    TokenKind::CustomBlockIdentifierDelimiter,
                ),
                State::CustomBlockContent,
            ),
            (
                Scanner::delimiter(
                    &config.right_custom_block_delimiter,
                    TokenKind::RightCustomBlockDelimiter,
                ),
                State::Literal,
            ),
            (
                Scanner::literal(
                    vec![
                        config.custom_block_identifier_delimiter.clone(),
                        config.right_custom_block_delimiter.clone(),
                    ],
                    TokenKind::Identifier,
                    true,
                ),
                State::CustomBlockIdentifier,
            ),
        ];

        let custom_content = vec![
            (
                Scanner::delimiter(
                    &config.right_custom_block_delimiter,
                    TokenKind::RightCustomBlockDelimiter,
                ),
                State::Literal,
            ),
            (
                Scanner::literal(
                    vec![config.right_custom_block_delimiter.clone()],
                    TokenKind::Literal,
                    false,
                ),
                State::CustomBlockContent,
            ),
        ];

        Self {
            toolchain,
            literal,
            content,
            content_format,
            statement,
            comment,
            custom_identifier,
            custom_content,
        }
    }

    fn rules(&self, state: State) -> &[(Scanner, State)] {
        match state {
            State::Literal => &self.literal,
            State::Content => &self.content,
            State::ContentFormat => &self.content_format,
            State::Statement => &self.statement,
            State::Comment => &self.comment,
            State::CustomBlockIdentifier => &self.custom_identifier,
            State::CustomBlockContent => &self.custom_content,
        }
    }

    pub fn tokenize(&self, template: &str) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        let mut state = State::Literal;
        let mut at = 0;

        while at < template.len() {
            let mut matched = false;
            for (scanner, next) in self.rules(state) {
                if let Some(token) = scanner.scan(self.toolchain, template, at) {
                    trace!(kind = ?token.kind, at, len = token.len, "token");
                    at += token.len;
                    tokens.push(token);
                    state = *next;
                    matched = true;
                    break;
                }
            }
            if !matched {
                return Err(SyntaxError::at(
                    "no template token recognized",
                    location_at(template, at),
                ));
            }
        }

        if state != State::Literal {
            return Err(SyntaxError::at(
                "unexpected end of template",
                location_at(template, at),
            ));
        }
        Ok(tokens)
    }
}
