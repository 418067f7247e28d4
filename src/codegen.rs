//! Synthesized-unit generation
//!
//! Walks the token stream and appends to a [`SourceMap`], so the unit text
//! and the position map are built in one pass. The unit is a plain script:
//! imports first, then an output accumulator, one append per literal or
//! content block, statement code verbatim, and the accumulator as the final
//! expression.
//!
//! Code from content blocks is checked to be a single expression as it is
//! emitted; after the walk the whole body is checked to parse on its own, so
//! statement blocks cannot smuggle code out of the unit.

use std::collections::BTreeMap;

use tracing::debug;

use crate::blocks::CustomBlock;
use crate::error::{ErrorDetail, SyntaxError};
use crate::eval::{escape_string, escape_string_char};
use crate::location::offset_at;
use crate::map::SourceMap;
use crate::token::{Token, TokenKind};
use crate::toolchain::Toolchain;

pub(crate) struct Generator<'a, T: Toolchain> {
    toolchain: &'a T,
    custom_blocks: &'a BTreeMap<String, Box<dyn CustomBlock>>,
}

impl<'a, T: Toolchain> Generator<'a, T> {
    pub fn new(toolchain: &'a T, custom_blocks: &'a BTreeMap<String, Box<dyn CustomBlock>>) -> Self {
        Self {
            toolchain,
            custom_blocks,
        }
    }

    /// Generate the unit for `tokens`, which must cover `template` exactly.
    pub fn generate(
        &self,
        template: &str,
        tokens: &[Token],
        imports: &[(String, String)],
    ) -> Result<SourceMap, SyntaxError> {
        let mut map = SourceMap::new();
        for (path, alias) in imports {
            map.add_generated_code_from_nil(&format!("import {path:?} as {alias};\n"));
        }
        map.add_generated_code_from_nil("let __out = \"\";\n");
        let body_start = map.generated_code().len();

        let mut iter = tokens.iter();
        while let Some(token) = iter.next() {
            match token.kind {
                TokenKind::Literal => {
                    map.add_generated_code_from_nil("__out += \"");
                    map.add_escaped_user_provided_code(&token.value, escape_string_char);
                    map.add_generated_code_from_nil("\";\n");
                }
                TokenKind::LeftContentDelimiter => {
                    map.add_nil_generating_code(token.raw(template));
                    self.content_block(template, &mut iter, &mut map)?;
                }
                TokenKind::LeftStatementDelimiter => {
                    map.add_nil_generating_code(token.raw(template));
                    self.statement_block(template, &mut iter, &mut map)?;
                }
                TokenKind::LeftCommentDelimiter => {
                    map.add_nil_generating_code(token.raw(template));
                    self.comment_block(template, &mut iter, &mut map)?;
                }
                TokenKind::LeftCustomBlockDelimiter => {
                    map.add_nil_generating_code(token.raw(template));
                    self.custom_block(template, &mut iter, &mut map)?;
                }
                _ => return Err(unexpected(token, &map)),
            }
        }

        let body_end = map.generated_code().len();
        map.add_generated_code_from_nil("\n__out\n");
        self.check_body(&map, body_start, body_end)?;
        debug!(
            bytes = map.generated_code().len(),
            tokens = tokens.len(),
            "unit generated"
        );
        Ok(map)
    }

    fn content_block(
        &self,
        template: &str,
        iter: &mut std::slice::Iter<'_, Token>,
        map: &mut SourceMap,
    ) -> Result<(), SyntaxError> {
        map.add_generated_code_from_nil("__out += __str(");
        let mut has_code = false;
        let mut in_format = false;
        let mut has_format = false;
        for token in iter.by_ref() {
            match token.kind {
                TokenKind::EmbeddedSnippet => {
                    if has_code || in_format || token.value.trim().is_empty() {
                        return Err(unexpected(token, map));
                    }
                    let checked_from = map.generated_code().len();
                    map.add_user_provided_code(&token.value);
                    self.expression_check(&token.value, checked_from, map)?;
                    has_code = true;
                }
                TokenKind::ContentFormatDelimiter => {
                    if in_format {
                        return Err(unexpected(token, map));
                    }
                    in_format = true;
                    map.add_nil_generating_code(token.raw(template));
                    map.add_generated_code_from_nil(", \"");
                }
                TokenKind::Literal => {
                    if !in_format || has_format {
                        return Err(unexpected(token, map));
                    }
                    map.add_escaped_user_provided_code(&token.value, escape_string_char);
                    has_format = true;
                }
                TokenKind::RightContentDelimiter => {
                    if !has_code {
                        return Err(unexpected(token, map));
                    }
                    map.add_nil_generating_code(token.raw(template));
                    if in_format {
                        map.add_generated_code_from_nil("\"");
                    }
                    map.add_generated_code_from_nil(");\n");
                    return Ok(());
                }
                _ => return Err(unexpected(token, map)),
            }
        }
        Ok(())
    }

    fn statement_block(
        &self,
        template: &str,
        iter: &mut std::slice::Iter<'_, Token>,
        map: &mut SourceMap,
    ) -> Result<(), SyntaxError> {
        for token in iter.by_ref() {
            match token.kind {
                TokenKind::EmbeddedSnippet => map.add_user_provided_code(&token.value),
                TokenKind::RightStatementDelimiter => {
                    map.add_nil_generating_code(token.raw(template));
                    // Keeps a trailing line comment in the block from
                    // swallowing the next emitted line.
                    map.add_generated_code_from_nil("\n");
                    return Ok(());
                }
                _ => return Err(unexpected(token, map)),
            }
        }
        Ok(())
    }

    fn comment_block(
        &self,
        template: &str,
        iter: &mut std::slice::Iter<'_, Token>,
        map: &mut SourceMap,
    ) -> Result<(), SyntaxError> {
        for token in iter.by_ref() {
            match token.kind {
                TokenKind::Literal => map.add_nil_generating_code(token.raw(template)),
                TokenKind::RightCommentDelimiter => {
                    map.add_nil_generating_code(token.raw(template));
                    return Ok(());
                }
                _ => return Err(unexpected(token, map)),
            }
        }
        Ok(())
    }

    fn custom_block(
        &self,
        template: &str,
        iter: &mut std::slice::Iter<'_, Token>,
        map: &mut SourceMap,
    ) -> Result<(), SyntaxError> {
        map.add_generated_code_from_nil("__out += ");
        let mut block: Option<&dyn CustomBlock> = None;
        let mut evaluated = false;
        for token in iter.by_ref() {
            match token.kind {
                TokenKind::Identifier => {
                    if block.is_some() || evaluated || token.value.is_empty() {
                        return Err(unexpected(token, map));
                    }
                    match self.custom_blocks.get(&token.value) {
                        Some(handler) => block = Some(handler.as_ref()),
                        None => {
                            let message =
                                format!("unknown custom block identifier {:?}", token.value);
                            let location =
                                map.location_in_generating(map.generating_code().len());
                            return Err(SyntaxError {
                                message: message.clone(),
                                details: vec![ErrorDetail::new(message, location)],
                            });
                        }
                    }
                    map.add_nil_generating_code(token.raw(template));
                }
                TokenKind::CustomBlockIdentifierDelimiter => {
                    if block.is_none() || evaluated {
                        return Err(unexpected(token, map));
                    }
                    map.add_nil_generating_code(token.raw(template));
                }
                TokenKind::Literal => {
                    let Some(handler) = block else {
                        return Err(unexpected(token, map));
                    };
                    if evaluated {
                        return Err(unexpected(token, map));
                    }
                    // The replacement lands inside a string literal, so even
                    // hostile handler output cannot escape into code.
                    let replacement = handler.evaluate(&token.value);
                    map.add_generated_code_from_nil("\"");
                    map.add_translated_code(token.raw(template), &escape_string(&replacement));
                    map.add_generated_code_from_nil("\"");
                    evaluated = true;
                }
                TokenKind::RightCustomBlockDelimiter => {
                    if !evaluated {
                        return Err(unexpected(token, map));
                    }
                    map.add_nil_generating_code(token.raw(template));
                    map.add_generated_code_from_nil(";\n");
                    return Ok(());
                }
                _ => return Err(unexpected(token, map)),
            }
        }
        Ok(())
    }

    fn expression_check(
        &self,
        code: &str,
        checked_from: usize,
        map: &SourceMap,
    ) -> Result<(), SyntaxError> {
        let diagnostics = self.toolchain.check_expression(code);
        if diagnostics.is_empty() {
            return Ok(());
        }
        let details = diagnostics
            .into_iter()
            .map(|d| {
                let offset = checked_from + offset_at(code, d.line, d.column);
                ErrorDetail::new(d.message, map.generating_location(offset))
            })
            .collect();
        Err(SyntaxError {
            message: "content block does not hold a single expression".into(),
            details,
        })
    }

    fn check_body(&self, map: &SourceMap, start: usize, end: usize) -> Result<(), SyntaxError> {
        let body = &map.generated_code()[start..end];
        let diagnostics = self.toolchain.check_statements(body);
        if diagnostics.is_empty() {
            return Ok(());
        }
        let details = diagnostics
            .into_iter()
            .map(|d| {
                let offset = start + offset_at(body, d.line, d.column);
                ErrorDetail::new(d.message, map.generating_location(offset))
            })
            .collect();
        Err(SyntaxError {
            message: "statement blocks do not form a self-contained sequence".into(),
            details,
        })
    }
}

fn unexpected(token: &Token, map: &SourceMap) -> SyntaxError {
    SyntaxError {
        message: "unexpected token".into(),
        details: vec![ErrorDetail::new(
            format!("unexpected {:?} token with value {:?}", token.kind, token.value),
            map.generating_location(map.generated_code().len()),
        )],
    }
}
