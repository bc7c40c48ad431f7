//! Core parser structure and helper methods.

use crate::ast::{Block, LayerDecl, Program};
use weave_core::symbols::TypeRef;
use weave_core::{Error, Result, Span};
use weave_lexer::{Token, TokenKind};

/// Parser for weave declaration sources.
pub struct Parser<'a> {
    tokens: &'a [(Token, Span)],
    current: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given token stream.
    pub fn new(tokens: &'a [(Token, Span)]) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses a complete program: an optional layer order followed by classes.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut program = Program::default();

        if self.match_token(&TokenKind::Layers) {
            self.expect(&TokenKind::LeftBrace)?;
            if !self.check(&TokenKind::RightBrace) {
                loop {
                    program.layers.push(self.parse_layer_name()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RightBrace)?;
        }

        while !self.is_at_end() {
            program.classes.push(self.parse_class()?);
        }

        Ok(program)
    }

    /// Parses `Aspect` or `Aspect.Part`.
    pub(crate) fn parse_layer_name(&mut self) -> Result<LayerDecl> {
        let start = self.current_span();
        let aspect = self.expect_identifier()?;
        let part = if self.match_token(&TokenKind::Dot) {
            Some(self.expect_identifier()?)
        } else {
            None
        };

        Ok(LayerDecl {
            aspect,
            part,
            span: start.merge(self.previous_span()),
        })
    }

    /// Parses a type name. Types are plain identifiers (`int`, `void`, `var`).
    pub(crate) fn parse_type(&mut self) -> Result<TypeRef> {
        self.expect_identifier().map(TypeRef::new)
    }

    /// Parses a block of statements.
    pub(crate) fn parse_block(&mut self) -> Result<Block> {
        let start_span = self.expect(&TokenKind::LeftBrace)?;
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        let end_span = self.expect(&TokenKind::RightBrace)?;

        Ok(Block::new(statements, start_span.merge(end_span)))
    }

    /// Fails unless every token was consumed.
    pub fn expect_end(&self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error(format!("Unexpected '{}'", self.peek_text())))
        }
    }

    // ==================== Helper Methods ====================

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    pub(crate) fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.current).map(|(token, _)| &token.kind)
    }

    pub(crate) fn peek_text(&self) -> &str {
        self.tokens
            .get(self.current)
            .map_or("end of input", |(token, _)| token.text.as_str())
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub(crate) fn check_ahead(&self, offset: usize, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.current + offset)
            .is_some_and(|t| &t.0.kind == kind)
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_tokens(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        for kind in kinds {
            if self.check(kind) {
                let matched = kind.clone();
                self.advance();
                return Some(matched);
            }
        }
        None
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Span> {
        if self.check(kind) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.error(format!("Expected '{}', found '{}'", kind, self.peek_text())))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String> {
        if self.check(&TokenKind::Identifier) {
            let name = self.peek_text().to_string();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(format!("Expected identifier, found '{}'", self.peek_text())))
        }
    }

    /// Creates a parser error located at the current token.
    pub(crate) fn error(&self, message: String) -> Error {
        Error::Parser(message, self.current_span())
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.current) {
            Some((_, span)) => *span,
            None => self.tokens.last().map_or_else(Span::default, |(_, span)| {
                Span::from_range(span.end, span.end)
            }),
        }
    }

    pub(crate) fn previous_span(&self) -> Span {
        if self.current > 0 {
            self.tokens[self.current - 1].1
        } else {
            self.current_span()
        }
    }
}
