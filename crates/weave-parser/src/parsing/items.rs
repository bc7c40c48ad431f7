//! Class and member declarations.

use super::parser::Parser;
use crate::ast::{
    AccessorDecl, ClassDecl, EventDecl, FieldDecl, LayerDecl, Member, MethodDecl, Parameter,
    PropertyDecl,
};
use weave_core::symbols::{AccessorKind, INDEXER_NAME};
use weave_core::{Error, Result};
use weave_lexer::TokenKind;

impl<'a> Parser<'a> {
    /// Parses `class Name { member* }`.
    pub(crate) fn parse_class(&mut self) -> Result<ClassDecl> {
        let start = self.expect(&TokenKind::Class)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LeftBrace)?;

        let mut members = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            members.push(self.parse_member()?);
        }

        let end = self.expect(&TokenKind::RightBrace)?;

        Ok(ClassDecl {
            name,
            members,
            span: start.merge(end),
        })
    }

    fn parse_member(&mut self) -> Result<Member> {
        let start = self.current_span();
        let layer = self.parse_override_attribute()?;

        if self.match_token(&TokenKind::Event) {
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            let accessors = self.parse_accessors(&[AccessorKind::Add, AccessorKind::Remove])?;
            return Ok(Member::Event(EventDecl {
                layer,
                name,
                ty,
                accessors,
                span: start.merge(self.previous_span()),
            }));
        }

        let ty = self.parse_type()?;

        if self.match_token(&TokenKind::This) {
            self.expect(&TokenKind::LeftBracket)?;
            let parameters = self.parse_parameters(&TokenKind::RightBracket)?;
            if parameters.is_empty() {
                return Err(self.error("Indexer must declare at least one parameter".to_string()));
            }
            let accessors = self.parse_accessors(&[AccessorKind::Get, AccessorKind::Set])?;
            return Ok(Member::Property(PropertyDecl {
                layer,
                name: INDEXER_NAME.to_string(),
                ty,
                parameters,
                is_indexer: true,
                accessors,
                span: start.merge(self.previous_span()),
            }));
        }

        let name = self.expect_identifier()?;

        if self.match_token(&TokenKind::LeftParen) {
            let parameters = self.parse_parameters(&TokenKind::RightParen)?;
            let body = self.parse_block()?;
            return Ok(Member::Method(MethodDecl {
                layer,
                name,
                return_type: ty,
                parameters,
                body,
                span: start.merge(self.previous_span()),
            }));
        }

        if self.check(&TokenKind::LeftBrace) {
            let accessors = self.parse_accessors(&[AccessorKind::Get, AccessorKind::Set])?;
            return Ok(Member::Property(PropertyDecl {
                layer,
                name,
                ty,
                parameters: Vec::new(),
                is_indexer: false,
                accessors,
                span: start.merge(self.previous_span()),
            }));
        }

        if let Some(layer) = layer {
            return Err(Error::Parser(
                format!("Field '{name}' cannot be overridden"),
                layer.span,
            ));
        }

        let initializer = if self.match_token(&TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon)?;

        Ok(Member::Field(FieldDecl {
            name,
            ty,
            initializer,
            span: start.merge(self.previous_span()),
        }))
    }

    /// Parses an optional `[override Layer]` attribute.
    fn parse_override_attribute(&mut self) -> Result<Option<LayerDecl>> {
        if !self.match_token(&TokenKind::LeftBracket) {
            return Ok(None);
        }
        self.expect(&TokenKind::Override)?;
        let layer = self.parse_layer_name()?;
        self.expect(&TokenKind::RightBracket)?;
        Ok(Some(layer))
    }

    /// Parses a parameter list up to and including `close`.
    fn parse_parameters(&mut self, close: &TokenKind) -> Result<Vec<Parameter>> {
        let mut parameters = Vec::new();

        if !self.check(close) {
            loop {
                let start = self.current_span();
                let ty = self.parse_type()?;
                let name = self.expect_identifier()?;
                parameters.push(Parameter {
                    name,
                    ty,
                    span: start.merge(self.previous_span()),
                });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(close)?;
        Ok(parameters)
    }

    /// Parses `{ accessor block ... }`, accepting only the `allowed` kinds.
    fn parse_accessors(&mut self, allowed: &[AccessorKind]) -> Result<Vec<AccessorDecl>> {
        self.expect(&TokenKind::LeftBrace)?;
        let mut accessors: Vec<AccessorDecl> = Vec::new();

        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            let start = self.current_span();
            let keyword = self.expect_identifier()?;
            let kind = allowed
                .iter()
                .copied()
                .find(|kind| kind.keyword() == keyword)
                .ok_or_else(|| Error::Parser(format!("Unexpected accessor '{keyword}'"), start))?;

            if accessors.iter().any(|a| a.kind == kind) {
                return Err(Error::Parser(
                    format!("Duplicate '{keyword}' accessor"),
                    start,
                ));
            }

            let body = self.parse_block()?;
            accessors.push(AccessorDecl {
                kind,
                body,
                span: start.merge(self.previous_span()),
            });
        }

        self.expect(&TokenKind::RightBrace)?;

        if accessors.is_empty() {
            return Err(Error::Parser(
                "Expected at least one accessor".to_string(),
                self.previous_span(),
            ));
        }

        Ok(accessors)
    }
}
