//! Statement parsing.

use super::parser::Parser;
use crate::ast::{Declarator, Statement};
use weave_core::Result;
use weave_lexer::TokenKind;

impl<'a> Parser<'a> {
    /// Parses a statement.
    pub fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek_kind() {
            Some(TokenKind::LeftBrace) => Ok(Statement::Block(self.parse_block()?)),
            Some(TokenKind::Return) => self.parse_return(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::Goto) => self.parse_goto(),
            Some(TokenKind::Semicolon) => {
                let span = self.current_span();
                self.advance();
                Ok(Statement::Empty { span })
            }
            Some(TokenKind::Identifier) if self.check_ahead(1, &TokenKind::Colon) => {
                self.parse_labeled()
            }
            // `T name` starts a local declaration
            Some(TokenKind::Identifier) if self.check_ahead(1, &TokenKind::Identifier) => {
                self.parse_local_declaration()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_return(&mut self) -> Result<Statement> {
        let start = self.expect(&TokenKind::Return)?;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let end = self.expect(&TokenKind::Semicolon)?;

        Ok(Statement::Return {
            value,
            span: start.merge(end),
        })
    }

    fn parse_if(&mut self) -> Result<Statement> {
        let start = self.expect(&TokenKind::If)?;
        self.expect(&TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;

        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_while(&mut self) -> Result<Statement> {
        let start = self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While {
            condition,
            body,
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_goto(&mut self) -> Result<Statement> {
        let start = self.expect(&TokenKind::Goto)?;
        let label = self.expect_identifier()?;
        let end = self.expect(&TokenKind::Semicolon)?;

        Ok(Statement::Goto {
            label,
            span: start.merge(end),
        })
    }

    fn parse_labeled(&mut self) -> Result<Statement> {
        let start = self.current_span();
        let label = self.expect_identifier()?;
        self.expect(&TokenKind::Colon)?;
        let statement = Box::new(self.parse_statement()?);

        Ok(Statement::Labeled {
            label,
            statement,
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_local_declaration(&mut self) -> Result<Statement> {
        let start = self.current_span();
        let ty = self.parse_type()?;
        let mut declarators = Vec::new();

        loop {
            let declarator_start = self.current_span();
            let name = self.expect_identifier()?;
            let initializer = if self.match_token(&TokenKind::Equal) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarators.push(Declarator {
                name,
                initializer,
                span: declarator_start.merge(self.previous_span()),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        let end = self.expect(&TokenKind::Semicolon)?;

        Ok(Statement::LocalDeclaration {
            ty,
            declarators,
            span: start.merge(end),
        })
    }

    fn parse_expression_statement(&mut self) -> Result<Statement> {
        let expression = self.parse_expression()?;
        let end = self.expect(&TokenKind::Semicolon)?;
        let span = expression.span().merge(end);

        Ok(Statement::Expression { expression, span })
    }
}
