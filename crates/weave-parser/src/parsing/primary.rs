//! Primary and postfix expression parsing.

use super::parser::Parser;
use crate::ast::Expression;
use weave_core::{Error, ReferenceOrder, Result};
use weave_lexer::TokenKind;

impl<'a> Parser<'a> {
    /// Parses member access, element access and invocation chains.
    pub(crate) fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(&TokenKind::Dot) {
                let name = self.expect_identifier()?;
                let span = expr.span().merge(self.previous_span());
                expr = Expression::MemberAccess {
                    receiver: Box::new(expr),
                    name,
                    annotation: None,
                    span,
                };
            } else if self.match_token(&TokenKind::LeftBracket) {
                let arguments = self.parse_arguments(&TokenKind::RightBracket)?;
                let span = expr.span().merge(self.previous_span());
                expr = Expression::ElementAccess {
                    receiver: Box::new(expr),
                    arguments,
                    annotation: None,
                    span,
                };
            } else if self.match_token(&TokenKind::LeftParen) {
                let arguments = self.parse_arguments(&TokenKind::RightParen)?;
                let span = expr.span().merge(self.previous_span());
                expr = Expression::Invocation {
                    callee: Box::new(expr),
                    arguments,
                    span,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses a comma separated argument list up to and including `close`.
    fn parse_arguments(&mut self, close: &TokenKind) -> Result<Vec<Expression>> {
        let mut arguments = Vec::new();

        if !self.check(close) {
            loop {
                arguments.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(close)?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let span = self.current_span();

        let Some(kind) = self.peek_kind().cloned() else {
            return Err(self.error("Unexpected end of input".to_string()));
        };

        let expr = match kind {
            TokenKind::Integer => {
                let value = self.peek_text().parse::<i64>().map_err(|_| {
                    Error::Parser(format!("Invalid integer '{}'", self.peek_text()), span)
                })?;
                Expression::Integer { value, span }
            }
            TokenKind::String => {
                let text = self.peek_text();
                let value = text[1..text.len() - 1].to_string();
                Expression::String { value, span }
            }
            TokenKind::True => Expression::Boolean { value: true, span },
            TokenKind::False => Expression::Boolean { value: false, span },
            TokenKind::Null => Expression::Null { span },
            TokenKind::Identifier => Expression::Identifier {
                name: self.peek_text().to_string(),
                span,
            },
            TokenKind::Underscore => Expression::Discard { span },
            TokenKind::This => Expression::This { span },
            TokenKind::Base | TokenKind::Previous | TokenKind::Current | TokenKind::Final => {
                let order = match kind {
                    TokenKind::Base => ReferenceOrder::Base,
                    TokenKind::Previous => ReferenceOrder::Previous,
                    TokenKind::Current => ReferenceOrder::Current,
                    _ => ReferenceOrder::Final,
                };
                if !(self.check_ahead(1, &TokenKind::Dot)
                    || self.check_ahead(1, &TokenKind::LeftBracket))
                {
                    return Err(Error::Parser(
                        format!("'{order}' must be followed by a member or element access"),
                        span,
                    ));
                }
                Expression::Reference { order, span }
            }
            TokenKind::LeftParen => {
                self.advance();
                // Parentheses only group; the printer reinserts them by precedence
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RightParen)?;
                return Ok(inner);
            }
            _ => {
                return Err(self.error(format!(
                    "Expected expression, found '{}'",
                    self.peek_text()
                )));
            }
        };

        self.advance();
        Ok(expr)
    }
}
