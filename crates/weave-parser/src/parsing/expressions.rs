//! Expression parsing with operator precedence.

use super::parser::Parser;
use crate::ast::{AssignmentOperator, BinaryOperator, Expression, UnaryOperator};
use weave_core::{Error, Result};
use weave_lexer::TokenKind;

/// Maps a token to the binary operator it spells, if any.
fn binary_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    let operator = match kind {
        TokenKind::PipePipe => BinaryOperator::Or,
        TokenKind::AmpersandAmpersand => BinaryOperator::And,
        TokenKind::EqualEqual => BinaryOperator::Equal,
        TokenKind::BangEqual => BinaryOperator::NotEqual,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEqual => BinaryOperator::LessEqual,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Modulo,
        _ => return None,
    };
    Some(operator)
}

/// Lowest binary precedence (`||`).
const MIN_BINARY_PRECEDENCE: u8 = 2;

impl<'a> Parser<'a> {
    /// Parses an expression.
    pub fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_assignment()
    }

    /// Parses assignment (`=`, `+=`, `-=`), which is right associative.
    fn parse_assignment(&mut self) -> Result<Expression> {
        let target = self.parse_binary(MIN_BINARY_PRECEDENCE)?;

        let operator = match self.match_tokens(&[
            TokenKind::Equal,
            TokenKind::PlusEqual,
            TokenKind::MinusEqual,
        ]) {
            Some(TokenKind::Equal) => AssignmentOperator::Assign,
            Some(TokenKind::PlusEqual) => AssignmentOperator::AddAssign,
            Some(TokenKind::MinusEqual) => AssignmentOperator::SubtractAssign,
            _ => {
                if let Expression::Discard { span } = target {
                    return Err(Error::Parser(
                        "Discard '_' may only appear as an assignment target".to_string(),
                        span,
                    ));
                }
                return Ok(target);
            }
        };

        let assignable = matches!(
            target,
            Expression::Identifier { .. }
                | Expression::MemberAccess { .. }
                | Expression::ElementAccess { .. }
        ) || (operator == AssignmentOperator::Assign
            && matches!(target, Expression::Discard { .. }));
        if !assignable {
            return Err(Error::Parser(
                "Invalid assignment target".to_string(),
                target.span(),
            ));
        }

        let value = self.parse_assignment()?;
        let span = target.span().merge(value.span());

        Ok(Expression::Assignment {
            operator,
            target: Box::new(target),
            value: Box::new(value),
            span,
        })
    }

    /// Parses left-associative binary operators binding at least as tight as
    /// `min_precedence`.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression> {
        let mut expr = self.parse_unary()?;

        while let Some(operator) = self.peek_kind().and_then(binary_operator) {
            if operator.precedence() < min_precedence {
                break;
            }
            self.advance();

            let right = self.parse_binary(operator.precedence() + 1)?;
            let span = expr.span().merge(right.span());
            expr = Expression::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    /// Parses unary operators and casts.
    pub(crate) fn parse_unary(&mut self) -> Result<Expression> {
        if let Some(op_kind) = self.match_tokens(&[TokenKind::Minus, TokenKind::Bang]) {
            let start = self.previous_span();
            let operator = match op_kind {
                TokenKind::Minus => UnaryOperator::Negate,
                _ => UnaryOperator::Not,
            };
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span());
            return Ok(Expression::Unary {
                operator,
                operand: Box::new(operand),
                span,
            });
        }

        if self.is_cast_ahead() {
            let start = self.expect(&TokenKind::LeftParen)?;
            let ty = self.parse_type()?;
            self.expect(&TokenKind::RightParen)?;
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span());
            return Ok(Expression::Cast {
                ty,
                operand: Box::new(operand),
                span,
            });
        }

        self.parse_postfix()
    }

    /// `(Ident)` is a cast only when followed by something that can start an
    /// operand; otherwise it is a parenthesized identifier.
    fn is_cast_ahead(&self) -> bool {
        if !(self.check(&TokenKind::LeftParen)
            && self.check_ahead(1, &TokenKind::Identifier)
            && self.check_ahead(2, &TokenKind::RightParen))
        {
            return false;
        }

        [
            TokenKind::Identifier,
            TokenKind::Integer,
            TokenKind::String,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::LeftParen,
            TokenKind::This,
            TokenKind::Base,
            TokenKind::Previous,
            TokenKind::Current,
            TokenKind::Final,
            TokenKind::Bang,
        ]
        .iter()
        .any(|kind| self.check_ahead(3, kind))
    }
}
