//! Display implementation for expressions.

use std::fmt;

use crate::ast::{Expression, UnaryOperator};

const ASSIGNMENT_PRECEDENCE: u8 = 1;
const UNARY_PRECEDENCE: u8 = 8;
const POSTFIX_PRECEDENCE: u8 = 9;

fn precedence(expr: &Expression) -> u8 {
    match expr {
        Expression::Assignment { .. } => ASSIGNMENT_PRECEDENCE,
        Expression::Binary { operator, .. } => operator.precedence(),
        Expression::Unary { .. } | Expression::Cast { .. } => UNARY_PRECEDENCE,
        _ => POSTFIX_PRECEDENCE,
    }
}

/// Writes `expr`, parenthesized when it binds looser than `min_precedence`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expression, min_precedence: u8) -> fmt::Result {
    if precedence(expr) < min_precedence {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer { value, .. } => write!(f, "{value}"),
            Self::String { value, .. } => write!(f, "\"{value}\""),
            Self::Boolean { value, .. } => write!(f, "{value}"),
            Self::Null { .. } => write!(f, "null"),
            Self::Identifier { name, .. } => write!(f, "{name}"),
            Self::Discard { .. } => write!(f, "_"),
            Self::This { .. } => write!(f, "this"),
            Self::Reference { order, .. } => write!(f, "{order}"),
            Self::MemberAccess { receiver, name, .. } => {
                write_operand(f, receiver, POSTFIX_PRECEDENCE)?;
                write!(f, ".{name}")
            }
            Self::ElementAccess {
                receiver,
                arguments,
                ..
            } => {
                write_operand(f, receiver, POSTFIX_PRECEDENCE)?;
                write!(f, "[")?;
                write_list(f, arguments)?;
                write!(f, "]")
            }
            Self::Invocation {
                callee, arguments, ..
            } => {
                write_operand(f, callee, POSTFIX_PRECEDENCE)?;
                write!(f, "(")?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            Self::Assignment {
                operator,
                target,
                value,
                ..
            } => {
                write_operand(f, target, POSTFIX_PRECEDENCE)?;
                write!(f, " {} ", operator.symbol())?;
                write_operand(f, value, ASSIGNMENT_PRECEDENCE)
            }
            Self::Binary {
                left,
                operator,
                right,
                ..
            } => {
                let p = operator.precedence();
                write_operand(f, left, p)?;
                write!(f, " {} ", operator.symbol())?;
                write_operand(f, right, p + 1)
            }
            Self::Unary {
                operator, operand, ..
            } => {
                write!(f, "{}", operator.symbol())?;
                write_operand(f, operand, UNARY_PRECEDENCE)
            }
            Self::Cast { ty, operand, .. } => {
                write!(f, "({ty})")?;
                // `(T)-x` would read back as a subtraction
                if matches!(
                    operand.as_ref(),
                    Self::Unary {
                        operator: UnaryOperator::Negate,
                        ..
                    }
                ) {
                    write!(f, "({operand})")
                } else {
                    write_operand(f, operand, UNARY_PRECEDENCE)
                }
            }
        }
    }
}
