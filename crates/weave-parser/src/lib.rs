//! Parser for the weave declaration language.
//!
//! This crate turns token streams into syntax trees and prints trees back to
//! source. The printer is what the linker uses to emit woven classes.

pub mod ast;
mod display;
mod parsing;

pub use ast::{
    AccessorDecl, AssignmentOperator, BinaryOperator, Block, ClassDecl, Declarator, EventDecl,
    Expression, FieldDecl, LayerDecl, Member, MethodDecl, Parameter, Program, PropertyDecl,
    Statement, UnaryOperator,
};
pub use parsing::Parser;

use weave_core::{Result, Span};
use weave_lexer::{Token, tokenize};

/// Parses a slice of tokens into a program.
///
/// # Errors
/// Returns an error if the token stream contains syntax errors
///
/// # Examples
/// ```
/// use weave_lexer::tokenize;
/// use weave_parser::parse;
///
/// let source = "class Account { int Balance() { return 0; } }";
/// let tokens = tokenize(source).unwrap();
/// let program = parse(&tokens).unwrap();
/// assert_eq!(program.classes.len(), 1);
/// ```
pub fn parse(tokens: &[(Token, Span)]) -> Result<Program> {
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}

/// Tokenizes and parses source text into a program.
///
/// # Errors
/// Returns an error if the source has lexical or syntax errors
pub fn parse_source(source: &str) -> Result<Program> {
    let tokens = tokenize(source)?;
    parse(&tokens)
}

/// Parses a single statement from source text.
///
/// # Errors
/// Returns an error if the source is not exactly one statement
pub fn parse_statement_source(source: &str) -> Result<Statement> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(&tokens);
    let statement = parser.parse_statement()?;
    parser.expect_end()?;
    Ok(statement)
}

/// Parses a single expression from source text.
///
/// # Errors
/// Returns an error if the source is not exactly one expression
pub fn parse_expression_source(source: &str) -> Result<Expression> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(&tokens);
    let expression = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(expression)
}
