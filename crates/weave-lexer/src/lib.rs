//! Lexical analysis for the weave declaration language.
//!
//! This crate turns source text describing a layer order and the woven
//! classes into a stream of tokens.

mod token;

pub use token::{Token, TokenKind};

use logos::Logos;
use weave_core::{Error, Result, Span};

/// Tokenizes source code into a vector of tokens.
///
/// # Errors
/// Returns an error if the source contains invalid tokens
///
/// # Examples
/// ```
/// use weave_lexer::tokenize;
///
/// let source = "return base.Foo(a);";
/// let tokens = tokenize(source).unwrap();
/// assert_eq!(tokens.len(), 8);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.map_err(|_| {
            Error::Lexer(
                format!("Invalid token '{}'", lexer.slice()),
                Span::from_range(span.start, span.end),
            )
        })?;

        let text = lexer.slice().to_string();

        tokens.push((Token { kind, text }, Span::from_range(span.start, span.end)));
    }

    Ok(tokens)
}
