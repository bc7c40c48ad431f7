//! Error types and result aliases for the weave linker.

use crate::Span;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Main error type for the weave toolchain.
///
/// Only recoverable failures live here. A call site that cannot be inlined is
/// not an error, and broken invariants between reference resolution and
/// inlining abort with a panic instead.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lexer error: {0}")]
    #[diagnostic(code(weave::lexer))]
    Lexer(String, #[label("here")] Span),

    #[error("Parser error: {0}")]
    #[diagnostic(code(weave::parser))]
    Parser(String, #[label("here")] Span),

    #[error("Semantic error: {0}")]
    #[diagnostic(code(weave::semantic))]
    Semantic(String, #[label("here")] Span),

    #[error("Unresolvable aspect reference: {0}")]
    #[diagnostic(code(weave::resolution))]
    Resolution(String, #[label("referenced here")] Span),

    #[error("Linker error: {0}")]
    Linker(String),
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::from(span.start..span.end)
    }
}

/// Result type alias using the weave Error type.
pub type Result<T> = std::result::Result<T, Error>;
