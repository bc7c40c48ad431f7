//! Semantic analysis for weave programs.
//!
//! The binder turns a parsed program into a [`Compilation`]: the symbol
//! table, the declaration chain of every member and the annotated bodies of
//! every version. [`ReferenceResolver`] answers which version an aspect
//! reference denotes.

mod binder;
mod compilation;
mod resolver;

pub use binder::Binder;
pub use compilation::{Body, ClassModel, Compilation, DeclarationChain, MemberVersion};
pub use resolver::ReferenceResolver;

use weave_core::Result;
use weave_parser::Program;

/// Binds a parsed program.
///
/// # Errors
/// Returns semantic errors for:
/// - Unknown or duplicate layers, classes and members
/// - Overrides whose signature differs from the source declaration
/// - Local names reused across the versions of a member
/// - Misused aspect references
///
/// # Examples
/// ```
/// use weave_parser::parse_source;
/// use weave_semantic::bind;
///
/// let source = r#"
///     layers { Logging }
///     class A {
///         int Foo(int a) { return a; }
///         [override Logging] int Foo(int a) { return base.Foo(a); }
///     }
/// "#;
/// let program = parse_source(source).unwrap();
/// let compilation = bind(&program).unwrap();
/// assert_eq!(compilation.classes[0].members.len(), 1);
/// ```
pub fn bind(program: &Program) -> Result<Compilation> {
    Binder::new().bind_program(program)
}

/// Parses and binds source text.
///
/// # Errors
/// Returns lexer, parser or semantic errors
pub fn bind_source(source: &str) -> Result<Compilation> {
    let program = weave_parser::parse_source(source)?;
    bind(&program)
}
