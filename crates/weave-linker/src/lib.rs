//! The weave aspect linker.
//!
//! Linking turns the declaration chains of a bound [`Compilation`] into one
//! class per input class. Every aspect reference is either inlined, when its
//! call site has one of the shapes the [`inlining`] module recognizes, or
//! replaced by an explicit call to a helper member holding the referenced
//! version.
//!
//! The pipeline is:
//! 1. [`analysis`]: resolve references and decide what to inline
//! 2. [`driver`]: rewrite bodies, composing inlined ones through [`composer`]
//! 3. [`cleanup`]: flatten inlined blocks and drop redundant jumps

pub mod analysis;
pub mod cleanup;
pub mod composer;
pub mod context;
pub mod driver;
pub mod inlining;
pub mod naming;
pub mod reference;

pub use analysis::{LinkPlan, analyze};
pub use cleanup::{CleanupPass, CleanupPipeline};
pub use composer::{BodyLinker, compose};
pub use context::{LinkingContext, RETURN_LABEL_PREFIX, ReturnCapture};
pub use driver::Linker;
pub use inlining::{Inliner, InlinerFamily, InlinerKind, InlinerRegistry, Inlining};
pub use reference::{AccessorUse, ResolvedReference, collect_references};

use weave_core::Result;
use weave_parser::Program;
use weave_semantic::Compilation;
use weave_utils::{Config, LinkerOptions};

/// Links a bound compilation into a program without layers.
///
/// # Errors
/// Returns resolution errors for aspect references with no qualifying
/// version.
///
/// # Examples
/// ```
/// use weave_linker::link;
/// use weave_semantic::bind_source;
/// use weave_utils::LinkerOptions;
///
/// let source = r#"
///     layers { Logging }
///     class A {
///         int Foo(int a) { return a; }
///         [override Logging] int Foo(int a) { log(a); return base.Foo(a); }
///     }
/// "#;
/// let compilation = bind_source(source).unwrap();
/// let program = link(&compilation, &LinkerOptions::default()).unwrap();
/// assert_eq!(program.classes[0].members.len(), 1);
/// ```
pub fn link(compilation: &Compilation, options: &LinkerOptions) -> Result<Program> {
    let plan = analyze(compilation, options)?;
    let mut linker = Linker::new(compilation, plan);
    let mut program = linker.link_program();

    if options.cleanup {
        CleanupPipeline::new(options.max_cleanup_iterations).run(&mut program);
    }

    Ok(program)
}

/// Parses, binds and links source text.
///
/// # Errors
/// Returns lexer, parser, semantic or resolution errors
pub fn link_source(source: &str, options: &LinkerOptions) -> Result<Program> {
    let compilation = weave_semantic::bind_source(source)?;
    link(&compilation, options)
}

/// Links source text with the `[linker]` options of a configuration.
///
/// # Errors
/// Returns lexer, parser, semantic or resolution errors
pub fn link_with_config(source: &str, config: &Config) -> Result<Program> {
    link_source(source, &config.linker)
}
