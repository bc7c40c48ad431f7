//! Body composition: splicing a linked target body into a call site.

use tracing::debug;
use weave_core::{Semantic, Span};
use weave_parser::{Block, Declarator, Expression, Statement};
use weave_semantic::Compilation;

use crate::context::{LinkingContext, ReturnCapture};

/// The services the composer needs from the linking driver.
pub trait BodyLinker {
    fn compilation(&self) -> &Compilation;

    /// Produces the fully linked body of `target` for `context`.
    fn linked_body(&mut self, target: Semantic, context: &LinkingContext) -> Block;

    /// Returns a label name derived from `base` that is unused in the member
    /// currently being linked.
    fn unique_label(&self, base: &str) -> String;

    /// Marks `label` as taken in the member currently being linked.
    fn reserve_label(&mut self, label: &str);
}

/// Links `target` and adapts it to `capture`, returning a flattenable block
/// that replaces the call site statement.
///
/// For an indirect capture the block is
/// `[T x;] <body with returns rewritten> [label: ;]`, where the label is
/// present only if some non-trailing return had to jump to it.
pub fn compose(
    linker: &mut dyn BodyLinker,
    target: Semantic,
    context: &LinkingContext,
    capture: ReturnCapture,
    span: Span,
) -> Block {
    if capture == ReturnCapture::SameContext {
        let body = linker.linked_body(target, context);
        debug!(%target, depth = context.depth(), "inlined body in the same context");
        return Block::flattenable(body.statements, span);
    }

    let child = context.derive(capture.clone());
    let body = linker.linked_body(target, &child);
    let label = linker.unique_label(&child.return_label());

    let mut rewriter = ReturnRewriter {
        capture: &capture,
        label: &label,
        label_used: false,
    };
    let mut statements = rewriter.rewrite_statements(body.statements, true);
    let label_used = rewriter.label_used;

    if let ReturnCapture::Declare { name, ty } = &capture {
        statements.insert(
            0,
            Statement::LocalDeclaration {
                ty: ty.clone(),
                declarators: vec![Declarator {
                    name: name.clone(),
                    initializer: None,
                    span,
                }],
                span,
            },
        );
    }
    if label_used {
        linker.reserve_label(&label);
        statements.push(Statement::label(label, span));
    }

    debug!(
        %target,
        depth = child.depth(),
        label_used,
        "inlined body with indirect return"
    );
    Block::flattenable(statements, span)
}

/// Rewrites the raw `return` statements of one linked body.
struct ReturnRewriter<'c> {
    capture: &'c ReturnCapture,
    label: &'c str,
    label_used: bool,
}

/// Index of the statement whose completion ends the block.
fn tail_index(statements: &[Statement]) -> Option<usize> {
    statements.iter().rposition(|s| !s.is_noop())
}

impl ReturnRewriter<'_> {
    fn rewrite_statements(&mut self, statements: Vec<Statement>, tail: bool) -> Vec<Statement> {
        let tail_at = if tail { tail_index(&statements) } else { None };
        let mut result = Vec::with_capacity(statements.len());

        for (i, statement) in statements.into_iter().enumerate() {
            let is_tail = tail_at == Some(i);
            match statement {
                Statement::Return { value, span } => {
                    result.extend(self.rewrite_return(value, span, is_tail));
                }
                other => result.push(self.rewrite_statement(other, is_tail)),
            }
        }

        result
    }

    fn rewrite_statement(&mut self, statement: Statement, tail: bool) -> Statement {
        match statement {
            Statement::Block(block) => Statement::Block(Block {
                statements: self.rewrite_statements(block.statements, tail),
                ..block
            }),
            Statement::Return { value, span } => {
                let mut replacement = self.rewrite_return(value, span, tail);
                match replacement.len() {
                    0 => Statement::Empty { span },
                    1 => replacement.remove(0),
                    _ => Statement::Block(Block::flattenable(replacement, span)),
                }
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
                span,
            } => Statement::If {
                condition,
                then_branch: Box::new(self.rewrite_statement(*then_branch, tail)),
                else_branch: else_branch.map(|b| Box::new(self.rewrite_statement(*b, tail))),
                span,
            },
            // A return inside a loop body never ends the block
            Statement::While {
                condition,
                body,
                span,
            } => Statement::While {
                condition,
                body: Box::new(self.rewrite_statement(*body, false)),
                span,
            },
            Statement::Labeled {
                label,
                statement,
                span,
            } => Statement::Labeled {
                label,
                statement: Box::new(self.rewrite_statement(*statement, tail)),
                span,
            },
            other => other,
        }
    }

    fn rewrite_return(&mut self, value: Option<Expression>, span: Span, tail: bool) -> Vec<Statement> {
        let mut statements = Vec::new();

        match (self.capture, value) {
            (ReturnCapture::Declare { name, .. } | ReturnCapture::Assign { name }, Some(value)) => {
                let target = Expression::identifier(name.clone(), span);
                statements.push(Statement::Expression {
                    expression: Expression::assign(target, value),
                    span,
                });
            }
            (ReturnCapture::Discard, Some(value)) => {
                if matches!(value, Expression::Invocation { .. } | Expression::Assignment { .. }) {
                    statements.push(Statement::Expression {
                        expression: value,
                        span,
                    });
                } else if !value.is_trivially_pure() {
                    statements.push(Statement::Expression {
                        expression: Expression::assign(Expression::Discard { span }, value),
                        span,
                    });
                }
            }
            (ReturnCapture::SameContext, value) => {
                panic!(
                    "return rewriting requested for a same-context body (value: {})",
                    value.is_some()
                );
            }
            (_, None) => {}
        }

        if !tail {
            self.label_used = true;
            statements.push(Statement::Goto {
                label: self.label.to_string(),
                span,
            });
        }

        statements
    }
}
