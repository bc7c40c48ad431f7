//! Inliners for method invocations.

use weave_parser::{AssignmentOperator, Expression, Statement};

use super::{Inliner, InlinerFamily, InlinerKind, InliningSite};
use crate::context::ReturnCapture;
use crate::reference::AccessorUse;

pub(super) static INLINERS: [Inliner; 6] = [
    method(InlinerKind::MethodReturn, return_invocation),
    method(InlinerKind::MethodCastReturn, return_cast_invocation),
    method(InlinerKind::MethodLocalDeclaration, local_declaration),
    method(InlinerKind::MethodAssignment, assignment),
    method(InlinerKind::MethodInvocation, invocation),
    method(InlinerKind::MethodDiscard, discard_assignment),
];

const fn method(
    kind: InlinerKind,
    shape: fn(&InliningSite<'_>) -> Option<ReturnCapture>,
) -> Inliner {
    Inliner::new(kind, InlinerFamily::Method, AccessorUse::Invoke, shape)
}

/// `return X(args);`
fn return_invocation(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    match site.statement() {
        Statement::Return {
            value: Some(value), ..
        } if site.is_call(value) => Some(ReturnCapture::SameContext),
        _ => None,
    }
}

/// `return (T)X(args);`
fn return_cast_invocation(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    let operand = site.returned_cast()?;
    site.is_call(operand).then_some(ReturnCapture::SameContext)
}

/// `T local = X(args);`
fn local_declaration(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    let (name, initializer) = site.declared_local()?;
    site.is_call(initializer).then(|| site.declare(name))
}

/// `local = X(args);`
fn assignment(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    let (name, value) = site.assigned_local()?;
    site.is_call(value).then(|| ReturnCapture::Assign {
        name: name.to_string(),
    })
}

/// `X(args);`
fn invocation(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    match site.statement() {
        Statement::Expression { expression, .. } if site.is_call(expression) => {
            Some(ReturnCapture::Discard)
        }
        _ => None,
    }
}

/// `_ = X(args);`
fn discard_assignment(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    match site.statement() {
        Statement::Expression {
            expression:
                Expression::Assignment {
                    operator: AssignmentOperator::Assign,
                    target,
                    value,
                    ..
                },
            ..
        } if matches!(target.as_ref(), Expression::Discard { .. }) && site.is_call(value) => {
            Some(ReturnCapture::Discard)
        }
        _ => None,
    }
}
