//! Inliners for property and indexer accessors.
//!
//! The containing body must be the accessor being referenced, so an
//! inlined getter or setter body sees the same index parameters (and the
//! same `value`) as the call site.

use weave_parser::{AssignmentOperator, Statement};

use super::{Inliner, InlinerFamily, InlinerKind, InliningSite};
use crate::context::ReturnCapture;
use crate::reference::AccessorUse;

pub(super) static INLINERS: [Inliner; 5] = [
    property(InlinerKind::PropertyGetReturn, AccessorUse::Get, get_return),
    property(InlinerKind::PropertyGetCastReturn, AccessorUse::Get, get_cast_return),
    property(
        InlinerKind::PropertyGetLocalDeclaration,
        AccessorUse::Get,
        get_local_declaration,
    ),
    property(InlinerKind::PropertyGetAssignment, AccessorUse::Get, get_assignment),
    property(
        InlinerKind::PropertySetValueAssignment,
        AccessorUse::Set,
        set_value_assignment,
    ),
];

const fn property(
    kind: InlinerKind,
    usage: AccessorUse,
    shape: fn(&InliningSite<'_>) -> Option<ReturnCapture>,
) -> Inliner {
    Inliner::new(kind, InlinerFamily::Property, usage, shape)
}

/// `return P;`
fn get_return(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    match site.statement() {
        Statement::Return {
            value: Some(value), ..
        } if site.is_node(value) => Some(ReturnCapture::SameContext),
        _ => None,
    }
}

/// `return (T)P;`
fn get_cast_return(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    let operand = site.returned_cast()?;
    site.is_node(operand).then_some(ReturnCapture::SameContext)
}

/// `T local = P;`
fn get_local_declaration(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    let (name, initializer) = site.declared_local()?;
    site.is_node(initializer).then(|| site.declare(name))
}

/// `local = P;`
fn get_assignment(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    let (name, value) = site.assigned_local()?;
    site.is_node(value).then(|| ReturnCapture::Assign {
        name: name.to_string(),
    })
}

/// `P = value;`
///
/// The setter body runs in place of the assignment. Its `return;`
/// statements must not leave the containing setter, hence the discarding
/// capture.
fn set_value_assignment(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    site.assigns_value_to_node(AssignmentOperator::Assign)
        .then_some(ReturnCapture::Discard)
}
