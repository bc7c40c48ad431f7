//! Inliners for event accessors.

use weave_parser::AssignmentOperator;

use super::{Inliner, InlinerFamily, InlinerKind, InliningSite};
use crate::context::ReturnCapture;
use crate::reference::AccessorUse;

pub(super) static INLINERS: [Inliner; 2] = [
    Inliner::new(
        InlinerKind::EventAddAssignment,
        InlinerFamily::Event,
        AccessorUse::Add,
        add_assignment,
    ),
    Inliner::new(
        InlinerKind::EventRemoveAssignment,
        InlinerFamily::Event,
        AccessorUse::Remove,
        remove_assignment,
    ),
];

/// `E += value;`
fn add_assignment(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    site.assigns_value_to_node(AssignmentOperator::AddAssign)
        .then_some(ReturnCapture::Discard)
}

/// `E -= value;`
fn remove_assignment(site: &InliningSite<'_>) -> Option<ReturnCapture> {
    site.assigns_value_to_node(AssignmentOperator::SubtractAssign)
        .then_some(ReturnCapture::Discard)
}
