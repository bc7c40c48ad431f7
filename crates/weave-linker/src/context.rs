//! Linking contexts: how the body being linked hands back its result.

use tracing::trace;
use weave_core::symbols::TypeRef;

/// Prefix of labels marking the end of an inlined body.
pub const RETURN_LABEL_PREFIX: &str = "__aspect_return";

/// How an inliner wants the result of the inlined body delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnCapture {
    /// The callee's `return` statements stay returns of the enclosing context.
    SameContext,
    /// Declare `ty name;` before the body and assign the result to it.
    Declare { name: String, ty: TypeRef },
    /// Assign the result to an existing local.
    Assign { name: String },
    /// Evaluate returned expressions for their effects only.
    Discard,
}

impl ReturnCapture {
    /// The local receiving the result, if any.
    #[must_use]
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::Declare { name, .. } | Self::Assign { name } => Some(name),
            Self::SameContext | Self::Discard => None,
        }
    }
}

/// Immutable per-level linking state.
///
/// The root context is direct: returns leave the member being emitted. Each
/// inlining that needs the result elsewhere derives an indirect child one
/// level deeper. Contexts are never mutated; whether a child's return label
/// was used is reported back by the composer instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkingContext {
    depth: usize,
    capture: Option<ReturnCapture>,
}

impl LinkingContext {
    /// Creates the direct context of a member body.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            depth: 0,
            capture: None,
        }
    }

    /// Derives the context in which an inlined body is linked.
    ///
    /// `SameContext` keeps this context; any other capture creates an
    /// indirect child.
    #[must_use]
    pub fn derive(&self, capture: ReturnCapture) -> Self {
        if capture == ReturnCapture::SameContext {
            return self.clone();
        }

        let child = Self {
            depth: self.depth + 1,
            capture: Some(capture),
        };
        trace!(depth = child.depth, capture = ?child.capture, "derived linking context");
        child
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The capture of an indirect context, `None` when direct.
    #[must_use]
    pub const fn capture(&self) -> Option<&ReturnCapture> {
        self.capture.as_ref()
    }

    #[must_use]
    pub const fn is_indirect(&self) -> bool {
        self.capture.is_some()
    }

    /// Returns true if this context introduces its return variable.
    #[must_use]
    pub const fn declares_return_variable(&self) -> bool {
        matches!(self.capture, Some(ReturnCapture::Declare { .. }))
    }

    /// Base name of the label ending bodies linked in this context.
    #[must_use]
    pub fn return_label(&self) -> String {
        format!("{RETURN_LABEL_PREFIX}_{}", self.depth)
    }
}

impl Default for LinkingContext {
    fn default() -> Self {
        Self::root()
    }
}
