//! Inliners: shape-directed rewrites of aspect reference call sites.
//!
//! Each [`Inliner`] recognizes one call-site template and knows how the
//! result of the inlined body is delivered to it. Inliners are grouped by
//! the kind of the referenced member and checked through three gates, in
//! order:
//! 1. kind: the referenced member and its usage fit the inliner's family
//! 2. containing context: the call site forwards its parameters unchanged
//!    and the target body never assigns them
//! 3. shape: the enclosing statement matches the template exactly
//!
//! A failed gate is never an error; the driver keeps an explicit call.

mod event;
mod method;
mod property;

use std::fmt;
use std::ptr;

use tracing::debug;
use weave_core::symbols::{AccessorKind, MethodSymbol, ParameterSymbol, SymbolKind, TypeRef};
use weave_core::Semantic;
use weave_parser::{AssignmentOperator, Block, Declarator, Expression, Statement};
use weave_semantic::{Body, Compilation};

use crate::composer::{BodyLinker, compose};
use crate::context::{LinkingContext, ReturnCapture};
use crate::reference::{AccessorUse, ResolvedReference};

/// Every call-site template the linker can inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlinerKind {
    /// `return X(args);`
    MethodReturn,
    /// `return (T)X(args);`
    MethodCastReturn,
    /// `T local = X(args);`
    MethodLocalDeclaration,
    /// `local = X(args);`
    MethodAssignment,
    /// `X(args);`
    MethodInvocation,
    /// `_ = X(args);`
    MethodDiscard,
    /// `return P;`
    PropertyGetReturn,
    /// `return (T)P;`
    PropertyGetCastReturn,
    /// `T local = P;`
    PropertyGetLocalDeclaration,
    /// `local = P;`
    PropertyGetAssignment,
    /// `P = value;`
    PropertySetValueAssignment,
    /// `E += value;`
    EventAddAssignment,
    /// `E -= value;`
    EventRemoveAssignment,
}

impl fmt::Display for InlinerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Declaration kinds an inliner can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlinerFamily {
    Method,
    Property,
    Event,
}

impl InlinerFamily {
    /// Returns true if a reference to a member of `kind` belongs to this family.
    #[must_use]
    pub const fn accepts(self, kind: SymbolKind) -> bool {
        matches!(
            (self, kind),
            (Self::Method, SymbolKind::Method)
                | (Self::Property, SymbolKind::Property | SymbolKind::Indexer)
                | (Self::Event, SymbolKind::Event)
        )
    }

    /// The inliners of this family, in selection order.
    #[must_use]
    pub fn inliners(self) -> &'static [Inliner] {
        match self {
            Self::Method => &method::INLINERS,
            Self::Property => &property::INLINERS,
            Self::Event => &event::INLINERS,
        }
    }

    const ALL: [Self; 3] = [Self::Method, Self::Property, Self::Event];
}

/// Shape gate: returns how the result is captured if the site matches.
type ShapeFn = fn(&InliningSite<'_>) -> Option<ReturnCapture>;

/// A stateless inliner descriptor.
pub struct Inliner {
    kind: InlinerKind,
    family: InlinerFamily,
    usage: AccessorUse,
    shape: ShapeFn,
}

impl fmt::Debug for Inliner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inliner")
            .field("kind", &self.kind)
            .field("family", &self.family)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// The outcome of an inlining: the statement to replace and its replacement.
#[derive(Debug)]
pub struct Inlining<'a> {
    pub replaced: &'a Statement,
    pub replacement: Statement,
}

impl Inliner {
    const fn new(
        kind: InlinerKind,
        family: InlinerFamily,
        usage: AccessorUse,
        shape: ShapeFn,
    ) -> Self {
        Self {
            kind,
            family,
            usage,
            shape,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> InlinerKind {
        self.kind
    }

    #[must_use]
    pub const fn family(&self) -> InlinerFamily {
        self.family
    }

    /// Runs every gate against `reference`.
    #[must_use]
    pub fn can_inline(&self, compilation: &Compilation, reference: &ResolvedReference<'_>) -> bool {
        self.site(compilation, reference)
            .is_some_and(|site| (self.shape)(&site).is_some())
    }

    /// Replaces the statement enclosing `reference` with the linked target body.
    ///
    /// # Panics
    /// Panics if the reference lost its annotation or no longer passes the
    /// gates; both mean the driver selected this inliner for another site.
    pub fn inline<'a>(
        &self,
        linker: &mut dyn BodyLinker,
        reference: &ResolvedReference<'a>,
        context: &LinkingContext,
    ) -> Inlining<'a> {
        assert!(
            reference
                .node
                .annotation()
                .is_some_and(|annotation| annotation.id == reference.id),
            "aspect reference {} has no matching annotation at {:?}",
            reference.id,
            reference.span
        );

        let (target, capture) = {
            let compilation = linker.compilation();
            let Some(site) = self.site(compilation, reference) else {
                panic!("{} selected for {} which fails its gates", self.kind, reference.id);
            };
            let Some(capture) = (self.shape)(&site) else {
                panic!("{} selected for {} which has another shape", self.kind, reference.id);
            };
            (site.target, capture)
        };

        debug!(reference = %reference.id, inliner = %self.kind, %target, "inlining call site");
        let span = reference.statement.span();
        let block = compose(linker, target, context, capture, span);

        Inlining {
            replaced: reference.statement,
            replacement: Statement::Block(block),
        }
    }

    /// Kind and containing-context gates; returns the site if both pass.
    fn site<'s>(
        &self,
        compilation: &'s Compilation,
        reference: &ResolvedReference<'s>,
    ) -> Option<InliningSite<'s>> {
        let kind = compilation.symbols.kind(reference.member)?;
        if reference.usage != self.usage || !self.family.accepts(kind) {
            return None;
        }

        let accessor = match self.family {
            InlinerFamily::Method => None,
            InlinerFamily::Property | InlinerFamily::Event => {
                Some(reference.usage.single_accessor()?)
            }
        };
        let site = InliningSite::new(compilation, reference, accessor)?;

        let passes_through = match self.family {
            InlinerFamily::Method => {
                site.containing_symbol.is_ordinary()
                    && invocation_arguments(reference.statement, reference.node).is_some_and(
                        |arguments| forwards(arguments, &site.containing_symbol.parameters),
                    )
            }
            InlinerFamily::Property => {
                site.containing.symbol == site.target.symbol && forwards_index(compilation, &site)
            }
            InlinerFamily::Event => site.containing.symbol == site.target.symbol,
        };

        let safe = passes_through
            && compilation.same_member(site.containing.symbol, site.target.symbol)
            && !assigns_any(&site.target_body.block, &site.target_symbol.parameters);
        safe.then_some(site)
    }
}

/// A call site together with everything the gates need to inspect.
#[derive(Debug, Clone, Copy)]
pub struct InliningSite<'a> {
    pub reference: ResolvedReference<'a>,
    pub containing: Semantic,
    pub containing_symbol: &'a MethodSymbol,
    pub containing_body: &'a Body,
    /// The method or accessor executed by the call site.
    pub target: Semantic,
    pub target_symbol: &'a MethodSymbol,
    pub target_body: &'a Body,
}

impl<'a> InliningSite<'a> {
    /// Builds the site, or `None` if the target has no method-like body.
    fn new(
        compilation: &'a Compilation,
        reference: &ResolvedReference<'a>,
        accessor: Option<AccessorKind>,
    ) -> Option<Self> {
        let target = reference.target(compilation, accessor)?;
        Some(Self {
            reference: *reference,
            containing: reference.containing,
            containing_symbol: compilation.method(reference.containing.symbol)?,
            containing_body: compilation.body(reference.containing)?,
            target,
            target_symbol: compilation.method(target.symbol)?,
            target_body: compilation.body(target)?,
        })
    }

    fn statement(&self) -> &'a Statement {
        self.reference.statement
    }

    /// Returns true if `expression` is the annotated reference node itself.
    fn is_node(&self, expression: &Expression) -> bool {
        ptr::eq(expression, self.reference.node)
    }

    /// Returns true if `expression` invokes the annotated reference node.
    fn is_call(&self, expression: &Expression) -> bool {
        matches!(expression, Expression::Invocation { callee, .. } if self.is_node(callee))
    }

    /// `return (T)operand;` where `T` is the containing return type.
    fn returned_cast(&self) -> Option<&'a Expression> {
        match self.statement() {
            Statement::Return {
                value: Some(Expression::Cast { ty, operand, .. }),
                ..
            } if *ty == self.containing_symbol.return_type => Some(operand.as_ref()),
            _ => None,
        }
    }

    /// `T name = initializer;` with a single declarator whose type accepts
    /// the target's return type.
    fn declared_local(&self) -> Option<(&'a str, &'a Expression)> {
        let Statement::LocalDeclaration { ty, declarators, .. } = self.statement() else {
            return None;
        };
        let [Declarator {
            name,
            initializer: Some(initializer),
            ..
        }] = declarators.as_slice()
        else {
            return None;
        };
        accepts(ty, &self.target_symbol.return_type).then_some((name.as_str(), initializer))
    }

    /// `local = value;` where `local` is a true local of the containing body.
    fn assigned_local(&self) -> Option<(&'a str, &'a Expression)> {
        let Statement::Expression {
            expression:
                Expression::Assignment {
                    operator: AssignmentOperator::Assign,
                    target,
                    value,
                    ..
                },
            ..
        } = self.statement()
        else {
            return None;
        };
        let name = target.as_identifier()?;
        self.containing_body
            .declares_local(name)
            .then_some((name, value.as_ref()))
    }

    /// `node op value;` where the right-hand side is the implicit `value`.
    fn assigns_value_to_node(&self, operator: AssignmentOperator) -> bool {
        matches!(
            self.statement(),
            Statement::Expression {
                expression: Expression::Assignment {
                    operator: op,
                    target,
                    value,
                    ..
                },
                ..
            } if *op == operator
                && self.is_node(target)
                && value.as_identifier() == Some(VALUE_PARAMETER)
        )
    }

    fn declare(&self, name: &str) -> ReturnCapture {
        ReturnCapture::Declare {
            name: name.to_string(),
            ty: self.target_symbol.return_type.clone(),
        }
    }
}

/// Name of the implicit accessor parameter.
const VALUE_PARAMETER: &str = "value";

/// Returns true if a local declared as `declared` can hold `actual`.
fn accepts(declared: &TypeRef, actual: &TypeRef) -> bool {
    !actual.is_void() && (declared.is_implicit() || declared == actual)
}

/// Arguments of the invocation whose callee is `node`.
fn invocation_arguments<'e>(statement: &'e Statement, node: &Expression) -> Option<&'e [Expression]> {
    let mut found = None;
    statement.for_each_own_expression(&mut |expression| {
        if found.is_none() {
            found = find_invocation(expression, node);
        }
    });
    found
}

fn find_invocation<'e>(expression: &'e Expression, node: &Expression) -> Option<&'e [Expression]> {
    if let Expression::Invocation {
        callee, arguments, ..
    } = expression
        && ptr::eq(callee.as_ref(), node)
    {
        return Some(arguments);
    }

    let mut found = None;
    expression.for_each_child(&mut |child| {
        if found.is_none() {
            found = find_invocation(child, node);
        }
    });
    found
}

/// Returns true if `arguments` pass `parameters` through unchanged, in order.
fn forwards(arguments: &[Expression], parameters: &[ParameterSymbol]) -> bool {
    arguments.len() == parameters.len()
        && arguments
            .iter()
            .zip(parameters)
            .all(|(argument, parameter)| argument.as_identifier() == Some(parameter.name.as_str()))
}

/// Indexer references must forward the index parameters; property
/// references have none.
fn forwards_index(compilation: &Compilation, site: &InliningSite<'_>) -> bool {
    let Some(property) = compilation.symbols.property(site.reference.member) else {
        return false;
    };
    match site.reference.node {
        Expression::ElementAccess { arguments, .. } => forwards(arguments, &property.parameters),
        _ => property.parameters.is_empty(),
    }
}

/// Returns true if any statement of `block` assigns one of `parameters`.
fn assigns_any(block: &Block, parameters: &[ParameterSymbol]) -> bool {
    fn in_expression(expression: &Expression, parameters: &[ParameterSymbol]) -> bool {
        if let Expression::Assignment { target, .. } = expression
            && let Some(name) = target.as_identifier()
            && parameters.iter().any(|p| p.name == name)
        {
            return true;
        }
        let mut found = false;
        expression.for_each_child(&mut |child| found = found || in_expression(child, parameters));
        found
    }

    fn in_statement(statement: &Statement, parameters: &[ParameterSymbol]) -> bool {
        let mut found = false;
        statement.for_each_own_expression(&mut |e| found = found || in_expression(e, parameters));
        statement.for_each_child(&mut |s| found = found || in_statement(s, parameters));
        found
    }

    block
        .statements
        .iter()
        .any(|statement| in_statement(statement, parameters))
}

/// Selects inliners for resolved references.
pub struct InlinerRegistry<'a> {
    compilation: &'a Compilation,
    inliners: Vec<&'static Inliner>,
}

impl<'a> InlinerRegistry<'a> {
    pub fn new(compilation: &'a Compilation) -> Self {
        let inliners = InlinerFamily::ALL
            .iter()
            .flat_map(|family| family.inliners())
            .collect();
        Self::with_inliners(compilation, inliners)
    }

    /// Creates a registry over `inliners`, in selection order.
    fn with_inliners(compilation: &'a Compilation, inliners: Vec<&'static Inliner>) -> Self {
        Self {
            compilation,
            inliners,
        }
    }

    /// Every inliner whose gates all pass for `reference`.
    #[must_use]
    pub fn candidates(&self, reference: &ResolvedReference<'_>) -> Vec<&'static Inliner> {
        self.inliners
            .iter()
            .copied()
            .filter(|inliner| inliner.can_inline(self.compilation, reference))
            .collect()
    }

    /// Returns the inliner for `reference`, if any.
    ///
    /// # Panics
    /// Panics if more than one inliner claims the site.
    #[must_use]
    pub fn try_get_inliner(&self, reference: &ResolvedReference<'_>) -> Option<&'static Inliner> {
        let candidates = self.candidates(reference);
        assert!(
            candidates.len() <= 1,
            "ambiguous inliners for {}: {:?}",
            reference.id,
            candidates.iter().map(|i| i.kind).collect::<Vec<_>>()
        );
        candidates.first().copied()
    }
}
