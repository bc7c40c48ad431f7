//! Resolved aspect references and their collection from bodies.

use weave_core::symbols::{AccessorKind, Symbol, SymbolId};
use weave_core::{
    ChainPosition, ReferenceAnnotation, ReferenceId, ReferenceOrder, Result, Semantic, Span,
};
use weave_parser::{AssignmentOperator, Block, Expression, Statement};
use weave_semantic::{Compilation, ReferenceResolver};

/// Which accessors (or the method itself) a call site exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorUse {
    /// Invocation of a method.
    Invoke,
    /// Read of a property or indexer.
    Get,
    /// Simple assignment to a property or indexer.
    Set,
    /// Compound assignment to a property: read then write.
    GetSet,
    /// `+=` on an event.
    Add,
    /// `-=` on an event.
    Remove,
}

impl AccessorUse {
    /// Accessor kinds exercised; empty for method invocations.
    #[must_use]
    pub const fn accessors(self) -> &'static [AccessorKind] {
        match self {
            Self::Invoke => &[],
            Self::Get => &[AccessorKind::Get],
            Self::Set => &[AccessorKind::Set],
            Self::GetSet => &[AccessorKind::Get, AccessorKind::Set],
            Self::Add => &[AccessorKind::Add],
            Self::Remove => &[AccessorKind::Remove],
        }
    }

    /// Returns the single accessor kind of this use, if there is exactly one.
    #[must_use]
    pub const fn single_accessor(self) -> Option<AccessorKind> {
        match self {
            Self::Get => Some(AccessorKind::Get),
            Self::Set => Some(AccessorKind::Set),
            Self::Add => Some(AccessorKind::Add),
            Self::Remove => Some(AccessorKind::Remove),
            Self::Invoke | Self::GetSet => None,
        }
    }
}

/// A call site whose relative order has been resolved to a chain position.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedReference<'a> {
    pub id: ReferenceId,
    /// The body containing the call site.
    pub containing: Semantic,
    /// The referenced member (method, property, indexer or event).
    pub member: SymbolId,
    pub order: ReferenceOrder,
    pub position: ChainPosition,
    pub usage: AccessorUse,
    /// Innermost statement owning the call site's expression.
    pub statement: &'a Statement,
    /// The annotated member or element access node.
    pub node: &'a Expression,
    pub span: Span,
}

impl ResolvedReference<'_> {
    /// Method-like symbols this reference executes, in call order.
    #[must_use]
    pub fn targets(&self, compilation: &Compilation) -> Vec<Semantic> {
        if self.usage == AccessorUse::Invoke {
            return vec![Semantic::new(self.member, self.position)];
        }
        self.usage
            .accessors()
            .iter()
            .filter_map(|kind| compilation.symbols.accessor(self.member, *kind))
            .map(|accessor| Semantic::new(accessor, self.position))
            .collect()
    }

    /// The semantic executed through `kind`, or the method for invocations.
    #[must_use]
    pub fn target(&self, compilation: &Compilation, kind: Option<AccessorKind>) -> Option<Semantic> {
        let symbol = match kind {
            None => self.member,
            Some(kind) => compilation.symbols.accessor(self.member, kind)?,
        };
        Some(Semantic::new(symbol, self.position))
    }

    /// Returns true if the reference targets the version it is written in.
    #[must_use]
    pub fn is_self_reference(&self, compilation: &Compilation) -> bool {
        self.targets(compilation).iter().any(|target| {
            target.symbol == self.containing.symbol
                && compilation.real_position(*target) == compilation.real_position(self.containing)
        })
    }
}

/// Classifies how the annotated node is used.
fn accessor_use(
    compilation: &Compilation,
    annotation: &ReferenceAnnotation,
    assignment: Option<AssignmentOperator>,
) -> AccessorUse {
    match (compilation.symbols.get(annotation.target), assignment) {
        (Some(Symbol::Method(_)), _) => AccessorUse::Invoke,
        (Some(Symbol::Event(_)), Some(AssignmentOperator::SubtractAssign)) => AccessorUse::Remove,
        (Some(Symbol::Event(_)), _) => AccessorUse::Add,
        (_, Some(AssignmentOperator::Assign)) => AccessorUse::Set,
        (_, Some(_)) => AccessorUse::GetSet,
        (_, None) => AccessorUse::Get,
    }
}

/// Walks one body and resolves every annotated reference in it.
struct Collector<'a, 'c> {
    compilation: &'a Compilation,
    resolver: ReferenceResolver<'a>,
    containing: Semantic,
    references: &'c mut Vec<ResolvedReference<'a>>,
}

impl<'a> Collector<'a, '_> {
    fn visit_statement(&mut self, statement: &'a Statement) -> Result<()> {
        let mut result = Ok(());
        statement.for_each_own_expression(&mut |expr| {
            if result.is_ok() {
                result = self.visit_expression(statement, expr, None);
            }
        });
        result?;

        let mut result = Ok(());
        statement.for_each_child(&mut |child| {
            if result.is_ok() {
                result = self.visit_statement(child);
            }
        });
        result
    }

    fn visit_expression(
        &mut self,
        statement: &'a Statement,
        expr: &'a Expression,
        assignment: Option<AssignmentOperator>,
    ) -> Result<()> {
        if let Expression::Assignment {
            operator,
            target,
            value,
            ..
        } = expr
        {
            self.visit_expression(statement, target, Some(*operator))?;
            return self.visit_expression(statement, value, None);
        }

        if let Some(annotation) = expr.annotation() {
            let position = self.resolver.resolve(
                self.containing,
                annotation.target,
                annotation.order,
                expr.span(),
            )?;
            self.references.push(ResolvedReference {
                id: annotation.id,
                containing: self.containing,
                member: annotation.target,
                order: annotation.order,
                position,
                usage: accessor_use(self.compilation, annotation, assignment),
                statement,
                node: expr,
                span: expr.span(),
            });
        }

        let mut result = Ok(());
        expr.for_each_child(&mut |child| {
            if result.is_ok() {
                result = self.visit_expression(statement, child, None);
            }
        });
        result
    }
}

/// Collects every aspect reference in `block`, the body of `containing`.
///
/// # Errors
/// Returns [`weave_core::Error::Resolution`] for references with no
/// qualifying version.
pub fn collect_references<'a>(
    compilation: &'a Compilation,
    containing: Semantic,
    block: &'a Block,
) -> Result<Vec<ResolvedReference<'a>>> {
    let mut references = Vec::new();
    let mut collector = Collector {
        compilation,
        resolver: ReferenceResolver::new(compilation),
        containing,
        references: &mut references,
    };

    for statement in &block.statements {
        collector.visit_statement(statement)?;
    }

    Ok(references)
}
