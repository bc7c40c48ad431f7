//! Body validation: declared locals and aspect-reference annotation.

use rustc_hash::{FxHashMap, FxHashSet};
use weave_core::symbols::{AccessorKind, Symbol, SymbolId, SymbolTable};
use weave_core::{ChainPosition, Error, ReferenceAnnotation, ReferenceId, Result, Span};
use weave_parser::{AssignmentOperator, Block, Expression, Statement};

use super::core::Binder;

/// How an expression is used by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    Value,
    Callee,
    Target(AssignmentOperator),
}

/// Names declared by one body.
#[derive(Default)]
struct Declarations {
    locals: FxHashSet<String>,
    labels: FxHashSet<String>,
}

/// Collects declared locals and labels, rejecting duplicates within the body.
fn collect_declarations(block: &Block, parameters: &[String]) -> Result<Declarations> {
    fn visit(
        statement: &Statement,
        parameters: &[String],
        declarations: &mut Declarations,
    ) -> Result<()> {
        match statement {
            Statement::LocalDeclaration { declarators, .. } => {
                for declarator in declarators {
                    if parameters.contains(&declarator.name) {
                        return Err(Error::Semantic(
                            format!("Local '{}' shadows a parameter", declarator.name),
                            declarator.span,
                        ));
                    }
                    if !declarations.locals.insert(declarator.name.clone()) {
                        return Err(Error::Semantic(
                            format!("Local '{}' is declared more than once", declarator.name),
                            declarator.span,
                        ));
                    }
                }
            }
            Statement::Labeled { label, span, .. } => {
                if !declarations.labels.insert(label.clone()) {
                    return Err(Error::Semantic(
                        format!("Label '{label}' is declared more than once"),
                        *span,
                    ));
                }
            }
            _ => {}
        }

        let mut result = Ok(());
        statement.for_each_child(&mut |child| {
            if result.is_ok() {
                result = visit(child, parameters, declarations);
            }
        });
        result
    }

    let mut declarations = Declarations::default();
    for statement in &block.statements {
        visit(statement, parameters, &mut declarations)?;
    }
    Ok(declarations)
}

/// Assigns reference annotations inside one class.
struct Annotator<'a> {
    symbols: &'a SymbolTable,
    class: &'a str,
    next_reference: &'a mut u32,
}

impl Annotator<'_> {
    fn annotate_block(&mut self, block: &mut Block) -> Result<()> {
        for statement in &mut block.statements {
            self.annotate_statement(statement)?;
        }
        Ok(())
    }

    fn annotate_statement(&mut self, statement: &mut Statement) -> Result<()> {
        let mut result = Ok(());
        statement.for_each_own_expression_mut(&mut |expr| {
            if result.is_ok() {
                result = self.annotate_expression(expr, Usage::Value);
            }
        });
        result?;

        let mut result = Ok(());
        statement.for_each_child_mut(&mut |child| {
            if result.is_ok() {
                result = self.annotate_statement(child);
            }
        });
        result
    }

    fn annotate_expression(&mut self, expr: &mut Expression, usage: Usage) -> Result<()> {
        match expr {
            Expression::Invocation {
                callee, arguments, ..
            } => {
                self.annotate_expression(callee, Usage::Callee)?;
                for argument in arguments {
                    self.annotate_expression(argument, Usage::Value)?;
                }
                Ok(())
            }
            Expression::Assignment {
                operator,
                target,
                value,
                ..
            } => {
                self.annotate_expression(target, Usage::Target(*operator))?;
                self.annotate_expression(value, Usage::Value)
            }
            Expression::MemberAccess {
                receiver,
                name,
                annotation,
                span,
            } => match receiver.as_ref() {
                Expression::Reference { order, .. } => {
                    let target = self.member_target(name, usage, *span)?;
                    *annotation = Some(ReferenceAnnotation {
                        id: self.next_id(),
                        order: *order,
                        target,
                    });
                    Ok(())
                }
                _ => self.annotate_expression(receiver, Usage::Value),
            },
            Expression::ElementAccess {
                receiver,
                arguments,
                annotation,
                span,
            } => {
                match receiver.as_ref() {
                    Expression::Reference { order, .. } => {
                        let target = self.indexer_target(usage, *span)?;
                        *annotation = Some(ReferenceAnnotation {
                            id: self.next_id(),
                            order: *order,
                            target,
                        });
                    }
                    _ => self.annotate_expression(receiver, Usage::Value)?,
                }
                for argument in arguments {
                    self.annotate_expression(argument, Usage::Value)?;
                }
                Ok(())
            }
            other => {
                let mut result = Ok(());
                other.for_each_child_mut(&mut |child| {
                    if result.is_ok() {
                        result = self.annotate_expression(child, Usage::Value);
                    }
                });
                result
            }
        }
    }

    fn next_id(&mut self) -> ReferenceId {
        let id = ReferenceId::new(*self.next_reference);
        *self.next_reference += 1;
        id
    }

    fn member_target(&self, name: &str, usage: Usage, span: Span) -> Result<SymbolId> {
        let error = |message: String| Err(Error::Semantic(message, span));

        let Some(id) = self.symbols.lookup_member(self.class, name) else {
            return error(format!("'{}' has no member named '{name}'", self.class));
        };

        match (self.symbols.get(id), usage) {
            (Some(Symbol::Method(_)), Usage::Callee) => Ok(id),
            (Some(Symbol::Method(_)), _) => {
                error(format!("Method reference '{name}' must be invoked"))
            }
            (Some(Symbol::Property(p)), _) if p.is_indexer => {
                error("Indexer references must use element access".to_string())
            }
            (Some(Symbol::Property(_)), Usage::Callee) => {
                error(format!("Property '{name}' cannot be invoked"))
            }
            (Some(Symbol::Property(_)), _) => {
                self.require_property_accessors(id, name, usage, span)?;
                Ok(id)
            }
            (Some(Symbol::Event(_)), Usage::Target(operator))
                if operator != AssignmentOperator::Assign =>
            {
                let kind = if operator == AssignmentOperator::AddAssign {
                    AccessorKind::Add
                } else {
                    AccessorKind::Remove
                };
                if self.symbols.accessor(id, kind).is_none() {
                    return error(format!("Event '{name}' has no '{kind}' accessor"));
                }
                Ok(id)
            }
            (Some(Symbol::Event(_)), _) => {
                error(format!("Event '{name}' must be used with '+=' or '-='"))
            }
            (Some(Symbol::Field(_)), _) | (None, _) => error(format!(
                "Field '{name}' cannot be referenced through an aspect reference"
            )),
        }
    }

    fn indexer_target(&self, usage: Usage, span: Span) -> Result<SymbolId> {
        let Some(id) = self.symbols.lookup_indexer(self.class) else {
            return Err(Error::Semantic(
                format!("'{}' has no indexer", self.class),
                span,
            ));
        };

        match usage {
            Usage::Callee => Err(Error::Semantic(
                "Indexer reference cannot be invoked".to_string(),
                span,
            )),
            Usage::Target(operator) if operator != AssignmentOperator::Assign => {
                Err(Error::Semantic(
                    "Compound assignment through an indexer reference is not supported"
                        .to_string(),
                    span,
                ))
            }
            _ => {
                self.require_property_accessors(id, "this[]", usage, span)?;
                Ok(id)
            }
        }
    }

    fn require_property_accessors(
        &self,
        id: SymbolId,
        name: &str,
        usage: Usage,
        span: Span,
    ) -> Result<()> {
        let needed: &[AccessorKind] = match usage {
            Usage::Target(AssignmentOperator::Assign) => &[AccessorKind::Set],
            Usage::Target(_) => &[AccessorKind::Get, AccessorKind::Set],
            Usage::Value | Usage::Callee => &[AccessorKind::Get],
        };

        for kind in needed {
            if self.symbols.accessor(id, *kind).is_none() {
                return Err(Error::Semantic(
                    format!("'{name}' has no '{kind}' accessor"),
                    span,
                ));
            }
        }
        Ok(())
    }
}

/// Returns the first aspect reference found in `expr`, if any.
fn find_reference(expr: &Expression) -> Option<Span> {
    if let Expression::Reference { span, .. } = expr {
        return Some(*span);
    }
    let mut found = None;
    expr.for_each_child(&mut |child| {
        if found.is_none() {
            found = find_reference(child);
        }
    });
    found
}

impl Binder {
    /// Rejects aspect references outside of member bodies.
    pub(crate) fn check_field_initializers(&self) -> Result<()> {
        for field in self.classes.iter().flat_map(|c| &c.fields) {
            if let Some(span) = field.initializer.as_ref().and_then(find_reference) {
                return Err(Error::Semantic(
                    "Aspect references are only allowed inside member bodies".to_string(),
                    span,
                ));
            }
        }
        Ok(())
    }

    /// Collects locals and annotates references for every body of a chain.
    pub(crate) fn bind_chain_bodies(&mut self, class: &str, member: SymbolId) -> Result<()> {
        let Self {
            symbols,
            chains,
            next_reference,
            ..
        } = self;

        let Some(chain) = chains.get_mut(&member) else {
            return Ok(());
        };

        // Local and label names are unique across every version of a method-like symbol
        let mut seen: FxHashMap<(SymbolId, String), ChainPosition> = FxHashMap::default();
        let mut annotator = Annotator {
            symbols,
            class,
            next_reference,
        };

        for version in &mut chain.versions {
            for (symbol, body) in &mut version.bodies {
                let parameters: Vec<String> = annotator
                    .symbols
                    .method(*symbol)
                    .map(|m| m.parameters.iter().map(|p| p.name.clone()).collect())
                    .unwrap_or_default();

                let declarations = collect_declarations(&body.block, &parameters)?;
                for name in declarations.locals.iter().chain(&declarations.labels) {
                    if let Some(previous) = seen.insert((*symbol, name.clone()), version.position)
                    {
                        return Err(Error::Semantic(
                            format!(
                                "'{name}' is declared in both the {previous} and {} versions",
                                version.position
                            ),
                            body.span,
                        ));
                    }
                }
                body.locals = declarations.locals;
                body.labels = declarations.labels;

                annotator.annotate_block(&mut body.block)?;
            }
        }

        Ok(())
    }
}
