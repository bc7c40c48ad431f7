//! The linking driver: produces linked bodies and emits woven classes.

use std::ptr;

use rustc_hash::FxHashSet;
use weave_core::symbols::{AccessorKind, MethodSymbol, ParameterSymbol, Symbol, SymbolId};
use weave_core::{ChainPosition, Semantic, Span};
use weave_parser::{
    AccessorDecl, Block, ClassDecl, Declarator, EventDecl, Expression, Member, MethodDecl,
    Parameter, Program, PropertyDecl, Statement,
};
use weave_semantic::{ClassModel, Compilation};

use crate::analysis::{LinkPlan, method_like_symbols};
use crate::composer::BodyLinker;
use crate::context::LinkingContext;
use crate::naming::{accessor_method_name, member_name};
use crate::reference::ResolvedReference;

/// Rewrites every emitted body according to a [`LinkPlan`].
pub struct Linker<'a> {
    compilation: &'a Compilation,
    plan: LinkPlan<'a>,
    /// Labels taken in the member body currently being emitted.
    labels: FxHashSet<String>,
}

impl<'a> Linker<'a> {
    pub fn new(compilation: &'a Compilation, plan: LinkPlan<'a>) -> Self {
        Self {
            compilation,
            plan,
            labels: FxHashSet::default(),
        }
    }

    /// Emits the woven program: no layers, one class per input class.
    pub fn link_program(&mut self) -> Program {
        let compilation = self.compilation;
        let classes = compilation
            .classes
            .iter()
            .map(|class| self.emit_class(class))
            .collect();

        Program {
            layers: Vec::new(),
            classes,
        }
    }

    /// Fields first, then each member followed by its helpers.
    fn emit_class(&mut self, class: &ClassModel) -> ClassDecl {
        let compilation = self.compilation;
        let mut members: Vec<Member> = class.fields.iter().cloned().map(Member::Field).collect();

        for &member in &class.members {
            let symbols = method_like_symbols(compilation, member);
            members.extend(self.emit_member(member, ChainPosition::Final, &symbols));

            let helpers = self.plan.helpers_of(compilation, member);
            for group in helpers.chunk_by(|a, b| a.position == b.position) {
                let symbols: Vec<SymbolId> = group.iter().map(|semantic| semantic.symbol).collect();
                members.extend(self.emit_member(member, group[0].position, &symbols));
            }
        }

        ClassDecl {
            name: class.name.clone(),
            members,
            span: Span::default(),
        }
    }

    /// Emits the version of `member` at `position` with the given
    /// method-like symbols.
    fn emit_member(
        &mut self,
        member: SymbolId,
        position: ChainPosition,
        symbols: &[SymbolId],
    ) -> Vec<Member> {
        let compilation = self.compilation;
        let name = member_name(compilation, member, position);

        match compilation.symbols.get(member) {
            Some(Symbol::Method(method)) => {
                vec![Member::Method(self.emit_method(name, method, Semantic::new(member, position)))]
            }
            // Indexer helpers cannot be named, so their accessors become methods
            Some(Symbol::Property(property))
                if property.is_indexer && position != ChainPosition::Final =>
            {
                symbols
                    .iter()
                    .filter_map(|&accessor| {
                        let method = compilation.method(accessor)?;
                        let kind = method.accessor_kind()?;
                        let semantic = Semantic::new(accessor, position);
                        Some(Member::Method(self.emit_method(
                            accessor_method_name(kind, &name),
                            method,
                            semantic,
                        )))
                    })
                    .collect()
            }
            Some(Symbol::Property(property)) => vec![Member::Property(PropertyDecl {
                layer: None,
                name,
                ty: property.ty.clone(),
                parameters: parameters(&property.parameters),
                is_indexer: property.is_indexer,
                accessors: self.emit_accessors(symbols, position),
                span: Span::default(),
            })],
            Some(Symbol::Event(event)) => vec![Member::Event(EventDecl {
                layer: None,
                name,
                ty: event.ty.clone(),
                accessors: self.emit_accessors(symbols, position),
                span: Span::default(),
            })],
            Some(Symbol::Field(_)) | None => Vec::new(),
        }
    }

    fn emit_method(&mut self, name: String, method: &MethodSymbol, semantic: Semantic) -> MethodDecl {
        MethodDecl {
            layer: None,
            name,
            return_type: method.return_type.clone(),
            parameters: parameters(&method.parameters),
            body: self.emit_body(semantic),
            span: Span::default(),
        }
    }

    fn emit_accessors(&mut self, symbols: &[SymbolId], position: ChainPosition) -> Vec<AccessorDecl> {
        let compilation = self.compilation;
        let mut accessors: Vec<(AccessorKind, SymbolId)> = symbols
            .iter()
            .filter_map(|&symbol| Some((compilation.method(symbol)?.accessor_kind()?, symbol)))
            .collect();
        accessors.sort();

        accessors
            .into_iter()
            .map(|(kind, symbol)| AccessorDecl {
                kind,
                body: self.emit_body(Semantic::new(symbol, position)),
                span: Span::default(),
            })
            .collect()
    }

    /// Links one emitted body from a fresh root context.
    fn emit_body(&mut self, semantic: Semantic) -> Block {
        self.labels = self
            .compilation
            .chain(semantic.symbol)
            .map(|chain| {
                chain
                    .versions
                    .iter()
                    .filter_map(|version| version.body(semantic.symbol))
                    .flat_map(|body| body.labels.iter().cloned())
                    .collect()
            })
            .unwrap_or_default();

        self.link_body(semantic, &LinkingContext::root())
    }

    /// Produces the linked body of `semantic`: inlined references are
    /// spliced in, every other reference becomes an explicit call.
    ///
    /// # Panics
    /// Panics if `semantic` was not reached by the analysis.
    fn link_body(&mut self, semantic: Semantic, context: &LinkingContext) -> Block {
        let compilation = self.compilation;
        let (Some(body), Some(references)) =
            (compilation.body(semantic), self.plan.references(semantic))
        else {
            panic!("{semantic} was not analyzed before linking");
        };
        let references = references.to_vec();

        let statements = body
            .block
            .statements
            .iter()
            .map(|statement| self.rewrite_statement(statement, &references, context))
            .collect();

        Block {
            statements,
            flattenable: body.block.flattenable,
            span: body.block.span,
        }
    }

    fn rewrite_block(
        &mut self,
        block: &'a Block,
        references: &[ResolvedReference<'a>],
        context: &LinkingContext,
    ) -> Block {
        Block {
            statements: block
                .statements
                .iter()
                .map(|statement| self.rewrite_statement(statement, references, context))
                .collect(),
            flattenable: block.flattenable,
            span: block.span,
        }
    }

    fn rewrite_statement(
        &mut self,
        statement: &'a Statement,
        references: &[ResolvedReference<'a>],
        context: &LinkingContext,
    ) -> Statement {
        let inlined = references
            .iter()
            .filter(|reference| ptr::eq(reference.statement, statement))
            .find_map(|reference| {
                self.plan
                    .inliner(reference.id)
                    .map(|inliner| (*reference, inliner))
            });

        if let Some((reference, inliner)) = inlined {
            let inlining = inliner.inline(self, &reference, context);
            assert!(
                ptr::eq(inlining.replaced, statement),
                "{} replaced a statement other than the one holding {}",
                inliner.kind(),
                reference.id
            );
            return inlining.replacement;
        }

        match statement {
            Statement::Block(block) => Statement::Block(self.rewrite_block(block, references, context)),
            Statement::LocalDeclaration {
                ty,
                declarators,
                span,
            } => Statement::LocalDeclaration {
                ty: ty.clone(),
                declarators: declarators
                    .iter()
                    .map(|declarator| Declarator {
                        name: declarator.name.clone(),
                        initializer: declarator
                            .initializer
                            .as_ref()
                            .map(|e| self.explicit_expression(e, references)),
                        span: declarator.span,
                    })
                    .collect(),
                span: *span,
            },
            Statement::Expression { expression, span } => Statement::Expression {
                expression: self.explicit_expression(expression, references),
                span: *span,
            },
            Statement::Return { value, span } => Statement::Return {
                value: value
                    .as_ref()
                    .map(|v| self.explicit_expression(v, references)),
                span: *span,
            },
            Statement::If {
                condition,
                then_branch,
                else_branch,
                span,
            } => Statement::If {
                condition: self.explicit_expression(condition, references),
                then_branch: Box::new(self.rewrite_statement(then_branch, references, context)),
                else_branch: else_branch
                    .as_ref()
                    .map(|b| Box::new(self.rewrite_statement(b, references, context))),
                span: *span,
            },
            Statement::While {
                condition,
                body,
                span,
            } => Statement::While {
                condition: self.explicit_expression(condition, references),
                body: Box::new(self.rewrite_statement(body, references, context)),
                span: *span,
            },
            Statement::Labeled {
                label,
                statement: inner,
                span,
            } => Statement::Labeled {
                label: label.clone(),
                statement: Box::new(self.rewrite_statement(inner, references, context)),
                span: *span,
            },
            Statement::Goto { .. } | Statement::Empty { .. } => statement.clone(),
        }
    }

    fn explicit_expression(
        &self,
        expression: &Expression,
        references: &[ResolvedReference<'a>],
    ) -> Expression {
        let mut expression = expression.clone();
        self.make_explicit(&mut expression, references);
        expression
    }

    /// Replaces every aspect reference inside `expression` by a call to the
    /// emitted member it resolves to.
    fn make_explicit(&self, expression: &mut Expression, references: &[ResolvedReference<'a>]) {
        match expression {
            // An assignment target is rewritten together with its assignment
            Expression::Assignment { target, value, .. } => {
                target.for_each_child_mut(&mut |child| self.make_explicit(child, references));
                self.make_explicit(value, references);
            }
            _ => expression.for_each_child_mut(&mut |child| self.make_explicit(child, references)),
        }

        if let Some(replacement) = self.explicit_node(expression, references) {
            *expression = replacement;
        }
    }

    fn explicit_node(
        &self,
        expression: &Expression,
        references: &[ResolvedReference<'a>],
    ) -> Option<Expression> {
        if let Expression::Assignment {
            operator,
            target,
            value,
            span,
        } = expression
        {
            let reference = self.explicit_reference(target, references)?;
            let name = member_name(self.compilation, reference.member, reference.position);
            let target_span = target.span();

            let target = match target.as_ref() {
                Expression::ElementAccess { arguments, .. }
                    if reference.position != ChainPosition::Final =>
                {
                    let mut arguments = arguments.clone();
                    arguments.push(value.as_ref().clone());
                    let setter = accessor_method_name(AccessorKind::Set, &name);
                    return Some(invocation(this_member(setter, target_span), arguments, *span));
                }
                Expression::ElementAccess { arguments, .. } => {
                    this_element(arguments.clone(), target_span)
                }
                _ => this_member(name, target_span),
            };

            return Some(Expression::Assignment {
                operator: *operator,
                target: Box::new(target),
                value: value.clone(),
                span: *span,
            });
        }

        let reference = self.explicit_reference(expression, references)?;
        let name = member_name(self.compilation, reference.member, reference.position);

        Some(match expression {
            Expression::ElementAccess {
                arguments, span, ..
            } if reference.position == ChainPosition::Final => this_element(arguments.clone(), *span),
            Expression::ElementAccess {
                arguments, span, ..
            } => invocation(
                this_member(accessor_method_name(AccessorKind::Get, &name), *span),
                arguments.clone(),
                *span,
            ),
            _ => this_member(name, expression.span()),
        })
    }

    /// The resolved reference annotated on `node`, if it is an aspect reference.
    ///
    /// # Panics
    /// Panics on an unannotated aspect reference, on a reference that was
    /// inlined, or on one that was not resolved for the body being linked.
    fn explicit_reference(
        &self,
        node: &Expression,
        references: &[ResolvedReference<'a>],
    ) -> Option<ResolvedReference<'a>> {
        let Some(annotation) = node.annotation() else {
            let unannotated = matches!(
                node,
                Expression::MemberAccess { receiver, .. } | Expression::ElementAccess { receiver, .. }
                    if matches!(receiver.as_ref(), Expression::Reference { .. })
            );
            assert!(!unannotated, "aspect reference at {:?} carries no annotation", node.span());
            return None;
        };

        assert!(
            !self.plan.is_inlined(annotation.id),
            "inlined reference {} survived as an expression",
            annotation.id
        );
        let reference = references.iter().find(|r| r.id == annotation.id).copied();
        assert!(
            reference.is_some(),
            "reference {} was not resolved for the body being linked",
            annotation.id
        );
        reference
    }
}

impl BodyLinker for Linker<'_> {
    fn compilation(&self) -> &Compilation {
        self.compilation
    }

    fn linked_body(&mut self, target: Semantic, context: &LinkingContext) -> Block {
        self.link_body(target, context)
    }

    fn unique_label(&self, base: &str) -> String {
        if !self.labels.contains(base) {
            return base.to_string();
        }
        (2usize..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.labels.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn reserve_label(&mut self, label: &str) {
        self.labels.insert(label.to_string());
    }
}

fn parameters(symbols: &[ParameterSymbol]) -> Vec<Parameter> {
    symbols
        .iter()
        .map(|parameter| Parameter {
            name: parameter.name.clone(),
            ty: parameter.ty.clone(),
            span: Span::default(),
        })
        .collect()
}

/// `this.name`
fn this_member(name: String, span: Span) -> Expression {
    Expression::MemberAccess {
        receiver: Box::new(Expression::This { span }),
        name,
        annotation: None,
        span,
    }
}

/// `this[arguments]`
fn this_element(arguments: Vec<Expression>, span: Span) -> Expression {
    Expression::ElementAccess {
        receiver: Box::new(Expression::This { span }),
        arguments,
        annotation: None,
        span,
    }
}

fn invocation(callee: Expression, arguments: Vec<Expression>, span: Span) -> Expression {
    Expression::Invocation {
        callee: Box::new(callee),
        arguments,
        span,
    }
}
