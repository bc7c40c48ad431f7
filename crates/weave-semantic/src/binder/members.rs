//! Member registration and override validation.

use rustc_hash::FxHashSet;
use weave_core::symbols::{
    AccessorKind, EventSymbol, FieldSymbol, MethodKind, MethodSymbol, ParameterSymbol,
    PropertySymbol, Symbol, SymbolId, SymbolKind, TypeRef,
};
use weave_core::{ChainPosition, Error, Result, Span};
use weave_parser::{AccessorDecl, Block, ClassDecl, LayerDecl, Member, Parameter};

use super::core::Binder;
use crate::compilation::{Body, ClassModel, DeclarationChain, MemberVersion};

fn parameter_symbols(parameters: &[Parameter]) -> Vec<ParameterSymbol> {
    parameters
        .iter()
        .map(|p| ParameterSymbol::new(p.name.clone(), p.ty.clone()))
        .collect()
}

fn accessor_kinds(accessors: &[AccessorDecl]) -> FxHashSet<AccessorKind> {
    accessors.iter().map(|a| a.kind).collect()
}

/// Body with its span; declarations are collected when the chain is complete.
fn raw_body(block: &Block) -> Body {
    Body {
        block: block.clone(),
        locals: FxHashSet::default(),
        labels: FxHashSet::default(),
        span: block.span,
    }
}

impl Binder {
    /// Registers every member declared without `[override ...]`.
    pub(crate) fn bind_source_members(&mut self, class: &ClassDecl) -> Result<()> {
        let mut model = ClassModel {
            name: class.name.clone(),
            fields: Vec::new(),
            members: Vec::new(),
        };

        for member in class.members.iter().filter(|m| m.layer().is_none()) {
            if self.symbols.lookup_member(&class.name, member.name()).is_some() {
                return Err(Error::Semantic(
                    format!(
                        "Member '{}' is declared more than once in '{}'",
                        member.name(),
                        class.name
                    ),
                    member.span(),
                ));
            }

            match member {
                Member::Field(field) => {
                    self.symbols.register(
                        &class.name,
                        Symbol::Field(FieldSymbol {
                            name: field.name.clone(),
                            ty: field.ty.clone(),
                        }),
                    );
                    model.fields.push(field.clone());
                }
                Member::Method(method) => {
                    let id = self.symbols.register(
                        &class.name,
                        Symbol::Method(MethodSymbol {
                            name: method.name.clone(),
                            parameters: parameter_symbols(&method.parameters),
                            return_type: method.return_type.clone(),
                            kind: MethodKind::Ordinary,
                        }),
                    );
                    self.start_chain(id, vec![(id, raw_body(&method.body))]);
                    model.members.push(id);
                }
                Member::Property(property) => {
                    let id = self.symbols.register(
                        &class.name,
                        Symbol::Property(PropertySymbol {
                            name: property.name.clone(),
                            ty: property.ty.clone(),
                            parameters: parameter_symbols(&property.parameters),
                            is_indexer: property.is_indexer,
                            getter: None,
                            setter: None,
                        }),
                    );
                    let index = parameter_symbols(&property.parameters);
                    let bodies = self.register_accessors(
                        &class.name,
                        id,
                        &property.name,
                        &property.ty,
                        &index,
                        &property.accessors,
                    );
                    self.start_chain(id, bodies);
                    model.members.push(id);
                }
                Member::Event(event) => {
                    let id = self.symbols.register(
                        &class.name,
                        Symbol::Event(EventSymbol {
                            name: event.name.clone(),
                            ty: event.ty.clone(),
                            adder: None,
                            remover: None,
                        }),
                    );
                    let bodies = self.register_accessors(
                        &class.name,
                        id,
                        &event.name,
                        &event.ty,
                        &[],
                        &event.accessors,
                    );
                    self.start_chain(id, bodies);
                    model.members.push(id);
                }
            }
        }

        self.classes.push(model);
        Ok(())
    }

    /// Registers accessor method symbols and wires them to their owner.
    ///
    /// Getters take the index parameters and return the member type; every
    /// other accessor additionally takes `value` and returns `void`.
    fn register_accessors(
        &mut self,
        class: &str,
        owner: SymbolId,
        name: &str,
        ty: &TypeRef,
        index: &[ParameterSymbol],
        accessors: &[AccessorDecl],
    ) -> Vec<(SymbolId, Body)> {
        let mut bodies = Vec::new();

        for accessor in accessors {
            let mut parameters = index.to_vec();
            let return_type = if accessor.kind.has_value_parameter() {
                parameters.push(ParameterSymbol::new("value", ty.clone()));
                TypeRef::void()
            } else {
                ty.clone()
            };

            let id = self.symbols.register(
                class,
                Symbol::Method(MethodSymbol {
                    name: format!("{}_{name}", accessor.kind),
                    parameters,
                    return_type,
                    kind: MethodKind::Accessor {
                        owner,
                        kind: accessor.kind,
                    },
                }),
            );
            self.symbols.attach_accessor(owner, accessor.kind, id);
            bodies.push((id, raw_body(&accessor.body)));
        }

        bodies
    }

    fn start_chain(&mut self, member: SymbolId, bodies: Vec<(SymbolId, Body)>) {
        self.chains.insert(
            member,
            DeclarationChain {
                member,
                versions: vec![MemberVersion {
                    position: ChainPosition::Original,
                    bodies,
                }],
            },
        );
    }

    /// Adds the version contributed by every `[override ...]` member.
    pub(crate) fn bind_overrides(&mut self, class: &ClassDecl) -> Result<()> {
        for member in &class.members {
            let Some(layer) = member.layer() else {
                continue;
            };
            let position = self.layer_position(layer)?;

            let Some(source) = self.symbols.lookup_member(&class.name, member.name()) else {
                return Err(Error::Semantic(
                    format!(
                        "Override of '{}' in layer '{layer}' has no source declaration",
                        member.name()
                    ),
                    member.span(),
                ));
            };

            let bodies = self.override_bodies(source, member)?;

            let Some(chain) = self.chains.get_mut(&source) else {
                return Err(Error::Semantic(
                    format!("'{}' cannot be overridden", member.name()),
                    member.span(),
                ));
            };
            if chain.versions.iter().any(|v| v.position == position) {
                return Err(Error::Semantic(
                    format!(
                        "'{}' is overridden more than once in layer '{layer}'",
                        member.name()
                    ),
                    layer.span,
                ));
            }

            chain.versions.push(MemberVersion { position, bodies });
            chain.versions.sort_by_key(|v| v.position);
        }

        Ok(())
    }

    fn layer_position(&self, layer: &LayerDecl) -> Result<ChainPosition> {
        self.layers
            .index_of(&layer.to_layer())
            .map(ChainPosition::Layer)
            .ok_or_else(|| {
                Error::Semantic(format!("Unknown layer '{layer}'"), layer.span)
            })
    }

    /// Checks that an override has the same signature as its source member
    /// and maps its bodies onto the source member's method-like symbols.
    fn override_bodies(&self, source: SymbolId, member: &Member) -> Result<Vec<(SymbolId, Body)>> {
        let mismatch = |what: &str, span: Span| {
            Err(Error::Semantic(
                format!(
                    "Override of '{}' does not match the source declaration: {what}",
                    member.name()
                ),
                span,
            ))
        };

        let expected_kind = match member {
            Member::Method(_) => SymbolKind::Method,
            Member::Property(p) if p.is_indexer => SymbolKind::Indexer,
            Member::Property(_) => SymbolKind::Property,
            Member::Event(_) => SymbolKind::Event,
            Member::Field(_) => SymbolKind::Field,
        };
        if self.symbols.kind(source) != Some(expected_kind) {
            return mismatch("different member kind", member.span());
        }

        match member {
            Member::Method(method) => {
                let Some(symbol) = self.symbols.method(source) else {
                    return mismatch("different member kind", method.span);
                };
                if symbol.parameters != parameter_symbols(&method.parameters) {
                    return mismatch("different parameters", method.span);
                }
                if symbol.return_type != method.return_type {
                    return mismatch("different return type", method.span);
                }
                Ok(vec![(source, raw_body(&method.body))])
            }
            Member::Property(property) => {
                let Some(symbol) = self.symbols.property(source) else {
                    return mismatch("different member kind", property.span);
                };
                if symbol.ty != property.ty {
                    return mismatch("different type", property.span);
                }
                if symbol.parameters != parameter_symbols(&property.parameters) {
                    return mismatch("different parameters", property.span);
                }
                self.accessor_bodies(source, &property.accessors, property.span)
            }
            Member::Event(event) => {
                let Some(symbol) = self.symbols.event(source) else {
                    return mismatch("different member kind", event.span);
                };
                if symbol.ty != event.ty {
                    return mismatch("different type", event.span);
                }
                self.accessor_bodies(source, &event.accessors, event.span)
            }
            Member::Field(field) => mismatch("fields cannot be overridden", field.span),
        }
    }

    fn accessor_bodies(
        &self,
        owner: SymbolId,
        accessors: &[AccessorDecl],
        span: Span,
    ) -> Result<Vec<(SymbolId, Body)>> {
        let declared: FxHashSet<AccessorKind> = [
            AccessorKind::Get,
            AccessorKind::Set,
            AccessorKind::Add,
            AccessorKind::Remove,
        ]
        .into_iter()
        .filter(|kind| self.symbols.accessor(owner, *kind).is_some())
        .collect();

        if declared != accessor_kinds(accessors) {
            return Err(Error::Semantic(
                "Override must declare the same accessors as the source declaration".to_string(),
                span,
            ));
        }

        Ok(accessors
            .iter()
            .filter_map(|accessor| {
                self.symbols
                    .accessor(owner, accessor.kind)
                    .map(|id| (id, raw_body(&accessor.body)))
            })
            .collect())
    }
}
