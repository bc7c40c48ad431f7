//! Core binder structure.

use rustc_hash::FxHashMap;
use tracing::debug;
use weave_core::symbols::{SymbolId, SymbolTable};
use weave_core::{Error, LayerOrder, Result};
use weave_parser::{LayerDecl, Program};

use crate::compilation::{ClassModel, Compilation, DeclarationChain};

/// Builds a [`Compilation`] from a parsed program.
///
/// Binding runs in three passes: layers, then source members of every class,
/// then layer overrides. Bodies are validated and annotated last, once every
/// member a reference could name is known.
#[derive(Debug, Default)]
pub struct Binder {
    pub(crate) symbols: SymbolTable,
    pub(crate) layers: LayerOrder,
    pub(crate) classes: Vec<ClassModel>,
    pub(crate) chains: FxHashMap<SymbolId, DeclarationChain>,
    pub(crate) next_reference: u32,
}

impl Binder {
    /// Creates a new binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a complete program.
    pub fn bind_program(mut self, program: &Program) -> Result<Compilation> {
        self.bind_layers(&program.layers)?;

        for class in &program.classes {
            if self.classes.iter().any(|c| c.name == class.name) {
                return Err(Error::Semantic(
                    format!("Class '{}' is declared more than once", class.name),
                    class.span,
                ));
            }
            self.bind_source_members(class)?;
            self.bind_overrides(class)?;
        }

        self.check_field_initializers()?;

        let members: Vec<(String, SymbolId)> = self
            .classes
            .iter()
            .flat_map(|class| class.members.iter().map(|m| (class.name.clone(), *m)))
            .collect();
        for (class, member) in members {
            self.bind_chain_bodies(&class, member)?;
        }

        debug!(
            classes = self.classes.len(),
            chains = self.chains.len(),
            references = self.next_reference,
            "bound program"
        );

        Ok(Compilation {
            symbols: self.symbols,
            layers: self.layers,
            classes: self.classes,
            chains: self.chains,
        })
    }

    fn bind_layers(&mut self, layers: &[LayerDecl]) -> Result<()> {
        for layer in layers {
            if self.layers.push(layer.to_layer()).is_none() {
                return Err(Error::Semantic(
                    format!("Layer '{layer}' is declared more than once"),
                    layer.span,
                ));
            }
        }
        Ok(())
    }
}
