//! The bound model consumed by the linker.

use rustc_hash::{FxHashMap, FxHashSet};
use weave_core::symbols::{MethodSymbol, SymbolId, SymbolTable};
use weave_core::{ChainPosition, LayerOrder, Semantic, Span, TransformationLayer};
use weave_parser::{Block, FieldDecl};

/// One body of a method or accessor at one chain position.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub block: Block,
    /// Names of every local declared anywhere in the body.
    pub locals: FxHashSet<String>,
    /// Names of every statement label in the body.
    pub labels: FxHashSet<String>,
    pub span: Span,
}

impl Body {
    /// Returns true if `name` is a local of this body.
    #[must_use]
    pub fn declares_local(&self, name: &str) -> bool {
        self.locals.contains(name)
    }
}

/// The bodies contributed at one chain position.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberVersion {
    pub position: ChainPosition,
    /// Method-like symbol (the method itself or one accessor) to its body.
    pub bodies: Vec<(SymbolId, Body)>,
}

impl MemberVersion {
    #[must_use]
    pub fn body(&self, symbol: SymbolId) -> Option<&Body> {
        self.bodies
            .iter()
            .find(|(id, _)| *id == symbol)
            .map(|(_, body)| body)
    }
}

/// The ordered versions of one logical member, original source first.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationChain {
    pub member: SymbolId,
    pub versions: Vec<MemberVersion>,
}

impl DeclarationChain {
    /// Position of the last applied version.
    #[must_use]
    pub fn last_position(&self) -> ChainPosition {
        self.versions
            .last()
            .map_or(ChainPosition::Original, |version| version.position)
    }

    #[must_use]
    pub fn version(&self, position: ChainPosition) -> Option<&MemberVersion> {
        let position = self.normalize(position);
        self.versions.iter().find(|v| v.position == position)
    }

    /// Maps `Final` to the real position of the last version.
    #[must_use]
    pub fn normalize(&self, position: ChainPosition) -> ChainPosition {
        match position {
            ChainPosition::Final => self.last_position(),
            other => other,
        }
    }

    /// Iterates over the real positions of every version, in order.
    pub fn positions(&self) -> impl DoubleEndedIterator<Item = ChainPosition> + '_ {
        self.versions.iter().map(|v| v.position)
    }
}

/// A class as seen by the linker.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassModel {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    /// Logical members (methods, properties, indexers, events) in source order.
    pub members: Vec<SymbolId>,
}

/// Everything the binder knows about a program.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub symbols: SymbolTable,
    pub layers: LayerOrder,
    pub classes: Vec<ClassModel>,
    pub(crate) chains: FxHashMap<SymbolId, DeclarationChain>,
}

impl Compilation {
    /// Returns the chain of a logical member (or of an accessor's owner).
    #[must_use]
    pub fn chain(&self, symbol: SymbolId) -> Option<&DeclarationChain> {
        self.chains.get(&self.symbols.member_of(symbol))
    }

    /// Returns the body of a method-like semantic.
    #[must_use]
    pub fn body(&self, semantic: Semantic) -> Option<&Body> {
        self.chain(semantic.symbol)?
            .version(semantic.position)?
            .body(semantic.symbol)
    }

    /// Returns the real chain position of a semantic (`Final` is mapped to
    /// the last version).
    #[must_use]
    pub fn real_position(&self, semantic: Semantic) -> ChainPosition {
        self.chain(semantic.symbol)
            .map_or(semantic.position, |chain| chain.normalize(semantic.position))
    }

    /// Returns the layer contributing a position, `None` for the original.
    #[must_use]
    pub fn layer_at(&self, position: ChainPosition) -> Option<&TransformationLayer> {
        match position {
            ChainPosition::Layer(index) => self.layers.get(index),
            ChainPosition::Original | ChainPosition::Final => None,
        }
    }

    /// Returns the method symbol of a method-like semantic.
    #[must_use]
    pub fn method(&self, symbol: SymbolId) -> Option<&MethodSymbol> {
        self.symbols.method(symbol)
    }

    /// Returns true if both symbols belong to the same logical member.
    #[must_use]
    pub fn same_member(&self, a: SymbolId, b: SymbolId) -> bool {
        self.symbols.member_of(a) == self.symbols.member_of(b)
    }

    pub fn chains(&self) -> impl Iterator<Item = &DeclarationChain> {
        self.chains.values()
    }
}
