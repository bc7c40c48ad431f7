use rustc_hash::FxHashMap;

use super::{
    AccessorKind, EventSymbol, MethodSymbol, PropertySymbol, Symbol, SymbolId, SymbolKind,
};

/// Name under which indexers are registered.
pub const INDEXER_NAME: &str = "Item";

/// Central table of every declared symbol.
///
/// The table provides:
/// - Registration and lookup by SymbolId
/// - Member lookup by (containing type, name)
/// - Accessor navigation between properties/events and their accessors
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    containing_types: Vec<String>,
    members: FxHashMap<(String, String), SymbolId>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symbol declared inside `containing_type` and returns its id.
    ///
    /// Accessors are not registered by name; they are reached through their owner.
    pub fn register(&mut self, containing_type: &str, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        if !matches!(symbol.kind(), SymbolKind::Accessor) {
            self.members.insert(
                (containing_type.to_string(), symbol.name().to_string()),
                id,
            );
        }
        self.symbols.push(symbol);
        self.containing_types.push(containing_type.to_string());
        id
    }

    /// Looks up a symbol by id
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.as_usize())
    }

    pub(crate) fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.as_usize())
    }

    /// Looks up a named member of a type
    #[must_use]
    pub fn lookup_member(&self, containing_type: &str, name: &str) -> Option<SymbolId> {
        self.members
            .get(&(containing_type.to_string(), name.to_string()))
            .copied()
    }

    /// Looks up the indexer of a type
    #[must_use]
    pub fn lookup_indexer(&self, containing_type: &str) -> Option<SymbolId> {
        self.lookup_member(containing_type, INDEXER_NAME)
            .filter(|id| self.kind(*id) == Some(SymbolKind::Indexer))
    }

    #[must_use]
    pub fn containing_type(&self, id: SymbolId) -> Option<&str> {
        self.containing_types.get(id.as_usize()).map(String::as_str)
    }

    #[must_use]
    pub fn kind(&self, id: SymbolId) -> Option<SymbolKind> {
        self.get(id).map(Symbol::kind)
    }

    /// Returns the method or accessor symbol for `id`
    #[must_use]
    pub fn method(&self, id: SymbolId) -> Option<&MethodSymbol> {
        match self.get(id) {
            Some(Symbol::Method(method)) => Some(method),
            _ => None,
        }
    }

    /// Returns the property or indexer symbol for `id`
    #[must_use]
    pub fn property(&self, id: SymbolId) -> Option<&PropertySymbol> {
        match self.get(id) {
            Some(Symbol::Property(property)) => Some(property),
            _ => None,
        }
    }

    #[must_use]
    pub fn event(&self, id: SymbolId) -> Option<&EventSymbol> {
        match self.get(id) {
            Some(Symbol::Event(event)) => Some(event),
            _ => None,
        }
    }

    /// Returns the logical member a symbol belongs to: the owner for an
    /// accessor, the symbol itself otherwise.
    #[must_use]
    pub fn member_of(&self, id: SymbolId) -> SymbolId {
        self.method(id).and_then(MethodSymbol::owner).unwrap_or(id)
    }

    /// Navigates from a property, indexer or event to one of its accessors.
    #[must_use]
    pub fn accessor(&self, owner: SymbolId, kind: AccessorKind) -> Option<SymbolId> {
        match (self.get(owner)?, kind) {
            (Symbol::Property(p), AccessorKind::Get) => p.getter,
            (Symbol::Property(p), AccessorKind::Set) => p.setter,
            (Symbol::Event(e), AccessorKind::Add) => e.adder,
            (Symbol::Event(e), AccessorKind::Remove) => e.remover,
            _ => None,
        }
    }

    /// Wires an accessor to its owner after both were registered.
    pub fn attach_accessor(&mut self, owner: SymbolId, kind: AccessorKind, accessor: SymbolId) {
        match (self.get_mut(owner), kind) {
            (Some(Symbol::Property(p)), AccessorKind::Get) => p.getter = Some(accessor),
            (Some(Symbol::Property(p)), AccessorKind::Set) => p.setter = Some(accessor),
            (Some(Symbol::Event(e)), AccessorKind::Add) => e.adder = Some(accessor),
            (Some(Symbol::Event(e)), AccessorKind::Remove) => e.remover = Some(accessor),
            _ => {}
        }
    }

    /// Iterates over all symbols with their ids
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| (SymbolId::new(i as u32), symbol))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
