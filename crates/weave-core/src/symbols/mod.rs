//! Symbol model of the declarations being woven.
//!
//! Symbols are created once by the binder and consumed read-only by the
//! linker. Methods and accessors are both "method-like": each owns a body
//! chain, while properties, indexers and events group their accessors.

mod symbol;
mod symbol_id;
mod table;

pub use symbol::{
    AccessorKind, EventSymbol, FieldSymbol, MethodKind, MethodSymbol, ParameterSymbol,
    PropertySymbol, Symbol, SymbolKind, TypeRef,
};
pub use symbol_id::SymbolId;
pub use table::{INDEXER_NAME, SymbolTable};
