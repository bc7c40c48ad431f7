//! Aspect references and the positions they resolve to.

use std::fmt;

use crate::LayerIndex;
use crate::symbols::SymbolId;

/// Relative marker written at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceOrder {
    /// The version before the referencing aspect was applied.
    Base,
    /// The version immediately before the referencing layer.
    Previous,
    /// The version as seen by the referencing layer.
    Current,
    /// The final, fully woven version.
    Final,
}

impl ReferenceOrder {
    /// Returns the keyword used in source for this order.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Previous => "previous",
            Self::Current => "current",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for ReferenceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Unique identity of one aspect-reference call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId(u32);

impl ReferenceId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref#{}", self.0)
    }
}

/// Annotation attached by the binder to every aspect-reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceAnnotation {
    pub id: ReferenceId,
    pub order: ReferenceOrder,
    /// The member named at the call site (method, property, indexer or event).
    pub target: SymbolId,
}

/// Absolute position inside a declaration chain.
///
/// Ordered from the original source body up to the final version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainPosition {
    Original,
    Layer(LayerIndex),
    Final,
}

impl fmt::Display for ChainPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Layer(index) => write!(f, "layer {index}"),
            Self::Final => write!(f, "final"),
        }
    }
}

/// A concrete body: a method-like symbol (method or accessor) at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Semantic {
    pub symbol: SymbolId,
    pub position: ChainPosition,
}

impl Semantic {
    #[must_use]
    pub const fn new(symbol: SymbolId, position: ChainPosition) -> Self {
        Self { symbol, position }
    }

    #[must_use]
    pub const fn final_of(symbol: SymbolId) -> Self {
        Self::new(symbol, ChainPosition::Final)
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self.position, ChainPosition::Final)
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_position_ordering() {
        let first = ChainPosition::Layer(LayerIndex::new(0));
        let second = ChainPosition::Layer(LayerIndex::new(1));

        assert!(ChainPosition::Original < first);
        assert!(first < second);
        assert!(second < ChainPosition::Final);
    }

    #[test]
    fn test_reference_order_keywords() {
        assert_eq!(ReferenceOrder::Base.keyword(), "base");
        assert_eq!(ReferenceOrder::Final.to_string(), "final");
    }
}
