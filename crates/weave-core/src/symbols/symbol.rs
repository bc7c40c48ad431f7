use std::fmt;

use super::SymbolId;

/// A type as written in source. Types are compared by name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef(String);

impl TypeRef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn void() -> Self {
        Self::new("void")
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.0 == "void"
    }

    /// Returns true for the implicitly typed `var` keyword.
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.0 == "var"
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accessor of a property, indexer or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessorKind {
    Get,
    Set,
    Add,
    Remove,
}

impl AccessorKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    /// Returns true if the accessor receives the implicit `value` parameter.
    #[must_use]
    pub const fn has_value_parameter(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: TypeRef,
}

impl ParameterSymbol {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// A plain method declared by name.
    Ordinary,
    /// An accessor belonging to a property, indexer or event.
    Accessor { owner: SymbolId, kind: AccessorKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSymbol {
    pub name: String,
    /// Full parameter list; for accessors this includes index parameters and
    /// the trailing implicit `value`.
    pub parameters: Vec<ParameterSymbol>,
    pub return_type: TypeRef,
    pub kind: MethodKind,
}

impl MethodSymbol {
    #[must_use]
    pub const fn is_ordinary(&self) -> bool {
        matches!(self.kind, MethodKind::Ordinary)
    }

    #[must_use]
    pub const fn accessor_kind(&self) -> Option<AccessorKind> {
        match self.kind {
            MethodKind::Accessor { kind, .. } => Some(kind),
            MethodKind::Ordinary => None,
        }
    }

    #[must_use]
    pub const fn owner(&self) -> Option<SymbolId> {
        match self.kind {
            MethodKind::Accessor { owner, .. } => Some(owner),
            MethodKind::Ordinary => None,
        }
    }
}

/// A property or an indexer (an indexer has index parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySymbol {
    pub name: String,
    pub ty: TypeRef,
    pub parameters: Vec<ParameterSymbol>,
    pub is_indexer: bool,
    pub getter: Option<SymbolId>,
    pub setter: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSymbol {
    pub name: String,
    pub ty: TypeRef,
    pub adder: Option<SymbolId>,
    pub remover: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSymbol {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Method,
    Accessor,
    Property,
    Indexer,
    Event,
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Method(MethodSymbol),
    Property(PropertySymbol),
    Event(EventSymbol),
    Field(FieldSymbol),
}

impl Symbol {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Method(m) => &m.name,
            Self::Property(p) => &p.name,
            Self::Event(e) => &e.name,
            Self::Field(f) => &f.name,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        match self {
            Self::Method(m) if m.is_ordinary() => SymbolKind::Method,
            Self::Method(_) => SymbolKind::Accessor,
            Self::Property(p) if p.is_indexer => SymbolKind::Indexer,
            Self::Property(_) => SymbolKind::Property,
            Self::Event(_) => SymbolKind::Event,
            Self::Field(_) => SymbolKind::Field,
        }
    }
}
