//! Names of emitted helper members.

use weave_core::symbols::{AccessorKind, SymbolId};
use weave_core::ChainPosition;
use weave_semantic::Compilation;

/// Suffix of helpers holding the original source body.
pub const SOURCE_SUFFIX: &str = "Source";

/// Name under which the version of `member` at `position` is emitted:
/// `Foo` for the final version, `Foo_Source` for the original and
/// `Foo_Cache_Read` for the version of layer `Cache.Read`.
#[must_use]
pub fn member_name(compilation: &Compilation, member: SymbolId, position: ChainPosition) -> String {
    let name = compilation.symbols.get(member).map_or("", |symbol| symbol.name());
    match position {
        ChainPosition::Final => name.to_string(),
        ChainPosition::Original => format!("{name}_{SOURCE_SUFFIX}"),
        ChainPosition::Layer(_) => match compilation.layer_at(position) {
            Some(layer) => format!("{name}_{}", layer.member_suffix()),
            None => format!("{name}_{position}"),
        },
    }
}

/// Name of an indexer helper accessor emitted as a method, e.g. `get_Item_Source`.
#[must_use]
pub fn accessor_method_name(kind: AccessorKind, member_name: &str) -> String {
    format!("{}_{member_name}", kind.keyword())
}
