//! Resolution of relative aspect references to absolute chain positions.

use weave_core::symbols::SymbolId;
use weave_core::{ChainPosition, Error, ReferenceOrder, Result, Semantic, Span};

use crate::compilation::Compilation;

/// Maps `base`/`previous`/`current`/`final` to a position in the referenced
/// member's chain, as seen from the body containing the reference.
pub struct ReferenceResolver<'a> {
    compilation: &'a Compilation,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(compilation: &'a Compilation) -> Self {
        Self { compilation }
    }

    /// Resolves `order` applied to `target` from inside `containing`.
    ///
    /// The result is `Final` whenever the selected version is the last one
    /// of the target chain.
    ///
    /// # Errors
    /// Returns [`Error::Resolution`] when no version qualifies, e.g. `base`
    /// used inside an original source body.
    pub fn resolve(
        &self,
        containing: Semantic,
        target: SymbolId,
        order: ReferenceOrder,
        span: Span,
    ) -> Result<ChainPosition> {
        if order == ReferenceOrder::Final {
            return Ok(ChainPosition::Final);
        }

        let Some(chain) = self.compilation.chain(target) else {
            return Err(Error::Resolution(
                format!("'{}' has no declaration chain", symbol_name(self.compilation, target)),
                span,
            ));
        };

        let here = self.compilation.real_position(containing);
        let here_aspect = self.aspect_of(here);

        let resolved = match order {
            ReferenceOrder::Previous => chain.positions().rev().find(|p| *p < here),
            ReferenceOrder::Base => chain.positions().rev().find(|p| {
                *p < here && (*p == ChainPosition::Original || self.aspect_of(*p) != here_aspect)
            }),
            ReferenceOrder::Current => chain.positions().rev().find(|p| *p <= here),
            ReferenceOrder::Final => Some(ChainPosition::Final),
        };

        let Some(position) = resolved else {
            let name = symbol_name(self.compilation, target);
            return Err(Error::Resolution(
                format!("'{order}.{name}' has no version before {here}"),
                span,
            ));
        };

        if position == chain.last_position() {
            Ok(ChainPosition::Final)
        } else {
            Ok(position)
        }
    }

    fn aspect_of(&self, position: ChainPosition) -> Option<&'a str> {
        self.compilation
            .layer_at(position)
            .map(|layer| layer.aspect.as_str())
    }
}

fn symbol_name(compilation: &Compilation, id: SymbolId) -> &str {
    compilation.symbols.get(id).map_or("?", |s| s.name())
}
