//! Linking analysis: which references are inlined and which bodies must be
//! emitted as helper members.

use std::ptr;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};
use weave_core::symbols::{AccessorKind, SymbolId};
use weave_core::{Error, ReferenceId, Result, Semantic};
use weave_semantic::Compilation;
use weave_utils::LinkerOptions;

use crate::inlining::{Inliner, InlinerRegistry};
use crate::reference::{ResolvedReference, collect_references};

const ACCESSOR_KINDS: [AccessorKind; 4] = [
    AccessorKind::Get,
    AccessorKind::Set,
    AccessorKind::Add,
    AccessorKind::Remove,
];

/// Method-like symbols of a logical member: the method itself, or the
/// accessors of a property, indexer or event.
#[must_use]
pub fn method_like_symbols(compilation: &Compilation, member: SymbolId) -> Vec<SymbolId> {
    if compilation.method(member).is_some() {
        return vec![member];
    }
    ACCESSOR_KINDS
        .iter()
        .filter_map(|kind| compilation.symbols.accessor(member, *kind))
        .collect()
}

/// The decisions of one linking pass.
#[derive(Debug, Default)]
pub struct LinkPlan<'a> {
    /// Resolved references of every reachable body.
    references: FxHashMap<Semantic, Vec<ResolvedReference<'a>>>,
    /// Reachable bodies in discovery order.
    order: Vec<Semantic>,
    inlined: FxHashMap<ReferenceId, &'static Inliner>,
    helpers: FxHashSet<Semantic>,
}

impl<'a> LinkPlan<'a> {
    /// References of a reachable body.
    #[must_use]
    pub fn references(&self, semantic: Semantic) -> Option<&[ResolvedReference<'a>]> {
        self.references.get(&semantic).map(Vec::as_slice)
    }

    /// The inliner selected for a reference, `None` if it stays a call.
    #[must_use]
    pub fn inliner(&self, reference: ReferenceId) -> Option<&'static Inliner> {
        self.inlined.get(&reference).copied()
    }

    #[must_use]
    pub fn is_inlined(&self, reference: ReferenceId) -> bool {
        self.inlined.contains_key(&reference)
    }

    /// Non-final bodies still called explicitly, ordered by position.
    #[must_use]
    pub fn helpers_of(&self, compilation: &Compilation, member: SymbolId) -> Vec<Semantic> {
        let mut helpers: Vec<Semantic> = self
            .helpers
            .iter()
            .filter(|semantic| compilation.symbols.member_of(semantic.symbol) == member)
            .copied()
            .collect();
        helpers.sort_by_key(|semantic| (semantic.position, semantic.symbol));
        helpers
    }

    #[must_use]
    pub fn reachable(&self) -> &[Semantic] {
        &self.order
    }

    #[must_use]
    pub fn inlined_count(&self) -> usize {
        self.inlined.len()
    }

    #[must_use]
    pub fn helper_count(&self) -> usize {
        self.helpers.len()
    }
}

/// Analyzes every body reachable from the final versions.
///
/// # Errors
/// Returns resolution errors for references with no qualifying version and
/// a linker error if a referenced version has no body.
pub fn analyze<'a>(compilation: &'a Compilation, options: &LinkerOptions) -> Result<LinkPlan<'a>> {
    let mut plan = LinkPlan::default();
    let mut counts: FxHashMap<Semantic, usize> = FxHashMap::default();

    let mut pending: Vec<Semantic> = compilation
        .classes
        .iter()
        .flat_map(|class| &class.members)
        .flat_map(|member| method_like_symbols(compilation, *member))
        .map(Semantic::final_of)
        .rev()
        .collect();

    while let Some(semantic) = pending.pop() {
        if plan.references.contains_key(&semantic) {
            continue;
        }
        let Some(body) = compilation.body(semantic) else {
            return Err(Error::Linker(format!("no body for {semantic}")));
        };

        let references = collect_references(compilation, semantic, &body.block)?;
        for reference in &references {
            for target in reference.targets(compilation) {
                *counts.entry(target).or_default() += 1;
                if !target.is_final() {
                    pending.push(target);
                }
            }
        }

        plan.order.push(semantic);
        plan.references.insert(semantic, references);
    }

    let registry = InlinerRegistry::new(compilation);
    let mut explicit = 0;
    for semantic in &plan.order {
        let references = &plan.references[semantic];
        for reference in references {
            let inliner = options
                .inlining
                .then(|| select(compilation, &registry, &counts, references, reference))
                .flatten();

            match inliner {
                Some(inliner) => {
                    debug!(reference = %reference.id, inliner = %inliner.kind(), "inline");
                    plan.inlined.insert(reference.id, inliner);
                }
                None => {
                    debug!(reference = %reference.id, position = %reference.position, "explicit call");
                    explicit += 1;
                    plan.helpers.extend(
                        reference
                            .targets(compilation)
                            .into_iter()
                            .filter(|target| !target.is_final()),
                    );
                }
            }
        }
    }

    info!(
        bodies = plan.order.len(),
        inlined = plan.inlined.len(),
        explicit,
        helpers = plan.helpers.len(),
        "analyzed linking pass"
    );
    Ok(plan)
}

/// Applies the inlining conditions to one reference.
fn select(
    compilation: &Compilation,
    registry: &InlinerRegistry<'_>,
    counts: &FxHashMap<Semantic, usize>,
    siblings: &[ResolvedReference<'_>],
    reference: &ResolvedReference<'_>,
) -> Option<&'static Inliner> {
    let targets = reference.targets(compilation);
    let [target] = targets.as_slice() else {
        return None;
    };
    let target = *target;

    let eligible = !target.is_final()
        && compilation.same_member(reference.containing.symbol, target.symbol)
        && !reference.is_self_reference(compilation)
        && counts.get(&target) == Some(&1)
        && siblings
            .iter()
            .filter(|other| ptr::eq(other.statement, reference.statement))
            .count()
            == 1;

    if eligible {
        registry.try_get_inliner(reference)
    } else {
        None
    }
}
