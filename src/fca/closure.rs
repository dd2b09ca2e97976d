//! Symbol closure from the query symbol over the relation graph.
//!
//! Reachability is an explicit frontier expansion, so stack depth does not
//! depend on how dense the lattice is, and cycles in the (symmetric)
//! equivalence edges terminate.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::query::Interpretation;
use crate::symbol::PropertySet;

use super::context::FormalContext;
use super::relations::{RelationGraph, RelationKind};
use super::Attribute;

/// Weight of a property equivalent to the query symbol.
pub const EQUIVALENT_WEIGHT: f64 = 10.0;
/// Weight of a property the query symbol implies.
pub const IMPLIED_WEIGHT: f64 = 5.0;

/// Attributes related to the query symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryClosure {
    pub equivalents: BTreeSet<Attribute>,
    /// Implied attributes that are not also equivalent.
    pub implied: BTreeSet<Attribute>,
}

impl QueryClosure {
    /// Weight map over properties; the query symbol never appears in it.
    pub fn to_interpretation(&self) -> Interpretation {
        let mut weights = Interpretation::new();
        for property in self.implied.iter().filter_map(Attribute::as_property) {
            weights.insert(property.clone(), IMPLIED_WEIGHT);
        }
        for property in self.equivalents.iter().filter_map(Attribute::as_property) {
            weights.insert(property.clone(), EQUIVALENT_WEIGHT);
        }
        weights
    }
}

/// The padded context of a logic-based memory.
///
/// Row 0 is the padding row carrying only [`Attribute::Padding`]; every
/// memorised set becomes a row extended with [`Attribute::Query`].
pub fn padded_context<'a>(memorised: impl IntoIterator<Item = &'a PropertySet>) -> FormalContext {
    let padding = std::iter::once(vec![Attribute::Padding]);
    let rows = memorised.into_iter().map(|set| {
        set.iter()
            .cloned()
            .map(Attribute::Property)
            .chain(std::iter::once(Attribute::Query))
            .collect::<Vec<_>>()
    });
    FormalContext::from_rows(padding.chain(rows))
}

/// Every attribute reached from `seeds` over `kind` edges.
///
/// Seeds are part of the result only if some visited node points back to them.
pub fn reachable(
    graph: &RelationGraph,
    seeds: impl IntoIterator<Item = Attribute>,
    kind: RelationKind,
) -> BTreeSet<Attribute> {
    let mut visited: HashSet<Attribute> = HashSet::new();
    let mut frontier: VecDeque<Attribute> = VecDeque::new();
    let mut related = BTreeSet::new();

    for seed in seeds {
        if visited.insert(seed.clone()) {
            frontier.push_back(seed);
        }
    }

    while let Some(node) = frontier.pop_front() {
        for next in graph.neighbors(&node, kind) {
            related.insert(next.clone());
            if visited.insert(next.clone()) {
                frontier.push_back(next.clone());
            }
        }
    }
    related
}

/// Equivalents of the query symbol, then what it and its equivalents imply.
pub fn query_closure(graph: &RelationGraph) -> QueryClosure {
    let equivalents = reachable(graph, [Attribute::Query], RelationKind::Equivalent);

    let seeds = std::iter::once(Attribute::Query).chain(equivalents.iter().cloned());
    let implied = reachable(graph, seeds, RelationKind::Implication)
        .difference(&equivalents)
        .cloned()
        .collect();

    QueryClosure {
        equivalents,
        implied,
    }
}

/// Infer the query's interpretation from memorised positive-property sets.
///
/// An empty memory has an empty interpretation.
pub fn interpret<'a>(memorised: impl IntoIterator<Item = &'a PropertySet>) -> Interpretation {
    let memorised: Vec<&PropertySet> = memorised.into_iter().collect();
    if memorised.is_empty() {
        return Interpretation::new();
    }

    let ctx = padded_context(memorised.iter().copied());
    let graph = RelationGraph::build(&ctx);
    let closure = query_closure(&graph);
    tracing::debug!(
        rows = ctx.num_rows(),
        attributes = ctx.num_attributes(),
        relations = graph.edge_count(),
        equivalents = closure.equivalents.len(),
        implied = closure.implied.len(),
        "closed query symbol"
    );
    closure.to_interpretation()
}
