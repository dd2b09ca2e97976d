//! Query executor: rank object groups against a weighted interpretation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::group::{GroupId, PropertyGroups};
use crate::symbol::Iri;

/// Property → weight. Absent properties weigh nothing.
pub type Interpretation = BTreeMap<Iri, f64>;

/// Groups in ranked order, and their members flattened in that order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedResults {
    pub groups: Vec<(GroupId, f64)>,
    pub objects: Vec<Iri>,
}

impl RankedResults {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The result objects as a set, for evaluation.
    pub fn object_set(&self) -> BTreeSet<Iri> {
        self.objects.iter().cloned().collect()
    }
}

/// Properties with a strictly positive weight.
pub fn positive_properties(weights: &Interpretation) -> BTreeSet<&Iri> {
    weights
        .iter()
        .filter(|(_, w)| **w > 0.0)
        .map(|(p, _)| p)
        .collect()
}

/// Rank every group that carries at least one positively weighted property.
///
/// A candidate group scores the sum of the weights of *all* its scored
/// properties, negative ones included. Ties keep group discovery order.
pub fn execute(groups: &PropertyGroups, weights: &Interpretation) -> RankedResults {
    let positive = positive_properties(weights);
    if positive.is_empty() {
        return RankedResults::default();
    }

    let mut ranked: Vec<(GroupId, f64)> = groups
        .iter()
        .filter(|g| g.characteristics.iter().any(|p| positive.contains(p)))
        .map(|g| {
            let score = g
                .characteristics
                .iter()
                .filter_map(|p| weights.get(p))
                .sum::<f64>();
            (g.id, score)
        })
        .collect();

    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let objects = ranked
        .iter()
        .flat_map(|(id, _)| groups.members(*id).iter().cloned())
        .collect();

    tracing::trace!(candidates = ranked.len(), "executed query");
    RankedResults {
        groups: ranked,
        objects,
    }
}
