//! Concept building: candidate denotations from pairwise group comparisons.
//!
//! For every ordered pair of distinct groups `(A, B)`, the positive property set
//! `chars(A) − chars(B)` is what an example "object of A, contrasted with an
//! object of B" can demonstrate. Each distinct non-empty difference is a
//! concept. The index remembers which comparisons produce which concept, so a
//! teacher can go from a query term to concrete example pairs.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ConceptError, ConceptResult};
use crate::group::{GroupId, PropertyGroups};
use crate::symbol::{Iri, PropertySet};

/// Concepts wider than this are refused by [`ConceptIndex::powerset_concepts`].
pub const MAX_POWERSET_WIDTH: usize = 20;

/// Dense identifier of a concept, assigned in first-seen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptId(pub usize);

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "concept:{}", self.0)
    }
}

/// An ordered group comparison `(relevant, irrelevant)`.
pub type Comparison = (GroupId, GroupId);

/// All concepts derivable from one grouping.
#[derive(Debug, Clone, Default)]
pub struct ConceptIndex {
    concepts: Vec<PropertySet>,
    by_set: HashMap<PropertySet, ConceptId>,
    comparisons: Vec<BTreeSet<Comparison>>,
    comparison_concept: HashMap<Comparison, ConceptId>,
}

impl ConceptIndex {
    /// Compare every ordered pair of distinct groups.
    pub fn build(groups: &PropertyGroups) -> Self {
        let mut index = Self::default();
        for a in groups.iter() {
            for b in groups.iter() {
                if a.id == b.id {
                    continue;
                }
                let diff = a.characteristics.difference(&b.characteristics);
                if diff.is_empty() {
                    continue;
                }
                index.register(diff, (a.id, b.id));
            }
        }
        tracing::debug!(
            groups = groups.len(),
            concepts = index.concepts.len(),
            comparisons = index.comparison_concept.len(),
            "built concept index"
        );
        index
    }

    fn register(&mut self, positive: PropertySet, comparison: Comparison) {
        let id = match self.by_set.get(&positive) {
            Some(&id) => id,
            None => {
                let id = ConceptId(self.concepts.len());
                self.by_set.insert(positive.clone(), id);
                self.concepts.push(positive);
                self.comparisons.push(BTreeSet::new());
                id
            }
        };
        self.comparisons[id.0].insert(comparison);
        self.comparison_concept.insert(comparison, id);
    }

    pub fn get(&self, id: ConceptId) -> Option<&PropertySet> {
        self.concepts.get(id.0)
    }

    pub fn id_of(&self, positive: &PropertySet) -> Option<ConceptId> {
        self.by_set.get(positive).copied()
    }

    /// Every group comparison producing this concept.
    pub fn comparisons(&self, id: ConceptId) -> Option<&BTreeSet<Comparison>> {
        self.comparisons.get(id.0)
    }

    /// The concept a comparison produces, if its difference is non-empty.
    pub fn concept_of(&self, comparison: Comparison) -> Option<ConceptId> {
        self.comparison_concept.get(&comparison).copied()
    }

    /// Concepts mentioning `property`.
    ///
    /// With `exact`, only the concept that is exactly `{property}`; otherwise
    /// every concept containing it.
    pub fn containing(&self, property: &Iri, exact: bool) -> BTreeSet<ConceptId> {
        if exact {
            return self
                .id_of(&PropertySet::singleton(property.clone()))
                .into_iter()
                .collect();
        }
        self.iter()
            .filter(|(_, set)| set.contains(property))
            .map(|(id, _)| id)
            .collect()
    }

    /// Registered concepts among the subsets of concept `id` (including itself).
    ///
    /// Enumerates all `2^n` subsets, so concepts wider than
    /// [`MAX_POWERSET_WIDTH`] are refused.
    pub fn powerset_concepts(&self, id: ConceptId) -> ConceptResult<BTreeSet<ConceptId>> {
        let set = self.get(id).ok_or(ConceptError::NotFound { id: id.0 })?;
        let members: Vec<&Iri> = set.iter().collect();
        let width = members.len();
        if width > MAX_POWERSET_WIDTH {
            return Err(ConceptError::PowersetTooLarge {
                id: id.0,
                width,
                limit: MAX_POWERSET_WIDTH,
            });
        }

        let mut found = BTreeSet::new();
        for mask in 0u64..(1u64 << width) {
            let subset: PropertySet = members
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, p)| (*p).clone())
                .collect();
            if let Some(sub_id) = self.id_of(&subset) {
                found.insert(sub_id);
            }
        }
        Ok(found)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConceptId, &PropertySet)> {
        self.concepts
            .iter()
            .enumerate()
            .map(|(i, set)| (ConceptId(i), set))
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}
