//! Knowledge base: the read-only view of one agent's ontology.
//!
//! The teaching core never touches RDF directly. It asks a [`KnowledgeBase`]
//! for an object's characteristic set (the classes it is declared a member of),
//! for the universe of named individuals, and, when evaluating, for the
//! instances of a class.
//!
//! - [`MemoryKb`]: hash-map backed, for tests and synthetic universes
//! - [`OntologyStore`]: oxigraph-backed, loads OWL / RDF files and answers via SPARQL

pub mod memory;
pub mod ontology;

use std::collections::BTreeSet;

use crate::error::KbResult;
use crate::symbol::{Iri, PropertySet};

pub use memory::MemoryKb;
pub use ontology::OntologyStore;

/// `rdf:type`.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
/// `owl:NamedIndividual`.
pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";

/// Read-only queries over a previously loaded knowledge graph.
pub trait KnowledgeBase {
    /// The classes `object` is declared a member of.
    ///
    /// Unknown objects have an empty characteristic set.
    fn characteristics(&self, object: &Iri) -> KbResult<PropertySet>;

    /// Every declared named individual.
    fn named_individuals(&self) -> KbResult<BTreeSet<Iri>>;

    /// Every object declared a member of `class`.
    fn instances_of(&self, class: &Iri) -> KbResult<BTreeSet<Iri>>;
}

impl<K: KnowledgeBase + ?Sized> KnowledgeBase for &K {
    fn characteristics(&self, object: &Iri) -> KbResult<PropertySet> {
        (**self).characteristics(object)
    }

    fn named_individuals(&self) -> KbResult<BTreeSet<Iri>> {
        (**self).named_individuals()
    }

    fn instances_of(&self, class: &Iri) -> KbResult<BTreeSet<Iri>> {
        (**self).instances_of(class)
    }
}

/// Individuals named identically by both knowledge bases.
pub fn shared_individuals(a: &dyn KnowledgeBase, b: &dyn KnowledgeBase) -> KbResult<BTreeSet<Iri>> {
    let left = a.named_individuals()?;
    let right = b.named_individuals()?;
    Ok(left.intersection(&right).cloned().collect())
}
