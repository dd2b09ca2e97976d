//! Per-agent session: the grouping and concepts over the shared universe.
//!
//! An [`AgentSession`] is built once before any query and is read-only
//! afterwards. Teachers and students borrow it; each query gets fresh
//! strategies, never fresh sessions.

use std::collections::BTreeSet;

use crate::alignment::InstanceAlignment;
use crate::concept::ConceptIndex;
use crate::error::KbResult;
use crate::group::PropertyGroups;
use crate::kb::KnowledgeBase;
use crate::symbol::{Iri, PropertySet};

/// One agent's prepared view of the mutually-known universe.
pub struct AgentSession<'kb> {
    name: String,
    kb: &'kb dyn KnowledgeBase,
    alignment: InstanceAlignment,
    groups: PropertyGroups,
    concepts: ConceptIndex,
}

impl<'kb> AgentSession<'kb> {
    /// Group the alignment's domain and derive its concepts.
    pub fn prepare(
        name: impl Into<String>,
        kb: &'kb dyn KnowledgeBase,
        alignment: InstanceAlignment,
    ) -> KbResult<Self> {
        let name = name.into();
        let groups = PropertyGroups::build(kb, alignment.domain().cloned())?;
        let concepts = ConceptIndex::build(&groups);
        tracing::info!(
            agent = %name,
            shared_objects = alignment.len(),
            groups = groups.len(),
            concepts = concepts.len(),
            "prepared agent session"
        );
        Ok(Self {
            name,
            kb,
            alignment,
            groups,
            concepts,
        })
    }

    /// Prepare over every named individual with an identity alignment.
    ///
    /// For inspecting a single ontology; there is no partner to talk to.
    pub fn standalone(name: impl Into<String>, kb: &'kb dyn KnowledgeBase) -> KbResult<Self> {
        let alignment = InstanceAlignment::identity(kb.named_individuals()?);
        Self::prepare(name, kb, alignment)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kb(&self) -> &'kb dyn KnowledgeBase {
        self.kb
    }

    pub fn alignment(&self) -> &InstanceAlignment {
        &self.alignment
    }

    pub fn groups(&self) -> &PropertyGroups {
        &self.groups
    }

    pub fn concepts(&self) -> &ConceptIndex {
        &self.concepts
    }

    /// Size of the shared universe, the denominator of property frequencies.
    pub fn universe_size(&self) -> usize {
        self.alignment.len()
    }

    /// Distinct characteristic sets in use.
    pub fn all_used_properties(&self) -> BTreeSet<PropertySet> {
        self.groups
            .iter()
            .map(|g| g.characteristics.clone())
            .collect()
    }

    /// The teacher-side answer to a query: shared objects of `class`, translated.
    pub fn translated_instances_of(&self, class: &Iri) -> KbResult<BTreeSet<Iri>> {
        let own = self.kb.instances_of(class)?;
        Ok(self.alignment.translate_all(own.iter()))
    }
}

impl std::fmt::Debug for AgentSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("name", &self.name)
            .field("shared_objects", &self.alignment.len())
            .field("groups", &self.groups.len())
            .field("concepts", &self.concepts.len())
            .finish()
    }
}
