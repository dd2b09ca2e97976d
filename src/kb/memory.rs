//! In-memory knowledge base.

use std::collections::{BTreeSet, HashMap};

use crate::error::KbResult;
use crate::symbol::{Iri, PropertySet};

use super::KnowledgeBase;

/// A knowledge base held entirely in a hash map: individual → classes.
#[derive(Debug, Clone, Default)]
pub struct MemoryKb {
    individuals: HashMap<Iri, PropertySet>,
}

impl MemoryKb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an individual with the given classes, replacing any earlier declaration.
    pub fn with_individual<I, S>(mut self, individual: impl AsRef<str>, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(Iri::new(individual), classes.into_iter().map(Iri::new).collect());
        self
    }

    pub fn insert(&mut self, individual: Iri, classes: PropertySet) {
        self.individuals.insert(individual, classes);
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

impl KnowledgeBase for MemoryKb {
    fn characteristics(&self, object: &Iri) -> KbResult<PropertySet> {
        Ok(self.individuals.get(object).cloned().unwrap_or_default())
    }

    fn named_individuals(&self) -> KbResult<BTreeSet<Iri>> {
        Ok(self.individuals.keys().cloned().collect())
    }

    fn instances_of(&self, class: &Iri) -> KbResult<BTreeSet<Iri>> {
        Ok(self
            .individuals
            .iter()
            .filter(|(_, classes)| classes.contains(class))
            .map(|(individual, _)| individual.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::props;

    #[test]
    fn answers_the_three_queries() {
        let kb = MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("b1", ["Person"]);

        assert_eq!(
            kb.characteristics(&Iri::new("a1")).unwrap(),
            props(["Author", "Person"])
        );
        assert!(kb.characteristics(&Iri::new("nobody")).unwrap().is_empty());
        assert_eq!(kb.named_individuals().unwrap().len(), 2);
        assert_eq!(
            kb.instances_of(&Iri::new("Author")).unwrap(),
            BTreeSet::from([Iri::new("a1")])
        );
    }
}
