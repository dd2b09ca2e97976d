//! Property grouping: partition a universe of objects by characteristic set.
//!
//! Objects with identical characteristic sets are indistinguishable to an agent,
//! so everything downstream (concepts, examples, ranking) works on groups. Group
//! IDs are assigned in first-seen order, and the build also records how many
//! objects in the universe carry each property.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::KbResult;
use crate::kb::KnowledgeBase;
use crate::symbol::{Iri, PropertySet};

/// Dense identifier of a group, assigned in first-seen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub usize);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "group:{}", self.0)
    }
}

/// An equivalence class of objects sharing one characteristic set.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub characteristics: PropertySet,
    /// Members in the order they were added.
    pub members: Vec<Iri>,
}

/// The grouping of one agent's universe.
#[derive(Debug, Clone, Default)]
pub struct PropertyGroups {
    groups: Vec<Group>,
    by_characteristics: HashMap<PropertySet, GroupId>,
    object_group: HashMap<Iri, GroupId>,
    frequency: HashMap<Iri, usize>,
}

impl PropertyGroups {
    /// Read every object's characteristics from `kb` and group them.
    ///
    /// Objects are processed in iteration order; repeated objects are counted once.
    pub fn build<K>(kb: &K, objects: impl IntoIterator<Item = Iri>) -> KbResult<Self>
    where
        K: KnowledgeBase + ?Sized,
    {
        let mut groups = Self::default();
        for object in objects {
            if groups.object_group.contains_key(&object) {
                continue;
            }
            let characteristics = kb.characteristics(&object)?;
            groups.insert(object, characteristics);
        }
        tracing::debug!(
            objects = groups.object_group.len(),
            groups = groups.groups.len(),
            properties = groups.frequency.len(),
            "grouped universe"
        );
        Ok(groups)
    }

    fn insert(&mut self, object: Iri, characteristics: PropertySet) {
        for property in &characteristics {
            *self.frequency.entry(property.clone()).or_insert(0) += 1;
        }

        let id = match self.by_characteristics.get(&characteristics) {
            Some(&id) => id,
            None => {
                let id = GroupId(self.groups.len());
                self.by_characteristics.insert(characteristics.clone(), id);
                self.groups.push(Group {
                    id,
                    characteristics,
                    members: Vec::new(),
                });
                id
            }
        };

        self.groups[id.0].members.push(object.clone());
        self.object_group.insert(object, id);
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn characteristics(&self, id: GroupId) -> Option<&PropertySet> {
        self.get(id).map(|g| &g.characteristics)
    }

    pub fn members(&self, id: GroupId) -> &[Iri] {
        self.get(id).map(|g| g.members.as_slice()).unwrap_or(&[])
    }

    /// Reverse lookup: which group has exactly these characteristics.
    pub fn group_with(&self, characteristics: &PropertySet) -> Option<GroupId> {
        self.by_characteristics.get(characteristics).copied()
    }

    pub fn group_of(&self, object: &Iri) -> Option<GroupId> {
        self.object_group.get(object).copied()
    }

    /// Characteristic set of the group `object` belongs to.
    pub fn object_characteristics(&self, object: &Iri) -> Option<&PropertySet> {
        self.group_of(object).and_then(|id| self.characteristics(id))
    }

    /// Number of objects in the universe carrying `property`.
    pub fn frequency(&self, property: &Iri) -> usize {
        self.frequency.get(property).copied().unwrap_or(0)
    }

    /// Groups in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct objects grouped.
    pub fn universe_size(&self) -> usize {
        self.object_group.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::MemoryKb;
    use crate::symbol::props;

    fn kb() -> MemoryKb {
        MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("a2", ["Author", "Person"])
            .with_individual("b1", ["Person"])
            .with_individual("p1", ["Paper"])
    }

    fn iris(names: &[&str]) -> Vec<Iri> {
        names.iter().map(Iri::new).collect()
    }

    #[test]
    fn identical_characteristics_share_one_group() {
        let groups = PropertyGroups::build(&kb(), iris(&["a1", "a2", "b1", "p1"])).unwrap();
        assert_eq!(groups.len(), 3);

        let a1 = groups.group_of(&Iri::new("a1")).unwrap();
        let a2 = groups.group_of(&Iri::new("a2")).unwrap();
        let b1 = groups.group_of(&Iri::new("b1")).unwrap();
        assert_eq!(a1, a2);
        assert_ne!(a1, b1);
        assert_eq!(groups.members(a1), &iris(&["a1", "a2"])[..]);
    }

    #[test]
    fn ids_follow_first_occurrence() {
        let groups = PropertyGroups::build(&kb(), iris(&["p1", "a1", "b1"])).unwrap();
        assert_eq!(groups.group_of(&Iri::new("p1")), Some(GroupId(0)));
        assert_eq!(groups.group_of(&Iri::new("a1")), Some(GroupId(1)));
        assert_eq!(groups.group_of(&Iri::new("b1")), Some(GroupId(2)));
        assert_eq!(
            groups.group_with(&props(["Person", "Author"])),
            Some(GroupId(1))
        );
    }

    #[test]
    fn frequency_counts_distinct_objects() {
        let groups =
            PropertyGroups::build(&kb(), iris(&["a1", "a2", "b1", "a1", "p1"])).unwrap();
        assert_eq!(groups.universe_size(), 4);
        assert_eq!(groups.frequency(&Iri::new("Person")), 3);
        assert_eq!(groups.frequency(&Iri::new("Author")), 2);
        assert_eq!(groups.frequency(&Iri::new("Paper")), 1);
        assert_eq!(groups.frequency(&Iri::new("Venue")), 0);
    }

    #[test]
    fn every_object_lands_in_the_group_of_its_characteristics() {
        let kb = kb();
        let groups = PropertyGroups::build(&kb, iris(&["a1", "a2", "b1", "p1"])).unwrap();
        for group in groups.iter() {
            for member in &group.members {
                assert_eq!(kb.characteristics(member).unwrap(), group.characteristics);
                assert_eq!(groups.group_of(member), Some(group.id));
            }
        }
    }
}
