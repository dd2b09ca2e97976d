//! Core symbol types: IRIs and immutable characteristic sets.
//!
//! Objects and properties are both identified by an [`Iri`] in one agent's
//! namespace. A [`PropertySet`] is the immutable, structurally hashable set of
//! properties (classes) an object belongs to. It doubles as the key for
//! grouping objects and for deduplicating concepts, so equality and hashing
//! are by value.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An opaque identifier for an object or a property.
///
/// Cheap to clone: the string is shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(Arc<str>);

impl Iri {
    /// Create an IRI from any string-like value.
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    /// The IRI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The local name: everything after the last `#` or `/`.
    pub fn local_name(&self) -> &str {
        self.0
            .rsplit(['#', '/'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&*self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An immutable set of properties.
///
/// Backed by a sorted set so that iteration order, equality and hashing are
/// all independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet(Arc<BTreeSet<Iri>>);

impl PropertySet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A set holding exactly one property.
    pub fn singleton(property: Iri) -> Self {
        Self(Arc::new(BTreeSet::from([property])))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, property: &Iri) -> bool {
        self.0.contains(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Iri> {
        self.0.iter()
    }

    /// `self − other`.
    pub fn difference(&self, other: &PropertySet) -> PropertySet {
        self.0.difference(&other.0).cloned().collect()
    }

    /// `self ∩ other`.
    pub fn intersection(&self, other: &PropertySet) -> PropertySet {
        self.0.intersection(&other.0).cloned().collect()
    }

    /// `self ∪ other`.
    pub fn union(&self, other: &PropertySet) -> PropertySet {
        self.0.union(&other.0).cloned().collect()
    }

    /// A copy of this set without `property`.
    pub fn without(&self, property: &Iri) -> PropertySet {
        self.0.iter().filter(|p| *p != property).cloned().collect()
    }
}

impl FromIterator<Iri> for PropertySet {
    fn from_iter<T: IntoIterator<Item = Iri>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl From<BTreeSet<Iri>> for PropertySet {
    fn from(set: BTreeSet<Iri>) -> Self {
        Self(Arc::new(set))
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = &'a Iri;
    type IntoIter = std::collections::btree_set::Iter<'a, Iri>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p.local_name())?;
        }
        f.write_str("}")
    }
}

/// Build a [`PropertySet`] from string literals. Handy in tests.
pub fn props<I, S>(items: I) -> PropertySet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items.into_iter().map(Iri::new).collect()
}
