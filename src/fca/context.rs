//! Formal contexts: rows of attributes, stored as one extent per attribute.

use std::collections::{BTreeSet, HashMap};

use super::Attribute;

/// Row indices of the rows carrying an attribute.
pub type Extent = BTreeSet<usize>;

/// A binary table of rows × attributes, stored column-wise as extents.
#[derive(Debug, Clone, Default)]
pub struct FormalContext {
    attributes: Vec<Attribute>,
    index: HashMap<Attribute, usize>,
    num_rows: usize,
    extents: Vec<Extent>,
}

impl FormalContext {
    /// Build a context from rows of attributes.
    ///
    /// Attributes are numbered in sorted order; duplicate rows are kept.
    pub fn from_rows<R, A>(rows: R) -> Self
    where
        R: IntoIterator<Item = A>,
        A: IntoIterator<Item = Attribute>,
    {
        let raw: Vec<BTreeSet<Attribute>> = rows
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();

        let attributes: Vec<Attribute> = raw
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: HashMap<Attribute, usize> = attributes
            .iter()
            .enumerate()
            .map(|(i, a)| (a.clone(), i))
            .collect();

        let mut extents = vec![Extent::new(); attributes.len()];
        for (row, attrs) in raw.iter().enumerate() {
            for attribute in attrs {
                extents[index[attribute]].insert(row);
            }
        }

        Self {
            attributes,
            index,
            num_rows: raw.len(),
            extents,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute_index(&self, attribute: &Attribute) -> Option<usize> {
        self.index.get(attribute).copied()
    }

    /// Rows carrying the attribute at `col`.
    pub fn attribute_extent(&self, col: usize) -> Option<&Extent> {
        self.extents.get(col)
    }
}
