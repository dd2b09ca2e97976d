//! Formal Concept Analysis over a logic-based student's memory.
//!
//! - [`context`]: the formal context (rows × attributes), one extent per
//!   attribute.
//! - [`relations`]: pairwise attribute relations and the traversal graph.
//! - [`closure`]: frontier closure from the query symbol to a weighted
//!   interpretation.

pub mod closure;
pub mod context;
pub mod relations;

use std::fmt;

use crate::symbol::Iri;

pub use closure::{interpret, EQUIVALENT_WEIGHT, IMPLIED_WEIGHT};
pub use context::FormalContext;
pub use relations::{attribute_relations, AttributeRelation, RelationGraph, RelationKind};

/// A column of a formal context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    /// A property observed in some memorised example.
    Property(Iri),
    /// Stands in for the term being taught. Every memorised row carries it.
    Query,
    /// Carried only by the padding row, so the lattice never degenerates.
    Padding,
}

impl Attribute {
    pub fn as_property(&self) -> Option<&Iri> {
        match self {
            Self::Property(iri) => Some(iri),
            _ => None,
        }
    }
}

impl From<Iri> for Attribute {
    fn from(iri: Iri) -> Self {
        Self::Property(iri)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(iri) => write!(f, "{iri}"),
            Self::Query => f.write_str("<query>"),
            Self::Padding => f.write_str("<padding>"),
        }
    }
}
