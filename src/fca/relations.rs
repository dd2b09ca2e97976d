//! Attribute relations derived from extents, and the graph they span.
//!
//! Two attributes relate according to how their extents overlap. The closure
//! engine only walks `Equivalent` and `Implication` edges, but every kind is
//! kept in the graph so it can be inspected.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

use super::context::{Extent, FormalContext};
use super::Attribute;

/// How two attribute extents relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// Same extent.
    Equivalent,
    /// Disjoint extents covering every row.
    Complement,
    /// Disjoint extents.
    Incompatible,
    /// Left extent strictly inside the right one.
    Implication,
    /// Overlapping extents covering every row.
    Subcontrary,
    /// Overlapping, neither inside the other, not covering every row.
    Orthogonal,
}

impl RelationKind {
    /// Symmetric relations hold in both directions.
    pub fn is_symmetric(self) -> bool {
        !matches!(self, Self::Implication)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equivalent => "equivalent",
            Self::Complement => "complement",
            Self::Incompatible => "incompatible",
            Self::Implication => "implication",
            Self::Subcontrary => "subcontrary",
            Self::Orthogonal => "orthogonal",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `left kind right`. For implications, `left ⇒ right`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRelation {
    pub left: Attribute,
    pub kind: RelationKind,
    pub right: Attribute,
}

impl fmt::Display for AttributeRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.kind, self.right)
    }
}

/// Classify extents `a` and `b` over `rows` rows.
///
/// Returns the kind and whether the pair must be flipped to read `b ⇒ a`.
pub fn classify(a: &Extent, b: &Extent, rows: usize) -> (RelationKind, bool) {
    let common = a.intersection(b).count();
    let union = a.len() + b.len() - common;

    if a == b {
        (RelationKind::Equivalent, false)
    } else if common == 0 && union == rows {
        (RelationKind::Complement, false)
    } else if common == 0 {
        (RelationKind::Incompatible, false)
    } else if common == a.len() {
        (RelationKind::Implication, false)
    } else if common == b.len() {
        (RelationKind::Implication, true)
    } else if union == rows {
        (RelationKind::Subcontrary, false)
    } else {
        (RelationKind::Orthogonal, false)
    }
}

/// One relation per unordered pair of distinct attributes.
pub fn attribute_relations(ctx: &FormalContext) -> Vec<AttributeRelation> {
    let attributes = ctx.attributes();
    let empty = Extent::new();
    let mut relations = Vec::new();

    for (i, x) in attributes.iter().enumerate() {
        let a = ctx.attribute_extent(i).unwrap_or(&empty);
        for (j, y) in attributes.iter().enumerate().skip(i + 1) {
            let b = ctx.attribute_extent(j).unwrap_or(&empty);
            let (kind, flipped) = classify(a, b, ctx.num_rows());
            let (left, right) = if flipped { (y, x) } else { (x, y) };
            relations.push(AttributeRelation {
                left: left.clone(),
                kind,
                right: right.clone(),
            });
        }
    }
    relations
}

/// Directed graph of attribute relations.
///
/// Symmetric relations are stored as a pair of opposite edges. Relations
/// involving [`Attribute::Padding`] are left out.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    graph: DiGraph<Attribute, RelationKind>,
    nodes: HashMap<Attribute, NodeIndex>,
}

impl RelationGraph {
    pub fn build(ctx: &FormalContext) -> Self {
        Self::from_relations(attribute_relations(ctx))
    }

    pub fn from_relations(relations: impl IntoIterator<Item = AttributeRelation>) -> Self {
        let mut graph = Self::default();
        for relation in relations {
            if relation.left == Attribute::Padding || relation.right == Attribute::Padding {
                continue;
            }
            let left = graph.ensure_node(&relation.left);
            let right = graph.ensure_node(&relation.right);
            graph.graph.add_edge(left, right, relation.kind);
            if relation.kind.is_symmetric() {
                graph.graph.add_edge(right, left, relation.kind);
            }
        }
        graph
    }

    fn ensure_node(&mut self, attribute: &Attribute) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(attribute) {
            return idx;
        }
        let idx = self.graph.add_node(attribute.clone());
        self.nodes.insert(attribute.clone(), idx);
        idx
    }

    pub fn contains(&self, attribute: &Attribute) -> bool {
        self.nodes.contains_key(attribute)
    }

    /// Attributes reached from `from` over one outgoing edge of `kind`.
    pub fn neighbors<'a>(
        &'a self,
        from: &Attribute,
        kind: RelationKind,
    ) -> impl Iterator<Item = &'a Attribute> + 'a {
        let start = self.nodes.get(from).copied();
        start
            .into_iter()
            .flat_map(move |idx| self.graph.edges_directed(idx, Direction::Outgoing))
            .filter(move |e| *e.weight() == kind)
            .filter_map(move |e| self.graph.node_weight(e.target()))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
