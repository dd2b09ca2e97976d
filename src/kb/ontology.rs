//! Ontology-backed knowledge base using oxigraph.
//!
//! Loads an OWL / RDF document into an in-memory oxigraph store and answers the
//! [`KnowledgeBase`] queries with SPARQL. Characteristic sets are the objects of
//! every `rdf:type` triple on the individual, including `owl:NamedIndividual`
//! itself, minus any configured excluded types.

use std::collections::BTreeSet;
use std::path::Path;

use oxigraph::io::RdfFormat;
use oxigraph::model::{NamedNode, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::{KbError, KbResult};
use crate::symbol::{Iri, PropertySet};

use super::{KnowledgeBase, OWL_NAMED_INDIVIDUAL, RDF_TYPE};

/// Knowledge base over a parsed ontology.
pub struct OntologyStore {
    store: Store,
    excluded_types: BTreeSet<Iri>,
}

impl OntologyStore {
    /// Create an empty in-memory store.
    pub fn in_memory() -> KbResult<Self> {
        let store = Store::new().map_err(|e| KbError::Sparql {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self {
            store,
            excluded_types: BTreeSet::new(),
        })
    }

    /// Load an ontology file, picking the parser from the file extension.
    pub fn from_path(path: &Path) -> KbResult<Self> {
        let format = format_for_path(path).ok_or_else(|| KbError::UnsupportedFormat {
            path: path.display().to_string(),
        })?;
        let file = std::fs::File::open(path).map_err(|source| KbError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let kb = Self::in_memory()?;
        kb.load(format, std::io::BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            triples = kb.len().unwrap_or(0),
            "loaded ontology"
        );
        Ok(kb)
    }

    /// Parse `data` in the given serialization and add it to the store.
    pub fn load(&self, format: RdfFormat, reader: impl std::io::Read) -> KbResult<()> {
        self.store
            .load_from_reader(format, reader)
            .map_err(|e| KbError::Parse {
                message: e.to_string(),
            })
    }

    /// Drop these classes from every characteristic set.
    ///
    /// Useful for types every individual carries, such as `owl:Thing`.
    pub fn with_excluded_types(mut self, excluded: impl IntoIterator<Item = Iri>) -> Self {
        self.excluded_types = excluded.into_iter().collect();
        self
    }

    /// Number of triples in the store.
    pub fn len(&self) -> KbResult<usize> {
        self.store.len().map_err(|e| KbError::Sparql {
            message: format!("failed to count triples: {e}"),
        })
    }

    pub fn is_empty(&self) -> KbResult<bool> {
        self.len().map(|n| n == 0)
    }

    /// Run a SELECT query and collect the IRIs bound to `var`.
    ///
    /// Blank nodes and literals bound to `var` are skipped.
    fn select_iris(&self, sparql: &str, var: &str) -> KbResult<BTreeSet<Iri>> {
        let results = self.store.query(sparql).map_err(|e| KbError::Sparql {
            message: format!("SPARQL query failed: {e}"),
        })?;

        let QueryResults::Solutions(solutions) = results else {
            return Err(KbError::Sparql {
                message: "expected solutions from SELECT query".into(),
            });
        };

        let mut iris = BTreeSet::new();
        for solution in solutions {
            let solution = solution.map_err(|e| KbError::Sparql {
                message: format!("solution error: {e}"),
            })?;
            if let Some(Term::NamedNode(node)) = solution.get(var) {
                iris.insert(Iri::new(node.as_str()));
            }
        }
        Ok(iris)
    }
}

fn named_node(iri: &Iri) -> KbResult<NamedNode> {
    NamedNode::new(iri.as_str()).map_err(|e| KbError::Sparql {
        message: format!("invalid IRI {iri}: {e}"),
    })
}

fn format_for_path(path: &Path) -> Option<RdfFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "owl" | "rdf" | "xml" => Some(RdfFormat::RdfXml),
        other => RdfFormat::from_extension(other),
    }
}

impl KnowledgeBase for OntologyStore {
    fn characteristics(&self, object: &Iri) -> KbResult<PropertySet> {
        let subject = named_node(object)?;
        let classes = self.select_iris(
            &format!("SELECT ?c WHERE {{ {subject} <{RDF_TYPE}> ?c }}"),
            "c",
        )?;
        Ok(classes
            .into_iter()
            .filter(|c| !self.excluded_types.contains(c))
            .collect())
    }

    fn named_individuals(&self) -> KbResult<BTreeSet<Iri>> {
        self.select_iris(
            &format!("SELECT DISTINCT ?s WHERE {{ ?s <{RDF_TYPE}> <{OWL_NAMED_INDIVIDUAL}> }}"),
            "s",
        )
    }

    fn instances_of(&self, class: &Iri) -> KbResult<BTreeSet<Iri>> {
        let class = named_node(class)?;
        self.select_iris(
            &format!("SELECT DISTINCT ?s WHERE {{ ?s <{RDF_TYPE}> {class} }}"),
            "s",
        )
    }
}

impl std::fmt::Debug for OntologyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntologyStore")
            .field("excluded_types", &self.excluded_types)
            .finish()
    }
}
