//! Instance alignments between two agents' namespaces.
//!
//! An [`InstanceAlignment`] maps this agent's object IRIs to the partner's IRIs
//! for the same world objects. Its domain is the mutually-known universe: a
//! session only groups objects in the domain, so every example the teacher
//! serves can be translated.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::Path;

use crate::error::{AlignmentError, AlignmentResult};
use crate::symbol::Iri;

/// A session-immutable map from this agent's objects to the partner's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceAlignment {
    forward: BTreeMap<Iri, Iri>,
}

impl InstanceAlignment {
    /// Map every shared IRI to itself.
    pub fn identity(shared: impl IntoIterator<Item = Iri>) -> Self {
        Self {
            forward: shared.into_iter().map(|iri| (iri.clone(), iri)).collect(),
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Iri, Iri)>) -> Self {
        Self {
            forward: pairs.into_iter().collect(),
        }
    }

    /// Parse `iri_a,iri_b` lines. Blank lines are skipped.
    pub fn from_csv_reader(reader: impl BufRead) -> AlignmentResult<Self> {
        let mut forward = BTreeMap::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| AlignmentError::Io {
                path: "<reader>".into(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (a, b) = trimmed
                .split_once(',')
                .map(|(a, b)| (a.trim(), b.trim()))
                .filter(|(a, b)| !a.is_empty() && !b.is_empty())
                .ok_or_else(|| AlignmentError::Malformed {
                    line: n + 1,
                    content: line.clone(),
                })?;
            forward.insert(Iri::new(a), Iri::new(b));
        }
        Ok(Self { forward })
    }

    pub fn from_csv_path(path: &Path) -> AlignmentResult<Self> {
        let file = std::fs::File::open(path).map_err(|source| AlignmentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    /// The partner's view of the same alignment.
    pub fn inverse(&self) -> Self {
        Self {
            forward: self
                .forward
                .iter()
                .map(|(a, b)| (b.clone(), a.clone()))
                .collect(),
        }
    }

    pub fn translate(&self, object: &Iri) -> Option<&Iri> {
        self.forward.get(object)
    }

    /// Translate every IRI that has a counterpart, dropping the rest.
    pub fn translate_all<'a>(&self, objects: impl IntoIterator<Item = &'a Iri>) -> BTreeSet<Iri> {
        objects
            .into_iter()
            .filter_map(|o| self.translate(o).cloned())
            .collect()
    }

    /// The objects this agent shares with its partner.
    pub fn domain(&self) -> impl Iterator<Item = &Iri> {
        self.forward.keys()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Read query pairs: two whitespace-separated class IRIs per line.
///
/// The first column names the query in the first agent's vocabulary, the second
/// its counterpart in the partner's.
pub fn read_query_pairs(reader: impl BufRead) -> AlignmentResult<Vec<(Iri, Iri)>> {
    let mut pairs = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| AlignmentError::Io {
            path: "<reader>".into(),
            source,
        })?;
        let mut cols = line.split_whitespace();
        match (cols.next(), cols.next(), cols.next()) {
            (None, _, _) => continue,
            (Some(a), Some(b), None) => pairs.push((Iri::new(a), Iri::new(b))),
            _ => {
                return Err(AlignmentError::Malformed {
                    line: n + 1,
                    content: line.clone(),
                });
            }
        }
    }
    Ok(pairs)
}

pub fn read_query_pairs_path(path: &Path) -> AlignmentResult<Vec<(Iri, Iri)>> {
    let file = std::fs::File::open(path).map_err(|source| AlignmentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_query_pairs(std::io::BufReader::new(file))
}
