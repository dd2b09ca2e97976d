//! Precision and recall of a student's answers against ground truth.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::symbol::Iri;

/// Outcome of evaluating one result set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Evaluation {
    Scored {
        precision: f64,
        recall: f64,
        result_size: usize,
    },
    /// Recall is undefined without ground truth.
    NoGroundTruth,
}

impl Evaluation {
    /// Both precision and recall are exactly 1.
    pub fn is_perfect(&self) -> bool {
        matches!(self, Self::Scored { precision, recall, .. } if *precision == 1.0 && *recall == 1.0)
    }
}

/// Score `results` (deduplicated) against `ground_truth`.
///
/// An empty result set has precision 0.
pub fn evaluate<'a>(
    results: impl IntoIterator<Item = &'a Iri>,
    ground_truth: &BTreeSet<Iri>,
) -> Evaluation {
    if ground_truth.is_empty() {
        return Evaluation::NoGroundTruth;
    }
    let results: BTreeSet<&Iri> = results.into_iter().collect();
    let hits = results.iter().filter(|r| ground_truth.contains(**r)).count();

    let precision = if results.is_empty() {
        0.0
    } else {
        hits as f64 / results.len() as f64
    };
    Evaluation::Scored {
        precision,
        recall: hits as f64 / ground_truth.len() as f64,
        result_size: results.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<Iri> {
        items.iter().map(Iri::new).collect()
    }

    #[test]
    fn partial_overlap() {
        let results = vec![Iri::new("a"), Iri::new("b"), Iri::new("c"), Iri::new("a")];
        let eval = evaluate(&results, &set(&["a", "b", "d", "e"]));
        assert_eq!(
            eval,
            Evaluation::Scored {
                precision: 2.0 / 3.0,
                recall: 0.5,
                result_size: 3,
            }
        );
        assert!(!eval.is_perfect());
    }

    #[test]
    fn empty_results_score_zero() {
        let eval = evaluate(&Vec::<Iri>::new(), &set(&["a"]));
        assert_eq!(
            eval,
            Evaluation::Scored {
                precision: 0.0,
                recall: 0.0,
                result_size: 0,
            }
        );
    }

    #[test]
    fn zero_ground_truth_is_reported_not_computed() {
        let results = vec![Iri::new("a")];
        assert_eq!(evaluate(&results, &BTreeSet::new()), Evaluation::NoGroundTruth);
    }

    #[test]
    fn exact_match_is_perfect() {
        let results = vec![Iri::new("b"), Iri::new("a")];
        assert!(evaluate(&results, &set(&["a", "b"])).is_perfect());
    }
}
