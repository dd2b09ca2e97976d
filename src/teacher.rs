//! Teacher strategy: build, serve and prune a weighted pool of examples.
//!
//! For a query property the teacher collects every concept containing it, and
//! for every group comparison `(R, I)` producing such a concept, every pair of
//! a member of `R` (positive) with a member of `I` (negative) becomes an
//! [`Example`]. Examples are sampled by weight; one the student cannot make
//! sense of is removed for good and remembered as unclear.
//!
//! ```text
//! Idle ──reset──▶ Ready ──select_next──▶ Serving ──(pool empty)──▶ Exhausted
//!        └─(no examples)─────────────────────────────────────────▶ Exhausted
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, TeachError, TeachResult};
use crate::session::AgentSession;
use crate::symbol::{Iri, PropertySet};

/// Floor for property-based scores, so no example ever has zero probability.
pub const MIN_EXAMPLE_SCORE: f64 = 0.01;

/// How the teacher weighs examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeacherPolicy {
    /// Every example is equally likely.
    Random,
    /// Prefer examples whose contrast isolates the query property.
    PropertyBased,
}

impl FromStr for TeacherPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "property-based" => Ok(Self::PropertyBased),
            _ => Err(ConfigError::UnknownTeacherPolicy { name: s.into() }),
        }
    }
}

impl fmt::Display for TeacherPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::PropertyBased => f.write_str("property-based"),
        }
    }
}

/// A (positive, negative) object pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Example {
    pub positive: Iri,
    pub negative: Iri,
}

impl Example {
    pub fn new(positive: Iri, negative: Iri) -> Self {
        Self { positive, negative }
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(+{}, -{})", self.positive, self.negative)
    }
}

/// Examples with a parallel weight vector that always sums to 1.
#[derive(Debug, Clone, Default)]
pub struct ExamplePool {
    examples: Vec<Example>,
    weights: Vec<f64>,
}

impl ExamplePool {
    fn push(&mut self, example: Example, score: f64) {
        self.examples.push(example);
        self.weights.push(score);
    }

    fn normalize(&mut self) {
        let total: f64 = self.weights.iter().sum();
        if total > 0.0 {
            for w in &mut self.weights {
                *w /= total;
            }
        }
    }

    /// Remove the example at `index` and renormalize the rest.
    fn remove(&mut self, index: usize) -> Example {
        self.weights.remove(index);
        let example = self.examples.remove(index);
        self.normalize();
        example
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// Where the teacher is in its lifecycle for the current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherState {
    Idle,
    Ready,
    Serving,
    Exhausted,
}

/// The last example served, remembered until the student's response arrives.
#[derive(Debug, Clone)]
struct Episode {
    index: usize,
    example: Example,
}

/// Teacher strategy over one agent's session.
pub struct Teacher<'a> {
    session: &'a AgentSession<'a>,
    rng: StdRng,
    state: TeacherState,
    policy: TeacherPolicy,
    query: Option<Iri>,
    pool: ExamplePool,
    current: Option<Episode>,
    unclear: HashSet<Example>,
}

impl<'a> Teacher<'a> {
    /// A teacher drawing from `session`. A fixed `seed` makes sampling reproducible.
    pub fn new(session: &'a AgentSession<'a>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            session,
            rng,
            state: TeacherState::Idle,
            policy: TeacherPolicy::Random,
            query: None,
            pool: ExamplePool::default(),
            current: None,
            unclear: HashSet::new(),
        }
    }

    /// [`reset`](Self::reset) with the policy given by name.
    ///
    /// An unknown name fails before any state is touched.
    pub fn reset_named(&mut self, query: &Iri, policy: &str) -> ConfigResult<bool> {
        let policy = policy.parse()?;
        Ok(self.reset(query, policy))
    }

    /// Build the example pool for `query`.
    ///
    /// Returns `false` when no example can be built: the query is not covered by
    /// any concept of this agent, and the teacher goes straight to `Exhausted`.
    pub fn reset(&mut self, query: &Iri, policy: TeacherPolicy) -> bool {
        self.policy = policy;
        self.query = Some(query.clone());
        self.pool = ExamplePool::default();
        self.current = None;
        self.unclear.clear();

        let groups = self.session.groups();
        let concepts = self.session.concepts();
        let universe = self.session.universe_size() as f64;

        for concept in concepts.containing(query, false) {
            let Some(comparisons) = concepts.comparisons(concept) else {
                continue;
            };
            for &(relevant, irrelevant) in comparisons {
                let (Some(rel_chars), Some(irr_chars)) = (
                    groups.characteristics(relevant),
                    groups.characteristics(irrelevant),
                ) else {
                    continue;
                };

                let score = match policy {
                    TeacherPolicy::Random => 1.0,
                    TeacherPolicy::PropertyBased => {
                        property_based_score(query, rel_chars, irr_chars, universe, |p| {
                            groups.frequency(p)
                        })
                    }
                };

                for positive in groups.members(relevant) {
                    for negative in groups.members(irrelevant) {
                        self.pool
                            .push(Example::new(positive.clone(), negative.clone()), score);
                    }
                }
            }
        }

        if self.pool.is_empty() {
            tracing::warn!(
                agent = self.session.name(),
                query = %query,
                "no examples cover the query"
            );
            self.state = TeacherState::Exhausted;
            return false;
        }

        self.pool.normalize();
        self.state = TeacherState::Ready;
        tracing::info!(
            agent = self.session.name(),
            query = %query,
            %policy,
            examples = self.pool.len(),
            "teacher ready"
        );
        true
    }

    /// Sample the next example and translate it into the partner's namespace.
    ///
    /// Returns `Ok(None)` once the pool is exhausted.
    pub fn select_next(&mut self) -> TeachResult<Option<Example>> {
        if self.pool.is_empty() {
            self.state = TeacherState::Exhausted;
            self.current = None;
            return Ok(None);
        }

        let sampler = WeightedIndex::new(self.pool.weights()).map_err(|e| {
            TeachError::Sampling {
                message: e.to_string(),
            }
        })?;
        let index = sampler.sample(&mut self.rng);
        let example = self.pool.examples()[index].clone();

        let alignment = self.session.alignment();
        let translate = |object: &Iri| {
            alignment
                .translate(object)
                .cloned()
                .ok_or_else(|| TeachError::Untranslatable {
                    object: object.to_string(),
                })
        };
        let translated = Example::new(translate(&example.positive)?, translate(&example.negative)?);

        tracing::debug!(index, example = %example, "serving example");
        self.current = Some(Episode { index, example });
        self.state = TeacherState::Serving;
        Ok(Some(translated))
    }

    /// Take in the student's verdict on the last served example.
    ///
    /// A failed example is removed from the pool and remembered as unclear. An
    /// emptied pool is only reported by the next [`select_next`](Self::select_next).
    pub fn comprehend(&mut self, success: bool) {
        if success {
            return;
        }
        let Some(episode) = self.current.take() else {
            tracing::warn!("student response without a served example");
            return;
        };
        let removed = self.pool.remove(episode.index);
        debug_assert_eq!(removed, episode.example);
        tracing::debug!(
            example = %episode.example,
            remaining = self.pool.len(),
            "pruned unclear example"
        );
        self.unclear.insert(episode.example);
    }

    pub fn state(&self) -> TeacherState {
        self.state
    }

    pub fn policy(&self) -> TeacherPolicy {
        self.policy
    }

    pub fn query(&self) -> Option<&Iri> {
        self.query.as_ref()
    }

    pub fn pool(&self) -> &ExamplePool {
        &self.pool
    }

    /// Examples the student failed on, in the teacher's own namespace.
    pub fn unclear_examples(&self) -> &HashSet<Example> {
        &self.unclear
    }

    pub fn episodic_memory_size(&self) -> usize {
        self.unclear.len()
    }

    /// The teacher keeps no semantic memory.
    pub fn semantic_memory_size(&self) -> usize {
        0
    }

    pub fn session(&self) -> &'a AgentSession<'a> {
        self.session
    }
}

/// Score of the examples a comparison `(R, I)` produces.
///
/// Rewards properties that rule interpretations out (negative and common
/// properties) and penalizes positive properties other than the query, each
/// weighted by its frequency in the universe.
pub fn property_based_score(
    query: &Iri,
    relevant: &PropertySet,
    irrelevant: &PropertySet,
    universe: f64,
    frequency: impl Fn(&Iri) -> usize,
) -> f64 {
    if universe <= 0.0 {
        return MIN_EXAMPLE_SCORE;
    }
    let mass = |set: &PropertySet| -> f64 {
        set.iter().map(|p| frequency(p) as f64 / universe).sum()
    };

    let misguiding = relevant.difference(irrelevant).without(query);
    let negative = irrelevant.difference(relevant);
    let common = irrelevant.intersection(relevant);
    let excluding = negative.union(&common);

    let score = mass(&excluding) - mass(&misguiding);
    if score <= 0.0 { MIN_EXAMPLE_SCORE } else { score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::InstanceAlignment;
    use crate::kb::{KnowledgeBase, MemoryKb};
    use crate::symbol::props;

    const EPS: f64 = 1e-9;

    fn author_kb() -> MemoryKb {
        MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("a2", ["Person", "Author"])
            .with_individual("b1", ["Person"])
    }

    fn shared(kb: &MemoryKb) -> InstanceAlignment {
        InstanceAlignment::identity(kb.named_individuals().unwrap())
    }

    fn assert_normalized(pool: &ExamplePool) {
        assert_eq!(pool.examples().len(), pool.weights().len());
        if !pool.is_empty() {
            let total: f64 = pool.weights().iter().sum();
            assert!((total - 1.0).abs() < EPS, "weights sum to {total}");
        }
    }

    #[test]
    fn policy_names_parse_case_insensitively() {
        assert_eq!("Random".parse::<TeacherPolicy>().unwrap(), TeacherPolicy::Random);
        assert_eq!(
            "PROPERTY-BASED".parse::<TeacherPolicy>().unwrap(),
            TeacherPolicy::PropertyBased
        );
        assert!(matches!(
            "greedy".parse::<TeacherPolicy>(),
            Err(ConfigError::UnknownTeacherPolicy { .. })
        ));
    }

    #[test]
    fn unknown_policy_leaves_teacher_idle() {
        let kb = author_kb();
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();
        let mut teacher = Teacher::new(&session, Some(1));
        assert!(teacher.reset_named(&Iri::new("Author"), "greedy").is_err());
        assert_eq!(teacher.state(), TeacherState::Idle);
        assert!(teacher.pool().is_empty());
    }

    #[test]
    fn property_based_pool_contains_author_examples() {
        let kb = author_kb();
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();
        let mut teacher = Teacher::new(&session, Some(7));
        assert!(teacher.reset(&Iri::new("Author"), TeacherPolicy::PropertyBased));
        assert_eq!(teacher.state(), TeacherState::Ready);

        let pool = teacher.pool();
        assert_eq!(pool.len(), 2);
        let target = Example::new(Iri::new("a1"), Iri::new("b1"));
        let idx = pool.examples().iter().position(|e| *e == target).unwrap();
        assert!(pool.weights()[idx] > 0.0);
        assert_normalized(pool);
    }

    #[test]
    fn absent_query_fails_and_leaves_pool_empty() {
        let kb = author_kb();
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();
        let mut teacher = Teacher::new(&session, Some(1));
        // Person is in every group, so no difference ever contains it.
        assert!(!teacher.reset(&Iri::new("Person"), TeacherPolicy::Random));
        assert!(teacher.pool().is_empty());
        assert_eq!(teacher.state(), TeacherState::Exhausted);
        assert_eq!(teacher.select_next().unwrap(), None);
    }

    #[test]
    fn random_policy_weights_are_uniform() {
        let kb = author_kb();
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();
        let mut teacher = Teacher::new(&session, Some(1));
        assert!(teacher.reset(&Iri::new("Author"), TeacherPolicy::Random));
        for w in teacher.pool().weights() {
            assert!((w - 0.5).abs() < EPS);
        }
    }

    #[test]
    fn single_example_failure_leads_to_deadend() {
        let kb = MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("b1", ["Person"]);
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();
        let mut teacher = Teacher::new(&session, Some(3));
        assert!(teacher.reset(&Iri::new("Author"), TeacherPolicy::PropertyBased));
        assert_eq!(teacher.pool().len(), 1);

        let served = teacher.select_next().unwrap().unwrap();
        assert_eq!(served, Example::new(Iri::new("a1"), Iri::new("b1")));
        assert_eq!(teacher.state(), TeacherState::Serving);

        teacher.comprehend(false);
        assert!(teacher.pool().is_empty());
        assert_eq!(teacher.episodic_memory_size(), 1);
        // Exhaustion is only observed by the next selection.
        assert_eq!(teacher.state(), TeacherState::Serving);
        assert_eq!(teacher.select_next().unwrap(), None);
        assert_eq!(teacher.state(), TeacherState::Exhausted);
    }

    #[test]
    fn success_keeps_the_pool_untouched() {
        let kb = author_kb();
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();
        let mut teacher = Teacher::new(&session, Some(5));
        teacher.reset(&Iri::new("Author"), TeacherPolicy::PropertyBased);
        let before = teacher.pool().weights().to_vec();
        teacher.select_next().unwrap();
        teacher.comprehend(true);
        assert_eq!(teacher.pool().weights(), &before[..]);
        assert!(teacher.unclear_examples().is_empty());
    }

    #[test]
    fn weights_stay_normalized_while_pruning() {
        let kb = MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("a2", ["Person", "Author", "Reviewer"])
            .with_individual("b1", ["Person"])
            .with_individual("b2", ["Person", "Reviewer"])
            .with_individual("c1", ["Chair"]);
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();
        let mut teacher = Teacher::new(&session, Some(11));
        assert!(teacher.reset(&Iri::new("Author"), TeacherPolicy::PropertyBased));
        let initial = teacher.pool().len();
        assert_normalized(teacher.pool());

        for removed in 1..=initial {
            assert!(teacher.select_next().unwrap().is_some());
            teacher.comprehend(false);
            assert_eq!(teacher.pool().len(), initial - removed);
            assert_normalized(teacher.pool());
        }
        assert_eq!(teacher.episodic_memory_size(), initial);
        assert_eq!(teacher.select_next().unwrap(), None);
    }

    #[test]
    fn served_examples_are_translated() {
        let kb = MemoryKb::new()
            .with_individual("a1", ["Author"])
            .with_individual("b1", ["Person"]);
        let alignment = InstanceAlignment::from_pairs([
            (Iri::new("a1"), Iri::new("other#a1")),
            (Iri::new("b1"), Iri::new("other#b1")),
        ]);
        let session = AgentSession::prepare("t", &kb, alignment).unwrap();
        let mut teacher = Teacher::new(&session, Some(2));
        assert!(teacher.reset(&Iri::new("Author"), TeacherPolicy::Random));
        let served = teacher.select_next().unwrap().unwrap();
        assert_eq!(served, Example::new(Iri::new("other#a1"), Iri::new("other#b1")));

        teacher.comprehend(false);
        // Unclear memory keeps the untranslated pair.
        assert!(teacher
            .unclear_examples()
            .contains(&Example::new(Iri::new("a1"), Iri::new("b1"))));
    }

    #[test]
    fn same_seed_same_sequence() {
        let kb = MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("a2", ["Person", "Author"])
            .with_individual("b1", ["Person"])
            .with_individual("b2", ["Person", "Reviewer"]);
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();

        let draw = |seed| {
            let mut teacher = Teacher::new(&session, Some(seed));
            teacher.reset(&Iri::new("Author"), TeacherPolicy::PropertyBased);
            (0..8)
                .map(|_| teacher.select_next().unwrap().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn score_rewards_excluding_and_penalizes_misguiding() {
        let freq = |p: &Iri| match p.as_str() {
            "Person" => 3,
            "Author" => 2,
            "Reviewer" => 1,
            _ => 0,
        };
        let query = Iri::new("Author");

        // pos = {Author}, common = {Person}: 3/4.
        let clean = property_based_score(
            &query,
            &props(["Person", "Author"]),
            &props(["Person"]),
            4.0,
            freq,
        );
        assert!((clean - 0.75).abs() < EPS);

        // pos = {Author, Reviewer}, nothing excluded: clamped.
        let noisy = property_based_score(
            &query,
            &props(["Author", "Reviewer"]),
            &PropertySet::empty(),
            4.0,
            freq,
        );
        assert!((noisy - MIN_EXAMPLE_SCORE).abs() < EPS);
    }

    #[test]
    fn all_clamped_scores_still_normalize() {
        // Every comparison scores <= 0, so every weight is the floor.
        let kb = MemoryKb::new()
            .with_individual("a1", ["Author", "Reviewer"])
            .with_individual("c1", ["Chair"]);
        let session = AgentSession::prepare("t", &kb, shared(&kb)).unwrap();
        let mut teacher = Teacher::new(&session, Some(9));
        assert!(teacher.reset(&Iri::new("Author"), TeacherPolicy::PropertyBased));
        assert_normalized(teacher.pool());
        assert!(teacher.pool().weights().iter().all(|w| w.is_finite() && *w > 0.0));
    }
}
