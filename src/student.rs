//! Student strategy: learn from served examples and interpret the query.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, LearnError, LearnResult};
use crate::fca;
use crate::query::{self, Interpretation, RankedResults};
use crate::session::AgentSession;
use crate::symbol::{Iri, PropertySet};

/// How the student turns examples into an interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudentPolicy {
    /// Reinforce positive properties, weaken common ones.
    FrequencyBased,
    /// Memorise positive-property sets and close over them with FCA.
    LogicBased,
}

impl FromStr for StudentPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frequency-based" => Ok(Self::FrequencyBased),
            "logic-based" => Ok(Self::LogicBased),
            _ => Err(ConfigError::UnknownStudentPolicy { name: s.into() }),
        }
    }
}

impl fmt::Display for StudentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrequencyBased => f.write_str("frequency-based"),
            Self::LogicBased => f.write_str("logic-based"),
        }
    }
}

/// What the student has retained, per policy.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentMemory {
    /// Property → (#reinforcements − #weakenings).
    Scores(BTreeMap<Iri, i64>),
    /// Distinct positive-property sets seen so far.
    Memorised(BTreeSet<PropertySet>),
}

impl StudentMemory {
    fn for_policy(policy: StudentPolicy) -> Self {
        match policy {
            StudentPolicy::FrequencyBased => Self::Scores(BTreeMap::new()),
            StudentPolicy::LogicBased => Self::Memorised(BTreeSet::new()),
        }
    }
}

/// Student strategy over one agent's session.
pub struct Student<'a> {
    session: &'a AgentSession<'a>,
    policy: StudentPolicy,
    memory: StudentMemory,
}

impl<'a> Student<'a> {
    pub fn new(session: &'a AgentSession<'a>, policy: StudentPolicy) -> Self {
        Self {
            session,
            policy,
            memory: StudentMemory::for_policy(policy),
        }
    }

    /// Forget everything and switch to `policy`.
    pub fn reset(&mut self, policy: StudentPolicy) {
        self.policy = policy;
        self.memory = StudentMemory::for_policy(policy);
    }

    /// [`reset`](Self::reset) with the policy given by name. Unknown names
    /// leave the student untouched.
    pub fn reset_named(&mut self, policy: &str) -> ConfigResult<()> {
        let policy = policy.parse()?;
        self.reset(policy);
        Ok(())
    }

    fn characteristics(&self, object: &Iri) -> LearnResult<&'a PropertySet> {
        self.session
            .groups()
            .object_characteristics(object)
            .ok_or_else(|| LearnError::UnknownObject {
                object: object.to_string(),
            })
    }

    /// Learn from a (positive, negative) pair in this student's namespace.
    ///
    /// Returns whether the example was informative. An example whose positive
    /// object has nothing the negative one lacks is unclear and changes nothing.
    pub fn learn_from_example(&mut self, positive: &Iri, negative: &Iri) -> LearnResult<bool> {
        let pos_chars = self.characteristics(positive)?;
        let neg_chars = self.characteristics(negative)?;

        let pos = pos_chars.difference(neg_chars);
        if pos.is_empty() {
            tracing::debug!(%positive, %negative, "unclear example");
            return Ok(false);
        }
        let common = pos_chars.intersection(neg_chars);

        match &mut self.memory {
            StudentMemory::Scores(scores) => {
                for property in &pos {
                    *scores.entry(property.clone()).or_insert(0) += 1;
                }
                for property in &common {
                    *scores.entry(property.clone()).or_insert(0) -= 1;
                }
            }
            StudentMemory::Memorised(sets) => {
                sets.insert(pos.clone());
            }
        }
        tracing::trace!(%positive, %negative, positive_properties = %pos, "learned example");
        Ok(true)
    }

    /// The current property weights.
    pub fn interpret(&self) -> Interpretation {
        match &self.memory {
            StudentMemory::Scores(scores) => scores
                .iter()
                .map(|(p, s)| (p.clone(), *s as f64))
                .collect(),
            StudentMemory::Memorised(sets) => fca::interpret(sets),
        }
    }

    /// Rank this student's universe against its current interpretation.
    pub fn query_results(&self) -> RankedResults {
        query::execute(self.session.groups(), &self.interpret())
    }

    pub fn policy(&self) -> StudentPolicy {
        self.policy
    }

    pub fn memory(&self) -> &StudentMemory {
        &self.memory
    }

    /// Score of `property` under the frequency-based policy.
    pub fn score(&self, property: &Iri) -> Option<i64> {
        match &self.memory {
            StudentMemory::Scores(scores) => scores.get(property).copied(),
            StudentMemory::Memorised(_) => None,
        }
    }

    pub fn episodic_memory_size(&self) -> usize {
        match &self.memory {
            StudentMemory::Scores(_) => 0,
            StudentMemory::Memorised(sets) => sets.len(),
        }
    }

    pub fn semantic_memory_size(&self) -> usize {
        match &self.memory {
            StudentMemory::Scores(scores) => scores.len(),
            StudentMemory::Memorised(_) => 0,
        }
    }

    pub fn session(&self) -> &'a AgentSession<'a> {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::InstanceAlignment;
    use crate::kb::{KnowledgeBase, MemoryKb};
    use crate::symbol::props;

    fn kb() -> MemoryKb {
        MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("a2", ["Person", "Author"])
            .with_individual("b1", ["Person"])
            .with_individual("r1", ["Person", "Reviewer"])
            .with_individual("x1", ["Person", "Author", "Reviewer"])
    }

    fn session(kb: &MemoryKb) -> AgentSession<'_> {
        let alignment = InstanceAlignment::identity(kb.named_individuals().unwrap());
        AgentSession::prepare("student", kb, alignment).unwrap()
    }

    fn iri(s: &str) -> Iri {
        Iri::new(s)
    }

    #[test]
    fn policy_names_parse_case_insensitively() {
        assert_eq!(
            "Frequency-Based".parse::<StudentPolicy>().unwrap(),
            StudentPolicy::FrequencyBased
        );
        assert_eq!("logic-based".parse::<StudentPolicy>().unwrap(), StudentPolicy::LogicBased);
        assert!(matches!(
            "bayesian".parse::<StudentPolicy>(),
            Err(ConfigError::UnknownStudentPolicy { .. })
        ));
    }

    #[test]
    fn unknown_policy_keeps_previous_state() {
        let kb = kb();
        let session = session(&kb);
        let mut student = Student::new(&session, StudentPolicy::FrequencyBased);
        student.learn_from_example(&iri("a1"), &iri("b1")).unwrap();
        assert!(student.reset_named("bayesian").is_err());
        assert_eq!(student.policy(), StudentPolicy::FrequencyBased);
        assert_eq!(student.score(&iri("Author")), Some(1));
    }

    #[test]
    fn frequency_student_reinforces_and_weakens() {
        let kb = kb();
        let session = session(&kb);
        let mut student = Student::new(&session, StudentPolicy::FrequencyBased);
        assert!(student.learn_from_example(&iri("a1"), &iri("b1")).unwrap());
        assert_eq!(student.score(&iri("Author")), Some(1));
        assert_eq!(student.score(&iri("Person")), Some(-1));
        assert_eq!(student.semantic_memory_size(), 2);
        assert_eq!(student.episodic_memory_size(), 0);
    }

    #[test]
    fn scores_are_reinforcements_minus_weakenings() {
        let kb = kb();
        let session = session(&kb);
        let mut student = Student::new(&session, StudentPolicy::FrequencyBased);
        let sequence = [("a1", "b1"), ("x1", "r1"), ("a2", "r1"), ("x1", "b1")];
        let mut expected: BTreeMap<Iri, i64> = BTreeMap::new();
        for (p, n) in sequence {
            let pc = session.groups().object_characteristics(&iri(p)).unwrap().clone();
            let nc = session.groups().object_characteristics(&iri(n)).unwrap().clone();
            let pos = pc.difference(&nc);
            if !pos.is_empty() {
                for prop in &pos {
                    *expected.entry(prop.clone()).or_default() += 1;
                }
                for prop in &pc.intersection(&nc) {
                    *expected.entry(prop.clone()).or_default() -= 1;
                }
            }
            student.learn_from_example(&iri(p), &iri(n)).unwrap();
        }
        assert_eq!(student.memory(), &StudentMemory::Scores(expected));
    }

    #[test]
    fn unclear_example_changes_nothing() {
        let kb = kb();
        let session = session(&kb);
        for policy in [StudentPolicy::FrequencyBased, StudentPolicy::LogicBased] {
            let mut student = Student::new(&session, policy);
            let before = student.memory().clone();
            // b1 has nothing a1 lacks.
            assert!(!student.learn_from_example(&iri("b1"), &iri("a1")).unwrap());
            assert_eq!(student.memory(), &before);
        }
    }

    #[test]
    fn logic_student_memorises_distinct_sets() {
        let kb = kb();
        let session = session(&kb);
        let mut student = Student::new(&session, StudentPolicy::LogicBased);
        assert!(student.learn_from_example(&iri("a1"), &iri("b1")).unwrap());
        assert!(student.learn_from_example(&iri("a2"), &iri("b1")).unwrap());
        assert_eq!(student.episodic_memory_size(), 1);
        assert_eq!(student.semantic_memory_size(), 0);
        assert_eq!(
            student.memory(),
            &StudentMemory::Memorised(BTreeSet::from([props(["Author"])]))
        );
    }

    #[test]
    fn repeated_example_is_memorised_once() {
        let kb = MemoryKb::new()
            .with_individual("a1", ["Person", "Author", "Writer"])
            .with_individual("b1", ["Person"]);
        let session = session(&kb);
        let mut student = Student::new(&session, StudentPolicy::LogicBased);
        assert!(student.learn_from_example(&iri("a1"), &iri("b1")).unwrap());
        assert!(student.learn_from_example(&iri("a1"), &iri("b1")).unwrap());
        assert_eq!(student.episodic_memory_size(), 1);

        let weights = student.interpret();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[&iri("Author")], fca::EQUIVALENT_WEIGHT);
        assert_eq!(weights[&iri("Writer")], fca::EQUIVALENT_WEIGHT);
        assert!(!weights.contains_key(&iri("Person")));
    }

    #[test]
    fn logic_student_ranks_author_group() {
        let kb = kb();
        let session = session(&kb);
        let mut student = Student::new(&session, StudentPolicy::LogicBased);
        assert!(student.query_results().is_empty());

        student.learn_from_example(&iri("a1"), &iri("b1")).unwrap();
        student.learn_from_example(&iri("x1"), &iri("r1")).unwrap();
        let weights = student.interpret();
        assert_eq!(weights.get(&iri("Author")), Some(&fca::EQUIVALENT_WEIGHT));

        let results = student.query_results().object_set();
        assert_eq!(results, BTreeSet::from([iri("a1"), iri("a2"), iri("x1")]));
    }

    #[test]
    fn unknown_object_is_an_error() {
        let kb = kb();
        let session = session(&kb);
        let mut student = Student::new(&session, StudentPolicy::LogicBased);
        assert!(matches!(
            student.learn_from_example(&iri("ghost"), &iri("b1")),
            Err(LearnError::UnknownObject { .. })
        ));
    }

    #[test]
    fn reset_clears_memory() {
        let kb = kb();
        let session = session(&kb);
        let mut student = Student::new(&session, StudentPolicy::FrequencyBased);
        student.learn_from_example(&iri("a1"), &iri("b1")).unwrap();
        student.reset(StudentPolicy::LogicBased);
        assert_eq!(student.episodic_memory_size(), 0);
        assert_eq!(student.semantic_memory_size(), 0);
        assert!(student.interpret().is_empty());
    }
}
