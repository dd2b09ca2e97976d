//! One teaching session for one query, from reset to final evaluation.
//!
//! The loop runs in chunks of `eval_every` steps. Each step is
//! select → learn → comprehend; the student is evaluated after every chunk,
//! and the session ends on a perfect score, a deadend, or the step budget.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::ExperimentConfig;
use crate::error::{ConfigError, ConfigResult, OstensionResult};
use crate::evaluate::{evaluate, Evaluation};
use crate::kb::KnowledgeBase;
use crate::student::{Student, StudentPolicy};
use crate::symbol::Iri;
use crate::teacher::{Teacher, TeacherPolicy};

/// A query as the teacher names it, and its translation for the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub teacher_property: Iri,
    pub student_property: Iri,
}

impl QueryRequest {
    pub fn new(teacher_property: impl Into<Iri>, student_property: impl Into<Iri>) -> Self {
        Self {
            teacher_property: teacher_property.into(),
            student_property: student_property.into(),
        }
    }

    /// The same pair seen from the other side.
    pub fn reversed(&self) -> Self {
        Self {
            teacher_property: self.student_property.clone(),
            student_property: self.teacher_property.clone(),
        }
    }
}

/// Typed settings for a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeSettings {
    pub teacher_policy: TeacherPolicy,
    pub student_policy: StudentPolicy,
    pub max_steps: usize,
    pub eval_every: usize,
}

impl EpisodeSettings {
    pub fn from_config(config: &ExperimentConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            teacher_policy: config.teacher_policy()?,
            student_policy: config.student_policy()?,
            max_steps: config.max_steps,
            eval_every: config.eval_every,
        })
    }

    /// A zero-sized evaluation chunk would never advance the session.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.eval_every == 0 {
            return Err(ConfigError::Invalid {
                field: "eval_every",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Memory sizes of both strategies at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemorySizes {
    pub teacher_episodic: usize,
    pub teacher_semantic: usize,
    pub student_episodic: usize,
    pub student_semantic: usize,
}

impl MemorySizes {
    fn snapshot(teacher: &Teacher<'_>, student: &Student<'_>) -> Self {
        Self {
            teacher_episodic: teacher.episodic_memory_size(),
            teacher_semantic: teacher.semantic_memory_size(),
            student_episodic: student.episodic_memory_size(),
            student_semantic: student.semantic_memory_size(),
        }
    }
}

/// The student's standing after a chunk of steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    /// Examples served so far.
    pub step: usize,
    pub precision: f64,
    pub recall: f64,
    pub result_size: usize,
    pub memory: MemorySizes,
}

/// Final figures of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMetrics {
    pub precision: f64,
    pub recall: f64,
    pub total_steps: usize,
    pub deadend: bool,
    pub result_size: usize,
    pub memory: MemorySizes,
    pub trace: Vec<TracePoint>,
}

impl QueryMetrics {
    pub fn is_perfect(&self) -> bool {
        self.precision == 1.0 && self.recall == 1.0
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum QueryOutcome {
    Completed(QueryMetrics),
    /// No concept of the teacher covers the query.
    TeacherHasNoExamples,
    /// The student's knowledge base has no instance of the translated query.
    StudentHasNoGroundTruth,
}

impl QueryOutcome {
    /// Why the session did not run, if it did not.
    pub fn fail_reason(&self) -> Option<&'static str> {
        match self {
            Self::Completed(_) => None,
            Self::TeacherHasNoExamples => Some("teacher failed to find relevant examples"),
            Self::StudentHasNoGroundTruth => Some("student has no ground-truth query results"),
        }
    }

    pub fn metrics(&self) -> Option<&QueryMetrics> {
        match self {
            Self::Completed(metrics) => Some(metrics),
            _ => None,
        }
    }
}

/// Result counts that describe the query itself, whatever the outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryCounts {
    /// Instances of the query in the student's knowledge base.
    pub num_gt_results: usize,
    /// Instances of the query in the teacher's knowledge base.
    pub num_teacher_results: usize,
    /// Teacher instances that translate into the ground truth.
    pub num_joint_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    pub counts: QueryCounts,
    pub outcome: QueryOutcome,
}

/// Run one session of `teacher` teaching `student` the query in `request`.
///
/// Both strategies are reset here; the sessions they borrow are not touched.
pub fn run_query(
    teacher: &mut Teacher<'_>,
    student: &mut Student<'_>,
    request: &QueryRequest,
    settings: &EpisodeSettings,
) -> OstensionResult<QueryReport> {
    settings.validate()?;
    let ground_truth: BTreeSet<Iri> = student
        .session()
        .kb()
        .instances_of(&request.student_property)?;
    let teacher_results = teacher
        .session()
        .kb()
        .instances_of(&request.teacher_property)?;
    let translated = teacher
        .session()
        .translated_instances_of(&request.teacher_property)?;

    let counts = QueryCounts {
        num_gt_results: ground_truth.len(),
        num_teacher_results: teacher_results.len(),
        num_joint_results: translated.intersection(&ground_truth).count(),
    };

    if !teacher.reset(&request.teacher_property, settings.teacher_policy) {
        return Ok(QueryReport {
            counts,
            outcome: QueryOutcome::TeacherHasNoExamples,
        });
    }
    if ground_truth.is_empty() {
        tracing::info!(
            query = %request.student_property,
            "student has no ground truth for the query"
        );
        return Ok(QueryReport {
            counts,
            outcome: QueryOutcome::StudentHasNoGroundTruth,
        });
    }
    student.reset(settings.student_policy);

    let mut steps = 0;
    let mut deadend = false;
    let mut checkpoint = 0;
    let mut trace = Vec::new();
    let (mut precision, mut recall, mut result_size) = (0.0, 0.0, 0);

    while checkpoint < settings.max_steps {
        let chunk = settings.eval_every.min(settings.max_steps - checkpoint);
        checkpoint += chunk;

        for _ in 0..chunk {
            let Some(example) = teacher.select_next()? else {
                deadend = true;
                break;
            };
            let clear = student.learn_from_example(&example.positive, &example.negative)?;
            teacher.comprehend(clear);
            steps += 1;
        }

        let results = student.query_results();
        if let Evaluation::Scored {
            precision: p,
            recall: r,
            result_size: n,
        } = evaluate(&results.objects, &ground_truth)
        {
            (precision, recall, result_size) = (p, r, n);
        }
        trace.push(TracePoint {
            step: steps,
            precision,
            recall,
            result_size,
            memory: MemorySizes::snapshot(teacher, student),
        });

        if deadend || (precision == 1.0 && recall == 1.0) {
            break;
        }
    }

    tracing::debug!(
        query = %request.teacher_property,
        steps,
        deadend,
        precision,
        recall,
        "query session finished"
    );

    Ok(QueryReport {
        counts,
        outcome: QueryOutcome::Completed(QueryMetrics {
            precision,
            recall,
            total_steps: steps,
            deadend,
            result_size,
            memory: MemorySizes::snapshot(teacher, student),
            trace,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::InstanceAlignment;
    use crate::kb::MemoryKb;
    use crate::session::AgentSession;

    fn settings(teacher: TeacherPolicy, student: StudentPolicy) -> EpisodeSettings {
        EpisodeSettings {
            teacher_policy: teacher,
            student_policy: student,
            max_steps: 50,
            eval_every: 1,
        }
    }

    fn kb() -> MemoryKb {
        MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("a2", ["Person", "Author"])
            .with_individual("b1", ["Person"])
            .with_individual("r1", ["Person", "Reviewer"])
    }

    fn session(kb: &MemoryKb) -> AgentSession<'_> {
        let alignment = InstanceAlignment::identity(kb.named_individuals().unwrap());
        AgentSession::prepare("agent", kb, alignment).unwrap()
    }

    #[test]
    fn identical_agents_reach_a_perfect_score() {
        let (teacher_kb, student_kb) = (kb(), kb());
        let (ts, ss) = (session(&teacher_kb), session(&student_kb));
        let mut teacher = Teacher::new(&ts, Some(1));
        let mut student = Student::new(&ss, StudentPolicy::LogicBased);

        let report = run_query(
            &mut teacher,
            &mut student,
            &QueryRequest::new("Author", "Author"),
            &settings(TeacherPolicy::PropertyBased, StudentPolicy::LogicBased),
        )
        .unwrap();

        assert_eq!(report.counts.num_gt_results, 2);
        assert_eq!(report.counts.num_joint_results, 2);
        let metrics = report.outcome.metrics().unwrap();
        assert!(metrics.is_perfect());
        assert_eq!(metrics.total_steps, 1);
        assert_eq!(metrics.trace.len(), 1);
        assert!(!metrics.deadend);
    }

    #[test]
    fn uncovered_query_reports_teacher_failure() {
        let (teacher_kb, student_kb) = (kb(), kb());
        let (ts, ss) = (session(&teacher_kb), session(&student_kb));
        let mut teacher = Teacher::new(&ts, Some(1));
        let mut student = Student::new(&ss, StudentPolicy::LogicBased);

        let report = run_query(
            &mut teacher,
            &mut student,
            &QueryRequest::new("Person", "Person"),
            &settings(TeacherPolicy::Random, StudentPolicy::LogicBased),
        )
        .unwrap();
        assert_eq!(report.outcome, QueryOutcome::TeacherHasNoExamples);
        assert_eq!(report.counts.num_gt_results, 4);
    }

    #[test]
    fn missing_ground_truth_is_a_distinct_outcome() {
        let teacher_kb = kb();
        let student_kb = MemoryKb::new()
            .with_individual("a1", ["Person"])
            .with_individual("a2", ["Person"])
            .with_individual("b1", ["Person"])
            .with_individual("r1", ["Person"]);
        let (ts, ss) = (session(&teacher_kb), session(&student_kb));
        let mut teacher = Teacher::new(&ts, Some(1));
        let mut student = Student::new(&ss, StudentPolicy::FrequencyBased);

        let report = run_query(
            &mut teacher,
            &mut student,
            &QueryRequest::new("Author", "Writer"),
            &settings(TeacherPolicy::PropertyBased, StudentPolicy::FrequencyBased),
        )
        .unwrap();
        assert_eq!(report.outcome, QueryOutcome::StudentHasNoGroundTruth);
        assert!(report.outcome.fail_reason().is_some());
    }

    #[test]
    fn indistinguishable_objects_end_in_deadend() {
        // The student cannot tell a1 from b1, so every example is unclear.
        let teacher_kb = MemoryKb::new()
            .with_individual("a1", ["Author"])
            .with_individual("b1", ["Person"]);
        let student_kb = MemoryKb::new()
            .with_individual("a1", ["Writer", "Member"])
            .with_individual("b1", ["Writer", "Member"]);
        let (ts, ss) = (session(&teacher_kb), session(&student_kb));
        let mut teacher = Teacher::new(&ts, Some(1));
        let mut student = Student::new(&ss, StudentPolicy::FrequencyBased);

        let report = run_query(
            &mut teacher,
            &mut student,
            &QueryRequest::new("Author", "Writer"),
            &settings(TeacherPolicy::PropertyBased, StudentPolicy::FrequencyBased),
        )
        .unwrap();
        let metrics = report.outcome.metrics().unwrap();
        assert!(metrics.deadend);
        assert_eq!(metrics.total_steps, 1);
        assert_eq!(metrics.memory.teacher_episodic, 1);
        assert_eq!(metrics.precision, 0.0);
    }

    #[test]
    fn step_budget_is_respected_in_chunks() {
        // However quickly the student converges, no more than the budget is spent.
        let teacher_kb = MemoryKb::new()
            .with_individual("a1", ["Person", "Author"])
            .with_individual("a2", ["Person", "Author", "Reviewer"])
            .with_individual("b1", ["Person"])
            .with_individual("b2", ["Person", "Reviewer"]);
        let student_kb = MemoryKb::new()
            .with_individual("a1", ["Person", "Author", "Paper"])
            .with_individual("a2", ["Person", "Author", "Reviewer"])
            .with_individual("b1", ["Person", "Paper"])
            .with_individual("b2", ["Person", "Reviewer", "Paper"]);
        let (ts, ss) = (session(&teacher_kb), session(&student_kb));
        let mut teacher = Teacher::new(&ts, Some(4));
        let mut student = Student::new(&ss, StudentPolicy::LogicBased);

        let settings = EpisodeSettings {
            teacher_policy: TeacherPolicy::Random,
            student_policy: StudentPolicy::LogicBased,
            max_steps: 7,
            eval_every: 3,
        };
        let report = run_query(
            &mut teacher,
            &mut student,
            &QueryRequest::new("Author", "Author"),
            &settings,
        )
        .unwrap();
        let metrics = report.outcome.metrics().unwrap();
        assert!(metrics.total_steps <= 7);
        for point in &metrics.trace {
            assert!(point.step <= 7);
        }
        assert!(metrics.trace.len() <= 3);
    }

    #[test]
    fn zero_eval_interval_is_rejected() {
        let (teacher_kb, student_kb) = (
            MemoryKb::new()
                .with_individual("a1", ["Person", "Author"])
                .with_individual("b1", ["Person"]),
            MemoryKb::new()
                .with_individual("a1", ["Person", "Author"])
                .with_individual("b1", ["Person"]),
        );
        let (ts, ss) = (session(&teacher_kb), session(&student_kb));
        let mut teacher = Teacher::new(&ts, Some(1));
        let mut student = Student::new(&ss, StudentPolicy::LogicBased);

        let settings = EpisodeSettings {
            teacher_policy: TeacherPolicy::PropertyBased,
            student_policy: StudentPolicy::LogicBased,
            max_steps: 5,
            eval_every: 0,
        };
        let err = run_query(
            &mut teacher,
            &mut student,
            &QueryRequest::new("Author", "Author"),
            &settings,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::OstensionError::Config(ConfigError::Invalid {
                field: "eval_every",
                ..
            })
        ));
        assert_eq!(student.episodic_memory_size(), 0);
    }
}
