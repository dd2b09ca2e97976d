//! Experiments between two agents: every query in both directions, repeated.
//!
//! Each run gets a fresh teacher and student over the same two sessions.
//! Completed runs are aggregated per query, per direction and overall; runs
//! that could not start are counted with their reason.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::alignment::InstanceAlignment;
use crate::config::{ExperimentConfig, InstanceSharing};
use crate::episode::{run_query, EpisodeSettings, QueryCounts, QueryMetrics, QueryRequest};
use crate::error::{ConfigError, OstensionResult};
use crate::kb::{shared_individuals, KnowledgeBase};
use crate::session::AgentSession;
use crate::student::Student;
use crate::teacher::Teacher;

// ---------------------------------------------------------------------------
// Session setup
// ---------------------------------------------------------------------------

/// Build both agents' alignments according to the sharing mode.
///
/// `instances` is the `iri_a,iri_b` file required by the extended mode.
pub fn align_pair(
    config: &ExperimentConfig,
    a: &dyn KnowledgeBase,
    b: &dyn KnowledgeBase,
    instances: Option<&Path>,
) -> OstensionResult<(InstanceAlignment, InstanceAlignment)> {
    match config.instance_sharing()? {
        InstanceSharing::Simple => {
            let shared = shared_individuals(a, b)?;
            let alignment = InstanceAlignment::identity(shared);
            Ok((alignment.clone(), alignment))
        }
        InstanceSharing::Extended => {
            let path = instances.ok_or(ConfigError::Invalid {
                field: "common_instances",
                message: "extended instance sharing needs an instance alignment file".into(),
            })?;
            let forward = InstanceAlignment::from_csv_path(path)?;
            let backward = forward.inverse();
            Ok((forward, backward))
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Mean and population standard deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Stat {
    pub mean: f64,
    pub std: f64,
}

impl Stat {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std: var.sqrt(),
        })
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ± {:.2}", self.mean, self.std)
    }
}

/// Per-metric samples of completed runs.
#[derive(Debug, Clone, Default)]
struct Samples {
    precision: Vec<f64>,
    recall: Vec<f64>,
    total_steps: Vec<f64>,
    result_size: Vec<f64>,
    teacher_episodic: Vec<f64>,
    teacher_semantic: Vec<f64>,
    student_episodic: Vec<f64>,
    student_semantic: Vec<f64>,
    perfect: Vec<f64>,
    deadend: Vec<f64>,
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

impl Samples {
    fn push(&mut self, m: &QueryMetrics) {
        self.precision.push(m.precision);
        self.recall.push(m.recall);
        self.total_steps.push(m.total_steps as f64);
        self.result_size.push(m.result_size as f64);
        self.teacher_episodic.push(m.memory.teacher_episodic as f64);
        self.teacher_semantic.push(m.memory.teacher_semantic as f64);
        self.student_episodic.push(m.memory.student_episodic as f64);
        self.student_semantic.push(m.memory.student_semantic as f64);
        self.perfect.push(flag(m.is_perfect()));
        self.deadend.push(flag(m.deadend));
    }

    fn extend(&mut self, other: &Samples) {
        self.precision.extend_from_slice(&other.precision);
        self.recall.extend_from_slice(&other.recall);
        self.total_steps.extend_from_slice(&other.total_steps);
        self.result_size.extend_from_slice(&other.result_size);
        self.teacher_episodic.extend_from_slice(&other.teacher_episodic);
        self.teacher_semantic.extend_from_slice(&other.teacher_semantic);
        self.student_episodic.extend_from_slice(&other.student_episodic);
        self.student_semantic.extend_from_slice(&other.student_semantic);
        self.perfect.extend_from_slice(&other.perfect);
        self.deadend.extend_from_slice(&other.deadend);
    }

    fn aggregate(&self) -> Option<Aggregate> {
        Some(Aggregate {
            completed: self.precision.len(),
            precision: Stat::of(&self.precision)?,
            recall: Stat::of(&self.recall)?,
            total_steps: Stat::of(&self.total_steps)?,
            result_size: Stat::of(&self.result_size)?,
            teacher_episodic: Stat::of(&self.teacher_episodic)?,
            teacher_semantic: Stat::of(&self.teacher_semantic)?,
            student_episodic: Stat::of(&self.student_episodic)?,
            student_semantic: Stat::of(&self.student_semantic)?,
            perfect_rate: Stat::of(&self.perfect)?.mean,
            deadend_rate: Stat::of(&self.deadend)?.mean,
        })
    }
}

/// Statistics over completed runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub completed: usize,
    pub precision: Stat,
    pub recall: Stat,
    pub total_steps: Stat,
    pub result_size: Stat,
    pub teacher_episodic: Stat,
    pub teacher_semantic: Stat,
    pub student_episodic: Stat,
    pub student_semantic: Stat,
    pub perfect_rate: f64,
    pub deadend_rate: f64,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "precision {}, recall {}, examples {}, teacher episodic {}, \
             student episodic {}, student semantic {}, perfect {:.0}%, deadend {:.0}%",
            self.precision,
            self.recall,
            self.total_steps,
            self.teacher_episodic,
            self.student_episodic,
            self.student_semantic,
            self.perfect_rate * 100.0,
            self.deadend_rate * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// All repetitions of one query in one direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySummary {
    pub teacher_property: String,
    pub student_property: String,
    pub counts: QueryCounts,
    pub runs: usize,
    /// `None` when no run completed.
    pub stats: Option<Aggregate>,
    pub fail_reasons: Vec<String>,
}

/// One agent teaching the other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionReport {
    pub teacher: String,
    pub student: String,
    pub queries: Vec<QuerySummary>,
    pub stats: Option<Aggregate>,
}

impl DirectionReport {
    pub fn completed_queries(&self) -> usize {
        self.queries.iter().filter(|q| q.stats.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub teacher_policy: String,
    pub student_policy: String,
    pub repetitions: usize,
    pub shared_objects: usize,
    pub directions: Vec<DirectionReport>,
    pub overall: Option<Aggregate>,
}

impl fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "teacher policy {}, student policy {}, {} repetitions, {} shared objects",
            self.teacher_policy, self.student_policy, self.repetitions, self.shared_objects
        )?;
        for direction in &self.directions {
            write!(
                f,
                "{} -> {}: {}/{} queries completed",
                direction.teacher,
                direction.student,
                direction.completed_queries(),
                direction.queries.len()
            )?;
            match &direction.stats {
                Some(stats) => writeln!(f, ", {stats}")?,
                None => writeln!(f)?,
            }
        }
        match &self.overall {
            Some(stats) => write!(f, "overall: {stats}"),
            None => write!(f, "overall: no completed queries"),
        }
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Run every query of `queries` with `a` teaching `b`, then `b` teaching `a`.
///
/// Query pairs name `a`'s property first.
pub fn run_pair(
    config: &ExperimentConfig,
    a: &AgentSession<'_>,
    b: &AgentSession<'_>,
    queries: &[QueryRequest],
) -> OstensionResult<ExperimentReport> {
    let settings = EpisodeSettings::from_config(config)?;

    let forward = run_direction(config, &settings, a, b, queries.iter().cloned())?;
    let backward = run_direction(
        config,
        &settings,
        b,
        a,
        queries.iter().map(QueryRequest::reversed),
    )?;

    let mut all = Samples::default();
    all.extend(&forward.1);
    all.extend(&backward.1);

    let report = ExperimentReport {
        teacher_policy: settings.teacher_policy.to_string(),
        student_policy: settings.student_policy.to_string(),
        repetitions: config.repetitions,
        shared_objects: a.universe_size(),
        directions: vec![forward.0, backward.0],
        overall: all.aggregate(),
    };
    tracing::info!(
        completed = report.overall.as_ref().map_or(0, |s| s.completed),
        "experiment finished"
    );
    Ok(report)
}

fn run_direction(
    config: &ExperimentConfig,
    settings: &EpisodeSettings,
    teacher_session: &AgentSession<'_>,
    student_session: &AgentSession<'_>,
    queries: impl Iterator<Item = QueryRequest>,
) -> OstensionResult<(DirectionReport, Samples)> {
    let mut direction_samples = Samples::default();
    let mut summaries = Vec::new();

    for request in queries {
        let mut samples = Samples::default();
        let mut counts = QueryCounts::default();
        let mut fail_reasons = Vec::new();

        for repetition in 0..config.repetitions {
            let mut teacher = Teacher::new(teacher_session, config.seed_for(repetition));
            let mut student = Student::new(student_session, settings.student_policy);
            let report = run_query(&mut teacher, &mut student, &request, settings)?;
            counts = report.counts;
            match report.outcome.metrics() {
                Some(metrics) => samples.push(metrics),
                None => fail_reasons.extend(report.outcome.fail_reason().map(String::from)),
            }
        }

        tracing::info!(
            teacher = teacher_session.name(),
            query = %request.teacher_property,
            completed = samples.precision.len(),
            runs = config.repetitions,
            "query finished"
        );

        direction_samples.extend(&samples);
        summaries.push(QuerySummary {
            teacher_property: request.teacher_property.to_string(),
            student_property: request.student_property.to_string(),
            counts,
            runs: config.repetitions,
            stats: samples.aggregate(),
            fail_reasons,
        });
    }

    let report = DirectionReport {
        teacher: teacher_session.name().to_string(),
        student: student_session.name().to_string(),
        queries: summaries,
        stats: direction_samples.aggregate(),
    };
    Ok((report, direction_samples))
}
