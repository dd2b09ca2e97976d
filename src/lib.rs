// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ostension
//!
//! Two knowledge-base agents that share objects but not vocabulary learn what
//! a query term means by exchanging examples of it.
//!
//! ## Architecture
//!
//! - **Knowledge bases** (`kb`): characteristic sets read from OWL / RDF via oxigraph
//! - **Grouping** (`group`): objects partitioned by identical characteristic sets
//! - **Concepts** (`concept`): set differences between every ordered pair of groups
//! - **Teacher** (`teacher`): weighted, self-pruning pool of (positive, negative) examples
//! - **Student** (`student`): property scores, or memorised sets closed over with FCA (`fca`)
//! - **Ranking** (`query`): groups scored against the learned interpretation
//! - **Experiments** (`episode`, `experiment`, `evaluate`): sessions, repetitions, statistics
//!
//! ## Library usage
//!
//! ```
//! use ostension::alignment::InstanceAlignment;
//! use ostension::kb::{KnowledgeBase, MemoryKb};
//! use ostension::session::AgentSession;
//! use ostension::student::{Student, StudentPolicy};
//! use ostension::symbol::Iri;
//! use ostension::teacher::{Teacher, TeacherPolicy};
//!
//! let kb = MemoryKb::new()
//!     .with_individual("a1", ["Person", "Author"])
//!     .with_individual("b1", ["Person"]);
//! let shared = InstanceAlignment::identity(kb.named_individuals().unwrap());
//! let session = AgentSession::prepare("cmt", &kb, shared).unwrap();
//!
//! let mut teacher = Teacher::new(&session, Some(42));
//! assert!(teacher.reset(&Iri::new("Author"), TeacherPolicy::PropertyBased));
//!
//! let mut student = Student::new(&session, StudentPolicy::FrequencyBased);
//! let example = teacher.select_next().unwrap().unwrap();
//! let clear = student.learn_from_example(&example.positive, &example.negative).unwrap();
//! teacher.comprehend(clear);
//! assert_eq!(student.score(&Iri::new("Author")), Some(1));
//! ```

pub mod alignment;
pub mod concept;
pub mod config;
pub mod episode;
pub mod error;
pub mod evaluate;
pub mod experiment;
pub mod fca;
pub mod group;
pub mod kb;
pub mod query;
pub mod session;
pub mod student;
pub mod symbol;
pub mod teacher;
