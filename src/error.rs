//! Rich diagnostic error types for the ostension engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know what went wrong and how to
//! fix it. Expected outcomes of a teaching session (an empty example pool, a
//! deadend, a query with no ground truth) are not errors and never show up here.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the ostension engine.
#[derive(Debug, Error, Diagnostic)]
pub enum OstensionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Kb(#[from] KbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Concept(#[from] ConceptError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Teach(#[from] TeachError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Learn(#[from] LearnError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Alignment(#[from] AlignmentError),
}

// ---------------------------------------------------------------------------
// Knowledge base errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum KbError {
    #[error("failed to read knowledge base file: {path}")]
    #[diagnostic(
        code(ostension::kb::io),
        help("Check that the ontology file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported RDF format for file: {path}")]
    #[diagnostic(
        code(ostension::kb::format),
        help(
            "Supported extensions are .owl / .rdf (RDF/XML), .ttl (Turtle) \
             and .nt (N-Triples)."
        )
    )]
    UnsupportedFormat { path: String },

    #[error("failed to parse RDF data: {message}")]
    #[diagnostic(
        code(ostension::kb::parse),
        help("The ontology is not valid in the detected serialization. Validate it with an RDF tool.")
    )]
    Parse { message: String },

    #[error("SPARQL query error: {message}")]
    #[diagnostic(
        code(ostension::kb::sparql),
        help("The knowledge base query failed. This usually means the store was not initialized.")
    )]
    Sparql { message: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown teacher policy: \"{name}\"")]
    #[diagnostic(
        code(ostension::config::teacher_policy),
        help("Valid teacher policies are: random, property-based.")
    )]
    UnknownTeacherPolicy { name: String },

    #[error("unknown student policy: \"{name}\"")]
    #[diagnostic(
        code(ostension::config::student_policy),
        help("Valid student policies are: frequency-based, logic-based.")
    )]
    UnknownStudentPolicy { name: String },

    #[error("unknown instance sharing mode: \"{name}\"")]
    #[diagnostic(
        code(ostension::config::instance_sharing),
        help(
            "Use \"simple\" to share the individuals both ontologies name identically, \
             or \"extended\" together with an instance alignment CSV file."
        )
    )]
    UnknownInstanceSharing { name: String },

    #[error("invalid setting `{field}`: {message}")]
    #[diagnostic(
        code(ostension::config::invalid),
        help("Fix the value in the config file or on the command line.")
    )]
    Invalid { field: &'static str, message: String },

    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ostension::config::read),
        help("Ensure the config file exists, or create one with `ostension init-config`.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(ostension::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(ostension::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Concept errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConceptError {
    #[error("concept not found: {id}")]
    #[diagnostic(
        code(ostension::concept::not_found),
        help("Concept IDs are only valid for the session that built them.")
    )]
    NotFound { id: usize },

    #[error("powerset of concept {id} has 2^{width} subsets (limit 2^{limit})")]
    #[diagnostic(
        code(ostension::concept::powerset_too_large),
        help("Powerset enumeration is exponential and only meant for small concepts.")
    )]
    PowersetTooLarge { id: usize, width: usize, limit: usize },
}

// ---------------------------------------------------------------------------
// Teacher errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TeachError {
    #[error("object {object} has no counterpart in the instance alignment")]
    #[diagnostic(
        code(ostension::teach::untranslatable),
        help(
            "The teacher's universe must be restricted to the aligned instances. \
             Prepare the session with the same alignment that serves examples."
        )
    )]
    Untranslatable { object: String },

    #[error("weighted sampling failed: {message}")]
    #[diagnostic(
        code(ostension::teach::sampling),
        help("Example weights must be finite and positive. This indicates a bug in pool maintenance.")
    )]
    Sampling { message: String },
}

// ---------------------------------------------------------------------------
// Student errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LearnError {
    #[error("object {object} is not part of the student's universe")]
    #[diagnostic(
        code(ostension::learn::unknown_object),
        help("The teacher served an object the student never grouped. Check the instance alignment.")
    )]
    UnknownObject { object: String },
}

// ---------------------------------------------------------------------------
// Alignment errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AlignmentError {
    #[error("failed to read alignment file: {path}")]
    #[diagnostic(
        code(ostension::alignment::io),
        help("Check that the alignment file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed alignment at line {line}: {content:?}")]
    #[diagnostic(
        code(ostension::alignment::malformed),
        help(
            "Instance alignments are `iri_a,iri_b` per line; query pairs are \
             two whitespace-separated IRIs per line."
        )
    )]
    Malformed { line: usize, content: String },
}

/// Convenience result type for the ostension engine.
pub type OstensionResult<T> = std::result::Result<T, OstensionError>;

pub type KbResult<T> = std::result::Result<T, KbError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type ConceptResult<T> = std::result::Result<T, ConceptError>;
pub type TeachResult<T> = std::result::Result<T, TeachError>;
pub type LearnResult<T> = std::result::Result<T, LearnError>;
pub type AlignmentResult<T> = std::result::Result<T, AlignmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err = ConfigError::UnknownTeacherPolicy {
            name: "greedy".into(),
        };
        let top: OstensionError = err.into();
        assert!(matches!(
            top,
            OstensionError::Config(ConfigError::UnknownTeacherPolicy { .. })
        ));
    }

    #[test]
    fn learn_error_converts_to_top_level() {
        let err = LearnError::UnknownObject {
            object: "http://x#a".into(),
        };
        let top: OstensionError = err.into();
        assert!(matches!(top, OstensionError::Learn(_)));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = ConceptError::PowersetTooLarge {
            id: 3,
            width: 25,
            limit: 20,
        };
        let msg = format!("{err}");
        assert!(msg.contains("2^25"));
        assert!(msg.contains("concept 3"));
    }
}
