//! Experiment configuration, persisted as TOML.
//!
//! Every field has a default, so a config file only needs the settings it
//! changes. Policy names stay strings on disk and are parsed (and rejected)
//! by [`ExperimentConfig::validate`] and the typed accessors.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::student::StudentPolicy;
use crate::symbol::Iri;
use crate::teacher::TeacherPolicy;

/// How the shared instance universe of two agents is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceSharing {
    /// Individuals both knowledge bases name identically, mapped to themselves.
    Simple,
    /// An explicit `iri_a,iri_b` alignment file.
    Extended,
}

impl FromStr for InstanceSharing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "extended" => Ok(Self::Extended),
            _ => Err(ConfigError::UnknownInstanceSharing { name: s.into() }),
        }
    }
}

impl fmt::Display for InstanceSharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("simple"),
            Self::Extended => f.write_str("extended"),
        }
    }
}

/// Settings for a teaching experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// `random` or `property-based`.
    #[serde(default = "default_teacher_policy")]
    pub teacher_policy: String,
    /// `logic-based` or `frequency-based`.
    #[serde(default = "default_student_policy")]
    pub student_policy: String,
    /// Step budget per query session.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Evaluate the student every this many steps.
    #[serde(default = "default_eval_every")]
    pub eval_every: usize,
    /// Runs per query direction.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    /// Base sampler seed; repetition `r` uses `seed + r`. Unset means entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// `simple` or `extended`.
    #[serde(default = "default_common_instances")]
    pub common_instances: String,
    /// Classes dropped from every characteristic set.
    #[serde(default)]
    pub excluded_types: Vec<String>,
}

fn default_teacher_policy() -> String {
    "property-based".into()
}
fn default_student_policy() -> String {
    "logic-based".into()
}
fn default_max_steps() -> usize {
    100
}
fn default_eval_every() -> usize {
    1
}
fn default_repetitions() -> usize {
    10
}
fn default_common_instances() -> String {
    "simple".into()
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            teacher_policy: default_teacher_policy(),
            student_policy: default_student_policy(),
            max_steps: default_max_steps(),
            eval_every: default_eval_every(),
            repetitions: default_repetitions(),
            seed: None,
            common_instances: default_common_instances(),
            excluded_types: Vec::new(),
        }
    }
}

impl ExperimentConfig {
    pub fn teacher_policy(&self) -> ConfigResult<TeacherPolicy> {
        self.teacher_policy.parse()
    }

    pub fn student_policy(&self) -> ConfigResult<StudentPolicy> {
        self.student_policy.parse()
    }

    pub fn instance_sharing(&self) -> ConfigResult<InstanceSharing> {
        self.common_instances.parse()
    }

    pub fn excluded_types(&self) -> impl Iterator<Item = Iri> + '_ {
        self.excluded_types.iter().map(Iri::new)
    }

    /// Seed for repetition `repetition`, if seeding is enabled.
    pub fn seed_for(&self, repetition: usize) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(repetition as u64))
    }

    /// Reject unknown names and zero counts before anything runs.
    pub fn validate(&self) -> ConfigResult<()> {
        self.teacher_policy()?;
        self.student_policy()?;
        self.instance_sharing()?;
        for (field, value) in [
            ("max_steps", self.max_steps),
            ("eval_every", self.eval_every),
            ("repetitions", self.repetitions),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: "must be at least 1".into(),
                });
            }
        }
        Ok(())
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
