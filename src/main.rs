//! ostension CLI: teach a term between two ontologies by example.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ostension::alignment::read_query_pairs_path;
use ostension::config::ExperimentConfig;
use ostension::episode::QueryRequest;
use ostension::experiment::{align_pair, run_pair};
use ostension::kb::OntologyStore;
use ostension::session::AgentSession;
use ostension::symbol::Iri;

#[derive(Parser)]
#[command(
    name = "ostension",
    version,
    about = "Learn the meaning of a term from examples exchanged between two ontologies"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run teaching experiments between two knowledge bases.
    Run {
        /// Ontology of the first agent (.owl, .rdf, .ttl, .nt).
        #[arg(long)]
        teacher_kb: PathBuf,

        /// Ontology of the second agent.
        #[arg(long)]
        student_kb: PathBuf,

        /// Query pairs: two whitespace-separated class IRIs per line, first agent first.
        #[arg(long)]
        queries: PathBuf,

        /// Instance alignment CSV (`iri_a,iri_b`), for extended instance sharing.
        #[arg(long)]
        instances: Option<PathBuf>,

        /// Experiment config (TOML). Flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Teacher policy: random | property-based.
        #[arg(long)]
        teacher_policy: Option<String>,

        /// Student policy: logic-based | frequency-based.
        #[arg(long)]
        student_policy: Option<String>,

        /// Step budget per query session.
        #[arg(long)]
        max_steps: Option<usize>,

        /// Evaluate the student every N steps.
        #[arg(long)]
        eval_every: Option<usize>,

        /// Repetitions per query and direction.
        #[arg(long)]
        repetitions: Option<usize>,

        /// Base seed for the teacher's sampler.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the groups and concepts of one ontology.
    Concepts {
        /// Ontology file.
        #[arg(long)]
        kb: PathBuf,

        /// List the concepts that contain this class IRI.
        #[arg(long)]
        property: Option<String>,

        /// Only concepts that are exactly `{property}`.
        #[arg(long)]
        exact: bool,
    },

    /// Write a default experiment config.
    InitConfig {
        /// Target path.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            teacher_kb,
            student_kb,
            queries,
            instances,
            config,
            teacher_policy,
            student_policy,
            max_steps,
            eval_every,
            repetitions,
            seed,
            json,
        } => {
            let mut config = match config {
                Some(path) => ExperimentConfig::load(&path)?,
                None => ExperimentConfig::default(),
            };
            if let Some(policy) = teacher_policy {
                config.teacher_policy = policy;
            }
            if let Some(policy) = student_policy {
                config.student_policy = policy;
            }
            if let Some(n) = max_steps {
                config.max_steps = n;
            }
            if let Some(n) = eval_every {
                config.eval_every = n;
            }
            if let Some(n) = repetitions {
                config.repetitions = n;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if instances.is_some() && config.common_instances == "simple" {
                config.common_instances = "extended".into();
            }
            config.validate()?;

            let kb_a = load_kb(&teacher_kb, &config)?;
            let kb_b = load_kb(&student_kb, &config)?;
            let (align_a, align_b) = align_pair(&config, &kb_a, &kb_b, instances.as_deref())?;

            let a = AgentSession::prepare(agent_name(&teacher_kb), &kb_a, align_a)?;
            let b = AgentSession::prepare(agent_name(&student_kb), &kb_b, align_b)?;

            let queries: Vec<QueryRequest> = read_query_pairs_path(&queries)?
                .into_iter()
                .map(|(x, y)| QueryRequest::new(x, y))
                .collect();

            let report = run_pair(&config, &a, &b, &queries)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            } else {
                println!("{report}");
            }
        }

        Commands::Concepts { kb, property, exact } => {
            let config = ExperimentConfig::default();
            let store = load_kb(&kb, &config)?;
            let session = AgentSession::standalone(agent_name(&kb), &store)?;

            println!(
                "{}: {} objects, {} groups, {} concepts",
                session.name(),
                session.universe_size(),
                session.groups().len(),
                session.concepts().len()
            );
            for group in session.groups().iter() {
                println!(
                    "  {} {} ({} members)",
                    group.id,
                    group.characteristics,
                    group.members.len()
                );
            }

            if let Some(property) = property {
                let property = Iri::new(property);
                let covering = session.concepts().containing(&property, exact);
                println!("concepts containing {}: {}", property.local_name(), covering.len());
                for id in covering {
                    let Some(set) = session.concepts().get(id) else {
                        continue;
                    };
                    let comparisons = session.concepts().comparisons(id).map_or(0, |c| c.len());
                    println!("  {id} {set} ({comparisons} comparisons)");
                }
            }
        }

        Commands::InitConfig { path } => {
            ExperimentConfig::default().save(&path)?;
            println!("Wrote default config to {}", path.display());
        }
    }

    Ok(())
}

fn load_kb(path: &Path, config: &ExperimentConfig) -> Result<OntologyStore> {
    let store = OntologyStore::from_path(path)?.with_excluded_types(config.excluded_types());
    Ok(store)
}

/// The file stem names the agent in reports.
fn agent_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
