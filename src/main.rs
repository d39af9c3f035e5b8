//! triadic CLI: relation discovery and inference over labelled quantities.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use num_bigint::BigUint;

use triadic::concept::PrimeConceptMapper;
use triadic::config::EngineConfig;
use triadic::engine::Engine;
use triadic::graph::{Verdict, analytics};
use triadic::infer::SolveReport;
use triadic::scenario::Scenario;
use triadic::triad::search::PermutationSearcher;
use triadic::triad::{ObservedValue, Quadruple};
use triadic::units::UnitTable;

#[derive(Parser)]
#[command(name = "triadic", version, about = "Triadic relation discovery and inference")]
struct Cli {
    /// Engine configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the simplest balancing relation for four observed values.
    Discover {
        /// The four values.
        #[arg(num_args = 4, required = true)]
        values: Vec<String>,

        /// The four labels, comma-separated (e.g. "F,m,a,1").
        #[arg(long, value_delimiter = ',', required = true)]
        labels: Vec<String>,

        /// Override the acceptance threshold.
        #[arg(long)]
        min_k: Option<f64>,
    },

    /// Compute C4 = a·C2·C3 / (b·C1) exactly.
    Generate {
        c1: BigUint,
        c2: BigUint,
        c3: BigUint,

        #[arg(long, default_value = "1")]
        a: BigUint,

        #[arg(long, default_value = "1")]
        b: BigUint,
    },

    /// Run a scenario file: discover observations, register laws, answer queries.
    Run {
        scenario: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a scenario's discovery phase and print the relation graph as JSON.
    Export { scenario: PathBuf },

    /// Run a scenario's discovery phase and report the label topology.
    Topology {
        scenario: PathBuf,

        /// Number of labels to list by degree.
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Show the unit table, or the dimension of one label.
    Units { label: Option<String> },

    /// Map words to prime products; four words are also searched as a triad.
    Concept { words: Vec<String> },
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
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Discover {
            values,
            labels,
            min_k,
        } => {
            let mut config = config;
            if let Some(min_k) = min_k {
                config.discovery.min_k = min_k;
            }
            let engine = Engine::new(config)?;
            let values: Vec<ObservedValue> = values.into_iter().map(ObservedValue::Text).collect();
            let verdict = engine.observe(&values, &labels)?;
            print_verdict(&verdict);
        }

        Commands::Generate { c1, c2, c3, a, b } => {
            let engine = Engine::new(config)?;
            let generated = engine.generate(&c1, &c2, &c3, &a, &b)?;
            println!("C4 = {}", generated.c4);
            println!("  K = {}", generated.simplicity);
        }

        Commands::Run { scenario, json } => {
            let scenario = Scenario::load(&scenario)?;
            let engine = scenario.engine(config)?;
            let report = scenario.run(&engine)?;

            if json {
                let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
                println!("{json}");
            } else {
                println!("Observations ({} accepted):", report.accepted());
                for outcome in &report.observations {
                    println!(
                        "  [{}] {} {}",
                        outcome.labels.join(","),
                        outcome.status,
                        outcome.equation.as_deref().unwrap_or("-")
                    );
                }
                for answer in &report.answers {
                    print_answer(answer);
                }
                println!("\n{}", engine.info());
            }
        }

        Commands::Export { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let engine = scenario.engine(config)?;
            scenario.run(&engine)?;
            let json = serde_json::to_string_pretty(&engine.export()).into_diagnostic()?;
            println!("{json}");
        }

        Commands::Topology { scenario, top } => {
            let scenario = Scenario::load(&scenario)?;
            let engine = scenario.engine(config)?;
            scenario.run(&engine)?;

            let summary = analytics::summarize(engine.graph());
            println!(
                "{} labels, {} relations, {} components (largest {})",
                summary.labels, summary.relations, summary.components, summary.largest_component
            );
            println!(
                "average degree {:.2}, density {:.3}",
                summary.average_degree, summary.density
            );

            println!("\nMost connected labels:");
            for degree in analytics::label_degrees(engine.graph()).into_iter().take(top) {
                println!(
                    "  {:<12} {} neighbours, {} relations",
                    degree.label, degree.neighbours, degree.relations
                );
            }

            println!("\nComponents:");
            for component in analytics::components(engine.graph()) {
                println!("  #{} ({}): {}", component.id, component.size, component.members.join(", "));
            }
        }

        Commands::Units { label } => {
            let table = config.unit_table().unwrap_or_else(UnitTable::new);
            match label {
                Some(label) => match table.get(&label) {
                    Some(dim) => println!("{label}: {dim}"),
                    None => println!("{label}: not in the unit table (unchecked)"),
                },
                None => {
                    println!("Unit table ({} entries):", table.len());
                    for (label, dim) in table.entries() {
                        println!("  {label:<10} {dim}");
                    }
                }
            }
        }

        Commands::Concept { words } => {
            let mapper = PrimeConceptMapper::builtin();
            if words.is_empty() {
                println!("Concepts: {}", mapper.concepts().collect::<Vec<_>>().join(", "));
                return Ok(());
            }

            let mut values = Vec::with_capacity(words.len());
            for word in &words {
                let value = mapper.value_of(word)?;
                println!("{word} = {value} ({})", mapper.attributes_of(&value)?.join(" · "));
                values.push(value);
            }

            if let (Ok(values), Ok(labels)) = (
                <[BigUint; 4]>::try_from(values),
                <[String; 4]>::try_from(words),
            ) {
                match PermutationSearcher::search(&Quadruple::new(values, labels)) {
                    Some(found) => println!("\n{}", found.relation),
                    None => println!("\nno valid role order"),
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn print_verdict(verdict: &Verdict) {
    match verdict {
        Verdict::Accepted(r) => println!("accepted: {r}"),
        Verdict::Replaced(r) => println!("accepted (replaced existing edge): {r}"),
        Verdict::BelowThreshold { relation, min_k } => {
            println!("rejected below threshold {min_k}: {relation}")
        }
        Verdict::DimensionMismatch(r) => println!("rejected, dimensions do not balance: {r}"),
        Verdict::NoValidOrder => println!("rejected: every role order divides by zero"),
    }
}

fn print_answer(report: &SolveReport) {
    match report.value {
        Some(value) => println!(
            "\n{} = {value} ({}, {} iterations)",
            report.target, report.outcome, report.iterations
        ),
        None => println!(
            "\n{} unresolved ({}, {} iterations)",
            report.target, report.outcome, report.iterations
        ),
    }
    for d in report.derivations.iter().filter(|d| d.step > 0) {
        println!("  step {}: {} = {} via {}", d.step, d.label, d.value, d.kind);
    }
}
