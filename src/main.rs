//! Haunted House - configuration checker and spawn simulator
//!
//! `check` prints the effective rules a config file produces, including every
//! entry that was rejected. `simulate` rolls the spawn decision engine many
//! times inside a target structure and reports how often each outcome fired.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use haunted_house::core::error::{OracleUnavailable, Result};
use haunted_house::core::types::Position;
use haunted_house::core::HauntConfig;
use haunted_house::spawn::{Decision, SpawnDecisionEngine};
use haunted_house::world::StructureMembershipOracle;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "haunted-house")]
#[command(about = "Inspect and simulate haunted house spawn replacement")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a config file and print the effective rules
    Check {
        #[arg(long)]
        config: PathBuf,
    },
    /// Roll spawn decisions inside a target structure
    Simulate {
        #[arg(long)]
        config: PathBuf,

        /// Candidate mob id; defaults to the first configured rule
        #[arg(long)]
        mob: Option<String>,

        #[arg(long, default_value_t = 10_000)]
        spawns: u64,

        /// Random seed for deterministic runs
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output format: json or text
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Every point lies inside the given structure
struct Everywhere(String);

impl StructureMembershipOracle for Everywhere {
    fn structures_at(&self, _: Position) -> std::result::Result<Vec<String>, OracleUnavailable> {
        Ok(vec![self.0.clone()])
    }
}

#[derive(Serialize, Debug, Default)]
struct SimulationReport {
    candidate: String,
    structure: String,
    spawns: u64,
    ignored: u64,
    boosted: u64,
    replaced: u64,
    replace_rate: f64,
    boost_rate: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "haunted_house=info".into()),
        )
        .init();

    match Args::parse().command {
        Command::Check { config } => check(&config),
        Command::Simulate {
            config,
            mob,
            spawns,
            seed,
            format,
        } => simulate(&config, mob, spawns, seed, &format),
    }
}

fn check(path: &Path) -> Result<()> {
    let config = HauntConfig::load(path)?;
    let engine = SpawnDecisionEngine::from_config(&config);
    let rules = engine.rules();

    println!("haunted-house: {}", path.display());
    println!("- enabled: {}", config.enabled);
    println!("- replacement mob: {}", engine.replacement());
    println!(
        "- boost: {} at {:.1}%",
        engine.boost().target,
        engine.boost().chance * 100.0
    );
    println!("- rules: {}", rules.len());
    for entry in rules.to_entries() {
        println!("    {}", entry);
    }
    println!("- target structures: {}", rules.target_structures().len());
    for structure in rules.target_structures() {
        println!("    {}", structure);
    }
    if !rules.rejected().is_empty() {
        println!("- rejected entries: {}", rules.rejected().len());
        for err in rules.rejected() {
            eprintln!("haunted-house: {}", err);
        }
    }
    Ok(())
}

fn simulate(path: &Path, mob: Option<String>, spawns: u64, seed: u64, format: &str) -> Result<()> {
    let config = HauntConfig::load(path)?;
    let engine = SpawnDecisionEngine::from_config(&config);

    let candidate = match mob.or_else(|| {
        engine
            .rules()
            .rules()
            .first()
            .map(|rule| rule.candidate_id.clone())
    }) {
        Some(candidate) => candidate,
        None => {
            tracing::warn!("No candidate given and no valid rules configured");
            return Ok(());
        }
    };

    let Some(structure) = engine.rules().target_structures().first().cloned() else {
        tracing::warn!("No valid target structures configured, nothing can be replaced");
        return Ok(());
    };

    let oracle = Everywhere(structure.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut report = SimulationReport {
        candidate: candidate.clone(),
        structure,
        spawns,
        ..SimulationReport::default()
    };

    for _ in 0..spawns {
        match engine.decide(&candidate, Position::ZERO, &oracle, &mut rng) {
            Decision::Ignore => report.ignored += 1,
            Decision::BoostTo(_) => report.boosted += 1,
            Decision::ReplaceWith(_) => report.replaced += 1,
        }
    }

    if spawns > 0 {
        report.replace_rate = report.replaced as f64 / spawns as f64;
        report.boost_rate = report.boosted as f64 / spawns as f64;
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("haunted-house: simulated {} spawns of {}", spawns, report.candidate);
        println!("- structure: {}", report.structure);
        println!("- ignored: {}", report.ignored);
        println!("- boosted: {} ({:.2}%)", report.boosted, report.boost_rate * 100.0);
        println!("- replaced: {} ({:.2}%)", report.replaced, report.replace_rate * 100.0);
    }
    Ok(())
}
