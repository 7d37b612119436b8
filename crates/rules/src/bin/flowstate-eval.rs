//! flowstate-eval: run one refresh cycle from the command line.
//!
//! Reads a rule set (file or directory) and an input document holding
//! frames plus the diagram's element universe, then prints either the
//! computed element states or, with `--apply`, the cells of an in-memory
//! surface after the states were applied.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use flowstate_core::config::{load_dotenv, Config};
use flowstate_core::InputDocument;
use flowstate_rules::applier::{apply, MemorySurface};
use flowstate_rules::engine::{ElementCatalog, Engine};
use flowstate_rules::loader::{LoadStatus, RuleSetLoader};
use flowstate_rules::schema::{Rule, RuleSet};
use flowstate_rules::templates::VariableContext;
use flowstate_rules::validation::validate_rule_set;

// ── CLI ─────────────────────────────────────────────────────────────

/// Evaluate diagram rules against a captured input document.
#[derive(Parser, Debug)]
#[command(name = "flowstate-eval", version, about)]
struct Cli {
    /// Rule-set YAML file, or a directory of them.
    #[arg(long, env = "FLOWSTATE_RULES_PATH")]
    rules: Option<PathBuf>,

    /// Input document (JSON): frames, element_ids, element_labels.
    #[arg(long)]
    input: PathBuf,

    /// Apply states to an in-memory surface and print its cells.
    #[arg(long)]
    apply: bool,

    /// Validate the rule sets, print the report and stop.
    #[arg(long)]
    validate: bool,

    /// Host variable as name=value, substituted for $name / ${name}.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

// ── Rule loading ────────────────────────────────────────────────────

fn load_rule_sets(path: &Path) -> anyhow::Result<Vec<RuleSet>> {
    if !path.is_dir() {
        let set = RuleSetLoader::load_file(path)
            .with_context(|| format!("failed to load rule set {}", path.display()))?;
        return Ok(vec![set]);
    }

    let mut loader = RuleSetLoader::new(path);
    let results = loader
        .load_all()
        .with_context(|| format!("failed to scan {}", path.display()))?;
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
        .count();
    if failed > 0 {
        warn!(failed, path = %path.display(), "some rule-set files failed to load");
    }
    Ok(loader.rule_sets().values().cloned().collect())
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    load_dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    config.log_summary();

    let rules_path = cli.rules.clone().unwrap_or_else(|| config.rules.path.clone());
    let rule_sets = load_rule_sets(&rules_path)?;

    if cli.validate {
        let mut invalid = 0;
        for set in &rule_sets {
            let report = validate_rule_set(set);
            if !report.valid {
                invalid += 1;
            }
            let entry = serde_json::json!({ "rule_set": set.metadata.id, "report": report });
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        if invalid > 0 {
            bail!("{} of {} rule sets are invalid", invalid, rule_sets.len());
        }
        return Ok(());
    }

    let rules: Vec<Rule> = rule_sets
        .iter()
        .filter(|set| set.metadata.enabled)
        .flat_map(|set| set.rules.iter().cloned())
        .collect();

    let input = InputDocument::from_file(&cli.input)
        .with_context(|| format!("failed to read input document {}", cli.input.display()))?;
    let catalog = ElementCatalog::from(&input);
    let host: VariableContext = cli.vars.iter().cloned().collect();

    info!(
        rules = rules.len(),
        frames = input.frames.len(),
        elements = catalog.len(),
        "evaluating"
    );

    let mut engine = Engine::new(config.engine.clone());
    let snapshot = engine.run(&input.frames, &rules, &catalog, &host);

    if cli.apply {
        let mut surface = MemorySurface::from_elements(&catalog.ids, &catalog.labels);
        let report = apply(&mut surface, &snapshot.states);
        info!(
            applied = report.applied,
            skipped = report.skipped,
            failed = report.failed,
            "applied to in-memory surface"
        );
        println!("{}", serde_json::to_string_pretty(surface.cells())?);
    } else {
        println!("{}", serde_json::to_string_pretty(&snapshot.states)?);
    }

    Ok(())
}
