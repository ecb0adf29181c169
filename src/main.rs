//! Command-line entry point: train on a file of UR/SR pairs, print the rule,
//! and optionally apply it to new URs.
#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use phontier::{load_pairs, FeatureTable, LearnerBuilder, LearnerConfig};

#[derive(Debug, Parser)]
#[command(name = "phontier", version, about = "Induce a tier-based harmony rule from UR/SR pairs")]
struct Cli {
    /// Training file with one `UR<sep>SR` pair per line.
    pairs: PathBuf,

    /// Column separator of the training file and feature table.
    #[arg(long, default_value_t = '\t')]
    sep: char,

    /// Feature table to use instead of the bundled one.
    #[arg(long, value_name = "TABLE")]
    features: Option<PathBuf>,

    /// Learner configuration in TOML.
    #[arg(long, value_name = "FILE", env = "PHONTIER_CONFIG")]
    config: Option<PathBuf>,

    /// Print the training report as JSON.
    #[arg(long)]
    json: bool,

    /// URs to run through the trained rule.
    #[arg(long = "produce", value_name = "UR")]
    produce: Vec<String>,

    /// Log search progress.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "phontier=debug" } else { "phontier=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => LearnerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => LearnerConfig::default(),
    };
    let mut builder = LearnerBuilder::new().with_config(config);
    if let Some(path) = &cli.features {
        let table = FeatureTable::load(path, cli.sep)
            .with_context(|| format!("loading feature table {}", path.display()))?;
        builder = builder.feature_table(table);
    }
    let mut learner = builder.build().context("creating the segment inventory")?;

    let pairs = load_pairs(&cli.pairs, cli.sep)
        .with_context(|| format!("reading training pairs from {}", cli.pairs.display()))?;
    learner
        .train(pairs.iter().map(|pair| (pair.ur.as_str(), pair.sr.as_str())))
        .with_context(|| format!("training on {}", cli.pairs.display()))?;

    let report = learner.report();
    if cli.json {
        println!("{}", report.to_json().context("serialising the report")?);
    } else {
        print!("{}", report);
    }

    for ur in &cli.produce {
        let sr = learner
            .produce_symbols(ur)
            .with_context(|| format!("applying the rule to `{}`", ur))?;
        println!("{} -> {}", ur, sr);
    }
    Ok(())
}
