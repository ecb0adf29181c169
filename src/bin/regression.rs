//! Run the scenario suite and report results.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use phontier::{ScenarioExecutor, ScenarioSuite};

#[derive(Debug, Parser)]
#[command(name = "regression", about = "Train on every bundled scenario and compare the rules")]
struct Cli {
    /// Scenario directory; defaults to the bundled `data/scenarios`.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Maximum number of failures to list.
    #[arg(long, default_value_t = 20)]
    max_failures: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phontier=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    println!("=== phontier scenario suite ===\n");

    let suite = cli.root.map(ScenarioSuite::new).unwrap_or_default();
    let cases = suite
        .available_cases()
        .with_context(|| format!("scanning {}", suite.root().display()))?;
    println!("Found {} scenarios under {}", cases.len(), suite.root().display());

    let executor = ScenarioExecutor::new(suite);
    let start = Instant::now();
    let summary = executor
        .run()
        .with_context(|| format!("scanning {}", executor.suite().root().display()))?;
    let elapsed = start.elapsed();

    println!("\n{}", summary.render_table());
    println!("\n=== RESULTS ===");
    println!("Total scenarios: {}", summary.total());
    println!("Successes: {}", summary.successes);
    println!("Failures: {}", summary.failures);
    println!("Errors: {}", summary.errors);
    println!("Time elapsed: {:.2}s", elapsed.as_secs_f64());

    if summary.failures > 0 {
        println!("\n=== FAILURES (first {}) ===", cli.max_failures);
        for (count, result) in summary.iter_failures().take(cli.max_failures).enumerate() {
            println!("\n{}. {}:", count + 1, result.case.pairs.display());
            if let Some(err) = &result.error {
                println!("   Error: {}", err);
            }
            if let (Some(expected), Some(actual)) = (&result.expected, &result.actual) {
                println!("   expected: {}", expected);
                println!("   found:    {}", actual);
            }
        }
        if summary.failures > cli.max_failures {
            println!("\n... and {} more failures", summary.failures - cli.max_failures);
        }
        process::exit(1);
    }

    println!("\n=== Complete ===");
    Ok(())
}
