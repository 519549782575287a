use anyhow::{Context, Result};
use clap::Parser;
use developer_metrics::analyze::CodeBasedAnalyzer;
use developer_metrics::batch::{run_batch, BatchConfig};
use developer_metrics::utils::{BatchProgress, ConsoleProgress, SilentProgress};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Scores developers from exported activity tables")]
struct Args {
    /// Directory with one subdirectory of CSV tables per developer
    #[arg(long = "data", env = "DEVMETRICS_DATA", default_value = "./output/users")]
    data_path: PathBuf,
    #[arg(long = "output", env = "DEVMETRICS_OUTPUT", default_value = "./output/analysis")]
    output_path: PathBuf,
    /// Analyze only this developer directory
    #[arg(long = "developer", env = "DEVMETRICS_DEVELOPER")]
    developer: Option<String>,
    /// Scoring reference named in report footers
    #[arg(long = "scoring-reference", env = "DEVMETRICS_SCORING_REFERENCE")]
    scoring_reference: Option<PathBuf>,
    /// Also write the ranked results as JSON
    #[arg(long = "json")]
    json: bool,
    #[arg(long = "quiet", short = 'q')]
    quiet: bool,
}

impl From<Args> for BatchConfig {
    fn from(args: Args) -> Self {
        Self {
            data_root: args.data_path,
            output_root: args.output_path,
            developer: args.developer,
            scoring_reference: args.scoring_reference,
            write_json: args.json,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let quiet = args.quiet;
    let config = BatchConfig::from(args);

    let progress: Box<dyn BatchProgress> = if quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(ConsoleProgress::new())
    };
    let summary = run_batch(&CodeBasedAnalyzer::new(), &config, progress.as_ref())
        .with_context(|| format!("Failed to analyze `{}`", config.data_root.display()))?;

    if summary.is_empty() {
        println!("Nothing to analyze in `{}`", config.data_root.display());
        return Ok(());
    }
    if let Some(path) = &summary.summary_path {
        println!("Summary: {}", path.display());
    }
    for (developer, err) in &summary.failed {
        eprintln!("❌ {developer}: {err}");
    }
    Ok(())
}
