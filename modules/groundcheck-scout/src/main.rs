use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use groundcheck_common::Config;
use groundcheck_scout::{FactCheckPipeline, FactCheckReport};

#[derive(Parser)]
#[command(name = "groundcheck", about = "Check a claim against live web sources")]
struct Cli {
    /// Print the full report as JSON instead of the rendered verdict
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fact-check a claim (a bare link is read and checked by content)
    Check {
        #[arg(required = true, num_args = 1..)]
        claim: Vec<String>,
    },
    /// Fact-check the content of a web page
    Url { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("groundcheck=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pipeline = FactCheckPipeline::from_config(&config)?;

    let report = match cli.command {
        Command::Check { claim } => pipeline.check(&claim.join(" ")).await?,
        Command::Url { url } => pipeline.check_url(&url).await?,
    };

    info!(sources = report.bundle.len(), "Done");
    print_report(&report, cli.json)?;
    Ok(())
}

fn print_report(report: &FactCheckReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.rendered);
    }
    Ok(())
}
