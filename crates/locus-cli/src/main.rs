mod batch;
mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use locus_core::OutlineSource;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "locus-cli")]
#[command(about = "Resolve candidate entities to places and building outlines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Match each candidate to a place and extract its building outlines
    Resolve {
        /// YAML or JSON file holding a `candidates` list
        #[arg(long)]
        candidates: PathBuf,
        /// Only process these entity ids (repeatable)
        #[arg(long = "id")]
        ids: Vec<i64>,
        /// Skip the autocomplete tier and go straight to text search
        #[arg(long)]
        no_autocomplete: bool,
        /// Append JSON Lines here instead of writing to stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// List the entities that would be processed and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch building outlines for each candidate without name matching
    Outlines {
        #[arg(long)]
        candidates: PathBuf,
        #[arg(long, value_enum, default_value_t = OutlineSourceArg::Coordinate)]
        by: OutlineSourceArg,
        #[arg(long = "id")]
        ids: Vec<i64>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutlineSourceArg {
    Coordinate,
    Address,
}

impl From<OutlineSourceArg> for OutlineSource {
    fn from(value: OutlineSourceArg) -> Self {
        match value {
            OutlineSourceArg::Coordinate => OutlineSource::Coordinate,
            OutlineSourceArg::Address => OutlineSource::Address,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = locus_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the JSON Lines output.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Resolve {
            candidates,
            ids,
            no_autocomplete,
            output,
            dry_run,
        } => {
            batch::run_resolve(
                &config,
                &candidates,
                &ids,
                no_autocomplete,
                output.as_deref(),
                dry_run,
            )
            .await
        }
        Commands::Outlines {
            candidates,
            by,
            ids,
            output,
            dry_run,
        } => {
            batch::run_outlines(
                &config,
                &candidates,
                &ids,
                by.into(),
                output.as_deref(),
                dry_run,
            )
            .await
        }
    }
}
