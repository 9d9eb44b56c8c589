//! Boostline CLI - run a managed gradient-boosted regression pipeline
//!
//! This CLI provides a `boostline` command that prepares a tabular dataset,
//! trains a model on a managed ML platform, scores the held-out rows with a
//! batch transform job and compares the predictions with the true labels.

mod commands;
mod config;
mod plot;

use clap::{Parser, Subcommand};
use commands::prepare::PrepareOptions;
use commands::{analyze, prepare, register, run, status, train, transform, upload, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Boostline - train, register, batch-score and evaluate a boosted-tree regressor
#[derive(Parser, Debug)]
#[command(name = "boostline", author, version, about = "Boostline - managed boosted-tree regression pipeline")]
struct Args {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence when set
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Configuration file (skips ~/.boostline/config.toml and ./boostline.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the dataset, split it and write the partition files
    Prepare {
        /// Dataset path or http(s) URL (overrides [dataset] source)
        #[arg(long)]
        source: Option<String>,

        /// Shuffle seed (overrides [dataset] seed)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Upload the prepared partitions under the configured prefix
    Upload,

    /// Submit the training job and follow its progress
    Train {
        /// Return right after submission
        #[arg(long)]
        no_wait: bool,

        /// Output the final job description as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register the trained model artifact as a deployable model
    Register,

    /// Score the test partition with a batch transform job
    Transform {
        /// Return right after submission
        #[arg(long)]
        no_wait: bool,

        /// Output the final job description as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare predictions with the held-out labels and plot them
    Analyze {
        /// Use a local predictions file instead of downloading the transform output
        #[arg(long)]
        predictions: Option<PathBuf>,

        /// Output metrics and aligned pairs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run every stage from prepare to analyze
    Run {
        /// Dataset path or http(s) URL (overrides [dataset] source)
        #[arg(long)]
        source: Option<String>,

        /// Shuffle seed (overrides [dataset] seed)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Describe the jobs recorded for the current run
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing. Logs go to stderr so `--json` output stays parseable.
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = config::PipelineConfig::load(args.config.as_deref())?;
    let pipeline = Pipeline::new(config);

    match args.command {
        Command::Prepare { source, seed } => {
            prepare::execute(&pipeline, &PrepareOptions { source, seed }).await?;
        }
        Command::Upload => upload::execute(&pipeline).await?,
        Command::Train { no_wait, json } => {
            train::execute(&pipeline, no_wait, json).await?;
        }
        Command::Register => {
            register::execute(&pipeline).await?;
        }
        Command::Transform { no_wait, json } => {
            transform::execute(&pipeline, no_wait, json).await?;
        }
        Command::Analyze { predictions, json } => {
            analyze::execute(&pipeline, predictions.as_deref(), json).await?;
        }
        Command::Run { source, seed } => run::execute(&pipeline, &PrepareOptions { source, seed }).await?,
        Command::Status { json } => {
            status::execute(&pipeline, json).await?;
        }
    }

    Ok(())
}
